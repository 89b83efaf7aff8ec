//! Batch evaluation results with a validity mask.
//!
//! Evaluating a batch of parameters where some lie outside the domain does
//! not fail the whole batch: each entry carries a flag, and masked-off
//! entries hold a fill value.

/// Values paired with a per-entry validity mask.
#[derive(Debug, Clone, PartialEq)]
pub struct Masked<T> {
    values: Vec<T>,
    mask: Vec<bool>,
}

impl<T: Copy> Masked<T> {
    /// Collect per-entry results, replacing `None` with `fill`.
    pub fn from_options<I>(entries: I, fill: T) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        let (values, mask) = entries
            .into_iter()
            .map(|e| match e {
                Some(v) => (v, true),
                None => (fill, false),
            })
            .unzip();
        Self { values, mask }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index` if it is valid.
    pub fn get(&self, index: usize) -> Option<T> {
        match self.mask.get(index) {
            Some(true) => Some(self.values[index]),
            _ => None,
        }
    }

    /// Raw values, including fill entries.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    pub fn all_valid(&self) -> bool {
        self.mask.iter().all(|&m| m)
    }

    pub fn valid_count(&self) -> usize {
        self.mask.iter().filter(|&&m| m).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<T>> + '_ {
        self.values
            .iter()
            .zip(&self.mask)
            .map(|(&v, &m)| if m { Some(v) } else { None })
    }

    /// All values, or `None` if any entry is masked off.
    pub fn into_complete(self) -> Option<Vec<T>> {
        if self.all_valid() {
            Some(self.values)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_mask() {
        let m = Masked::from_options(vec![Some(1.0), None, Some(3.0)], 0.0);
        assert_eq!(m.len(), 3);
        assert_eq!(m.values(), &[1.0, 0.0, 3.0]);
        assert_eq!(m.mask(), &[true, false, true]);
        assert_eq!(m.get(1), None);
        assert_eq!(m.get(2), Some(3.0));
        assert_eq!(m.get(7), None);
        assert_eq!(m.valid_count(), 2);
        assert!(!m.all_valid());
        assert_eq!(m.iter().collect::<Vec<_>>(), vec![Some(1.0), None, Some(3.0)]);
        assert!(m.into_complete().is_none());
    }

    #[test]
    fn test_complete() {
        let m = Masked::from_options((0..4).map(|i| Some(i as f64)), -1.0);
        assert!(m.all_valid());
        assert_eq!(m.into_complete(), Some(vec![0.0, 1.0, 2.0, 3.0]));
    }

    #[test]
    fn test_empty() {
        let m: Masked<f64> = Masked::from_options(Vec::new(), 0.0);
        assert!(m.is_empty());
        assert!(m.all_valid());
    }
}
