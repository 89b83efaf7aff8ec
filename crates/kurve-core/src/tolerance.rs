/// Distance below which two samples count as the same point.
///
/// Evaluation itself is exact arithmetic. The tolerance only decides whether
/// the end samples of a periodic spline are close enough to be joined.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// In model units.
    pub linear: f64,
}

impl Tolerance {
    pub const DEFAULT_LINEAR: f64 = 1e-7;

    pub fn new(linear: f64) -> Self {
        Self { linear }
    }

    /// Inclusive: a distance equal to the tolerance is zero.
    pub fn is_zero(self, distance: f64) -> bool {
        distance.abs() <= self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LINEAR)
    }
}
