//! Knot vectors for B-spline/NURBS evaluation.

use kurve_core::traits::Validate;
use kurve_core::{KurveError, Result};
use serde::{Deserialize, Serialize};

/// A non-decreasing sequence of finite knots.
///
/// For degree `p` the vector defines `len - p - 1` basis functions. The
/// type is validated on construction and on deserialization, so holders can
/// rely on the ordering invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct KnotVector(Vec<f64>);

impl KnotVector {
    pub fn new(knots: Vec<f64>) -> Result<Self> {
        let kv = Self(knots);
        kv.validate()?;
        Ok(kv)
    }

    /// Clamped ("endpoint") knots over `[0, 1]` for `count` control points:
    /// `degree + 1` copies of each end value and uniform interior knots.
    pub fn clamped_uniform(count: usize, degree: usize) -> Result<Self> {
        if count <= degree {
            return Err(KurveError::config(format!(
                "degree {degree} needs at least {} control points, got {count}",
                degree + 1
            )));
        }
        let spans = count - degree;
        let mut knots = vec![0.0; degree + 1];
        knots.extend((1..spans).map(|i| i as f64 / spans as f64));
        knots.extend(std::iter::repeat(1.0).take(degree + 1));
        Ok(Self(knots))
    }

    /// Unclamped uniform knots `0, 1, ..., count + degree`.
    pub fn uniform(count: usize, degree: usize) -> Result<Self> {
        if count <= degree {
            return Err(KurveError::config(format!(
                "degree {degree} needs at least {} control points, got {count}",
                degree + 1
            )));
        }
        Ok(Self((0..count + degree + 1).map(|i| i as f64).collect()))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of degree-`degree` basis functions, or 0 if the vector is too
    /// short for that degree.
    pub fn basis_count(&self, degree: usize) -> usize {
        self.0.len().saturating_sub(degree + 1)
    }

    /// Full knot range `(k[0], k[len-1])`.
    pub fn range(&self) -> (f64, f64) {
        match (self.0.first(), self.0.last()) {
            (Some(&a), Some(&b)) => (a, b),
            _ => (0.0, 0.0),
        }
    }

    /// Valid parameter domain `(k[p], k[len-p-1])` where the basis functions
    /// partition unity.
    pub fn domain(&self, degree: usize) -> Result<(f64, f64)> {
        self.require_degree(degree)?;
        Ok((self.0[degree], self.0[self.0.len() - degree - 1]))
    }

    /// Whether the first and last `degree + 1` knots are repeated.
    pub fn is_clamped(&self, degree: usize) -> bool {
        if self.basis_count(degree) == 0 {
            return false;
        }
        let k = &self.0;
        let n = k.len();
        k[..=degree].iter().all(|&v| v == k[0]) && k[n - degree - 1..].iter().all(|&v| v == k[n - 1])
    }

    /// Multiplicity of the knot value `value` (exact comparison).
    pub fn multiplicity(&self, value: f64) -> usize {
        self.0.iter().filter(|&&k| k == value).count()
    }

    pub(crate) fn require_degree(&self, degree: usize) -> Result<()> {
        if self.basis_count(degree) == 0 {
            return Err(KurveError::config(format!(
                "{} knots cannot support degree {degree}",
                self.0.len()
            )));
        }
        Ok(())
    }
}

impl Validate for KnotVector {
    fn validate(&self) -> Result<()> {
        if self.0.len() < 2 {
            return Err(KurveError::config("knot vector needs at least 2 knots"));
        }
        if let Some(k) = self.0.iter().find(|k| !k.is_finite()) {
            return Err(KurveError::config(format!("knot {k} is not finite")));
        }
        if let Some(i) = self.0.windows(2).position(|w| w[0] > w[1]) {
            return Err(KurveError::config(format!(
                "knots must be non-decreasing: k[{i}] = {} > k[{}] = {}",
                self.0[i],
                i + 1,
                self.0[i + 1]
            )));
        }
        if self.0[0] == self.0[self.0.len() - 1] {
            return Err(KurveError::config("knot vector spans an empty range"));
        }
        Ok(())
    }
}

impl TryFrom<Vec<f64>> for KnotVector {
    type Error = KurveError;

    fn try_from(knots: Vec<f64>) -> Result<Self> {
        Self::new(knots)
    }
}

impl From<KnotVector> for Vec<f64> {
    fn from(kv: KnotVector) -> Self {
        kv.0
    }
}

impl AsRef<[f64]> for KnotVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}
