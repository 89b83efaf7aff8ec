//! Boundary conditions for piecewise-cubic splines.

use std::fmt;
use std::str::FromStr;

use kurve_core::{KurveError, Result};
use serde::{Deserialize, Serialize};

/// Condition imposed at one end of an open spline.
///
/// `Slope` and `Curvature` carry the pinned first / second derivative value,
/// in the same coordinate type as the spline's points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EndCondition<P> {
    /// Clamped first derivative.
    Slope(P),
    /// Clamped second derivative.
    Curvature(P),
    /// Zero second derivative.
    Natural,
    /// Continuous third derivative across the nearest interior knot.
    NotAKnot,
    /// Equal second derivative at the two samples nearest the end.
    Quadratic,
}

/// Boundary condition of a whole spline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryCondition<P> {
    Open {
        start: EndCondition<P>,
        end: EndCondition<P>,
    },
    /// Closed curve: first and second derivatives match across the seam.
    /// The first and last samples must coincide.
    Periodic,
}

/// Payload-free shape of an [`EndCondition`], all the solver needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndKind {
    Slope,
    Curvature,
    Natural,
    NotAKnot,
    Quadratic,
}

/// Payload-free shape of a [`BoundaryCondition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplineKind {
    Open(EndKind, EndKind),
    Periodic,
}

impl<P> EndCondition<P> {
    pub fn kind(&self) -> EndKind {
        match self {
            Self::Slope(_) => EndKind::Slope,
            Self::Curvature(_) => EndKind::Curvature,
            Self::Natural => EndKind::Natural,
            Self::NotAKnot => EndKind::NotAKnot,
            Self::Quadratic => EndKind::Quadratic,
        }
    }

    /// The pinned derivative value, if this condition carries one.
    pub fn pinned(&self) -> Option<&P> {
        match self {
            Self::Slope(v) | Self::Curvature(v) => Some(v),
            _ => None,
        }
    }
}

impl<P> BoundaryCondition<P> {
    /// Same condition at both ends.
    pub fn both(end: EndCondition<P>) -> Self
    where
        P: Clone,
    {
        Self::Open {
            start: end.clone(),
            end,
        }
    }

    pub fn natural() -> Self {
        Self::Open {
            start: EndCondition::Natural,
            end: EndCondition::Natural,
        }
    }

    pub fn not_a_knot() -> Self {
        Self::Open {
            start: EndCondition::NotAKnot,
            end: EndCondition::NotAKnot,
        }
    }

    pub fn clamped(start_slope: P, end_slope: P) -> Self {
        Self::Open {
            start: EndCondition::Slope(start_slope),
            end: EndCondition::Slope(end_slope),
        }
    }

    pub fn kind(&self) -> SplineKind {
        match self {
            Self::Open { start, end } => SplineKind::Open(start.kind(), end.kind()),
            Self::Periodic => SplineKind::Periodic,
        }
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::Periodic)
    }

    /// Pinned values in solver column order: start's before end's.
    pub fn pinned_values(&self) -> Vec<P>
    where
        P: Copy,
    {
        match self {
            Self::Open { start, end } => start.pinned().into_iter().chain(end.pinned()).copied().collect(),
            Self::Periodic => Vec::new(),
        }
    }

    /// Minimum number of samples this condition can be fitted to.
    pub fn min_samples(&self) -> usize {
        self.kind().min_samples()
    }
}

impl<P> Default for BoundaryCondition<P> {
    fn default() -> Self {
        Self::natural()
    }
}

impl SplineKind {
    pub fn min_samples(&self) -> usize {
        match self {
            Self::Periodic => 3,
            Self::Open(EndKind::NotAKnot, _) | Self::Open(_, EndKind::NotAKnot) => 3,
            Self::Open(..) => 2,
        }
    }

    /// Number of pinned derivative values the condition consumes.
    pub fn pinned_count(&self) -> usize {
        match self {
            Self::Open(start, end) => usize::from(start.is_pinned()) + usize::from(end.is_pinned()),
            Self::Periodic => 0,
        }
    }
}

impl EndKind {
    pub fn is_pinned(&self) -> bool {
        matches!(self, Self::Slope | Self::Curvature)
    }
}

impl fmt::Display for EndKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Slope => "slope",
            Self::Curvature => "curvature",
            Self::Natural => "natural",
            Self::NotAKnot => "not-a-knot",
            Self::Quadratic => "quadratic",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SplineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open(start, end) if start == end => write!(f, "{start}"),
            Self::Open(start, end) => write!(f, "{start}/{end}"),
            Self::Periodic => f.write_str("periodic"),
        }
    }
}

/// Parses the payload-free condition names. `"natural"`, `"not-a-knot"` and
/// `"quadratic"` apply to both ends; `"periodic"` closes the curve. Slope and
/// curvature conditions need a value and cannot be parsed from a name.
impl<P> FromStr for BoundaryCondition<P> {
    type Err = KurveError;

    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "natural" => (EndCondition::Natural, EndCondition::Natural),
            "not-a-knot" | "notaknot" => (EndCondition::NotAKnot, EndCondition::NotAKnot),
            "quadratic" => (EndCondition::Quadratic, EndCondition::Quadratic),
            "periodic" => return Ok(Self::Periodic),
            other => {
                return Err(KurveError::config(format!(
                    "unknown boundary condition '{other}'"
                )))
            }
        };
        Ok(Self::Open { start, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurve_math::DVec2;

    #[test]
    fn test_parse_names() {
        let bc: BoundaryCondition<f64> = "natural".parse().unwrap();
        assert_eq!(bc, BoundaryCondition::natural());
        let bc: BoundaryCondition<f64> = "Not_A_Knot".parse().unwrap();
        assert_eq!(bc.kind(), SplineKind::Open(EndKind::NotAKnot, EndKind::NotAKnot));
        let bc: BoundaryCondition<f64> = " periodic ".parse().unwrap();
        assert!(bc.is_periodic());
        let bc: BoundaryCondition<f64> = "quadratic".parse().unwrap();
        assert_eq!(bc, BoundaryCondition::both(EndCondition::Quadratic));
    }

    #[test]
    fn test_parse_unknown_is_configuration_error() {
        let err = "clamped".parse::<BoundaryCondition<f64>>().unwrap_err();
        assert!(matches!(err, KurveError::Configuration(_)));
    }

    #[test]
    fn test_pinned_values_order() {
        let bc = BoundaryCondition::Open {
            start: EndCondition::Curvature(DVec2::new(1.0, 0.0)),
            end: EndCondition::Slope(DVec2::new(0.0, 2.0)),
        };
        assert_eq!(bc.pinned_values(), vec![DVec2::new(1.0, 0.0), DVec2::new(0.0, 2.0)]);
        assert_eq!(bc.kind().pinned_count(), 2);

        let bc = BoundaryCondition::Open {
            start: EndCondition::Natural,
            end: EndCondition::Slope(3.0),
        };
        assert_eq!(bc.pinned_values(), vec![3.0]);
    }

    #[test]
    fn test_min_samples() {
        assert_eq!(BoundaryCondition::<f64>::natural().min_samples(), 2);
        assert_eq!(BoundaryCondition::<f64>::Periodic.min_samples(), 3);
        let bc = BoundaryCondition::Open {
            start: EndCondition::Slope(0.0),
            end: EndCondition::NotAKnot,
        };
        assert_eq!(bc.min_samples(), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(BoundaryCondition::<f64>::not_a_knot().kind().to_string(), "not-a-knot");
        assert_eq!(
            SplineKind::Open(EndKind::Slope, EndKind::Natural).to_string(),
            "slope/natural"
        );
    }

    #[test]
    fn test_serde_roundtrip() {
        let bc = BoundaryCondition::clamped(1.0, -1.0);
        let json = serde_json::to_string(&bc).unwrap();
        let back: BoundaryCondition<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(bc, back);
    }
}
