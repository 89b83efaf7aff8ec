//! Curve traits and implementations.

mod bezier;
mod nurbs;

use kurve_core::Result;
use kurve_math::Coords;

pub use bezier::BezierCurve;
pub use nurbs::{NurbsCurve, NurbsCurveBuilder};
pub(crate) use nurbs::control_box;

/// Trait for parametric curves over any coordinate type.
pub trait Curve: Send + Sync {
    type Point: Coords;

    /// Evaluate the curve at parameter `t`.
    fn point_at(&self, t: f64) -> Result<Self::Point>;

    /// Evaluate the first derivative at parameter `t`.
    fn tangent_at(&self, t: f64) -> Result<Self::Point>;

    /// Return the parameter domain `(t_min, t_max)`.
    fn domain(&self) -> (f64, f64);

    /// Whether the curve is closed (start == end).
    fn is_closed(&self) -> bool {
        false
    }
}
