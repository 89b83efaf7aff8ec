//! Surface traits and implementations.

mod nurbs;

use kurve_core::Result;
use kurve_math::Coords;

pub use nurbs::{NurbsSurface, NurbsSurfaceBuilder};

/// Trait for parametric surfaces over any coordinate type.
pub trait Surface: Send + Sync {
    type Point: Coords;

    /// Evaluate the surface at parameters `(u, v)`.
    fn point_at(&self, u: f64, v: f64) -> Result<Self::Point>;

    /// Partial derivatives `(∂S/∂u, ∂S/∂v)` at `(u, v)`.
    fn partials_at(&self, u: f64, v: f64) -> Result<(Self::Point, Self::Point)>;

    /// Return the u-parameter domain `(u_min, u_max)`.
    fn domain_u(&self) -> (f64, f64);

    /// Return the v-parameter domain `(v_min, v_max)`.
    fn domain_v(&self) -> (f64, f64);
}
