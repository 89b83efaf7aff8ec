//! Kurve geometry: cubic splines, B-spline/NURBS curves and surfaces.
//!
//! All façades are generic over the coordinate type (`f64`, `DVec2`,
//! `DVec3`) through [`kurve_math::Coords`].

pub mod curve;
pub mod nurbs;
pub mod spline;
pub mod surface;
pub mod tessellate;

pub use curve::{BezierCurve, Curve, NurbsCurve};
pub use nurbs::KnotVector;
pub use spline::{BoundaryCondition, CubicSpline, EndCondition};
pub use surface::{NurbsSurface, Surface};
