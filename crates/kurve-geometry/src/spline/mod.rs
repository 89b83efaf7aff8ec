//! Interpolating piecewise-cubic splines.
//!
//! [`solver`] turns sample parameters and a boundary condition into the
//! matrix mapping sample values to curvatures; [`CubicSpline`] wraps it with
//! cached evaluation.

pub mod boundary;
pub mod solver;
mod cubic;

pub use boundary::{BoundaryCondition, EndCondition, EndKind, SplineKind};
pub use cubic::{CubicSpline, Piece};
pub use solver::{curvature_matrix, CurvatureMatrix};
