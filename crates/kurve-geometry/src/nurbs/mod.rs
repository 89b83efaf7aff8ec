//! NURBS core algorithms: knot vectors, Cox–de Boor and Bernstein bases,
//! and rational evaluation.

pub mod basis;
pub mod bernstein;
pub mod knot;
pub(crate) mod rational;

pub use basis::{basis_derivatives, basis_first_derivatives, basis_functions, basis_second_derivatives};
pub use bernstein::{bernstein_first_derivatives, bernstein_polynomials, bernstein_second_derivatives};
pub use knot::KnotVector;
