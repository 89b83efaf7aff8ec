//! Kurve math primitives: coordinate traits, batch results, bounding boxes
//! and the tridiagonal solver. Built on glam with nalgebra matrices.

pub mod aabb;
pub mod coords;
pub mod masked;
pub mod tridiagonal;

pub use glam::{DVec2, DVec3};
pub use nalgebra::DMatrix;

pub use aabb::Aabb3;
pub use coords::{curvature, radius_of_curvature, Coords, Cross};
pub use masked::Masked;
pub use tridiagonal::solve_tridiagonal;

pub type Point3 = DVec3;
pub type Vector3 = DVec3;
