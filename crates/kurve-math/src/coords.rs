//! Coordinate capability traits.
//!
//! Curve and surface evaluators only need a handful of operations on their
//! point type. Implementing [`Coords`] for `f64`, `DVec2` and `DVec3` lets a
//! single generic evaluator serve 1D, 2D and 3D data.

use std::fmt::Debug;
use std::ops::{Add, AddAssign, Div, Mul, Sub};

use glam::{DVec2, DVec3};

/// Arithmetic a point type must support to be threaded through the
/// evaluators: vector addition, subtraction and scaling by a real number.
pub trait Coords:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + AddAssign
    + Mul<f64, Output = Self>
    + Div<f64, Output = Self>
{
    const ZERO: Self;

    fn dot(self, other: Self) -> f64;

    fn norm(self) -> f64 {
        self.dot(self).sqrt()
    }

    fn distance(self, other: Self) -> f64 {
        (self - other).norm()
    }

    /// True if every component is finite.
    fn is_finite(self) -> bool;
}

/// Point types with a scalar cross measure.
///
/// In 2D this is the signed perp-dot product `a.x * b.y - a.y * b.x`; in 3D it
/// is the magnitude of the cross product, so curvature is unsigned there.
pub trait Cross: Coords {
    fn cross_measure(self, other: Self) -> f64;
}

impl Coords for f64 {
    const ZERO: Self = 0.0;

    fn dot(self, other: Self) -> f64 {
        self * other
    }

    fn norm(self) -> f64 {
        self.abs()
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

impl Coords for DVec2 {
    const ZERO: Self = DVec2::ZERO;

    fn dot(self, other: Self) -> f64 {
        DVec2::dot(self, other)
    }

    fn norm(self) -> f64 {
        self.length()
    }

    fn is_finite(self) -> bool {
        DVec2::is_finite(self)
    }
}

impl Coords for DVec3 {
    const ZERO: Self = DVec3::ZERO;

    fn dot(self, other: Self) -> f64 {
        DVec3::dot(self, other)
    }

    fn norm(self) -> f64 {
        self.length()
    }

    fn is_finite(self) -> bool {
        DVec3::is_finite(self)
    }
}

impl Cross for DVec2 {
    fn cross_measure(self, other: Self) -> f64 {
        self.perp_dot(other)
    }
}

impl Cross for DVec3 {
    fn cross_measure(self, other: Self) -> f64 {
        self.cross(other).length()
    }
}

/// Curvature `(r' x r'') / |r'|^3` from the first two derivatives.
///
/// A vanishing first derivative has no defined direction; the curvature is
/// reported as 0 there rather than dividing by zero.
pub fn curvature<P: Cross>(first: P, second: P) -> f64 {
    let speed = first.norm();
    if speed == 0.0 {
        return 0.0;
    }
    first.cross_measure(second) / (speed * speed * speed)
}

/// Radius of curvature `1 / |k|`; zero curvature maps to `+inf`.
pub fn radius_of_curvature(curvature: f64) -> f64 {
    if curvature == 0.0 {
        f64::INFINITY
    } else {
        1.0 / curvature.abs()
    }
}
