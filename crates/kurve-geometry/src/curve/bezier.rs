//! Bézier curves evaluated through the Bernstein basis.

use kurve_core::traits::{BoundingBox, Validate};
use kurve_core::{KurveError, Result};
use kurve_math::{curvature, Coords, Cross, Masked, Point3};
use nalgebra::DMatrix;

use super::nurbs::control_box;
use super::Curve;
use crate::nurbs::rational::combine;
use crate::nurbs::{bernstein_first_derivatives, bernstein_polynomials, bernstein_second_derivatives};

/// Polynomial Bézier curve of degree `control_points.len() - 1` on `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierCurve<P> {
    control_points: Vec<P>,
}

impl<P: Coords> BezierCurve<P> {
    pub fn new(control_points: Vec<P>) -> Result<Self> {
        let curve = Self { control_points };
        curve.validate()?;
        Ok(curve)
    }

    pub fn degree(&self) -> usize {
        self.control_points.len() - 1
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    pub fn point_at(&self, t: f64) -> Result<P> {
        KurveError::check_range(t, 0.0, 1.0)?;
        Ok(self.evaluate(&[t], bernstein_polynomials)[0])
    }

    pub fn tangent_at(&self, t: f64) -> Result<P> {
        KurveError::check_range(t, 0.0, 1.0)?;
        Ok(self.evaluate(&[t], bernstein_first_derivatives)[0])
    }

    pub fn second_derivative_at(&self, t: f64) -> Result<P> {
        KurveError::check_range(t, 0.0, 1.0)?;
        Ok(self.evaluate(&[t], bernstein_second_derivatives)[0])
    }

    pub fn points_at(&self, params: &[f64]) -> Masked<P> {
        self.evaluate_masked(params, bernstein_polynomials)
    }

    pub fn tangents_at(&self, params: &[f64]) -> Masked<P> {
        self.evaluate_masked(params, bernstein_first_derivatives)
    }

    fn evaluate(&self, params: &[f64], basis: fn(usize, &[f64]) -> DMatrix<f64>) -> Vec<P> {
        let b = basis(self.degree(), params);
        (0..params.len())
            .map(|j| combine(&b, j, &self.control_points))
            .collect()
    }

    fn evaluate_masked(&self, params: &[f64], basis: fn(usize, &[f64]) -> DMatrix<f64>) -> Masked<P> {
        let inside = |t: f64| (0.0..=1.0).contains(&t);
        let kept: Vec<f64> = params.iter().copied().filter(|&t| inside(t)).collect();
        let mut values = self.evaluate(&kept, basis).into_iter();
        let entries = params
            .iter()
            .map(|&t| if inside(t) { values.next() } else { None });
        Masked::from_options(entries, P::ZERO)
    }
}

impl<P: Cross> BezierCurve<P> {
    pub fn curvature_at(&self, t: f64) -> Result<f64> {
        Ok(curvature(self.tangent_at(t)?, self.second_derivative_at(t)?))
    }
}

impl<P: Coords> Validate for BezierCurve<P> {
    fn validate(&self) -> Result<()> {
        if self.control_points.is_empty() {
            return Err(KurveError::config("Bézier curve needs at least one control point"));
        }
        if let Some(i) = self.control_points.iter().position(|p| !p.is_finite()) {
            return Err(KurveError::config(format!("control point {i} is not finite")));
        }
        Ok(())
    }
}

impl<P: Coords> Curve for BezierCurve<P> {
    type Point = P;

    fn point_at(&self, t: f64) -> Result<P> {
        BezierCurve::point_at(self, t)
    }

    fn tangent_at(&self, t: f64) -> Result<P> {
        BezierCurve::tangent_at(self, t)
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn is_closed(&self) -> bool {
        self.control_points.len() > 1
            && self.control_points.first() == self.control_points.last()
    }
}

impl BoundingBox for BezierCurve<Point3> {
    type Point = Point3;

    fn bounding_box(&self) -> (Point3, Point3) {
        control_box(&self.control_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::NurbsCurve;
    use approx::assert_abs_diff_eq;
    use kurve_math::DVec2;

    fn cubic() -> BezierCurve<DVec2> {
        BezierCurve::new(vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(1.0, 3.0),
            DVec2::new(3.0, 3.0),
            DVec2::new(4.0, 0.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_endpoints_and_end_tangents() {
        let c = cubic();
        assert_eq!(c.degree(), 3);
        assert_abs_diff_eq!(c.point_at(0.0).unwrap(), DVec2::ZERO, epsilon = 1e-12);
        assert_abs_diff_eq!(c.point_at(1.0).unwrap(), DVec2::new(4.0, 0.0), epsilon = 1e-12);
        // n (P1 - P0)
        assert_abs_diff_eq!(c.tangent_at(0.0).unwrap(), DVec2::new(3.0, 9.0), epsilon = 1e-12);
        assert_abs_diff_eq!(c.tangent_at(1.0).unwrap(), DVec2::new(3.0, -9.0), epsilon = 1e-12);
    }

    #[test]
    fn test_matches_clamped_bspline() {
        let c = cubic();
        let b = NurbsCurve::builder(c.control_points().to_vec()).build().unwrap();
        for i in 0..=16 {
            let t = i as f64 / 16.0;
            assert_abs_diff_eq!(c.point_at(t).unwrap(), b.point_at(t).unwrap(), epsilon = 1e-12);
            assert_abs_diff_eq!(c.tangent_at(t).unwrap(), b.tangent_at(t).unwrap(), epsilon = 1e-9);
            assert_abs_diff_eq!(
                c.second_derivative_at(t).unwrap(),
                b.second_derivative_at(t).unwrap(),
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_masked_batch() {
        let c = cubic();
        let m = c.points_at(&[-0.5, 0.5, 2.0]);
        assert_eq!(m.valid_count(), 1);
        assert_abs_diff_eq!(m.get(1).unwrap(), DVec2::new(2.0, 2.25), epsilon = 1e-12);
        assert!(c.point_at(1.5).is_err());
    }

    #[test]
    fn test_straight_segment_has_zero_curvature() {
        let c = BezierCurve::new(vec![DVec2::ZERO, DVec2::new(1.0, 1.0), DVec2::new(2.0, 2.0)]).unwrap();
        assert_abs_diff_eq!(c.curvature_at(0.3).unwrap(), 0.0, epsilon = 1e-12);
        assert!(BezierCurve::<f64>::new(Vec::new()).is_err());
    }
}
