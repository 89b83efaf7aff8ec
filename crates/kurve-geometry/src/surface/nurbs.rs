//! Tensor-product B-spline and NURBS surfaces.

use std::sync::OnceLock;

use kurve_core::traits::{BoundingBox, Validate};
use kurve_core::{KurveError, Result};
use kurve_math::{Coords, DVec3, Masked, Point3, Vector3};

use super::Surface;
use crate::curve::control_box;
use crate::nurbs::rational::{self, combine_grid, Homogeneous};
use crate::nurbs::{basis_derivatives, basis_functions, KnotVector};

/// A NURBS surface.
///
/// `control_points[i][j]` is the control point at row `i` (u-direction) and
/// column `j` (v-direction); `weights` has the same shape.
#[derive(Debug, Clone)]
pub struct NurbsSurface<P: Coords> {
    degree_u: usize,
    degree_v: usize,
    knots_u: KnotVector,
    knots_v: KnotVector,
    control_points: Vec<Vec<P>>,
    weights: Vec<Vec<f64>>,
    weighted: OnceLock<Vec<Vec<P>>>,
}

/// Builder for [`NurbsSurface`]. Defaults: unit weights, degrees
/// `rows - 1` / `cols - 1`, clamped uniform knots.
#[derive(Debug, Clone)]
pub struct NurbsSurfaceBuilder<P> {
    control_points: Vec<Vec<P>>,
    weights: Option<Vec<Vec<f64>>>,
    degrees: Option<(usize, usize)>,
    knots: Option<(KnotVector, KnotVector)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Partial {
    None,
    U,
    V,
}

impl<P: Coords> NurbsSurfaceBuilder<P> {
    pub fn weights(mut self, weights: Vec<Vec<f64>>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn degrees(mut self, degree_u: usize, degree_v: usize) -> Self {
        self.degrees = Some((degree_u, degree_v));
        self
    }

    pub fn knots(mut self, knots_u: KnotVector, knots_v: KnotVector) -> Self {
        self.knots = Some((knots_u, knots_v));
        self
    }

    pub fn build(self) -> Result<NurbsSurface<P>> {
        let rows = self.control_points.len();
        let cols = self.control_points.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(KurveError::config("surface needs a non-empty control grid"));
        }
        let (degree_u, degree_v) = self.degrees.unwrap_or((rows - 1, cols - 1));
        let (knots_u, knots_v) = match self.knots {
            Some(knots) => knots,
            None => (
                KnotVector::clamped_uniform(rows, degree_u)?,
                KnotVector::clamped_uniform(cols, degree_v)?,
            ),
        };
        let weights = self
            .weights
            .unwrap_or_else(|| vec![vec![1.0; cols]; rows]);
        NurbsSurface::new(degree_u, degree_v, knots_u, knots_v, self.control_points, weights)
    }
}

impl<P: Coords> NurbsSurface<P> {
    pub fn builder(control_points: Vec<Vec<P>>) -> NurbsSurfaceBuilder<P> {
        NurbsSurfaceBuilder {
            control_points,
            weights: None,
            degrees: None,
            knots: None,
        }
    }

    pub fn new(
        degree_u: usize,
        degree_v: usize,
        knots_u: KnotVector,
        knots_v: KnotVector,
        control_points: Vec<Vec<P>>,
        weights: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let surface = Self {
            degree_u,
            degree_v,
            knots_u,
            knots_v,
            control_points,
            weights,
            weighted: OnceLock::new(),
        };
        surface.validate()?;
        Ok(surface)
    }

    pub fn degrees(&self) -> (usize, usize) {
        (self.degree_u, self.degree_v)
    }

    pub fn knots(&self) -> (&KnotVector, &KnotVector) {
        (&self.knots_u, &self.knots_v)
    }

    pub fn control_points(&self) -> &[Vec<P>] {
        &self.control_points
    }

    pub fn weights(&self) -> &[Vec<f64>] {
        &self.weights
    }

    pub fn is_rational(&self) -> bool {
        self.weights.iter().flatten().any(|&w| w != 1.0)
    }

    /// Replace the defining data. Nothing changes if validation fails.
    pub fn reset(
        &mut self,
        degrees: (usize, usize),
        knots: (KnotVector, KnotVector),
        control_points: Vec<Vec<P>>,
        weights: Vec<Vec<f64>>,
    ) -> Result<()> {
        *self = Self::new(degrees.0, degrees.1, knots.0, knots.1, control_points, weights)?;
        Ok(())
    }

    fn weighted_points(&self) -> &[Vec<P>] {
        self.weighted.get_or_init(|| {
            self.control_points
                .iter()
                .zip(&self.weights)
                .map(|(row, w)| row.iter().zip(w).map(|(&p, &w)| p * w).collect())
                .collect()
        })
    }

    pub fn point_at(&self, u: f64, v: f64) -> Result<P> {
        self.check(u, v)?;
        Ok(self.evaluate(&[u], &[v], Partial::None)?[0])
    }

    pub fn partials_at(&self, u: f64, v: f64) -> Result<(P, P)> {
        self.check(u, v)?;
        let su = self.evaluate(&[u], &[v], Partial::U)?[0];
        let sv = self.evaluate(&[u], &[v], Partial::V)?[0];
        Ok((su, sv))
    }

    /// Pairwise evaluation at `(us[i], vs[i])`; pairs outside the knot
    /// ranges are masked off.
    pub fn points_at_uv(&self, us: &[f64], vs: &[f64]) -> Result<Masked<P>> {
        self.evaluate_masked(us, vs, Partial::None)
    }

    /// Pairwise `(Su, Sv)` at `(us[i], vs[i])`, masked like [`Self::points_at_uv`].
    pub fn partials_at_uv(&self, us: &[f64], vs: &[f64]) -> Result<(Masked<P>, Masked<P>)> {
        let su = self.evaluate_masked(us, vs, Partial::U)?;
        let sv = self.evaluate_masked(us, vs, Partial::V)?;
        Ok((su, sv))
    }

    fn evaluate_masked(&self, us: &[f64], vs: &[f64], partial: Partial) -> Result<Masked<P>> {
        if us.len() != vs.len() {
            return Err(KurveError::config(format!(
                "{} u parameters for {} v parameters",
                us.len(),
                vs.len()
            )));
        }
        let inside: Vec<bool> = us
            .iter()
            .zip(vs)
            .map(|(&u, &v)| self.check(u, v).is_ok())
            .collect();
        let (ku, kv): (Vec<f64>, Vec<f64>) = us
            .iter()
            .zip(vs)
            .zip(&inside)
            .filter(|&(_, &ok)| ok)
            .map(|((&u, &v), _)| (u, v))
            .unzip();
        let mut values = self.evaluate(&ku, &kv, partial)?.into_iter();
        let entries = inside.iter().map(|&ok| if ok { values.next() } else { None });
        Ok(Masked::from_options(entries, P::ZERO))
    }

    /// Evaluate every combination of `us` and `vs`; row `i` holds the points
    /// at `us[i]`. Any parameter outside its knot range is an error.
    pub fn points_on_grid(&self, us: &[f64], vs: &[f64]) -> Result<Vec<Vec<P>>> {
        let (u0, u1) = self.knots_u.range();
        let (v0, v1) = self.knots_v.range();
        for &u in us {
            KurveError::check_range(u, u0, u1)?;
        }
        for &v in vs {
            KurveError::check_range(v, v0, v1)?;
        }
        let bu = basis_functions(&self.knots_u, self.degree_u, us)?;
        let bv = basis_functions(&self.knots_v, self.degree_v, vs)?;
        let weighted = self.is_rational().then(|| self.weighted_points());
        let grid = (0..us.len())
            .map(|i| {
                (0..vs.len())
                    .map(|j| {
                        if let Some(weighted) = weighted {
                            let h = Homogeneous::from_grid(
                                &bu,
                                i,
                                &bv,
                                j,
                                weighted,
                                &self.weights,
                            );
                            rational::point(h)
                        } else {
                            combine_grid(&bu, i, &bv, j, &self.control_points)
                        }
                    })
                    .collect()
            })
            .collect();
        Ok(grid)
    }

    fn check(&self, u: f64, v: f64) -> Result<()> {
        let (u0, u1) = self.knots_u.range();
        let (v0, v1) = self.knots_v.range();
        KurveError::check_range(u, u0, u1)?;
        KurveError::check_range(v, v0, v1)?;
        Ok(())
    }

    fn evaluate(&self, us: &[f64], vs: &[f64], partial: Partial) -> Result<Vec<P>> {
        let u0 = basis_functions(&self.knots_u, self.degree_u, us)?;
        let v0 = basis_functions(&self.knots_v, self.degree_v, vs)?;
        let du = match partial {
            Partial::U => Some(basis_derivatives(&self.knots_u, self.degree_u, us, 1)?),
            _ => None,
        };
        let dv = match partial {
            Partial::V => Some(basis_derivatives(&self.knots_v, self.degree_v, vs, 1)?),
            _ => None,
        };
        let bu = du.as_ref().unwrap_or(&u0);
        let bv = dv.as_ref().unwrap_or(&v0);

        if !self.is_rational() {
            return Ok((0..us.len())
                .map(|j| combine_grid(bu, j, bv, j, &self.control_points))
                .collect());
        }
        let weighted = self.weighted_points();
        Ok((0..us.len())
            .map(|j| {
                let h = Homogeneous::from_grid(&u0, j, &v0, j, weighted, &self.weights);
                if partial == Partial::None {
                    rational::point(h)
                } else {
                    let d = Homogeneous::from_grid(bu, j, bv, j, weighted, &self.weights);
                    rational::first_derivative(h, d)
                }
            })
            .collect())
    }
}

impl NurbsSurface<DVec3> {
    /// Unit normal `Su × Sv`, or zero where the surface is degenerate.
    pub fn normal_at(&self, u: f64, v: f64) -> Result<Vector3> {
        let (su, sv) = self.partials_at(u, v)?;
        Ok(su.cross(sv).normalize_or_zero())
    }
}

impl<P: Coords> Validate for NurbsSurface<P> {
    fn validate(&self) -> Result<()> {
        let rows = self.control_points.len();
        let cols = self.control_points.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(KurveError::config("surface needs a non-empty control grid"));
        }
        if let Some(i) = self.control_points.iter().position(|r| r.len() != cols) {
            return Err(KurveError::config(format!(
                "control row {i} has {} points, expected {cols}",
                self.control_points[i].len()
            )));
        }
        if self.weights.len() != rows || self.weights.iter().any(|r| r.len() != cols) {
            return Err(KurveError::config(format!(
                "weight grid must be {rows}x{cols} like the control grid"
            )));
        }
        if let Some(w) = self.weights.iter().flatten().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(KurveError::config(format!("weight {w} is not positive")));
        }
        if self.control_points.iter().flatten().any(|p| !p.is_finite()) {
            return Err(KurveError::config("control grid contains non-finite points"));
        }
        for (dir, knots, degree, count) in [
            ("u", &self.knots_u, self.degree_u, rows),
            ("v", &self.knots_v, self.degree_v, cols),
        ] {
            if knots.len() != count + degree + 1 {
                return Err(KurveError::config(format!(
                    "{dir}: degree {degree} with {count} control points needs {} knots, got {}",
                    count + degree + 1,
                    knots.len()
                )));
            }
        }
        Ok(())
    }
}

impl<P: Coords> Surface for NurbsSurface<P> {
    type Point = P;

    fn point_at(&self, u: f64, v: f64) -> Result<P> {
        NurbsSurface::point_at(self, u, v)
    }

    fn partials_at(&self, u: f64, v: f64) -> Result<(P, P)> {
        NurbsSurface::partials_at(self, u, v)
    }

    fn domain_u(&self) -> (f64, f64) {
        self.knots_u
            .domain(self.degree_u)
            .unwrap_or_else(|_| self.knots_u.range())
    }

    fn domain_v(&self) -> (f64, f64) {
        self.knots_v
            .domain(self.degree_v)
            .unwrap_or_else(|_| self.knots_v.range())
    }
}

impl BoundingBox for NurbsSurface<Point3> {
    type Point = Point3;

    fn bounding_box(&self) -> (Point3, Point3) {
        let points: Vec<Point3> = self.control_points.iter().flatten().copied().collect();
        control_box(&points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bilinear() -> NurbsSurface<DVec3> {
        NurbsSurface::builder(vec![
            vec![DVec3::new(0.0, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0)],
            vec![DVec3::new(0.0, 1.0, 0.0), DVec3::new(1.0, 1.0, 0.0)],
        ])
        .build()
        .unwrap()
    }

    /// Quarter cylinder of radius 1 around z, height 2.
    fn quarter_cylinder() -> NurbsSurface<DVec3> {
        let w = 1.0_f64 / 2.0_f64.sqrt();
        let arc = [DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y];
        let grid = arc
            .iter()
            .map(|&p| vec![p, p + DVec3::new(0.0, 0.0, 2.0)])
            .collect();
        let weights = vec![vec![1.0, 1.0], vec![w, w], vec![1.0, 1.0]];
        NurbsSurface::builder(grid).weights(weights).build().unwrap()
    }

    #[test]
    fn test_bilinear_corners_and_center() {
        let s = bilinear();
        assert_eq!(s.degrees(), (1, 1));
        assert_abs_diff_eq!(s.point_at(0.0, 0.0).unwrap(), DVec3::ZERO, epsilon = 1e-12);
        assert_abs_diff_eq!(s.point_at(1.0, 0.0).unwrap(), DVec3::Y, epsilon = 1e-12);
        assert_abs_diff_eq!(s.point_at(0.0, 1.0).unwrap(), DVec3::X, epsilon = 1e-12);
        assert_abs_diff_eq!(s.point_at(0.5, 0.5).unwrap(), DVec3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_bilinear_partials_and_normal() {
        let s = bilinear();
        let (su, sv) = s.partials_at(0.3, 0.7).unwrap();
        assert_abs_diff_eq!(su, DVec3::Y, epsilon = 1e-12);
        assert_abs_diff_eq!(sv, DVec3::X, epsilon = 1e-12);
        assert_abs_diff_eq!(s.normal_at(0.3, 0.7).unwrap(), -DVec3::Z, epsilon = 1e-12);
    }

    #[test]
    fn test_cylinder_points_and_normals() {
        let s = quarter_cylinder();
        assert!(s.is_rational());
        for i in 0..=10 {
            let u = i as f64 / 10.0;
            for &v in &[0.0, 0.25, 1.0] {
                let p = s.point_at(u, v).unwrap();
                assert_abs_diff_eq!(p.truncate().length(), 1.0, epsilon = 1e-9);
                assert_abs_diff_eq!(p.z, 2.0 * v, epsilon = 1e-12);
                let n = s.normal_at(u, v).unwrap();
                assert_abs_diff_eq!(n.dot(p.with_z(0.0)).abs(), 1.0, epsilon = 1e-9);
            }
        }
        let half = 2.0_f64.sqrt() / 2.0;
        assert_abs_diff_eq!(s.point_at(0.5, 0.0).unwrap(), DVec3::new(half, half, 0.0), epsilon = 1e-9);
    }

    #[test]
    fn test_partials_match_central_difference() {
        let s = quarter_cylinder();
        let h = 1e-4;
        let (u, v) = (0.35, 0.6);
        let (su, sv) = s.partials_at(u, v).unwrap();
        let fu = (s.point_at(u + h, v).unwrap() - s.point_at(u - h, v).unwrap()) / (2.0 * h);
        let fv = (s.point_at(u, v + h).unwrap() - s.point_at(u, v - h).unwrap()) / (2.0 * h);
        assert_abs_diff_eq!(su, fu, epsilon = 1e-5);
        assert_abs_diff_eq!(sv, fv, epsilon = 1e-5);
    }

    #[test]
    fn test_grid_matches_pairwise() {
        let s = quarter_cylinder();
        let us = [0.0, 0.4, 1.0];
        let vs = [0.0, 0.5];
        let grid = s.points_on_grid(&us, &vs).unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[0].len(), 2);
        for (i, &u) in us.iter().enumerate() {
            for (j, &v) in vs.iter().enumerate() {
                assert_abs_diff_eq!(grid[i][j], s.point_at(u, v).unwrap(), epsilon = 1e-12);
            }
        }
        assert!(s.points_on_grid(&[1.5], &vs).is_err());
    }

    #[test]
    fn test_points_at_uv_masks_out_of_range() {
        let s = bilinear();
        let m = s.points_at_uv(&[0.5, 2.0, 1.0], &[0.5, 0.5, -0.1]).unwrap();
        assert_eq!(m.mask(), &[true, false, false]);
        assert!(s.points_at_uv(&[0.5], &[]).is_err());
        assert!(matches!(
            s.point_at(0.5, 1.5),
            Err(KurveError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_partials_at_uv_match_scalar() {
        let s = quarter_cylinder();
        let us = [0.0, 0.35, 1.2, 0.8, 1.0];
        let vs = [0.2, 0.6, 0.5, -0.5, 1.0];
        let (su, sv) = s.partials_at_uv(&us, &vs).unwrap();
        assert_eq!(su.mask(), &[true, true, false, false, true]);
        assert_eq!(sv.mask(), su.mask());
        for (i, (&u, &v)) in us.iter().zip(&vs).enumerate() {
            match s.partials_at(u, v) {
                Ok((pu, pv)) => {
                    assert_abs_diff_eq!(su.get(i).unwrap(), pu, epsilon = 1e-12);
                    assert_abs_diff_eq!(sv.get(i).unwrap(), pv, epsilon = 1e-12);
                }
                Err(_) => {
                    assert_eq!(su.get(i), None);
                    assert_eq!(sv.get(i), None);
                }
            }
        }
        assert!(s.partials_at_uv(&[0.5, 0.5], &[0.5]).is_err());
    }

    #[test]
    fn test_validation() {
        let ragged = vec![vec![0.0, 1.0], vec![2.0]];
        assert!(NurbsSurface::builder(ragged).build().is_err());
        let grid = vec![vec![0.0, 1.0], vec![2.0, 3.0]];
        assert!(NurbsSurface::builder(grid.clone())
            .weights(vec![vec![1.0, 1.0], vec![1.0, -1.0]])
            .build()
            .is_err());
        assert!(NurbsSurface::builder(grid).degrees(2, 1).build().is_err());
        assert!(NurbsSurface::<f64>::builder(Vec::new()).build().is_err());
    }

    #[test]
    fn test_bounding_box() {
        let s = quarter_cylinder();
        let (min, max) = s.bounding_box();
        assert_eq!(min, DVec3::ZERO);
        assert_eq!(max, DVec3::new(1.0, 1.0, 2.0));
    }
}
