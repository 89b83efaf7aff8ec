//! B-spline and NURBS curves.

use std::sync::OnceLock;

use kurve_core::traits::{BoundingBox, Validate};
use kurve_core::{KurveError, Result};
use kurve_math::{curvature, Coords, Cross, Masked, Point3};
use nalgebra::DMatrix;

use super::Curve;
use crate::nurbs::rational::{self, Homogeneous};
use crate::nurbs::{basis_derivatives, basis_functions, KnotVector};

/// A NURBS (Non-Uniform Rational B-Spline) curve.
///
/// `C(u) = Σ N_i(u) w_i P_i / Σ N_i(u) w_i`. With every weight exactly 1 the
/// denominator is skipped and the curve is evaluated as a plain B-spline.
///
/// Queries are accepted on the full knot range `[k[0], k[len-1]]`; the
/// [`Curve::domain`] is the sub-range where the basis partitions unity.
#[derive(Debug, Clone)]
pub struct NurbsCurve<P: Coords> {
    degree: usize,
    knots: KnotVector,
    control_points: Vec<P>,
    weights: Vec<f64>,
    weighted: OnceLock<Vec<P>>,
}

/// Builder for [`NurbsCurve`]. Missing weights default to 1, the degree to
/// `points - 1` and the knots to a clamped uniform vector.
#[derive(Debug, Clone)]
pub struct NurbsCurveBuilder<P> {
    control_points: Vec<P>,
    weights: Option<Vec<f64>>,
    degree: Option<usize>,
    knots: Option<KnotVector>,
}

impl<P: Coords> NurbsCurveBuilder<P> {
    pub fn weights(mut self, weights: Vec<f64>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn degree(mut self, degree: usize) -> Self {
        self.degree = Some(degree);
        self
    }

    pub fn knots(mut self, knots: KnotVector) -> Self {
        self.knots = Some(knots);
        self
    }

    pub fn build(self) -> Result<NurbsCurve<P>> {
        let n = self.control_points.len();
        if n == 0 {
            return Err(KurveError::config("curve needs at least one control point"));
        }
        let degree = self.degree.unwrap_or(n - 1);
        let knots = match self.knots {
            Some(knots) => knots,
            None => KnotVector::clamped_uniform(n, degree)?,
        };
        let weights = self.weights.unwrap_or_else(|| vec![1.0; n]);
        NurbsCurve::new(degree, knots, self.control_points, weights)
    }
}

impl<P: Coords> NurbsCurve<P> {
    pub fn builder(control_points: Vec<P>) -> NurbsCurveBuilder<P> {
        NurbsCurveBuilder {
            control_points,
            weights: None,
            degree: None,
            knots: None,
        }
    }

    pub fn new(
        degree: usize,
        knots: KnotVector,
        control_points: Vec<P>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        let curve = Self {
            degree,
            knots,
            control_points,
            weights,
            weighted: OnceLock::new(),
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Non-rational B-spline: all weights 1.
    pub fn bspline(degree: usize, knots: KnotVector, control_points: Vec<P>) -> Result<Self> {
        let weights = vec![1.0; control_points.len()];
        Self::new(degree, knots, control_points, weights)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }

    pub fn control_points(&self) -> &[P] {
        &self.control_points
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn is_rational(&self) -> bool {
        self.weights.iter().any(|&w| w != 1.0)
    }

    /// Replace the defining data. Nothing changes if validation fails.
    pub fn reset(
        &mut self,
        degree: usize,
        knots: KnotVector,
        control_points: Vec<P>,
        weights: Vec<f64>,
    ) -> Result<()> {
        *self = Self::new(degree, knots, control_points, weights)?;
        Ok(())
    }

    /// `w_i P_i`, computed once.
    fn weighted_points(&self) -> &[P] {
        self.weighted.get_or_init(|| {
            log::trace!("weighting {} control points", self.control_points.len());
            self.control_points
                .iter()
                .zip(&self.weights)
                .map(|(&p, &w)| p * w)
                .collect()
        })
    }

    pub fn point_at(&self, u: f64) -> Result<P> {
        self.evaluate_one(u, 0)
    }

    pub fn tangent_at(&self, u: f64) -> Result<P> {
        self.evaluate_one(u, 1)
    }

    pub fn second_derivative_at(&self, u: f64) -> Result<P> {
        self.evaluate_one(u, 2)
    }

    /// Batch evaluation; parameters outside the knot range are masked off.
    pub fn points_at(&self, params: &[f64]) -> Result<Masked<P>> {
        self.evaluate_masked(params, 0)
    }

    pub fn tangents_at(&self, params: &[f64]) -> Result<Masked<P>> {
        self.evaluate_masked(params, 1)
    }

    pub fn second_derivatives_at(&self, params: &[f64]) -> Result<Masked<P>> {
        self.evaluate_masked(params, 2)
    }

    fn evaluate_one(&self, u: f64, order: usize) -> Result<P> {
        let (lo, hi) = self.knots.range();
        KurveError::check_range(u, lo, hi)?;
        let values = self.evaluate(&[u], order)?;
        Ok(values[0])
    }

    fn evaluate_masked(&self, params: &[f64], order: usize) -> Result<Masked<P>> {
        let (lo, hi) = self.knots.range();
        let inside: Vec<f64> = params
            .iter()
            .copied()
            .filter(|&u| KurveError::check_range(u, lo, hi).is_ok())
            .collect();
        let mut values = self.evaluate(&inside, order)?.into_iter();
        let entries = params.iter().map(|&u| {
            if KurveError::check_range(u, lo, hi).is_ok() {
                values.next()
            } else {
                None
            }
        });
        Ok(Masked::from_options(entries, P::ZERO))
    }

    fn evaluate(&self, params: &[f64], order: usize) -> Result<Vec<P>> {
        if self.is_rational() {
            self.evaluate_rational(params, order)
        } else {
            self.evaluate_polynomial(params, order)
        }
    }

    fn evaluate_polynomial(&self, params: &[f64], order: usize) -> Result<Vec<P>> {
        let basis = basis_derivatives(&self.knots, self.degree, params, order)?;
        Ok((0..params.len())
            .map(|j| rational::combine(&basis, j, &self.control_points))
            .collect())
    }

    fn evaluate_rational(&self, params: &[f64], order: usize) -> Result<Vec<P>> {
        let weighted = self.weighted_points();
        let homogeneous =
            |basis: &DMatrix<f64>, j: usize| Homogeneous::from_column(basis, j, weighted, &self.weights);

        let n0 = basis_functions(&self.knots, self.degree, params)?;
        if order == 0 {
            return Ok((0..params.len())
                .map(|j| rational::point(homogeneous(&n0, j)))
                .collect());
        }
        let n1 = basis_derivatives(&self.knots, self.degree, params, 1)?;
        if order == 1 {
            return Ok((0..params.len())
                .map(|j| rational::first_derivative(homogeneous(&n0, j), homogeneous(&n1, j)))
                .collect());
        }
        let n2 = basis_derivatives(&self.knots, self.degree, params, 2)?;
        Ok((0..params.len())
            .map(|j| {
                rational::second_derivative(
                    homogeneous(&n0, j),
                    homogeneous(&n1, j),
                    homogeneous(&n2, j),
                )
            })
            .collect())
    }
}

impl<P: Cross> NurbsCurve<P> {
    pub fn curvature_at(&self, u: f64) -> Result<f64> {
        Ok(curvature(self.tangent_at(u)?, self.second_derivative_at(u)?))
    }
}

impl<P: Coords> Validate for NurbsCurve<P> {
    fn validate(&self) -> Result<()> {
        let n = self.control_points.len();
        if n == 0 {
            return Err(KurveError::config("curve needs at least one control point"));
        }
        if self.weights.len() != n {
            return Err(KurveError::config(format!(
                "{} weights for {n} control points",
                self.weights.len()
            )));
        }
        if let Some(w) = self.weights.iter().find(|w| !(w.is_finite() && **w > 0.0)) {
            return Err(KurveError::config(format!("weight {w} is not positive")));
        }
        if let Some(i) = self.control_points.iter().position(|p| !p.is_finite()) {
            return Err(KurveError::config(format!("control point {i} is not finite")));
        }
        if self.knots.len() != n + self.degree + 1 {
            return Err(KurveError::config(format!(
                "degree {} with {n} control points needs {} knots, got {}",
                self.degree,
                n + self.degree + 1,
                self.knots.len()
            )));
        }
        Ok(())
    }
}

impl<P: Coords> Curve for NurbsCurve<P> {
    type Point = P;

    fn point_at(&self, t: f64) -> Result<P> {
        NurbsCurve::point_at(self, t)
    }

    fn tangent_at(&self, t: f64) -> Result<P> {
        NurbsCurve::tangent_at(self, t)
    }

    fn domain(&self) -> (f64, f64) {
        self.knots
            .domain(self.degree)
            .unwrap_or_else(|_| self.knots.range())
    }

    fn is_closed(&self) -> bool {
        let n = self.control_points.len();
        self.knots.is_clamped(self.degree) && self.control_points[0] == self.control_points[n - 1]
    }
}

/// Box around the control polygon, which contains the curve.
impl BoundingBox for NurbsCurve<Point3> {
    type Point = Point3;

    fn bounding_box(&self) -> (Point3, Point3) {
        control_box(&self.control_points)
    }
}

pub(crate) fn control_box(points: &[Point3]) -> (Point3, Point3) {
    let first = points.first().copied().unwrap_or(Point3::ZERO);
    points
        .iter()
        .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p)))
}
