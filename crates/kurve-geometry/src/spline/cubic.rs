//! Interpolating cubic spline through parameterized samples.

use std::sync::OnceLock;

use kurve_core::traits::Validate;
use kurve_core::{KurveError, Result, Tolerance};
use kurve_math::{curvature, radius_of_curvature, Coords, Cross, Masked};

use super::boundary::BoundaryCondition;
use super::solver::{curvature_matrix, validate_params, CurvatureMatrix};
use crate::curve::Curve;

/// A C2 piecewise-cubic curve interpolating `points[i]` at `params[i]`.
///
/// Works for scalar (`f64`), planar (`DVec2`) and spatial (`DVec3`) samples.
/// The curvature system and the curvature vector are computed on first use
/// and cached; setters clear only the caches they affect.
#[derive(Debug, Clone)]
pub struct CubicSpline<P: Coords> {
    params: Vec<f64>,
    points: Vec<P>,
    boundary: BoundaryCondition<P>,
    tolerance: Tolerance,
    system: OnceLock<CurvatureMatrix>,
    curvatures: OnceLock<Vec<P>>,
}

/// Borrowed view of one cubic piece between two consecutive samples.
#[derive(Debug, Clone, Copy)]
pub struct Piece<'a, P> {
    pub start: f64,
    pub end: f64,
    pub start_value: &'a P,
    pub end_value: &'a P,
    pub start_curvature: &'a P,
    pub end_curvature: &'a P,
}

impl<'a, P: Coords> Piece<'a, P> {
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Hermite weights `(A, B)` at `s`.
    fn weights(&self, s: f64) -> (f64, f64) {
        let ds = self.length();
        ((self.end - s) / ds, (s - self.start) / ds)
    }

    pub fn point_at(&self, s: f64) -> P {
        let ds = self.length();
        let (a, b) = self.weights(s);
        let c = (a * a * a - a) * ds * ds / 6.0;
        let d = (b * b * b - b) * ds * ds / 6.0;
        *self.start_value * a + *self.end_value * b + *self.start_curvature * c + *self.end_curvature * d
    }

    pub fn first_derivative_at(&self, s: f64) -> P {
        let ds = self.length();
        let (a, b) = self.weights(s);
        let e = (1.0 - 3.0 * a * a) * ds / 6.0;
        let f = (3.0 * b * b - 1.0) * ds / 6.0;
        (*self.end_value - *self.start_value) / ds + *self.start_curvature * e + *self.end_curvature * f
    }

    pub fn second_derivative_at(&self, s: f64) -> P {
        let (a, b) = self.weights(s);
        *self.start_curvature * a + *self.end_curvature * b
    }

    /// Constant over the piece.
    pub fn third_derivative(&self) -> P {
        (*self.end_curvature - *self.start_curvature) / self.length()
    }
}

impl<P: Coords> CubicSpline<P> {
    /// Fit a spline through `points` at the strictly increasing `params`.
    pub fn new(params: Vec<f64>, points: Vec<P>, boundary: BoundaryCondition<P>) -> Result<Self> {
        let mut spline = Self {
            params,
            points,
            boundary,
            tolerance: Tolerance::default(),
            system: OnceLock::new(),
            curvatures: OnceLock::new(),
        };
        spline.validate()?;
        close_seam(&mut spline.points, &spline.boundary);
        Ok(spline)
    }

    /// Fit a spline parameterized by cumulative chord length, starting at 0.
    ///
    /// Consecutive coincident points make the parameters non-increasing and
    /// are rejected.
    pub fn from_points(points: Vec<P>, boundary: BoundaryCondition<P>) -> Result<Self> {
        let params = chord_lengths(&points);
        Self::new(params, points, boundary)
    }

    /// Replace the tolerance within which periodic end samples are joined.
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Result<Self> {
        self.tolerance = tolerance;
        self.validate()?;
        Ok(self)
    }

    pub fn params(&self) -> &[f64] {
        &self.params
    }

    pub fn points(&self) -> &[P] {
        &self.points
    }

    pub fn boundary_condition(&self) -> &BoundaryCondition<P> {
        &self.boundary
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// `(s_min, s_max)`.
    pub fn domain(&self) -> (f64, f64) {
        (self.params[0], self.params[self.params.len() - 1])
    }

    /// Replace the sample values, keeping parameters and boundary condition.
    pub fn set_points(&mut self, mut points: Vec<P>) -> Result<()> {
        check_parts(&self.params, &points, &self.boundary, self.tolerance)?;
        close_seam(&mut points, &self.boundary);
        self.points = points;
        self.curvatures = OnceLock::new();
        Ok(())
    }

    /// Replace the sample parameters, keeping values and boundary condition.
    pub fn set_params(&mut self, params: Vec<f64>) -> Result<()> {
        check_parts(&params, &self.points, &self.boundary, self.tolerance)?;
        self.params = params;
        self.system = OnceLock::new();
        self.curvatures = OnceLock::new();
        Ok(())
    }

    /// Replace the boundary condition. The curvature system is kept when
    /// only pinned values change.
    pub fn set_boundary_condition(&mut self, boundary: BoundaryCondition<P>) -> Result<()> {
        check_parts(&self.params, &self.points, &boundary, self.tolerance)?;
        if boundary.kind() != self.boundary.kind() {
            self.system = OnceLock::new();
        }
        close_seam(&mut self.points, &boundary);
        self.boundary = boundary;
        self.curvatures = OnceLock::new();
        Ok(())
    }

    /// Replace everything, dropping every cache.
    pub fn reset(
        &mut self,
        params: Vec<f64>,
        mut points: Vec<P>,
        boundary: BoundaryCondition<P>,
    ) -> Result<()> {
        check_parts(&params, &points, &boundary, self.tolerance)?;
        close_seam(&mut points, &boundary);
        self.params = params;
        self.points = points;
        self.boundary = boundary;
        self.system = OnceLock::new();
        self.curvatures = OnceLock::new();
        Ok(())
    }

    /// Matrix mapping sample values (and pinned values) to curvatures.
    pub fn curvature_system(&self) -> Result<&CurvatureMatrix> {
        if let Some(system) = self.system.get() {
            return Ok(system);
        }
        let system = curvature_matrix(&self.params, self.boundary.kind())?;
        Ok(self.system.get_or_init(|| system))
    }

    /// Second derivative at every sample.
    pub fn curvatures(&self) -> Result<&[P]> {
        if let Some(m) = self.curvatures.get() {
            return Ok(m);
        }
        let m = self
            .curvature_system()?
            .apply(&self.points, &self.boundary.pinned_values())?;
        log::trace!("computed curvatures for {} samples", m.len());
        Ok(self.curvatures.get_or_init(|| m))
    }

    /// Piece `i`, spanning `params[i]..=params[i + 1]`.
    pub fn piece(&self, i: usize) -> Result<Piece<'_, P>> {
        let count = self.params.len() - 1;
        if i >= count {
            return Err(KurveError::config(format!(
                "piece index {i} out of bounds for {count} pieces"
            )));
        }
        Ok(self.view(self.curvatures()?, i))
    }

    /// All pieces in parameter order.
    pub fn pieces(&self) -> Result<Vec<Piece<'_, P>>> {
        let m = self.curvatures()?;
        Ok((0..self.params.len() - 1).map(|i| self.view(m, i)).collect())
    }

    /// The piece enclosing `s`; the final sample belongs to the last piece.
    pub fn piece_at(&self, s: f64) -> Result<Piece<'_, P>> {
        let i = self.locate(s)?;
        Ok(self.view(self.curvatures()?, i))
    }

    pub fn point_at(&self, s: f64) -> Result<P> {
        Ok(self.piece_at(s)?.point_at(s))
    }

    pub fn first_derivative_at(&self, s: f64) -> Result<P> {
        Ok(self.piece_at(s)?.first_derivative_at(s))
    }

    pub fn second_derivative_at(&self, s: f64) -> Result<P> {
        Ok(self.piece_at(s)?.second_derivative_at(s))
    }

    pub fn third_derivative_at(&self, s: f64) -> Result<P> {
        Ok(self.piece_at(s)?.third_derivative())
    }

    /// Batch point evaluation; parameters outside the domain are masked off.
    pub fn points_at(&self, params: &[f64]) -> Result<Masked<P>> {
        self.evaluate_batch(params, |piece, s| piece.point_at(s))
    }

    pub fn first_derivatives_at(&self, params: &[f64]) -> Result<Masked<P>> {
        self.evaluate_batch(params, |piece, s| piece.first_derivative_at(s))
    }

    pub fn second_derivatives_at(&self, params: &[f64]) -> Result<Masked<P>> {
        self.evaluate_batch(params, |piece, s| piece.second_derivative_at(s))
    }

    fn evaluate_batch<F>(&self, params: &[f64], f: F) -> Result<Masked<P>>
    where
        F: Fn(&Piece<'_, P>, f64) -> P,
    {
        let m = self.curvatures()?;
        let entries = params
            .iter()
            .map(|&s| self.locate(s).ok().map(|i| f(&self.view(m, i), s)));
        Ok(Masked::from_options(entries, P::ZERO))
    }

    fn view<'a>(&'a self, curvatures: &'a [P], i: usize) -> Piece<'a, P> {
        Piece {
            start: self.params[i],
            end: self.params[i + 1],
            start_value: &self.points[i],
            end_value: &self.points[i + 1],
            start_curvature: &curvatures[i],
            end_curvature: &curvatures[i + 1],
        }
    }

    fn locate(&self, s: f64) -> Result<usize> {
        let (lo, hi) = self.domain();
        KurveError::check_range(s, lo, hi)?;
        let upper = self.params.partition_point(|&p| p <= s);
        Ok(upper.saturating_sub(1).min(self.params.len() - 2))
    }
}

impl<P: Cross> CubicSpline<P> {
    /// Signed curvature in 2D, unsigned in 3D.
    pub fn curvature_at(&self, s: f64) -> Result<f64> {
        let piece = self.piece_at(s)?;
        Ok(curvature(piece.first_derivative_at(s), piece.second_derivative_at(s)))
    }

    /// `1 / |curvature|`, infinite where the curve is straight.
    pub fn radius_of_curvature_at(&self, s: f64) -> Result<f64> {
        Ok(radius_of_curvature(self.curvature_at(s)?))
    }
}

impl<P: Coords> Validate for CubicSpline<P> {
    fn validate(&self) -> Result<()> {
        check_parts(&self.params, &self.points, &self.boundary, self.tolerance)
    }
}

impl<P: Coords> Curve for CubicSpline<P> {
    type Point = P;

    fn point_at(&self, t: f64) -> Result<P> {
        CubicSpline::point_at(self, t)
    }

    fn tangent_at(&self, t: f64) -> Result<P> {
        self.first_derivative_at(t)
    }

    fn domain(&self) -> (f64, f64) {
        CubicSpline::domain(self)
    }

    fn is_closed(&self) -> bool {
        self.boundary.is_periodic()
    }
}

fn check_parts<P: Coords>(
    params: &[f64],
    points: &[P],
    boundary: &BoundaryCondition<P>,
    tolerance: Tolerance,
) -> Result<()> {
    if params.len() != points.len() {
        return Err(KurveError::config(format!(
            "{} parameters for {} points",
            params.len(),
            points.len()
        )));
    }
    validate_params(params)?;
    let n = points.len();
    if n < boundary.min_samples() {
        return Err(KurveError::config(format!(
            "{} spline needs at least {} samples, got {n}",
            boundary.kind(),
            boundary.min_samples()
        )));
    }
    if let Some(i) = points.iter().position(|p| !p.is_finite()) {
        return Err(KurveError::config(format!("sample {i} is not finite")));
    }
    if boundary.pinned_values().iter().any(|v| !v.is_finite()) {
        return Err(KurveError::config("pinned boundary value is not finite"));
    }
    if boundary.is_periodic() {
        let gap = points[0].distance(points[n - 1]);
        if !tolerance.is_zero(gap) {
            return Err(KurveError::config(format!(
                "periodic spline needs matching end samples, they are {gap} apart"
            )));
        }
    }
    Ok(())
}

/// A periodic spline stores its last sample as an exact copy of the first,
/// so the seam closes to rounding error of the evaluation.
fn close_seam<P: Coords>(points: &mut [P], boundary: &BoundaryCondition<P>) {
    if boundary.is_periodic() {
        if let [first, .., last] = points {
            *last = *first;
        }
    }
}

fn chord_lengths<P: Coords>(points: &[P]) -> Vec<f64> {
    let mut total = 0.0;
    let mut params = Vec::with_capacity(points.len());
    params.extend(points.first().map(|_| 0.0));
    for w in points.windows(2) {
        total += w[0].distance(w[1]);
        params.push(total);
    }
    params
}
