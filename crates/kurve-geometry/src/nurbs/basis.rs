//! Cox–de Boor evaluation of B-spline basis functions and derivatives.
//!
//! Every function here returns a matrix with one row per basis function and
//! one column per parameter value, so a whole batch of parameters is
//! evaluated in one pass.

use kurve_core::Result;
use nalgebra::DMatrix;

use super::knot::KnotVector;

/// Evaluate the degree-`degree` basis functions `N_{i,p}` at every parameter.
///
/// Returns a `(len(knots) - degree - 1) × params.len()` matrix. Degree-0
/// indicators use half-open intervals `[k[i], k[i+1])` except the last
/// non-empty interval, which is closed so the final knot value is covered.
///
/// Parameters outside `[k[0], k[len-1]]` yield all-zero columns; they are not
/// clamped into the domain.
pub fn basis_functions(knots: &KnotVector, degree: usize, params: &[f64]) -> Result<DMatrix<f64>> {
    knots.require_degree(degree)?;
    Ok(cox_de_boor(knots.as_slice(), degree, params))
}

/// First derivatives `N'_{i,p}`, same shape as [`basis_functions`].
pub fn basis_first_derivatives(
    knots: &KnotVector,
    degree: usize,
    params: &[f64],
) -> Result<DMatrix<f64>> {
    basis_derivatives(knots, degree, params, 1)
}

/// Second derivatives `N''_{i,p}`, same shape as [`basis_functions`].
pub fn basis_second_derivatives(
    knots: &KnotVector,
    degree: usize,
    params: &[f64],
) -> Result<DMatrix<f64>> {
    basis_derivatives(knots, degree, params, 2)
}

/// Derivatives of order `order` of the degree-`degree` basis functions.
///
/// Each order is formed from the previous order of the degree below, i.e.
/// derivatives of derivatives, which stays consistent for interior repeated
/// and unclamped knots. Orders above the degree are identically zero.
pub fn basis_derivatives(
    knots: &KnotVector,
    degree: usize,
    params: &[f64],
    order: usize,
) -> Result<DMatrix<f64>> {
    knots.require_degree(degree)?;
    Ok(derivatives(knots.as_slice(), degree, params, order))
}

fn derivatives(k: &[f64], degree: usize, u: &[f64], order: usize) -> DMatrix<f64> {
    if order == 0 {
        return cox_de_boor(k, degree, u);
    }
    if order > degree {
        return DMatrix::zeros(k.len() - degree - 1, u.len());
    }
    let lower = derivatives(k, degree - 1, u, order - 1);
    differentiate(k, degree, &lower)
}

/// Combine rows of a degree-`p-1` table into the degree-`p` derivative:
/// `p/(k[i+p]-k[i]) * L_i - p/(k[i+p+1]-k[i+1]) * L_{i+1}`.
fn differentiate(k: &[f64], p: usize, lower: &DMatrix<f64>) -> DMatrix<f64> {
    let rows = lower.nrows() - 1;
    let pf = p as f64;
    let mut out = DMatrix::zeros(rows, lower.ncols());
    for i in 0..rows {
        let left = ratio(pf, k[i + p] - k[i]);
        let right = ratio(pf, k[i + p + 1] - k[i + 1]);
        for j in 0..lower.ncols() {
            out[(i, j)] = left * lower[(i, j)] - right * lower[(i + 1, j)];
        }
    }
    out
}

fn cox_de_boor(k: &[f64], degree: usize, u: &[f64]) -> DMatrix<f64> {
    let intervals = k.len() - 1;
    let last_knot = k[intervals];
    let last_span = (0..intervals).rev().find(|&i| k[i] < k[i + 1]);

    let mut n = DMatrix::from_fn(intervals, u.len(), |i, j| {
        let t = u[j];
        let inside = k[i] <= t && t < k[i + 1];
        let at_end = Some(i) == last_span && t == last_knot;
        if inside || at_end {
            1.0
        } else {
            0.0
        }
    });

    for p in 1..=degree {
        let rows = intervals - p;
        let mut next = DMatrix::zeros(rows, u.len());
        for i in 0..rows {
            let left_den = k[i + p] - k[i];
            let right_den = k[i + p + 1] - k[i + 1];
            for (j, &t) in u.iter().enumerate() {
                let left = ratio(t - k[i], left_den) * n[(i, j)];
                let right = ratio(k[i + p + 1] - t, right_den) * n[(i + 1, j)];
                next[(i, j)] = left + right;
            }
        }
        n = next;
    }

    n
}

/// `num / den`, with a zero denominator contributing nothing.
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}
