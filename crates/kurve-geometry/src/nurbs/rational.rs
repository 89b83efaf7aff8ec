//! Weighted (rational) combination of basis functions and control points.
//!
//! A NURBS point is `A(u) / w(u)` with `A = Σ N_i w_i P_i` and
//! `w = Σ N_i w_i`. The helpers here form those sums from basis matrix
//! columns and apply the quotient rule for derivatives.

use kurve_math::Coords;
use nalgebra::DMatrix;

/// Homogeneous value `(A, w)`, or one of its parameter derivatives.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Homogeneous<P> {
    pub point: P,
    pub weight: f64,
}

impl<P: Coords> Homogeneous<P> {
    /// Column `col` of `basis` applied to weighted points and weights.
    pub fn from_column(basis: &DMatrix<f64>, col: usize, weighted: &[P], weights: &[f64]) -> Self {
        let mut point = P::ZERO;
        let mut weight = 0.0;
        for (i, (&wp, &w)) in weighted.iter().zip(weights).enumerate() {
            let n = basis[(i, col)];
            if n != 0.0 {
                point += wp * n;
                weight += w * n;
            }
        }
        Self { point, weight }
    }

    /// Tensor product of a u-column and a v-column over a control grid.
    pub fn from_grid(
        basis_u: &DMatrix<f64>,
        col_u: usize,
        basis_v: &DMatrix<f64>,
        col_v: usize,
        weighted: &[Vec<P>],
        weights: &[Vec<f64>],
    ) -> Self {
        let mut point = P::ZERO;
        let mut weight = 0.0;
        for (i, (row_p, row_w)) in weighted.iter().zip(weights).enumerate() {
            let nu = basis_u[(i, col_u)];
            if nu == 0.0 {
                continue;
            }
            for (j, (&wp, &w)) in row_p.iter().zip(row_w).enumerate() {
                let n = nu * basis_v[(j, col_v)];
                point += wp * n;
                weight += w * n;
            }
        }
        Self { point, weight }
    }
}

/// Plain weighted sum `Σ N_i P_i` for the non-rational path.
pub(crate) fn combine<P: Coords>(basis: &DMatrix<f64>, col: usize, points: &[P]) -> P {
    let mut acc = P::ZERO;
    for (i, &p) in points.iter().enumerate() {
        let n = basis[(i, col)];
        if n != 0.0 {
            acc += p * n;
        }
    }
    acc
}

/// Tensor-product weighted sum `Σ Σ N_i M_j P_ij` for the non-rational path.
pub(crate) fn combine_grid<P: Coords>(
    basis_u: &DMatrix<f64>,
    col_u: usize,
    basis_v: &DMatrix<f64>,
    col_v: usize,
    grid: &[Vec<P>],
) -> P {
    let mut acc = P::ZERO;
    for (i, row) in grid.iter().enumerate() {
        let nu = basis_u[(i, col_u)];
        if nu == 0.0 {
            continue;
        }
        for (j, &p) in row.iter().enumerate() {
            acc += p * (nu * basis_v[(j, col_v)]);
        }
    }
    acc
}

/// `C = A / w`. A vanishing weight sum (parameters outside the support of
/// every basis function) leaves the numerator unchanged.
pub(crate) fn point<P: Coords>(h: Homogeneous<P>) -> P {
    if h.weight.abs() < 1e-15 {
        h.point
    } else {
        h.point / h.weight
    }
}

/// `C' = (A' - w' C) / w`.
pub(crate) fn first_derivative<P: Coords>(h: Homogeneous<P>, d: Homogeneous<P>) -> P {
    if h.weight.abs() < 1e-15 {
        return d.point;
    }
    let c = h.point / h.weight;
    (d.point - c * d.weight) / h.weight
}

/// `C'' = (A'' - 2 w' C' - w'' C) / w`.
pub(crate) fn second_derivative<P: Coords>(
    h: Homogeneous<P>,
    d: Homogeneous<P>,
    d2: Homogeneous<P>,
) -> P {
    if h.weight.abs() < 1e-15 {
        return d2.point;
    }
    let c = h.point / h.weight;
    let c1 = (d.point - c * d.weight) / h.weight;
    (d2.point - c1 * (2.0 * d.weight) - c * d2.weight) / h.weight
}
