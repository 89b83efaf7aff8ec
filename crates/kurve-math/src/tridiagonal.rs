//! Tridiagonal linear systems with multiple right-hand sides.

use kurve_core::{KurveError, Result};
use nalgebra::DMatrix;

/// Solve `T x = d` for every column of `d` with the Thomas algorithm.
///
/// `T` is the n×n tridiagonal matrix with sub-diagonal `a` (length n-1),
/// diagonal `b` (length n) and super-diagonal `c` (length n-1). No pivoting
/// is performed: a zero or non-finite pivot in the forward sweep is reported
/// as [`KurveError::SingularSystem`] instead of leaking NaN into the result.
///
/// # Arguments
/// * `a` - Sub-diagonal, `a[i]` sits at row `i + 1`, column `i`
/// * `b` - Main diagonal
/// * `c` - Super-diagonal, `c[i]` sits at row `i`, column `i + 1`
/// * `d` - n×k matrix of right-hand sides
pub fn solve_tridiagonal(a: &[f64], b: &[f64], c: &[f64], d: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let n = b.len();
    let k = d.ncols();

    if d.nrows() != n {
        return Err(KurveError::config(format!(
            "right-hand side has {} rows, system has {}",
            d.nrows(),
            n
        )));
    }
    if n == 0 {
        return Ok(DMatrix::zeros(0, k));
    }
    if a.len() != n - 1 || c.len() != n - 1 {
        return Err(KurveError::config(format!(
            "off-diagonals must have length {}, got {} and {}",
            n - 1,
            a.len(),
            c.len()
        )));
    }

    // Forward sweep: modified super-diagonal and right-hand sides.
    let mut c_prime = vec![0.0; n.saturating_sub(1)];
    let mut r = DMatrix::zeros(n, k);

    let mut pivot = b[0];
    check_pivot(pivot, 0)?;
    if n > 1 {
        c_prime[0] = c[0] / pivot;
    }
    for col in 0..k {
        r[(0, col)] = d[(0, col)] / pivot;
    }

    for i in 1..n {
        pivot = b[i] - a[i - 1] * c_prime[i - 1];
        check_pivot(pivot, i)?;
        if i < n - 1 {
            c_prime[i] = c[i] / pivot;
        }
        for col in 0..k {
            r[(i, col)] = (d[(i, col)] - a[i - 1] * r[(i - 1, col)]) / pivot;
        }
    }

    // Back substitution
    for i in (0..n - 1).rev() {
        for col in 0..k {
            r[(i, col)] -= c_prime[i] * r[(i + 1, col)];
        }
    }

    Ok(r)
}

fn check_pivot(pivot: f64, row: usize) -> Result<()> {
    if pivot == 0.0 || !pivot.is_finite() {
        Err(KurveError::SingularSystem { row })
    } else {
        Ok(())
    }
}
