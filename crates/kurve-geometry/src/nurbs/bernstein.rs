//! Bernstein polynomials, the basis of Bézier curves.
//!
//! Shapes follow [`super::basis`]: one row per polynomial `B_{i,n}`,
//! `i = 0..=n`, one column per parameter.

use nalgebra::DMatrix;

/// `B_{i,n}(t) = C(n, i) t^i (1 - t)^(n - i)`.
pub fn bernstein_polynomials(degree: usize, params: &[f64]) -> DMatrix<f64> {
    evaluate(degree, params, |n, i, t| {
        binomial(n, i) * term(t, i as i32, (n - i) as i32)
    })
}

/// First derivatives of [`bernstein_polynomials`].
pub fn bernstein_first_derivatives(degree: usize, params: &[f64]) -> DMatrix<f64> {
    evaluate(degree, params, |n, i, t| {
        let (i, m) = (i as i32, (n - i) as i32);
        // i t^(i-1) (1-t)^m - m t^i (1-t)^(m-1)
        let d = scaled_term(i, t, i - 1, m) - scaled_term(m, t, i, m - 1);
        binomial(n, i as usize) * d
    })
}

/// Second derivatives of [`bernstein_polynomials`].
pub fn bernstein_second_derivatives(degree: usize, params: &[f64]) -> DMatrix<f64> {
    evaluate(degree, params, |n, i, t| {
        let (i, m) = (i as i32, (n - i) as i32);
        let d = scaled_term(i * (i - 1), t, i - 2, m) - scaled_term(2 * i * m, t, i - 1, m - 1)
            + scaled_term(m * (m - 1), t, i, m - 2);
        binomial(n, i as usize) * d
    })
}

fn evaluate<F>(degree: usize, params: &[f64], f: F) -> DMatrix<f64>
where
    F: Fn(usize, usize, f64) -> f64,
{
    DMatrix::from_fn(degree + 1, params.len(), |i, j| f(degree, i, params[j]))
}

/// `coeff * t^a * (1-t)^b`, exactly zero when `coeff` is zero so negative
/// exponents are never evaluated.
fn scaled_term(coeff: i32, t: f64, a: i32, b: i32) -> f64 {
    if coeff == 0 {
        0.0
    } else {
        coeff as f64 * term(t, a, b)
    }
}

fn term(t: f64, a: i32, b: i32) -> f64 {
    t.powi(a) * (1.0 - t).powi(b)
}

/// Binomial coefficient `C(n, k)` as a float.
pub fn binomial(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    (0..k).fold(1.0, |acc, j| acc * (n - j) as f64 / (j + 1) as f64)
}
