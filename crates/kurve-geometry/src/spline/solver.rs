//! Curvature system of a piecewise-cubic interpolating spline.
//!
//! Between samples `s_i` and `s_{i+1}` the spline is the cubic Hermite blend
//! of the end values `y` and end second derivatives `M` ("curvatures").
//! Continuity of the first derivative at every interior sample gives a
//! tridiagonal system in `M`; the two end equations come from the boundary
//! condition. Everything is linear in the sample values, so the whole fit
//! reduces to a matrix `G` with `M = G · [y; pinned]` that is built once per
//! parameter set and boundary kind.

use kurve_core::{KurveError, Result};
use kurve_math::{solve_tridiagonal, Coords};
use nalgebra::{DMatrix, RowDVector};

use super::boundary::{EndKind, SplineKind};

/// `G` in `M = G · [y_0 .. y_{n-1}, v_0 .. v_{k-1}]`, where `v` are the
/// pinned slope / curvature values (start's before end's).
#[derive(Debug, Clone, PartialEq)]
pub struct CurvatureMatrix {
    matrix: DMatrix<f64>,
    kind: SplineKind,
}

impl CurvatureMatrix {
    /// The n×(n+k) matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Boundary kind actually solved for, after degenerate substitutions.
    pub fn kind(&self) -> SplineKind {
        self.kind
    }

    pub fn samples(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn pinned_count(&self) -> usize {
        self.matrix.ncols() - self.matrix.nrows()
    }

    /// Curvature at every sample for the given values and pinned values.
    pub fn apply<P: Coords>(&self, values: &[P], pinned: &[P]) -> Result<Vec<P>> {
        let n = self.samples();
        if values.len() != n || pinned.len() != self.pinned_count() {
            return Err(KurveError::config(format!(
                "curvature system expects {} values and {} pinned values, got {} and {}",
                n,
                self.pinned_count(),
                values.len(),
                pinned.len()
            )));
        }
        let curvatures = (0..n)
            .map(|i| {
                values
                    .iter()
                    .chain(pinned)
                    .enumerate()
                    .fold(P::ZERO, |acc, (j, &x)| acc + x * self.matrix[(i, j)])
            })
            .collect();
        Ok(curvatures)
    }
}

/// One boundary equation `lhs · [d_first, d_last] = rhs · y (+ v if pinned)`
/// in the two generic end slopes.
struct EndEquation {
    lhs: [f64; 2],
    rhs: RowDVector<f64>,
    pinned: bool,
}

/// Blocks of the unconstrained solve: `M = fmat · y + emat · [d_first, d_last]`.
struct OpenSystem {
    fmat: DMatrix<f64>,
    emat: DMatrix<f64>,
}

impl OpenSystem {
    /// Equation `q · M = 0` (or `= v` if pinned) for a row `q` over curvatures.
    fn curvature_equation(&self, q: &RowDVector<f64>, pinned: bool) -> EndEquation {
        let lhs = q * &self.emat;
        EndEquation {
            lhs: [lhs[0], lhs[1]],
            rhs: -(q * &self.fmat),
            pinned,
        }
    }

    fn slope_equation(&self, end: usize) -> EndEquation {
        let mut lhs = [0.0; 2];
        lhs[end] = 1.0;
        EndEquation {
            lhs,
            rhs: RowDVector::zeros(self.fmat.ncols()),
            pinned: true,
        }
    }
}

/// Build the curvature matrix for samples at `params` under `kind`.
///
/// Validation happens before any solve: fewer than two samples, non-finite or
/// non-increasing parameters, and too few samples for not-a-knot or periodic
/// conditions are configuration errors.
pub fn curvature_matrix(params: &[f64], kind: SplineKind) -> Result<CurvatureMatrix> {
    validate_params(params)?;
    let n = params.len();
    if n < kind.min_samples() {
        return Err(KurveError::config(format!(
            "{kind} spline needs at least {} samples, got {n}",
            kind.min_samples()
        )));
    }
    let kind = resolve_degenerate(kind, n);
    log::debug!("building {kind} curvature system for {n} samples");

    let h: Vec<f64> = params.windows(2).map(|w| w[1] - w[0]).collect();
    let system = open_system(&h)?;

    let [first, second] = match kind {
        SplineKind::Open(start, end) => [
            end_equation(&system, &h, start, Side::Start),
            end_equation(&system, &h, end, Side::End),
        ],
        SplineKind::Periodic => {
            let slopes = EndEquation {
                lhs: [1.0, -1.0],
                rhs: RowDVector::zeros(n),
                pinned: false,
            };
            let mut q = RowDVector::zeros(n);
            q[0] = 1.0;
            q[n - 1] = -1.0;
            [slopes, system.curvature_equation(&q, false)]
        }
    };

    let pinned = usize::from(first.pinned) + usize::from(second.pinned);
    let mut rhs = DMatrix::zeros(2, n + pinned);
    let mut col = n;
    for (r, eq) in [&first, &second].into_iter().enumerate() {
        rhs.view_mut((r, 0), (1, n)).copy_from(&eq.rhs);
        if eq.pinned {
            rhs[(r, col)] = 1.0;
            col += 1;
        }
    }

    let zmat = solve_2x2([first.lhs, second.lhs], &rhs)?;

    let mut matrix = DMatrix::zeros(n, n + pinned);
    matrix.columns_mut(0, n).copy_from(&system.fmat);
    matrix += &system.emat * zmat;

    Ok(CurvatureMatrix { matrix, kind })
}

#[derive(Clone, Copy)]
enum Side {
    Start,
    End,
}

pub(crate) fn validate_params(params: &[f64]) -> Result<()> {
    if params.len() < 2 {
        return Err(KurveError::config(format!(
            "spline needs at least 2 samples, got {}",
            params.len()
        )));
    }
    if let Some(s) = params.iter().find(|s| !s.is_finite()) {
        return Err(KurveError::config(format!("sample parameter {s} is not finite")));
    }
    if let Some(i) = params.windows(2).position(|w| w[1] <= w[0]) {
        return Err(KurveError::config(format!(
            "sample parameters must be strictly increasing: s[{i}] = {} >= s[{}] = {}",
            params[i],
            i + 1,
            params[i + 1]
        )));
    }
    Ok(())
}

/// Fixed substitutions for sample counts where the general end equations
/// become degenerate:
/// - 2 samples, quadratic at both ends: the two equations coincide, so both
///   ends become natural. A single quadratic end is kept and makes the
///   curvature constant.
/// - 3 samples, not-a-knot at both ends: both equations constrain the same
///   knot, so the end becomes quadratic, giving the parabola through all three
///   samples.
fn resolve_degenerate(kind: SplineKind, n: usize) -> SplineKind {
    let resolved = match (kind, n) {
        (SplineKind::Open(EndKind::Quadratic, EndKind::Quadratic), 2) => {
            SplineKind::Open(EndKind::Natural, EndKind::Natural)
        }
        (SplineKind::Open(EndKind::NotAKnot, EndKind::NotAKnot), 3) => {
            SplineKind::Open(EndKind::NotAKnot, EndKind::Quadratic)
        }
        _ => kind,
    };
    if resolved != kind {
        log::debug!("{kind} with {n} samples solved as {resolved}");
    }
    resolved
}

/// Solve the tridiagonal first-derivative continuity system with the two end
/// slopes left as extra unknown columns.
fn open_system(h: &[f64]) -> Result<OpenSystem> {
    let n = h.len() + 1;
    let mut diag = vec![0.0; n];
    let mut off = Vec::with_capacity(n - 1);
    let mut d = DMatrix::zeros(n, n + 2);

    for (i, &hi) in h.iter().enumerate() {
        diag[i] += hi / 3.0;
        diag[i + 1] += hi / 3.0;
        off.push(hi / 6.0);

        // Slope of the chord of piece i enters row i with +, row i+1 with -.
        let inv = 1.0 / hi;
        d[(i, i + 1)] += inv;
        d[(i, i)] -= inv;
        d[(i + 1, i + 1)] -= inv;
        d[(i + 1, i)] += inv;
    }
    d[(0, n)] = -1.0;
    d[(n - 1, n + 1)] = 1.0;

    let gmat = solve_tridiagonal(&off, &diag, &off, &d)?;
    Ok(OpenSystem {
        fmat: gmat.columns(0, n).into_owned(),
        emat: gmat.columns(n, 2).into_owned(),
    })
}

fn end_equation(system: &OpenSystem, h: &[f64], kind: EndKind, side: Side) -> EndEquation {
    let n = h.len() + 1;
    // Curvature index and knot spacing counted inward from this end.
    let idx = |k: usize| match side {
        Side::Start => k,
        Side::End => n - 1 - k,
    };
    let step = |k: usize| match side {
        Side::Start => h[k],
        Side::End => h[n - 2 - k],
    };
    let slope = match side {
        Side::Start => 0,
        Side::End => 1,
    };

    let mut q = RowDVector::zeros(n);
    match kind {
        EndKind::Slope => return system.slope_equation(slope),
        EndKind::Curvature | EndKind::Natural => {
            q[idx(0)] = 1.0;
        }
        EndKind::Quadratic => {
            q[idx(0)] = 1.0;
            q[idx(1)] = -1.0;
        }
        EndKind::NotAKnot => {
            // (M_1 - M_0) / h_0 = (M_2 - M_1) / h_1, mirrored at the end.
            let (h0, h1) = (step(0), step(1));
            q[idx(0)] = -1.0 / h0;
            q[idx(1)] = 1.0 / h0 + 1.0 / h1;
            q[idx(2)] = -1.0 / h1;
        }
    }
    system.curvature_equation(&q, kind == EndKind::Curvature)
}

/// Solve the 2×2 boundary system for every column of `rhs`.
fn solve_2x2(lhs: [[f64; 2]; 2], rhs: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let [[a, b], [c, d]] = lhs;
    let det = a * d - b * c;
    let scale = (a * d).abs().max((b * c).abs());
    if det == 0.0 || !det.is_finite() || det.abs() <= 1e-13 * scale {
        return Err(KurveError::SingularSystem { row: 1 });
    }
    let mut out = DMatrix::zeros(2, rhs.ncols());
    for j in 0..rhs.ncols() {
        let (r0, r1) = (rhs[(0, j)], rhs[(1, j)]);
        out[(0, j)] = (d * r0 - b * r1) / det;
        out[(1, j)] = (a * r1 - c * r0) / det;
    }
    Ok(out)
}
