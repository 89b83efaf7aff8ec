//! Sampling utilities for converting curves and surfaces to discrete points.

use kurve_core::{KurveError, Result};
use kurve_math::Coords;

use crate::curve::Curve;
use crate::surface::Surface;

/// `num` evenly spaced parameters covering `domain`, both ends included.
pub fn sample_params(domain: (f64, f64), num: usize) -> Result<Vec<f64>> {
    let (lo, hi) = domain;
    if num < 2 {
        return Err(KurveError::config(format!(
            "sampling needs at least 2 parameters, got {num}"
        )));
    }
    if !(lo.is_finite() && hi.is_finite() && lo <= hi) {
        return Err(KurveError::config(format!("invalid domain [{lo}, {hi}]")));
    }
    let step = (hi - lo) / (num - 1) as f64;
    let mut params: Vec<f64> = (0..num - 1).map(|i| lo + step * i as f64).collect();
    // Exact upper end so it never falls outside the domain by rounding.
    params.push(hi);
    Ok(params)
}

/// Evaluate `curve` at `num` evenly spaced parameters over its domain.
pub fn sample_curve<C: Curve + ?Sized>(curve: &C, num: usize) -> Result<Vec<C::Point>> {
    sample_params(curve.domain(), num)?
        .into_iter()
        .map(|t| curve.point_at(t))
        .collect()
}

/// Convert a curve to a polyline using adaptive subdivision.
///
/// Segments are split while the curve midpoint deviates from the chord
/// midpoint by more than `tolerance`. Every segment is split at least
/// `MIN_DEPTH` times so symmetric arcs are not mistaken for straight lines.
pub fn curve_to_polyline<C: Curve + ?Sized>(curve: &C, tolerance: f64) -> Result<Vec<C::Point>> {
    if !(tolerance > 0.0 && tolerance.is_finite()) {
        return Err(KurveError::config(format!(
            "polyline tolerance must be positive, got {tolerance}"
        )));
    }
    let (t_min, t_max) = curve.domain();
    let mut points = vec![curve.point_at(t_min)?];
    subdivide_curve(curve, t_min, t_max, tolerance, &mut points, 0)?;
    log::trace!("polyline with {} points", points.len());
    Ok(points)
}

/// Maximum recursion depth for adaptive subdivision.
const MAX_DEPTH: u32 = 12;
const MIN_DEPTH: u32 = 2;

fn subdivide_curve<C: Curve + ?Sized>(
    curve: &C,
    t0: f64,
    t1: f64,
    tolerance: f64,
    points: &mut Vec<C::Point>,
    depth: u32,
) -> Result<()> {
    let p1 = curve.point_at(t1)?;
    if depth >= MAX_DEPTH {
        points.push(p1);
        return Ok(());
    }

    let t_mid = (t0 + t1) * 0.5;
    let p0 = curve.point_at(t0)?;
    let p_mid = curve.point_at(t_mid)?;

    let chord_mid = (p0 + p1) * 0.5;
    let deviation = p_mid.distance(chord_mid);

    if depth < MIN_DEPTH || deviation > tolerance {
        subdivide_curve(curve, t0, t_mid, tolerance, points, depth + 1)?;
        subdivide_curve(curve, t_mid, t1, tolerance, points, depth + 1)
    } else {
        points.push(p1);
        Ok(())
    }
}

/// Evaluate `surface` on a `u_num × v_num` grid over its domain. Row `i`
/// holds the points at the `i`-th u parameter.
pub fn sample_surface<S: Surface + ?Sized>(
    surface: &S,
    u_num: usize,
    v_num: usize,
) -> Result<Vec<Vec<S::Point>>> {
    let us = sample_params(surface.domain_u(), u_num)?;
    let vs = sample_params(surface.domain_v(), v_num)?;
    us.iter()
        .map(|&u| vs.iter().map(|&v| surface.point_at(u, v)).collect())
        .collect()
}
