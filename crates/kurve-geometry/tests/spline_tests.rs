use approx::assert_abs_diff_eq;
use kurve_geometry::spline::{BoundaryCondition, CubicSpline, EndCondition};
use kurve_math::{Coords, DVec2, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::TAU;

fn random_params(rng: &mut StdRng, n: usize) -> Vec<f64> {
    let mut s = rng.random_range(-2.0..2.0);
    (0..n)
        .map(|_| {
            let current = s;
            s += rng.random_range(0.1..1.5);
            current
        })
        .collect()
}

fn all_conditions() -> Vec<BoundaryCondition<f64>> {
    vec![
        BoundaryCondition::natural(),
        BoundaryCondition::not_a_knot(),
        BoundaryCondition::both(EndCondition::Quadratic),
        BoundaryCondition::clamped(0.5, -1.0),
        BoundaryCondition::Open {
            start: EndCondition::Curvature(2.0),
            end: EndCondition::NotAKnot,
        },
        BoundaryCondition::Open {
            start: EndCondition::Quadratic,
            end: EndCondition::Slope(3.0),
        },
    ]
}

/// Left and right limits of (value, first, second) derivatives at each
/// interior sample.
fn assert_c2<P: Coords>(spline: &CubicSpline<P>) {
    let pieces = spline.pieces().unwrap();
    for pair in pieces.windows(2) {
        let (left, right) = (&pair[0], &pair[1]);
        let s = left.end;
        assert!(left.point_at(s).distance(right.point_at(s)) < 1e-9);
        assert!(
            left.first_derivative_at(s)
                .distance(right.first_derivative_at(s))
                < 1e-9
        );
        assert!(
            left.second_derivative_at(s)
                .distance(right.second_derivative_at(s))
                < 1e-9
        );
    }
}

#[test]
fn test_interpolation_and_continuity_random_samples() {
    let mut rng = StdRng::seed_from_u64(17);
    for n in [3, 4, 5, 8, 20] {
        let params = random_params(&mut rng, n);
        let values: Vec<f64> = (0..n).map(|_| rng.random_range(-5.0..5.0)).collect();
        for bc in all_conditions() {
            let spline = CubicSpline::new(params.clone(), values.clone(), bc).unwrap();
            for (&s, &y) in params.iter().zip(&values) {
                assert_abs_diff_eq!(spline.point_at(s).unwrap(), y, epsilon = 1e-12);
            }
            assert_c2(&spline);
        }
    }
}

#[test]
fn test_end_conditions_hold() {
    let mut rng = StdRng::seed_from_u64(5);
    let params = random_params(&mut rng, 7);
    let values: Vec<f64> = (0..7).map(|_| rng.random_range(-1.0..1.0)).collect();
    let (lo, hi) = (params[0], params[6]);

    let natural = CubicSpline::new(params.clone(), values.clone(), BoundaryCondition::natural()).unwrap();
    assert_abs_diff_eq!(natural.second_derivative_at(lo).unwrap(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(natural.second_derivative_at(hi).unwrap(), 0.0, epsilon = 1e-9);

    let clamped = CubicSpline::new(params.clone(), values.clone(), BoundaryCondition::clamped(0.5, -1.0))
        .unwrap();
    assert_abs_diff_eq!(clamped.first_derivative_at(lo).unwrap(), 0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(clamped.first_derivative_at(hi).unwrap(), -1.0, epsilon = 1e-9);

    let bc = BoundaryCondition::Open {
        start: EndCondition::Curvature(2.0),
        end: EndCondition::Curvature(-3.0),
    };
    let pinned = CubicSpline::new(params.clone(), values.clone(), bc).unwrap();
    assert_abs_diff_eq!(pinned.second_derivative_at(lo).unwrap(), 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(pinned.second_derivative_at(hi).unwrap(), -3.0, epsilon = 1e-9);

    let quadratic =
        CubicSpline::new(params.clone(), values.clone(), BoundaryCondition::both(EndCondition::Quadratic))
            .unwrap();
    let m = quadratic.curvatures().unwrap();
    assert_abs_diff_eq!(m[0], m[1], epsilon = 1e-9);
    assert_abs_diff_eq!(m[5], m[6], epsilon = 1e-9);

    let nak = CubicSpline::new(params, values, BoundaryCondition::not_a_knot()).unwrap();
    let pieces = nak.pieces().unwrap();
    assert_abs_diff_eq!(pieces[0].third_derivative(), pieces[1].third_derivative(), epsilon = 1e-9);
    assert_abs_diff_eq!(pieces[4].third_derivative(), pieces[5].third_derivative(), epsilon = 1e-9);
}

#[test]
fn test_not_a_knot_reproduces_cubic() {
    let f = |s: f64| 0.5 * s * s * s - s * s + 2.0 * s - 1.0;
    let params = vec![-1.0, -0.2, 0.5, 1.7, 2.0, 3.1];
    let values = params.iter().map(|&s| f(s)).collect();
    let spline = CubicSpline::new(params, values, BoundaryCondition::not_a_knot()).unwrap();
    for i in 0..=40 {
        let s = -1.0 + 4.1 * i as f64 / 40.0;
        assert_abs_diff_eq!(spline.point_at(s).unwrap(), f(s), epsilon = 1e-9);
    }
    assert_abs_diff_eq!(spline.third_derivative_at(0.0).unwrap(), 3.0, epsilon = 1e-8);
}

#[test]
fn test_periodic_closure() {
    let n = 9;
    let params: Vec<f64> = (0..n).map(|i| i as f64 * 0.75).collect();
    let mut values: Vec<DVec2> = (0..n)
        .map(|i| DVec2::new((i as f64).cos() * 2.0, (i as f64 * 1.3).sin()))
        .collect();
    values[n - 1] = values[0];
    let spline = CubicSpline::new(params, values, BoundaryCondition::Periodic).unwrap();
    let (lo, hi) = spline.domain();
    assert!(spline.point_at(lo).unwrap().distance(spline.point_at(hi).unwrap()) < 1e-9);
    assert!(
        spline
            .first_derivative_at(lo)
            .unwrap()
            .distance(spline.first_derivative_at(hi).unwrap())
            < 1e-9
    );
    assert!(
        spline
            .second_derivative_at(lo)
            .unwrap()
            .distance(spline.second_derivative_at(hi).unwrap())
            < 1e-9
    );
    assert_c2(&spline);
}

#[test]
fn test_derivatives_match_central_differences() {
    let params = vec![0.0, 0.4, 1.1, 1.5, 2.6, 3.0];
    let values: Vec<DVec3> = params
        .iter()
        .map(|&s: &f64| DVec3::new(s.cos(), s.sin(), 0.3 * s))
        .collect();
    let spline = CubicSpline::new(params, values, BoundaryCondition::not_a_knot()).unwrap();
    let h = 1e-4;
    for &s in &[0.2, 0.7, 1.3, 2.0, 2.8] {
        let fd1 = (spline.point_at(s + h).unwrap() - spline.point_at(s - h).unwrap()) / (2.0 * h);
        assert_abs_diff_eq!(spline.first_derivative_at(s).unwrap(), fd1, epsilon = 1e-5);
        let fd2 = (spline.first_derivative_at(s + h).unwrap()
            - spline.first_derivative_at(s - h).unwrap())
            / (2.0 * h);
        assert_abs_diff_eq!(spline.second_derivative_at(s).unwrap(), fd2, epsilon = 1e-5);
    }
}

#[test]
fn test_vector_spline_matches_componentwise() {
    let params = vec![0.0, 0.3, 1.0, 1.6, 2.0];
    let points = vec![
        DVec3::new(0.0, 1.0, -1.0),
        DVec3::new(0.5, 0.2, 0.0),
        DVec3::new(1.0, -0.4, 2.0),
        DVec3::new(0.7, 0.9, 1.0),
        DVec3::new(0.1, 1.5, 0.5),
    ];
    let bc = BoundaryCondition::Open {
        start: EndCondition::Slope(DVec3::new(1.0, 0.0, -1.0)),
        end: EndCondition::Natural,
    };
    let spline = CubicSpline::new(params.clone(), points.clone(), bc).unwrap();
    let component = |k: usize, slope: f64| {
        let values = points.iter().map(|p| p[k]).collect();
        let bc = BoundaryCondition::Open {
            start: EndCondition::Slope(slope),
            end: EndCondition::Natural,
        };
        CubicSpline::new(params.clone(), values, bc).unwrap()
    };
    let splines = [component(0, 1.0), component(1, 0.0), component(2, -1.0)];
    for i in 0..=20 {
        let s = 2.0 * i as f64 / 20.0;
        let p = spline.point_at(s).unwrap();
        for (k, c) in splines.iter().enumerate() {
            assert_abs_diff_eq!(p[k], c.point_at(s).unwrap(), epsilon = 1e-12);
        }
    }
}

#[test]
fn test_periodic_circle_curvature() {
    let n = 65;
    let params: Vec<f64> = (0..n).map(|i| TAU * i as f64 / (n - 1) as f64).collect();
    let mut points: Vec<DVec2> = params.iter().map(|&t| DVec2::new(t.cos(), t.sin())).collect();
    points[n - 1] = points[0];
    let spline = CubicSpline::new(params, points, BoundaryCondition::Periodic).unwrap();
    for i in 0..50 {
        let t = TAU * (i as f64 + 0.37) / 50.0;
        assert_abs_diff_eq!(spline.point_at(t).unwrap().length(), 1.0, epsilon = 1e-5);
        // Counter-clockwise, so the signed curvature is positive.
        assert_abs_diff_eq!(spline.curvature_at(t).unwrap(), 1.0, epsilon = 1e-2);
        assert_abs_diff_eq!(spline.radius_of_curvature_at(t).unwrap(), 1.0, epsilon = 1e-2);
    }
}

#[test]
fn test_boundary_condition_from_text() {
    let params = vec![0.0, 1.0, 2.0, 3.0];
    let values = vec![0.0, 1.0, 0.0, 1.0];
    for name in ["natural", "not-a-knot", "quadratic"] {
        let bc: BoundaryCondition<f64> = name.parse().unwrap();
        let spline = CubicSpline::new(params.clone(), values.clone(), bc).unwrap();
        assert_abs_diff_eq!(spline.point_at(2.0).unwrap(), 0.0, epsilon = 1e-12);
    }
    assert!("bogus".parse::<BoundaryCondition<f64>>().is_err());
}

#[test]
fn test_two_sample_splines_are_linear() {
    for bc in [
        BoundaryCondition::natural(),
        BoundaryCondition::both(EndCondition::Quadratic),
    ] {
        let spline = CubicSpline::new(vec![1.0, 3.0], vec![2.0, 6.0], bc).unwrap();
        assert_abs_diff_eq!(spline.point_at(2.0).unwrap(), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.first_derivative_at(1.5).unwrap(), 2.0, epsilon = 1e-12);
    }
}
