//! End-to-end exploration: build a space, bind it, drive a plain gradient
//! descent through the least-squares contract and commit the result.

use cpspace_config::ExplorationConfig;
use cpspace_core::functor::Anchor;
use cpspace_core::{
    ConstrainedParameterSpace, ConstraintParams, LayerId, Point3, PointId, PointParams,
};
use cpspace_solver::{forward_difference_jacobian, ExplorationSolver, LeastSquaresProblem};
use cpspace_test::palette::{GRAY_RAMP, PRIMARIES};
use cpspace_test::{fixture_registry, two_layer_palette, Euclidean};

/// Primaries anchored where they start, chained by Euclidean constraints.
fn anchored_palette() -> (ConstrainedParameterSpace<Point3>, Vec<PointId>) {
    let mut cps = ConstrainedParameterSpace::new(2);
    let mut points = cps
        .add_parametric_points(
            LayerId(0),
            GRAY_RAMP
                .iter()
                .map(|&v| PointParams::new(Point3::new(v)))
                .collect(),
        )
        .unwrap();
    points.extend(
        cps.add_parametric_points(
            LayerId(1),
            PRIMARIES
                .iter()
                .map(|&v| {
                    PointParams::new(Point3::new(v))
                        .with_unary(Anchor::new(Euclidean::new(), Point3::new(v)))
                })
                .collect(),
        )
        .unwrap(),
    );
    cps.add_constraints(vec![
        ConstraintParams::new(points[3], points[4]).with_functor(Euclidean::new()),
        ConstraintParams::new(points[4], points[5]).with_functor(Euclidean::new()),
    ])
    .unwrap();
    (cps, points)
}

/// Steps along `-J^T r` and returns the costs before and after.
fn descend<L>(problem: &mut L, vars: &mut [f64], epsilon: f64, steps: usize) -> (f64, f64)
where
    L: LeastSquaresProblem<Scalar = f64>,
{
    let (m, n) = (problem.residual_dim(), problem.variable_dim());
    let mut r = vec![0.0; m];
    let mut jacobian = vec![0.0; m * n];
    let cost = |r: &[f64]| 0.5 * r.iter().map(|x| x * x).sum::<f64>();

    problem.residuals(vars, &mut r);
    let initial = cost(&r);
    for _ in 0..steps {
        forward_difference_jacobian(problem, vars, epsilon, &mut jacobian);
        for k in 0..n {
            let gradient: f64 = (0..m).map(|i| jacobian[i * n + k] * r[i]).sum();
            vars[k] -= 0.2 * gradient;
        }
        problem.residuals(vars, &mut r);
    }
    (initial, cost(&r))
}

#[test]
fn test_descent_restores_perturbed_point() {
    let (cps, points) = anchored_palette();
    let mut solver = ExplorationSolver::new(cps);
    let mut config = ExplorationConfig::new().with_locked_indices(vec![2]);
    config.out_of_gamut_weight = 0.0;
    solver.apply_config(config).unwrap();
    solver.setup().unwrap();
    solver.init_constraints_internals().unwrap();

    solver
        .cps()
        .set_parametric_point_value(points[3], &Point3::new([0.6, 0.2, 0.1]));
    let mut vars = vec![0.0; solver.variable_count()];
    solver.update_variables_from_graph(&mut vars).unwrap();

    let epsilon = solver.config().finite_difference_epsilon;
    let (initial, last) = descend(&mut solver, &mut vars, epsilon, 300);
    assert!(initial > 0.1);
    assert!(last < initial * 1e-2, "cost went from {initial} to {last}");

    solver.update_graph_from_variables(&vars).unwrap();
    let restored = solver.cps().get_parametric_point_value(points[3]);
    for (x, y) in restored.coords.iter().zip(&PRIMARIES[0]) {
        assert!((x - y).abs() < 0.05);
    }
    // locked and untouched
    assert_eq!(
        solver.cps().get_parametric_point_value(points[5]).coords,
        PRIMARIES[2]
    );
    assert_eq!(
        solver.cps().get_parametric_point_value(points[0]).coords,
        GRAY_RAMP[0]
    );
}

#[test]
fn test_restored_snapshot_binds_identically() {
    let palette = two_layer_palette();
    let json = serde_json::to_string(&palette.cps.snapshot()).unwrap();
    let snapshot = serde_json::from_str(&json).unwrap();
    let restored = ConstrainedParameterSpace::from_snapshot(snapshot, &fixture_registry()).unwrap();

    let mut original = ExplorationSolver::new(palette.cps);
    let mut copy = ExplorationSolver::new(restored);
    assert_eq!(original.setup().unwrap(), copy.setup().unwrap());
    assert_eq!(original.movable_points(), copy.movable_points());

    original.init_constraints_internals().unwrap();
    copy.init_constraints_internals().unwrap();
    let mut vars = vec![0.0; original.variable_count()];
    original.update_variables_from_graph(&mut vars).unwrap();
    vars[1] = 0.4;

    let mut a = vec![0.0; original.layout().len()];
    let mut b = vec![0.0; copy.layout().len()];
    original.evaluate(&vars, &mut a);
    copy.evaluate(&vars, &mut b);
    assert_eq!(a, b);
}

#[test]
fn test_evaluation_alongside_value_writes() {
    let palette = two_layer_palette();
    let mut solver = ExplorationSolver::new(palette.cps);
    solver.lock_parametric_points(&[palette.points[3]]).unwrap();
    solver.setup().unwrap();
    solver.init_constraints_internals().unwrap();
    let mut vars = vec![0.0; solver.variable_count()];
    solver.update_variables_from_graph(&mut vars).unwrap();

    let target = Point3::new([0.0, 1.0, 0.0]);
    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..=100 {
                let x = 1.0 - f64::from(i) / 100.0;
                let y = f64::from(i) / 100.0;
                solver
                    .cps()
                    .set_parametric_point_value(palette.points[3], &Point3::new([x, y, 0.0]));
            }
        });
        scope.spawn(|| {
            let mut out = vec![0.0; solver.layout().len()];
            for _ in 0..100 {
                solver.evaluate(&vars, &mut out);
                assert!(out.iter().all(|r| r.is_finite()));
            }
        });
    });

    assert_eq!(
        solver.cps().get_parametric_point_value(palette.points[3]),
        target
    );
    let mut out = vec![0.0; solver.layout().len()];
    solver.evaluate(&vars, &mut out);
    assert!((out[0] + 2f64.sqrt()).abs() < 1e-12);
}
