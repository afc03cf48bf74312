//! Tests for the constrained parameter space.

use super::*;
use crate::functor::{
    Anchor, BinaryFunctor, BoxedBinary, BoxedNary, FunctorKind, FunctorRecord, FunctorRegistry,
    NaryAnchor, NaryFunctor,
};
use crate::point::Point3;

// ============================================================================
// Local functors
// ============================================================================

/// Sum of absolute channel differences.
#[derive(Debug, Clone)]
struct Manhattan {
    weight: f64,
}

impl Manhattan {
    const KIND: FunctorKind = FunctorKind::new("manhattan");

    fn new() -> Self {
        Self { weight: 1.0 }
    }
}

impl BinaryFunctor<Point3> for Manhattan {
    fn kind(&self) -> FunctorKind {
        Self::KIND
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    fn eval(&self, a: &Point3, b: &Point3, _t: f64) -> f64 {
        a.coords
            .iter()
            .zip(&b.coords)
            .map(|(x, y)| (x - y).abs())
            .sum()
    }

    fn clone_boxed(&self) -> BoxedBinary<Point3> {
        Box::new(self.clone())
    }
}

/// Number of points in the range.
#[derive(Debug, Clone)]
struct Population {
    weight: f64,
    point_weights: Vec<f64>,
}

impl Population {
    const KIND: FunctorKind = FunctorKind::new("population");

    fn new() -> Self {
        Self {
            weight: 1.0,
            point_weights: Vec::new(),
        }
    }
}

impl NaryFunctor<Point3> for Population {
    fn kind(&self) -> FunctorKind {
        Self::KIND
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    fn point_weights(&self) -> &[f64] {
        &self.point_weights
    }

    fn set_point_weights(&mut self, weights: Vec<f64>) {
        self.point_weights = weights;
    }

    fn eval(&self, points: &[Point3], _t: f64) -> f64 {
        points.len() as f64
    }

    fn clone_boxed(&self) -> BoxedNary<Point3> {
        Box::new(self.clone())
    }
}

fn registry() -> FunctorRegistry<Point3> {
    let mut registry = FunctorRegistry::with_builtins();
    registry.register_binary(Manhattan::KIND.name(), |_, _| Ok(Box::new(Manhattan::new())));
    registry.register_nary(Population::KIND.name(), |_, _| Ok(Box::new(Population::new())));
    registry
}

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new([x, y, z])
}

fn points(values: &[[f64; 3]]) -> Vec<PointParams<Point3>> {
    values
        .iter()
        .map(|&v| PointParams::new(Point3::new(v)))
        .collect()
}

struct Palette {
    cps: ConstrainedParameterSpace<Point3>,
    ids: Vec<PointId>,
    pairings: Vec<PairingId>,
    constraints: Vec<ConstraintId>,
}

/// Two layers of three points, paired index by index, chained by constraints.
fn palette() -> Palette {
    let mut cps = ConstrainedParameterSpace::new(2);
    let mut ids = cps
        .add_parametric_points(
            LayerId(0),
            points(&[[0.0, 0.0, 0.0], [0.5, 0.5, 0.5], [1.0, 1.0, 1.0]]),
        )
        .unwrap();
    ids.extend(
        cps.add_parametric_points(
            LayerId(1),
            points(&[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]),
        )
        .unwrap(),
    );
    let pairings = cps
        .add_pairings(&[
            PairingParams::new(ids[0], ids[3]),
            PairingParams::new(ids[1], ids[4]),
            PairingParams::new(ids[2], ids[5]),
        ])
        .unwrap();
    let constraints = cps
        .add_constraints(vec![
            ConstraintParams::new(ids[0], ids[1]).with_functor(Manhattan::new()),
            ConstraintParams::new(ids[1], ids[2]).with_functor(Manhattan::new()),
            ConstraintParams::new(ids[3], ids[4]).with_functor(Manhattan::new()),
            ConstraintParams::new(ids[4], ids[5]).with_functor(Manhattan::new()),
        ])
        .unwrap();
    Palette {
        cps,
        ids,
        pairings,
        constraints,
    }
}

// ============================================================================
// Two-layer palette scenario
// ============================================================================

#[test]
fn test_palette_counts() {
    let Palette { mut cps, ids, .. } = palette();

    assert_eq!(cps.all_parametric_points_count(), 6);
    assert_eq!(cps.layer_parametric_points_count(LayerId(0)), 3);
    assert_eq!(cps.layer_parametric_points_count(LayerId(1)), 3);
    assert_eq!(cps.all_pairings_count(), 3);
    assert_eq!(cps.layer_constraints_count(LayerId(0)), 2);
    assert_eq!(cps.layer_constraints_count(LayerId(1)), 2);

    cps.add_global_constraints(LayerId(0), vec![GlobalConstraintParams::new(Population::new())])
        .unwrap();
    cps.add_global_constraints(LayerId(1), vec![GlobalConstraintParams::new(Population::new())])
        .unwrap();
    assert_eq!(cps.all_global_constraints_count(), 2);

    let err = cps
        .add_parametric_points(LayerId(2), points(&[[0.0, 0.0, 0.0]]))
        .unwrap_err();
    assert!(matches!(err, CpsError::BadArg(_)));
    assert_eq!(cps.all_parametric_points_count(), 6);
    assert_eq!(ids, (0..6).map(PointId).collect::<Vec<_>>());
}

#[test]
fn test_per_layer_counts_sum_to_totals() {
    let Palette { mut cps, .. } = palette();
    cps.add_global_constraints(LayerId::INVALID, vec![GlobalConstraintParams::new(Population::new())])
        .unwrap();

    let layers = [LayerId(0), LayerId(1)];
    let sum = |f: &dyn Fn(LayerId) -> usize| layers.iter().map(|&l| f(l)).sum::<usize>();
    assert_eq!(
        sum(&|l| cps.layer_parametric_points_count(l)),
        cps.all_parametric_points_count()
    );
    assert_eq!(sum(&|l| cps.layer_pairings_count(l)), cps.all_pairings_count());
    assert_eq!(
        sum(&|l| cps.layer_constraints_count(l)),
        cps.all_constraints_count()
    );
    assert_eq!(
        sum(&|l| cps.layer_global_constraints_count(l)),
        cps.all_global_constraints_count()
    );
    assert_eq!(
        sum(&|l| cps.layer_binary_functors_count(l)),
        cps.all_binary_functors_count()
    );
}

#[test]
fn test_returned_ids_are_valid() {
    let Palette {
        mut cps,
        ids,
        pairings,
        constraints,
    } = palette();
    let globals = cps
        .add_global_constraints(LayerId(1), vec![GlobalConstraintParams::new(Population::new())])
        .unwrap();

    assert!(ids.iter().all(|&id| cps.has_parametric_point(id)));
    assert!(pairings.iter().all(|&id| cps.has_pairing(id)));
    assert!(constraints.iter().all(|&id| cps.has_constraint(id)));
    assert!(globals.iter().all(|&id| cps.has_global_constraint(id)));

    assert!(!cps.has_parametric_point(PointId::INVALID));
    assert!(!cps.has_pairing(PairingId::INVALID));
    assert!(!cps.has_constraint(ConstraintId::INVALID));
    assert!(!cps.has_global_constraint(GlobalConstraintId::INVALID));
}

// ============================================================================
// Batch validation
// ============================================================================

#[test]
fn test_empty_batches_are_rejected() {
    let Palette { mut cps, .. } = palette();
    assert!(matches!(
        cps.add_parametric_points(LayerId(0), Vec::new()),
        Err(CpsError::BadArg(_))
    ));
    assert!(matches!(cps.add_pairings(&[]), Err(CpsError::BadArg(_))));
    assert!(matches!(cps.add_constraints(Vec::new()), Err(CpsError::BadArg(_))));
    assert!(matches!(
        cps.add_global_constraints(LayerId(0), Vec::new()),
        Err(CpsError::BadArg(_))
    ));
}

#[test]
fn test_invalid_layer_leaves_no_trace() {
    let Palette { mut cps, .. } = palette();
    assert!(cps
        .add_parametric_points(LayerId::INVALID, points(&[[0.0, 0.0, 0.0]]))
        .is_err());
    assert_eq!(cps.all_parametric_points_count(), 6);
    assert!(cps
        .add_global_constraints(LayerId(7), vec![GlobalConstraintParams::new(Population::new())])
        .is_err());
    assert_eq!(cps.all_global_constraints_count(), 0);
}

#[test]
fn test_dimension_follows_first_batch() {
    let mut cps = ConstrainedParameterSpace::<crate::point::ParamPoint<f64, 4>>::new(1);
    assert_eq!(cps.dimension(), None);
    assert_eq!(cps.state(), SpaceState::Empty);
    cps.add_parametric_points(
        LayerId(0),
        vec![PointParams::new(crate::point::ParamPoint::new([0.0; 4]))],
    )
    .unwrap();
    assert_eq!(cps.dimension(), Some(4));
}

#[test]
fn test_constraint_batch_is_all_or_nothing() {
    let Palette { mut cps, ids, .. } = palette();
    let before = cps.all_constraints_count();

    let err = cps
        .add_constraints(vec![
            ConstraintParams::new(ids[0], ids[2]),
            ConstraintParams::new(ids[0], PointId(99)),
        ])
        .unwrap_err();
    assert!(matches!(err, CpsError::BadArg(_)));
    assert_eq!(cps.all_constraints_count(), before);

    let err = cps
        .add_constraints(vec![
            ConstraintParams::new(ids[0], ids[2]),
            ConstraintParams::new(ids[0], ids[3]),
        ])
        .unwrap_err();
    assert!(matches!(err, CpsError::BadArg(_)));
    assert_eq!(cps.all_constraints_count(), before);
}

#[test]
fn test_pairing_with_unknown_endpoint_is_rejected() {
    let Palette { mut cps, ids, .. } = palette();
    assert!(matches!(
        cps.add_pairings(&[PairingParams::new(ids[0], PointId::INVALID)]),
        Err(CpsError::BadArg(_))
    ));
    assert!(matches!(
        cps.add_pairings(&[PairingParams::new(ids[1], ids[1])]),
        Err(CpsError::BadArg(_))
    ));
    assert_eq!(cps.all_pairings_count(), 3);
}

// ============================================================================
// Or-get semantics
// ============================================================================

#[test]
fn test_redeclared_pairing_returns_existing_id() {
    let Palette {
        mut cps,
        ids,
        pairings,
        ..
    } = palette();
    let again = cps
        .add_pairings(&[PairingParams::new(ids[4], ids[1])])
        .unwrap();
    assert_eq!(again, vec![pairings[1]]);
    assert_eq!(cps.all_pairings_count(), 3);
}

#[test]
fn test_redeclared_constraint_merges_functors() {
    let Palette {
        mut cps,
        ids,
        constraints,
        ..
    } = palette();
    let again = cps
        .add_constraints(vec![
            ConstraintParams::new(ids[1], ids[0]).with_functor(Manhattan::new())
        ])
        .unwrap();
    assert_eq!(again, vec![constraints[0]]);
    assert_eq!(cps.all_constraints_count(), 4);
    assert_eq!(cps.constraint_functors(constraints[0]).len(), 2);
    assert_eq!(cps.all_binary_functors_count(), 5);
}

// ============================================================================
// Global constraints
// ============================================================================

#[test]
fn test_global_broadcast_reaches_every_layer() {
    let Palette { mut cps, .. } = palette();
    let ids = cps
        .add_global_constraints(
            LayerId::INVALID,
            vec![
                GlobalConstraintParams::new(Population::new()),
                GlobalConstraintParams::new(Population::new()),
            ],
        )
        .unwrap();

    assert_eq!(ids.len(), 4);
    assert_eq!(cps.layer_global_constraints_count(LayerId(0)), 2);
    assert_eq!(cps.layer_global_constraints_count(LayerId(1)), 2);
    assert_eq!(cps.global_constraint_layer(ids[0]), LayerId(0));
    assert_eq!(cps.global_constraint_layer(ids[3]), LayerId(1));
}

// ============================================================================
// Search queries
// ============================================================================

#[test]
fn test_find_associated_pairings() {
    let Palette {
        cps, ids, pairings, ..
    } = palette();
    assert_eq!(cps.find_associated_pairings(ids[4]), vec![pairings[1]]);
    assert_eq!(cps.find_associated_pairings(ids[0]), vec![pairings[0]]);
}

#[test]
fn test_find_buddy_constraints() {
    let Palette {
        cps,
        pairings,
        constraints,
        ..
    } = palette();
    assert_eq!(
        cps.find_buddy_constraints(pairings[0], pairings[1]),
        vec![constraints[2]]
    );
    assert_eq!(cps.pairing_layer(pairings[0]), LayerId(0));

    assert!(cps
        .find_buddy_constraints(pairings[0], PairingId::INVALID)
        .is_empty());
}

#[test]
fn test_link_buddy_constraints() {
    let Palette {
        mut cps,
        pairings,
        constraints,
        ..
    } = palette();
    assert_eq!(cps.constraint_buddy(constraints[0]), ConstraintId::INVALID);

    assert_eq!(cps.link_buddy_constraints(), 4);
    assert_eq!(cps.constraint_buddy(constraints[0]), constraints[2]);
    assert_eq!(cps.constraint_buddy(constraints[3]), constraints[1]);
    assert_eq!(
        cps.constraint_involved_pairings(constraints[1]),
        &[pairings[1], pairings[2]]
    );
}

// ============================================================================
// Values and initialization
// ============================================================================

#[test]
fn test_set_value_keeps_importance() {
    let Palette { cps, ids, .. } = palette();
    cps.set_parametric_point_importance(ids[2], 3.0);
    cps.set_parametric_point_value(ids[2], &p(0.1, 0.2, 0.3));

    let value = cps.get_parametric_point_value(ids[2]);
    assert_eq!(value.coords, [0.1, 0.2, 0.3]);
    assert_eq!(cps.get_parametric_point_importance(ids[2]), 3.0);
}

#[test]
fn test_values_can_be_written_from_another_thread() {
    let Palette { cps, ids, .. } = palette();
    std::thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..100 {
                cps.set_parametric_point_value(ids[0], &p(i as f64, 0.0, 0.0));
            }
        });
        for _ in 0..100 {
            let guard = cps.lock_values();
            assert_eq!(guard.len(), 6);
        }
    });
    assert_eq!(cps.get_parametric_point_value(ids[0]).coords[0], 99.0);
}

#[test]
fn test_init_captures_baselines() {
    let Palette {
        mut cps,
        ids,
        constraints,
        ..
    } = palette();
    let global = cps
        .add_global_constraints(LayerId(1), vec![GlobalConstraintParams::new(Population::new())])
        .unwrap()[0];
    assert_eq!(cps.state(), SpaceState::Populated);

    cps.init_constraints_internals(LayerId::INVALID).unwrap();
    assert_eq!(cps.state(), SpaceState::Initialized);
    assert_eq!(cps.constraint_functors(constraints[0])[0].baseline(), 1.5);
    assert_eq!(cps.constraint_functors(constraints[2])[0].baseline(), 2.0);
    assert_eq!(cps.global_functor(global).baseline(), 3.0);

    let values = cps.lock_values();
    let (a, b) = (&values[ids[0].index()], &values[ids[1].index()]);
    assert_eq!(cps.constraint_functors(constraints[0])[0].residual(a, b, 0.0), 0.0);
    drop(values);

    cps.reset_baselines();
    assert_eq!(cps.constraint_functors(constraints[0])[0].baseline(), 0.0);
}

#[test]
fn test_init_single_layer_leaves_others_untouched() {
    let Palette {
        mut cps,
        constraints,
        ..
    } = palette();
    cps.init_constraints_internals(LayerId(1)).unwrap();
    assert_eq!(cps.constraint_functors(constraints[0])[0].baseline(), 0.0);
    assert_eq!(cps.constraint_functors(constraints[2])[0].baseline(), 2.0);
    assert!(cps.init_constraints_internals(LayerId(4)).is_err());
}

#[test]
fn test_init_with_filter_restricts_global_range() {
    let Palette { mut cps, ids, .. } = palette();
    let global = cps
        .add_global_constraints(LayerId(0), vec![GlobalConstraintParams::new(Population::new())])
        .unwrap()[0];
    let locked = ids[0];
    cps.init_constraints_internals_with(LayerId(0), |id| id != locked)
        .unwrap();
    assert_eq!(cps.global_functor(global).baseline(), 2.0);
}

#[test]
fn test_adding_after_init_returns_to_populated() {
    let Palette { mut cps, ids, .. } = palette();
    cps.init_constraints_internals(LayerId::INVALID).unwrap();
    cps.add_constraints(vec![ConstraintParams::new(ids[0], ids[2])])
        .unwrap();
    assert_eq!(cps.state(), SpaceState::Populated);
}

// ============================================================================
// Layers and clearing
// ============================================================================

#[test]
fn test_set_layers_count_refuses_to_orphan() {
    let Palette { mut cps, .. } = palette();
    assert!(matches!(cps.set_layers_count(1), Err(CpsError::BadArg(_))));
    assert_eq!(cps.layers_count(), 2);

    cps.set_layers_count(4).unwrap();
    assert_eq!(cps.layers_count(), 4);
    cps.set_layers_count(2).unwrap();
    assert_eq!(cps.layers_count(), 2);
}

#[test]
fn test_clear_operations() {
    let Palette { mut cps, .. } = palette();
    cps.add_global_constraints(LayerId(0), vec![GlobalConstraintParams::new(Population::new())])
        .unwrap();

    cps.relationships_clear();
    assert_eq!(cps.all_pairings_count(), 0);
    assert_eq!(cps.all_constraints_count(), 0);
    assert_eq!(cps.all_parametric_points_count(), 6);

    cps.clear_all_global_constraints();
    assert_eq!(cps.all_global_constraints_count(), 0);

    cps.parametric_points_clear();
    assert_eq!(cps.state(), SpaceState::Empty);
    assert!(cps.layer_parametric_point_ids(LayerId(0)).is_empty());

    // ids restart after a clear
    let ids = cps
        .add_parametric_points(LayerId(1), points(&[[0.0, 0.0, 0.0]]))
        .unwrap();
    assert_eq!(ids, vec![PointId(0)]);
}

// ============================================================================
// Snapshots
// ============================================================================

#[test]
fn test_snapshot_reproduces_ids_and_content() {
    let Palette { mut cps, ids, .. } = palette();
    cps.set_parametric_point_importance(ids[1], 2.0);
    cps.add_global_constraints(
        LayerId::INVALID,
        vec![GlobalConstraintParams::new(NaryAnchor::new(
            Manhattan::new(),
            p(0.5, 0.5, 0.5),
        ))],
    )
    .unwrap();
    cps.add_parametric_points(
        LayerId(0),
        vec![PointParams::new(p(0.2, 0.2, 0.2))
            .with_unary(Anchor::new(Manhattan::new(), p(0.0, 0.0, 0.0)))],
    )
    .unwrap();

    let snapshot = cps.snapshot();
    let json = serde_json::to_string(&snapshot).unwrap();
    let parsed: CpsSnapshot = serde_json::from_str(&json).unwrap();
    let rebuilt = ConstrainedParameterSpace::from_snapshot(parsed, &registry()).unwrap();

    assert_eq!(rebuilt.snapshot(), snapshot);
    assert_eq!(
        rebuilt.layer_parametric_point_ids(LayerId(0)),
        &[PointId(0), PointId(1), PointId(2), PointId(6)]
    );
    assert_eq!(rebuilt.get_parametric_point_importance(ids[1]), 2.0);
    assert_eq!(rebuilt.unary_functors(PointId(6)).len(), 1);
    assert_eq!(rebuilt.all_global_constraints_count(), 2);
}

#[test]
fn test_snapshot_with_unknown_kind_fails() {
    let mut snapshot = palette().cps.snapshot();
    snapshot.constraints[0].functors.push(FunctorRecord {
        kind: "hue_shift".to_string(),
        weight: 1.0,
        params: Vec::new(),
        point_weights: Vec::new(),
        children: Vec::new(),
    });
    let err = ConstrainedParameterSpace::from_snapshot(snapshot, &registry()).unwrap_err();
    assert!(matches!(err, CpsError::NotFound(_)));
}
