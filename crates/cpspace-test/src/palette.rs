//! Two-layer palette fixture.
//!
//! Layer 0 holds a gray ramp (black, mid gray, white), layer 1 the three
//! primaries. Point `i` of layer 0 is paired with point `i` of layer 1, and
//! each layer chains its points with Euclidean constraints.
//!
//! # Example
//!
//! ```
//! use cpspace_test::two_layer_palette;
//!
//! let palette = two_layer_palette();
//! assert_eq!(palette.cps.all_parametric_points_count(), 6);
//! assert_eq!(palette.cps.all_constraints_count(), 4);
//! ```

use cpspace_core::{
    ConstrainedParameterSpace, ConstraintId, ConstraintParams, GlobalConstraintId,
    GlobalConstraintParams, LayerId, PairingId, PairingParams, Point3, PointId, PointParams,
};

use crate::functors::{Euclidean, Spread};

/// Source layer values.
pub const GRAY_RAMP: [[f64; 3]; 3] = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5], [1.0, 1.0, 1.0]];

/// Destination layer values.
pub const PRIMARIES: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// A populated space and the ids handed out while building it.
#[derive(Debug)]
pub struct Palette {
    pub cps: ConstrainedParameterSpace<Point3>,
    /// Layer 0 ids, then layer 1 ids.
    pub points: Vec<PointId>,
    pub pairings: Vec<PairingId>,
    /// `(0,1)`, `(1,2)`, `(3,4)`, `(4,5)`.
    pub constraints: Vec<ConstraintId>,
    /// One [`Spread`] per layer.
    pub globals: Vec<GlobalConstraintId>,
}

fn layer(values: &[[f64; 3]]) -> Vec<PointParams<Point3>> {
    values
        .iter()
        .map(|&v| PointParams::new(Point3::new(v)))
        .collect()
}

/// Builds the palette; baselines are not captured yet.
pub fn two_layer_palette() -> Palette {
    build().unwrap_or_else(|err| panic!("palette fixture is well-formed: {err}"))
}

fn build() -> cpspace_core::Result<Palette> {
    let mut cps = ConstrainedParameterSpace::new(2);
    let mut points = cps.add_parametric_points(LayerId(0), layer(&GRAY_RAMP))?;
    points.extend(cps.add_parametric_points(LayerId(1), layer(&PRIMARIES))?);

    let pairings = cps.add_pairings(&[
        PairingParams::new(points[0], points[3]),
        PairingParams::new(points[1], points[4]),
        PairingParams::new(points[2], points[5]),
    ])?;

    let constraints = cps.add_constraints(
        [(0, 1), (1, 2), (3, 4), (4, 5)]
            .iter()
            .map(|&(a, b)| ConstraintParams::new(points[a], points[b]).with_functor(Euclidean::new()))
            .collect(),
    )?;

    let globals = cps.add_global_constraints(
        LayerId::INVALID,
        vec![GlobalConstraintParams::new(Spread::new())],
    )?;

    Ok(Palette {
        cps,
        points,
        pairings,
        constraints,
        globals,
    })
}
