//! cpspace - Constrained parameter spaces explored by least squares
//!
//! Declare points in layers, relate them with cost functors, then bind the
//! space to an [`ExplorationSolver`] and hand it to any nonlinear
//! least-squares solver.
//!
//! # Example
//!
//! ```rust
//! use cpspace::prelude::*;
//! use cpspace_test::two_layer_palette;
//!
//! let palette = two_layer_palette();
//! let mut solver = ExplorationSolver::new(palette.cps);
//! solver.lock_parametric_points(&palette.points[3..4]).unwrap();
//!
//! let layout = solver.setup().unwrap();
//! solver.init_constraints_internals().unwrap();
//!
//! let mut vars = vec![0.0; solver.variable_count()];
//! solver.update_variables_from_graph(&mut vars).unwrap();
//! assert_eq!(vars.len(), 6);
//! assert!(solver.total_cost(&vars) < 1e-12);
//! assert_eq!(layout.len(), 2 + 2 + 1);
//! ```
//!
//! # Logging
//!
//! Every crate logs through `tracing`. With the `console` feature,
//! [`console::init`] installs a colored subscriber for the exploration
//! lifecycle events.

pub use cpspace_config::{
    ConfigError, ExplorationConfig, LockingConfig, TerminationConfig, VisionType,
};
pub use cpspace_core::{
    functor, ConstrainedParameterSpace, ConstraintId, ConstraintParams, CpsError, CpsSnapshot,
    FunctorKind, FunctorRecord, FunctorRegistry, GlobalConstraintId, GlobalConstraintParams,
    LayerId, PairingId, PairingParams, ParamPoint, ParametricPoint, Point2, Point3, PointId,
    PointParams, SpaceState,
};
pub use cpspace_solver::{
    forward_difference_jacobian, ExplorationError, ExplorationSolver, GamutCheck, IdentityVision,
    LeastSquaresProblem, ResidualLayout, UnitCubeGamut, VisionSimulator,
};

#[cfg(feature = "console")]
pub mod console;

pub mod prelude {
    pub use super::functor::{BinaryFunctor, NaryFunctor, UnaryFunctor};
    pub use super::{
        ConstrainedParameterSpace, ConstraintParams, ExplorationConfig, ExplorationSolver,
        GlobalConstraintParams, LayerId, LeastSquaresProblem, PairingParams, ParametricPoint,
        Point3, PointId, PointParams, VisionType,
    };
}
