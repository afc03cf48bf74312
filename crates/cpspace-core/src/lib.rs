//! cpspace Core - Constrained parameter space and cost functors
//!
//! This crate provides the data model shared by every exploration tool:
//! - Dense ids and the parametric point abstraction
//! - Append-only graph primitives for pairings and constraints
//! - Weighted cost functors of three arities, with combinators
//! - The constrained parameter space owning points, relationships and costs

pub mod error;
pub mod functor;
pub mod graph;
pub mod id;
pub mod point;
pub mod space;

pub use error::{CpsError, Result};
pub use functor::{
    Attached, BinaryFunctor, FunctorKind, FunctorRecord, FunctorRegistry, NaryFunctor,
    UnaryFunctor,
};
pub use id::{ConstraintId, EdgeId, GlobalConstraintId, LayerId, PairingId, PointId};
pub use point::{ParamPoint, ParametricPoint, Point2, Point3};
pub use space::{
    ConstrainedParameterSpace, ConstraintParams, CpsSnapshot, GlobalConstraintParams,
    PairingParams, PointParams, SpaceState,
};
