//! Payload stores kept in parallel with the graph topology.

use smallvec::SmallVec;

use crate::functor::{Attached, BinaryFunctor, NaryFunctor, Scalar, UnaryFunctor};
use crate::id::{ConstraintId, GlobalConstraintId, LayerId, PairingId, PointId};
use crate::point::ParametricPoint;

/// Attached unary functor.
pub type AttachedUnary<P> = Attached<dyn UnaryFunctor<P>, Scalar<P>>;
/// Attached binary functor.
pub type AttachedBinary<P> = Attached<dyn BinaryFunctor<P>, Scalar<P>>;
/// Attached n-ary functor.
pub type AttachedNary<P> = Attached<dyn NaryFunctor<P>, Scalar<P>>;

/// Ids of everything that lives in one layer, in creation order.
#[derive(Debug, Clone, Default)]
pub(crate) struct LayerContent {
    pub points: Vec<PointId>,
    pub pairings: Vec<PairingId>,
    pub constraints: Vec<ConstraintId>,
    pub globals: Vec<GlobalConstraintId>,
}

impl LayerContent {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
            && self.pairings.is_empty()
            && self.constraints.is_empty()
            && self.globals.is_empty()
    }
}

/// Payload of a point; its value lives in the guarded value store.
#[derive(Debug)]
pub(crate) struct PointContent<P: ParametricPoint> {
    pub layer: LayerId,
    pub unary: Vec<AttachedUnary<P>>,
}

/// Payload of a pairing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PairingContent {
    pub layer: LayerId,
}

/// Payload of a constraint.
#[derive(Debug)]
pub(crate) struct ConstraintContent<P: ParametricPoint> {
    pub layer: LayerId,
    pub functors: Vec<AttachedBinary<P>>,
    /// Structurally corresponding constraint in another layer.
    pub buddy: ConstraintId,
    /// Pairings leading from this constraint's endpoints to the buddy's.
    pub involved_pairings: SmallVec<[PairingId; 2]>,
}

/// Payload of a global constraint.
#[derive(Debug)]
pub(crate) struct GlobalContent<P: ParametricPoint> {
    pub layer: LayerId,
    pub functor: AttachedNary<P>,
}
