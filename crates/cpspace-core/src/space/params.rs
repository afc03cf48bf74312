//! Batch entries accepted by the `add_*` operations.
//!
//! Functors are moved into the space; from then on the space owns them
//! and drops them when the owning category is cleared.

use crate::functor::{
    BinaryFunctor, BoxedBinary, BoxedNary, BoxedUnary, NaryFunctor, UnaryFunctor,
};
use crate::id::PointId;
use crate::point::ParametricPoint;

/// A point to add: initial value (with importance) and its own unary functors.
#[derive(Debug)]
pub struct PointParams<P: ParametricPoint> {
    pub value: P,
    pub unary: Vec<BoxedUnary<P>>,
}

impl<P: ParametricPoint> PointParams<P> {
    /// A point without functors.
    pub fn new(value: P) -> Self {
        Self {
            value,
            unary: Vec::new(),
        }
    }

    /// Attaches a unary functor.
    pub fn with_unary<F: UnaryFunctor<P> + 'static>(mut self, functor: F) -> Self {
        self.unary.push(Box::new(functor));
        self
    }
}

/// A pairing to add.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingParams {
    pub a: PointId,
    pub b: PointId,
}

impl PairingParams {
    pub fn new(a: PointId, b: PointId) -> Self {
        Self { a, b }
    }
}

/// A constraint to add: two points of one layer and its binary functors.
#[derive(Debug)]
pub struct ConstraintParams<P: ParametricPoint> {
    pub a: PointId,
    pub b: PointId,
    pub functors: Vec<BoxedBinary<P>>,
}

impl<P: ParametricPoint> ConstraintParams<P> {
    /// A constraint without functors.
    pub fn new(a: PointId, b: PointId) -> Self {
        Self {
            a,
            b,
            functors: Vec::new(),
        }
    }

    /// Attaches a binary functor.
    pub fn with_functor<F: BinaryFunctor<P> + 'static>(mut self, functor: F) -> Self {
        self.functors.push(Box::new(functor));
        self
    }
}

/// A global constraint to add: exactly one n-ary functor.
#[derive(Debug)]
pub struct GlobalConstraintParams<P: ParametricPoint> {
    pub functor: BoxedNary<P>,
}

impl<P: ParametricPoint> GlobalConstraintParams<P> {
    pub fn new<F: NaryFunctor<P> + 'static>(functor: F) -> Self {
        Self {
            functor: Box::new(functor),
        }
    }

    /// Wraps an already boxed functor.
    pub fn boxed(functor: BoxedNary<P>) -> Self {
        Self { functor }
    }
}
