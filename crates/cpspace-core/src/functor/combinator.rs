//! Add / Multiply combinators.
//!
//! Both combinators are generic over their children, and implement each
//! arity trait exactly when both children implement it, so mixing arities
//! does not type-check.

use num_traits::One;

use super::kind::{ADD, MULTIPLY};
use super::{
    BinaryFunctor, BoxedBinary, BoxedNary, BoxedUnary, FunctorKind, FunctorRecord, NaryFunctor,
    Scalar, UnaryFunctor,
};
use crate::point::ParametricPoint;

/// Sum of two functors of the same arity.
///
/// `eval` and `eval_start` sum the children's weighted values, so each
/// term keeps its own weight inside the composite.
#[derive(Debug, Clone)]
pub struct Add<A, B, S> {
    pub lhs: A,
    pub rhs: B,
    weight: S,
}

/// Product of two functors of the same arity.
///
/// `eval` is the product of the children's weighted values.
#[derive(Debug, Clone)]
pub struct Multiply<A, B, S> {
    pub lhs: A,
    pub rhs: B,
    weight: S,
}

impl<A, B, S: One> Add<A, B, S> {
    /// Combines two functors with unit weight.
    pub fn new(lhs: A, rhs: B) -> Self {
        Self {
            lhs,
            rhs,
            weight: S::one(),
        }
    }

    /// Sets the weight, builder style.
    pub fn with_weight(mut self, weight: S) -> Self {
        self.weight = weight;
        self
    }
}

impl<A, B, S: One> Multiply<A, B, S> {
    /// Combines two functors with unit weight.
    pub fn new(lhs: A, rhs: B) -> Self {
        Self {
            lhs,
            rhs,
            weight: S::one(),
        }
    }

    /// Sets the weight, builder style.
    pub fn with_weight(mut self, weight: S) -> Self {
        self.weight = weight;
        self
    }
}

macro_rules! unary_children {
    ($self:ident) => {
        vec![
            FunctorRecord::of_unary::<P, _>(&$self.lhs),
            FunctorRecord::of_unary::<P, _>(&$self.rhs),
        ]
    };
}

macro_rules! binary_children {
    ($self:ident) => {
        vec![
            FunctorRecord::of_binary::<P, _>(&$self.lhs),
            FunctorRecord::of_binary::<P, _>(&$self.rhs),
        ]
    };
}

macro_rules! nary_children {
    ($self:ident) => {
        vec![
            FunctorRecord::of_nary::<P, _>(&$self.lhs),
            FunctorRecord::of_nary::<P, _>(&$self.rhs),
        ]
    };
}

impl<P, A, B> UnaryFunctor<P> for Add<A, B, Scalar<P>>
where
    P: ParametricPoint,
    A: UnaryFunctor<P> + Clone + 'static,
    B: UnaryFunctor<P> + Clone + 'static,
{
    fn kind(&self) -> FunctorKind {
        ADD
    }

    fn weight(&self) -> Scalar<P> {
        self.weight
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        self.weight = weight;
    }

    fn eval(&self, point: &P, t: Scalar<P>) -> Scalar<P> {
        self.lhs.weight() * self.lhs.eval(point, t) + self.rhs.weight() * self.rhs.eval(point, t)
    }

    fn eval_start(&self, point: &P) -> Scalar<P> {
        self.lhs.weight() * self.lhs.eval_start(point)
            + self.rhs.weight() * self.rhs.eval_start(point)
    }

    fn children(&self) -> Vec<FunctorRecord> {
        unary_children!(self)
    }

    fn clone_boxed(&self) -> BoxedUnary<P> {
        Box::new(self.clone())
    }
}

impl<P, A, B> UnaryFunctor<P> for Multiply<A, B, Scalar<P>>
where
    P: ParametricPoint,
    A: UnaryFunctor<P> + Clone + 'static,
    B: UnaryFunctor<P> + Clone + 'static,
{
    fn kind(&self) -> FunctorKind {
        MULTIPLY
    }

    fn weight(&self) -> Scalar<P> {
        self.weight
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        self.weight = weight;
    }

    fn eval(&self, point: &P, t: Scalar<P>) -> Scalar<P> {
        self.lhs.weight() * self.lhs.eval(point, t) * self.rhs.weight() * self.rhs.eval(point, t)
    }

    fn children(&self) -> Vec<FunctorRecord> {
        unary_children!(self)
    }

    fn clone_boxed(&self) -> BoxedUnary<P> {
        Box::new(self.clone())
    }
}

impl<P, A, B> BinaryFunctor<P> for Add<A, B, Scalar<P>>
where
    P: ParametricPoint,
    A: BinaryFunctor<P> + Clone + 'static,
    B: BinaryFunctor<P> + Clone + 'static,
{
    fn kind(&self) -> FunctorKind {
        ADD
    }

    fn weight(&self) -> Scalar<P> {
        self.weight
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        self.weight = weight;
    }

    fn eval(&self, a: &P, b: &P, t: Scalar<P>) -> Scalar<P> {
        self.lhs.weight() * self.lhs.eval(a, b, t) + self.rhs.weight() * self.rhs.eval(a, b, t)
    }

    fn eval_start(&self, a: &P, b: &P) -> Scalar<P> {
        self.lhs.weight() * self.lhs.eval_start(a, b)
            + self.rhs.weight() * self.rhs.eval_start(a, b)
    }

    fn children(&self) -> Vec<FunctorRecord> {
        binary_children!(self)
    }

    fn clone_boxed(&self) -> BoxedBinary<P> {
        Box::new(self.clone())
    }
}

impl<P, A, B> BinaryFunctor<P> for Multiply<A, B, Scalar<P>>
where
    P: ParametricPoint,
    A: BinaryFunctor<P> + Clone + 'static,
    B: BinaryFunctor<P> + Clone + 'static,
{
    fn kind(&self) -> FunctorKind {
        MULTIPLY
    }

    fn weight(&self) -> Scalar<P> {
        self.weight
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        self.weight = weight;
    }

    fn eval(&self, a: &P, b: &P, t: Scalar<P>) -> Scalar<P> {
        self.lhs.weight() * self.lhs.eval(a, b, t) * self.rhs.weight() * self.rhs.eval(a, b, t)
    }

    fn children(&self) -> Vec<FunctorRecord> {
        binary_children!(self)
    }

    fn clone_boxed(&self) -> BoxedBinary<P> {
        Box::new(self.clone())
    }
}

/// N-ary combinators forward per-point weights to both children.
impl<P, A, B> NaryFunctor<P> for Add<A, B, Scalar<P>>
where
    P: ParametricPoint,
    A: NaryFunctor<P> + Clone + 'static,
    B: NaryFunctor<P> + Clone + 'static,
{
    fn kind(&self) -> FunctorKind {
        ADD
    }

    fn weight(&self) -> Scalar<P> {
        self.weight
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        self.weight = weight;
    }

    fn point_weights(&self) -> &[Scalar<P>] {
        self.lhs.point_weights()
    }

    fn set_point_weights(&mut self, weights: Vec<Scalar<P>>) {
        self.rhs.set_point_weights(weights.clone());
        self.lhs.set_point_weights(weights);
    }

    fn eval(&self, points: &[P], t: Scalar<P>) -> Scalar<P> {
        self.lhs.weight() * self.lhs.eval(points, t)
            + self.rhs.weight() * self.rhs.eval(points, t)
    }

    fn eval_start(&self, points: &[P]) -> Scalar<P> {
        self.lhs.weight() * self.lhs.eval_start(points)
            + self.rhs.weight() * self.rhs.eval_start(points)
    }

    fn children(&self) -> Vec<FunctorRecord> {
        nary_children!(self)
    }

    fn clone_boxed(&self) -> BoxedNary<P> {
        Box::new(self.clone())
    }
}

impl<P, A, B> NaryFunctor<P> for Multiply<A, B, Scalar<P>>
where
    P: ParametricPoint,
    A: NaryFunctor<P> + Clone + 'static,
    B: NaryFunctor<P> + Clone + 'static,
{
    fn kind(&self) -> FunctorKind {
        MULTIPLY
    }

    fn weight(&self) -> Scalar<P> {
        self.weight
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        self.weight = weight;
    }

    fn point_weights(&self) -> &[Scalar<P>] {
        self.lhs.point_weights()
    }

    fn set_point_weights(&mut self, weights: Vec<Scalar<P>>) {
        self.rhs.set_point_weights(weights.clone());
        self.lhs.set_point_weights(weights);
    }

    fn eval(&self, points: &[P], t: Scalar<P>) -> Scalar<P> {
        self.lhs.weight() * self.lhs.eval(points, t)
            * self.rhs.weight()
            * self.rhs.eval(points, t)
    }

    fn children(&self) -> Vec<FunctorRecord> {
        nary_children!(self)
    }

    fn clone_boxed(&self) -> BoxedNary<P> {
        Box::new(self.clone())
    }
}
