//! Functors attached to a parameter space, with their captured baseline.

use num_traits::Zero;

use super::{BinaryFunctor, NaryFunctor, Scalar, UnaryFunctor};
use crate::point::ParametricPoint;

/// A functor owned by a parameter space plus the baseline captured for it.
///
/// The functor definition is never mutated by evaluation. The baseline is
/// a separate value, written only by the space's initialization pass, and
/// every residual reports the weighted deviation from it:
/// `weight * (eval(..) - baseline)`.
#[derive(Debug)]
pub struct Attached<F: ?Sized, S> {
    functor: Box<F>,
    baseline: S,
}

impl<F: ?Sized, S: Copy + Zero> Attached<F, S> {
    /// Wraps a functor with a zero baseline.
    pub fn new(functor: Box<F>) -> Self {
        Self {
            functor,
            baseline: S::zero(),
        }
    }

    /// The functor definition.
    pub fn functor(&self) -> &F {
        &self.functor
    }

    /// Mutable access to the functor definition (weights, parameters).
    pub fn functor_mut(&mut self) -> &mut F {
        &mut self.functor
    }

    /// Baseline captured at initialization, zero before.
    pub fn baseline(&self) -> S {
        self.baseline
    }

    pub(crate) fn set_baseline(&mut self, baseline: S) {
        self.baseline = baseline;
    }
}

impl<P: ParametricPoint> Attached<dyn UnaryFunctor<P>, Scalar<P>> {
    /// Captures `eval_start(point)` as the baseline.
    pub fn capture(&mut self, point: &P) {
        self.baseline = self.functor.eval_start(point);
    }

    /// Weighted deviation from the baseline at time `t`.
    #[inline]
    pub fn residual(&self, point: &P, t: Scalar<P>) -> Scalar<P> {
        self.functor.weight() * (self.functor.eval(point, t) - self.baseline)
    }
}

impl<P: ParametricPoint> Attached<dyn BinaryFunctor<P>, Scalar<P>> {
    /// Captures `eval_start(a, b)` as the baseline.
    pub fn capture(&mut self, a: &P, b: &P) {
        self.baseline = self.functor.eval_start(a, b);
    }

    /// Weighted deviation from the baseline at time `t`.
    #[inline]
    pub fn residual(&self, a: &P, b: &P, t: Scalar<P>) -> Scalar<P> {
        self.functor.weight() * (self.functor.eval(a, b, t) - self.baseline)
    }
}

impl<P: ParametricPoint> Attached<dyn NaryFunctor<P>, Scalar<P>> {
    /// Captures `eval_start(points)` as the baseline.
    pub fn capture(&mut self, points: &[P]) {
        self.baseline = self.functor.eval_start(points);
    }

    /// Weighted deviation from the baseline at time `t`.
    #[inline]
    pub fn residual(&self, points: &[P], t: Scalar<P>) -> Scalar<P> {
        self.functor.weight() * (self.functor.eval(points, t) - self.baseline)
    }
}
