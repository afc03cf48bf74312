//! Cost functor framework.
//!
//! Cost terms come in three arities:
//! - [`UnaryFunctor`]: cost of one point
//! - [`BinaryFunctor`]: cost of an ordered pair of points
//! - [`NaryFunctor`]: cost of a runtime-sized range of points
//!
//! Every functor carries a weight (default 1) and a [`FunctorKind`] tag.
//! `eval` returns the raw, unweighted cost; the weight and the baseline
//! captured at initialization are applied by [`Attached`] when the owning
//! space turns a cost into a residual.
//!
//! Functor evaluation cannot fail. Wrong arity or inconsistent parameters
//! are programming errors and panic.
//!
//! Composition:
//! - [`Add`] / [`Multiply`] combine two functors of the same arity
//! - [`Anchor`], [`LinearDeviation`] and [`NaryAnchor`] turn a binary metric
//!   into a unary or n-ary cost against fixed reference points

mod attached;
mod combinator;
mod delegating;
pub mod kind;
mod registry;


use std::fmt::Debug;

use num_traits::{One, ToPrimitive, Zero};

use crate::point::ParametricPoint;

pub use attached::Attached;
pub use combinator::{Add, Multiply};
pub use delegating::{Anchor, LinearDeviation, NaryAnchor};
pub use kind::FunctorKind;
pub use registry::{point_from_f64, scalar_from_f64, FunctorRecord, FunctorRegistry};

/// Owned unary functor.
pub type BoxedUnary<P> = Box<dyn UnaryFunctor<P>>;
/// Owned binary functor.
pub type BoxedBinary<P> = Box<dyn BinaryFunctor<P>>;
/// Owned n-ary functor.
pub type BoxedNary<P> = Box<dyn NaryFunctor<P>>;

/// Scalar type of a point.
pub type Scalar<P> = <P as ParametricPoint>::Scalar;

/// Cost of a single point.
pub trait UnaryFunctor<P: ParametricPoint>: Debug + Send + Sync {
    /// Type tag.
    fn kind(&self) -> FunctorKind;

    /// Weight multiplying this functor's contribution.
    fn weight(&self) -> Scalar<P>;

    /// Sets the weight.
    fn set_weight(&mut self, weight: Scalar<P>);

    /// Raw cost at interpolation time `t`.
    fn eval(&self, point: &P, t: Scalar<P>) -> Scalar<P>;

    /// Raw cost at `t = 0`.
    fn eval_start(&self, point: &P) -> Scalar<P> {
        self.eval(point, Scalar::<P>::zero())
    }

    /// Raw cost at `t = 1`.
    fn eval_end(&self, point: &P) -> Scalar<P> {
        self.eval(point, Scalar::<P>::one())
    }

    /// Numeric parameters, for snapshots.
    fn params(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Nested functors, for snapshots.
    fn children(&self) -> Vec<FunctorRecord> {
        Vec::new()
    }

    /// Clones into a new box.
    fn clone_boxed(&self) -> BoxedUnary<P>;
}

/// Cost of an ordered pair of points.
pub trait BinaryFunctor<P: ParametricPoint>: Debug + Send + Sync {
    /// Type tag.
    fn kind(&self) -> FunctorKind;

    /// Weight multiplying this functor's contribution.
    fn weight(&self) -> Scalar<P>;

    /// Sets the weight.
    fn set_weight(&mut self, weight: Scalar<P>);

    /// Raw cost at interpolation time `t`.
    fn eval(&self, a: &P, b: &P, t: Scalar<P>) -> Scalar<P>;

    /// Raw cost at `t = 0`.
    fn eval_start(&self, a: &P, b: &P) -> Scalar<P> {
        self.eval(a, b, Scalar::<P>::zero())
    }

    /// Raw cost at `t = 1`.
    fn eval_end(&self, a: &P, b: &P) -> Scalar<P> {
        self.eval(a, b, Scalar::<P>::one())
    }

    /// Numeric parameters, for snapshots.
    fn params(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Nested functors, for snapshots.
    fn children(&self) -> Vec<FunctorRecord> {
        Vec::new()
    }

    /// Clones into a new box.
    fn clone_boxed(&self) -> BoxedBinary<P>;
}

/// Cost of a runtime-sized range of points.
///
/// The arity is the length of the slice passed to `eval`. An optional
/// per-point weight vector may be installed with `set_point_weights`; an
/// empty vector means every point weighs 1.
pub trait NaryFunctor<P: ParametricPoint>: Debug + Send + Sync {
    /// Type tag.
    fn kind(&self) -> FunctorKind;

    /// Weight multiplying this functor's contribution.
    fn weight(&self) -> Scalar<P>;

    /// Sets the weight.
    fn set_weight(&mut self, weight: Scalar<P>);

    /// Per-point weights; empty when uniform.
    fn point_weights(&self) -> &[Scalar<P>];

    /// Installs per-point weights.
    fn set_point_weights(&mut self, weights: Vec<Scalar<P>>);

    /// Raw cost of `points` at interpolation time `t`.
    fn eval(&self, points: &[P], t: Scalar<P>) -> Scalar<P>;

    /// Raw cost at `t = 0`.
    fn eval_start(&self, points: &[P]) -> Scalar<P> {
        self.eval(points, Scalar::<P>::zero())
    }

    /// Raw cost at `t = 1`.
    fn eval_end(&self, points: &[P]) -> Scalar<P> {
        self.eval(points, Scalar::<P>::one())
    }

    /// Numeric parameters, for snapshots.
    fn params(&self) -> Vec<f64> {
        Vec::new()
    }

    /// Nested functors, for snapshots.
    fn children(&self) -> Vec<FunctorRecord> {
        Vec::new()
    }

    /// Clones into a new box.
    fn clone_boxed(&self) -> BoxedNary<P>;
}

/// Weight of the `i`-th point of an n-ary range.
///
/// # Panics
///
/// Panics if non-uniform weights are installed and `i` is out of range.
pub fn point_weight<S: Copy + One>(weights: &[S], i: usize) -> S {
    if weights.is_empty() {
        S::one()
    } else {
        weights[i]
    }
}

pub(crate) fn to_f64<S: ToPrimitive>(value: S) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

macro_rules! forward_boxed {
    ($trait:ident, $boxed:ident, ($($arg:ident: $ty:ty),*)) => {
        impl<P: ParametricPoint> $trait<P> for $boxed<P> {
            fn kind(&self) -> FunctorKind {
                (**self).kind()
            }

            fn weight(&self) -> Scalar<P> {
                (**self).weight()
            }

            fn set_weight(&mut self, weight: Scalar<P>) {
                (**self).set_weight(weight)
            }

            fn eval(&self, $($arg: $ty,)* t: Scalar<P>) -> Scalar<P> {
                (**self).eval($($arg,)* t)
            }

            fn eval_start(&self, $($arg: $ty),*) -> Scalar<P> {
                (**self).eval_start($($arg),*)
            }

            fn eval_end(&self, $($arg: $ty),*) -> Scalar<P> {
                (**self).eval_end($($arg),*)
            }

            fn params(&self) -> Vec<f64> {
                (**self).params()
            }

            fn children(&self) -> Vec<FunctorRecord> {
                (**self).children()
            }

            fn clone_boxed(&self) -> $boxed<P> {
                (**self).clone_boxed()
            }
        }
    };
}

forward_boxed!(UnaryFunctor, BoxedUnary, (point: &P));
forward_boxed!(BinaryFunctor, BoxedBinary, (a: &P, b: &P));

impl<P: ParametricPoint> NaryFunctor<P> for BoxedNary<P> {
    fn kind(&self) -> FunctorKind {
        (**self).kind()
    }

    fn weight(&self) -> Scalar<P> {
        (**self).weight()
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        (**self).set_weight(weight)
    }

    fn point_weights(&self) -> &[Scalar<P>] {
        (**self).point_weights()
    }

    fn set_point_weights(&mut self, weights: Vec<Scalar<P>>) {
        (**self).set_point_weights(weights)
    }

    fn eval(&self, points: &[P], t: Scalar<P>) -> Scalar<P> {
        (**self).eval(points, t)
    }

    fn eval_start(&self, points: &[P]) -> Scalar<P> {
        (**self).eval_start(points)
    }

    fn eval_end(&self, points: &[P]) -> Scalar<P> {
        (**self).eval_end(points)
    }

    fn params(&self) -> Vec<f64> {
        (**self).params()
    }

    fn children(&self) -> Vec<FunctorRecord> {
        (**self).children()
    }

    fn clone_boxed(&self) -> BoxedNary<P> {
        (**self).clone_boxed()
    }
}

impl<P: ParametricPoint> Clone for BoxedUnary<P> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl<P: ParametricPoint> Clone for BoxedBinary<P> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

impl<P: ParametricPoint> Clone for BoxedNary<P> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}
