//! Functors that reuse a binary metric against fixed reference points.
//!
//! "Keep this point close to where it started" and "keep this point on the
//! segment between its start and end" are both unary costs, and both are
//! expressed by running an ordinary binary metric against a reference that
//! does not move.

use num_traits::{One, Zero};

use super::kind::{ANCHOR, LINEAR_DEVIATION, NARY_ANCHOR};
use super::{
    point_weight, to_f64, BinaryFunctor, BoxedNary, BoxedUnary, FunctorKind, FunctorRecord,
    NaryFunctor, Scalar, UnaryFunctor,
};
use crate::point::ParametricPoint;

fn coordinates_f64<P: ParametricPoint>(point: &P) -> impl Iterator<Item = f64> + '_ {
    point.coordinates().iter().map(|&c| to_f64(c))
}

/// Unary cost `inner(point, reference)`, scaled by the inner weight.
///
/// # Example
///
/// ```
/// use cpspace_core::functor::{Anchor, BinaryFunctor, UnaryFunctor};
/// use cpspace_core::{FunctorKind, Point3};
///
/// #[derive(Debug, Clone)]
/// struct Manhattan;
///
/// impl BinaryFunctor<Point3> for Manhattan {
///     fn kind(&self) -> FunctorKind { FunctorKind::new("manhattan") }
///     fn weight(&self) -> f64 { 1.0 }
///     fn set_weight(&mut self, _: f64) {}
///     fn eval(&self, a: &Point3, b: &Point3, _t: f64) -> f64 {
///         a.coords.iter().zip(&b.coords).map(|(x, y)| (x - y).abs()).sum()
///     }
///     fn clone_boxed(&self) -> Box<dyn BinaryFunctor<Point3>> { Box::new(self.clone()) }
/// }
///
/// let anchor = Anchor::new(Manhattan, Point3::new([0.5, 0.5, 0.5]));
/// assert_eq!(anchor.eval(&Point3::new([1.0, 0.5, 0.0]), 0.0), 1.0);
/// ```
#[derive(Debug, Clone)]
pub struct Anchor<P: ParametricPoint, B> {
    pub inner: B,
    pub reference: P,
    weight: Scalar<P>,
}

impl<P: ParametricPoint, B> Anchor<P, B> {
    /// Anchors `inner` at `reference` with unit weight.
    pub fn new(inner: B, reference: P) -> Self {
        Self {
            inner,
            reference,
            weight: Scalar::<P>::one(),
        }
    }

    /// Sets the weight, builder style.
    pub fn with_weight(mut self, weight: Scalar<P>) -> Self {
        self.weight = weight;
        self
    }
}

impl<P, B> UnaryFunctor<P> for Anchor<P, B>
where
    P: ParametricPoint,
    B: BinaryFunctor<P> + Clone + 'static,
{
    fn kind(&self) -> FunctorKind {
        ANCHOR
    }

    fn weight(&self) -> Scalar<P> {
        self.weight
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        self.weight = weight;
    }

    fn eval(&self, point: &P, t: Scalar<P>) -> Scalar<P> {
        self.inner.weight() * self.inner.eval(point, &self.reference, t)
    }

    fn params(&self) -> Vec<f64> {
        coordinates_f64(&self.reference).collect()
    }

    fn children(&self) -> Vec<FunctorRecord> {
        vec![FunctorRecord::of_binary::<P, _>(&self.inner)]
    }

    fn clone_boxed(&self) -> BoxedUnary<P> {
        Box::new(self.clone())
    }
}

/// Unary cost `inner(point, lerp(start, end, t))`.
#[derive(Debug, Clone)]
pub struct LinearDeviation<P: ParametricPoint, B> {
    pub inner: B,
    pub start: P,
    pub end: P,
    weight: Scalar<P>,
}

impl<P: ParametricPoint, B> LinearDeviation<P, B> {
    /// Measures deviation from the segment `start..end` with unit weight.
    ///
    /// # Panics
    ///
    /// Panics if the endpoints have different dimensions.
    pub fn new(inner: B, start: P, end: P) -> Self {
        assert_eq!(
            start.dimension(),
            end.dimension(),
            "LinearDeviation endpoints differ in dimension"
        );
        Self {
            inner,
            start,
            end,
            weight: Scalar::<P>::one(),
        }
    }

    /// Sets the weight, builder style.
    pub fn with_weight(mut self, weight: Scalar<P>) -> Self {
        self.weight = weight;
        self
    }

    /// Reference point at time `t`.
    pub fn reference_at(&self, t: Scalar<P>) -> P {
        P::lerp(&self.start, &self.end, t)
    }
}

impl<P, B> UnaryFunctor<P> for LinearDeviation<P, B>
where
    P: ParametricPoint,
    B: BinaryFunctor<P> + Clone + 'static,
{
    fn kind(&self) -> FunctorKind {
        LINEAR_DEVIATION
    }

    fn weight(&self) -> Scalar<P> {
        self.weight
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        self.weight = weight;
    }

    fn eval(&self, point: &P, t: Scalar<P>) -> Scalar<P> {
        self.inner.weight() * self.inner.eval(point, &self.reference_at(t), t)
    }

    fn eval_start(&self, point: &P) -> Scalar<P> {
        self.inner.weight() * self.inner.eval_start(point, &self.start)
    }

    fn eval_end(&self, point: &P) -> Scalar<P> {
        self.inner.weight() * self.inner.eval_end(point, &self.end)
    }

    /// Start coordinates followed by end coordinates.
    fn params(&self) -> Vec<f64> {
        coordinates_f64(&self.start)
            .chain(coordinates_f64(&self.end))
            .collect()
    }

    fn children(&self) -> Vec<FunctorRecord> {
        vec![FunctorRecord::of_binary::<P, _>(&self.inner)]
    }

    fn clone_boxed(&self) -> BoxedUnary<P> {
        Box::new(self.clone())
    }
}

/// N-ary cost `sum_i w_i * inner(points[i], reference)`.
///
/// Keeps a whole range of points near one reference, with the per-point
/// weights deciding which points matter most.
#[derive(Debug, Clone)]
pub struct NaryAnchor<P: ParametricPoint, B> {
    pub inner: B,
    pub reference: P,
    weight: Scalar<P>,
    point_weights: Vec<Scalar<P>>,
}

impl<P: ParametricPoint, B> NaryAnchor<P, B> {
    /// Anchors every point of the range at `reference`.
    pub fn new(inner: B, reference: P) -> Self {
        Self {
            inner,
            reference,
            weight: Scalar::<P>::one(),
            point_weights: Vec::new(),
        }
    }

    /// Sets the weight, builder style.
    pub fn with_weight(mut self, weight: Scalar<P>) -> Self {
        self.weight = weight;
        self
    }
}

impl<P, B> NaryFunctor<P> for NaryAnchor<P, B>
where
    P: ParametricPoint,
    B: BinaryFunctor<P> + Clone + 'static,
{
    fn kind(&self) -> FunctorKind {
        NARY_ANCHOR
    }

    fn weight(&self) -> Scalar<P> {
        self.weight
    }

    fn set_weight(&mut self, weight: Scalar<P>) {
        self.weight = weight;
    }

    fn point_weights(&self) -> &[Scalar<P>] {
        &self.point_weights
    }

    fn set_point_weights(&mut self, weights: Vec<Scalar<P>>) {
        self.point_weights = weights;
    }

    fn eval(&self, points: &[P], t: Scalar<P>) -> Scalar<P> {
        assert!(
            self.point_weights.is_empty() || self.point_weights.len() == points.len(),
            "NaryAnchor: {} point weights for {} points",
            self.point_weights.len(),
            points.len()
        );
        points
            .iter()
            .enumerate()
            .fold(Scalar::<P>::zero(), |acc, (i, p)| {
                let term = self.inner.weight() * self.inner.eval(p, &self.reference, t);
                acc + point_weight(&self.point_weights, i) * term
            })
    }

    fn params(&self) -> Vec<f64> {
        coordinates_f64(&self.reference).collect()
    }

    fn children(&self) -> Vec<FunctorRecord> {
        vec![FunctorRecord::of_binary::<P, _>(&self.inner)]
    }

    fn clone_boxed(&self) -> BoxedNary<P> {
        Box::new(self.clone())
    }
}
