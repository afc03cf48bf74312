//! Sample functors over three-channel points.
//!
//! These are deliberately simple metrics with closed-form values, so tests
//! can assert exact residuals.

use cpspace_core::functor::{BoxedBinary, BoxedNary, BoxedUnary, FunctorRegistry};
use cpspace_core::{BinaryFunctor, FunctorKind, NaryFunctor, Point3, UnaryFunctor};

/// Absolute difference along one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelDistance {
    pub channel: usize,
    pub weight: f64,
}

impl ChannelDistance {
    pub const KIND: FunctorKind = FunctorKind::new("channel_distance");

    /// Creates a unit-weight distance along `channel`.
    pub fn new(channel: usize) -> Self {
        Self {
            channel,
            weight: 1.0,
        }
    }

    /// Sets the weight, builder style.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl BinaryFunctor<Point3> for ChannelDistance {
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
        (a.coords[self.channel] - b.coords[self.channel]).abs()
    }

    fn params(&self) -> Vec<f64> {
        vec![self.channel as f64]
    }

    fn clone_boxed(&self) -> BoxedBinary<Point3> {
        Box::new(self.clone())
    }
}

/// Euclidean distance over all channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Euclidean {
    pub weight: f64,
}

impl Euclidean {
    pub const KIND: FunctorKind = FunctorKind::new("euclidean");

    pub fn new() -> Self {
        Self { weight: 1.0 }
    }

    /// Sets the weight, builder style.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}

impl Default for Euclidean {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryFunctor<Point3> for Euclidean {
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
            .map(|(x, y)| (x - y) * (x - y))
            .sum::<f64>()
            .sqrt()
    }

    fn clone_boxed(&self) -> BoxedBinary<Point3> {
        Box::new(self.clone())
    }
}

/// Mean of the three channels.
#[derive(Clone, Debug, PartialEq)]
pub struct Brightness {
    pub weight: f64,
}

impl Brightness {
    pub const KIND: FunctorKind = FunctorKind::new("brightness");

    pub fn new() -> Self {
        Self { weight: 1.0 }
    }
}

impl Default for Brightness {
    fn default() -> Self {
        Self::new()
    }
}

impl UnaryFunctor<Point3> for Brightness {
    fn kind(&self) -> FunctorKind {
        Self::KIND
    }

    fn weight(&self) -> f64 {
        self.weight
    }

    fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    fn eval(&self, point: &Point3, _t: f64) -> f64 {
        point.coords.iter().sum::<f64>() / 3.0
    }

    fn clone_boxed(&self) -> BoxedUnary<Point3> {
        Box::new(self.clone())
    }
}

/// Weighted sum of each point's Manhattan distance to the range centroid.
///
/// Zero when every point coincides; grows as the points spread out.
#[derive(Clone, Debug, PartialEq)]
pub struct Spread {
    pub weight: f64,
    pub point_weights: Vec<f64>,
}

impl Spread {
    pub const KIND: FunctorKind = FunctorKind::new("spread");

    pub fn new() -> Self {
        Self {
            weight: 1.0,
            point_weights: Vec::new(),
        }
    }
}

impl Default for Spread {
    fn default() -> Self {
        Self::new()
    }
}

impl NaryFunctor<Point3> for Spread {
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
        if points.is_empty() {
            return 0.0;
        }
        let mut centroid = [0.0; 3];
        for point in points {
            for (c, x) in centroid.iter_mut().zip(&point.coords) {
                *c += x;
            }
        }
        for c in &mut centroid {
            *c /= points.len() as f64;
        }
        points
            .iter()
            .enumerate()
            .map(|(i, point)| {
                let w = self.point_weights.get(i).copied().unwrap_or(1.0);
                w * point
                    .coords
                    .iter()
                    .zip(&centroid)
                    .map(|(x, c)| (x - c).abs())
                    .sum::<f64>()
            })
            .sum()
    }

    fn clone_boxed(&self) -> BoxedNary<Point3> {
        Box::new(self.clone())
    }
}

/// A registry knowing the builtins plus every fixture functor.
pub fn fixture_registry() -> FunctorRegistry<Point3> {
    let mut registry = FunctorRegistry::with_builtins();
    registry.register_binary(ChannelDistance::KIND.name(), |record, _| {
        let channel = record.params.first().copied().unwrap_or(0.0) as usize;
        Ok(Box::new(ChannelDistance::new(channel)))
    });
    registry.register_binary(Euclidean::KIND.name(), |_, _| Ok(Box::new(Euclidean::new())));
    registry.register_unary(Brightness::KIND.name(), |_, _| Ok(Box::new(Brightness::new())));
    registry.register_nary(Spread::KIND.name(), |_, _| Ok(Box::new(Spread::new())));
    registry
}
