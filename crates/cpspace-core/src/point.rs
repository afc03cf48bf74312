//! Parametric point types.
//!
//! A parametric point is a fixed-dimension numeric vector plus a scalar
//! importance. The graph and functor layers only see points through the
//! [`ParametricPoint`] trait, so callers may plug in their own
//! representation (colors, hatching parameters, 2-D positions).

use std::fmt::Debug;

use num_traits::Float;

/// A point in the optimization domain.
///
/// # Example
///
/// ```
/// use cpspace_core::{ParamPoint, ParametricPoint};
///
/// let mut p = ParamPoint::new([0.25, 0.5, 0.75]);
/// assert_eq!(p.dimension(), 3);
/// assert_eq!(p.importance(), 1.0);
///
/// p.coordinates_mut()[0] = 1.0;
/// assert_eq!(p.coordinates(), &[1.0, 0.5, 0.75]);
/// ```
pub trait ParametricPoint: Clone + Debug + Send + Sync + 'static {
    /// Numeric type of coordinates, costs and residuals.
    type Scalar: Float + Debug + Send + Sync + 'static;

    /// Number of coordinates.
    fn dimension(&self) -> usize {
        self.coordinates().len()
    }

    /// Coordinates in their native layout.
    fn coordinates(&self) -> &[Self::Scalar];

    /// Mutable coordinates in their native layout.
    fn coordinates_mut(&mut self) -> &mut [Self::Scalar];

    /// Importance weight of this point.
    fn importance(&self) -> Self::Scalar;

    /// Sets the importance weight of this point.
    fn set_importance(&mut self, importance: Self::Scalar);

    /// Builds a point from raw coordinates with unit importance.
    ///
    /// Returns `None` when `coordinates` has the wrong length.
    fn from_coordinates(coordinates: &[Self::Scalar]) -> Option<Self>;

    /// Linear interpolation `a + (b - a) * t`, keeping `a`'s importance.
    fn lerp(a: &Self, b: &Self, t: Self::Scalar) -> Self {
        let mut out = a.clone();
        for (o, (&x, &y)) in out
            .coordinates_mut()
            .iter_mut()
            .zip(a.coordinates().iter().zip(b.coordinates()))
        {
            *o = x + (y - x) * t;
        }
        out
    }
}

/// Stock fixed-dimension point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamPoint<T, const N: usize> {
    pub coords: [T; N],
    pub importance: T,
}

/// Three-channel point (colors).
pub type Point3 = ParamPoint<f64, 3>;

/// Two-channel point (positions).
pub type Point2 = ParamPoint<f64, 2>;

impl<T: Float, const N: usize> ParamPoint<T, N> {
    /// Creates a point with unit importance.
    pub fn new(coords: [T; N]) -> Self {
        Self {
            coords,
            importance: T::one(),
        }
    }

    /// Sets the importance, builder style.
    pub fn with_importance(mut self, importance: T) -> Self {
        self.importance = importance;
        self
    }
}

impl<T: Float, const N: usize> Default for ParamPoint<T, N> {
    fn default() -> Self {
        Self::new([T::zero(); N])
    }
}

impl<T, const N: usize> ParametricPoint for ParamPoint<T, N>
where
    T: Float + Debug + Send + Sync + 'static,
{
    type Scalar = T;

    fn dimension(&self) -> usize {
        N
    }

    fn coordinates(&self) -> &[T] {
        &self.coords
    }

    fn coordinates_mut(&mut self) -> &mut [T] {
        &mut self.coords
    }

    fn importance(&self) -> T {
        self.importance
    }

    fn set_importance(&mut self, importance: T) {
        self.importance = importance;
    }

    fn from_coordinates(coordinates: &[T]) -> Option<Self> {
        let coords: [T; N] = coordinates.try_into().ok()?;
        Some(Self::new(coords))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_midpoint() {
        let a = Point3::new([0.0, 0.0, 0.0]).with_importance(2.0);
        let b = Point3::new([1.0, 2.0, 4.0]);
        let m = Point3::lerp(&a, &b, 0.5);
        assert_eq!(m.coords, [0.5, 1.0, 2.0]);
        assert_eq!(m.importance, 2.0);
    }

    #[test]
    fn test_from_coordinates_checks_length() {
        assert!(Point2::from_coordinates(&[1.0, 2.0]).is_some());
        assert!(Point2::from_coordinates(&[1.0]).is_none());
    }
}
