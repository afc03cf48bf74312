//! Seams for domain transforms applied during evaluation.
//!
//! Color-vision simulation and color-space conversion live outside this
//! crate. The adapter only needs two things from them: a way to view a
//! point as seen under a [`VisionType`], and a measure of how far a point
//! lies outside its valid domain.

use cpspace_config::VisionType;
use cpspace_core::ParametricPoint;
use num_traits::{Float, One, Zero};

/// Simulates how a point is perceived under a vision type.
pub trait VisionSimulator<P: ParametricPoint>: Send + Sync {
    /// Writes the simulated view of `point` into `out`.
    ///
    /// `out` has the same dimension as `point`; its importance must be
    /// left untouched. Never called for [`VisionType::Normal`].
    fn simulate(&self, vision: VisionType, point: &P, out: &mut P);
}

/// Measures how far a point lies outside its valid domain.
pub trait GamutCheck<P: ParametricPoint>: Send + Sync {
    /// Zero inside the domain, positive and growing outside it.
    fn out_of_gamut(&self, point: &P) -> P::Scalar;
}

/// Every vision type sees the point unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IdentityVision;

impl<P: ParametricPoint> VisionSimulator<P> for IdentityVision {
    fn simulate(&self, _vision: VisionType, point: &P, out: &mut P) {
        out.coordinates_mut().copy_from_slice(point.coordinates());
    }
}

/// Valid domain is `[0, 1]` on every coordinate.
///
/// The penalty is the summed distance to the cube.
///
/// ```
/// use cpspace_core::Point3;
/// use cpspace_solver::{GamutCheck, UnitCubeGamut};
///
/// assert_eq!(UnitCubeGamut.out_of_gamut(&Point3::new([0.5, 0.0, 1.0])), 0.0);
/// assert_eq!(UnitCubeGamut.out_of_gamut(&Point3::new([1.5, -0.25, 0.5])), 0.75);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCubeGamut;

impl<P: ParametricPoint> GamutCheck<P> for UnitCubeGamut {
    fn out_of_gamut(&self, point: &P) -> P::Scalar {
        let zero = P::Scalar::zero();
        let one = P::Scalar::one();
        point
            .coordinates()
            .iter()
            .fold(zero, |acc, &c| acc + (zero - c).max(zero) + (c - one).max(zero))
    }
}
