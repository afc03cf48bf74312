//! Residual vector layout.
//!
//! The residual vector is four contiguous blocks, in this order:
//!
//! | block | entries |
//! |---|---|
//! | binary | one per binary functor of the optimized layer, repeated per active vision type |
//! | unary | one per unary functor of a movable point |
//! | out of gamut | one per movable point |
//! | global | one per global constraint of the optimized layer |
//!
//! Sizes are fixed by `setup()` and stay valid until the next call.

use std::ops::Range;

/// Block sizes of one residual vector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResidualLayout {
    /// Number of active vision types.
    pub vision_count: usize,
    /// Binary entries per vision type.
    pub binary_offset: usize,
    pub unary_offset: usize,
    pub out_of_gamut_offset: usize,
    pub global_offset: usize,
}

impl ResidualLayout {
    /// Total residual count.
    ///
    /// # Example
    ///
    /// ```
    /// use cpspace_solver::ResidualLayout;
    ///
    /// let layout = ResidualLayout {
    ///     vision_count: 2,
    ///     binary_offset: 4,
    ///     unary_offset: 3,
    ///     out_of_gamut_offset: 3,
    ///     global_offset: 1,
    /// };
    /// assert_eq!(layout.len(), 2 * 4 + 3 + 3 + 1);
    /// assert_eq!(layout.binary_range(1), 4..8);
    /// assert_eq!(layout.global_range(), 14..15);
    /// ```
    pub fn len(&self) -> usize {
        self.vision_count * self.binary_offset
            + self.unary_offset
            + self.out_of_gamut_offset
            + self.global_offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Binary entries of the `vision`-th active vision type.
    pub fn binary_range(&self, vision: usize) -> Range<usize> {
        debug_assert!(vision < self.vision_count);
        let start = vision * self.binary_offset;
        start..start + self.binary_offset
    }

    pub fn unary_range(&self) -> Range<usize> {
        let start = self.vision_count * self.binary_offset;
        start..start + self.unary_offset
    }

    pub fn out_of_gamut_range(&self) -> Range<usize> {
        let start = self.unary_range().end;
        start..start + self.out_of_gamut_offset
    }

    pub fn global_range(&self) -> Range<usize> {
        let start = self.out_of_gamut_range().end;
        start..start + self.global_offset
    }
}
