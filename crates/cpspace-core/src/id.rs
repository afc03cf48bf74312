//! Dense integer identifiers.
//!
//! Ids are handed out in creation order starting at zero and are never
//! recycled until the owning store is cleared.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates a `usize` newtype id with an `INVALID` sentinel.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            /// Sentinel that never names a live entity.
            pub const INVALID: $name = $name(usize::MAX);

            /// Wraps a raw index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                $name(index)
            }

            /// Returns the raw index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0
            }

            /// Returns true unless this is [`Self::INVALID`].
            #[inline]
            pub const fn is_valid(self) -> bool {
                self.0 != usize::MAX
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                $name(index)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.is_valid() {
                    write!(f, "{}", self.0)
                } else {
                    f.write_str("INVALID")
                }
            }
        }
    };
}

define_id!(
    /// Identifies a parametric point (a graph vertex).
    PointId
);
define_id!(
    /// Identifies a cross-layer pairing edge.
    PairingId
);
define_id!(
    /// Identifies a binary constraint edge.
    ConstraintId
);
define_id!(
    /// Identifies a layer-scoped global constraint.
    GlobalConstraintId
);
define_id!(
    /// Identifies a layer.
    LayerId
);
define_id!(
    /// Identifies an edge inside a [`Graph`](crate::graph::Graph).
    EdgeId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sentinel() {
        assert!(!PointId::INVALID.is_valid());
        assert!(PointId::new(0).is_valid());
        assert_eq!(LayerId::default(), LayerId::INVALID);
    }

    #[test]
    fn test_display() {
        assert_eq!(ConstraintId(7).to_string(), "7");
        assert_eq!(PairingId::INVALID.to_string(), "INVALID");
    }
}
