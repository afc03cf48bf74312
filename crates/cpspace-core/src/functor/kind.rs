//! Functor type identity.

use std::fmt;

/// Stable type tag of a functor kind.
///
/// Two functors of the same concrete kind always carry equal tags, whatever
/// their address or parameters. Tags are compared by name, which is also the
/// key used by [`FunctorRegistry`](super::FunctorRegistry) when rebuilding
/// functors from a snapshot.
///
/// # Example
///
/// ```
/// use cpspace_core::FunctorKind;
///
/// const CONTRAST: FunctorKind = FunctorKind::new("contrast");
///
/// assert_eq!(CONTRAST, FunctorKind::new("contrast"));
/// assert_ne!(CONTRAST, FunctorKind::new("hue"));
/// assert_eq!(CONTRAST.name(), "contrast");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FunctorKind(&'static str);

impl FunctorKind {
    /// Creates a tag from a kind name.
    pub const fn new(name: &'static str) -> Self {
        FunctorKind(name)
    }

    /// Returns the kind name.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FunctorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Tag of [`Add`](super::Add).
pub const ADD: FunctorKind = FunctorKind::new("add");
/// Tag of [`Multiply`](super::Multiply).
pub const MULTIPLY: FunctorKind = FunctorKind::new("multiply");
/// Tag of [`Anchor`](super::Anchor).
pub const ANCHOR: FunctorKind = FunctorKind::new("anchor");
/// Tag of [`LinearDeviation`](super::LinearDeviation).
pub const LINEAR_DEVIATION: FunctorKind = FunctorKind::new("linear_deviation");
/// Tag of [`NaryAnchor`](super::NaryAnchor).
pub const NARY_ANCHOR: FunctorKind = FunctorKind::new("nary_anchor");
