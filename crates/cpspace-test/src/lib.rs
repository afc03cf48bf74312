//! Shared test fixtures for cpspace crates.
//!
//! This crate provides concrete functors and ready-made spaces for testing.
//! It depends on `cpspace-core` only, so the solver crate can use it as a
//! dev-dependency.
//!
//! - [`functors`] - Sample unary, binary and n-ary functors over [`Point3`]
//! - [`palette`] - The two-layer, three-color palette used across tests
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! cpspace-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use cpspace_test::palette::{two_layer_palette, Palette};
//! use cpspace_test::functors::ChannelDistance;
//! ```
//!
//! [`Point3`]: cpspace_core::Point3

pub mod functors;
pub mod palette;

pub use functors::{fixture_registry, Brightness, ChannelDistance, Euclidean, Spread};
pub use palette::{two_layer_palette, Palette};
