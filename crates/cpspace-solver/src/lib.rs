//! cpspace Solver - Exploration adapter
//!
//! This crate turns a constrained parameter space into the residual function
//! of an external nonlinear least-squares solver:
//! - Locked-point bookkeeping and the movable-variable indirection table
//! - A block-structured residual layout, stable between `setup()` calls
//! - Vision and gamut seams for domain-specific point transforms
//! - A forward-difference Jacobian for solvers without derivatives
//!
//! Logging levels:
//! - **INFO**: setup summaries (block sizes, variable count)
//! - **DEBUG**: lock changes, configuration changes
//! - **TRACE**: per-evaluation cost

pub mod error;
pub mod exploration;
pub mod layout;
pub mod problem;
pub mod vision;

pub use error::ExplorationError;
pub use exploration::ExplorationSolver;
pub use layout::ResidualLayout;
pub use problem::{forward_difference_jacobian, LeastSquaresProblem};
pub use vision::{GamutCheck, IdentityVision, UnitCubeGamut, VisionSimulator};

pub use cpspace_config::VisionType;
