//! Configuration system for cpspace.
//!
//! Load exploration configuration from TOML or YAML files to control which
//! layer moves, which vision variants are optimized, how points are locked,
//! and what the external solver is told about termination.
//!
//! # Examples
//!
//! Load configuration from TOML string:
//!
//! ```
//! use cpspace_config::{ExplorationConfig, VisionType};
//!
//! let config = ExplorationConfig::from_toml_str(r#"
//!     optimize_start_palette = true
//!     vision = ["normal", "deuteranopia"]
//!     subspace = [true, true, false]
//!
//!     [locking]
//!     indices = [0, 2]
//!
//!     [termination]
//!     max_evaluations = 500
//! "#).unwrap();
//!
//! assert!(config.optimize_start_palette);
//! assert_eq!(config.vision, vec![VisionType::Normal, VisionType::Deuteranopia]);
//! assert_eq!(config.max_evaluations(), Some(500));
//! ```
//!
//! Use default config when file is missing:
//!
//! ```
//! use cpspace_config::ExplorationConfig;
//!
//! let config = ExplorationConfig::load("exploration.toml").unwrap_or_default();
//! // Proceeds with defaults if file doesn't exist
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Most vision variants optimized at once.
pub const MAX_VISION_TYPES: usize = 3;

/// Main exploration configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ExplorationConfig {
    /// Move layer 0 instead of layer 1.
    pub optimize_start_palette: bool,

    /// Vision variants whose binary block is evaluated.
    pub vision: Vec<VisionType>,

    /// Per-coordinate enable mask; `None` enables every coordinate.
    pub subspace: Option<Vec<bool>>,

    /// Weight of the out-of-gamut penalty.
    pub out_of_gamut_weight: f64,

    /// Write zeros into the binary block (warm starts around locked points).
    pub skip_binary: bool,

    /// Time at which functors are evaluated while exploring.
    pub interpolation_time: f64,

    /// Step used by the forward-difference Jacobian.
    pub finite_difference_epsilon: f64,

    /// Which points start locked.
    pub locking: Option<LockingConfig>,

    /// Passed through to the external solver.
    pub termination: Option<TerminationConfig>,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            optimize_start_palette: false,
            vision: vec![VisionType::Normal],
            subspace: None,
            out_of_gamut_weight: 1000.0,
            skip_binary: false,
            interpolation_time: 0.0,
            finite_difference_epsilon: 1e-6,
            locking: None,
            termination: None,
        }
    }
}

impl ExplorationConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Selects the movable layer.
    pub fn with_optimize_start_palette(mut self, enabled: bool) -> Self {
        self.optimize_start_palette = enabled;
        self
    }

    /// Replaces the active vision variants.
    pub fn with_vision(mut self, vision: Vec<VisionType>) -> Self {
        self.vision = vision;
        self
    }

    /// Sets the per-coordinate enable mask.
    pub fn with_subspace(mut self, mask: Vec<bool>) -> Self {
        self.subspace = Some(mask);
        self
    }

    /// Enables or disables the binary block.
    pub fn with_skip_binary(mut self, skip: bool) -> Self {
        self.skip_binary = skip;
        self
    }

    /// Sets the evaluation time used while exploring.
    pub fn with_interpolation_time(mut self, t: f64) -> Self {
        self.interpolation_time = t;
        self
    }

    /// Locks the points at these indices of the movable layer.
    pub fn with_locked_indices(mut self, indices: Vec<usize>) -> Self {
        self.locking = Some(LockingConfig {
            indices,
            ..self.locking.unwrap_or_default()
        });
        self
    }

    /// Locks a random share of the movable layer.
    pub fn with_locked_ratio(mut self, ratio: f64, seed: u64) -> Self {
        self.locking = Some(LockingConfig {
            ratio: Some(ratio),
            seed: Some(seed),
            ..self.locking.unwrap_or_default()
        });
        self
    }

    /// Sets the evaluation budget handed to the solver.
    pub fn with_max_evaluations(mut self, evaluations: u64) -> Self {
        self.termination = Some(TerminationConfig {
            max_evaluations: Some(evaluations),
            ..self.termination.unwrap_or_default()
        });
        self
    }

    /// Returns the evaluation budget, if configured.
    pub fn max_evaluations(&self) -> Option<u64> {
        self.termination.as_ref().and_then(|t| t.max_evaluations)
    }

    /// Index of the layer whose points move.
    pub fn movable_layer(&self) -> usize {
        if self.optimize_start_palette {
            0
        } else {
            1
        }
    }

    /// Checks values serde cannot express as types.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vision.is_empty() || self.vision.len() > MAX_VISION_TYPES {
            return Err(ConfigError::Invalid(format!(
                "vision must list 1 to {MAX_VISION_TYPES} types, found {}",
                self.vision.len()
            )));
        }
        for (i, v) in self.vision.iter().enumerate() {
            if self.vision[..i].contains(v) {
                return Err(ConfigError::Invalid(format!("vision type {v:?} listed twice")));
            }
        }
        if let Some(mask) = &self.subspace {
            if !mask.iter().any(|&enabled| enabled) {
                return Err(ConfigError::Invalid(
                    "subspace must enable at least one coordinate".to_string(),
                ));
            }
        }
        if !(self.out_of_gamut_weight.is_finite() && self.out_of_gamut_weight >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "out_of_gamut_weight must be finite and non-negative, found {}",
                self.out_of_gamut_weight
            )));
        }
        if !(0.0..=1.0).contains(&self.interpolation_time) {
            return Err(ConfigError::Invalid(format!(
                "interpolation_time must lie in [0, 1], found {}",
                self.interpolation_time
            )));
        }
        if !(self.finite_difference_epsilon > 0.0 && self.finite_difference_epsilon.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "finite_difference_epsilon must be positive, found {}",
                self.finite_difference_epsilon
            )));
        }
        if let Some(ratio) = self.locking.as_ref().and_then(|l| l.ratio) {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ConfigError::Invalid(format!(
                    "locking.ratio must lie in [0, 1], found {ratio}"
                )));
            }
        }
        Ok(())
    }
}

/// Simulated vision variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisionType {
    /// Unaltered vision.
    #[default]
    Normal,

    /// Missing long-wavelength cones.
    Protanopia,

    /// Missing medium-wavelength cones.
    Deuteranopia,

    /// Missing short-wavelength cones.
    Tritanopia,
}

/// Initial locking configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct LockingConfig {
    /// Indices into the movable layer's point list.
    pub indices: Vec<usize>,

    /// Share of the movable layer to lock at random.
    pub ratio: Option<f64>,

    /// Seed of the random selection.
    pub seed: Option<u64>,
}

/// Termination hints forwarded to the external solver.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TerminationConfig {
    /// Maximum residual evaluations.
    pub max_evaluations: Option<u64>,

    /// Relative cost change below which the solver stops.
    pub function_tolerance: Option<f64>,

    /// Relative variable change below which the solver stops.
    pub parameter_tolerance: Option<f64>,
}

#[cfg(test)]
mod tests;
