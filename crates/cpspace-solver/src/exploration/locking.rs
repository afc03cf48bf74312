//! Locked-point bookkeeping and configuration.

use cpspace_config::ExplorationConfig;
use cpspace_core::{LayerId, ParametricPoint, PointId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use super::ExplorationSolver;
use crate::error::{ExplorationError, Result};
use crate::vision::{GamutCheck, VisionSimulator};

impl<P, V, G> ExplorationSolver<P, V, G>
where
    P: ParametricPoint,
    V: VisionSimulator<P>,
    G: GamutCheck<P>,
{
    fn check_points(&self, ids: &[PointId]) -> Result<()> {
        match ids.iter().find(|&&id| !self.cps.has_parametric_point(id)) {
            Some(&id) => Err(ExplorationError::UnknownPoint(id)),
            None => Ok(()),
        }
    }

    /// Adds points to the locked set.
    ///
    /// Takes effect at the next [`setup`](Self::setup).
    ///
    /// # Errors
    ///
    /// `UnknownPoint` if any id is not in the space; nothing is locked then.
    pub fn lock_parametric_points(&mut self, ids: &[PointId]) -> Result<()> {
        self.check_points(ids)?;
        self.locked.extend(ids.iter().copied());
        self.initialized = false;
        debug!(event = "exploration_locked", count = ids.len(), total = self.locked.len());
        Ok(())
    }

    /// Removes points from the locked set.
    ///
    /// # Errors
    ///
    /// `UnknownPoint` if any id is not in the space; nothing is unlocked then.
    pub fn unlock_parametric_points(&mut self, ids: &[PointId]) -> Result<()> {
        self.check_points(ids)?;
        for id in ids {
            self.locked.remove(id);
        }
        self.initialized = false;
        debug!(event = "exploration_unlocked", count = ids.len(), total = self.locked.len());
        Ok(())
    }

    /// Empties the locked set.
    pub fn unlock_all(&mut self) {
        self.locked.clear();
        self.initialized = false;
    }

    /// Returns true if `id` is in the locked set.
    pub fn is_parametric_point_locked(&self, id: PointId) -> bool {
        self.locked.contains(&id)
    }

    /// Locked points, in id order.
    pub fn locked_points(&self) -> Vec<PointId> {
        let mut ids: Vec<_> = self.locked.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Locks `round(ratio * n)` points of `layer`, picked by a seeded RNG.
    ///
    /// The same seed always picks the same points. Returns the newly
    /// picked points in id order.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `ratio` is outside `[0, 1]` or the layer does
    /// not exist.
    pub fn lock_random_ratio(&mut self, layer: LayerId, ratio: f64, seed: u64) -> Result<Vec<PointId>> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(ExplorationError::InvalidArgument(format!(
                "lock ratio must lie in [0, 1], found {ratio}"
            )));
        }
        if !self.cps.has_layer(layer) {
            return Err(ExplorationError::InvalidArgument(format!(
                "layer {layer} does not exist"
            )));
        }

        let mut candidates = self.cps.layer_parametric_point_ids(layer).to_vec();
        let count = (ratio * candidates.len() as f64).round() as usize;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        // partial Fisher-Yates: the first `count` slots end up shuffled
        for i in 0..count {
            let j = rng.random_range(i..candidates.len());
            candidates.swap(i, j);
        }
        candidates.truncate(count);
        candidates.sort_unstable();

        self.lock_parametric_points(&candidates)?;
        Ok(candidates)
    }

    /// Replaces the configuration and applies its locking section.
    ///
    /// Locking indices refer to positions in the movable layer's point
    /// list. Previously locked points stay locked.
    ///
    /// # Errors
    ///
    /// - `Config` if the configuration does not validate
    /// - `MissingLayer` if the movable layer does not exist
    /// - `LockIndex` if an index is past the end of the movable layer
    pub fn apply_config(&mut self, config: ExplorationConfig) -> Result<()> {
        config.validate()?;
        let layer = LayerId::new(config.movable_layer());
        if !self.cps.has_layer(layer) {
            return Err(ExplorationError::MissingLayer {
                layer: layer.index(),
                count: self.cps.layers_count(),
            });
        }

        if let Some(locking) = &config.locking {
            let points = self.cps.layer_parametric_point_ids(layer);
            let ids = locking
                .indices
                .iter()
                .map(|&index| {
                    points.get(index).copied().ok_or(ExplorationError::LockIndex {
                        index,
                        count: points.len(),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            self.lock_parametric_points(&ids)?;
            if let Some(ratio) = locking.ratio {
                self.lock_random_ratio(layer, ratio, locking.seed.unwrap_or(0))?;
            }
        }

        debug!(
            event = "exploration_configured",
            layer = layer.index(),
            vision_types = config.vision.len(),
            skip_binary = config.skip_binary,
        );
        self.config = config;
        self.initialized = false;
        Ok(())
    }
}
