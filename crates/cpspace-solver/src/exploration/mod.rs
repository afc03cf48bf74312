//! Exploration solver adapter.
//!
//! [`ExplorationSolver`] binds a [`ConstrainedParameterSpace`] and exposes it
//! as a [`LeastSquaresProblem`]. The movable points of the optimized layer
//! are flattened into a variable vector; every evaluation writes a residual
//! vector with the block structure described in [`crate::layout`].
//!
//! Typical use:
//!
//! 1. populate the space and bind it
//! 2. lock the points that must not move
//! 3. call [`setup`](ExplorationSolver::setup), then
//!    [`init_constraints_internals`](ExplorationSolver::init_constraints_internals)
//! 4. seed the variables with
//!    [`update_variables_from_graph`](ExplorationSolver::update_variables_from_graph)
//! 5. let the external solver call [`residuals`](LeastSquaresProblem::residuals)
//! 6. commit with [`update_graph_from_variables`](ExplorationSolver::update_graph_from_variables)
//!
//! Evaluation takes `&self`: while one thread evaluates, another may write
//! point values through [`cps`](ExplorationSolver::cps). Locked points pick
//! such writes up on the next evaluation.

mod locking;


use std::collections::HashSet;

use cpspace_config::{ExplorationConfig, VisionType};
use cpspace_core::functor::{scalar_from_f64, Scalar};
use cpspace_core::space::SpinLock;
use cpspace_core::{
    ConstrainedParameterSpace, ConstraintId, GlobalConstraintId, LayerId, ParametricPoint,
    PointId,
};
use num_traits::{Float, ToPrimitive, Zero};
use tracing::{debug, info, trace};

use crate::error::{ExplorationError, Result};
use crate::layout::ResidualLayout;
use crate::problem::LeastSquaresProblem;
use crate::vision::{GamutCheck, IdentityVision, UnitCubeGamut, VisionSimulator};

/// Offset of a point that is not movable.
const NOT_MOVABLE: usize = usize::MAX;

/// Working copies used during one evaluation.
#[derive(Debug)]
struct Scratch<P> {
    /// Indexed by point id; only the optimized layer is kept current.
    values: Vec<P>,
    /// Simulated views of a constraint's endpoints.
    simulated: Option<[P; 2]>,
    /// Movable points in order, handed to global functors; empty without globals.
    gathered: Vec<P>,
}

/// Residual function of a constrained parameter space.
///
/// `V` simulates vision types and `G` measures the out-of-gamut penalty;
/// both default to no-op implementations.
#[derive(Debug)]
pub struct ExplorationSolver<P, V = IdentityVision, G = UnitCubeGamut>
where
    P: ParametricPoint,
{
    cps: ConstrainedParameterSpace<P>,
    config: ExplorationConfig,
    vision: V,
    gamut: G,
    locked: HashSet<PointId>,

    // rebuilt by setup()
    layer: LayerId,
    movable: Vec<PointId>,
    offsets: Vec<usize>,
    active_dims: Vec<usize>,
    binary_terms: Vec<ConstraintId>,
    globals: Vec<GlobalConstraintId>,
    layout: ResidualLayout,
    time: Scalar<P>,
    gamut_weight: Scalar<P>,
    scratch: SpinLock<Scratch<P>>,
    initialized: bool,
}

impl<P: ParametricPoint> ExplorationSolver<P> {
    /// Binds `cps` with the default configuration and simulators.
    pub fn new(cps: ConstrainedParameterSpace<P>) -> Self {
        Self::with_simulators(cps, IdentityVision, UnitCubeGamut)
    }
}

impl<P, V, G> ExplorationSolver<P, V, G>
where
    P: ParametricPoint,
    V: VisionSimulator<P>,
    G: GamutCheck<P>,
{
    /// Binds `cps` with custom vision and gamut implementations.
    pub fn with_simulators(cps: ConstrainedParameterSpace<P>, vision: V, gamut: G) -> Self {
        Self {
            cps,
            config: ExplorationConfig::default(),
            vision,
            gamut,
            locked: HashSet::new(),
            layer: LayerId::INVALID,
            movable: Vec::new(),
            offsets: Vec::new(),
            active_dims: Vec::new(),
            binary_terms: Vec::new(),
            globals: Vec::new(),
            layout: ResidualLayout::default(),
            time: <Scalar<P> as Zero>::zero(),
            gamut_weight: <Scalar<P> as Zero>::zero(),
            scratch: SpinLock::new(Scratch {
                values: Vec::new(),
                simulated: None,
                gathered: Vec::new(),
            }),
            initialized: false,
        }
    }

    /// The bound space.
    pub fn cps(&self) -> &ConstrainedParameterSpace<P> {
        &self.cps
    }

    /// Mutable access to the bound space.
    ///
    /// Structural changes require a new [`setup`](Self::setup), so this
    /// clears the initialized flag.
    pub fn cps_mut(&mut self) -> &mut ConstrainedParameterSpace<P> {
        self.initialized = false;
        &mut self.cps
    }

    /// Unbinds and returns the space.
    pub fn into_inner(self) -> ConstrainedParameterSpace<P> {
        self.cps
    }

    pub fn config(&self) -> &ExplorationConfig {
        &self.config
    }

    /// Returns true once [`setup`](Self::setup) ran and nothing invalidated it.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Selects layer 0 (`true`) or layer 1 (`false`) as the movable one.
    pub fn optimize_start_palette(&mut self, enabled: bool) {
        self.config.optimize_start_palette = enabled;
        self.initialized = false;
        debug!(event = "exploration_layer_selected", layer = self.config.movable_layer());
    }

    /// Replaces the active vision types.
    ///
    /// # Errors
    ///
    /// `Config` if the list is empty, too long, or has duplicates.
    pub fn set_vision_types(&mut self, vision: Vec<VisionType>) -> Result<()> {
        let config = self.config.clone().with_vision(vision);
        config.validate()?;
        self.config = config;
        self.initialized = false;
        Ok(())
    }

    /// Restricts the coordinates that take part in optimization.
    ///
    /// The mask length is checked against the point dimension in `setup()`.
    pub fn set_subspace(&mut self, mask: Option<Vec<bool>>) {
        self.config.subspace = mask;
        self.initialized = false;
    }

    /// Writes zeros into the binary block when `skip` is true.
    ///
    /// Block sizes do not change, so no new setup is needed.
    pub fn set_skip_binary(&mut self, skip: bool) {
        self.config.skip_binary = skip;
    }

    /// Layer whose points are movable, valid after setup.
    pub fn optimized_layer(&self) -> LayerId {
        self.layer
    }

    /// Block sizes computed by the last setup.
    pub fn layout(&self) -> ResidualLayout {
        self.layout
    }

    /// Movable points in variable order.
    pub fn movable_points(&self) -> &[PointId] {
        &self.movable
    }

    /// Offset of a movable point in the variable vector.
    pub fn variable_offset(&self, id: PointId) -> Option<usize> {
        self.offsets
            .get(id.index())
            .copied()
            .filter(|&offset| offset != NOT_MOVABLE)
    }

    /// Variables per movable point.
    pub fn variables_per_point(&self) -> usize {
        self.active_dims.len()
    }

    /// Length of the variable vector.
    pub fn variable_count(&self) -> usize {
        self.movable.len() * self.active_dims.len()
    }

    /// Rebuilds the indirection table and the residual layout.
    ///
    /// Must run after any structural change to the space, any change to
    /// the locked set, and any configuration change other than
    /// `skip_binary`.
    ///
    /// # Errors
    ///
    /// - `MissingLayer` if the optimized layer does not exist
    /// - `SubspaceLength` if the mask does not match the point dimension
    /// - `Cps` if a configured scalar cannot be represented
    pub fn setup(&mut self) -> Result<ResidualLayout> {
        let layer = LayerId::new(self.config.movable_layer());
        if !self.cps.has_layer(layer) {
            return Err(ExplorationError::MissingLayer {
                layer: layer.index(),
                count: self.cps.layers_count(),
            });
        }

        let dimension = self.cps.dimension().unwrap_or(0);
        self.active_dims = match &self.config.subspace {
            Some(mask) if dimension > 0 => {
                if mask.len() != dimension {
                    return Err(ExplorationError::SubspaceLength {
                        expected: dimension,
                        found: mask.len(),
                    });
                }
                (0..dimension).filter(|&d| mask[d]).collect()
            }
            _ => (0..dimension).collect(),
        };

        self.time = scalar_from_f64(self.config.interpolation_time)?;
        self.gamut_weight = scalar_from_f64(self.config.out_of_gamut_weight)?;

        let layer_points = self.cps.layer_parametric_point_ids(layer);
        self.movable.clear();
        self.movable.extend(
            layer_points
                .iter()
                .copied()
                .filter(|id| !self.locked.contains(id)),
        );
        self.offsets.clear();
        self.offsets
            .resize(self.cps.all_parametric_points_count(), NOT_MOVABLE);
        let stride = self.active_dims.len();
        for (i, id) in self.movable.iter().enumerate() {
            self.offsets[id.index()] = i * stride;
        }

        self.binary_terms.clear();
        for &id in self.cps.layer_constraint_ids(layer) {
            let (a, b) = self.cps.constraint_endpoints(id);
            if !(self.locked.contains(&a) && self.locked.contains(&b)) {
                self.binary_terms.push(id);
            }
        }
        self.globals.clear();
        self.globals
            .extend_from_slice(self.cps.layer_global_constraint_ids(layer));

        self.layout = ResidualLayout {
            vision_count: self.config.vision.len(),
            binary_offset: self
                .binary_terms
                .iter()
                .map(|&id| self.cps.constraint_functors(id).len())
                .sum(),
            unary_offset: self
                .movable
                .iter()
                .map(|&id| self.cps.unary_functors(id).len())
                .sum(),
            out_of_gamut_offset: self.movable.len(),
            global_offset: self.globals.len(),
        };

        let values = self.cps.lock_values().clone();
        let simulated = layer_points
            .first()
            .map(|id| [values[id.index()].clone(), values[id.index()].clone()]);
        let gathered = if self.globals.is_empty() {
            Vec::new()
        } else {
            self.movable
                .iter()
                .map(|id| values[id.index()].clone())
                .collect()
        };
        *self.scratch.get_mut() = Scratch {
            values,
            simulated,
            gathered,
        };

        self.layer = layer;
        self.initialized = true;

        info!(
            event = "exploration_setup",
            layer = layer.index(),
            movable = self.movable.len(),
            locked = self.locked.len(),
            variables = self.variable_count(),
            binary = self.layout.binary_offset,
            vision_types = self.layout.vision_count,
            unary = self.layout.unary_offset,
            out_of_gamut = self.layout.out_of_gamut_offset,
            global = self.layout.global_offset,
            residuals = self.layout.len(),
        );
        Ok(self.layout)
    }

    /// Captures baselines for the optimized layer.
    ///
    /// Global constraints are captured over the movable points only, the
    /// same range they are evaluated over.
    ///
    /// # Panics
    ///
    /// Panics if [`setup`](Self::setup) has not run.
    pub fn init_constraints_internals(&mut self) -> Result<()> {
        self.assert_initialized();
        let offsets = &self.offsets;
        self.cps.init_constraints_internals_with(self.layer, |id| {
            offsets
                .get(id.index())
                .is_some_and(|&offset| offset != NOT_MOVABLE)
        })?;
        Ok(())
    }

    /// Returns true if `len` matches the residual layout.
    pub fn check_blocks_size_consistency(&self, len: usize) -> bool {
        len == self.layout.len()
    }

    fn assert_initialized(&self) {
        assert!(
            self.initialized,
            "ExplorationSolver::setup() must run before evaluation"
        );
    }

    fn check_vars_len(&self, len: usize) -> Result<()> {
        let expected = self.variable_count();
        if len == expected {
            Ok(())
        } else {
            Err(ExplorationError::VariablesLength {
                expected,
                found: len,
            })
        }
    }

    /// Copies each movable point's active coordinates into `vars`.
    ///
    /// # Errors
    ///
    /// `VariablesLength` if `vars` does not hold one slot per variable.
    ///
    /// # Panics
    ///
    /// Panics if [`setup`](Self::setup) has not run.
    pub fn update_variables_from_graph(&self, vars: &mut [Scalar<P>]) -> Result<()> {
        self.assert_initialized();
        self.check_vars_len(vars.len())?;
        let stride = self.active_dims.len();
        let values = self.cps.lock_values();
        for (chunk, id) in vars.chunks_exact_mut(stride.max(1)).zip(&self.movable) {
            let coordinates = values[id.index()].coordinates();
            for (slot, &d) in chunk.iter_mut().zip(&self.active_dims) {
                *slot = coordinates[d];
            }
        }
        Ok(())
    }

    /// Writes `vars` back into the movable points' active coordinates.
    ///
    /// # Errors
    ///
    /// `VariablesLength` if `vars` does not hold one slot per variable.
    ///
    /// # Panics
    ///
    /// Panics if [`setup`](Self::setup) has not run.
    pub fn update_graph_from_variables(&self, vars: &[Scalar<P>]) -> Result<()> {
        self.assert_initialized();
        self.check_vars_len(vars.len())?;
        let stride = self.active_dims.len();
        let mut values = self.cps.lock_values();
        for (chunk, id) in vars.chunks_exact(stride.max(1)).zip(&self.movable) {
            let coordinates = values[id.index()].coordinates_mut();
            for (&value, &d) in chunk.iter().zip(&self.active_dims) {
                coordinates[d] = value;
            }
        }
        Ok(())
    }

    /// Fills `out` with the residuals at `vars`.
    ///
    /// # Panics
    ///
    /// Panics if [`setup`](Self::setup) has not run, if `vars` has the
    /// wrong length, or if `out` does not match the residual layout.
    pub fn evaluate(&self, vars: &[Scalar<P>], out: &mut [Scalar<P>]) {
        self.assert_initialized();
        assert_eq!(
            vars.len(),
            self.variable_count(),
            "variable vector has the wrong length"
        );
        assert!(
            self.check_blocks_size_consistency(out.len()),
            "residual vector has {} entries, layout needs {}",
            out.len(),
            self.layout.len()
        );

        let mut guard = self.scratch.lock();
        let Scratch {
            values,
            simulated,
            gathered,
        } = &mut *guard;

        {
            let current = self.cps.lock_values();
            for &id in self.cps.layer_parametric_point_ids(self.layer) {
                values[id.index()].clone_from(&current[id.index()]);
            }
        }
        let stride = self.active_dims.len();
        for (chunk, id) in vars.chunks_exact(stride.max(1)).zip(&self.movable) {
            let coordinates = values[id.index()].coordinates_mut();
            for (&value, &d) in chunk.iter().zip(&self.active_dims) {
                coordinates[d] = value;
            }
        }

        let zero = <Scalar<P> as Zero>::zero();
        let t = self.time;
        let mut row = 0;

        for &vision in &self.config.vision {
            for &id in &self.binary_terms {
                let functors = self.cps.constraint_functors(id);
                if self.config.skip_binary {
                    out[row..row + functors.len()].fill(zero);
                    row += functors.len();
                    continue;
                }
                let (a, b) = self.cps.constraint_endpoints(id);
                let (pa, pb) = (&values[a.index()], &values[b.index()]);
                let (pa, pb) = match (vision, simulated.as_mut()) {
                    (VisionType::Normal, _) | (_, None) => (pa, pb),
                    (_, Some([sa, sb])) => {
                        self.vision.simulate(vision, pa, sa);
                        self.vision.simulate(vision, pb, sb);
                        (&*sa, &*sb)
                    }
                };
                for functor in functors {
                    out[row] = functor.residual(pa, pb, t);
                    row += 1;
                }
            }
        }

        for &id in &self.movable {
            let point = &values[id.index()];
            let importance = point.importance();
            for functor in self.cps.unary_functors(id) {
                out[row] = importance * functor.residual(point, t);
                row += 1;
            }
        }

        for &id in &self.movable {
            out[row] = self.gamut_weight * self.gamut.out_of_gamut(&values[id.index()]);
            row += 1;
        }

        if !self.globals.is_empty() {
            for (slot, id) in gathered.iter_mut().zip(&self.movable) {
                slot.clone_from(&values[id.index()]);
            }
            for &id in &self.globals {
                out[row] = self.cps.global_functor(id).residual(&gathered[..], t);
                row += 1;
            }
        }

        assert_eq!(row, out.len(), "residual blocks do not fill the vector");
        trace!(
            event = "exploration_evaluated",
            residuals = row,
            cost = half_squared_norm(out).to_f64().unwrap_or(f64::NAN),
        );
    }

    /// Half the squared norm of the residual at `vars`.
    pub fn total_cost(&self, vars: &[Scalar<P>]) -> Scalar<P> {
        let mut out = vec![<Scalar<P> as Zero>::zero(); self.layout.len()];
        self.evaluate(vars, &mut out);
        half_squared_norm(&out)
    }
}

fn half_squared_norm<S: Float>(values: &[S]) -> S {
    let sum = values.iter().fold(S::zero(), |acc, &r| acc + r * r);
    sum / (S::one() + S::one())
}

impl<P, V, G> LeastSquaresProblem for ExplorationSolver<P, V, G>
where
    P: ParametricPoint,
    V: VisionSimulator<P>,
    G: GamutCheck<P>,
{
    type Scalar = Scalar<P>;

    fn variable_dim(&self) -> usize {
        self.variable_count()
    }

    fn residual_dim(&self) -> usize {
        self.layout.len()
    }

    fn residuals(&mut self, vars: &[Scalar<P>], out: &mut [Scalar<P>]) {
        self.evaluate(vars, out);
    }
}
