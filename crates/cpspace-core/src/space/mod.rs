//! Constrained parameter space.
//!
//! The space owns:
//! - the topology: one graph for pairings, one for constraints, both over
//!   the same dense point ids
//! - the payload: per-point unary functors, per-constraint binary functors
//!   and buddy links, one n-ary functor per global constraint
//! - the point values, behind a [`SpinLock`] so one thread may write values
//!   while another evaluates costs
//!
//! All mutations are batched and all-or-nothing: a batch is validated in
//! full before anything is created. Nothing is ever removed one id at a
//! time; whole categories are dropped by the `*_clear` operations.
//!
//! Lifecycle: `Empty -> Populated -> Initialized`. Adding content after
//! [`init_constraints_internals`](ConstrainedParameterSpace::init_constraints_internals)
//! is allowed but moves the space back to `Populated`; baselines already
//! captured are kept as they are and the caller is expected to initialize
//! again before relying on costs.

mod content;
mod lock;
mod params;
mod snapshot;

#[cfg(test)]
mod tests;

use num_traits::Zero;
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::error::{CpsError, Result};
use crate::functor::{Attached, BoxedNary, Scalar};
use crate::graph::Graph;
use crate::id::{ConstraintId, EdgeId, GlobalConstraintId, LayerId, PairingId, PointId};
use crate::point::ParametricPoint;

pub use content::{AttachedBinary, AttachedNary, AttachedUnary};
pub use lock::{SpinGuard, SpinLock};
pub use params::{ConstraintParams, GlobalConstraintParams, PairingParams, PointParams};
pub use snapshot::{ConstraintRecord, CpsSnapshot, GlobalConstraintRecord, PointRecord};

use content::{ConstraintContent, GlobalContent, LayerContent, PairingContent, PointContent};

/// Lifecycle state of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaceState {
    /// No points.
    Empty,
    /// Has points; baselines are missing or stale.
    Populated,
    /// Baselines captured and no structural change since.
    Initialized,
}

/// Points organized in layers, linked by pairings and cost constraints.
///
/// # Example
///
/// ```
/// use cpspace_core::space::{ConstrainedParameterSpace, ConstraintParams, PointParams};
/// use cpspace_core::{LayerId, Point3};
///
/// let mut cps = ConstrainedParameterSpace::<Point3>::new(2);
/// let ids = cps
///     .add_parametric_points(
///         LayerId(0),
///         vec![
///             PointParams::new(Point3::new([0.0, 0.0, 0.0])),
///             PointParams::new(Point3::new([1.0, 1.0, 1.0])),
///         ],
///     )
///     .unwrap();
/// cps.add_constraints(vec![ConstraintParams::new(ids[0], ids[1])]).unwrap();
///
/// assert_eq!(cps.all_parametric_points_count(), 2);
/// assert_eq!(cps.layer_constraints_count(LayerId(0)), 1);
/// assert!(cps.add_parametric_points(LayerId(5), vec![]).is_err());
/// ```
#[derive(Debug)]
pub struct ConstrainedParameterSpace<P: ParametricPoint> {
    layers: Vec<LayerContent>,
    pairing_graph: Graph,
    constraint_graph: Graph,
    values: SpinLock<Vec<P>>,
    points: Vec<PointContent<P>>,
    pairings: Vec<PairingContent>,
    constraints: Vec<ConstraintContent<P>>,
    globals: Vec<GlobalContent<P>>,
    initialized: bool,
}

impl<P: ParametricPoint> Default for ConstrainedParameterSpace<P> {
    fn default() -> Self {
        Self::new(0)
    }
}

fn pairing_id(edge: EdgeId) -> PairingId {
    PairingId::new(edge.index())
}

fn constraint_id(edge: EdgeId) -> ConstraintId {
    ConstraintId::new(edge.index())
}

fn edge_of_pairing(id: PairingId) -> EdgeId {
    EdgeId::new(id.index())
}

fn edge_of_constraint(id: ConstraintId) -> EdgeId {
    EdgeId::new(id.index())
}

impl<P: ParametricPoint> ConstrainedParameterSpace<P> {
    /// Creates an empty space with `layers_count` layers.
    pub fn new(layers_count: usize) -> Self {
        Self {
            layers: vec![LayerContent::default(); layers_count],
            pairing_graph: Graph::new(),
            constraint_graph: Graph::new(),
            values: SpinLock::new(Vec::new()),
            points: Vec::new(),
            pairings: Vec::new(),
            constraints: Vec::new(),
            globals: Vec::new(),
            initialized: false,
        }
    }

    // ------------------------------------------------------------------
    // Layers
    // ------------------------------------------------------------------

    /// Number of layers.
    pub fn layers_count(&self) -> usize {
        self.layers.len()
    }

    /// Resizes the layer store.
    ///
    /// # Errors
    ///
    /// `BadArg` if shrinking would orphan content of a removed layer.
    pub fn set_layers_count(&mut self, count: usize) -> Result<()> {
        if let Some(offending) = self
            .layers
            .iter()
            .enumerate()
            .skip(count)
            .find(|(_, layer)| !layer.is_empty())
        {
            return Err(CpsError::BadArg(format!(
                "cannot shrink to {count} layers: layer {} has content",
                offending.0
            )));
        }
        self.layers.resize_with(count, LayerContent::default);
        Ok(())
    }

    /// Returns true if `layer` names a layer.
    pub fn has_layer(&self, layer: LayerId) -> bool {
        layer.index() < self.layers.len()
    }

    fn layer_content(&self, layer: LayerId) -> Option<&LayerContent> {
        self.layers.get(layer.index())
    }

    fn check_layer(&self, layer: LayerId) -> Result<()> {
        if self.has_layer(layer) {
            Ok(())
        } else {
            Err(CpsError::BadArg(format!(
                "layer {layer} does not exist ({} layers)",
                self.layers.len()
            )))
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> SpaceState {
        if self.points.is_empty() {
            SpaceState::Empty
        } else if self.initialized {
            SpaceState::Initialized
        } else {
            SpaceState::Populated
        }
    }

    fn touch(&mut self) {
        self.initialized = false;
    }

    // ------------------------------------------------------------------
    // Bulk insertion
    // ------------------------------------------------------------------

    /// Adds points to `layer`; ids are returned in input order.
    ///
    /// # Errors
    ///
    /// `BadArg` if the layer does not exist, the batch is empty, or a point's
    /// dimension differs from the points already in the space.
    pub fn add_parametric_points(
        &mut self,
        layer: LayerId,
        params: Vec<PointParams<P>>,
    ) -> Result<Vec<PointId>> {
        self.check_layer(layer)?;
        if params.is_empty() {
            return Err(CpsError::BadArg("empty point batch".to_string()));
        }
        let dimension = self
            .dimension()
            .unwrap_or_else(|| params[0].value.dimension());
        if let Some(bad) = params.iter().find(|p| p.value.dimension() != dimension) {
            return Err(CpsError::BadArg(format!(
                "point of dimension {} in a space of dimension {dimension}",
                bad.value.dimension()
            )));
        }

        let count = params.len();
        let ids = self.pairing_graph.create_vertices(count);
        self.constraint_graph.create_vertices(count);

        let values = self.values.get_mut();
        values.reserve(count);
        self.points.reserve(count);
        for param in params {
            values.push(param.value);
            self.points.push(PointContent {
                layer,
                unary: param.unary.into_iter().map(Attached::new).collect(),
            });
        }
        self.layers[layer.index()].points.extend_from_slice(&ids);
        self.touch();

        debug!(
            event = "cps_points_added",
            layer = layer.index(),
            count = count,
            total = self.points.len(),
        );
        Ok(ids)
    }

    /// Adds cross-layer pairings; ids are returned in input order.
    ///
    /// Declaring an existing pairing again, in either orientation, returns
    /// the existing id.
    ///
    /// # Errors
    ///
    /// `BadArg` if the batch is empty, an endpoint is unknown, or both
    /// endpoints are the same point.
    pub fn add_pairings(&mut self, params: &[PairingParams]) -> Result<Vec<PairingId>> {
        if params.is_empty() {
            return Err(CpsError::BadArg("empty pairing batch".to_string()));
        }
        let wanted: Vec<_> = params.iter().map(|p| (p.a, p.b)).collect();
        let created = self.pairing_graph.create_or_get_edges(&wanted)?;

        let mut ids = Vec::with_capacity(created.len());
        for (edge, existing) in created {
            let id = pairing_id(edge);
            if !existing {
                let layer = self.points[self.pairing_graph.edge(edge).first().index()].layer;
                self.pairings.push(PairingContent { layer });
                self.layers[layer.index()].pairings.push(id);
            }
            ids.push(id);
        }
        self.touch();

        debug!(
            event = "cps_pairings_added",
            count = ids.len(),
            total = self.pairings.len(),
        );
        Ok(ids)
    }

    /// Adds binary constraints; ids are returned in input order.
    ///
    /// Declaring an existing constraint again, in either orientation, returns
    /// the existing id and appends the new functors to its list.
    ///
    /// # Errors
    ///
    /// `BadArg` if the batch is empty, an endpoint is unknown, both endpoints
    /// are the same point, or the endpoints live in different layers.
    pub fn add_constraints(&mut self, params: Vec<ConstraintParams<P>>) -> Result<Vec<ConstraintId>> {
        if params.is_empty() {
            return Err(CpsError::BadArg("empty constraint batch".to_string()));
        }
        for param in &params {
            let endpoints = (
                self.points.get(param.a.index()),
                self.points.get(param.b.index()),
            );
            if let (Some(a), Some(b)) = endpoints {
                if a.layer != b.layer {
                    return Err(CpsError::BadArg(format!(
                        "constraint ({}, {}) spans layers {} and {}",
                        param.a, param.b, a.layer, b.layer
                    )));
                }
            }
        }
        let wanted: Vec<_> = params.iter().map(|p| (p.a, p.b)).collect();
        let created = self.constraint_graph.create_or_get_edges(&wanted)?;

        let mut ids = Vec::with_capacity(created.len());
        for ((edge, existing), param) in created.into_iter().zip(params) {
            let id = constraint_id(edge);
            let functors = param.functors.into_iter().map(Attached::new);
            if existing {
                self.constraints[id.index()].functors.extend(functors);
            } else {
                let layer = self.points[param.a.index()].layer;
                self.constraints.push(ConstraintContent {
                    layer,
                    functors: functors.collect(),
                    buddy: ConstraintId::INVALID,
                    involved_pairings: SmallVec::new(),
                });
                self.layers[layer.index()].constraints.push(id);
            }
            ids.push(id);
        }
        self.touch();

        debug!(
            event = "cps_constraints_added",
            count = ids.len(),
            total = self.constraints.len(),
        );
        Ok(ids)
    }

    /// Adds global constraints to `layer`, or to every layer when `layer`
    /// is [`LayerId::INVALID`].
    ///
    /// When broadcasting, each layer receives its own copy of every functor;
    /// ids are returned layer by layer, in input order within a layer.
    ///
    /// # Errors
    ///
    /// `BadArg` if the batch is empty, the layer does not exist, or there is
    /// no layer to broadcast to.
    pub fn add_global_constraints(
        &mut self,
        layer: LayerId,
        params: Vec<GlobalConstraintParams<P>>,
    ) -> Result<Vec<GlobalConstraintId>> {
        if params.is_empty() {
            return Err(CpsError::BadArg("empty global constraint batch".to_string()));
        }
        let targets: Vec<LayerId> = if layer == LayerId::INVALID {
            if self.layers.is_empty() {
                return Err(CpsError::BadArg("no layer to broadcast to".to_string()));
            }
            (0..self.layers.len()).map(LayerId::new).collect()
        } else {
            self.check_layer(layer)?;
            vec![layer]
        };

        let mut ids = Vec::with_capacity(params.len() * targets.len());
        for target in targets {
            for param in &params {
                ids.push(self.push_global(target, param.functor.clone_boxed()));
            }
        }
        self.touch();

        debug!(
            event = "cps_global_constraints_added",
            count = ids.len(),
            broadcast = layer == LayerId::INVALID,
        );
        Ok(ids)
    }

    fn push_global(&mut self, layer: LayerId, functor: BoxedNary<P>) -> GlobalConstraintId {
        let id = GlobalConstraintId::new(self.globals.len());
        self.globals.push(GlobalContent {
            layer,
            functor: Attached::new(functor),
        });
        self.layers[layer.index()].globals.push(id);
        id
    }

    // ------------------------------------------------------------------
    // Clearing
    // ------------------------------------------------------------------

    /// Drops every point, and with them every pairing and constraint.
    ///
    /// Global constraints are kept: they are scoped to layers, not points.
    pub fn parametric_points_clear(&mut self) {
        self.relationships_clear();
        self.pairing_graph.clear();
        self.constraint_graph.clear();
        self.values.get_mut().clear();
        self.points.clear();
        for layer in &mut self.layers {
            layer.points.clear();
        }
        self.touch();
    }

    /// Drops every pairing and constraint, keeping the points.
    pub fn relationships_clear(&mut self) {
        self.pairing_graph.clear_edges();
        self.constraint_graph.clear_edges();
        self.pairings.clear();
        self.constraints.clear();
        for layer in &mut self.layers {
            layer.pairings.clear();
            layer.constraints.clear();
        }
        self.touch();
    }

    /// Drops every global constraint.
    pub fn clear_all_global_constraints(&mut self) {
        self.globals.clear();
        for layer in &mut self.layers {
            layer.globals.clear();
        }
        self.touch();
    }

    // ------------------------------------------------------------------
    // Counts
    // ------------------------------------------------------------------

    pub fn all_parametric_points_count(&self) -> usize {
        self.points.len()
    }

    pub fn layer_parametric_points_count(&self, layer: LayerId) -> usize {
        self.layer_content(layer).map_or(0, |l| l.points.len())
    }

    pub fn all_pairings_count(&self) -> usize {
        self.pairings.len()
    }

    /// Pairings are counted in the layer of their first endpoint.
    pub fn layer_pairings_count(&self, layer: LayerId) -> usize {
        self.layer_content(layer).map_or(0, |l| l.pairings.len())
    }

    pub fn all_constraints_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn layer_constraints_count(&self, layer: LayerId) -> usize {
        self.layer_content(layer).map_or(0, |l| l.constraints.len())
    }

    pub fn all_global_constraints_count(&self) -> usize {
        self.globals.len()
    }

    pub fn layer_global_constraints_count(&self, layer: LayerId) -> usize {
        self.layer_content(layer).map_or(0, |l| l.globals.len())
    }

    /// Unary functors attached to all points.
    pub fn all_unary_functors_count(&self) -> usize {
        self.points.iter().map(|p| p.unary.len()).sum()
    }

    /// Unary functors attached to the points of `layer`.
    pub fn layer_unary_functors_count(&self, layer: LayerId) -> usize {
        self.layer_content(layer).map_or(0, |l| {
            l.points
                .iter()
                .map(|id| self.points[id.index()].unary.len())
                .sum()
        })
    }

    /// Binary functors attached to all constraints.
    pub fn all_binary_functors_count(&self) -> usize {
        self.constraints.iter().map(|c| c.functors.len()).sum()
    }

    /// Binary functors attached to the constraints of `layer`.
    pub fn layer_binary_functors_count(&self, layer: LayerId) -> usize {
        self.layer_content(layer).map_or(0, |l| {
            l.constraints
                .iter()
                .map(|id| self.constraints[id.index()].functors.len())
                .sum()
        })
    }

    // ------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------

    pub fn has_parametric_point(&self, id: PointId) -> bool {
        id.index() < self.points.len()
    }

    pub fn has_pairing(&self, id: PairingId) -> bool {
        id.index() < self.pairings.len()
    }

    pub fn has_constraint(&self, id: ConstraintId) -> bool {
        id.index() < self.constraints.len()
    }

    pub fn has_global_constraint(&self, id: GlobalConstraintId) -> bool {
        id.index() < self.globals.len()
    }

    // ------------------------------------------------------------------
    // Id lists and per-entity accessors
    // ------------------------------------------------------------------

    /// Point ids of `layer`; empty for an unknown layer.
    pub fn layer_parametric_point_ids(&self, layer: LayerId) -> &[PointId] {
        self.layer_content(layer).map_or(&[], |l| &l.points)
    }

    pub fn layer_pairing_ids(&self, layer: LayerId) -> &[PairingId] {
        self.layer_content(layer).map_or(&[], |l| &l.pairings)
    }

    pub fn layer_constraint_ids(&self, layer: LayerId) -> &[ConstraintId] {
        self.layer_content(layer).map_or(&[], |l| &l.constraints)
    }

    pub fn layer_global_constraint_ids(&self, layer: LayerId) -> &[GlobalConstraintId] {
        self.layer_content(layer).map_or(&[], |l| &l.globals)
    }

    /// Dimension shared by every point, `None` while empty.
    pub fn dimension(&self) -> Option<usize> {
        self.values.lock().first().map(ParametricPoint::dimension)
    }

    /// Layer of a point.
    ///
    /// # Panics
    ///
    /// Panics if the id is not valid.
    pub fn parametric_point_layer(&self, id: PointId) -> LayerId {
        self.points[id.index()].layer
    }

    /// Unary functors owned by a point.
    pub fn unary_functors(&self, id: PointId) -> &[AttachedUnary<P>] {
        &self.points[id.index()].unary
    }

    /// Mutable unary functors of a point (weights, parameters).
    pub fn unary_functors_mut(&mut self, id: PointId) -> &mut [AttachedUnary<P>] {
        &mut self.points[id.index()].unary
    }

    /// Endpoints of a pairing, in declaration order.
    pub fn pairing_endpoints(&self, id: PairingId) -> (PointId, PointId) {
        self.pairing_graph.edge(edge_of_pairing(id)).endpoints()
    }

    /// Layer of a pairing's first endpoint.
    pub fn pairing_layer(&self, id: PairingId) -> LayerId {
        self.pairings[id.index()].layer
    }

    /// Endpoints of a constraint, in declaration order.
    pub fn constraint_endpoints(&self, id: ConstraintId) -> (PointId, PointId) {
        self.constraint_graph.edge(edge_of_constraint(id)).endpoints()
    }

    pub fn constraint_layer(&self, id: ConstraintId) -> LayerId {
        self.constraints[id.index()].layer
    }

    /// Binary functors of a constraint.
    pub fn constraint_functors(&self, id: ConstraintId) -> &[AttachedBinary<P>] {
        &self.constraints[id.index()].functors
    }

    pub fn constraint_functors_mut(&mut self, id: ConstraintId) -> &mut [AttachedBinary<P>] {
        &mut self.constraints[id.index()].functors
    }

    /// Buddy constraint, [`ConstraintId::INVALID`] until linked.
    pub fn constraint_buddy(&self, id: ConstraintId) -> ConstraintId {
        self.constraints[id.index()].buddy
    }

    /// Pairings connecting a constraint's endpoints to its buddy's.
    pub fn constraint_involved_pairings(&self, id: ConstraintId) -> &[PairingId] {
        &self.constraints[id.index()].involved_pairings
    }

    pub fn global_constraint_layer(&self, id: GlobalConstraintId) -> LayerId {
        self.globals[id.index()].layer
    }

    /// The n-ary functor of a global constraint.
    pub fn global_functor(&self, id: GlobalConstraintId) -> &AttachedNary<P> {
        &self.globals[id.index()].functor
    }

    pub fn global_functor_mut(&mut self, id: GlobalConstraintId) -> &mut AttachedNary<P> {
        &mut self.globals[id.index()].functor
    }

    /// Constraints touching a point, in creation order.
    pub fn point_constraint_ids(&self, id: PointId) -> impl Iterator<Item = ConstraintId> + '_ {
        self.constraint_graph
            .incident_edges(id)
            .iter()
            .map(|&e| constraint_id(e))
    }

    /// Constraint joining `a` and `b`, in either orientation.
    pub fn find_constraint(&self, a: PointId, b: PointId) -> Option<ConstraintId> {
        self.constraint_graph.find_edge(a, b).map(constraint_id)
    }

    // ------------------------------------------------------------------
    // Search queries (setup time only)
    // ------------------------------------------------------------------

    /// Pairings touching `point`.
    pub fn find_associated_pairings(&self, point: PointId) -> Vec<PairingId> {
        self.pairing_graph
            .incident_edges(point)
            .iter()
            .map(|&e| pairing_id(e))
            .collect()
    }

    /// Buddies reached through the pairings `src` and `dst`.
    ///
    /// With `src = (a, a')` and `dst = (b, b')`, returns the constraints
    /// joining an endpoint of `src` to an endpoint of `dst`, in id order,
    /// leaving out those in `src`'s own layer: from the layer-0 constraint
    /// `(a, b)` this finds `(a', b')`.
    /// Scans every constraint: O(graph size), meant for setup time.
    pub fn find_buddy_constraints(&self, src: PairingId, dst: PairingId) -> Vec<ConstraintId> {
        if !self.has_pairing(src) || !self.has_pairing(dst) {
            return Vec::new();
        }
        let src_edge = *self.pairing_graph.edge(edge_of_pairing(src));
        let dst_edge = *self.pairing_graph.edge(edge_of_pairing(dst));
        let source_layer = self.pairing_layer(src);
        (0..self.constraint_graph.edge_count())
            .map(EdgeId::new)
            .filter(|&e| {
                let (x, y) = self.constraint_graph.edge(e).endpoints();
                (src_edge.touches(x) && dst_edge.touches(y))
                    || (src_edge.touches(y) && dst_edge.touches(x))
            })
            .map(constraint_id)
            .filter(|&id| self.constraint_layer(id) != source_layer)
            .collect()
    }

    /// Resolves every constraint's buddy through the pairings of its
    /// endpoints; returns how many constraints found one.
    ///
    /// For a constraint `(a, b)`, the first constraint `(a', b')` such that
    /// `(a, a')` and `(b, b')` are pairings becomes its buddy, and those two
    /// pairings become its involved pairings.
    pub fn link_buddy_constraints(&mut self) -> usize {
        let mut linked = 0;
        for index in 0..self.constraints.len() {
            let edge = EdgeId::new(index);
            let (a, b) = self.constraint_graph.edge(edge).endpoints();
            let found = self.pairing_graph.incident_edges(a).iter().find_map(|&pa| {
                let a2 = self.pairing_graph.edge(pa).opposite(a)?;
                self.pairing_graph.incident_edges(b).iter().find_map(|&pb| {
                    let b2 = self.pairing_graph.edge(pb).opposite(b)?;
                    self.constraint_graph
                        .find_edge(a2, b2)
                        .filter(|&buddy| buddy != edge)
                        .map(|buddy| (buddy, pa, pb))
                })
            });

            let content = &mut self.constraints[index];
            content.involved_pairings.clear();
            match found {
                Some((buddy, pa, pb)) => {
                    content.buddy = constraint_id(buddy);
                    content.involved_pairings.push(pairing_id(pa));
                    content.involved_pairings.push(pairing_id(pb));
                    linked += 1;
                }
                None => content.buddy = ConstraintId::INVALID,
            }
        }
        debug!(event = "cps_buddies_linked", linked = linked);
        linked
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Copy of a point's value, including importance.
    ///
    /// # Panics
    ///
    /// Panics if the id is not valid.
    pub fn get_parametric_point_value(&self, id: PointId) -> P {
        self.values.lock()[id.index()].clone()
    }

    /// Overwrites a point's coordinates, keeping its importance.
    ///
    /// Takes `&self`: values may be written from another thread while
    /// costs are being evaluated.
    ///
    /// # Panics
    ///
    /// Panics if the id is not valid or the dimension differs.
    pub fn set_parametric_point_value(&self, id: PointId, value: &P) {
        let mut values = self.values.lock();
        values[id.index()]
            .coordinates_mut()
            .copy_from_slice(value.coordinates());
    }

    pub fn get_parametric_point_importance(&self, id: PointId) -> Scalar<P> {
        self.values.lock()[id.index()].importance()
    }

    pub fn set_parametric_point_importance(&self, id: PointId, importance: Scalar<P>) {
        self.values.lock()[id.index()].set_importance(importance);
    }

    /// Takes the value lock; values unlock when the guard drops.
    ///
    /// Hold it only for a copy or a short batch of writes.
    pub fn lock_values(&self) -> SpinGuard<'_, Vec<P>> {
        self.values.lock()
    }

    // ------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------

    /// Captures the baseline of every binary and n-ary functor in `layer`
    /// (every layer for [`LayerId::INVALID`]) from the current values.
    ///
    /// Global constraints are evaluated over every point of their layer.
    /// Run once after the initial values are set and before exploring;
    /// running it again after values moved redefines "zero cost".
    ///
    /// # Errors
    ///
    /// `BadArg` if the layer does not exist.
    pub fn init_constraints_internals(&mut self, layer: LayerId) -> Result<()> {
        self.init_constraints_internals_with(layer, |_| true)
    }

    /// Same as [`init_constraints_internals`](Self::init_constraints_internals),
    /// with global constraints evaluated over the points accepted by `include`.
    pub fn init_constraints_internals_with<F>(&mut self, layer: LayerId, include: F) -> Result<()>
    where
        F: Fn(PointId) -> bool,
    {
        let targets: Vec<LayerId> = if layer == LayerId::INVALID {
            (0..self.layers.len()).map(LayerId::new).collect()
        } else {
            self.check_layer(layer)?;
            vec![layer]
        };

        let values = self.values.get_mut();
        let mut captured = 0usize;
        for &target in &targets {
            let content = &self.layers[target.index()];
            for &id in &content.constraints {
                let (a, b) = self
                    .constraint_graph
                    .edge(edge_of_constraint(id))
                    .endpoints();
                let (va, vb) = (&values[a.index()], &values[b.index()]);
                for functor in &mut self.constraints[id.index()].functors {
                    functor.capture(va, vb);
                    captured += 1;
                }
            }

            let range: Vec<P> = content
                .points
                .iter()
                .filter(|&&id| include(id))
                .map(|id| values[id.index()].clone())
                .collect();
            for &id in &content.globals {
                self.globals[id.index()].functor.capture(&range);
                captured += 1;
            }
        }
        self.initialized = true;

        info!(
            event = "cps_initialized",
            layers = targets.len(),
            functors = captured,
        );
        Ok(())
    }

    /// Resets every captured baseline to zero.
    pub fn reset_baselines(&mut self) {
        let zero = <Scalar<P> as Zero>::zero();
        for constraint in &mut self.constraints {
            for functor in &mut constraint.functors {
                functor.set_baseline(zero);
            }
        }
        for global in &mut self.globals {
            global.functor.set_baseline(zero);
        }
        self.touch();
    }
}
