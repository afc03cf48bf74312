//! Dense-id graph primitives.
//!
//! # Design
//!
//! - **Index-based**: vertices and edges are identified by dense ids handed
//!   out in creation order; an id is valid iff it is below the store's count
//! - **Append-only**: nothing is removed except by whole-store `clear`
//! - **Topology only**: the graph knows endpoints and incidence, payload is
//!   kept by the owner in parallel stores indexed by the same ids
//!
//! Edges are unordered. Each vertex keeps the ids of its incident edges, so
//! walking from a point to its edges is O(degree), and an endpoint index
//! makes "does this edge exist" O(1).

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use crate::error::{CpsError, Result};
use crate::id::{EdgeId, PointId};

#[cfg(test)]
mod tests;

/// A vertex and the edges touching it.
#[derive(Debug, Clone, Default)]
pub struct Vertex {
    edges: SmallVec<[EdgeId; 4]>,
}

impl Vertex {
    /// Incident edge ids, in creation order.
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Number of incident edges.
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}

/// An unordered edge between two distinct vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    endpoints: [PointId; 2],
}

impl Edge {
    /// Endpoints in the order they were requested.
    pub fn endpoints(&self) -> (PointId, PointId) {
        (self.endpoints[0], self.endpoints[1])
    }

    /// First endpoint as requested.
    pub fn first(&self) -> PointId {
        self.endpoints[0]
    }

    /// Second endpoint as requested.
    pub fn second(&self) -> PointId {
        self.endpoints[1]
    }

    /// Returns the endpoint opposite to `vertex`, if `vertex` is an endpoint.
    pub fn opposite(&self, vertex: PointId) -> Option<PointId> {
        if self.endpoints[0] == vertex {
            Some(self.endpoints[1])
        } else if self.endpoints[1] == vertex {
            Some(self.endpoints[0])
        } else {
            None
        }
    }

    /// Returns true if `vertex` is one of the endpoints.
    pub fn touches(&self, vertex: PointId) -> bool {
        self.endpoints.contains(&vertex)
    }
}

fn edge_key(a: PointId, b: PointId) -> (usize, usize) {
    if a.index() <= b.index() {
        (a.index(), b.index())
    } else {
        (b.index(), a.index())
    }
}

/// Append-only undirected graph over dense vertex and edge ids.
///
/// # Example
///
/// ```
/// use cpspace_core::graph::Graph;
///
/// let mut graph = Graph::new();
/// let v = graph.create_vertices(3);
///
/// let e = graph.create_edges(&[(v[0], v[1]), (v[1], v[2])]).unwrap();
/// assert_eq!(graph.edge_count(), 2);
/// assert_eq!(graph.find_edge(v[2], v[1]), Some(e[1]));
///
/// // Strict creation refuses duplicates, the or-get variant reuses them.
/// assert!(graph.create_edges(&[(v[1], v[0])]).is_err());
/// let got = graph.create_or_get_edges(&[(v[1], v[0])]).unwrap();
/// assert_eq!(got, vec![(e[0], true)]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Graph {
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    /// Normalized endpoint pair to edge id.
    index: HashMap<(usize, usize), EdgeId>,
}

impl Graph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true if `id` names a vertex.
    pub fn has_vertex(&self, id: PointId) -> bool {
        id.index() < self.vertices.len()
    }

    /// Returns true if `id` names an edge.
    pub fn has_edge(&self, id: EdgeId) -> bool {
        id.index() < self.edges.len()
    }

    /// Returns the vertex with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id is not valid.
    pub fn vertex(&self, id: PointId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Returns the edge with the given id.
    ///
    /// # Panics
    ///
    /// Panics if the id is not valid.
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.index()]
    }

    /// Edges incident to `vertex`; empty for unknown vertices.
    pub fn incident_edges(&self, vertex: PointId) -> &[EdgeId] {
        self.vertices
            .get(vertex.index())
            .map(Vertex::edges)
            .unwrap_or(&[])
    }

    /// Looks up the edge joining `a` and `b`, in either orientation.
    pub fn find_edge(&self, a: PointId, b: PointId) -> Option<EdgeId> {
        self.index.get(&edge_key(a, b)).copied()
    }

    /// Appends `count` vertices and returns their ids in order.
    pub fn create_vertices(&mut self, count: usize) -> Vec<PointId> {
        let first = self.vertices.len();
        self.vertices.resize_with(first + count, Vertex::default);
        (first..first + count).map(PointId::new).collect()
    }

    fn check_request(&self, a: PointId, b: PointId) -> Result<()> {
        if !self.has_vertex(a) || !self.has_vertex(b) {
            return Err(CpsError::BadArg(format!(
                "edge ({a}, {b}) references an unknown vertex"
            )));
        }
        if a == b {
            return Err(CpsError::BadArg(format!("edge ({a}, {b}) is a self-loop")));
        }
        Ok(())
    }

    fn push_edge(&mut self, a: PointId, b: PointId) -> EdgeId {
        let id = EdgeId::new(self.edges.len());
        self.edges.push(Edge { endpoints: [a, b] });
        self.index.insert(edge_key(a, b), id);
        self.vertices[a.index()].edges.push(id);
        self.vertices[b.index()].edges.push(id);
        id
    }

    /// Creates every requested edge, or none.
    ///
    /// # Errors
    ///
    /// - `BadArg` if an endpoint is unknown or an edge is a self-loop
    /// - `AlreadyExists` if an edge exists already or is requested twice
    pub fn create_edges(&mut self, wanted: &[(PointId, PointId)]) -> Result<Vec<EdgeId>> {
        let mut seen = HashSet::with_capacity(wanted.len());
        for &(a, b) in wanted {
            self.check_request(a, b)?;
            let key = edge_key(a, b);
            if self.index.contains_key(&key) || !seen.insert(key) {
                return Err(CpsError::AlreadyExists(format!("edge ({a}, {b})")));
            }
        }
        Ok(wanted.iter().map(|&(a, b)| self.push_edge(a, b)).collect())
    }

    /// Creates the missing edges and returns `(id, was_existing)` per request.
    ///
    /// A pair requested twice in one batch is created once; the second
    /// occurrence reports `was_existing = true`.
    ///
    /// # Errors
    ///
    /// `BadArg` if an endpoint is unknown or an edge is a self-loop; nothing
    /// is created in that case.
    pub fn create_or_get_edges(
        &mut self,
        wanted: &[(PointId, PointId)],
    ) -> Result<Vec<(EdgeId, bool)>> {
        for &(a, b) in wanted {
            self.check_request(a, b)?;
        }
        Ok(wanted
            .iter()
            .map(|&(a, b)| match self.find_edge(a, b) {
                Some(id) => (id, true),
                None => (self.push_edge(a, b), false),
            })
            .collect())
    }

    /// Removes all edges, keeping the vertices.
    pub fn clear_edges(&mut self) {
        self.edges.clear();
        self.index.clear();
        for vertex in &mut self.vertices {
            vertex.edges.clear();
        }
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.index.clear();
    }
}
