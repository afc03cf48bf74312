//! Tests for graph primitives.

use super::*;
use crate::id::{EdgeId, PointId};

fn triangle() -> (Graph, Vec<PointId>) {
    let mut graph = Graph::new();
    let v = graph.create_vertices(3);
    graph
        .create_edges(&[(v[0], v[1]), (v[1], v[2]), (v[2], v[0])])
        .unwrap();
    (graph, v)
}

#[test]
fn test_create_vertices_is_dense() {
    let mut graph = Graph::new();
    let a = graph.create_vertices(2);
    let b = graph.create_vertices(3);
    assert_eq!(a, vec![PointId(0), PointId(1)]);
    assert_eq!(b, vec![PointId(2), PointId(3), PointId(4)]);
    assert!(graph.has_vertex(PointId(4)));
    assert!(!graph.has_vertex(PointId(5)));
    assert!(!graph.has_vertex(PointId::INVALID));
}

#[test]
fn test_incidence() {
    let (graph, v) = triangle();
    assert_eq!(graph.vertex(v[1]).degree(), 2);
    assert_eq!(graph.incident_edges(v[0]), &[EdgeId(0), EdgeId(2)]);
    assert!(graph.incident_edges(PointId(99)).is_empty());

    let edge = graph.edge(EdgeId(1));
    assert_eq!(edge.endpoints(), (v[1], v[2]));
    assert_eq!(edge.opposite(v[2]), Some(v[1]));
    assert_eq!(edge.opposite(v[0]), None);
}

#[test]
fn test_strict_creation_rejects_existing() {
    let (mut graph, v) = triangle();
    let err = graph.create_edges(&[(v[1], v[0])]).unwrap_err();
    assert!(matches!(err, CpsError::AlreadyExists(_)));
    assert_eq!(graph.edge_count(), 3);
}

#[test]
fn test_strict_creation_is_all_or_nothing() {
    let mut graph = Graph::new();
    let v = graph.create_vertices(4);
    let err = graph
        .create_edges(&[(v[0], v[1]), (v[2], v[3]), (v[1], v[0])])
        .unwrap_err();
    assert!(matches!(err, CpsError::AlreadyExists(_)));
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.vertex(v[0]).degree(), 0);
}

#[test]
fn test_bad_endpoints() {
    let mut graph = Graph::new();
    let v = graph.create_vertices(2);
    assert!(matches!(
        graph.create_edges(&[(v[0], PointId(7))]),
        Err(CpsError::BadArg(_))
    ));
    assert!(matches!(
        graph.create_or_get_edges(&[(v[0], v[0])]),
        Err(CpsError::BadArg(_))
    ));
    assert_eq!(graph.edge_count(), 0);
}

#[test]
fn test_create_or_get_is_idempotent() {
    let mut graph = Graph::new();
    let v = graph.create_vertices(3);

    let first = graph
        .create_or_get_edges(&[(v[0], v[1]), (v[1], v[0]), (v[1], v[2])])
        .unwrap();
    assert_eq!(
        first,
        vec![(EdgeId(0), false), (EdgeId(0), true), (EdgeId(1), false)]
    );

    let second = graph.create_or_get_edges(&[(v[2], v[1])]).unwrap();
    assert_eq!(second, vec![(EdgeId(1), true)]);
    assert_eq!(graph.edge_count(), 2);
}

#[test]
fn test_clear_edges_keeps_vertices() {
    let (mut graph, v) = triangle();
    graph.clear_edges();
    assert_eq!(graph.edge_count(), 0);
    assert_eq!(graph.vertex_count(), 3);
    assert_eq!(graph.find_edge(v[0], v[1]), None);
    assert_eq!(graph.vertex(v[0]).degree(), 0);
}
