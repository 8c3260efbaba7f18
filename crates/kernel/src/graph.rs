use cubefield_common::EntityId;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::cube::Cube;

/// One proximity segment between two live cubes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub a: EntityId,
    pub b: EntityId,
    pub start: Vec3,
    pub end: Vec3,
}

/// Segments between every pair of cubes within the connection radius.
///
/// Rebuilt from scratch each frame. Alongside the edges it keeps a flat
/// `[x0, y0, z0, x1, y1, z1, ...]` buffer that a line renderer can upload
/// directly.
#[derive(Debug, Clone, Default)]
pub struct ProximityGraph {
    edges: Vec<Edge>,
    positions: Vec<f32>,
}

impl ProximityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute all edges for the given population (pairs in store order).
    pub fn rebuild(&mut self, cubes: &[Cube], radius: f32) {
        self.edges.clear();
        self.positions.clear();

        let n = cubes.len();
        let max_pairs = n * n.saturating_sub(1) / 2;
        if self.edges.capacity() < max_pairs {
            self.edges.reserve(max_pairs);
            self.positions.reserve(max_pairs * 6);
        }

        let radius_sq = radius * radius;
        for (i, a) in cubes.iter().enumerate() {
            for b in &cubes[i + 1..] {
                if a.position.distance_squared(b.position) <= radius_sq {
                    self.edges.push(Edge {
                        a: a.id,
                        b: b.id,
                        start: a.position,
                        end: b.position,
                    });
                    self.positions.extend_from_slice(&a.position.to_array());
                    self.positions.extend_from_slice(&b.position.to_array());
                }
            }
        }
        tracing::trace!(cubes = n, edges = self.edges.len(), "proximity graph rebuilt");
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Segment endpoints as `(start, end)` pairs.
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3)> + '_ {
        self.edges.iter().map(|e| (e.start, e.end))
    }

    /// Flat vertex buffer, six floats per edge.
    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubefield_common::RotationAxis;
    use std::collections::HashSet;

    fn cube_at(p: Vec3) -> Cube {
        Cube::new(p, Vec3::ZERO, 1.0, 0, RotationAxis::X, 0.01)
    }

    #[test]
    fn empty_population_has_no_edges() {
        let mut graph = ProximityGraph::new();
        graph.rebuild(&[], 5.0);
        assert!(graph.is_empty());
        assert!(graph.positions().is_empty());
    }

    #[test]
    fn radius_is_inclusive() {
        let cubes = vec![cube_at(Vec3::ZERO), cube_at(Vec3::new(5.0, 0.0, 0.0))];
        let mut graph = ProximityGraph::new();
        graph.rebuild(&cubes, 5.0);
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.positions(), &[0.0, 0.0, 0.0, 5.0, 0.0, 0.0]);
    }

    #[test]
    fn edges_match_pairwise_distances() {
        let cubes: Vec<Cube> = (0..12)
            .map(|i| {
                let f = i as f32;
                cube_at(Vec3::new((f * 1.7) % 9.0, (f * 2.3) % 7.0, (f * 0.9) % 3.0))
            })
            .collect();
        let mut graph = ProximityGraph::new();
        graph.rebuild(&cubes, 5.0);

        let mut seen = HashSet::new();
        for edge in graph.edges() {
            assert_ne!(edge.a, edge.b, "self pair");
            let key = if edge.a < edge.b {
                (edge.a, edge.b)
            } else {
                (edge.b, edge.a)
            };
            assert!(seen.insert(key), "duplicate pair");
        }

        let mut expected = 0;
        for i in 0..cubes.len() {
            for j in i + 1..cubes.len() {
                let close = cubes[i].position.distance(cubes[j].position) <= 5.0;
                let key = if cubes[i].id < cubes[j].id {
                    (cubes[i].id, cubes[j].id)
                } else {
                    (cubes[j].id, cubes[i].id)
                };
                assert_eq!(close, seen.contains(&key));
                expected += usize::from(close);
            }
        }
        assert_eq!(graph.len(), expected);
        assert_eq!(graph.positions().len(), expected * 6);
    }

    #[test]
    fn rebuild_discards_previous_frame() {
        let mut cubes = vec![cube_at(Vec3::ZERO), cube_at(Vec3::X)];
        let mut graph = ProximityGraph::new();
        graph.rebuild(&cubes, 5.0);
        assert_eq!(graph.len(), 1);

        cubes[1].position = Vec3::new(50.0, 0.0, 0.0);
        graph.rebuild(&cubes, 5.0);
        assert!(graph.is_empty());
    }
}
