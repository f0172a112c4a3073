//! Parallel mesh-level candidate enumeration.
//!
//! Walks the primitives of the mesh in parallel, issues occupancy queries
//! against the spatial hash, filters incident pairs, and confirms each
//! survivor with a world-space AABB predicate. Every worker accumulates into
//! its own [`Candidates`] buffer; the buffers are concatenated at the end,
//! so the global candidate order is unspecified.

// Primitive ids are u32 by contract; meshes stay below 2^32 vertices.
#![allow(clippy::cast_possible_truncation)]

use contact_types::{CandidateKinds, Candidates, Point3};
use rayon::prelude::*;
use tracing::debug;

use crate::predicates::{
    edge_edge_aabb_ccd, edge_edge_aabb_cd, point_edge_aabb_ccd, point_edge_aabb_cd,
    point_triangle_aabb_ccd, point_triangle_aabb_cd,
};
use crate::spatial_hash::SpatialHash;

fn merge(mut a: Candidates, b: Candidates) -> Candidates {
    a.append(b);
    a
}

impl SpatialHash {
    /// Enumerate candidate pairs for a static mesh.
    ///
    /// The mesh must be the one this hash was built from. For every enabled
    /// category the corresponding primitives are walked in parallel; a pair
    /// is admitted when it shares a grid cell, is not incident, and its
    /// world-space AABBs overlap under `radius`.
    ///
    /// The order of pairs in the result is unspecified; no pair is produced
    /// twice for the same query primitive, and every edge-edge pair has the
    /// lower edge id first.
    #[must_use]
    pub fn query_mesh_for_candidates(
        &self,
        vertices: &[Point3<f64>],
        edges: &[[u32; 2]],
        faces: &[[u32; 3]],
        radius: f64,
        kinds: CandidateKinds,
    ) -> Candidates {
        debug_assert_eq!(vertices.len() as u32, self.edge_start());
        debug_assert_eq!(edges.len() as u32, self.tri_start() - self.edge_start());

        let mut candidates = Candidates::new();

        if kinds.edge_vertex {
            candidates.append(
                (0..vertices.len() as u32)
                    .into_par_iter()
                    .fold(Candidates::new, |mut local, vi| {
                        for ei in self.query_stored_vertex_for_edges(vi) {
                            let [a, b] = edges[ei as usize];
                            if vi != a
                                && vi != b
                                && point_edge_aabb_cd(
                                    vertices[vi as usize],
                                    vertices[a as usize],
                                    vertices[b as usize],
                                    radius,
                                )
                            {
                                local.edge_vertex.push((ei, vi));
                            }
                        }
                        local
                    })
                    .reduce(Candidates::new, merge),
            );
        }

        if kinds.edge_edge {
            candidates.append(
                (0..edges.len() as u32)
                    .into_par_iter()
                    .fold(Candidates::new, |mut local, eai| {
                        let [a0, a1] = edges[eai as usize];
                        for ebi in self.query_stored_edge_for_edges(eai) {
                            let [b0, b1] = edges[ebi as usize];
                            if a0 != b0
                                && a0 != b1
                                && a1 != b0
                                && a1 != b1
                                && eai < ebi
                                && edge_edge_aabb_cd(
                                    vertices[a0 as usize],
                                    vertices[a1 as usize],
                                    vertices[b0 as usize],
                                    vertices[b1 as usize],
                                    radius,
                                )
                            {
                                local.edge_edge.push((eai, ebi));
                            }
                        }
                        local
                    })
                    .reduce(Candidates::new, merge),
            );
        }

        if kinds.face_vertex {
            candidates.append(
                (0..vertices.len() as u32)
                    .into_par_iter()
                    .fold(Candidates::new, |mut local, vi| {
                        for fi in self.query_stored_vertex_for_triangles(vi) {
                            let [a, b, c] = faces[fi as usize];
                            if vi != a
                                && vi != b
                                && vi != c
                                && point_triangle_aabb_cd(
                                    vertices[vi as usize],
                                    vertices[a as usize],
                                    vertices[b as usize],
                                    vertices[c as usize],
                                    radius,
                                )
                            {
                                local.face_vertex.push((fi, vi));
                            }
                        }
                        local
                    })
                    .reduce(Candidates::new, merge),
            );
        }

        debug!(
            edge_vertex = candidates.edge_vertex.len(),
            edge_edge = candidates.edge_edge.len(),
            face_vertex = candidates.face_vertex.len(),
            "enumerated candidates"
        );
        candidates
    }

    /// Enumerate candidate pairs for a mesh moving linearly between two
    /// time samples.
    ///
    /// Same contract as
    /// [`query_mesh_for_candidates`](Self::query_mesh_for_candidates), with
    /// every AABB predicate evaluated over the swept interval.
    #[must_use]
    pub fn query_moving_mesh_for_candidates(
        &self,
        vertices_t0: &[Point3<f64>],
        vertices_t1: &[Point3<f64>],
        edges: &[[u32; 2]],
        faces: &[[u32; 3]],
        radius: f64,
        kinds: CandidateKinds,
    ) -> Candidates {
        assert_eq!(
            vertices_t0.len(),
            vertices_t1.len(),
            "vertex count mismatch between time samples"
        );
        debug_assert_eq!(vertices_t0.len() as u32, self.edge_start());
        debug_assert_eq!(edges.len() as u32, self.tri_start() - self.edge_start());

        let mut candidates = Candidates::new();

        if kinds.edge_vertex {
            candidates.append(
                (0..vertices_t0.len() as u32)
                    .into_par_iter()
                    .fold(Candidates::new, |mut local, vi| {
                        for ei in self.query_stored_vertex_for_edges(vi) {
                            let [a, b] = edges[ei as usize];
                            if vi != a
                                && vi != b
                                && point_edge_aabb_ccd(
                                    vertices_t0[vi as usize],
                                    vertices_t0[a as usize],
                                    vertices_t0[b as usize],
                                    vertices_t1[vi as usize],
                                    vertices_t1[a as usize],
                                    vertices_t1[b as usize],
                                    radius,
                                )
                            {
                                local.edge_vertex.push((ei, vi));
                            }
                        }
                        local
                    })
                    .reduce(Candidates::new, merge),
            );
        }

        if kinds.edge_edge {
            candidates.append(
                (0..edges.len() as u32)
                    .into_par_iter()
                    .fold(Candidates::new, |mut local, eai| {
                        let [a0, a1] = edges[eai as usize];
                        for ebi in self.query_stored_edge_for_edges(eai) {
                            let [b0, b1] = edges[ebi as usize];
                            if a0 != b0
                                && a0 != b1
                                && a1 != b0
                                && a1 != b1
                                && eai < ebi
                                && edge_edge_aabb_ccd(
                                    vertices_t0[a0 as usize],
                                    vertices_t0[a1 as usize],
                                    vertices_t0[b0 as usize],
                                    vertices_t0[b1 as usize],
                                    vertices_t1[a0 as usize],
                                    vertices_t1[a1 as usize],
                                    vertices_t1[b0 as usize],
                                    vertices_t1[b1 as usize],
                                    radius,
                                )
                            {
                                local.edge_edge.push((eai, ebi));
                            }
                        }
                        local
                    })
                    .reduce(Candidates::new, merge),
            );
        }

        if kinds.face_vertex {
            candidates.append(
                (0..vertices_t0.len() as u32)
                    .into_par_iter()
                    .fold(Candidates::new, |mut local, vi| {
                        for fi in self.query_stored_vertex_for_triangles(vi) {
                            let [a, b, c] = faces[fi as usize];
                            if vi != a
                                && vi != b
                                && vi != c
                                && point_triangle_aabb_ccd(
                                    vertices_t0[vi as usize],
                                    vertices_t0[a as usize],
                                    vertices_t0[b as usize],
                                    vertices_t0[c as usize],
                                    vertices_t1[vi as usize],
                                    vertices_t1[a as usize],
                                    vertices_t1[b as usize],
                                    vertices_t1[c as usize],
                                    radius,
                                )
                            {
                                local.face_vertex.push((fi, vi));
                            }
                        }
                        local
                    })
                    .reduce(Candidates::new, merge),
            );
        }

        debug!(
            edge_vertex = candidates.edge_vertex.len(),
            edge_edge = candidates.edge_edge.len(),
            face_vertex = candidates.face_vertex.len(),
            "enumerated moving candidates"
        );
        candidates
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    /// Two segments crossing at the origin.
    fn crossing_segments() -> (Vec<Point3<f64>>, Vec<[u32; 2]>) {
        let vertices = vec![
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        (vertices, vec![[0, 1], [2, 3]])
    }

    #[test]
    fn crossing_edges_are_candidates() {
        let (v, e) = crossing_segments();
        let hash = SpatialHash::build(&v, &e, &[], 0.0);
        let candidates = hash.query_mesh_for_candidates(&v, &e, &[], 0.0, CandidateKinds::all());
        assert_eq!(candidates.edge_edge, vec![(0, 1)]);
    }

    #[test]
    fn incident_edges_are_excluded() {
        // Two edges sharing vertex 1 overlap geometrically but are incident.
        let v = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let e = vec![[0, 1], [1, 2]];
        let hash = SpatialHash::build(&v, &e, &[], 0.0);
        let candidates = hash.query_mesh_for_candidates(&v, &e, &[], 0.5, CandidateKinds::all());
        assert!(candidates.edge_edge.is_empty());
    }

    #[test]
    fn disabled_kinds_produce_nothing() {
        let (v, e) = crossing_segments();
        let hash = SpatialHash::build(&v, &e, &[], 0.0);
        let candidates =
            hash.query_mesh_for_candidates(&v, &e, &[], 0.0, CandidateKinds::none());
        assert!(candidates.is_empty());
    }

    #[test]
    fn moving_enumeration_sees_converging_edges() {
        // Segments a gap apart converging over the step; static hulls are
        // disjoint but the swept hulls meet.
        let v0 = vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(0.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, -1.0),
        ];
        let v1 = vec![
            Point3::new(-1.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, -1.0, 1.0),
            Point3::new(0.0, -1.0, -1.0),
        ];
        let e = vec![[0, 1], [2, 3]];
        let hash = SpatialHash::build_moving(&v0, &v1, &e, &[], 0.0);
        let candidates =
            hash.query_moving_mesh_for_candidates(&v0, &v1, &e, &[], 0.0, CandidateKinds::all());
        assert_eq!(candidates.edge_edge, vec![(0, 1)]);
    }
}
