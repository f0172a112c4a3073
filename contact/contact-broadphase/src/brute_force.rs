//! Exhaustive reference broad phase.
//!
//! O(n²) scans over the batch-built primitive boxes, applying the same
//! incidence filters and AABB predicates as the voxel-hash enumeration.
//! Useful as a correctness oracle and for meshes small enough that grid
//! construction is not worth it.

// Primitive ids are u32 by contract; meshes stay below 2^32 vertices.
#![allow(clippy::cast_possible_truncation)]

use contact_types::{CandidateKinds, Candidates, Point3};

use crate::boxes::{
    build_edge_boxes, build_face_boxes, build_moving_vertex_boxes, build_vertex_boxes,
};
use crate::predicates::{
    edge_edge_aabb_ccd, edge_edge_aabb_cd, point_edge_aabb_ccd, point_edge_aabb_cd,
    point_triangle_aabb_ccd, point_triangle_aabb_cd,
};

/// Enumerate candidate pairs of a static mesh by exhaustive scan.
///
/// Produces the same pair conventions as
/// [`SpatialHash::query_mesh_for_candidates`](crate::SpatialHash::query_mesh_for_candidates):
/// `(edge, vertex)`, `(edge_a, edge_b)` with `edge_a < edge_b`, and
/// `(face, vertex)`, with incident pairs excluded.
#[must_use]
pub fn brute_force_candidates(
    vertices: &[Point3<f64>],
    edges: &[[u32; 2]],
    faces: &[[u32; 3]],
    radius: f64,
    kinds: CandidateKinds,
) -> Candidates {
    let vertex_boxes = build_vertex_boxes(vertices, radius);
    let edge_boxes = build_edge_boxes(&vertex_boxes, edges);
    let face_boxes = build_face_boxes(&vertex_boxes, faces);

    let mut candidates = Candidates::new();

    if kinds.edge_vertex {
        for (ei, edge_box) in edge_boxes.iter().enumerate() {
            let [a, b] = edges[ei];
            for (vi, vertex_box) in vertex_boxes.iter().enumerate() {
                if !edge_box.shares_vertex(vertex_box)
                    && edge_box.intersects(vertex_box)
                    && point_edge_aabb_cd(
                        vertices[vi],
                        vertices[a as usize],
                        vertices[b as usize],
                        radius,
                    )
                {
                    candidates.edge_vertex.push((ei as u32, vi as u32));
                }
            }
        }
    }

    if kinds.edge_edge {
        for (eai, ea_box) in edge_boxes.iter().enumerate() {
            let [a0, a1] = edges[eai];
            for (ebi, eb_box) in edge_boxes.iter().enumerate().skip(eai + 1) {
                let [b0, b1] = edges[ebi];
                if !ea_box.shares_vertex(eb_box)
                    && ea_box.intersects(eb_box)
                    && edge_edge_aabb_cd(
                        vertices[a0 as usize],
                        vertices[a1 as usize],
                        vertices[b0 as usize],
                        vertices[b1 as usize],
                        radius,
                    )
                {
                    candidates.edge_edge.push((eai as u32, ebi as u32));
                }
            }
        }
    }

    if kinds.face_vertex {
        for (fi, face_box) in face_boxes.iter().enumerate() {
            let [a, b, c] = faces[fi];
            for (vi, vertex_box) in vertex_boxes.iter().enumerate() {
                if !face_box.shares_vertex(vertex_box)
                    && face_box.intersects(vertex_box)
                    && point_triangle_aabb_cd(
                        vertices[vi],
                        vertices[a as usize],
                        vertices[b as usize],
                        vertices[c as usize],
                        radius,
                    )
                {
                    candidates.face_vertex.push((fi as u32, vi as u32));
                }
            }
        }
    }

    candidates
}

/// Enumerate candidate pairs of a moving mesh by exhaustive scan.
///
/// Same contract as [`brute_force_candidates`], with every box and
/// predicate evaluated over the swept interval.
///
/// # Panics
///
/// Panics if the two time samples disagree on vertex count.
#[must_use]
pub fn brute_force_moving_candidates(
    vertices_t0: &[Point3<f64>],
    vertices_t1: &[Point3<f64>],
    edges: &[[u32; 2]],
    faces: &[[u32; 3]],
    radius: f64,
    kinds: CandidateKinds,
) -> Candidates {
    let vertex_boxes = build_moving_vertex_boxes(vertices_t0, vertices_t1, radius);
    let edge_boxes = build_edge_boxes(&vertex_boxes, edges);
    let face_boxes = build_face_boxes(&vertex_boxes, faces);

    let mut candidates = Candidates::new();

    if kinds.edge_vertex {
        for (ei, edge_box) in edge_boxes.iter().enumerate() {
            let [a, b] = edges[ei];
            for (vi, vertex_box) in vertex_boxes.iter().enumerate() {
                if !edge_box.shares_vertex(vertex_box)
                    && edge_box.intersects(vertex_box)
                    && point_edge_aabb_ccd(
                        vertices_t0[vi],
                        vertices_t0[a as usize],
                        vertices_t0[b as usize],
                        vertices_t1[vi],
                        vertices_t1[a as usize],
                        vertices_t1[b as usize],
                        radius,
                    )
                {
                    candidates.edge_vertex.push((ei as u32, vi as u32));
                }
            }
        }
    }

    if kinds.edge_edge {
        for (eai, ea_box) in edge_boxes.iter().enumerate() {
            let [a0, a1] = edges[eai];
            for (ebi, eb_box) in edge_boxes.iter().enumerate().skip(eai + 1) {
                let [b0, b1] = edges[ebi];
                if !ea_box.shares_vertex(eb_box)
                    && ea_box.intersects(eb_box)
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
                    candidates.edge_edge.push((eai as u32, ebi as u32));
                }
            }
        }
    }

    if kinds.face_vertex {
        for (fi, face_box) in face_boxes.iter().enumerate() {
            let [a, b, c] = faces[fi];
            for (vi, vertex_box) in vertex_boxes.iter().enumerate() {
                if !face_box.shares_vertex(vertex_box)
                    && face_box.intersects(vertex_box)
                    && point_triangle_aabb_ccd(
                        vertices_t0[vi],
                        vertices_t0[a as usize],
                        vertices_t0[b as usize],
                        vertices_t0[c as usize],
                        vertices_t1[vi],
                        vertices_t1[a as usize],
                        vertices_t1[b as usize],
                        vertices_t1[c as usize],
                        radius,
                    )
                {
                    candidates.face_vertex.push((fi as u32, vi as u32));
                }
            }
        }
    }

    candidates
}
