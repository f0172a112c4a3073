//! Batch AABB construction for mesh primitives.
//!
//! One box per vertex, then per-edge and per-face boxes as unions of the
//! vertex boxes. All builders are embarrassingly parallel.

// Primitive ids are u32 by contract; meshes stay below 2^32 vertices.
#![allow(clippy::cast_possible_truncation)]

use contact_types::{Aabb, Point3};
use rayon::prelude::*;

/// Build one AABB per vertex position.
///
/// # Arguments
///
/// * `vertices` - Vertex positions
/// * `inflation_radius` - Radius of a sphere around each vertex which its
///   box encloses
#[must_use]
pub fn build_vertex_boxes(vertices: &[Point3<f64>], inflation_radius: f64) -> Vec<Aabb> {
    vertices
        .par_iter()
        .enumerate()
        .map(|(i, p)| Aabb::from_vertex(i as u32, *p, inflation_radius))
        .collect()
}

/// Build one AABB per vertex moving linearly from t=0 to t=1.
///
/// # Panics
///
/// Panics if the two time samples disagree on vertex count.
#[must_use]
pub fn build_moving_vertex_boxes(
    vertices_t0: &[Point3<f64>],
    vertices_t1: &[Point3<f64>],
    inflation_radius: f64,
) -> Vec<Aabb> {
    assert_eq!(
        vertices_t0.len(),
        vertices_t1.len(),
        "vertex count mismatch between time samples"
    );
    vertices_t0
        .par_iter()
        .zip(vertices_t1)
        .enumerate()
        .map(|(i, (p0, p1))| Aabb::from_moving_vertex(i as u32, *p0, *p1, inflation_radius))
        .collect()
}

/// Build one AABB per edge as the union of its endpoint boxes.
#[must_use]
pub fn build_edge_boxes(vertex_boxes: &[Aabb], edges: &[[u32; 2]]) -> Vec<Aabb> {
    edges
        .par_iter()
        .map(|e| {
            Aabb::merged(
                &vertex_boxes[e[0] as usize],
                &vertex_boxes[e[1] as usize],
            )
        })
        .collect()
}

/// Build one AABB per face as the union of its corner boxes.
#[must_use]
pub fn build_face_boxes(vertex_boxes: &[Aabb], faces: &[[u32; 3]]) -> Vec<Aabb> {
    faces
        .par_iter()
        .map(|f| {
            Aabb::merged3(
                &vertex_boxes[f[0] as usize],
                &vertex_boxes[f[1] as usize],
                &vertex_boxes[f[2] as usize],
            )
        })
        .collect()
}
