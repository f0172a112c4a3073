//! Voxel size suggestion from mesh statistics.

// Averages divide by element counts; meshes stay far below 2^52 elements.
#![allow(clippy::cast_precision_loss)]

use contact_types::Point3;

/// Mean edge length across both time samples.
///
/// Each edge contributes the average of its length at t=0 and at t=1.
/// Returns 0.0 for a mesh without edges.
#[must_use]
pub fn average_edge_length(
    vertices_t0: &[Point3<f64>],
    vertices_t1: &[Point3<f64>],
    edges: &[[u32; 2]],
) -> f64 {
    if edges.is_empty() {
        return 0.0;
    }
    let total: f64 = edges
        .iter()
        .map(|e| {
            let (a, b) = (e[0] as usize, e[1] as usize);
            (vertices_t0[a] - vertices_t0[b]).norm() + (vertices_t1[a] - vertices_t1[b]).norm()
        })
        .sum();
    total / (2.0 * edges.len() as f64)
}

/// Mean vertex displacement between the two time samples.
///
/// Returns 0.0 for an empty mesh.
#[must_use]
pub fn average_displacement_length(
    vertices_t0: &[Point3<f64>],
    vertices_t1: &[Point3<f64>],
) -> f64 {
    if vertices_t0.is_empty() {
        return 0.0;
    }
    let total: f64 = vertices_t0
        .iter()
        .zip(vertices_t1)
        .map(|(p0, p1)| (p1 - p0).norm())
        .sum();
    total / vertices_t0.len() as f64
}

/// Suggested voxel size for a static mesh.
///
/// Twice the average edge length plus the inflation radius: a cell then
/// comfortably covers one edge and its proximity halo, keeping per-cell
/// occupancy small without scattering a primitive over many cells.
#[must_use]
pub fn suggest_voxel_size(
    vertices: &[Point3<f64>],
    edges: &[[u32; 2]],
    inflation_radius: f64,
) -> f64 {
    2.0 * average_edge_length(vertices, vertices, edges) + inflation_radius
}

/// Suggested voxel size for a mesh moving between two time samples.
///
/// Uses the larger of the average edge length and the average displacement,
/// so fast motion widens the cells with it.
#[must_use]
pub fn suggest_voxel_size_moving(
    vertices_t0: &[Point3<f64>],
    vertices_t1: &[Point3<f64>],
    edges: &[[u32; 2]],
    inflation_radius: f64,
) -> f64 {
    let edge_len = average_edge_length(vertices_t0, vertices_t1, edges);
    let disp_len = average_displacement_length(vertices_t0, vertices_t1);
    2.0 * edge_len.max(disp_len) + inflation_radius
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn average_edge_length_static() {
        let vertices = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let edges = [[0, 1], [0, 2]];
        assert_eq!(average_edge_length(&vertices, &vertices, &edges), 3.0);
    }

    #[test]
    fn average_edge_length_averages_time_samples() {
        let v0 = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let v1 = [Point3::new(0.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)];
        let edges = [[0, 1]];
        assert_eq!(average_edge_length(&v0, &v1, &edges), 2.0);
    }

    #[test]
    fn average_edge_length_empty() {
        let vertices = [Point3::new(0.0, 0.0, 0.0)];
        assert_eq!(average_edge_length(&vertices, &vertices, &[]), 0.0);
    }

    #[test]
    fn average_displacement() {
        let v0 = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let v1 = [Point3::new(0.0, 3.0, 0.0), Point3::new(1.0, 0.0, 1.0)];
        assert_eq!(average_displacement_length(&v0, &v1), 2.0);
        assert_eq!(average_displacement_length(&[], &[]), 0.0);
    }

    #[test]
    fn suggested_size_includes_radius() {
        let vertices = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let edges = [[0, 1]];
        assert_eq!(suggest_voxel_size(&vertices, &edges, 0.5), 2.5);
    }

    #[test]
    fn suggested_moving_size_tracks_displacement() {
        let v0 = [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
        let v1 = [Point3::new(0.0, 5.0, 0.0), Point3::new(1.0, 5.0, 0.0)];
        let edges = [[0, 1]];
        // Displacement (5.0) dominates edge length (1.0).
        assert_eq!(suggest_voxel_size_moving(&v0, &v1, &edges, 0.0), 10.0);
    }
}
