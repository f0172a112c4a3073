//! Uniform-grid voxel hash over mesh primitives.

// Voxel arithmetic converts between f64 coordinates and i32 cell indices;
// the grid dimensions are clamped so the conversions stay in range.
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]

use std::collections::HashMap;

use contact_types::Point3;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::SpatialHashConfig;
use crate::sizing::{suggest_voxel_size, suggest_voxel_size_moving};

#[cfg(debug_assertions)]
use contact_types::validate_topology;

/// A voxel-hash spatial index over the primitives of a triangle mesh.
///
/// Vertices, edges, and faces share one primitive id space split by two
/// offsets: ids in `[0, edge_start)` are vertices, `[edge_start, tri_start)`
/// are edges, and `[tri_start, ..)` are faces. Each occupied grid cell maps
/// its linear index `ix + iy*nx + iz*nx*ny` to the ids of the primitives
/// whose bounding boxes touch it.
///
/// Build once per timestep with [`SpatialHash::build`] (static geometry) or
/// [`SpatialHash::build_moving`] (geometry moving linearly between two time
/// samples), then issue any number of concurrent queries; all query methods
/// take `&self`.
///
/// Query outputs are sorted and deduplicated, so a query is deterministic
/// for a given build.
#[derive(Debug)]
pub struct SpatialHash {
    /// Componentwise minimum of all input positions (both samples if moving).
    left_bottom: Point3<f64>,
    /// Componentwise maximum of all input positions.
    right_top: Point3<f64>,
    /// Reciprocal of the voxel edge length; 0.0 collapses every point into
    /// cell zero (single-cell fallback for zero-extent geometry).
    inv_voxel_size: f64,
    /// Cells per axis.
    voxel_count: [i32; 3],
    /// `voxel_count[0] * voxel_count[1]`, the z-stride of the linear index.
    voxel_count_xy: i32,
    /// First edge id in the unified primitive id space.
    edge_start: u32,
    /// First face id in the unified primitive id space.
    tri_start: u32,
    /// Linear cell index to the ids of primitives touching that cell, in
    /// insertion order.
    voxel: HashMap<i32, Vec<u32>>,
    /// For every vertex and edge id, the cells that primitive occupies.
    point_and_edge_occupancy: Vec<Vec<i32>>,
}

impl SpatialHash {
    /// Build the index for static geometry.
    ///
    /// `voxel_size <= 0.0` auto-sizes the grid from the mesh (see
    /// [`suggest_voxel_size`]).
    #[must_use]
    pub fn build(
        vertices: &[Point3<f64>],
        edges: &[[u32; 2]],
        faces: &[[u32; 3]],
        voxel_size: f64,
    ) -> Self {
        Self::build_with_config(
            vertices,
            edges,
            faces,
            &SpatialHashConfig::default().with_voxel_size(voxel_size),
        )
    }

    /// Build the index for geometry moving linearly between two time
    /// samples.
    ///
    /// `voxel_size <= 0.0` auto-sizes the grid from the mesh and its motion
    /// (see [`suggest_voxel_size_moving`]).
    #[must_use]
    pub fn build_moving(
        vertices_t0: &[Point3<f64>],
        vertices_t1: &[Point3<f64>],
        edges: &[[u32; 2]],
        faces: &[[u32; 3]],
        voxel_size: f64,
    ) -> Self {
        Self::build_moving_with_config(
            vertices_t0,
            vertices_t1,
            edges,
            faces,
            &SpatialHashConfig::default().with_voxel_size(voxel_size),
        )
    }

    /// Build the index for static geometry with explicit configuration.
    #[must_use]
    pub fn build_with_config(
        vertices: &[Point3<f64>],
        edges: &[[u32; 2]],
        faces: &[[u32; 3]],
        config: &SpatialHashConfig,
    ) -> Self {
        Self::build_impl(vertices, None, edges, faces, config)
    }

    /// Build the index for moving geometry with explicit configuration.
    #[must_use]
    pub fn build_moving_with_config(
        vertices_t0: &[Point3<f64>],
        vertices_t1: &[Point3<f64>],
        edges: &[[u32; 2]],
        faces: &[[u32; 3]],
        config: &SpatialHashConfig,
    ) -> Self {
        Self::build_impl(vertices_t0, Some(vertices_t1), edges, faces, config)
    }

    #[allow(clippy::too_many_lines)]
    fn build_impl(
        vertices_t0: &[Point3<f64>],
        vertices_t1: Option<&[Point3<f64>]>,
        edges: &[[u32; 2]],
        faces: &[[u32; 3]],
        config: &SpatialHashConfig,
    ) -> Self {
        #[cfg(debug_assertions)]
        if let Err(err) = validate_topology(
            vertices_t0.len(),
            vertices_t1.map(<[Point3<f64>]>::len),
            edges,
            faces,
        ) {
            panic!("spatial hash build precondition violated: {err}");
        }

        let mut voxel_size = config.voxel_size;
        if voxel_size <= 0.0 {
            voxel_size = match vertices_t1 {
                Some(v1) => suggest_voxel_size_moving(vertices_t0, v1, edges, 0.0),
                None => suggest_voxel_size(vertices_t0, edges, 0.0),
            };
        }

        let (left_bottom, right_top) = world_extent(vertices_t0, vertices_t1);
        let range = right_top - left_bottom;

        let mut inv_voxel_size = 1.0 / voxel_size;
        let counts = [
            (range.x * inv_voxel_size).ceil(),
            (range.y * inv_voxel_size).ceil(),
            (range.z * inv_voxel_size).ceil(),
        ];
        let degenerate = !inv_voxel_size.is_finite()
            || counts.iter().any(|&c| !(c >= 1.0))
            || counts[0] * counts[1] * counts[2] > f64::from(i32::MAX);
        let voxel_count = if degenerate {
            // Extreme or zero extent: collapse to one cell. Correct, slow.
            inv_voxel_size = 1.0 / (range.x.max(range.y).max(range.z) * 1.01);
            if !inv_voxel_size.is_finite() {
                inv_voxel_size = 0.0;
            }
            warn!(
                voxel_size,
                range = ?[range.x, range.y, range.z],
                "voxel grid degenerate; falling back to a single cell"
            );
            [1, 1, 1]
        } else {
            [counts[0] as i32, counts[1] as i32, counts[2] as i32]
        };
        let voxel_count_xy = voxel_count[0] * voxel_count[1];

        let edge_start = vertices_t0.len() as u32;
        let tri_start = edge_start + edges.len() as u32;

        // Per-vertex cell ranges over the motion interval (collapsed for a
        // static build).
        let vertex_count = vertices_t0.len();
        let (vertex_min_vai, vertex_max_vai): (Vec<[i32; 3]>, Vec<[i32; 3]>) = (0..vertex_count)
            .into_par_iter()
            .map(|vi| {
                let a0 = locate_axis(vertices_t0[vi], left_bottom, inv_voxel_size);
                match vertices_t1 {
                    Some(v1) => {
                        let a1 = locate_axis(v1[vi], left_bottom, inv_voxel_size);
                        (axis_min(a0, a1), axis_max(a0, a1))
                    }
                    None => (a0, a0),
                }
            })
            .unzip();

        // Cell lists for vertices and edges, filled in parallel over
        // disjoint slots.
        let mut point_and_edge_occupancy: Vec<Vec<i32>> = vec![Vec::new(); tri_start as usize];
        let (vertex_slots, edge_slots) =
            point_and_edge_occupancy.split_at_mut(edge_start as usize);
        vertex_slots.par_iter_mut().enumerate().for_each(|(vi, cells)| {
            push_cells(
                vertex_min_vai[vi],
                vertex_max_vai[vi],
                voxel_count[0],
                voxel_count_xy,
                cells,
            );
        });
        edge_slots.par_iter_mut().enumerate().for_each(|(ei, cells)| {
            let [a, b] = edges[ei];
            let mins = axis_min(
                vertex_min_vai[a as usize],
                vertex_min_vai[b as usize],
            );
            let maxs = axis_max(
                vertex_max_vai[a as usize],
                vertex_max_vai[b as usize],
            );
            push_cells(mins, maxs, voxel_count[0], voxel_count_xy, cells);
        });

        let face_cells: Vec<Vec<i32>> = faces
            .par_iter()
            .map(|f| {
                let mins = axis_min(
                    axis_min(
                        vertex_min_vai[f[0] as usize],
                        vertex_min_vai[f[1] as usize],
                    ),
                    vertex_min_vai[f[2] as usize],
                );
                let maxs = axis_max(
                    axis_max(
                        vertex_max_vai[f[0] as usize],
                        vertex_max_vai[f[1] as usize],
                    ),
                    vertex_max_vai[f[2] as usize],
                );
                let mut cells = Vec::new();
                push_cells(mins, maxs, voxel_count[0], voxel_count_xy, &mut cells);
                cells
            })
            .collect();

        let voxel = if config.parallel_insert {
            insert_parallel(&point_and_edge_occupancy, &face_cells, tri_start)
        } else {
            insert_serial(&point_and_edge_occupancy, &face_cells, tri_start)
        };

        debug!(
            vertices = vertices_t0.len(),
            edges = edges.len(),
            faces = faces.len(),
            voxel_count = ?voxel_count,
            occupied_cells = voxel.len(),
            moving = vertices_t1.is_some(),
            "built spatial hash"
        );

        Self {
            left_bottom,
            right_top,
            inv_voxel_size,
            voxel_count,
            voxel_count_xy,
            edge_start,
            tri_start,
            voxel,
            point_and_edge_occupancy,
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// First edge id in the unified primitive id space.
    #[inline]
    #[must_use]
    pub const fn edge_start(&self) -> u32 {
        self.edge_start
    }

    /// First face id in the unified primitive id space.
    #[inline]
    #[must_use]
    pub const fn tri_start(&self) -> u32 {
        self.tri_start
    }

    /// Cells per axis.
    #[inline]
    #[must_use]
    pub const fn voxel_count(&self) -> [i32; 3] {
        self.voxel_count
    }

    /// Lower corner of the indexed region.
    #[inline]
    #[must_use]
    pub const fn left_bottom(&self) -> Point3<f64> {
        self.left_bottom
    }

    /// Upper corner of the indexed region.
    #[inline]
    #[must_use]
    pub const fn right_top(&self) -> Point3<f64> {
        self.right_top
    }

    /// Reciprocal of the voxel edge length.
    #[inline]
    #[must_use]
    pub const fn inv_voxel_size(&self) -> f64 {
        self.inv_voxel_size
    }

    /// Cells occupied by a stored vertex or edge, by unified primitive id.
    #[must_use]
    pub fn occupancy(&self, primitive_id: u32) -> &[i32] {
        &self.point_and_edge_occupancy[primitive_id as usize]
    }

    /// Primitive ids stored in a cell, in insertion order.
    #[must_use]
    pub fn ids_in_cell(&self, cell: i32) -> &[u32] {
        self.voxel.get(&cell).map_or(&[], Vec::as_slice)
    }

    // ------------------------------------------------------------------
    // World-space queries
    // ------------------------------------------------------------------

    /// Face ids whose cells overlap the ball of `radius` around `p`.
    #[must_use]
    pub fn query_point_for_triangles(&self, p: Point3<f64>, radius: f64) -> Vec<u32> {
        let lo = offset(p, -radius);
        let hi = offset(p, radius);
        let mut out = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id >= self.tri_start {
                out.push(id - self.tri_start);
            }
        });
        sorted_unique(out)
    }

    /// Face ids near a point moving from `p_t0` to `p_t1`, inflated by
    /// `radius`.
    #[must_use]
    pub fn query_moving_point_for_triangles(
        &self,
        p_t0: Point3<f64>,
        p_t1: Point3<f64>,
        radius: f64,
    ) -> Vec<u32> {
        let lo = offset(point_min(p_t0, p_t1), -radius);
        let hi = offset(point_max(p_t0, p_t1), radius);
        let mut out = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id >= self.tri_start {
                out.push(id - self.tri_start);
            }
        });
        sorted_unique(out)
    }

    /// Vertex, edge, and face ids near a point moving from `p_t0` to
    /// `p_t1`.
    ///
    /// No inflation is applied; callers fold any proximity radius into the
    /// endpoint positions.
    #[must_use]
    pub fn query_moving_point_for_primitives(
        &self,
        p_t0: Point3<f64>,
        p_t1: Point3<f64>,
    ) -> (Vec<u32>, Vec<u32>, Vec<u32>) {
        let lo = point_min(p_t0, p_t1);
        let hi = point_max(p_t0, p_t1);
        let mut verts = Vec::new();
        let mut edges = Vec::new();
        let mut tris = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id < self.edge_start {
                verts.push(id);
            } else if id < self.tri_start {
                edges.push(id - self.edge_start);
            } else {
                tris.push(id - self.tri_start);
            }
        });
        (sorted_unique(verts), sorted_unique(edges), sorted_unique(tris))
    }

    /// Vertex and edge ids whose cells overlap the edge `(e0, e1)`.
    ///
    /// No inflation is applied; callers fold any proximity radius into the
    /// endpoint positions.
    #[must_use]
    pub fn query_edge_for_vertices_and_edges(
        &self,
        e0: Point3<f64>,
        e1: Point3<f64>,
    ) -> (Vec<u32>, Vec<u32>) {
        let lo = point_min(e0, e1);
        let hi = point_max(e0, e1);
        let mut verts = Vec::new();
        let mut edges = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id < self.edge_start {
                verts.push(id);
            } else if id < self.tri_start {
                edges.push(id - self.edge_start);
            }
        });
        (sorted_unique(verts), sorted_unique(edges))
    }

    /// Edge ids near the edge `(e0, e1)` inflated by `radius`, restricted to
    /// ids greater than `eai`.
    ///
    /// The `> eai` tie-breaker makes each unordered edge pair visible from
    /// exactly one of its two edges.
    #[must_use]
    pub fn query_edge_for_edges(
        &self,
        e0: Point3<f64>,
        e1: Point3<f64>,
        radius: f64,
        eai: u32,
    ) -> Vec<u32> {
        let lo = offset(point_min(e0, e1), -radius);
        let hi = offset(point_max(e0, e1), radius);
        let mut out = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id >= self.edge_start && id < self.tri_start && id - self.edge_start > eai {
                out.push(id - self.edge_start);
            }
        });
        sorted_unique(out)
    }

    /// [`query_edge_for_edges`](Self::query_edge_for_edges) with an
    /// additional world-space box filter.
    ///
    /// Cell coincidence is coarser than box overlap, so each candidate
    /// edge's box (rebuilt from `vertices` and `edges`) must additionally
    /// overlap the inflated query interval.
    #[must_use]
    pub fn query_edge_for_edges_with_bbox_check(
        &self,
        vertices: &[Point3<f64>],
        edges: &[[u32; 2]],
        e0: Point3<f64>,
        e1: Point3<f64>,
        radius: f64,
        eai: u32,
    ) -> Vec<u32> {
        let lo = offset(point_min(e0, e1), -radius);
        let hi = offset(point_max(e0, e1), radius);
        let mut out = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id >= self.edge_start && id < self.tri_start && id - self.edge_start > eai {
                let ebi = id - self.edge_start;
                let [b0, b1] = edges[ebi as usize];
                let eb_lo = point_min(vertices[b0 as usize], vertices[b1 as usize]);
                let eb_hi = point_max(vertices[b0 as usize], vertices[b1 as usize]);
                if boxes_overlap(lo, hi, eb_lo, eb_hi) {
                    out.push(ebi);
                }
            }
        });
        sorted_unique(out)
    }

    /// Edge ids near an edge moving between two time samples, inflated by
    /// `radius`, restricted to ids greater than `eai`.
    #[must_use]
    pub fn query_moving_edge_for_edges(
        &self,
        ea0_t0: Point3<f64>,
        ea1_t0: Point3<f64>,
        ea0_t1: Point3<f64>,
        ea1_t1: Point3<f64>,
        radius: f64,
        eai: u32,
    ) -> Vec<u32> {
        let lo = offset(
            point_min(point_min(ea0_t0, ea1_t0), point_min(ea0_t1, ea1_t1)),
            -radius,
        );
        let hi = offset(
            point_max(point_max(ea0_t0, ea1_t0), point_max(ea0_t1, ea1_t1)),
            radius,
        );
        let mut out = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id >= self.edge_start && id < self.tri_start && id - self.edge_start > eai {
                out.push(id - self.edge_start);
            }
        });
        sorted_unique(out)
    }

    /// Vertex ids near the triangle `(t0, t1, t2)` inflated by `radius`.
    #[must_use]
    pub fn query_triangle_for_points(
        &self,
        t0: Point3<f64>,
        t1: Point3<f64>,
        t2: Point3<f64>,
        radius: f64,
    ) -> Vec<u32> {
        let lo = offset(point_min(point_min(t0, t1), t2), -radius);
        let hi = offset(point_max(point_max(t0, t1), t2), radius);
        let mut out = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id < self.edge_start {
                out.push(id);
            }
        });
        sorted_unique(out)
    }

    /// Vertex ids near a triangle moving between two time samples.
    ///
    /// No inflation is applied; callers fold any proximity radius into the
    /// corner positions.
    #[must_use]
    pub fn query_moving_triangle_for_points(
        &self,
        t0_t0: Point3<f64>,
        t1_t0: Point3<f64>,
        t2_t0: Point3<f64>,
        t0_t1: Point3<f64>,
        t1_t1: Point3<f64>,
        t2_t1: Point3<f64>,
    ) -> Vec<u32> {
        let lo = point_min(
            point_min(point_min(t0_t0, t1_t0), t2_t0),
            point_min(point_min(t0_t1, t1_t1), t2_t1),
        );
        let hi = point_max(
            point_max(point_max(t0_t0, t1_t0), t2_t0),
            point_max(point_max(t0_t1, t1_t1), t2_t1),
        );
        let mut out = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id < self.edge_start {
                out.push(id);
            }
        });
        sorted_unique(out)
    }

    /// Edge ids near the triangle `(t0, t1, t2)` inflated by `radius`.
    #[must_use]
    pub fn query_triangle_for_edges(
        &self,
        t0: Point3<f64>,
        t1: Point3<f64>,
        t2: Point3<f64>,
        radius: f64,
    ) -> Vec<u32> {
        let lo = offset(point_min(point_min(t0, t1), t2), -radius);
        let hi = offset(point_max(point_max(t0, t1), t2), radius);
        let mut out = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id >= self.edge_start && id < self.tri_start {
                out.push(id - self.edge_start);
            }
        });
        sorted_unique(out)
    }

    /// Face ids near the edge `(e0, e1)` inflated by `radius`.
    #[must_use]
    pub fn query_edge_for_triangles(
        &self,
        e0: Point3<f64>,
        e1: Point3<f64>,
        radius: f64,
    ) -> Vec<u32> {
        let lo = offset(point_min(e0, e1), -radius);
        let hi = offset(point_max(e0, e1), radius);
        let mut out = Vec::new();
        self.for_each_id_in_world_box(lo, hi, |id| {
            if id >= self.tri_start {
                out.push(id - self.tri_start);
            }
        });
        sorted_unique(out)
    }

    // ------------------------------------------------------------------
    // Occupancy queries, keyed by stored primitive index
    // ------------------------------------------------------------------

    /// Vertex, edge, and face ids sharing a cell with stored vertex `vi`.
    ///
    /// Skips the world-space interval derivation by walking the cells
    /// recorded for `vi` at build time; this is the fast path used by the
    /// mesh-level candidate query.
    #[must_use]
    pub fn query_stored_vertex_for_primitives(&self, vi: u32) -> (Vec<u32>, Vec<u32>, Vec<u32>) {
        let mut verts = Vec::new();
        let mut edges = Vec::new();
        let mut tris = Vec::new();
        self.for_each_id_in_occupancy(vi, |id| {
            if id < self.edge_start {
                verts.push(id);
            } else if id < self.tri_start {
                edges.push(id - self.edge_start);
            } else {
                tris.push(id - self.tri_start);
            }
        });
        (sorted_unique(verts), sorted_unique(edges), sorted_unique(tris))
    }

    /// Edge ids sharing a cell with stored vertex `vi`.
    #[must_use]
    pub fn query_stored_vertex_for_edges(&self, vi: u32) -> Vec<u32> {
        let mut out = Vec::new();
        self.for_each_id_in_occupancy(vi, |id| {
            if id >= self.edge_start && id < self.tri_start {
                out.push(id - self.edge_start);
            }
        });
        sorted_unique(out)
    }

    /// Face ids sharing a cell with stored vertex `vi`.
    #[must_use]
    pub fn query_stored_vertex_for_triangles(&self, vi: u32) -> Vec<u32> {
        let mut out = Vec::new();
        self.for_each_id_in_occupancy(vi, |id| {
            if id >= self.tri_start {
                out.push(id - self.tri_start);
            }
        });
        sorted_unique(out)
    }

    /// Edge ids greater than `eai` sharing a cell with stored edge `eai`.
    #[must_use]
    pub fn query_stored_edge_for_edges(&self, eai: u32) -> Vec<u32> {
        let mut out = Vec::new();
        self.for_each_id_in_occupancy(self.edge_start + eai, |id| {
            if id >= self.edge_start && id < self.tri_start && id - self.edge_start > eai {
                out.push(id - self.edge_start);
            }
        });
        sorted_unique(out)
    }

    /// [`query_stored_edge_for_edges`](Self::query_stored_edge_for_edges)
    /// with an additional swept world-space box filter.
    ///
    /// Each candidate edge's box over the motion interval (rebuilt from the
    /// two position samples) must overlap the query edge's box over the same
    /// interval.
    #[must_use]
    pub fn query_stored_edge_for_edges_with_bbox_check(
        &self,
        vertices_t0: &[Point3<f64>],
        vertices_t1: &[Point3<f64>],
        edges: &[[u32; 2]],
        eai: u32,
    ) -> Vec<u32> {
        let (ea_lo, ea_hi) = moving_edge_box(vertices_t0, vertices_t1, edges[eai as usize]);
        let mut out = Vec::new();
        self.for_each_id_in_occupancy(self.edge_start + eai, |id| {
            if id >= self.edge_start && id < self.tri_start && id - self.edge_start > eai {
                let ebi = id - self.edge_start;
                let (eb_lo, eb_hi) =
                    moving_edge_box(vertices_t0, vertices_t1, edges[ebi as usize]);
                if boxes_overlap(ea_lo, ea_hi, eb_lo, eb_hi) {
                    out.push(ebi);
                }
            }
        });
        sorted_unique(out)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn locate_voxel_axis_index(&self, p: Point3<f64>) -> [i32; 3] {
        locate_axis(p, self.left_bottom, self.inv_voxel_size)
    }

    /// Visit every primitive id stored in the cells covered by the world
    /// interval `[lo, hi]`, clamped to the grid.
    fn for_each_id_in_world_box(
        &self,
        lo: Point3<f64>,
        hi: Point3<f64>,
        mut visit: impl FnMut(u32),
    ) {
        let mut mins = self.locate_voxel_axis_index(lo);
        let mut maxs = self.locate_voxel_axis_index(hi);
        for axis in 0..3 {
            mins[axis] = mins[axis].max(0);
            maxs[axis] = maxs[axis].min(self.voxel_count[axis] - 1);
        }
        for iz in mins[2]..=maxs[2] {
            let z_offset = iz * self.voxel_count_xy;
            for iy in mins[1]..=maxs[1] {
                let yz_offset = iy * self.voxel_count[0] + z_offset;
                for ix in mins[0]..=maxs[0] {
                    if let Some(ids) = self.voxel.get(&(ix + yz_offset)) {
                        for &id in ids {
                            visit(id);
                        }
                    }
                }
            }
        }
    }

    /// Visit every primitive id sharing a cell with the stored vertex or
    /// edge `primitive_id`.
    fn for_each_id_in_occupancy(&self, primitive_id: u32, mut visit: impl FnMut(u32)) {
        for cell in &self.point_and_edge_occupancy[primitive_id as usize] {
            if let Some(ids) = self.voxel.get(cell) {
                for &id in ids {
                    visit(id);
                }
            }
        }
    }
}

/// Componentwise extremes over all vertex positions of both time samples.
fn world_extent(
    vertices_t0: &[Point3<f64>],
    vertices_t1: Option<&[Point3<f64>]>,
) -> (Point3<f64>, Point3<f64>) {
    let mut lo = Point3::origin();
    let mut hi = Point3::origin();
    let mut first = true;
    for p in vertices_t0.iter().chain(vertices_t1.unwrap_or(&[])) {
        if first {
            lo = *p;
            hi = *p;
            first = false;
        } else {
            lo = point_min(lo, *p);
            hi = point_max(hi, *p);
        }
    }
    (lo, hi)
}

fn locate_axis(p: Point3<f64>, left_bottom: Point3<f64>, inv_voxel_size: f64) -> [i32; 3] {
    [
        ((p.x - left_bottom.x) * inv_voxel_size).floor() as i32,
        ((p.y - left_bottom.y) * inv_voxel_size).floor() as i32,
        ((p.z - left_bottom.z) * inv_voxel_size).floor() as i32,
    ]
}

fn axis_min(a: [i32; 3], b: [i32; 3]) -> [i32; 3] {
    [a[0].min(b[0]), a[1].min(b[1]), a[2].min(b[2])]
}

fn axis_max(a: [i32; 3], b: [i32; 3]) -> [i32; 3] {
    [a[0].max(b[0]), a[1].max(b[1]), a[2].max(b[2])]
}

/// Append the linear index of every cell in `[mins, maxs]` to `out`.
fn push_cells(mins: [i32; 3], maxs: [i32; 3], nx: i32, nx_ny: i32, out: &mut Vec<i32>) {
    let per_axis = |lo: i32, hi: i32| (hi - lo + 1).max(0) as usize;
    out.reserve(per_axis(mins[0], maxs[0]) * per_axis(mins[1], maxs[1]) * per_axis(mins[2], maxs[2]));
    for iz in mins[2]..=maxs[2] {
        let z_offset = iz * nx_ny;
        for iy in mins[1]..=maxs[1] {
            let yz_offset = iy * nx + z_offset;
            for ix in mins[0]..=maxs[0] {
                out.push(ix + yz_offset);
            }
        }
    }
}

/// Serial cell-map fill: append each primitive id to its cells in id order.
fn insert_serial(
    point_and_edge_occupancy: &[Vec<i32>],
    face_cells: &[Vec<i32>],
    tri_start: u32,
) -> HashMap<i32, Vec<u32>> {
    let mut voxel: HashMap<i32, Vec<u32>> = HashMap::new();
    for (id, cells) in point_and_edge_occupancy.iter().enumerate() {
        for &cell in cells {
            voxel.entry(cell).or_default().push(id as u32);
        }
    }
    for (fi, cells) in face_cells.iter().enumerate() {
        for &cell in cells {
            voxel.entry(cell).or_default().push(tri_start + fi as u32);
        }
    }
    voxel
}

/// Parallel cell-map fill: sort (cell, id) pairs, then group-insert.
fn insert_parallel(
    point_and_edge_occupancy: &[Vec<i32>],
    face_cells: &[Vec<i32>],
    tri_start: u32,
) -> HashMap<i32, Vec<u32>> {
    let total: usize = point_and_edge_occupancy.iter().map(Vec::len).sum::<usize>()
        + face_cells.iter().map(Vec::len).sum::<usize>();
    let mut pairs: Vec<(i32, u32)> = Vec::with_capacity(total);
    for (id, cells) in point_and_edge_occupancy.iter().enumerate() {
        pairs.extend(cells.iter().map(|&cell| (cell, id as u32)));
    }
    for (fi, cells) in face_cells.iter().enumerate() {
        pairs.extend(cells.iter().map(|&cell| (cell, tri_start + fi as u32)));
    }
    pairs.par_sort_unstable();

    let mut voxel: HashMap<i32, Vec<u32>> = HashMap::new();
    let mut current: Option<(i32, Vec<u32>)> = None;
    for (cell, id) in pairs {
        match &mut current {
            Some((c, ids)) if *c == cell => ids.push(id),
            _ => {
                if let Some((c, ids)) = current.take() {
                    voxel.insert(c, ids);
                }
                current = Some((cell, vec![id]));
            }
        }
    }
    if let Some((c, ids)) = current {
        voxel.insert(c, ids);
    }
    voxel
}

fn point_min(a: Point3<f64>, b: Point3<f64>) -> Point3<f64> {
    Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
}

fn point_max(a: Point3<f64>, b: Point3<f64>) -> Point3<f64> {
    Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
}

fn offset(p: Point3<f64>, d: f64) -> Point3<f64> {
    Point3::new(p.x + d, p.y + d, p.z + d)
}

/// Closed-interval overlap between two world boxes.
fn boxes_overlap(
    a_lo: Point3<f64>,
    a_hi: Point3<f64>,
    b_lo: Point3<f64>,
    b_hi: Point3<f64>,
) -> bool {
    !(b_lo.x > a_hi.x
        || b_lo.y > a_hi.y
        || b_lo.z > a_hi.z
        || a_lo.x > b_hi.x
        || a_lo.y > b_hi.y
        || a_lo.z > b_hi.z)
}

/// World box of an edge over the motion interval.
fn moving_edge_box(
    vertices_t0: &[Point3<f64>],
    vertices_t1: &[Point3<f64>],
    edge: [u32; 2],
) -> (Point3<f64>, Point3<f64>) {
    let (a, b) = (edge[0] as usize, edge[1] as usize);
    let lo = point_min(
        point_min(vertices_t0[a], vertices_t0[b]),
        point_min(vertices_t1[a], vertices_t1[b]),
    );
    let hi = point_max(
        point_max(vertices_t0[a], vertices_t0[b]),
        point_max(vertices_t1[a], vertices_t1[b]),
    );
    (lo, hi)
}

fn sorted_unique(mut ids: Vec<u32>) -> Vec<u32> {
    ids.sort_unstable();
    ids.dedup();
    ids
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    /// Unit right triangle in the z=0 plane plus a vertex above it.
    fn triangle_and_point() -> (Vec<Point3<f64>>, Vec<[u32; 2]>, Vec<[u32; 3]>) {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.3, 0.3, 0.05),
        ];
        let edges = vec![[0, 1], [1, 2], [2, 0]];
        let faces = vec![[0, 1, 2]];
        (vertices, edges, faces)
    }

    #[test]
    fn build_splits_id_space() {
        let (v, e, f) = triangle_and_point();
        let hash = SpatialHash::build(&v, &e, &f, 0.5);
        assert_eq!(hash.edge_start(), 4);
        assert_eq!(hash.tri_start(), 7);
    }

    #[test]
    fn grid_covers_extent() {
        let (v, e, f) = triangle_and_point();
        let hash = SpatialHash::build(&v, &e, &f, 0.5);
        assert_eq!(hash.left_bottom(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(hash.right_top(), Point3::new(1.0, 1.0, 0.05));
        // ceil(1.0 / 0.5) = 2 cells in x and y, ceil(0.05 / 0.5) = 1 in z.
        assert_eq!(hash.voxel_count(), [2, 2, 1]);
    }

    #[test]
    fn occupancy_matches_cell_ranges() {
        let (v, e, f) = triangle_and_point();
        let hash = SpatialHash::build(&v, &e, &f, 0.6);

        // Every cell listed for a primitive holds that primitive's id, and
        // every appearance of the id is in a listed cell.
        for id in 0..hash.tri_start() {
            let cells = hash.occupancy(id);
            assert!(!cells.is_empty());
            for &cell in cells {
                assert!(hash.ids_in_cell(cell).contains(&id));
            }
        }
        for (&cell, ids) in &hash.voxel {
            for &id in ids {
                if id < hash.tri_start() {
                    assert!(hash.occupancy(id).contains(&cell));
                }
            }
        }

        // Edge (0,1) spans x in [0,1] at y=0: exactly the two bottom cells.
        let edge_cells = hash.occupancy(hash.edge_start());
        assert_eq!(edge_cells, &[0, 1]);
    }

    #[test]
    fn moving_build_covers_both_samples() {
        let (v0, e, f) = triangle_and_point();
        let v1: Vec<_> = v0
            .iter()
            .map(|p| Point3::new(p.x, p.y + 1.0, p.z))
            .collect();
        let hash = SpatialHash::build_moving(&v0, &v1, &e, &f, 0.6);
        assert_eq!(hash.right_top().y, 2.0);
        // Vertex 0 moves from y=0 to y=1 and must occupy cells in both rows.
        let cells = hash.occupancy(0);
        assert!(cells.len() > 1);
    }

    #[test]
    fn degenerate_extent_falls_back_to_single_cell() {
        let v = vec![Point3::origin(), Point3::origin()];
        let e = vec![[0, 1]];
        let hash = SpatialHash::build(&v, &e, &[], 0.0);
        assert_eq!(hash.voxel_count(), [1, 1, 1]);
        // Everything lands in cell zero.
        assert_eq!(hash.ids_in_cell(0), &[0, 1, 2]);
    }

    #[test]
    fn huge_extent_falls_back_to_single_cell() {
        let v = vec![Point3::origin(), Point3::new(1e300, 0.0, 0.0)];
        let e = vec![[0, 1]];
        let hash = SpatialHash::build(&v, &e, &[], 1e-10);
        assert_eq!(hash.voxel_count(), [1, 1, 1]);
        assert_eq!(hash.ids_in_cell(0), &[0, 1, 2]);
    }

    #[test]
    fn point_query_finds_triangle() {
        let (v, e, f) = triangle_and_point();
        let hash = SpatialHash::build(&v, &e, &f, 0.6);
        assert_eq!(
            hash.query_point_for_triangles(Point3::new(0.3, 0.3, 0.05), 0.1),
            vec![0]
        );
        assert!(hash
            .query_point_for_triangles(Point3::new(10.0, 10.0, 10.0), 0.1)
            .is_empty());
    }

    #[test]
    fn edge_query_respects_tie_breaker() {
        let (v, e, f) = triangle_and_point();
        let hash = SpatialHash::build(&v, &e, &f, 0.6);
        // All three triangle edges share cells; from edge 0 only 1 and 2 are
        // visible, from edge 2 none.
        assert_eq!(hash.query_stored_edge_for_edges(0), vec![1, 2]);
        assert!(hash.query_stored_edge_for_edges(2).is_empty());
    }

    #[test]
    fn stored_vertex_queries_classify_ids() {
        let (v, e, f) = triangle_and_point();
        let hash = SpatialHash::build(&v, &e, &f, 0.6);
        let (verts, edges, tris) = hash.query_stored_vertex_for_primitives(3);
        assert!(verts.contains(&0));
        assert!(!edges.is_empty());
        assert_eq!(tris, vec![0]);
        assert_eq!(hash.query_stored_vertex_for_triangles(3), vec![0]);
    }

    #[test]
    fn world_queries_classify_ids() {
        let (v, e, f) = triangle_and_point();
        let hash = SpatialHash::build(&v, &e, &f, 0.6);
        let (verts, edges) =
            hash.query_edge_for_vertices_and_edges(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
        assert!(verts.contains(&0) && verts.contains(&1));
        assert!(edges.contains(&0));

        let tris = hash.query_edge_for_triangles(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            0.0,
        );
        assert_eq!(tris, vec![0]);

        let points = hash.query_triangle_for_points(v[0], v[1], v[2], 0.1);
        assert_eq!(points, vec![0, 1, 2, 3]);

        let edges = hash.query_triangle_for_edges(v[0], v[1], v[2], 0.1);
        assert_eq!(edges, vec![0, 1, 2]);
    }

    #[test]
    fn bbox_check_discards_far_cell_mates() {
        // Two short edges in the same cell but with disjoint boxes, plus the
        // coarse cell size forcing them together.
        let v = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.1, 0.0, 0.0),
            Point3::new(0.9, 0.9, 0.0),
            Point3::new(1.0, 0.9, 0.0),
        ];
        let e = vec![[0, 1], [2, 3]];
        let hash = SpatialHash::build(&v, &e, &[], 2.0);
        // Plain cell query sees the pair...
        assert_eq!(hash.query_edge_for_edges(v[0], v[1], 0.0, 0), vec![1]);
        // ...but the box filter rejects it.
        assert!(hash
            .query_edge_for_edges_with_bbox_check(&v, &e, v[0], v[1], 0.0, 0)
            .is_empty());
    }

    #[test]
    fn parallel_insert_matches_serial() {
        let (v, e, f) = triangle_and_point();
        let serial = SpatialHash::build(&v, &e, &f, 0.6);
        let parallel = SpatialHash::build_with_config(
            &v,
            &e,
            &f,
            &SpatialHashConfig::default()
                .with_voxel_size(0.6)
                .with_parallel_insert(true),
        );
        assert_eq!(serial.voxel.len(), parallel.voxel.len());
        for (cell, ids) in &serial.voxel {
            let mut a = ids.clone();
            let mut b = parallel.voxel.get(cell).cloned().unwrap_or_default();
            a.sort_unstable();
            b.sort_unstable();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn empty_mesh_builds() {
        let hash = SpatialHash::build(&[], &[], &[], 0.0);
        assert_eq!(hash.edge_start(), 0);
        assert!(hash
            .query_point_for_triangles(Point3::origin(), 1.0)
            .is_empty());
    }
}
