//! Voxel-hash broad-phase contact detection for triangle meshes.
//!
//! Given a mesh of vertices, edges, and triangular faces, possibly moving
//! linearly between two time samples, this crate enumerates *candidate*
//! proximity pairs: (edge, vertex), (edge, edge), and (face, vertex) pairs
//! whose bounding volumes overlap, optionally inflated by a radius. The
//! candidate set is a conservative superset of the actual collisions; the
//! narrow phase refines it.
//!
//! # Algorithm
//!
//! Space is partitioned into a uniform voxel grid sized from the mesh (about
//! twice the average edge length, or the average displacement when moving).
//! Every primitive is binned into each cell its bounding box touches, with
//! vertices, edges, and faces sharing one id space split by two offsets.
//! Queries convert a world-space interval into a cell range and collect the
//! ids stored there; the mesh-level query walks primitives in parallel,
//! filters incident pairs, and confirms each survivor with a world-space
//! bounding-box test.
//!
//! # Example
//!
//! ```
//! use contact_broadphase::SpatialHash;
//! use contact_types::{CandidateKinds, Point3};
//!
//! // Two segments crossing at the origin.
//! let vertices = vec![
//!     Point3::new(-1.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, -1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let edges = vec![[0, 1], [2, 3]];
//!
//! let hash = SpatialHash::build(&vertices, &edges, &[], 0.0);
//! let candidates = hash.query_mesh_for_candidates(
//!     &vertices,
//!     &edges,
//!     &[],
//!     0.0,
//!     CandidateKinds::none().with_edge_edge(true),
//! );
//! assert_eq!(candidates.edge_edge, vec![(0, 1)]);
//! ```
//!
//! # Lifecycle
//!
//! A [`SpatialHash`] is built per timestep (or per line-search iteration)
//! and dropped before the next; nothing persists across frames.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod boxes;
mod brute_force;
mod config;
mod enumerate;
mod predicates;
mod sizing;
mod spatial_hash;

// Re-export the public surface
pub use boxes::{
    build_edge_boxes, build_face_boxes, build_moving_vertex_boxes, build_vertex_boxes,
};
pub use brute_force::{brute_force_candidates, brute_force_moving_candidates};
pub use config::SpatialHashConfig;
pub use predicates::{
    edge_edge_aabb_ccd, edge_edge_aabb_cd, point_edge_aabb_ccd, point_edge_aabb_cd,
    point_triangle_aabb_ccd, point_triangle_aabb_cd,
};
pub use sizing::{
    average_displacement_length, average_edge_length, suggest_voxel_size,
    suggest_voxel_size_moving,
};
pub use spatial_hash::SpatialHash;
