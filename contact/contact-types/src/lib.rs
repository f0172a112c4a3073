//! Core types for broad-phase contact detection.
//!
//! This crate provides the foundational types shared by the contact
//! detection pipeline:
//!
//! - [`Aabb`] - Axis-aligned bounding box with contributing vertex ids
//! - [`Candidates`] - Proximity candidate pairs produced by a broad phase
//! - [`CandidateKinds`] - Which candidate categories a query should produce
//! - [`validate_topology`] - Precondition checks for mesh incidence data
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **zero engine dependencies**. It can be used
//! in:
//! - CLI tools
//! - Web applications (WASM)
//! - Servers
//! - Simulation frameworks
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//!
//! # Mesh Representation
//!
//! Meshes are passed as slices: vertex positions as `&[Point3<f64>]`, edges
//! as `&[[u32; 2]]`, and triangular faces as `&[[u32; 3]]`. A moving mesh is
//! two position slices of equal length, one per time sample, with motion
//! linear in between.
//!
//! # Example
//!
//! ```
//! use contact_types::{Aabb, Point3};
//!
//! let a = Aabb::from_point(Point3::new(0.0, 0.0, 0.0), 0.5);
//! let b = Aabb::from_point(Point3::new(0.4, 0.0, 0.0), 0.0);
//! assert!(a.intersects(&b));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod aabb;
mod candidates;
mod error;

// Re-export core types
pub use aabb::Aabb;
pub use candidates::{CandidateKinds, Candidates};
pub use error::{validate_topology, TopologyError};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
