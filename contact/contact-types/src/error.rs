//! Mesh topology precondition checks.

use thiserror::Error;

/// Errors describing malformed mesh incidence data.
///
/// These are programmer errors: the broad phase itself is a total function
/// over well-formed inputs and asserts these preconditions in debug builds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    /// The two time samples of a moving mesh disagree on vertex count.
    #[error("vertex count mismatch between time samples: {t0} at t=0, {t1} at t=1")]
    VertexCountMismatch {
        /// Vertex count at t=0.
        t0: usize,
        /// Vertex count at t=1.
        t1: usize,
    },

    /// An edge references a vertex outside the vertex array.
    #[error("edge {edge} references vertex {vertex}, but only {vertex_count} vertices exist")]
    EdgeOutOfRange {
        /// Offending edge index.
        edge: usize,
        /// Referenced vertex id.
        vertex: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A face references a vertex outside the vertex array.
    #[error("face {face} references vertex {vertex}, but only {vertex_count} vertices exist")]
    FaceOutOfRange {
        /// Offending face index.
        face: usize,
        /// Referenced vertex id.
        vertex: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },
}

/// Validate mesh incidence data against a vertex count.
///
/// `vertex_count_t1` is the vertex count of the second time sample for a
/// moving mesh, or `None` for a static mesh.
///
/// # Errors
///
/// Returns the first violation found: mismatched time-sample vertex counts,
/// or an edge/face index outside `[0, vertex_count)`.
pub fn validate_topology(
    vertex_count: usize,
    vertex_count_t1: Option<usize>,
    edges: &[[u32; 2]],
    faces: &[[u32; 3]],
) -> Result<(), TopologyError> {
    if let Some(t1) = vertex_count_t1 {
        if t1 != vertex_count {
            return Err(TopologyError::VertexCountMismatch {
                t0: vertex_count,
                t1,
            });
        }
    }
    for (ei, edge) in edges.iter().enumerate() {
        for &v in edge {
            if v as usize >= vertex_count {
                return Err(TopologyError::EdgeOutOfRange {
                    edge: ei,
                    vertex: v,
                    vertex_count,
                });
            }
        }
    }
    for (fi, face) in faces.iter().enumerate() {
        for &v in face {
            if v as usize >= vertex_count {
                return Err(TopologyError::FaceOutOfRange {
                    face: fi,
                    vertex: v,
                    vertex_count,
                });
            }
        }
    }
    Ok(())
}
