//! Proximity candidate pairs produced by a broad phase.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Candidate pairs whose bounding volumes overlap.
///
/// A broad phase produces a conservative superset of the actually colliding
/// primitive pairs; the narrow phase refines these candidates. The three
/// lists hold:
///
/// - `edge_vertex`: `(edge_id, vertex_id)` pairs
/// - `edge_edge`: `(edge_a_id, edge_b_id)` pairs with `edge_a_id < edge_b_id`
/// - `face_vertex`: `(face_id, vertex_id)` pairs
///
/// The order of pairs across the lists is unspecified and may vary between
/// runs when produced by a parallel query; consumers must treat each list as
/// a set-valued sequence. Duplicate pairs may appear across workers (the
/// narrow phase is idempotent) but never twice for the same query primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidates {
    /// Edge-vertex candidate pairs.
    pub edge_vertex: Vec<(u32, u32)>,
    /// Edge-edge candidate pairs, lower edge id first.
    pub edge_edge: Vec<(u32, u32)>,
    /// Face-vertex candidate pairs.
    pub face_vertex: Vec<(u32, u32)>,
}

impl Candidates {
    /// Create an empty candidate set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            edge_vertex: Vec::new(),
            edge_edge: Vec::new(),
            face_vertex: Vec::new(),
        }
    }

    /// Total number of candidate pairs across all three categories.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.edge_vertex.len() + self.edge_edge.len() + self.face_vertex.len()
    }

    /// Check if no candidates were found.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edge_vertex.is_empty() && self.edge_edge.is_empty() && self.face_vertex.is_empty()
    }

    /// Remove all candidates, keeping allocations.
    pub fn clear(&mut self) {
        self.edge_vertex.clear();
        self.edge_edge.clear();
        self.face_vertex.clear();
    }

    /// Reserve capacity for additional pairs in each category.
    pub fn reserve(&mut self, edge_vertex: usize, edge_edge: usize, face_vertex: usize) {
        self.edge_vertex.reserve(edge_vertex);
        self.edge_edge.reserve(edge_edge);
        self.face_vertex.reserve(face_vertex);
    }

    /// Move all pairs from `other` into `self`.
    ///
    /// This is the merge step gathering per-worker buffers into one output.
    pub fn append(&mut self, mut other: Self) {
        self.edge_vertex.append(&mut other.edge_vertex);
        self.edge_edge.append(&mut other.edge_edge);
        self.face_vertex.append(&mut other.face_vertex);
    }

    /// Sort each list; useful for comparing outputs of two runs.
    pub fn sort(&mut self) {
        self.edge_vertex.sort_unstable();
        self.edge_edge.sort_unstable();
        self.face_vertex.sort_unstable();
    }
}

/// Which candidate categories a mesh query should produce.
///
/// Defaults to all three. Categories can be toggled with the builder
/// methods:
///
/// ```
/// use contact_types::CandidateKinds;
///
/// let kinds = CandidateKinds::none().with_edge_edge(true);
/// assert!(kinds.edge_edge);
/// assert!(!kinds.face_vertex);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CandidateKinds {
    /// Produce edge-vertex candidates.
    pub edge_vertex: bool,
    /// Produce edge-edge candidates.
    pub edge_edge: bool,
    /// Produce face-vertex candidates.
    pub face_vertex: bool,
}

impl Default for CandidateKinds {
    fn default() -> Self {
        Self::all()
    }
}

impl CandidateKinds {
    /// All three categories enabled.
    #[inline]
    #[must_use]
    pub const fn all() -> Self {
        Self {
            edge_vertex: true,
            edge_edge: true,
            face_vertex: true,
        }
    }

    /// No categories enabled.
    #[inline]
    #[must_use]
    pub const fn none() -> Self {
        Self {
            edge_vertex: false,
            edge_edge: false,
            face_vertex: false,
        }
    }

    /// Check if any category is enabled.
    #[inline]
    #[must_use]
    pub const fn any(self) -> bool {
        self.edge_vertex || self.edge_edge || self.face_vertex
    }

    /// Enable or disable edge-vertex candidates.
    #[must_use]
    pub const fn with_edge_vertex(mut self, enabled: bool) -> Self {
        self.edge_vertex = enabled;
        self
    }

    /// Enable or disable edge-edge candidates.
    #[must_use]
    pub const fn with_edge_edge(mut self, enabled: bool) -> Self {
        self.edge_edge = enabled;
        self
    }

    /// Enable or disable face-vertex candidates.
    #[must_use]
    pub const fn with_face_vertex(mut self, enabled: bool) -> Self {
        self.face_vertex = enabled;
        self
    }
}
