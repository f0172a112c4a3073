//! Configuration for spatial hash construction.

/// Configuration for [`SpatialHash`](crate::SpatialHash) construction.
///
/// # Example
///
/// ```
/// use contact_broadphase::SpatialHashConfig;
///
/// let config = SpatialHashConfig::default()
///     .with_voxel_size(0.25)
///     .with_parallel_insert(true);
/// assert_eq!(config.voxel_size, 0.25);
/// ```
#[derive(Debug, Clone)]
pub struct SpatialHashConfig {
    /// Edge length of a grid cell.
    ///
    /// Any value `<= 0.0` auto-sizes the grid from the mesh: twice the
    /// average edge length for a static build, or twice the larger of the
    /// average edge length and the average vertex displacement for a moving
    /// build.
    pub voxel_size: f64,

    /// Fill the cell map with a parallel sort over (cell, id) pairs followed
    /// by a grouped insert, instead of a serial append per primitive.
    ///
    /// Worth enabling for large meshes; the resulting queries are identical
    /// either way.
    pub parallel_insert: bool,
}

impl Default for SpatialHashConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.0,
            parallel_insert: false,
        }
    }
}

impl SpatialHashConfig {
    /// Set the voxel size; `<= 0.0` auto-sizes from the mesh.
    #[must_use]
    pub const fn with_voxel_size(mut self, voxel_size: f64) -> Self {
        self.voxel_size = voxel_size;
        self
    }

    /// Enable or disable the parallel cell-map construction.
    #[must_use]
    pub const fn with_parallel_insert(mut self, parallel_insert: bool) -> Self {
        self.parallel_insert = parallel_insert;
        self
    }
}
