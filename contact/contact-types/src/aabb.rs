//! Axis-aligned bounding box with contributing vertex ids.

use nalgebra::{Point3, Vector3};
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum number of vertex ids a box records (a triangular face has three
/// corners; four covers a swept face union with one extra contributor).
const VERTEX_ID_CAPACITY: usize = 4;

/// An axis-aligned bounding box (AABB) over a contact primitive.
///
/// The box is the rectangular interval `[min, max]` together with the ids of
/// the mesh vertices that contributed to it. Downstream filters use the ids
/// to skip self-pairs and incident pairs without touching the mesh incidence
/// arrays.
///
/// Planar geometry is represented with a zero-extent axis; every operation
/// below is well-defined for degenerate (zero-width) intervals.
///
/// # Example
///
/// ```
/// use contact_types::{Aabb, Point3};
///
/// let e0 = Aabb::from_vertex(0, Point3::new(0.0, 0.0, 0.0), 0.0);
/// let e1 = Aabb::from_vertex(1, Point3::new(1.0, 0.0, 0.0), 0.0);
/// let edge = Aabb::merged(&e0, &e1);
///
/// assert_eq!(edge.vertex_ids.as_slice(), &[0, 1]);
/// assert!(edge.intersects(&Aabb::from_point(Point3::new(0.5, 0.0, 0.0), 0.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner (smallest x, y, z values).
    pub min: Point3<f64>,
    /// Maximum corner (largest x, y, z values).
    pub max: Point3<f64>,
    /// Sorted ids of the mesh vertices that contributed to this box.
    pub vertex_ids: SmallVec<[u32; 4]>,
}

impl Aabb {
    /// Create an AABB from minimum and maximum corners with no vertex ids.
    ///
    /// The corners are swapped per axis if `min > max`.
    #[must_use]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min: Point3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Point3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
            vertex_ids: SmallVec::new(),
        }
    }

    /// Construct an AABB for a static point.
    ///
    /// The box encloses a sphere of `inflation_radius` around the point,
    /// widened per [`Aabb::conservative_inflation`].
    #[must_use]
    pub fn from_point(p: Point3<f64>, inflation_radius: f64) -> Self {
        let (min, max) = Self::conservative_inflation(p, p, inflation_radius);
        Self {
            min,
            max,
            vertex_ids: SmallVec::new(),
        }
    }

    /// Construct an AABB for a point moving linearly from `p_t0` to `p_t1`.
    ///
    /// The box encloses a capsule of `inflation_radius` around the motion
    /// segment, widened per [`Aabb::conservative_inflation`].
    #[must_use]
    pub fn from_moving_point(
        p_t0: Point3<f64>,
        p_t1: Point3<f64>,
        inflation_radius: f64,
    ) -> Self {
        let lo = Point3::new(
            p_t0.x.min(p_t1.x),
            p_t0.y.min(p_t1.y),
            p_t0.z.min(p_t1.z),
        );
        let hi = Point3::new(
            p_t0.x.max(p_t1.x),
            p_t0.y.max(p_t1.y),
            p_t0.z.max(p_t1.z),
        );
        let (min, max) = Self::conservative_inflation(lo, hi, inflation_radius);
        Self {
            min,
            max,
            vertex_ids: SmallVec::new(),
        }
    }

    /// Construct the box of a mesh vertex, recording its id.
    #[must_use]
    pub fn from_vertex(id: u32, p: Point3<f64>, inflation_radius: f64) -> Self {
        let mut aabb = Self::from_point(p, inflation_radius);
        aabb.vertex_ids.push(id);
        aabb
    }

    /// Construct the box of a moving mesh vertex, recording its id.
    #[must_use]
    pub fn from_moving_vertex(
        id: u32,
        p_t0: Point3<f64>,
        p_t1: Point3<f64>,
        inflation_radius: f64,
    ) -> Self {
        let mut aabb = Self::from_moving_point(p_t0, p_t1, inflation_radius);
        aabb.vertex_ids.push(id);
        aabb
    }

    /// The smallest box enclosing both inputs.
    ///
    /// The result's `vertex_ids` is the sorted, deduplicated union of the
    /// inputs' ids, truncated to the id capacity.
    #[must_use]
    pub fn merged(a: &Self, b: &Self) -> Self {
        Self {
            min: Point3::new(
                a.min.x.min(b.min.x),
                a.min.y.min(b.min.y),
                a.min.z.min(b.min.z),
            ),
            max: Point3::new(
                a.max.x.max(b.max.x),
                a.max.y.max(b.max.y),
                a.max.z.max(b.max.z),
            ),
            vertex_ids: merge_vertex_ids(&[&a.vertex_ids, &b.vertex_ids]),
        }
    }

    /// The smallest box enclosing all three inputs.
    #[must_use]
    pub fn merged3(a: &Self, b: &Self, c: &Self) -> Self {
        Self {
            min: Point3::new(
                a.min.x.min(b.min.x).min(c.min.x),
                a.min.y.min(b.min.y).min(c.min.y),
                a.min.z.min(b.min.z).min(c.min.z),
            ),
            max: Point3::new(
                a.max.x.max(b.max.x).max(c.max.x),
                a.max.y.max(b.max.y).max(c.max.y),
                a.max.z.max(b.max.z).max(c.max.z),
            ),
            vertex_ids: merge_vertex_ids(&[&a.vertex_ids, &b.vertex_ids, &c.vertex_ids]),
        }
    }

    /// Check if this AABB intersects another.
    ///
    /// Touching boxes are considered intersecting (closed-interval
    /// comparison), so the test is conservative.
    #[inline]
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    /// Widen an interval by at least `inflation_radius` per axis.
    ///
    /// The widening adds the radius plus a relative epsilon of the interval
    /// magnitude, so that under round-to-nearest double arithmetic the
    /// returned interval contains every point within Euclidean distance
    /// `inflation_radius` of the original interval.
    #[must_use]
    pub fn conservative_inflation(
        min: Point3<f64>,
        max: Point3<f64>,
        inflation_radius: f64,
    ) -> (Point3<f64>, Point3<f64>) {
        let delta = |lo: f64, hi: f64| -> f64 {
            let magnitude = lo.abs().max(hi.abs()).max(inflation_radius);
            inflation_radius + 2.0 * f64::EPSILON * magnitude
        };
        let dx = delta(min.x, max.x);
        let dy = delta(min.y, max.y);
        let dz = delta(min.z, max.z);
        (
            Point3::new(min.x - dx, min.y - dy, min.z - dz),
            Point3::new(max.x + dx, max.y + dy, max.z + dz),
        )
    }

    /// Get the center of the box.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Get the size (extent per axis) of the box.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Check if the box shares a vertex id with another box.
    #[must_use]
    pub fn shares_vertex(&self, other: &Self) -> bool {
        self.vertex_ids
            .iter()
            .any(|id| other.vertex_ids.contains(id))
    }
}

/// Sorted, deduplicated union of id lists, truncated to capacity.
fn merge_vertex_ids(lists: &[&SmallVec<[u32; 4]>]) -> SmallVec<[u32; 4]> {
    let mut ids: SmallVec<[u32; 4]> = SmallVec::new();
    for list in lists {
        ids.extend_from_slice(list);
    }
    ids.sort_unstable();
    ids.dedup();
    ids.truncate(VERTEX_ID_CAPACITY);
    ids
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn new_corrects_swapped_corners() {
        let aabb = Aabb::new(Point3::new(1.0, 0.0, 2.0), Point3::new(0.0, 1.0, -2.0));
        assert_eq!(aabb.min, Point3::new(0.0, 0.0, -2.0));
        assert_eq!(aabb.max, Point3::new(1.0, 1.0, 2.0));
    }

    #[test]
    fn from_point_encloses_radius() {
        let p = Point3::new(1.0, -2.0, 3.0);
        let aabb = Aabb::from_point(p, 0.5);
        // Every point at Euclidean distance 0.5 must be inside.
        for offset in [
            Vector3::new(0.5, 0.0, 0.0),
            Vector3::new(-0.5, 0.0, 0.0),
            Vector3::new(0.0, 0.5, 0.0),
            Vector3::new(0.0, 0.0, -0.5),
        ] {
            let q = p + offset;
            assert!(q.x >= aabb.min.x && q.x <= aabb.max.x);
            assert!(q.y >= aabb.min.y && q.y <= aabb.max.y);
            assert!(q.z >= aabb.min.z && q.z <= aabb.max.z);
        }
    }

    #[test]
    fn from_moving_point_covers_both_samples() {
        let aabb = Aabb::from_moving_point(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, -1.0, 2.0),
            0.0,
        );
        assert!(aabb.min.x <= 0.0 && aabb.max.x >= 1.0);
        assert!(aabb.min.y <= -1.0 && aabb.max.y >= 0.0);
        assert!(aabb.min.z <= 0.0 && aabb.max.z >= 2.0);
    }

    #[test]
    fn merged_contains_both_inputs() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(-2.0, 0.5, 0.5), Point3::new(0.5, 3.0, 0.5));
        let u = Aabb::merged(&a, &b);
        assert_eq!(u.min, Point3::new(-2.0, 0.0, 0.0));
        assert_eq!(u.max, Point3::new(1.0, 3.0, 1.0));
    }

    #[test]
    fn merged_unions_vertex_ids_sorted() {
        let a = Aabb::from_vertex(7, Point3::origin(), 0.0);
        let b = Aabb::from_vertex(2, Point3::origin(), 0.0);
        let ab = Aabb::merged(&a, &b);
        assert_eq!(ab.vertex_ids.as_slice(), &[2, 7]);

        let c = Aabb::from_vertex(7, Point3::origin(), 0.0);
        let abc = Aabb::merged3(&a, &b, &c);
        assert_eq!(abc.vertex_ids.as_slice(), &[2, 7]);
    }

    #[test]
    fn merged_truncates_to_capacity() {
        let mut a = Aabb::from_vertex(0, Point3::origin(), 0.0);
        a.vertex_ids.extend_from_slice(&[1, 2]);
        let mut b = Aabb::from_vertex(3, Point3::origin(), 0.0);
        b.vertex_ids.extend_from_slice(&[4, 5]);
        let ab = Aabb::merged(&a, &b);
        assert_eq!(ab.vertex_ids.len(), 4);
        assert_eq!(ab.vertex_ids.as_slice(), &[0, 1, 2, 3]);
    }

    #[test]
    fn intersects_is_symmetric_and_reflexive() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(0.5, 0.5, 0.5), Point3::new(2.0, 2.0, 2.0));
        let c = Aabb::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0));

        assert!(a.intersects(&a));
        assert_eq!(a.intersects(&b), b.intersects(&a));
        assert_eq!(a.intersects(&c), c.intersects(&a));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn touching_boxes_intersect() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(1.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
    }

    #[test]
    fn conservative_inflation_strictly_widens() {
        let min = Point3::new(-1.0, 0.0, 1e6);
        let max = Point3::new(1.0, 0.0, 1e6);
        let r = 0.25;
        let (lo, hi) = Aabb::conservative_inflation(min, max, r);
        assert!(lo.x < min.x - r + 1e-9 && lo.x <= min.x - r);
        assert!(hi.x >= max.x + r);
        // Zero-extent axis still widens by the radius.
        assert!(lo.y <= -r && hi.y >= r);
        // Large-magnitude axis picks up a relative epsilon.
        assert!(lo.z < 1e6 - r && hi.z > 1e6 + r);
    }

    #[test]
    fn shares_vertex_detects_common_ids() {
        let a = Aabb::from_vertex(1, Point3::origin(), 0.0);
        let b = Aabb::from_vertex(2, Point3::origin(), 0.0);
        let ab = Aabb::merged(&a, &b);
        assert!(ab.shares_vertex(&a));
        let c = Aabb::from_vertex(3, Point3::origin(), 0.0);
        assert!(!ab.shares_vertex(&c));
    }

    #[test]
    fn center_and_size() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.center(), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.size(), Vector3::new(2.0, 4.0, 6.0));
    }
}
