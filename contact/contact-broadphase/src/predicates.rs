//! World-space AABB proximity predicates.
//!
//! Each predicate builds the axis-aligned hulls of two primitives and tests
//! whether the hulls come within `inflation_radius` of each other, using
//! closed-interval comparisons so touching hulls pass. The `_ccd` variants
//! take both time samples of every endpoint and test the swept hulls.
//!
//! These are the final conservative filters applied to a candidate pair
//! before it is admitted; they never reject a genuinely colliding pair.

use contact_types::Point3;

/// Componentwise minimum over a set of points.
fn hull_min(points: &[Point3<f64>]) -> Point3<f64> {
    let mut lo = points[0];
    for p in &points[1..] {
        lo.x = lo.x.min(p.x);
        lo.y = lo.y.min(p.y);
        lo.z = lo.z.min(p.z);
    }
    lo
}

/// Componentwise maximum over a set of points.
fn hull_max(points: &[Point3<f64>]) -> Point3<f64> {
    let mut hi = points[0];
    for p in &points[1..] {
        hi.x = hi.x.max(p.x);
        hi.y = hi.y.max(p.y);
        hi.z = hi.z.max(p.z);
    }
    hi
}

/// Closed overlap test between `[min_a, max_a]` inflated by `radius` and
/// `[min_b, max_b]`.
fn hulls_overlap(
    min_a: Point3<f64>,
    max_a: Point3<f64>,
    min_b: Point3<f64>,
    max_b: Point3<f64>,
    radius: f64,
) -> bool {
    min_a.x - radius <= max_b.x
        && min_b.x <= max_a.x + radius
        && min_a.y - radius <= max_b.y
        && min_b.y <= max_a.y + radius
        && min_a.z - radius <= max_b.z
        && min_b.z <= max_a.z + radius
}

/// Do the AABBs of a static point and a static edge overlap under `radius`?
#[must_use]
pub fn point_edge_aabb_cd(
    p: Point3<f64>,
    e0: Point3<f64>,
    e1: Point3<f64>,
    inflation_radius: f64,
) -> bool {
    hulls_overlap(
        p,
        p,
        hull_min(&[e0, e1]),
        hull_max(&[e0, e1]),
        inflation_radius,
    )
}

/// Do the AABBs of two static edges overlap under `radius`?
#[must_use]
pub fn edge_edge_aabb_cd(
    ea0: Point3<f64>,
    ea1: Point3<f64>,
    eb0: Point3<f64>,
    eb1: Point3<f64>,
    inflation_radius: f64,
) -> bool {
    hulls_overlap(
        hull_min(&[ea0, ea1]),
        hull_max(&[ea0, ea1]),
        hull_min(&[eb0, eb1]),
        hull_max(&[eb0, eb1]),
        inflation_radius,
    )
}

/// Do the AABBs of a static point and a static triangle overlap under
/// `radius`?
#[must_use]
pub fn point_triangle_aabb_cd(
    p: Point3<f64>,
    t0: Point3<f64>,
    t1: Point3<f64>,
    t2: Point3<f64>,
    inflation_radius: f64,
) -> bool {
    hulls_overlap(
        p,
        p,
        hull_min(&[t0, t1, t2]),
        hull_max(&[t0, t1, t2]),
        inflation_radius,
    )
}

/// Do the swept AABBs of a moving point and a moving edge overlap under
/// `radius`?
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn point_edge_aabb_ccd(
    p_t0: Point3<f64>,
    e0_t0: Point3<f64>,
    e1_t0: Point3<f64>,
    p_t1: Point3<f64>,
    e0_t1: Point3<f64>,
    e1_t1: Point3<f64>,
    inflation_radius: f64,
) -> bool {
    hulls_overlap(
        hull_min(&[p_t0, p_t1]),
        hull_max(&[p_t0, p_t1]),
        hull_min(&[e0_t0, e1_t0, e0_t1, e1_t1]),
        hull_max(&[e0_t0, e1_t0, e0_t1, e1_t1]),
        inflation_radius,
    )
}

/// Do the swept AABBs of two moving edges overlap under `radius`?
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn edge_edge_aabb_ccd(
    ea0_t0: Point3<f64>,
    ea1_t0: Point3<f64>,
    eb0_t0: Point3<f64>,
    eb1_t0: Point3<f64>,
    ea0_t1: Point3<f64>,
    ea1_t1: Point3<f64>,
    eb0_t1: Point3<f64>,
    eb1_t1: Point3<f64>,
    inflation_radius: f64,
) -> bool {
    hulls_overlap(
        hull_min(&[ea0_t0, ea1_t0, ea0_t1, ea1_t1]),
        hull_max(&[ea0_t0, ea1_t0, ea0_t1, ea1_t1]),
        hull_min(&[eb0_t0, eb1_t0, eb0_t1, eb1_t1]),
        hull_max(&[eb0_t0, eb1_t0, eb0_t1, eb1_t1]),
        inflation_radius,
    )
}

/// Do the swept AABBs of a moving point and a moving triangle overlap under
/// `radius`?
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn point_triangle_aabb_ccd(
    p_t0: Point3<f64>,
    t0_t0: Point3<f64>,
    t1_t0: Point3<f64>,
    t2_t0: Point3<f64>,
    p_t1: Point3<f64>,
    t0_t1: Point3<f64>,
    t1_t1: Point3<f64>,
    t2_t1: Point3<f64>,
    inflation_radius: f64,
) -> bool {
    hulls_overlap(
        hull_min(&[p_t0, p_t1]),
        hull_max(&[p_t0, p_t1]),
        hull_min(&[t0_t0, t1_t0, t2_t0, t0_t1, t1_t1, t2_t1]),
        hull_max(&[t0_t0, t1_t0, t2_t0, t0_t1, t1_t1, t2_t1]),
        inflation_radius,
    )
}
