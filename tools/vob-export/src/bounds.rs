//! Bounding volume engine
//!
//! Produces the object-level culling sphere. [`bounding_sphere`] computes
//! an approximate minimal enclosing sphere for a point set in two linear
//! passes; it is not globally minimal, but it is deterministic, fast, and
//! noticeably tighter than the sphere of the bounding box. [`grow_sphere`]
//! merges spheres so triangle geometry, line geometry and light positions
//! fold into one sphere.

use crate::error::CompileError;
use glam::Vec3;

/// Margin added to a merged sphere's radius to absorb floating-point
/// rounding. Sized for coordinates up to roughly 800 km from the origin.
const MERGE_MARGIN: f64 = 0.1;

/// Center + radius. Negative radius denotes the empty sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub const EMPTY: Sphere = Sphere {
        center: Vec3::ZERO,
        radius: -1.0,
    };

    /// A zero-radius sphere at a point (how light positions are merged)
    pub fn point(p: Vec3) -> Sphere {
        Sphere {
            center: p,
            radius: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.radius < 0.0
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        self.center.distance_squared(p) <= self.radius * self.radius
    }

    /// True when `other` lies entirely inside `self`
    pub fn contains_sphere(&self, other: &Sphere) -> bool {
        let dr = self.radius - other.radius;
        dr >= 0.0 && dr * dr >= self.center.distance_squared(other.center)
    }
}

/// Axis-aligned extents plus the enclosing sphere of one point set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointBounds {
    pub min: Vec3,
    pub max: Vec3,
    pub sphere: Sphere,
}

/// Compute the bounds of a strided point set.
///
/// `data` is flat f32 storage; each point starts at a multiple of
/// `stride` lanes with x, y, z first, so normals and texture coordinates
/// in the same record are skipped. Returns `None` for an empty set.
///
/// The sphere is seeded at the AABB midpoint with radius equal to half
/// the largest extent, then a second pass grows it minimally for every
/// point still outside: the center slides toward the outlier and the
/// radius takes half the overflow.
pub fn bounding_sphere(data: &[f32], stride: usize) -> Option<PointBounds> {
    assert!(stride >= 3);
    if data.len() < stride {
        return None;
    }
    let count = data.len() / stride;

    let mut min = Vec3::new(data[0], data[1], data[2]);
    let mut max = min;
    for n in 0..count {
        let p = Vec3::new(data[n * stride], data[n * stride + 1], data[n * stride + 2]);
        min = min.min(p);
        max = max.max(p);
    }

    let extent = max - min;
    let mut sphere = Sphere {
        center: (min + max) * 0.5,
        radius: extent.x.max(extent.y).max(extent.z) * 0.5,
    };

    for n in 0..count {
        let p = Vec3::new(data[n * stride], data[n * stride + 1], data[n * stride + 2]);
        let dv = p - sphere.center;
        let dist2 = dv.length_squared();
        if dist2 > sphere.radius * sphere.radius {
            let dist = dist2.sqrt();
            sphere.radius = (sphere.radius + dist) * 0.5;
            sphere.center += dv * ((dist - sphere.radius) / dist);
        }
    }

    Some(PointBounds { min, max, sphere })
}

/// Grow `cur` by the minimal amount that fully contains `add`.
///
/// Empty `add` is a no-op; empty `cur` becomes `add`; when one sphere
/// nests inside the other the larger wins. Otherwise the result
/// circumscribes the two shell points on the inter-center axis, with
/// [`MERGE_MARGIN`] added to hedge rounding. Both inputs are re-verified
/// against the result; if the margin ever proves too small that is a
/// fatal error, not a quietly leaking sphere.
pub fn grow_sphere(cur: Sphere, add: Sphere) -> Result<Sphere, CompileError> {
    if add.is_empty() {
        return Ok(cur);
    }
    if cur.is_empty() {
        return Ok(add);
    }

    let dr = cur.radius - add.radius;
    if dr * dr >= cur.center.distance_squared(add.center) {
        return Ok(if cur.radius >= add.radius { cur } else { add });
    }

    // Shell points along the center-to-center axis, in f64 to keep the
    // midpoint stable for far-from-origin objects.
    let c0 = cur.center.as_dvec3();
    let c1 = add.center.as_dvec3();
    let axis = (c1 - c0).normalize();

    let p1 = c1 + axis * add.radius as f64;
    let p2 = c0 - axis * cur.radius as f64;

    let merged = Sphere {
        center: ((p1 + p2) * 0.5).as_vec3(),
        radius: (p1.distance(p2) * 0.5 + MERGE_MARGIN) as f32,
    };

    if merged.contains_sphere(&cur) && merged.contains_sphere(&add) {
        Ok(merged)
    } else {
        Err(CompileError::SphereMergeFailed)
    }
}
