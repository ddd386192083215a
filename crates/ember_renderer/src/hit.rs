//! Ray query results.
//!
//! A miss is `None`; a [`Hit`] only exists when the ray struck something,
//! so there is no way to read surface data from a miss.

use crate::{MaterialId, Ray};
use ember_math::Vec3;

/// Where a ray meets a single primitive, before the material is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Distance along the (unit) ray direction
    pub t: f32,
    /// Outward unit surface normal at the hit point
    pub normal: Vec3,
}

/// Record of a ray-object intersection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Distance along the ray
    pub t: f32,
    /// Point of intersection
    pub position: Vec3,
    /// Outward unit normal (flat, interpolated or radial)
    pub normal: Vec3,
    /// Whether the ray arrived from the side the normal points to
    pub front_face: bool,
    /// Material of the object that was hit
    pub material: MaterialId,
    /// The ray that produced this hit, kept for reflections
    pub ray: Ray,
}

impl Hit {
    pub fn new(ray: Ray, intersection: Intersection, material: MaterialId) -> Self {
        let Intersection { t, normal } = intersection;
        Self {
            t,
            position: ray.at(t),
            normal,
            // If the ray and normal point in the same direction, we're inside
            front_face: ray.direction().dot(normal) < 0.0,
            material,
            ray,
        }
    }

    /// The normal flipped to face the incoming ray.
    pub fn shading_normal(&self) -> Vec3 {
        if self.front_face {
            self.normal
        } else {
            -self.normal
        }
    }

    /// Keep the nearer of two optional hits.
    pub fn closest(a: Option<Hit>, b: Option<Hit>) -> Option<Hit> {
        match (a, b) {
            (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
            (a, None) => a,
            (None, b) => b,
        }
    }
}
