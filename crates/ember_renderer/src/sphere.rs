//! Sphere primitive for ray tracing.

use crate::{hit::Intersection, Ray};
use ember_math::{Aabb, Vec3};

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere. Negative radii are clamped to zero.
    pub fn new(center: Vec3, radius: f32) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);

        Self {
            center,
            radius,
            bbox: Aabb::from_points(center - rvec, center + rvec),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Outward normal at a point on the surface.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        (point - self.center).normalize_or_zero()
    }

    /// Geometric ray-sphere intersection.
    ///
    /// Projects the center onto the ray (`tca`), compares the squared
    /// closest-approach distance with the squared radius and returns the
    /// nearest non-negative root. Rays starting inside hit the far side.
    pub fn ray_intersect(&self, ray: &Ray) -> Option<Intersection> {
        let l = self.center - ray.origin();
        let tca = l.dot(ray.direction());
        let d2 = l.dot(l) - tca * tca;
        let radius2 = self.radius * self.radius;

        if d2 > radius2 {
            return None;
        }

        let thc = (radius2 - d2).sqrt();
        let t0 = tca - thc;
        let t1 = tca + thc;

        let t = if t0 >= 0.0 {
            t0
        } else if t1 >= 0.0 {
            t1
        } else {
            // Sphere entirely behind the ray
            return None;
        };

        Some(Intersection {
            t,
            normal: self.normal_at(ray.at(t)),
        })
    }

    pub fn center_point(&self) -> Vec3 {
        self.center
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
