//! The closed set of renderable primitives.

use crate::{Hit, MaterialId, Ray, Sphere, Triangle};
use ember_math::{Aabb, Vec3};

/// Geometry of a scene object.
///
/// The primitive set is fixed, so an enum replaces dynamic dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Triangle(Triangle),
    Sphere(Sphere),
}

impl Shape {
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        match self {
            Shape::Triangle(tri) => tri.normal_at(point),
            Shape::Sphere(sphere) => sphere.normal_at(point),
        }
    }

    pub fn center_point(&self) -> Vec3 {
        match self {
            Shape::Triangle(tri) => tri.center_point(),
            Shape::Sphere(sphere) => sphere.center_point(),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Triangle(tri) => tri.bounding_box(),
            Shape::Sphere(sphere) => sphere.bounding_box(),
        }
    }
}

impl From<Triangle> for Shape {
    fn from(tri: Triangle) -> Self {
        Shape::Triangle(tri)
    }
}

impl From<Sphere> for Shape {
    fn from(sphere: Sphere) -> Self {
        Shape::Sphere(sphere)
    }
}

/// A shape paired with its resolved material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    shape: Shape,
    material: MaterialId,
}

impl SceneObject {
    pub fn new(shape: impl Into<Shape>, material: MaterialId) -> Self {
        Self {
            shape: shape.into(),
            material,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn material(&self) -> MaterialId {
        self.material
    }

    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        self.shape.normal_at(point)
    }

    /// Intersect the ray with this object, tagging the hit with its material.
    #[inline]
    pub fn ray_intersect(&self, ray: &Ray) -> Option<Hit> {
        let intersection = match &self.shape {
            Shape::Triangle(tri) => tri.ray_intersect(ray),
            Shape::Sphere(sphere) => sphere.ray_intersect(ray),
        }?;
        Some(Hit::new(*ray, intersection, self.material))
    }

    pub fn center_point(&self) -> Vec3 {
        self.shape.center_point()
    }

    pub fn bounding_box(&self) -> Aabb {
        self.shape.bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_dispatch() {
        let material = MaterialId::default();
        let sphere = SceneObject::new(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5), material);
        let tri = SceneObject::new(
            Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y),
            material,
        );

        assert_eq!(sphere.center_point(), Vec3::new(0.0, 0.0, -2.0));
        assert!(matches!(sphere.shape(), Shape::Sphere(_)));
        assert!(matches!(tri.shape(), Shape::Triangle(_)));
        assert_eq!(tri.normal_at(Vec3::ZERO), Vec3::Z);
        assert!(tri.bounding_box().contains(tri.center_point()));
    }

    #[test]
    fn test_object_hit_carries_material_and_ray() {
        let object = SceneObject::new(Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5), MaterialId::default());
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let hit = object.ray_intersect(&ray).unwrap();
        assert_eq!(hit.material, object.material());
        assert_eq!(hit.ray, ray);
        assert!((hit.t - 1.5).abs() < 1e-6);
        assert!((hit.position - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-6);
        assert!(hit.front_face);
    }
}
