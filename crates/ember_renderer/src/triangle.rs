//! Triangle primitive for ray tracing.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use crate::{hit::Intersection, Ray};
use ember_math::{Aabb, Vec3};

/// Determinant magnitude below which a ray counts as parallel to the plane.
const EPSILON: f32 = 1e-7;

/// A triangle primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    vertices: [Vec3; 3],
    /// Per-vertex normals for smooth shading
    normals: Option<[Vec3; 3]>,
    /// Pre-computed face normal (unit length)
    face_normal: Vec3,
    bbox: Aabb,
}

impl Triangle {
    /// Create a flat-shaded triangle from three vertices.
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        let face_normal = (v1 - v0).cross(v2 - v0).try_normalize().unwrap_or(Vec3::Z);

        Self {
            vertices: [v0, v1, v2],
            normals: None,
            face_normal,
            bbox: Aabb::enclosing(&[v0, v1, v2]),
        }
    }

    /// Create a smooth-shaded triangle with one normal per vertex.
    pub fn with_normals(vertices: [Vec3; 3], normals: [Vec3; 3]) -> Self {
        let [v0, v1, v2] = vertices;
        Self {
            normals: Some(normals.map(|n| n.normalize_or_zero())),
            ..Self::new(v0, v1, v2)
        }
    }

    pub fn vertices(&self) -> &[Vec3; 3] {
        &self.vertices
    }

    /// Surface normal at `point`, which is assumed to lie on the triangle.
    ///
    /// With vertex normals the result blends them by the areas of the three
    /// sub-triangles `point` cuts the triangle into.
    pub fn normal_at(&self, point: Vec3) -> Vec3 {
        let Some(normals) = &self.normals else {
            return self.face_normal;
        };

        let [v0, v1, v2] = self.vertices;
        let total = (v1 - v0).cross(v2 - v0).length();
        if total <= 0.0 {
            return self.face_normal;
        }

        let w0 = (v1 - point).cross(v2 - point).length() / total;
        let w1 = (v2 - point).cross(v0 - point).length() / total;
        let w2 = (v0 - point).cross(v1 - point).length() / total;

        self.blend(normals, w0, w1, w2)
    }

    fn blend(&self, normals: &[Vec3; 3], w0: f32, w1: f32, w2: f32) -> Vec3 {
        (normals[0] * w0 + normals[1] * w1 + normals[2] * w2)
            .try_normalize()
            .unwrap_or(self.face_normal)
    }

    /// Möller-Trumbore ray-triangle intersection, both faces.
    pub fn ray_intersect(&self, ray: &Ray) -> Option<Intersection> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let p = ray.direction().cross(edge2);
        let det = edge1.dot(p);

        // Ray is parallel to triangle
        if det.abs() < EPSILON {
            return None;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin() - v0;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(edge1);
        let v = ray.direction().dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = edge2.dot(q) * inv_det;
        if t <= 0.0 {
            return None;
        }

        // u and v are the area fractions of the sub-triangles opposite v1 and v2
        let normal = match &self.normals {
            Some(normals) => self.blend(normals, 1.0 - u - v, u, v),
            None => self.face_normal,
        };

        Some(Intersection { t, normal })
    }

    /// Centroid of the three vertices.
    pub fn center_point(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = reference_triangle();
        let ray = Ray::towards(Vec3::new(-0.5, -0.5, 1.0), Vec3::new(-0.5, -0.5, -1.0));

        let hit = tri.ray_intersect(&ray).expect("ray should hit the triangle");
        assert!((hit.t - 1.0).abs() < 1e-6);
        assert!((hit.normal - Vec3::Z).length() < 1e-6);
        assert!((ray.at(hit.t) - Vec3::new(-0.5, -0.5, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_triangle_miss_outside() {
        let tri = reference_triangle();
        let ray = Ray::towards(Vec3::new(-0.5, -0.5, 1.0), Vec3::new(2.0, 2.0, -1.0));

        assert!(tri.ray_intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_miss_parallel() {
        let tri = reference_triangle();
        let ray = Ray::new(Vec3::new(-2.0, -0.5, 0.0), Vec3::X);

        assert!(tri.ray_intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_miss_behind() {
        let tri = reference_triangle();
        let ray = Ray::new(Vec3::new(-0.5, -0.5, 1.0), Vec3::Z);

        assert!(tri.ray_intersect(&ray).is_none());
    }

    #[test]
    fn test_triangle_hit_from_back_side() {
        let tri = reference_triangle();
        let ray = Ray::new(Vec3::new(-0.5, -0.5, -3.0), Vec3::Z);

        let hit = tri.ray_intersect(&ray).unwrap();
        assert!((hit.t - 3.0).abs() < 1e-6);
        // Normal stays the outward face normal
        assert!((hit.normal - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_triangle_center_and_bounds() {
        let tri = reference_triangle();

        let center = tri.center_point();
        assert!((center - Vec3::new(-1.0 / 3.0, -1.0 / 3.0, 0.0)).length() < 1e-6);

        let bbox = tri.bounding_box();
        assert_eq!(bbox.x.min, -1.0);
        assert_eq!(bbox.y.max, 1.0);
        assert!(bbox.z.size() > 0.0);
        assert!(bbox.contains(center));
    }

    #[test]
    fn test_smooth_normals_interpolate() {
        let tri = Triangle::with_normals(
            [
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(-1.0, 1.0, 0.0),
            ],
            [Vec3::Z, Vec3::X, Vec3::Y],
        );

        // At a vertex the blend is that vertex's normal
        assert!((tri.normal_at(Vec3::new(1.0, -1.0, 0.0)) - Vec3::X).length() < 1e-5);

        // At the centroid all three weigh equally
        let expected = (Vec3::X + Vec3::Y + Vec3::Z).normalize();
        assert!((tri.normal_at(tri.center_point()) - expected).length() < 1e-5);

        // The intersection path agrees with normal_at
        let ray = Ray::towards(Vec3::new(-0.5, -0.5, 1.0), Vec3::new(-0.5, -0.5, -1.0));
        let hit = tri.ray_intersect(&ray).unwrap();
        let at_point = tri.normal_at(ray.at(hit.t));
        assert!((hit.normal - at_point).length() < 1e-5);
    }

    #[test]
    fn test_flat_normal_at_ignores_point() {
        let tri = reference_triangle();
        assert_eq!(tri.normal_at(Vec3::new(0.3, 7.0, 1.0)), Vec3::Z);
    }
}
