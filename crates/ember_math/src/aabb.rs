use crate::{Interval, Ray, Vec3};

/// Minimum thickness of a box along any axis.
///
/// Axis-aligned triangles would otherwise produce zero-width slabs.
const MIN_EXTENT: f32 = 0.0001;

/// Axis-aligned bounding box, one [`Interval`] per axis.
///
/// Used by the BVH both to classify objects at build time and to cull
/// subtrees during traversal.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Box that contains nothing; the identity for [`Aabb::surrounding`].
    pub const EMPTY: Aabb = Aabb {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points (in any order).
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        let min = a.min(b);
        let max = a.max(b);
        Self::new(
            Interval::new(min.x, max.x),
            Interval::new(min.y, max.y),
            Interval::new(min.z, max.z),
        )
    }

    /// Create the tightest AABB around a set of points.
    pub fn enclosing(points: &[Vec3]) -> Self {
        if points.is_empty() {
            return Self::EMPTY;
        }
        let (min, max) = points.iter().fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        );
        Self::from_points(min, max)
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            x: Interval::surrounding(&box0.x, &box1.x),
            y: Interval::surrounding(&box0.y, &box1.y),
            z: Interval::surrounding(&box0.z, &box1.z),
        }
    }

    /// Get the interval for a specific axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, n: usize) -> Interval {
        match n {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }

    pub fn min(&self) -> Vec3 {
        Vec3::new(self.x.min, self.y.min, self.z.min)
    }

    pub fn max(&self) -> Vec3 {
        Vec3::new(self.x.max, self.y.max, self.z.max)
    }

    /// Grow every axis by `delta` on both sides.
    pub fn padded(&self, delta: f32) -> Aabb {
        Aabb {
            x: self.x.expand(2.0 * delta),
            y: self.y.expand(2.0 * delta),
            z: self.z.expand(2.0 * delta),
        }
    }

    /// Returns true if the box contains no points.
    pub fn is_empty(&self) -> bool {
        self.x.min > self.x.max || self.y.min > self.y.max || self.z.min > self.z.max
    }

    /// Inclusive point containment test.
    pub fn contains(&self, point: Vec3) -> bool {
        self.x.contains(point.x) && self.y.contains(point.y) && self.z.contains(point.z)
    }

    /// Index (0..8) of the octant around `split` that `point` falls in.
    ///
    /// Bit 0 is set when `point.x >= split.x`, bit 1 for y and bit 2 for z,
    /// so every point maps to exactly one octant.
    pub fn octant_index(point: Vec3, split: Vec3) -> usize {
        (point.x >= split.x) as usize
            | ((point.y >= split.y) as usize) << 1
            | ((point.z >= split.z) as usize) << 2
    }

    /// The sub-box of octant `index` when this box is cut by the three
    /// axis-aligned planes through `split`.
    pub fn octant(&self, split: Vec3, index: usize) -> Aabb {
        let pick = |interval: Interval, at: f32, upper: bool| {
            let (lo, hi) = interval.split(at);
            if upper {
                hi
            } else {
                lo
            }
        };
        Aabb {
            x: pick(self.x, split.x, index & 1 != 0),
            y: pick(self.y, split.y, index & 2 != 0),
            z: pick(self.z, split.z, index & 4 != 0),
        }
    }

    /// Slab-method ray intersection.
    ///
    /// Returns the parameter at which the ray enters the box, clipped to
    /// `ray_t`, or `None` if the ray misses the box inside that window.
    pub fn intersect(&self, ray: &Ray, mut ray_t: Interval) -> Option<f32> {
        let origin = ray.origin();
        let direction = ray.direction();

        for axis in 0..3 {
            let slab = self.axis_interval(axis);
            let adinv = 1.0 / direction[axis];
            let mut t0 = (slab.min - origin[axis]) * adinv;
            let mut t1 = (slab.max - origin[axis]) * adinv;
            if adinv < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max < ray_t.min {
                return None;
            }
        }

        Some(ray_t.min)
    }

    /// Test if a ray intersects this AABB within the given interval.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> bool {
        self.intersect(ray, ray_t).is_some()
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        if self.x.size() < MIN_EXTENT {
            self.x = self.x.expand(MIN_EXTENT);
        }
        if self.y.size() < MIN_EXTENT {
            self.y = self.y.expand(MIN_EXTENT);
        }
        if self.z.size() < MIN_EXTENT {
            self.z = self.z.expand(MIN_EXTENT);
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_aabb_from_points_orders_corners() {
        let aabb = Aabb::from_points(Vec3::new(10.0, 0.0, 3.0), Vec3::new(0.0, 10.0, -3.0));

        assert_eq!(aabb.min(), Vec3::new(0.0, 0.0, -3.0));
        assert_eq!(aabb.max(), Vec3::new(10.0, 10.0, 3.0));
    }

    #[test]
    fn test_aabb_pads_flat_boxes() {
        let flat = Aabb::from_points(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(1.0, 1.0, 0.0));
        assert!(flat.z.size() > 0.0);
        assert!(flat.contains(Vec3::ZERO));
    }

    #[test]
    fn test_aabb_surrounding_empty_is_identity() {
        let b = unit_box();
        assert_eq!(Aabb::surrounding(&Aabb::EMPTY, &b), b);
        assert!(Aabb::EMPTY.is_empty());
        assert!(!b.is_empty());
    }

    #[test]
    fn test_aabb_enclosing() {
        let points = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-1.0, 5.0, 0.0),
            Vec3::new(0.0, 0.0, 4.0),
        ];
        let aabb = Aabb::enclosing(&points);
        assert_eq!(aabb.min(), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(aabb.max(), Vec3::new(1.0, 5.0, 4.0));
        assert!(Aabb::enclosing(&[]).is_empty());
    }

    #[test]
    fn test_aabb_padded() {
        let padded = unit_box().padded(0.5);
        assert_eq!(padded.min(), Vec3::splat(-1.5));
        assert_eq!(padded.max(), Vec3::splat(1.5));
    }

    #[test]
    fn test_aabb_contains() {
        let aabb = unit_box();
        assert!(aabb.contains(Vec3::ZERO));
        assert!(aabb.contains(Vec3::splat(1.0)));
        assert!(!aabb.contains(Vec3::new(1.5, 0.0, 0.0)));
    }

    #[test]
    fn test_aabb_ray_hit() {
        let aabb = unit_box();

        // Ray pointing at center
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        let t = aabb.intersect(&ray, Interval::FORWARD);
        assert!((t.unwrap() - 4.0).abs() < 1e-5);

        // Ray pointing away
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), -Vec3::Z);
        assert!(!aabb.hit(&ray, Interval::FORWARD));

        // Ray missing the box
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::Z);
        assert!(!aabb.hit(&ray, Interval::FORWARD));

        // Box beyond the query window
        let ray = Ray::new(Vec3::new(0.0, 0.0, -5.0), Vec3::Z);
        assert!(!aabb.hit(&ray, Interval::new(0.0, 3.0)));
    }

    #[test]
    fn test_aabb_ray_from_inside() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(unit_box().intersect(&ray, Interval::FORWARD), Some(0.0));
    }

    #[test]
    fn test_octant_index_covers_every_point_once() {
        let split = Vec3::new(0.5, -1.0, 2.0);
        assert_eq!(Aabb::octant_index(Vec3::new(0.0, -2.0, 1.0), split), 0);
        assert_eq!(Aabb::octant_index(Vec3::new(1.0, -2.0, 1.0), split), 1);
        assert_eq!(Aabb::octant_index(Vec3::new(0.0, 0.0, 1.0), split), 2);
        assert_eq!(Aabb::octant_index(Vec3::new(0.0, -2.0, 3.0), split), 4);
        // Points on a split plane go to the upper side
        assert_eq!(Aabb::octant_index(split, split), 7);
    }

    #[test]
    fn test_octant_boxes_contain_their_points() {
        let aabb = Aabb::from_points(Vec3::splat(-4.0), Vec3::splat(4.0));
        let split = Vec3::new(1.0, -2.0, 0.5);
        let points = [
            Vec3::new(-3.0, -3.0, -3.0),
            Vec3::new(3.0, 3.0, 3.0),
            Vec3::new(1.0, -2.0, 0.5),
            Vec3::new(-1.0, 2.0, 3.5),
        ];
        for p in points {
            let index = Aabb::octant_index(p, split);
            assert!(aabb.octant(split, index).contains(p), "{p:?} not in octant {index}");
        }
    }
}
