use crate::Vec3;

/// A pinhole camera: an origin and a unit look direction.
///
/// The direction is derived once from an explicit look-at target. The view
/// basis uses `+Y` as world up; cameras looking straight up or down fall
/// back to `+Z` so the basis never degenerates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    origin: Vec3,
    direction: Vec3,
}

impl Camera {
    /// Create a camera at `origin` looking at `look_at`.
    ///
    /// If the two points coincide the camera looks down `-Z`.
    pub fn new(origin: Vec3, look_at: Vec3) -> Self {
        let direction = (look_at - origin).try_normalize().unwrap_or(Vec3::NEG_Z);
        Self { origin, direction }
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Unit look direction.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Unit vector pointing to the right of the image (`direction × up`).
    pub fn right(&self) -> Vec3 {
        let right = self.direction.cross(Vec3::Y);
        if right.length_squared() > 1e-12 {
            right.normalize()
        } else {
            self.direction.cross(Vec3::Z).normalize()
        }
    }

    /// Unit vector pointing to the top of the image (`right × direction`).
    pub fn up(&self) -> Vec3 {
        self.right().cross(self.direction).normalize()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::NEG_Z)
    }
}
