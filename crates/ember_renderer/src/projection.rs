//! Mapping from normalized screen coordinates to camera rays.

use crate::{Camera, Ray};
use ember_math::Vec3;

/// A view plane at distance 1 in front of the camera.
///
/// Screen coordinates are normalized to `[0, 1)`, with `(0, 0)` at the
/// top-left corner of the image and `y` growing downwards.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    origin: Vec3,
    direction: Vec3,
    // Half-extent vectors of the view plane
    horizontal: Vec3,
    vertical: Vec3,
}

impl Projection {
    /// Build the view plane for an image of `width` x `height` pixels.
    ///
    /// `fov_deg` is the vertical field of view; the horizontal extent
    /// follows the image aspect ratio.
    pub fn new(camera: &Camera, fov_deg: f32, width: u32, height: u32) -> Self {
        let half_height = (fov_deg.to_radians() / 2.0).tan();
        let aspect = if height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
        let half_width = half_height * aspect;

        Self {
            origin: camera.origin(),
            direction: camera.direction(),
            horizontal: camera.right() * half_width,
            vertical: camera.up() * half_height,
        }
    }

    /// Primary ray through the normalized screen point `(x, y)`.
    pub fn ray_through(&self, x: f32, y: f32) -> Ray {
        let point = self.origin
            + self.direction
            + self.horizontal * (2.0 * x - 1.0)
            - self.vertical * (2.0 * y - 1.0);
        Ray::towards(self.origin, point)
    }

    /// Pixel index for a normalized coordinate along an axis of `size` pixels.
    ///
    /// Coordinates outside `[0, 1)` are clamped to the edge pixels.
    pub fn pixel_index(coord: f32, size: u32) -> u32 {
        let index = (coord * size as f32).floor();
        if index <= 0.0 {
            0
        } else {
            (index as u32).min(size.saturating_sub(1))
        }
    }
}
