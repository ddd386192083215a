//! Ember Renderer - progressive CPU ray tracing.
//!
//! A Whitted-style ray tracer with Blinn-Phong shading, Monte Carlo soft
//! shadows from area-sampled point lights and recursive mirror reflection.
//! Worker threads shoot rays through random screen points and fold each
//! result into a running-average [`PixelBuffer`], so the image converges
//! over successive frames.
//!
//! Nearest-hit queries go through an octree [`Bvh`] built once per scene.

mod bvh;
mod error;
mod frame;
mod hit;
mod object;
mod pixel_buffer;
mod projection;
mod scene;
mod sphere;
mod tracer;
mod triangle;

pub use bvh::{Bvh, BvhNode, BvhStats};
pub use error::{RenderError, SceneError};
pub use frame::{FrameScheduler, FrameStats};
pub use hit::{Hit, Intersection};
pub use object::{SceneObject, Shape};
pub use pixel_buffer::{color_to_rgba, linear_to_gamma, PixelBuffer};
pub use projection::Projection;
pub use scene::{MaterialId, Scene};
pub use sphere::Sphere;
pub use tracer::{offset_origin, RayTracer, TracerConfig, MAX_RECURSE_CAP, SURFACE_BIAS};
pub use triangle::Triangle;

/// Re-export Vec3 and common math types from ember_math
pub use ember_math::{Aabb, Camera, Interval, Ray, Vec3};

use rand::RngCore;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Uniform random float in `[0, 1)` from 24 random mantissa bits.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    (rng.next_u32() >> 8) as f32 * (1.0 / (1u32 << 24) as f32)
}
