//! Ember math - geometry kernel shared by every Ember crate.
//!
//! Vector algebra comes straight from `glam` (`Vec3` is the workhorse for
//! points, directions and RGB colors alike). On top of it this crate adds
//! the few ray tracing types that carry invariants: unit-direction rays,
//! look-at cameras, intervals and axis-aligned bounding boxes.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod camera;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use camera::Camera;
pub use interval::Interval;
pub use ray::Ray;
