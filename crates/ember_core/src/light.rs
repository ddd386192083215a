//! Point lights with a soft-shadow radius.

use ember_math::Vec3;
use serde::{Deserialize, Serialize};

/// A point light.
///
/// `radius` only affects shadows: shadow rays aim at random points on a
/// disk of this radius facing the shaded point. Direct lighting always
/// uses the light's center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointLight {
    pub position: Vec3,
    #[serde(default = "white")]
    pub color: Vec3,
    #[serde(default = "unit")]
    pub intensity: f32,
    #[serde(default)]
    pub radius: f32,
}

fn white() -> Vec3 {
    Vec3::ONE
}

fn unit() -> f32 {
    1.0
}

impl PointLight {
    pub fn new(position: Vec3, color: Vec3, intensity: f32, radius: f32) -> Self {
        Self {
            position,
            color,
            intensity,
            radius,
        }
    }

    /// Checks the invariants the shader relies on.
    pub fn validate(&self) -> Result<(), String> {
        if !self.position.is_finite() || !self.color.is_finite() {
            return Err("position and color must be finite".to_string());
        }
        if !self.intensity.is_finite() {
            return Err(format!("intensity {} must be finite", self.intensity));
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(format!("radius {} must be finite and non-negative", self.radius));
        }
        Ok(())
    }
}
