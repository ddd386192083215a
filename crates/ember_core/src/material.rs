//! Blinn-Phong surface description.

use ember_math::Vec3;
use serde::{Deserialize, Serialize};

/// A named Blinn-Phong material.
///
/// Coefficients are RGB so a material can tint each lighting term
/// independently. `transparency` and `refraction` are carried through from
/// scene files but the shader does not use them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Material {
    /// Registry key; filled from the material map key when loading.
    #[serde(skip)]
    pub name: String,

    /// Ambient reflectance, added to the scene ambient term
    pub ambient: Vec3,

    /// Diffuse reflectance
    pub diffuse: Vec3,

    /// Specular reflectance
    pub specular: Vec3,

    /// Blinn-Phong exponent
    pub specular_exponent: f32,

    /// Mirror reflection weight in [0, 1]
    pub reflection: f32,

    pub transparency: f32,
    pub refraction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: String::new(),
            ambient: Vec3::ZERO,
            diffuse: Vec3::splat(0.5), // Grey default
            specular: Vec3::ZERO,
            specular_exponent: 1.0,
            reflection: 0.0,
            transparency: 0.0,
            refraction: 1.0,
        }
    }
}

impl Material {
    /// Create a new material with just a name and diffuse color.
    pub fn new(name: impl Into<String>, diffuse: Vec3) -> Self {
        Self {
            name: name.into(),
            diffuse,
            ..Default::default()
        }
    }

    pub fn with_ambient(mut self, ambient: Vec3) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_specular(mut self, specular: Vec3, exponent: f32) -> Self {
        self.specular = specular;
        self.specular_exponent = exponent;
        self
    }

    pub fn with_reflection(mut self, reflection: f32) -> Self {
        self.reflection = reflection;
        self
    }

    /// Check if this material spawns mirror rays.
    pub fn is_reflective(&self) -> bool {
        self.reflection > 0.0
    }

    /// Checks the invariants the shader relies on.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.reflection) {
            return Err(format!("reflection {} outside [0, 1]", self.reflection));
        }
        if !self.specular_exponent.is_finite() || self.specular_exponent < 0.0 {
            return Err(format!(
                "specular exponent {} must be finite and non-negative",
                self.specular_exponent
            ));
        }
        let colors = [self.ambient, self.diffuse, self.specular];
        if colors.iter().any(|c| !c.is_finite()) {
            return Err("color coefficients must be finite".to_string());
        }
        Ok(())
    }
}
