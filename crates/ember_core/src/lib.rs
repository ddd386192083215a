//! Ember Core - renderer-agnostic scene description for the Ember ray tracer.
//!
//! This crate provides:
//!
//! - **Surface and light records**: `Material`, `PointLight`
//! - **Render settings**: `RenderSettings`, loaded from a JSON config file
//! - **Scene files**: `SceneDescription`, the JSON scene format
//! - **Mesh import**: `Mesh` and OBJ loading through `tobj`
//!
//! Nothing here knows about rays or acceleration structures; the renderer
//! turns a `SceneDescription` into its own runtime scene.
//!
//! # Example
//!
//! ```ignore
//! use ember_core::{RenderSettings, SceneDescription};
//!
//! let settings = RenderSettings::from_file("config.json")?;
//! let scene = SceneDescription::from_file("scene.json")?;
//! println!("{} objects, {} lights", scene.objects.len(), scene.lights.len());
//! ```

pub mod description;
pub mod error;
pub mod light;
pub mod material;
pub mod mesh;
pub mod obj;
pub mod settings;

// Re-export commonly used types
pub use description::{CameraDescription, ObjectDescription, SceneDescription};
pub use error::{LoadError, LoadResult, SettingsError};
pub use light::PointLight;
pub use material::Material;
pub use mesh::{Mesh, TriangleData};
pub use obj::load_obj;
pub use settings::RenderSettings;
