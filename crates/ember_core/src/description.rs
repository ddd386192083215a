//! The JSON scene file format.
//!
//! A scene file lists the ambient term, the camera, a map of named
//! materials, the objects (triangles, spheres or OBJ model references, each
//! tagged with a material name) and the point lights:
//!
//! ```json
//! {
//!   "ambientLighting": [0.05, 0.05, 0.05],
//!   "camera": { "origin": [0, 0, 0], "lookAt": [0, 0, -1] },
//!   "materials": { "red": { "diffuse": [0.8, 0.1, 0.1] } },
//!   "objects": [
//!     { "type": "sphere", "center": [0, 0, -2], "radius": 0.5, "material": "red" },
//!     { "type": "model", "path": "bunny.obj", "material": "red" }
//!   ],
//!   "lights": [ { "position": [2, 4, 0], "intensity": 2.0, "radius": 0.2 } ]
//! }
//! ```
//!
//! Material names are not resolved here; the renderer validates them when
//! it builds its scene.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ember_math::{Camera, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{LoadError, LoadResult};
use crate::light::PointLight;
use crate::material::Material;
use crate::mesh::{Mesh, TriangleData};
use crate::obj::load_obj;

/// Camera placement as written in a scene file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraDescription {
    pub origin: Vec3,
    pub look_at: Vec3,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
        }
    }
}

impl From<CameraDescription> for Camera {
    fn from(desc: CameraDescription) -> Self {
        Camera::new(desc.origin, desc.look_at)
    }
}

/// One entry of the scene's object list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ObjectDescription {
    Triangle {
        points: [Vec3; 3],
        #[serde(default, skip_serializing_if = "Option::is_none")]
        normals: Option<[Vec3; 3]>,
        material: String,
    },
    Sphere {
        center: Vec3,
        radius: f32,
        material: String,
    },
    /// An external OBJ mesh; every triangle gets `material`.
    Model {
        path: PathBuf,
        material: String,
        /// Generate smooth normals when the file has none
        #[serde(default)]
        smooth: bool,
    },
}

impl ObjectDescription {
    /// Name of the material this object refers to.
    pub fn material(&self) -> &str {
        match self {
            ObjectDescription::Triangle { material, .. }
            | ObjectDescription::Sphere { material, .. }
            | ObjectDescription::Model { material, .. } => material,
        }
    }

    fn validate(&self, index: usize) -> LoadResult<()> {
        let invalid = |reason: String| Err(LoadError::InvalidObject { index, reason });
        match self {
            ObjectDescription::Triangle { points, normals, .. } => {
                if points.iter().any(|p| !p.is_finite()) {
                    return invalid("triangle points must be finite".to_string());
                }
                if let Some(normals) = normals {
                    if normals.iter().any(|n| !n.is_finite() || n.length_squared() == 0.0) {
                        return invalid("triangle normals must be finite and non-zero".to_string());
                    }
                }
                let area = (points[1] - points[0]).cross(points[2] - points[0]).length();
                if area == 0.0 {
                    return invalid("triangle is degenerate (zero area)".to_string());
                }
            }
            ObjectDescription::Sphere { center, radius, .. } => {
                if !center.is_finite() || !radius.is_finite() || *radius <= 0.0 {
                    return invalid(format!("sphere radius {} must be positive", radius));
                }
            }
            ObjectDescription::Model { path, .. } => {
                if path.as_os_str().is_empty() {
                    return invalid("model path is empty".to_string());
                }
            }
        }
        Ok(())
    }
}

/// A parsed scene file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneDescription {
    pub ambient_lighting: Vec3,
    pub camera: CameraDescription,
    pub materials: BTreeMap<String, Material>,
    pub objects: Vec<ObjectDescription>,
    pub lights: Vec<PointLight>,
    /// Directory model paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl SceneDescription {
    /// Load a scene file. Relative model paths resolve against its directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> LoadResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut desc = Self::from_json_str(&text)?;
        desc.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();

        log::info!(
            "Loaded scene {}: {} materials, {} objects, {} lights",
            path.display(),
            desc.materials.len(),
            desc.objects.len(),
            desc.lights.len()
        );
        Ok(desc)
    }

    /// Parse and validate a scene from a JSON string.
    pub fn from_json_str(text: &str) -> LoadResult<Self> {
        let mut desc: SceneDescription = serde_json::from_str(text)?;
        for (name, material) in desc.materials.iter_mut() {
            material.name = name.clone();
        }
        desc.validate()?;
        Ok(desc)
    }

    /// Check every record for values the renderer cannot use.
    ///
    /// Material references are left to the renderer, which owns the
    /// registry.
    pub fn validate(&self) -> LoadResult<()> {
        for (name, material) in &self.materials {
            material.validate().map_err(|reason| LoadError::InvalidMaterial {
                name: name.clone(),
                reason,
            })?;
        }
        for (index, object) in self.objects.iter().enumerate() {
            object.validate(index)?;
        }
        for (index, light) in self.lights.iter().enumerate() {
            light
                .validate()
                .map_err(|reason| LoadError::InvalidLight { index, reason })?;
        }
        Ok(())
    }

    /// Resolve a model path against the scene directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Load the mesh behind a `Model` entry and expand it into triangles.
    pub fn load_model(&self, path: &Path, smooth: bool) -> LoadResult<Vec<TriangleData>> {
        let mut mesh: Mesh = load_obj(self.resolve_path(path))?;
        if smooth && !mesh.has_normals() {
            mesh.compute_normals();
        }
        Ok(mesh.triangles())
    }

    pub fn camera(&self) -> Camera {
        self.camera.into()
    }
}
