//! Runtime scene: object arena, lights, material registry and BVH.
//!
//! A scene is mutable while it is being assembled. Building the
//! acceleration structure freezes it; from then on it is only read, and a
//! shared `&Scene` is handed to every render worker.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use ember_core::{Material, ObjectDescription, PointLight, SceneDescription};
use ember_math::{Camera, Vec3};

use crate::{Bvh, Hit, Ray, SceneError, SceneObject, Shape, Sphere, Triangle};

/// Index of a registered material.
///
/// Only handed out by [`Scene::register_material`], so a lookup through a
/// scene's own ids cannot fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(u32);

impl MaterialId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Everything a render reads: geometry, lights, materials and camera.
#[derive(Debug)]
pub struct Scene {
    camera: Camera,
    ambient: Vec3,
    objects: Vec<SceneObject>,
    lights: Vec<PointLight>,
    materials: Vec<Material>,
    material_ids: HashMap<String, MaterialId>,
    bvh: Option<Bvh>,
    warned_linear: AtomicBool,
}

impl Scene {
    pub fn new(camera: Camera, ambient: Vec3) -> Self {
        Self {
            camera,
            ambient,
            objects: Vec::new(),
            lights: Vec::new(),
            materials: Vec::new(),
            material_ids: HashMap::new(),
            bvh: None,
            warned_linear: AtomicBool::new(false),
        }
    }

    /// Build a scene from a parsed scene file, loading any referenced
    /// models. Every material reference is checked here.
    pub fn from_description(desc: &SceneDescription) -> Result<Self, SceneError> {
        let mut scene = Scene::new(desc.camera(), desc.ambient_lighting);

        for material in desc.materials.values() {
            scene.register_material(material.clone())?;
        }

        for object in &desc.objects {
            match object {
                ObjectDescription::Triangle {
                    points,
                    normals,
                    material,
                } => {
                    let [v0, v1, v2] = *points;
                    let tri = match normals {
                        Some(normals) => Triangle::with_normals(*points, *normals),
                        None => Triangle::new(v0, v1, v2),
                    };
                    scene.add_object(tri, material)?;
                }
                ObjectDescription::Sphere {
                    center,
                    radius,
                    material,
                } => {
                    scene.add_object(Sphere::new(*center, *radius), material)?;
                }
                ObjectDescription::Model {
                    path,
                    material,
                    smooth,
                } => {
                    // Check the material before paying for the load
                    scene.lookup(material)?;
                    let triangles = desc.load_model(path, *smooth)?;
                    log::info!(
                        "Adding {} triangles from {}",
                        triangles.len(),
                        path.display()
                    );
                    for data in triangles {
                        let tri = match data.normals {
                            Some(normals) => Triangle::with_normals(data.points, normals),
                            None => {
                                let [v0, v1, v2] = data.points;
                                Triangle::new(v0, v1, v2)
                            }
                        };
                        scene.add_object(tri, material)?;
                    }
                }
            }
        }

        for light in &desc.lights {
            scene.add_light(*light);
        }

        log::info!(
            "Scene ready: {} objects, {} lights, {} materials",
            scene.objects.len(),
            scene.lights.len(),
            scene.materials.len()
        );

        Ok(scene)
    }

    /// Add a material under its name.
    pub fn register_material(&mut self, material: Material) -> Result<MaterialId, SceneError> {
        if self.bvh.is_some() {
            return Err(SceneError::AlreadyBuilt);
        }
        if self.material_ids.contains_key(&material.name) {
            return Err(SceneError::DuplicateMaterial(material.name));
        }

        let id = MaterialId(self.materials.len() as u32);
        log::debug!("Registered material '{}' as {:?}", material.name, id);
        self.material_ids.insert(material.name.clone(), id);
        self.materials.push(material);
        Ok(id)
    }

    pub fn material_id(&self, name: &str) -> Option<MaterialId> {
        self.material_ids.get(name).copied()
    }

    fn lookup(&self, name: &str) -> Result<MaterialId, SceneError> {
        self.material_id(name)
            .ok_or_else(|| SceneError::UnknownMaterial {
                material: name.to_string(),
            })
    }

    /// Material behind an id issued by this scene.
    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.index()]
    }

    /// Append an object, resolving its material by name.
    ///
    /// Returns the object's index in the arena.
    pub fn add_object(
        &mut self,
        shape: impl Into<Shape>,
        material_name: &str,
    ) -> Result<usize, SceneError> {
        if self.bvh.is_some() {
            return Err(SceneError::AlreadyBuilt);
        }

        let material = self.lookup(material_name)?;
        let shape = shape.into();
        if !shape.bounding_box().min().is_finite() || !shape.bounding_box().max().is_finite() {
            return Err(SceneError::InvalidGeometry {
                what: "object",
                reason: "bounds are not finite".to_string(),
            });
        }

        self.objects.push(SceneObject::new(shape, material));
        Ok(self.objects.len() - 1)
    }

    pub fn add_light(&mut self, light: PointLight) {
        self.lights.push(light);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn is_built(&self) -> bool {
        self.bvh.is_some()
    }

    /// Build the BVH over all objects. Allowed exactly once.
    pub fn create_accelerated_structure(&mut self, leaf_threshold: usize) -> Result<&Bvh, SceneError> {
        if self.bvh.is_some() {
            return Err(SceneError::AlreadyBuilt);
        }

        let bvh = Bvh::new(&self.objects, leaf_threshold);
        Ok(self.bvh.insert(bvh))
    }

    /// Nearest hit along `ray`, or `None` on a miss.
    pub fn intersect(&self, ray: &Ray) -> Option<Hit> {
        match &self.bvh {
            Some(bvh) => bvh.intersect(&self.objects, ray),
            None => {
                if !self.warned_linear.swap(true, Ordering::Relaxed) {
                    log::warn!(
                        "Acceleration structure not built; testing all {} objects per ray",
                        self.objects.len()
                    );
                }
                self.intersect_linear(ray)
            }
        }
    }

    /// Nearest hit by testing every object.
    pub fn intersect_linear(&self, ray: &Ray) -> Option<Hit> {
        let mut closest = f32::INFINITY;
        let mut nearest = None;
        for object in &self.objects {
            if let Some(hit) = object.ray_intersect(ray) {
                if hit.t < closest {
                    closest = hit.t;
                    nearest = Some(hit);
                }
            }
        }
        nearest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red() -> Material {
        Material::new("red", Vec3::new(0.8, 0.1, 0.1))
    }

    #[test]
    fn test_register_and_lookup_material() {
        let mut scene = Scene::new(Camera::default(), Vec3::ZERO);
        let id = scene.register_material(red()).unwrap();

        assert_eq!(scene.material_id("red"), Some(id));
        assert_eq!(scene.material(id).name, "red");
        assert!(scene.material_id("blue").is_none());
    }

    #[test]
    fn test_duplicate_material_rejected() {
        let mut scene = Scene::new(Camera::default(), Vec3::ZERO);
        scene.register_material(red()).unwrap();

        let err = scene.register_material(red()).unwrap_err();
        assert!(matches!(err, SceneError::DuplicateMaterial(name) if name == "red"));
    }

    #[test]
    fn test_unknown_material_rejected() {
        let mut scene = Scene::new(Camera::default(), Vec3::ZERO);
        let err = scene
            .add_object(Sphere::new(Vec3::ZERO, 1.0), "missing")
            .unwrap_err();

        assert!(matches!(err, SceneError::UnknownMaterial { material } if material == "missing"));
        assert!(scene.objects().is_empty());
    }

    #[test]
    fn test_add_objects_returns_indices() {
        let mut scene = Scene::new(Camera::default(), Vec3::ZERO);
        let id = scene.register_material(red()).unwrap();

        assert_eq!(scene.add_object(Sphere::new(Vec3::ZERO, 1.0), "red").unwrap(), 0);
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert_eq!(scene.add_object(tri, "red").unwrap(), 1);
        assert_eq!(scene.objects()[1].material(), id);
    }

    #[test]
    fn test_build_freezes_scene() {
        let mut scene = Scene::new(Camera::default(), Vec3::ZERO);
        scene.register_material(red()).unwrap();
        scene.add_object(Sphere::new(Vec3::ZERO, 1.0), "red").unwrap();

        assert_eq!(scene.create_accelerated_structure(4).unwrap().object_count(), 1);
        assert!(scene.is_built());
        assert!(matches!(
            scene.create_accelerated_structure(4),
            Err(SceneError::AlreadyBuilt)
        ));
        assert!(matches!(
            scene.add_object(Sphere::new(Vec3::ONE, 1.0), "red"),
            Err(SceneError::AlreadyBuilt)
        ));
    }

    #[test]
    fn test_intersect_with_and_without_bvh() {
        let mut scene = Scene::new(Camera::default(), Vec3::ZERO);
        scene.register_material(red()).unwrap();
        for i in 0..10 {
            scene
                .add_object(Sphere::new(Vec3::new(0.0, 0.0, -2.0 - i as f32), 0.25), "red")
                .unwrap();
        }
        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);

        let linear = scene.intersect(&ray).unwrap();
        assert!((linear.t - 1.75).abs() < 1e-5);

        scene.create_accelerated_structure(2).unwrap();
        let accelerated = scene.intersect(&ray).unwrap();
        assert_eq!(linear.t, accelerated.t);

        assert!(scene.intersect(&Ray::new(Vec3::ZERO, Vec3::Z)).is_none());
    }

    #[test]
    fn test_from_description() {
        let desc = SceneDescription::from_json_str(
            r#"{
                "ambientLighting": [0.1, 0.1, 0.1],
                "materials": { "red": { "diffuse": [0.8, 0.1, 0.1] }, "white": {} },
                "objects": [
                    { "type": "sphere", "center": [0, 0, -2], "radius": 0.5, "material": "red" },
                    { "type": "triangle", "points": [[-1, -1, -3], [1, -1, -3], [-1, 1, -3]], "material": "white" }
                ],
                "lights": [ { "position": [0, 5, 0] } ]
            }"#,
        )
        .unwrap();

        let scene = Scene::from_description(&desc).unwrap();

        assert_eq!(scene.objects().len(), 2);
        assert_eq!(scene.lights().len(), 1);
        assert_eq!(scene.ambient(), Vec3::splat(0.1));
        let red = scene.material_id("red").unwrap();
        assert_eq!(scene.objects()[0].material(), red);
    }

    #[test]
    fn test_from_description_unknown_material() {
        let desc = SceneDescription::from_json_str(
            r#"{ "objects": [ { "type": "sphere", "center": [0, 0, -2], "radius": 0.5, "material": "ghost" } ] }"#,
        )
        .unwrap();

        let err = Scene::from_description(&desc).unwrap_err();
        assert!(matches!(err, SceneError::UnknownMaterial { material } if material == "ghost"));
    }

    #[test]
    fn test_model_material_checked_before_load() {
        let desc = SceneDescription::from_json_str(
            r#"{ "objects": [ { "type": "model", "path": "/no/such/model.obj", "material": "ghost" } ] }"#,
        )
        .unwrap();

        let err = Scene::from_description(&desc).unwrap_err();
        assert!(matches!(err, SceneError::UnknownMaterial { .. }));
    }

    #[test]
    fn test_missing_model_is_load_error() {
        let desc = SceneDescription::from_json_str(
            r#"{ "materials": { "m": {} },
                 "objects": [ { "type": "model", "path": "/no/such/model.obj", "material": "m" } ] }"#,
        )
        .unwrap();

        let err = Scene::from_description(&desc).unwrap_err();
        assert!(matches!(err, SceneError::Load(_)));
    }
}
