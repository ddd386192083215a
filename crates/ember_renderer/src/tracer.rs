//! Whitted-style shading.
//!
//! Implements the per-sample pipeline:
//! - Primary rays through random screen points
//! - Blinn-Phong direct lighting with Monte Carlo soft shadows
//! - Recursive mirror reflection with a bounded depth
//!
//! Cost per shaded point grows with lights x shadow samples, and again with
//! every reflection bounce.

use crate::{gen_f32, Color, Hit, PixelBuffer, Projection, Ray, Scene};
use ember_core::{PointLight, RenderSettings};
use ember_math::Vec3;
use rand::RngCore;

/// Offset along the shading normal for rays that leave a surface, so they
/// do not re-hit the point they start from. Scaled by the point's largest
/// coordinate magnitude; see [`offset_origin`].
pub const SURFACE_BIAS: f32 = 1e-4;

/// Hard ceiling on reflection depth, whatever the configuration says.
pub const MAX_RECURSE_CAP: u32 = 16;

/// Shading configuration.
#[derive(Debug, Clone)]
pub struct TracerConfig {
    /// Soft-shadow samples per light per shaded point
    pub num_shadow_rays: u32,
    /// Deepest reflection bounce that is still shaded
    pub max_recurse_level: u32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    /// Color written when a primary ray hits nothing
    pub background: Color,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            num_shadow_rays: 16,
            max_recurse_level: 5,
            field_of_view: 60.0,
            background: Color::ZERO,
        }
    }
}

impl From<&RenderSettings> for TracerConfig {
    fn from(settings: &RenderSettings) -> Self {
        Self {
            num_shadow_rays: settings.num_shadow_rays,
            max_recurse_level: settings.max_recurse_level,
            field_of_view: settings.field_of_view,
            ..Default::default()
        }
    }
}

/// Shades samples of a built scene.
///
/// Holds no mutable state; one tracer is shared by every render worker and
/// all randomness comes from the caller's generator.
pub struct RayTracer<'a> {
    scene: &'a Scene,
    config: TracerConfig,
}

impl<'a> RayTracer<'a> {
    pub fn new(scene: &'a Scene, mut config: TracerConfig) -> Self {
        if config.max_recurse_level > MAX_RECURSE_CAP {
            log::warn!(
                "maxRecurseLevel {} exceeds the cap, using {}",
                config.max_recurse_level,
                MAX_RECURSE_CAP
            );
            config.max_recurse_level = MAX_RECURSE_CAP;
        }
        if !scene.is_built() {
            log::warn!("Tracing a scene without an acceleration structure");
        }
        Self { scene, config }
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// View plane for `buffer`'s current size.
    pub fn projection_for(&self, buffer: &PixelBuffer) -> Projection {
        let (width, height) = buffer.size();
        Projection::new(self.scene.camera(), self.config.field_of_view, width, height)
    }

    /// Shade one random sample at normalized screen point `(x, y)` and fold
    /// it into `buffer`.
    ///
    /// `(0, 0)` is the top-left corner. The view plane follows the buffer's
    /// current size, so a resized buffer changes the aspect ratio.
    pub fn sample_scene(&self, buffer: &PixelBuffer, x: f32, y: f32, rng: &mut dyn RngCore) {
        self.sample_projected(&self.projection_for(buffer), buffer, x, y, rng);
    }

    /// [`sample_scene`](Self::sample_scene) with a view plane built once by
    /// [`projection_for`](Self::projection_for) for the same buffer size.
    pub fn sample_projected(
        &self,
        projection: &Projection,
        buffer: &PixelBuffer,
        x: f32,
        y: f32,
        rng: &mut dyn RngCore,
    ) {
        let (width, height) = buffer.size();
        if width == 0 || height == 0 {
            return;
        }

        let ray = projection.ray_through(x, y);
        let color = self.trace(&ray, rng);

        buffer.set_pixel(
            Projection::pixel_index(x, width),
            Projection::pixel_index(y, height),
            color,
        );
    }

    /// Color seen along a primary ray.
    pub fn trace(&self, ray: &Ray, rng: &mut dyn RngCore) -> Color {
        match self.shoot_ray(ray) {
            Some(hit) => self.get_hit_color(&hit, 0, rng),
            None => self.config.background,
        }
    }

    /// Nearest hit along `ray`; the hit keeps a copy of the ray.
    #[inline]
    pub fn shoot_ray(&self, ray: &Ray) -> Option<Hit> {
        self.scene.intersect(ray)
    }

    /// Blinn-Phong color of a hit, including reflections up to the
    /// configured depth.
    pub fn get_hit_color(&self, hit: &Hit, recurse_level: u32, rng: &mut dyn RngCore) -> Color {
        if recurse_level > self.config.max_recurse_level {
            return Color::ZERO;
        }

        let material = self.scene.material(hit.material);
        let normal = hit.shading_normal();
        let position = hit.position;
        let origin = offset_origin(position, normal);
        let view = -hit.ray.direction();
        let direct_weight = 1.0 - material.reflection;

        let mut color = self.scene.ambient() + material.ambient;

        for light in self.scene.lights() {
            let to_light = light.position - position;
            let distance = to_light.length();
            if distance <= 0.0 {
                log::debug!("Skipping light at the shaded point {}", position);
                continue;
            }

            let light_dir = to_light / distance;
            let lambert = light_dir.dot(normal).max(0.0);
            if lambert <= 0.0 {
                // Light is behind the surface: no diffuse, no highlight
                continue;
            }

            let diffuse = light.color * (light.intensity * light.intensity / distance)
                * lambert
                * material.diffuse;

            let half = (light_dir + view).normalize_or_zero();
            let specular =
                material.specular * normal.dot(half).max(0.0).powf(material.specular_exponent);

            let shadow = self.shoot_shadow_rays(light, origin, rng);
            color += (diffuse + specular) * shadow * direct_weight;
        }

        if material.is_reflective() {
            let reflected = hit.ray.reflect(origin, normal);
            if let Some(next) = self.shoot_ray(&reflected) {
                color += self.get_hit_color(&next, recurse_level + 1, rng) * material.reflection;
            }
        }

        color
    }

    /// Fraction of `light`'s disk visible from `position`, in `[0, 1]`.
    ///
    /// Samples points offset from the light center by uniform amounts in
    /// `[-radius, radius]` along two axes perpendicular to the light
    /// direction. A sample is blocked only by a hit strictly closer than it.
    pub fn shoot_shadow_rays(&self, light: &PointLight, position: Vec3, rng: &mut dyn RngCore) -> f32 {
        let to_light = light.position - position;
        if self.config.num_shadow_rays == 0 || to_light.length_squared() == 0.0 {
            return 1.0;
        }

        let (u, v) = disk_basis(to_light);

        let mut lit = 0u32;
        for _ in 0..self.config.num_shadow_rays {
            let su = (gen_f32(rng) * 2.0 - 1.0) * light.radius;
            let sv = (gen_f32(rng) * 2.0 - 1.0) * light.radius;
            let sample = light.position + u * su + v * sv;

            let offset = sample - position;
            let distance = offset.length();
            if distance <= 0.0 {
                lit += 1;
                continue;
            }

            let ray = Ray::new(position, offset);
            match self.shoot_ray(&ray) {
                Some(hit) if hit.t < distance => {}
                _ => lit += 1,
            }
        }

        lit as f32 / self.config.num_shadow_rays as f32
    }
}

/// Start point for rays leaving the surface at `position`.
///
/// The offset grows with the largest coordinate so it stays well above the
/// f32 spacing at `position`, however far that is from the origin.
pub fn offset_origin(position: Vec3, normal: Vec3) -> Vec3 {
    let scale = position.abs().max_element().max(1.0);
    position + normal * (SURFACE_BIAS * scale)
}

/// Two unit vectors perpendicular to `axis` and to each other.
fn disk_basis(axis: Vec3) -> (Vec3, Vec3) {
    let reference = if axis.cross(Vec3::Y).length_squared() > 1e-12 * axis.length_squared() {
        Vec3::Y
    } else {
        Vec3::X
    };
    let u = axis.cross(reference).normalize_or_zero();
    let v = axis.cross(u).normalize_or_zero();
    (u, v)
}
