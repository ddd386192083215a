//! Render settings loaded from the JSON config file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Largest accepted vertical field of view, in degrees.
const MAX_FIELD_OF_VIEW: f32 = 179.0;

/// Everything the driver and the renderer need to know before a session.
///
/// Keys are camelCase in the config file and every key is optional:
///
/// ```json
/// { "windowWidth": 800, "windowHeight": 600, "fps": 30, "numThreads": 8,
///   "numChildrenInBVHLeafNodes": 16, "numShadowRays": 16, "maxRecurseLevel": 5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    /// Accumulation buffer width in pixels
    pub window_width: u32,
    /// Accumulation buffer height in pixels
    pub window_height: u32,
    /// Target frames per second; each frame samples for `1 / fps` seconds
    pub fps: u32,
    /// Worker threads in the render pool
    pub num_threads: usize,
    /// Maximum objects in a BVH leaf before it is subdivided
    #[serde(rename = "numChildrenInBVHLeafNodes")]
    pub bvh_leaf_threshold: usize,
    /// Soft-shadow samples per light per shaded point
    pub num_shadow_rays: u32,
    /// Mirror reflection recursion depth
    pub max_recurse_level: u32,
    /// Vertical field of view in degrees
    pub field_of_view: f32,
    /// Base seed for the per-worker random number generators
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            window_width: 640,
            window_height: 480,
            fps: 30,
            num_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            bvh_leaf_threshold: 16,
            num_shadow_rays: 16,
            max_recurse_level: 5,
            field_of_view: 60.0,
            seed: 0,
        }
    }
}

impl RenderSettings {
    /// Load and validate settings from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&text)?;
        log::info!(
            "Loaded settings from {}: {}x{} @ {} fps, {} threads",
            path.display(),
            settings.window_width,
            settings.window_height,
            settings.fps,
            settings.num_threads
        );
        Ok(settings)
    }

    /// Parse and validate settings from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, SettingsError> {
        let settings: RenderSettings = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let invalid = |key: &'static str, reason: String| Err(SettingsError::Invalid { key, reason });

        if self.window_width == 0 || self.window_height == 0 {
            return invalid(
                "windowWidth/windowHeight",
                format!("{}x{} has no pixels", self.window_width, self.window_height),
            );
        }
        if self.fps == 0 {
            return invalid("fps", "must be at least 1".to_string());
        }
        if self.num_threads == 0 {
            return invalid("numThreads", "must be at least 1".to_string());
        }
        if self.bvh_leaf_threshold == 0 {
            return invalid("numChildrenInBVHLeafNodes", "must be at least 1".to_string());
        }
        if !self.field_of_view.is_finite()
            || self.field_of_view <= 0.0
            || self.field_of_view > MAX_FIELD_OF_VIEW
        {
            return invalid(
                "fieldOfView",
                format!("{} not in (0, {}]", self.field_of_view, MAX_FIELD_OF_VIEW),
            );
        }
        Ok(())
    }

    /// Wall-clock budget of a single frame.
    pub fn frame_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_full_config() {
        let settings = RenderSettings::from_json_str(
            r#"{
                "windowWidth": 800,
                "windowHeight": 600,
                "fps": 60,
                "numThreads": 3,
                "numChildrenInBVHLeafNodes": 12,
                "numShadowRays": 8,
                "maxRecurseLevel": 2
            }"#,
        )
        .unwrap();

        assert_eq!(settings.window_width, 800);
        assert_eq!(settings.window_height, 600);
        assert_eq!(settings.fps, 60);
        assert_eq!(settings.num_threads, 3);
        assert_eq!(settings.bvh_leaf_threshold, 12);
        assert_eq!(settings.num_shadow_rays, 8);
        assert_eq!(settings.max_recurse_level, 2);
        assert_eq!(settings.field_of_view, 60.0);
    }

    #[test]
    fn test_settings_defaults_for_missing_keys() {
        let settings = RenderSettings::from_json_str("{}").unwrap();
        let defaults = RenderSettings::default();

        assert_eq!(settings, defaults);
        assert!(settings.num_threads >= 1);
    }

    #[test]
    fn test_settings_rejects_zero_fps() {
        let err = RenderSettings::from_json_str(r#"{ "fps": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { key: "fps", .. }));
    }

    #[test]
    fn test_settings_rejects_empty_window() {
        let err = RenderSettings::from_json_str(r#"{ "windowWidth": 0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { .. }));
    }

    #[test]
    fn test_settings_rejects_bad_fov() {
        let err = RenderSettings::from_json_str(r#"{ "fieldOfView": 180.0 }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Invalid { key: "fieldOfView", .. }));
    }

    #[test]
    fn test_settings_rejects_malformed_json() {
        let err = RenderSettings::from_json_str(r#"{ "fps": "fast" }"#).unwrap_err();
        assert!(matches!(err, SettingsError::Json(_)));
    }

    #[test]
    fn test_frame_duration() {
        let settings = RenderSettings {
            fps: 4,
            ..Default::default()
        };
        assert_eq!(settings.frame_duration().as_millis(), 250);
    }

    #[test]
    fn test_settings_missing_file() {
        let err = RenderSettings::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
