//! Error types for scene construction and render setup.

use ember_core::LoadError;
use thiserror::Error;

/// Errors raised while building a [`Scene`](crate::Scene).
///
/// All of these surface before rendering starts; shading never fails.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("Unknown material '{material}'")]
    UnknownMaterial { material: String },

    #[error("Material '{0}' is already registered")]
    DuplicateMaterial(String),

    #[error("Acceleration structure already built; the scene is frozen")]
    AlreadyBuilt,

    #[error("Invalid {what}: {reason}")]
    InvalidGeometry { what: &'static str, reason: String },

    #[error("Load error: {0}")]
    Load(#[from] LoadError),
}

/// Errors raised while setting up the render workers.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Render pool needs at least one thread")]
    NoThreads,
}
