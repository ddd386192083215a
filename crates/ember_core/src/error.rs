//! Error types for loading settings, scene files and meshes.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading a scene description or mesh.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scene JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("OBJ error in {path}: {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("No triangles found in model {0}")]
    EmptyModel(PathBuf),

    #[error("Invalid object #{index}: {reason}")]
    InvalidObject { index: usize, reason: String },

    #[error("Invalid light #{index}: {reason}")]
    InvalidLight { index: usize, reason: String },

    #[error("Invalid material '{name}': {reason}")]
    InvalidMaterial { name: String, reason: String },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors that can occur while loading or validating render settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}
