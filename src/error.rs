//! Error types for asset loading, shader compilation and wave configuration
//!
//! Recoverable failures are reported through these enums and logged by the
//! caller; the resource involved is left unset and anything depending on it
//! is skipped at draw time.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a model or image from disk
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load OBJ '{path}': {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ '{path}' contains no shapes")]
    EmptyModel { path: PathBuf },

    #[error("failed to load image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no cubemap face could be loaded from '{dir}'")]
    Cubemap { dir: PathBuf },
}

/// Failure to produce a usable shader program
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader source '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader '{name}' failed to compile: {message}")]
    Compile { name: String, message: String },
}

/// Invalid ocean configuration values crossing a numeric boundary
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OceanError {
    #[error("unknown wave function code {0}")]
    UnknownWaveFunction(u32),
}
