//! Build errors. Every error is fatal to the step that raised it.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File not found: \"{0}\"")]
    MissingInput(PathBuf),

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Image error on {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Unusable image {0}: {1}")]
    InvalidImage(PathBuf, String),

    #[error("Invalid nsid \"{0}\": {1}")]
    InvalidNsid(String, &'static str),

    #[error("Duplicate NSID \"{0}\"")]
    DuplicateNsid(String),

    #[error("src is dst: {0}")]
    SrcIsDst(PathBuf),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Validation failed:\n{0}")]
    ValidationFailed(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Homebrew requires prebuild >= {required}, current is {current}")]
    VersionMismatch { required: String, current: String },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl BuildError {
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn image(path: impl AsRef<Path>, source: image::ImageError) -> Self {
        Self::Image {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
