//! Error types for the VAS archive builder.
//!
//! Failures come in three scopes. `ImageError` and `GroupError` are recovered
//! where they happen and turn into skipped files; only `RunError` reaches the caller.

use std::path::PathBuf;
use thiserror::Error;

/// Why a single image could not be used.
#[derive(Error, Debug)]
pub enum ImageError {
    #[error("could not decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no non-transparent area found")]
    NoContent,

    #[error("crop {width}x{height} at ({x}, {y}) contains no pixels")]
    EmptyCrop { x: u32, y: u32, width: u32, height: u32 },

    #[error("dropped with its group: {0}")]
    Group(#[from] GroupError),
}

/// Why a directory or cluster could not be consolidated.
#[derive(Error, Debug, Clone)]
pub enum GroupError {
    #[error("cluster {0} has no members")]
    EmptyCluster(String),

    #[error("no corners recorded for image index {0}")]
    MissingCorners(usize),
}

/// Failures that abort the whole run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("no .png files found under {0}")]
    NoImagesFound(PathBuf),

    #[error("no valid images processed")]
    NoValidImages,

    #[error("structure generation produced no masks")]
    NoMasks,

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("archive error at {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("{path} is not inside {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },
}

/// Convenience Result type alias for RunError.
pub type Result<T> = std::result::Result<T, RunError>;
