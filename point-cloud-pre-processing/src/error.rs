//! Error types shared by every tool in the crate.
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Top-level error for the data-preparation tools.
#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("LAS error: {0}")]
    Las(#[from] las::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tile file {}: {message}", path.display())]
    TileFile { path: PathBuf, message: String },

    #[error("NPY error: {0}")]
    Npy(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("{failed} of {total} units failed")]
    Batch { failed: usize, total: usize },
}

impl PreprocessError {
    /// Wraps an IO error with the path that produced it.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PreprocessError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Failures of the tiling geometry pipeline.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("cannot sample 1 in {divisor} of {points} points: sample is empty")]
    SampleTooSmall { points: usize, divisor: usize },

    #[error("concave hull is degenerate ({0})")]
    DegenerateHull(String),

    #[error("centerline is empty")]
    EmptyCenterline,

    #[error("centerline is not a single line: {0}")]
    MultiComponentCenterline(String),

    #[error("ribbon buffer failed: {0}")]
    Buffer(String),

    #[error("splitting tile {tile} crossed the ribbon boundary {crossings} times, expected 2")]
    Split { tile: usize, crossings: usize },

    #[error("divider for tile {tile} crosses a hole in the ribbon")]
    SplitThroughHole { tile: usize },
}
