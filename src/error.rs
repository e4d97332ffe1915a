//! Error taxonomy for the relaxation kernel.
//!
//! Everything is validated once, before any grid is allocated. The only
//! error that can surface after a solve has started is the optional
//! iteration cap.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JacobiError {
    #[error("Invalid dimensions: m={m}, n={n} (both must be at least 1)")]
    InvalidDimensions { m: usize, n: usize },

    #[error("Invalid tolerance: {0} (must be finite and greater than zero)")]
    InvalidTolerance(f64),

    #[error("Invalid {side} boundary temperature: {value}")]
    InvalidBoundary { side: &'static str, value: f64 },

    #[error("Thread count must be at least 1")]
    InvalidThreads,

    #[error("Iteration limit must be at least 1")]
    InvalidIterationLimit,

    #[error("Unable to allocate a grid of {cells} cells")]
    Allocation { cells: usize },

    #[error("No convergence after {max_iterations} iterations (difmax: {difmax:.3e})")]
    IterationLimit { max_iterations: usize, difmax: f64 },

    #[error("Failed to build rayon thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Unknown strategy '{0}' (expected single, rayon or barrier)")]
    UnknownStrategy(String),

    #[error("Failed to read config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, JacobiError>;
