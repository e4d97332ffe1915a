//! Solver configuration and TOML job files.
//!
//! ```toml
//! m = 200
//! n = 300
//! tol = 0.01
//! strategy = "rayon"
//! threads = 4
//!
//! [boundary]
//! left = 40.0
//! right = 90.0
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{JacobiError, Result};
use crate::grid::Boundary;
use crate::implementations::Strategy;

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SolverConfig {
    /// Interior rows.
    pub m: usize,
    /// Interior columns.
    pub n: usize,
    /// Stop once the largest change in a sweep is at most this.
    pub tol: f64,
    #[serde(default)]
    pub boundary: Boundary,
    #[serde(default)]
    pub strategy: Strategy,
    /// Worker count for the parallel strategies. `None` lets rayon decide,
    /// or uses the available parallelism for `barrier`.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Optional safety cap on the number of sweeps.
    #[serde(default)]
    pub max_iterations: Option<usize>,
}

impl SolverConfig {
    pub fn new(m: usize, n: usize, tol: f64) -> Self {
        SolverConfig {
            m,
            n,
            tol,
            boundary: Boundary::default(),
            strategy: Strategy::default(),
            threads: None,
            max_iterations: None,
        }
    }

    pub fn with_boundary(mut self, boundary: Boundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.m == 0 || self.n == 0 {
            return Err(JacobiError::InvalidDimensions {
                m: self.m,
                n: self.n,
            });
        }
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(JacobiError::InvalidTolerance(self.tol));
        }
        self.boundary.validate()?;
        if self.threads == Some(0) {
            return Err(JacobiError::InvalidThreads);
        }
        if self.max_iterations == Some(0) {
            return Err(JacobiError::InvalidIterationLimit);
        }
        Ok(())
    }

    /// Parse a TOML job. The result is not validated yet, so that command
    /// line overrides can still be applied on top of it.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| JacobiError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}
