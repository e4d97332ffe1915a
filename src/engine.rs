//! The relaxation engine: owns both grid buffers and drives the Jacobi loop.

use crate::config::SolverConfig;
use crate::error::{JacobiError, Result};
use crate::grid::Grid;
use crate::implementations::Relaxation;
use crate::timing::Timed;

/// Converged grid plus the loop state at termination.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub grid: Grid,
    pub iterations: usize,
    pub difmax: f64,
}

#[derive(Debug)]
pub struct RelaxationEngine {
    config: SolverConfig,
    current: Grid,
    next: Grid,
    relaxation: Box<dyn Relaxation>,
    iterations: usize,
}

impl RelaxationEngine {
    /// Validate `config`, then allocate and initialise both buffers.
    ///
    /// `current` gets the fill value everywhere and the boundary temperatures
    /// on the halo edges; `next` starts zeroed.
    pub fn init(config: &SolverConfig) -> Result<Self> {
        config.validate()?;

        let current = Grid::with_boundary(config.m, config.n, &config.boundary)?;
        let next = Grid::zeros(config.m, config.n)?;
        let relaxation = config.strategy.build(config.threads)?;

        Ok(RelaxationEngine {
            config: config.clone(),
            current,
            next,
            relaxation,
            iterations: 0,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn current(&self) -> &Grid {
        &self.current
    }

    pub fn next(&self) -> &Grid {
        &self.next
    }

    /// Sweeps completed so far.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn strategy_name(&self) -> &'static str {
        self.relaxation.name()
    }

    /// Compute `next` for every interior cell from `current` alone.
    pub fn sweep(&mut self) {
        self.relaxation.sweep(&self.current, &mut self.next);
    }

    /// Largest interior change between `next` and `current`, promoting `next`
    /// into `current` afterwards.
    pub fn measure(&mut self) -> f64 {
        self.relaxation.measure(&mut self.current, &self.next)
    }

    /// One full Jacobi iteration. Returns its difmax.
    pub fn step(&mut self) -> f64 {
        self.sweep();
        let difmax = self.measure();
        self.iterations += 1;
        difmax
    }

    /// Relax until difmax drops to the configured tolerance.
    ///
    /// The iteration count in the returned [`Solution`] covers this call
    /// only. Fails with [`JacobiError::IterationLimit`] if a cap is set and
    /// reached first.
    pub fn run(mut self) -> Result<Solution> {
        let SolverConfig {
            m,
            n,
            tol,
            max_iterations,
            ..
        } = self.config;

        log::info!(
            "Relaxing {}x{} interior with {} (tol = {})",
            m,
            n,
            self.relaxation.name(),
            tol
        );

        let outcome = {
            let _t = Timed::debug(format!("{} relaxation", self.relaxation.name()));
            self.relaxation
                .relax(&mut self.current, &mut self.next, tol, max_iterations)
        };

        match outcome {
            Ok(convergence) => {
                self.iterations += convergence.iterations;
                log::info!(
                    "Converged after {} iterations (difmax = {:e})",
                    convergence.iterations,
                    convergence.difmax
                );
                Ok(Solution {
                    grid: self.current,
                    iterations: convergence.iterations,
                    difmax: convergence.difmax,
                })
            }
            Err(err @ JacobiError::IterationLimit { .. }) => {
                log::warn!("{}", err);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }
}

/// Build an engine from `config` and run it to convergence.
pub fn solve(config: &SolverConfig) -> Result<Solution> {
    RelaxationEngine::init(config)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::implementations::Strategy;

    #[test]
    fn init_rejects_invalid_config_before_allocating() {
        let err = RelaxationEngine::init(&SolverConfig::new(0, 3, 0.1)).unwrap_err();
        assert!(matches!(err, JacobiError::InvalidDimensions { m: 0, n: 3 }));

        let err = RelaxationEngine::init(&SolverConfig::new(3, 3, -0.5)).unwrap_err();
        assert!(matches!(err, JacobiError::InvalidTolerance(_)));
    }

    #[test]
    fn step_counts_iterations() {
        let mut engine = RelaxationEngine::init(&SolverConfig::new(2, 2, 0.01)).unwrap();
        assert_eq!(engine.iterations(), 0);
        engine.step();
        engine.step();
        assert_eq!(engine.iterations(), 2);
    }

    #[test]
    fn strategy_name_follows_config() {
        for strategy in Strategy::ALL {
            let config = SolverConfig::new(2, 2, 0.1)
                .with_strategy(strategy)
                .with_threads(2);
            let engine = RelaxationEngine::init(&config).unwrap();
            assert_eq!(engine.strategy_name(), strategy.to_string());
        }
    }

    #[test]
    fn run_matches_manual_steps() {
        let config = SolverConfig::new(3, 4, 1e-3);
        let mut manual = RelaxationEngine::init(&config).unwrap();
        let mut difmax = f64::INFINITY;
        while difmax > config.tol {
            difmax = manual.step();
        }

        let solution = solve(&config).unwrap();
        assert_eq!(solution.iterations, manual.iterations());
        assert_eq!(solution.difmax, difmax);
        assert_eq!(&solution.grid, manual.current());
    }
}
