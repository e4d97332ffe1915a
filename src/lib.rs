//! Steady-state 2D heat diffusion by Jacobi relaxation.
//!
//! Every interior cell of an `(m+2) x (n+2)` grid is replaced by the mean of
//! its four neighbours until the largest change in a sweep is within `tol`.
//! The halo holds fixed boundary temperatures.
//!
//! ```no_run
//! use jacobi_heat::{solve, SolverConfig, Strategy};
//!
//! let config = SolverConfig::new(200, 300, 0.01).with_strategy(Strategy::Rayon);
//! let solution = solve(&config)?;
//! println!("iter = {}  difmax = {}", solution.iterations, solution.difmax);
//! # Ok::<(), jacobi_heat::JacobiError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod implementations;
pub mod output;
pub mod timing;

pub use config::SolverConfig;
pub use engine::{solve, RelaxationEngine, Solution};
pub use error::JacobiError;
pub use grid::{Boundary, Grid};
pub use implementations::{Convergence, Relaxation, Strategy};
