//! Plain-text report of a solve.
//!
//! ```text
//! 2 2 0.01
//! iter = 12  difmax = 0.0054931640625
//!
//! 30 30 30 30
//! 40 43.7445068359375 56.2445068359375 90
//! ...
//! ```

use std::io::{self, Write};

use crate::config::SolverConfig;
use crate::engine::Solution;

pub fn write_header<W: Write>(out: &mut W, config: &SolverConfig) -> io::Result<()> {
    writeln!(out, "{} {} {}", config.m, config.n, config.tol)
}

pub fn write_summary<W: Write>(out: &mut W, solution: &Solution) -> io::Result<()> {
    writeln!(
        out,
        "iter = {}  difmax = {}",
        solution.iterations, solution.difmax
    )
}

/// Echo line, iteration line, then a blank line followed by the full grid,
/// halo included, one row per line.
pub fn write_report<W: Write>(
    out: &mut W,
    config: &SolverConfig,
    solution: &Solution,
    include_grid: bool,
) -> io::Result<()> {
    write_header(out, config)?;
    write_summary(out, solution)?;
    if include_grid {
        writeln!(out)?;
        write!(out, "{}", solution.grid)?;
    }
    out.flush()
}
