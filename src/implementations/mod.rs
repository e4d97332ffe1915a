use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{JacobiError, Result};
use crate::grid::Grid;

pub mod barrier;
pub mod rayon;
pub mod single;

/// Outcome of a relaxation loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Convergence {
    pub iterations: usize,
    pub difmax: f64,
}

/// One way of executing the Jacobi sweep and the max-difference reduction.
///
/// `sweep` must read only from `current`. `measure` must return the true
/// global maximum of `|next - current|` over interior cells and then copy
/// `next` into `current` for those cells.
pub trait Relaxation: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn sweep(&self, current: &Grid, next: &mut Grid);

    fn measure(&self, current: &mut Grid, next: &Grid) -> f64;

    fn relax(
        &self,
        current: &mut Grid,
        next: &mut Grid,
        tol: f64,
        max_iterations: Option<usize>,
    ) -> Result<Convergence> {
        let mut iterations = 0;
        let mut difmax = f64::INFINITY;

        while difmax > tol {
            if let Some(limit) = max_iterations {
                if iterations >= limit {
                    return Err(JacobiError::IterationLimit {
                        max_iterations: limit,
                        difmax,
                    });
                }
            }
            self.sweep(current, next);
            difmax = self.measure(current, next);
            iterations += 1;
        }

        Ok(Convergence { iterations, difmax })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Single,
    Rayon,
    Barrier,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Single, Strategy::Rayon, Strategy::Barrier];

    /// Build the executor. `threads` is ignored by `Single`.
    pub fn build(self, threads: Option<usize>) -> Result<Box<dyn Relaxation>> {
        Ok(match self {
            Strategy::Single => Box::new(single::SingleRelaxation),
            Strategy::Rayon => Box::new(self::rayon::RayonRelaxation::new(threads)?),
            Strategy::Barrier => Box::new(barrier::BarrierRelaxation::new(threads)),
        })
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strategy::Single => "single",
            Strategy::Rayon => "rayon",
            Strategy::Barrier => "barrier",
        })
    }
}

impl FromStr for Strategy {
    type Err = JacobiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Strategy::Single),
            "rayon" => Ok(Strategy::Rayon),
            "barrier" => Ok(Strategy::Barrier),
            _ => Err(JacobiError::UnknownStrategy(s.to_string())),
        }
    }
}

/// Four-point average for the interior columns of one row.
///
/// `up`, `mid` and `down` are full rows of the current grid (halo columns
/// included); `out` is the matching row of the next grid. Column 0 and the
/// last column of `out` are not touched.
#[inline]
pub(crate) fn relax_row(up: &[f64], mid: &[f64], down: &[f64], out: &mut [f64]) {
    let cols = mid.len();
    for j in 1..cols - 1 {
        out[j] = (up[j] + down[j] + mid[j - 1] + mid[j + 1]) / 4.0;
    }
}

/// Largest interior change in one row, promoting `next` into `current` as it
/// goes. Each cell is compared before it is overwritten.
#[inline]
pub(crate) fn promote_row(current: &mut [f64], next: &[f64]) -> f64 {
    let cols = current.len();
    let mut local_max = 0.0_f64;
    for j in 1..cols - 1 {
        let diff = (next[j] - current[j]).abs();
        if diff > local_max {
            local_max = diff;
        }
        current[j] = next[j];
    }
    local_max
}

/// Split interior rows `1..=m` into at most `workers` contiguous bands of
/// near-equal size. Never yields an empty band.
pub(crate) fn row_bands(m: usize, workers: usize) -> Vec<Range<usize>> {
    let bands = workers.clamp(1, m.max(1));
    let base = m / bands;
    let extra = m % bands;

    let mut start = 1;
    (0..bands)
        .map(|b| {
            let len = base + usize::from(b < extra);
            let band = start..start + len;
            start += len;
            band
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relax_row_averages_four_neighbours() {
        let up = [0.0, 1.0, 2.0, 0.0];
        let mid = [4.0, 8.0, 12.0, 16.0];
        let down = [0.0, 3.0, 6.0, 0.0];
        let mut out = [-1.0; 4];

        relax_row(&up, &mid, &down, &mut out);

        assert_eq!(out, [-1.0, (1.0 + 3.0 + 4.0 + 12.0) / 4.0, (2.0 + 6.0 + 8.0 + 16.0) / 4.0, -1.0]);
    }

    #[test]
    fn promote_row_skips_halo_columns() {
        let mut current = [5.0, 1.0, 1.0, 5.0];
        let next = [9.0, 1.5, 4.0, 9.0];

        let local_max = promote_row(&mut current, &next);

        assert_eq!(local_max, 3.0);
        assert_eq!(current, [5.0, 1.5, 4.0, 5.0]);
    }

    #[test]
    fn row_bands_cover_interior_exactly_once() {
        for m in 1..20 {
            for workers in 1..8 {
                let bands = row_bands(m, workers);
                assert!(bands.len() <= workers);
                assert!(bands.len() <= m);
                assert!(bands.iter().all(|b| !b.is_empty()));
                assert_eq!(bands.first().unwrap().start, 1);
                assert_eq!(bands.last().unwrap().end, m + 1);
                for pair in bands.windows(2) {
                    assert_eq!(pair[0].end, pair[1].start);
                }
            }
        }
    }

    #[test]
    fn strategy_round_trips_through_strings() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.to_string().parse::<Strategy>().unwrap(), strategy);
        }
        assert_eq!("RAYON".parse::<Strategy>().unwrap(), Strategy::Rayon);
        assert!(matches!(
            "gpu".parse::<Strategy>(),
            Err(JacobiError::UnknownStrategy(_))
        ));
    }
}
