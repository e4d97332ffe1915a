use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::Result;
use crate::grid::Grid;
use crate::implementations::{promote_row, relax_row, Relaxation};

/*
  Rayon-based data-parallel relaxation

  1. The sweep splits the interior rows of `next` with par_chunks_mut, so
     every worker owns a disjoint set of rows and only reads `current`.
  2. The measure step zips interior rows of `current` and `next`, each row
     yields a local maximum and rayon's reduce combines them with f64::max.
  3. Promotion happens row-locally right after that row has been measured.
*/

#[derive(Debug, Default)]
pub struct RayonRelaxation {
    pool: Option<ThreadPool>,
}

impl RayonRelaxation {
    /// `None` runs on the global pool. `Some(n)` builds a dedicated pool of
    /// `n` threads.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let pool = match threads {
            Some(num_threads) => Some(ThreadPoolBuilder::new().num_threads(num_threads).build()?),
            None => None,
        };
        Ok(RayonRelaxation { pool })
    }

    pub fn current_num_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    fn install<OP, R>(&self, op: OP) -> R
    where
        OP: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

impl Relaxation for RayonRelaxation {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn sweep(&self, current: &Grid, next: &mut Grid) {
        let cols = current.cols();

        self.install(|| {
            next.interior_rows_mut()
                .par_chunks_mut(cols)
                .enumerate()
                .for_each(|(r, dst_row)| {
                    // r indexes the interior block, the grid row is r + 1
                    let i = r + 1;
                    relax_row(current.row(i - 1), current.row(i), current.row(i + 1), dst_row);
                });
        });
    }

    fn measure(&self, current: &mut Grid, next: &Grid) -> f64 {
        let cols = current.cols();
        let src = next.interior_rows();

        self.install(|| {
            current
                .interior_rows_mut()
                .par_chunks_mut(cols)
                .zip(src.par_chunks(cols))
                .map(|(cur_row, next_row)| promote_row(cur_row, next_row))
                .reduce(|| 0.0, f64::max)
        })
    }
}
