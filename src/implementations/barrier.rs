use std::sync::{Barrier, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::panic;
use std::thread;

use crate::error::{JacobiError, Result};
use crate::grid::Grid;
use crate::implementations::{promote_row, relax_row, row_bands, Convergence, Relaxation};

/*
  std::thread implementation over contiguous row bands.

  relax() keeps one worker per band alive for the whole solve:
  1. each band of `current` sits behind an RwLock; a worker read-locks its
     own band and the two neighbouring bands to compute its band of `next`,
     which it owns outright
  2. Barrier: every sweep is finished before anyone promotes
  3. each worker write-locks its own band, measures and promotes it, and
     stores its local maximum in its own slot
  4. Barrier: every slot is filled; all workers reduce the same slots, so
     they agree on difmax and stop on the same iteration
*/

#[derive(Clone, Copy, Debug)]
pub struct BarrierRelaxation {
    threads: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

struct WorkerOutcome {
    next_band: Vec<f64>,
    convergence: Convergence,
    converged: bool,
}

impl BarrierRelaxation {
    /// `None` uses the available parallelism of the machine.
    pub fn new(threads: Option<usize>) -> Self {
        let threads = threads.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        BarrierRelaxation {
            threads: threads.max(1),
        }
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl Relaxation for BarrierRelaxation {
    fn name(&self) -> &'static str {
        "barrier"
    }

    fn sweep(&self, current: &Grid, next: &mut Grid) {
        let cols = current.cols();
        let mut rest = next.interior_rows_mut();

        thread::scope(|scope| {
            for band in row_bands(current.m(), self.threads) {
                let (dst, tail) = std::mem::take(&mut rest).split_at_mut(band.len() * cols);
                rest = tail;

                scope.spawn(move || {
                    for (r, dst_row) in dst.chunks_mut(cols).enumerate() {
                        let i = band.start + r;
                        relax_row(current.row(i - 1), current.row(i), current.row(i + 1), dst_row);
                    }
                });
            }
        });
    }

    fn measure(&self, current: &mut Grid, next: &Grid) -> f64 {
        let cols = current.cols();
        let bands = row_bands(current.m(), self.threads);
        let difmax = Mutex::new(0.0_f64);

        let mut cur_rest = current.interior_rows_mut();
        let mut next_rest = next.interior_rows();

        thread::scope(|scope| {
            for band in bands {
                let len = band.len() * cols;
                let (cur_band, cur_tail) = std::mem::take(&mut cur_rest).split_at_mut(len);
                cur_rest = cur_tail;
                let (next_band, next_tail) = next_rest.split_at(len);
                next_rest = next_tail;
                let difmax = &difmax;

                scope.spawn(move || {
                    let local_max = cur_band
                        .chunks_mut(cols)
                        .zip(next_band.chunks(cols))
                        .map(|(cur_row, next_row)| promote_row(cur_row, next_row))
                        .fold(0.0, f64::max);

                    let mut global = lock(difmax);
                    if local_max > *global {
                        *global = local_max;
                    }
                });
            }
        });

        difmax.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn relax(
        &self,
        current: &mut Grid,
        next: &mut Grid,
        tol: f64,
        max_iterations: Option<usize>,
    ) -> Result<Convergence> {
        let cols = current.cols();
        let m = current.m();
        let bands = row_bands(m, self.threads);
        let workers = bands.len();

        // Halo rows never change, so plain copies are enough.
        let top_halo = current.row(0).to_vec();
        let bottom_halo = current.row(m + 1).to_vec();

        let shared: Vec<RwLock<Vec<f64>>> = bands
            .iter()
            .map(|band| RwLock::new(current.data[band.start * cols..band.end * cols].to_vec()))
            .collect();
        let maxima = Mutex::new(vec![0.0_f64; workers]);
        let barrier = Barrier::new(workers);

        // A worker panic leaves the others parked at the barrier; it is not
        // mapped to an error.
        let outcomes: Vec<WorkerOutcome> = thread::scope(|scope| {
            let handles: Vec<_> = bands
                .iter()
                .enumerate()
                .map(|(t, band)| {
                    let rows = band.len();
                    let (shared, maxima, barrier) = (&shared, &maxima, &barrier);
                    let (top_halo, bottom_halo) = (&top_halo, &bottom_halo);

                    scope.spawn(move || {
                        let mut next_band = vec![0.0; rows * cols];
                        let mut iterations = 0;

                        loop {
                            {
                                let own = read(&shared[t]);
                                let above = (t > 0).then(|| read(&shared[t - 1]));
                                let below = (t + 1 < workers).then(|| read(&shared[t + 1]));

                                let up_edge: &[f64] = match &above {
                                    Some(guard) => &guard[guard.len() - cols..],
                                    None => top_halo.as_slice(),
                                };
                                let down_edge: &[f64] = match &below {
                                    Some(guard) => &guard[..cols],
                                    None => bottom_halo.as_slice(),
                                };

                                for (r, dst_row) in next_band.chunks_mut(cols).enumerate() {
                                    let up = if r == 0 {
                                        up_edge
                                    } else {
                                        &own[(r - 1) * cols..r * cols]
                                    };
                                    let down = if r + 1 == rows {
                                        down_edge
                                    } else {
                                        &own[(r + 1) * cols..(r + 2) * cols]
                                    };
                                    relax_row(up, &own[r * cols..(r + 1) * cols], down, dst_row);
                                }
                            }

                            barrier.wait();

                            let local_max = {
                                let mut own = write(&shared[t]);
                                own.chunks_mut(cols)
                                    .zip(next_band.chunks(cols))
                                    .map(|(cur_row, next_row)| promote_row(cur_row, next_row))
                                    .fold(0.0, f64::max)
                            };
                            lock(maxima)[t] = local_max;

                            barrier.wait();

                            let difmax = lock(maxima).iter().copied().fold(0.0, f64::max);
                            iterations += 1;
                            let convergence = Convergence { iterations, difmax };

                            if difmax <= tol {
                                break WorkerOutcome {
                                    next_band,
                                    convergence,
                                    converged: true,
                                };
                            }
                            if max_iterations.is_some_and(|limit| iterations >= limit) {
                                break WorkerOutcome {
                                    next_band,
                                    convergence,
                                    converged: false,
                                };
                            }
                        }
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| panic::resume_unwind(payload)))
                .collect()
        });

        // Every worker reduced the same slots, so any outcome speaks for all.
        let (convergence, converged) = (outcomes[0].convergence, outcomes[0].converged);

        for ((band, band_lock), outcome) in bands.iter().zip(shared).zip(outcomes) {
            let range = band.start * cols..band.end * cols;

            current.data[range.clone()]
                .copy_from_slice(&band_lock.into_inner().unwrap_or_else(PoisonError::into_inner));
            next.data[range].copy_from_slice(&outcome.next_band);
        }

        if converged {
            Ok(convergence)
        } else {
            Err(JacobiError::IterationLimit {
                max_iterations: convergence.iterations,
                difmax: convergence.difmax,
            })
        }
    }
}
