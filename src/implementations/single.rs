use crate::grid::Grid;
use crate::implementations::{promote_row, relax_row, Relaxation};

/// Sequential reference: row-by-row sweep, measure and promotion fused in a
/// single pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleRelaxation;

impl Relaxation for SingleRelaxation {
    fn name(&self) -> &'static str {
        "single"
    }

    fn sweep(&self, current: &Grid, next: &mut Grid) {
        let cols = current.cols();
        let dst = next.interior_rows_mut();

        for (r, dst_row) in dst.chunks_mut(cols).enumerate() {
            let i = r + 1;
            relax_row(current.row(i - 1), current.row(i), current.row(i + 1), dst_row);
        }
    }

    fn measure(&self, current: &mut Grid, next: &Grid) -> f64 {
        let cols = current.cols();
        let src = next.interior_rows();

        current
            .interior_rows_mut()
            .chunks_mut(cols)
            .zip(src.chunks(cols))
            .map(|(cur_row, next_row)| promote_row(cur_row, next_row))
            .fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Boundary;

    #[test]
    fn single_cell_is_average_of_halo() {
        let mut current = Grid::with_boundary(1, 1, &Boundary::default()).unwrap();
        let mut next = Grid::zeros(1, 1).unwrap();

        SingleRelaxation.sweep(&current, &mut next);
        assert_eq!(next.get(1, 1), (30.0 + 50.0 + 40.0 + 90.0) / 4.0);

        let difmax = SingleRelaxation.measure(&mut current, &next);
        assert_eq!(difmax, 22.5);
        assert_eq!(current.get(1, 1), 52.5);
    }

    #[test]
    fn sweep_reads_only_pre_sweep_values() {
        let mut current = Grid::with_boundary(1, 3, &Boundary::uniform(0.0)).unwrap();
        let cols = current.cols();
        current.data[cols + 1] = 8.0;
        let mut next = Grid::zeros(1, 3).unwrap();

        SingleRelaxation.sweep(&current, &mut next);

        // An in-place update would have zeroed (1,1) before (1,2) read it.
        assert_eq!(next.interior(), vec![vec![0.0, 2.0, 0.0]]);
    }
}
