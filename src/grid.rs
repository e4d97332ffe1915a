use std::fmt;

use serde::Deserialize;

use crate::error::{JacobiError, Result};

/// Fixed halo temperatures plus the bulk fill value.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Boundary {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    /// Initial interior value. Halo corners keep it too.
    pub fill: f64,
}

impl Default for Boundary {
    fn default() -> Self {
        Boundary {
            left: 40.0,
            right: 90.0,
            top: 30.0,
            bottom: 50.0,
            fill: 30.0,
        }
    }
}

impl Boundary {
    pub fn uniform(value: f64) -> Self {
        Boundary {
            left: value,
            right: value,
            top: value,
            bottom: value,
            fill: value,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let sides = [
            ("left", self.left),
            ("right", self.right),
            ("top", self.top),
            ("bottom", self.bottom),
            ("fill", self.fill),
        ];
        for (side, value) in sides {
            if !value.is_finite() {
                return Err(JacobiError::InvalidBoundary { side, value });
            }
        }
        Ok(())
    }
}

/// Temperature field of `(m+2) x (n+2)` cells stored row-major.
///
/// Rows `1..=m` and columns `1..=n` are interior; row 0, row m+1,
/// column 0 and column n+1 form the halo.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    m: usize,
    n: usize,
    pub data: Vec<f64>,
}

fn allocate(m: usize, n: usize, value: f64) -> Result<Vec<f64>> {
    let cells = m
        .checked_add(2)
        .zip(n.checked_add(2))
        .and_then(|(rows, cols)| rows.checked_mul(cols))
        .ok_or(JacobiError::Allocation { cells: usize::MAX })?;

    let mut data = Vec::new();
    data.try_reserve_exact(cells)
        .map_err(|_| JacobiError::Allocation { cells })?;
    data.resize(cells, value);
    Ok(data)
}

impl Grid {
    /// Zero-filled grid, used for the `next` buffer.
    pub fn zeros(m: usize, n: usize) -> Result<Self> {
        Self::filled(m, n, 0.0)
    }

    pub fn filled(m: usize, n: usize, value: f64) -> Result<Self> {
        if m == 0 || n == 0 {
            return Err(JacobiError::InvalidDimensions { m, n });
        }
        Ok(Grid {
            m,
            n,
            data: allocate(m, n, value)?,
        })
    }

    /// Fills the whole grid with `boundary.fill`, then writes the four halo
    /// edges. Corners are left at the fill value.
    pub fn with_boundary(m: usize, n: usize, boundary: &Boundary) -> Result<Self> {
        let mut grid = Self::filled(m, n, boundary.fill)?;
        let cols = grid.cols();

        for i in 1..=m {
            grid.data[i * cols] = boundary.left;
            grid.data[i * cols + n + 1] = boundary.right;
        }
        for j in 1..=n {
            grid.data[j] = boundary.top;
            grid.data[(m + 1) * cols + j] = boundary.bottom;
        }
        Ok(grid)
    }

    /// Interior row count.
    pub fn m(&self) -> usize {
        self.m
    }

    /// Interior column count.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn rows(&self) -> usize {
        self.m + 2
    }

    pub fn cols(&self) -> usize {
        self.n + 2
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols() + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        let cols = self.cols();
        &self.data[i * cols..(i + 1) * cols]
    }

    /// Rows `1..=m` as one contiguous slice.
    pub fn interior_rows(&self) -> &[f64] {
        let cols = self.cols();
        &self.data[cols..(self.m + 1) * cols]
    }

    pub fn interior_rows_mut(&mut self) -> &mut [f64] {
        let cols = self.cols();
        &mut self.data[cols..(self.m + 1) * cols]
    }

    /// Interior block as nested rows, handy for inspection and tests.
    pub fn interior(&self) -> Vec<Vec<f64>> {
        (1..=self.m)
            .map(|i| self.row(i)[1..=self.n].to_vec())
            .collect()
    }

    pub fn same_shape(&self, other: &Grid) -> bool {
        self.m == other.m && self.n == other.n
    }
}

/// One row per line, values separated by a single space, halo included.
impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows() {
            let row = self.row(i);
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", value)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn halo_layout_matches_reference_boundary() {
        let grid = Grid::with_boundary(3, 4, &Boundary::default()).unwrap();
        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.cols(), 6);

        for i in 1..=3 {
            assert_eq!(grid.get(i, 0), 40.0);
            assert_eq!(grid.get(i, 5), 90.0);
        }
        for j in 1..=4 {
            assert_eq!(grid.get(0, j), 30.0);
            assert_eq!(grid.get(4, j), 50.0);
        }
        for i in 1..=3 {
            for j in 1..=4 {
                assert_eq!(grid.get(i, j), 30.0);
            }
        }
    }

    #[test]
    fn corners_keep_fill_value() {
        let boundary = Boundary {
            left: 1.0,
            right: 2.0,
            top: 3.0,
            bottom: 4.0,
            fill: 7.5,
        };
        let grid = Grid::with_boundary(2, 2, &boundary).unwrap();
        assert_eq!(grid.get(0, 0), 7.5);
        assert_eq!(grid.get(0, 3), 7.5);
        assert_eq!(grid.get(3, 0), 7.5);
        assert_eq!(grid.get(3, 3), 7.5);
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Grid::zeros(0, 4),
            Err(JacobiError::InvalidDimensions { m: 0, n: 4 })
        ));
        assert!(matches!(
            Grid::zeros(4, 0),
            Err(JacobiError::InvalidDimensions { m: 4, n: 0 })
        ));
    }

    #[test]
    fn overflowing_dimensions_are_an_allocation_error() {
        assert!(matches!(
            Grid::zeros(usize::MAX, 2),
            Err(JacobiError::Allocation { .. })
        ));
        assert!(matches!(
            Grid::zeros(usize::MAX / 4, usize::MAX / 4),
            Err(JacobiError::Allocation { .. })
        ));
    }

    #[test]
    fn interior_rows_skip_halo_rows() {
        let grid = Grid::with_boundary(2, 3, &Boundary::default()).unwrap();
        let interior = grid.interior_rows();
        assert_eq!(interior.len(), 2 * 5);
        assert_eq!(interior[0], 40.0);
        assert_eq!(interior[4], 90.0);
    }

    #[test]
    fn non_finite_boundary_is_rejected() {
        let boundary = Boundary {
            top: f64::NAN,
            ..Boundary::default()
        };
        assert!(matches!(
            boundary.validate(),
            Err(JacobiError::InvalidBoundary { side: "top", .. })
        ));
        assert!(Boundary::default().validate().is_ok());
    }

    #[test]
    fn display_prints_one_line_per_row() {
        let grid = Grid::with_boundary(1, 1, &Boundary::default()).unwrap();
        let text = grid.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["30 30 30", "40 30 90", "30 50 30"]);
    }
}
