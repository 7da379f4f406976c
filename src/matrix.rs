//! Dense matrix over GF(2^8).
//!
//! Row-major, one flat `Vec<u8>` with stride `cols`, for locality and to
//! make `swap_rows` a cheap, local slice operation rather than juggling
//! per-row allocations.

use crate::{error::Error, galois};

/// A dense `rows x cols` matrix of GF(2^8) elements, stored row-major in one
/// contiguous buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<u8>,
}

impl Matrix {
    /// Creates a new `rows x cols` matrix filled with zeroes.
    ///
    /// # Panics
    ///
    /// Panics if `rows == 0` or `cols == 0`.
    pub fn zero(rows: usize, cols: usize) -> Self {
        assert!(rows > 0 && cols > 0, "matrix dimensions must be nonzero");
        Self {
            rows,
            cols,
            data: vec![0u8; rows * cols],
        }
    }

    /// Creates the `n x n` identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zero(n, n);
        for i in 0..n {
            m.set(i, i, 1);
        }
        m
    }

    /// Builds the `rows x cols` Vandermonde matrix over GF(2^8):
    /// `V[r][c] = generator^(r*c)`.
    pub fn vandermonde(rows: usize, cols: usize) -> Self {
        let mut m = Self::zero(rows, cols);
        for r in 0..rows {
            for c in 0..cols {
                let value = galois::exp(galois::generator(), (r * c) as u32);
                m.set(r, c, value);
            }
        }
        m
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), Error> {
        if row >= self.rows || col >= self.cols {
            Err(Error::RangeError {
                reason: format!(
                    "index ({}, {}) out of bounds for {}x{} matrix",
                    row, col, self.rows, self.cols
                ),
            })
        } else {
            Ok(())
        }
    }

    /// Returns the element at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if out of bounds. Use [`Matrix::try_get`] for a checked
    /// variant.
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.try_get(row, col).expect("matrix index out of bounds")
    }

    /// Checked element access.
    pub fn try_get(&self, row: usize, col: usize) -> Result<u8, Error> {
        self.check_bounds(row, col)?;
        Ok(self.data[row * self.cols + col])
    }

    /// Sets the element at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if out of bounds. Use [`Matrix::try_set`] for a checked
    /// variant.
    pub fn set(&mut self, row: usize, col: usize, value: u8) {
        self.try_set(row, col, value)
            .expect("matrix index out of bounds")
    }

    /// Checked element assignment.
    pub fn try_set(&mut self, row: usize, col: usize, value: u8) -> Result<(), Error> {
        self.check_bounds(row, col)?;
        self.data[row * self.cols + col] = value;
        Ok(())
    }

    /// Returns a fresh copy of row `row`, `cols` bytes long.
    pub fn row(&self, row: usize) -> Vec<u8> {
        self.data[row * self.cols..(row + 1) * self.cols].to_vec()
    }

    /// Returns a borrowed view of row `row`, `cols` bytes long.
    pub fn row_slice(&self, row: usize) -> &[u8] {
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Swaps rows `a` and `b` in place.
    pub fn swap_rows(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        let cols = self.cols;
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.data.split_at_mut(hi * cols);
        head[lo * cols..(lo + 1) * cols].swap_with_slice(&mut tail[..cols]);
    }

    /// Matrix multiplication `self * other`.
    ///
    /// `other.rows` must equal `self.cols`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, Error> {
        if self.cols != other.rows {
            return Err(Error::ShapeMismatch {
                expected: "other.rows == self.cols",
                got: format!(
                    "self is {}x{}, other is {}x{}",
                    self.rows, self.cols, other.rows, other.cols
                ),
            });
        }

        let mut result = Matrix::zero(self.rows, other.cols);
        for r in 0..self.rows {
            for c in 0..other.cols {
                let mut acc = 0u8;
                for i in 0..self.cols {
                    acc = galois::add(acc, galois::mul(self.get(r, i), other.get(i, c)));
                }
                result.set(r, c, acc);
            }
        }
        Ok(result)
    }

    /// Horizontal augmentation `[self | other]`.
    ///
    /// Both matrices must have the same row count.
    pub fn augment(&self, other: &Matrix) -> Result<Matrix, Error> {
        if self.rows != other.rows {
            return Err(Error::ShapeMismatch {
                expected: "equal row counts",
                got: format!("self has {} rows, other has {} rows", self.rows, other.rows),
            });
        }

        let mut result = Matrix::zero(self.rows, self.cols + other.cols);
        for r in 0..self.rows {
            for c in 0..self.cols {
                result.set(r, c, self.get(r, c));
            }
            for c in 0..other.cols {
                result.set(r, self.cols + c, other.get(r, c));
            }
        }
        Ok(result)
    }

    /// Extracts the half-open submatrix `[rmin..rmax, cmin..cmax)`.
    pub fn submatrix(
        &self,
        rmin: usize,
        cmin: usize,
        rmax: usize,
        cmax: usize,
    ) -> Result<Matrix, Error> {
        if rmin >= rmax || cmin >= cmax || rmax > self.rows || cmax > self.cols {
            return Err(Error::RangeError {
                reason: format!(
                    "submatrix range [{}..{}, {}..{}) invalid for {}x{} matrix",
                    rmin, rmax, cmin, cmax, self.rows, self.cols
                ),
            });
        }

        let mut result = Matrix::zero(rmax - rmin, cmax - cmin);
        for r in rmin..rmax {
            for c in cmin..cmax {
                result.set(r - rmin, c - cmin, self.get(r, c));
            }
        }
        Ok(result)
    }

    /// Inverts this matrix via Gauss-Jordan elimination over GF(2^8).
    ///
    /// Requires a square matrix. Fails with [`Error::Singular`] if rank is
    /// less than `n` (no pivot found for some column).
    pub fn invert(&self) -> Result<Matrix, Error> {
        if self.rows != self.cols {
            return Err(Error::ShapeMismatch {
                expected: "square matrix",
                got: format!("{}x{} matrix", self.rows, self.cols),
            });
        }

        let n = self.rows;
        let mut work = self.augment(&Matrix::identity(n))?;

        for r in 0..n {
            if work.get(r, r) == 0 {
                let mut found = false;
                for s in (r + 1)..n {
                    if work.get(s, r) != 0 {
                        work.swap_rows(r, s);
                        found = true;
                        break;
                    }
                }
                if !found {
                    return Err(Error::Singular);
                }
            }

            if work.get(r, r) != 1 {
                let scale = galois::div(1, work.get(r, r));
                for c in 0..work.cols {
                    let v = galois::mul(work.get(r, c), scale);
                    work.set(r, c, v);
                }
            }

            for s in (r + 1)..n {
                let factor = work.get(s, r);
                if factor != 0 {
                    add_scaled_row(&mut work, r, s, factor);
                }
            }
            for s in 0..r {
                let factor = work.get(s, r);
                if factor != 0 {
                    add_scaled_row(&mut work, r, s, factor);
                }
            }
        }

        work.submatrix(0, n, n, 2 * n)
    }
}

/// `row[dest] ^= factor * row[src]`, the Gauss-Jordan elimination step.
fn add_scaled_row(m: &mut Matrix, src: usize, dest: usize, factor: u8) {
    for c in 0..m.cols {
        let contribution = galois::mul(factor, m.get(src, c));
        let updated = galois::add(m.get(dest, c), contribution);
        m.set(dest, c, updated);
    }
}
