//! Dense row-major matrices of `f64`.
//!
//! `Matrix` is the only numeric container in the crate: weights, biases,
//! inputs, targets and losses are all matrices, with vectors represented as a
//! single column (`cols == 1`).
//!
//! Shape rules:
//! - `rows` and `cols` never change in place. Operations that produce a
//!   different shape (`transpose`, `downsample`, `to_vector`, ...) return a new
//!   matrix.
//! - Every binary operation validates shapes and returns
//!   [`Error::DimensionMismatch`] instead of coercing.
//! - Indexing with `m[(i, j)]` panics when out of bounds, like slice indexing.

use std::fmt;
use std::ops::{Index, IndexMut};

use rand::Rng;

use crate::matmul::gemm_f64;
use crate::{Activation, Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    /// Row-major storage, `data.len() == rows * cols`.
    data: Vec<f64>,
}

impl Matrix {
    /// Zero-filled `rows x cols` matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Build a matrix from a flat row-major buffer of length `rows * cols`.
    pub fn from_flat(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(Error::mismatch(
                "from_flat",
                (rows, cols),
                (values.len(), 1),
            ));
        }
        Ok(Self {
            rows,
            cols,
            data: values,
        })
    }

    /// Build a matrix from per-row values. All rows must have the same length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(rows.len() * cols);
        for row in rows {
            if row.len() != cols {
                return Err(Error::mismatch(
                    "from_rows",
                    (rows.len(), cols),
                    (1, row.len()),
                ));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Column vector holding `values`.
    pub fn vector(values: &[f64]) -> Self {
        Self {
            rows: values.len(),
            cols: 1,
            data: values.to_vec(),
        }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if the matrix has exactly one column.
    #[inline]
    pub fn is_vector(&self) -> bool {
        self.cols == 1
    }

    /// Row-major view of the elements.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self[(i, j)]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self[(i, j)] = value;
    }

    /// The `i`-th row. Panics if `i >= rows`.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// A copy of the `j`-th column. Panics if `j >= cols`.
    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self[(i, j)]).collect()
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Fill every cell with an independent uniform sample in `[lo, hi)`.
    pub fn randomize_uniform<R: Rng + ?Sized>(
        &mut self,
        lo: f64,
        hi: f64,
        rng: &mut R,
    ) -> Result<()> {
        if !(lo.is_finite() && hi.is_finite() && lo < hi) {
            return Err(Error::InvalidConfig(format!(
                "uniform range must be finite with lo < hi, got [{lo}, {hi})"
            )));
        }
        for v in &mut self.data {
            *v = rng.gen_range(lo..hi);
        }
        Ok(())
    }

    /// Weight initialisation: uniform in `[-1, 1)`.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for v in &mut self.data {
            *v = rng.gen_range(-1.0..1.0);
        }
    }

    pub fn add_scalar(&mut self, x: f64) {
        for v in &mut self.data {
            *v += x;
        }
    }

    pub fn subtract_scalar(&mut self, x: f64) {
        for v in &mut self.data {
            *v -= x;
        }
    }

    /// Element-wise `self += other`.
    pub fn add(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape("add", other)?;
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a += b;
        }
        Ok(())
    }

    /// Element-wise `a - b`, shaped like the operands.
    pub fn subtract(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        a.check_same_shape("subtract", b)?;
        let data = a.data.iter().zip(&b.data).map(|(&x, &y)| x - y).collect();
        Ok(Matrix {
            rows: a.rows,
            cols: a.cols,
            data,
        })
    }

    /// Multiply every element by `x`.
    pub fn scale(&mut self, x: f64) {
        for v in &mut self.data {
            *v *= x;
        }
    }

    /// Element-wise product `self *= other`.
    pub fn hadamard(&mut self, other: &Matrix) -> Result<()> {
        self.check_same_shape("hadamard", other)?;
        for (a, &b) in self.data.iter_mut().zip(&other.data) {
            *a *= b;
        }
        Ok(())
    }

    /// Matrix product `a * b`; requires `a.cols == b.rows`.
    pub fn matmul(a: &Matrix, b: &Matrix) -> Result<Matrix> {
        if a.cols != b.rows {
            return Err(Error::mismatch("matmul", a.shape(), b.shape()));
        }
        let mut out = Matrix::zeros(a.rows, b.cols);
        gemm_f64(a.rows, b.cols, a.cols, &a.data, &b.data, &mut out.data);
        Ok(out)
    }

    /// New matrix with `(i, j) -> (j, i)`.
    pub fn transpose(&self) -> Matrix {
        let mut out = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                out.data[j * self.rows + i] = self.data[i * self.cols + j];
            }
        }
        out
    }

    pub fn transpose_in_place(&mut self) {
        *self = self.transpose();
    }

    /// Apply `act` to every element.
    pub fn activate(&mut self, act: Activation) {
        for v in &mut self.data {
            *v = act.forward(*v);
        }
    }

    /// Apply the derivative of `act` to every element.
    ///
    /// The current values are taken to be already-activated outputs, so this is
    /// meant to run on a copy of a cached forward-pass result.
    pub fn activate_derivative(&mut self, act: Activation) {
        for v in &mut self.data {
            *v = act.derivative(*v);
        }
    }

    /// Largest element, or `-inf` for an empty matrix.
    pub fn max_value(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Index of the largest element of a column vector; ties go to the first.
    pub fn argmax_column(&self) -> Result<usize> {
        self.check_vector()?;
        let Some((&first, rest)) = self.data.split_first() else {
            return Err(Error::InvalidData("argmax of an empty vector".to_owned()));
        };

        let mut best = 0;
        let mut max = first;
        for (i, &v) in rest.iter().enumerate() {
            if v > max {
                max = v;
                best = i + 1;
            }
        }
        Ok(best)
    }

    /// Divide every element by the largest element.
    ///
    /// This is the maximum *value*, not the maximum magnitude: a matrix with
    /// only negative values ends up outside `[0, 1]`.
    pub fn normalize(&mut self) {
        let max = self.max_value();
        for v in &mut self.data {
            *v /= max;
        }
    }

    /// Keep every `stride`-th row and column, starting at index 0.
    ///
    /// The result is `(rows / stride) x (cols / stride)`.
    pub fn downsample(&self, stride: usize) -> Result<Matrix> {
        check_stride(stride)?;
        let mut out = Matrix::zeros(self.rows / stride, self.cols / stride);
        for i in 0..out.rows {
            for j in 0..out.cols {
                out[(i, j)] = self[(i * stride, j * stride)];
            }
        }
        Ok(out)
    }

    /// Keep every `stride`-th element of a column vector.
    pub fn downsample_vector(&self, stride: usize) -> Result<Matrix> {
        self.check_vector()?;
        check_stride(stride)?;
        let data = self.data.iter().step_by(stride).take(self.rows / stride).copied().collect();
        Ok(Matrix {
            rows: self.rows / stride,
            cols: 1,
            data,
        })
    }

    /// Vector variant for column vectors, 2-D variant otherwise.
    pub fn downsample_auto(&self, stride: usize) -> Result<Matrix> {
        if self.is_vector() {
            self.downsample_vector(stride)
        } else {
            self.downsample(stride)
        }
    }

    /// Flatten row-major into a `len x 1` column vector.
    pub fn to_vector(&self) -> Matrix {
        Matrix {
            rows: self.data.len(),
            cols: 1,
            data: self.data.clone(),
        }
    }

    /// Inverse of [`Matrix::to_vector`]: lay a column vector out as `rows x cols`.
    pub fn reshape_vector(&self, rows: usize, cols: usize) -> Result<Matrix> {
        self.check_vector()?;
        Matrix::from_flat(rows, cols, self.data.clone())
    }

    /// Sum of squares of the first column. Zero when there are no columns.
    pub fn squared_sum(&self) -> f64 {
        if self.cols == 0 {
            return 0.0;
        }
        self.data.iter().step_by(self.cols).map(|v| v.powi(2)).sum()
    }

    /// Comma-separated row-major values.
    ///
    /// Values are written with the shortest representation that parses back to
    /// the same `f64`, so `parse_flat_line` restores the matrix exactly.
    pub fn to_flat_line(&self) -> String {
        let mut line = String::with_capacity(self.data.len() * 8);
        for (i, v) in self.data.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(&format!("{v:?}"));
        }
        line
    }

    /// Parse a comma-separated line into a `rows x cols` matrix (row-major).
    pub fn parse_flat_line(rows: usize, cols: usize, line: &str) -> Result<Matrix> {
        Matrix::from_flat(rows, cols, parse_values(line)?)
    }

    fn check_same_shape(&self, op: &'static str, other: &Matrix) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::mismatch(op, self.shape(), other.shape()));
        }
        Ok(())
    }

    fn check_vector(&self) -> Result<()> {
        if !self.is_vector() {
            return Err(Error::NotAVector {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }
}

/// Parse a comma-separated list of decimal values.
pub(crate) fn parse_values(line: &str) -> Result<Vec<f64>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Vec::new());
    }
    line.split(',')
        .map(|s| {
            let s = s.trim();
            s.parse::<f64>()
                .map_err(|e| Error::Parse(format!("invalid number {s:?}: {e}")))
        })
        .collect()
}

fn check_stride(stride: usize) -> Result<()> {
    if stride == 0 {
        return Err(Error::InvalidConfig("downsample stride must be > 0".to_owned()));
    }
    Ok(())
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{}",
            self.rows,
            self.cols
        );
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f64 {
        assert!(
            i < self.rows && j < self.cols,
            "index ({i}, {j}) out of bounds for {}x{}",
            self.rows,
            self.cols
        );
        &mut self.data[i * self.cols + j]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            for v in self.row(i) {
                write!(f, "{v:.4}\t")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
