//! Dense 2D slice storage.

use std::ops::{Index, IndexMut};

/// Dense 2D plane of one field, indexed `[j][i]` (dim2 row, dim1 column).
///
/// Stores values in a contiguous row-major array with layout [n2, n1],
/// so a relaxation sweep walks memory in order.
#[derive(Clone, Debug, PartialEq)]
pub struct SliceBuffer {
    /// Values, stored as data[j * n1 + i]
    pub data: Vec<f64>,
    /// Number of points along dim1 (fast axis)
    pub n1: usize,
    /// Number of points along dim2 (slow axis)
    pub n2: usize,
}

impl SliceBuffer {
    /// Create a slice initialized to zero.
    pub fn new(n2: usize, n1: usize) -> Self {
        Self::filled(n2, n1, 0.0)
    }

    /// Create a slice with every value set to `value`.
    pub fn filled(n2: usize, n1: usize, value: f64) -> Self {
        Self {
            data: vec![value; n1 * n2],
            n1,
            n2,
        }
    }

    /// Create a slice from a row-major vector.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != n1 * n2`.
    pub fn from_vec(n2: usize, n1: usize, data: Vec<f64>) -> Self {
        assert_eq!(data.len(), n1 * n2, "slice data has wrong length");
        Self { data, n1, n2 }
    }

    /// Create a slice by evaluating `f(j, i)` at every point.
    pub fn from_fn<F>(n2: usize, n1: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(n1 * n2);
        for j in 0..n2 {
            for i in 0..n1 {
                data.push(f(j, i));
            }
        }
        Self { data, n1, n2 }
    }

    /// Shape as (n2, n1).
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.n2, self.n1)
    }

    /// Value at row j, column i.
    #[inline]
    pub fn get(&self, j: usize, i: usize) -> f64 {
        self.data[j * self.n1 + i]
    }

    /// Set the value at row j, column i.
    #[inline]
    pub fn set(&mut self, j: usize, i: usize, value: f64) {
        self.data[j * self.n1 + i] = value;
    }

    /// Row j as a slice.
    pub fn row(&self, j: usize) -> &[f64] {
        let start = j * self.n1;
        &self.data[start..start + self.n1]
    }

    /// Mutable row j.
    pub fn row_mut(&mut self, j: usize) -> &mut [f64] {
        let start = j * self.n1;
        &mut self.data[start..start + self.n1]
    }

    /// Mean absolute value over points not equal to `undefined`.
    ///
    /// Returns 0 when every point is undefined. NaN propagates.
    pub fn mean_abs(&self, undefined: f64) -> f64 {
        let mut sum = 0.0;
        let mut count = 0usize;
        for &v in &self.data {
            if v != undefined {
                sum += v.abs();
                count += 1;
            }
        }
        if count == 0 { 0.0 } else { sum / count as f64 }
    }

    /// Maximum absolute difference to another slice of the same shape.
    pub fn max_abs_diff(&self, other: &SliceBuffer) -> f64 {
        assert_eq!(self.shape(), other.shape());
        self.data
            .iter()
            .zip(other.data.iter())
            .fold(0.0_f64, |m, (a, b)| m.max((a - b).abs()))
    }
}

impl Index<(usize, usize)> for SliceBuffer {
    type Output = f64;

    #[inline]
    fn index(&self, (j, i): (usize, usize)) -> &f64 {
        &self.data[j * self.n1 + i]
    }
}

impl IndexMut<(usize, usize)> for SliceBuffer {
    #[inline]
    fn index_mut(&mut self, (j, i): (usize, usize)) -> &mut f64 {
        &mut self.data[j * self.n1 + i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_major_layout() {
        let s = SliceBuffer::from_fn(2, 3, |j, i| (10 * j + i) as f64);
        assert_eq!(s.data, vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]);
        assert_eq!(s.row(1), &[10.0, 11.0, 12.0]);
        assert_eq!(s[(1, 2)], 12.0);
    }

    #[test]
    fn test_mean_abs_skips_undefined() {
        let undef = -999.0;
        let s = SliceBuffer::from_vec(1, 4, vec![1.0, -3.0, undef, undef]);
        assert_eq!(s.mean_abs(undef), 2.0);

        let all_undef = SliceBuffer::filled(2, 2, undef);
        assert_eq!(all_undef.mean_abs(undef), 0.0);
    }

    #[test]
    fn test_mean_abs_propagates_nan() {
        let s = SliceBuffer::from_vec(1, 2, vec![1.0, f64::NAN]);
        assert!(s.mean_abs(-999.0).is_nan());
    }
}
