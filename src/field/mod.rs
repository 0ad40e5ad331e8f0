//! 4D field storage and slice extraction.
//!
//! A [`Field`] holds values on a (time, level, y, x) grid with one of two
//! storage orders:
//!
//! | `major_axis_is_time` | Layout | Contiguous plane |
//! |----------------------|--------|------------------|
//! | `false` | `[t][z][y][x]` | XY |
//! | `true` | `[z][y][x][t]` | none |
//!
//! Each field carries an `undefined` sentinel; grid points holding it are
//! never computed by the solvers.
//!
//! # Example
//!
//! ```
//! use elliptic_rs::field::{Field, SliceId};
//! use elliptic_rs::types::{Extents4D, LevelIndex, TimeIndex};
//!
//! let ext = Extents4D::new(2, 1, 3, 4);
//! let f = Field::from_fn("u", ext, false, |t, _z, y, x| (100 * t + 10 * y + x) as f64);
//!
//! let id = SliceId::horizontal(TimeIndex::new(1), LevelIndex::new(0));
//! let plane = f.extract(id);
//! assert_eq!(plane.shape(), (3, 4));
//! assert_eq!(plane[(2, 3)], 123.0);
//! ```

mod plane;
mod slice;

pub use plane::SliceId;
pub use slice::SliceBuffer;

use crate::error::{EllipticError, Result};
use crate::types::Extents4D;

/// Default sentinel marking missing values.
pub const DEFAULT_UNDEFINED: f64 = -9.99e8;

/// Values on a 4D (time, level, y, x) grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    /// Short name used in error and progress messages
    name: String,
    /// Raw values in the layout selected by `major_axis_is_time`
    data: Vec<f64>,
    /// Grid extents
    extents: Extents4D,
    /// Time is the fastest-varying storage axis
    major_axis_is_time: bool,
    /// Missing-value sentinel
    undefined: f64,
    /// Start offsets (t, z, y, x) of this field within a larger dataset
    origin: [usize; 4],
}

impl Field {
    /// Create a field initialized to zero.
    pub fn new(name: impl Into<String>, extents: Extents4D, major_axis_is_time: bool) -> Self {
        Self::filled(name, extents, major_axis_is_time, 0.0)
    }

    /// Create a field with every value set to `value`.
    pub fn filled(
        name: impl Into<String>,
        extents: Extents4D,
        major_axis_is_time: bool,
        value: f64,
    ) -> Self {
        Self {
            name: name.into(),
            data: vec![value; extents.total_points()],
            extents,
            major_axis_is_time,
            undefined: DEFAULT_UNDEFINED,
            origin: [0; 4],
        }
    }

    /// Create a field by evaluating `f(t, z, y, x)` at every point.
    pub fn from_fn<F>(
        name: impl Into<String>,
        extents: Extents4D,
        major_axis_is_time: bool,
        f: F,
    ) -> Self
    where
        F: Fn(usize, usize, usize, usize) -> f64,
    {
        let mut field = Self::new(name, extents, major_axis_is_time);
        let (nt, nz, ny, nx) = extents.as_tuple();
        for t in 0..nt {
            for z in 0..nz {
                for y in 0..ny {
                    for x in 0..nx {
                        field.set(t, z, y, x, f(t, z, y, x));
                    }
                }
            }
        }
        field
    }

    /// Set the missing-value sentinel.
    pub fn with_undefined(mut self, undefined: f64) -> Self {
        self.undefined = undefined;
        self
    }

    /// Set the sub-range start offsets (t, z, y, x).
    pub fn with_origin(mut self, t: usize, z: usize, y: usize, x: usize) -> Self {
        self.origin = [t, z, y, x];
        self
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Grid extents.
    #[inline]
    pub fn extents(&self) -> Extents4D {
        self.extents
    }

    /// Whether time is the fastest-varying storage axis.
    #[inline]
    pub fn major_axis_is_time(&self) -> bool {
        self.major_axis_is_time
    }

    /// Missing-value sentinel.
    #[inline]
    pub fn undefined(&self) -> f64 {
        self.undefined
    }

    /// Replace the missing-value sentinel.
    pub fn set_undefined(&mut self, undefined: f64) {
        self.undefined = undefined;
    }

    /// Sub-range start offsets (t, z, y, x).
    pub fn origin(&self) -> [usize; 4] {
        self.origin
    }

    /// Raw storage.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable raw storage.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Linear storage index of (t, z, y, x).
    #[inline]
    pub fn offset(&self, t: usize, z: usize, y: usize, x: usize) -> usize {
        let (nt, nz, ny, nx) = self.extents.as_tuple();
        if self.major_axis_is_time {
            ((z * ny + y) * nx + x) * nt + t
        } else {
            ((t * nz + z) * ny + y) * nx + x
        }
    }

    /// Value at (t, z, y, x).
    #[inline]
    pub fn get(&self, t: usize, z: usize, y: usize, x: usize) -> f64 {
        self.data[self.offset(t, z, y, x)]
    }

    /// Set the value at (t, z, y, x).
    #[inline]
    pub fn set(&mut self, t: usize, z: usize, y: usize, x: usize, value: f64) {
        let idx = self.offset(t, z, y, x);
        self.data[idx] = value;
    }

    /// Check that `other` can take part in a solve alongside `self`.
    ///
    /// Extents, storage order and the undefined sentinel must all match,
    /// since the solvers test every operand against one sentinel.
    pub fn check_compatible(&self, role: &'static str, other: &Field) -> Result<()> {
        if other.extents != self.extents {
            return Err(EllipticError::extent_mismatch(
                role,
                self.extents,
                other.extents,
            ));
        }
        if other.major_axis_is_time != self.major_axis_is_time {
            return Err(EllipticError::AxisOrderMismatch(role));
        }
        if other.undefined.to_bits() != self.undefined.to_bits() {
            return Err(EllipticError::UndefinedMismatch {
                field: role,
                expected: self.undefined,
                actual: other.undefined,
            });
        }
        Ok(())
    }
}
