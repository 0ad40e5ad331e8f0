//! Slice identities and plane extraction/scatter.

use std::fmt;

use crate::types::{ColumnIndex, DimensionCombination, Extents4D, LevelIndex, TimeIndex};

use super::{Field, SliceBuffer};

/// Identity of one independent 2D sub-problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SliceId {
    /// XY plane at a (time, level) pair.
    Horizontal { time: TimeIndex, level: LevelIndex },
    /// YZ plane at a (time, x) pair.
    Meridional { time: TimeIndex, column: ColumnIndex },
}

impl SliceId {
    /// Horizontal slice at (time, level).
    pub fn horizontal(time: TimeIndex, level: LevelIndex) -> Self {
        Self::Horizontal { time, level }
    }

    /// Meridional slice at (time, x).
    pub fn meridional(time: TimeIndex, column: ColumnIndex) -> Self {
        Self::Meridional { time, column }
    }

    /// All slices of a field in submission order: time outer, then level
    /// (XY) or x column (YZ).
    pub fn enumerate(combination: DimensionCombination, extents: Extents4D) -> Vec<SliceId> {
        let mut ids = Vec::new();
        for time in TimeIndex::iter(extents.nt()) {
            match combination {
                DimensionCombination::XY => {
                    ids.extend(LevelIndex::iter(extents.nz()).map(|level| Self::horizontal(time, level)))
                }
                DimensionCombination::YZ => ids.extend(
                    ColumnIndex::iter(extents.nx()).map(|column| Self::meridional(time, column)),
                ),
            }
        }
        ids
    }

    /// Time index of the slice.
    pub fn time(&self) -> TimeIndex {
        match *self {
            Self::Horizontal { time, .. } | Self::Meridional { time, .. } => time,
        }
    }

    /// Human-readable label in dataset coordinates, shifted by a field's
    /// sub-range origin (t, z, y, x).
    pub fn label(&self, origin: [usize; 4]) -> String {
        match *self {
            Self::Horizontal { time, level } => {
                format!("t={} z={}", time.get() + origin[0], level.get() + origin[1])
            }
            Self::Meridional { time, column } => {
                format!("t={} x={}", time.get() + origin[0], column.get() + origin[3])
            }
        }
    }
}

impl fmt::Display for SliceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Horizontal { time, level } => write!(f, "({}, {})", time, level),
            Self::Meridional { time, column } => write!(f, "({}, {})", time, column),
        }
    }
}

impl Field {
    /// Whether the plane for `combination` is one contiguous run of storage.
    pub fn plane_is_contiguous(&self, combination: DimensionCombination) -> bool {
        combination == DimensionCombination::XY && !self.major_axis_is_time
    }

    /// Copy the plane of `id` into a fresh slice buffer.
    pub fn extract(&self, id: SliceId) -> SliceBuffer {
        let (_, nz, ny, nx) = self.extents.as_tuple();
        match id {
            SliceId::Horizontal { time, level } => {
                let (t, z) = (time.get(), level.get());
                if self.plane_is_contiguous(DimensionCombination::XY) {
                    let start = self.offset(t, z, 0, 0);
                    SliceBuffer::from_vec(ny, nx, self.data[start..start + ny * nx].to_vec())
                } else {
                    SliceBuffer::from_fn(ny, nx, |y, x| self.get(t, z, y, x))
                }
            }
            SliceId::Meridional { time, column } => {
                let (t, x) = (time.get(), column.get());
                SliceBuffer::from_fn(nz, ny, |z, y| self.get(t, z, y, x))
            }
        }
    }

    /// Write a solved slice back into the plane of `id`.
    ///
    /// # Panics
    ///
    /// Panics if the buffer shape does not match the plane.
    pub fn scatter(&mut self, id: SliceId, buf: &SliceBuffer) {
        let (_, nz, ny, nx) = self.extents.as_tuple();
        match id {
            SliceId::Horizontal { time, level } => {
                assert_eq!(buf.shape(), (ny, nx), "slice shape does not match XY plane");
                let (t, z) = (time.get(), level.get());
                if self.plane_is_contiguous(DimensionCombination::XY) {
                    let start = self.offset(t, z, 0, 0);
                    self.data[start..start + ny * nx].copy_from_slice(&buf.data);
                } else {
                    for y in 0..ny {
                        for x in 0..nx {
                            self.set(t, z, y, x, buf[(y, x)]);
                        }
                    }
                }
            }
            SliceId::Meridional { time, column } => {
                assert_eq!(buf.shape(), (nz, ny), "slice shape does not match YZ plane");
                let (t, x) = (time.get(), column.get());
                for z in 0..nz {
                    for y in 0..ny {
                        self.set(t, z, y, x, buf[(z, y)]);
                    }
                }
            }
        }
    }
}
