//! Solve-plane selection and the dim1/dim2 axis descriptors.
//!
//! A [`DimensionCombination`] names the two physical axes forming the
//! solve plane. Together with the per-axis spacing and boundary
//! conditions it resolves once into an [`AxisPair`], so the relaxation
//! kernel only ever sees an abstract fast axis (dim1) and slow axis
//! (dim2).

use std::fmt;

use crate::error::{EllipticError, Result};

use super::{AxisBoundaries, BoundaryCondition, Extents4D};

/// Which two physical axes form the 2D solve plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DimensionCombination {
    /// Horizontal plane: dim1 = x, dim2 = y; one slice per (time, level).
    XY,
    /// Meridional plane: dim1 = y, dim2 = z; one slice per (time, x).
    YZ,
}

impl fmt::Display for DimensionCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::XY => write!(f, "XY"),
            Self::YZ => write!(f, "YZ"),
        }
    }
}

/// Uniform physical grid spacing along each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpacing {
    /// Zonal spacing
    pub dx: f64,
    /// Meridional spacing
    pub dy: f64,
    /// Vertical spacing
    pub dz: f64,
}

impl Default for GridSpacing {
    fn default() -> Self {
        Self::uniform(1.0)
    }
}

impl GridSpacing {
    /// Create with explicit spacings.
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Same spacing along every axis.
    pub fn uniform(d: f64) -> Self {
        Self::new(d, d, d)
    }

    /// Check that every spacing is positive and finite.
    pub fn validate(&self) -> Result<()> {
        for (axis, value) in [("x", self.dx), ("y", self.dy), ("z", self.dz)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(EllipticError::InvalidSpacing { axis, value });
            }
        }
        Ok(())
    }
}

/// One axis of the solve plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisDescriptor {
    /// Physical axis name ("x", "y" or "z")
    pub name: &'static str,
    /// Number of grid points along the axis
    pub count: usize,
    /// Physical spacing between grid points
    pub spacing: f64,
    /// Boundary treatment
    pub bc: BoundaryCondition,
}

impl AxisDescriptor {
    /// Index of the previous point, wrapping when periodic.
    ///
    /// Only meaningful for `i == 0` on a periodic axis; interior
    /// indices simply step back.
    #[inline]
    pub fn prev(&self, i: usize) -> usize {
        if i == 0 { self.count - 1 } else { i - 1 }
    }

    /// Index of the next point, wrapping when periodic.
    #[inline]
    pub fn next(&self, i: usize) -> usize {
        if i + 1 == self.count { 0 } else { i + 1 }
    }

    /// Index of the last point.
    #[inline]
    pub fn last(&self) -> usize {
        self.count - 1
    }
}

/// The (dim1, dim2) axes of a solve plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisPair {
    /// Fast axis (columns of a slice buffer)
    pub dim1: AxisDescriptor,
    /// Slow axis (rows of a slice buffer)
    pub dim2: AxisDescriptor,
}

impl AxisPair {
    /// Build the axis pair for a plane directly.
    pub fn new(dim1: AxisDescriptor, dim2: AxisDescriptor) -> Self {
        Self { dim1, dim2 }
    }

    /// Resolve the physical axes for a dimension combination.
    ///
    /// # Example
    ///
    /// ```
    /// use elliptic_rs::types::{
    ///     AxisBoundaries, AxisPair, BoundaryCondition, DimensionCombination, Extents4D,
    ///     GridSpacing,
    /// };
    ///
    /// let axes = AxisPair::resolve(
    ///     DimensionCombination::YZ,
    ///     Extents4D::new(1, 5, 8, 3),
    ///     GridSpacing::new(1.0, 2.0, 3.0),
    ///     AxisBoundaries::uniform(BoundaryCondition::Fixed),
    /// );
    /// assert_eq!(axes.dim1.name, "y");
    /// assert_eq!(axes.dim1.count, 8);
    /// assert_eq!(axes.dim2.spacing, 3.0);
    /// ```
    pub fn resolve(
        combination: DimensionCombination,
        extents: Extents4D,
        spacing: GridSpacing,
        bcs: AxisBoundaries,
    ) -> Self {
        let x = AxisDescriptor {
            name: "x",
            count: extents.nx(),
            spacing: spacing.dx,
            bc: bcs.x,
        };
        let y = AxisDescriptor {
            name: "y",
            count: extents.ny(),
            spacing: spacing.dy,
            bc: bcs.y,
        };
        let z = AxisDescriptor {
            name: "z",
            count: extents.nz(),
            spacing: spacing.dz,
            bc: bcs.z,
        };

        match combination {
            DimensionCombination::XY => Self::new(x, y),
            DimensionCombination::YZ => Self::new(y, z),
        }
    }

    /// Squared spacing ratio (Δ1/Δ2)² used to scale dim2 differences.
    #[inline]
    pub fn spacing_ratio_sq(&self) -> f64 {
        let r = self.dim1.spacing / self.dim2.spacing;
        r * r
    }
}
