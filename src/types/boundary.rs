//! Per-axis boundary conditions for the relaxation kernel.

use std::fmt;

/// Boundary treatment along one axis of the solve plane.
///
/// | Variant | Edge cells |
/// |---------|------------|
/// | `Fixed` | Dirichlet: never touched by the kernel |
/// | `Periodic` | Solved like interior cells with wrapped neighbours |
/// | `Expanded` | Re-derived each sweep from the adjacent interior line |
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum BoundaryCondition {
    /// Dirichlet boundary; edge values are kept as given.
    #[default]
    Fixed,
    /// Wrap-around boundary; index -1 maps to n-1 and n to 0.
    Periodic,
    /// Zero normal gradient; edges copy their interior neighbours.
    Expanded,
}

impl BoundaryCondition {
    /// Whether the kernel solves the edge cells of this axis.
    #[inline]
    pub fn is_periodic(self) -> bool {
        matches!(self, Self::Periodic)
    }

    /// Whether the edge cells are re-derived every sweep.
    #[inline]
    pub fn is_expanded(self) -> bool {
        matches!(self, Self::Expanded)
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fixed => "fixed",
            Self::Periodic => "periodic",
            Self::Expanded => "expanded",
        };
        write!(f, "{}", name)
    }
}

/// Boundary conditions with named fields for each physical axis.
///
/// Eliminates index confusion between the physical axes and the
/// dim1/dim2 roles they take in a particular solve plane.
///
/// # Example
///
/// ```
/// use elliptic_rs::types::{AxisBoundaries, BoundaryCondition};
///
/// let bcs = AxisBoundaries::uniform(BoundaryCondition::Fixed)
///     .with_x(BoundaryCondition::Periodic);
///
/// assert_eq!(bcs.x, BoundaryCondition::Periodic);
/// assert_eq!(bcs.y, BoundaryCondition::Fixed);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AxisBoundaries {
    /// Zonal axis
    pub x: BoundaryCondition,
    /// Meridional axis
    pub y: BoundaryCondition,
    /// Vertical axis
    pub z: BoundaryCondition,
}

impl AxisBoundaries {
    /// Create with explicit values per axis.
    pub fn new(x: BoundaryCondition, y: BoundaryCondition, z: BoundaryCondition) -> Self {
        Self { x, y, z }
    }

    /// Create with the same value on all axes.
    pub fn uniform(bc: BoundaryCondition) -> Self {
        Self::new(bc, bc, bc)
    }

    /// Set the x-axis boundary condition.
    pub fn with_x(mut self, bc: BoundaryCondition) -> Self {
        self.x = bc;
        self
    }

    /// Set the y-axis boundary condition.
    pub fn with_y(mut self, bc: BoundaryCondition) -> Self {
        self.y = bc;
        self
    }

    /// Set the z-axis boundary condition.
    pub fn with_z(mut self, bc: BoundaryCondition) -> Self {
        self.z = bc;
        self
    }
}

impl fmt::Display for AxisBoundaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X:{} Y:{} Z:{}", self.x, self.y, self.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed() {
        assert_eq!(BoundaryCondition::default(), BoundaryCondition::Fixed);
        assert_eq!(
            AxisBoundaries::default(),
            AxisBoundaries::uniform(BoundaryCondition::Fixed)
        );
    }

    #[test]
    fn test_display() {
        let bcs = AxisBoundaries::new(
            BoundaryCondition::Periodic,
            BoundaryCondition::Expanded,
            BoundaryCondition::Fixed,
        );
        assert_eq!(bcs.to_string(), "X:periodic Y:expanded Z:fixed");
    }
}
