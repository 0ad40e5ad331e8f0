//! 4D field extents.

use std::fmt;

/// Extents of a 4D field (time, level, y, x).
///
/// Provides a strongly-typed way to carry the four counts together,
/// preventing mix-ups between the outer and plane axes.
///
/// # Example
///
/// ```
/// use elliptic_rs::types::Extents4D;
///
/// let ext = Extents4D::new(2, 3, 10, 20);
/// assert_eq!(ext.nt(), 2);
/// assert_eq!(ext.nx(), 20);
/// assert_eq!(ext.total_points(), 1200);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extents4D {
    /// Number of time records
    nt: usize,
    /// Number of vertical levels
    nz: usize,
    /// Number of points in y-direction
    ny: usize,
    /// Number of points in x-direction
    nx: usize,
}

impl Extents4D {
    /// Create a new extents specification.
    ///
    /// # Panics
    ///
    /// Panics if any count is zero.
    pub fn new(nt: usize, nz: usize, ny: usize, nx: usize) -> Self {
        assert!(nt > 0, "nt must be positive, got {}", nt);
        assert!(nz > 0, "nz must be positive, got {}", nz);
        assert!(ny > 0, "ny must be positive, got {}", ny);
        assert!(nx > 0, "nx must be positive, got {}", nx);
        Self { nt, nz, ny, nx }
    }

    /// Extents of a single horizontal plane (one time, one level).
    pub fn plane(ny: usize, nx: usize) -> Self {
        Self::new(1, 1, ny, nx)
    }

    /// Number of time records.
    #[inline]
    pub fn nt(&self) -> usize {
        self.nt
    }

    /// Number of vertical levels.
    #[inline]
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// Number of points in y-direction.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Number of points in x-direction.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Total number of grid points.
    #[inline]
    pub fn total_points(&self) -> usize {
        self.nt * self.nz * self.ny * self.nx
    }

    /// Return as tuple (nt, nz, ny, nx).
    #[inline]
    pub fn as_tuple(&self) -> (usize, usize, usize, usize) {
        (self.nt, self.nz, self.ny, self.nx)
    }
}

impl fmt::Display for Extents4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}×{}×{}", self.nt, self.nz, self.ny, self.nx)
    }
}

impl From<(usize, usize, usize, usize)> for Extents4D {
    fn from((nt, nz, ny, nx): (usize, usize, usize, usize)) -> Self {
        Self::new(nt, nz, ny, nx)
    }
}
