//! Strongly-typed index newtypes.
//!
//! These types prevent mixing up the outer axes of a 4D field
//! (time vs level vs x column) when naming a slice.

use std::fmt;

/// Macro to generate index newtypes with common functionality.
macro_rules! define_index {
    (
        $(#[$meta:meta])*
        $name:ident, $display_prefix:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $name(usize);

        impl $name {
            /// Create a new index.
            #[inline]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// Get the raw index value.
            #[inline]
            pub const fn get(self) -> usize {
                self.0
            }

            /// Create an iterator over [0, n) indices.
            pub fn iter(n: usize) -> impl ExactSizeIterator<Item = $name> {
                (0..n).map($name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, self.0)
            }
        }

        impl From<usize> for $name {
            #[inline]
            fn from(index: usize) -> Self {
                Self(index)
            }
        }

        impl From<$name> for usize {
            #[inline]
            fn from(idx: $name) -> usize {
                idx.0
            }
        }
    };
}

define_index!(
    /// Time record index in a 4D field.
    ///
    /// # Example
    ///
    /// ```
    /// use elliptic_rs::types::TimeIndex;
    ///
    /// let t = TimeIndex::new(3);
    /// assert_eq!(t.get(), 3);
    /// assert_eq!(t.to_string(), "t3");
    /// ```
    TimeIndex,
    "t"
);

define_index!(
    /// Vertical level index in a 4D field.
    ///
    /// # Example
    ///
    /// ```
    /// use elliptic_rs::types::LevelIndex;
    ///
    /// let level = LevelIndex::new(5);
    /// assert_eq!(level.get(), 5);
    /// ```
    LevelIndex,
    "z"
);

define_index!(
    /// Zonal (x) column index, the outer axis of a meridional slice.
    ///
    /// # Example
    ///
    /// ```
    /// use elliptic_rs::types::ColumnIndex;
    ///
    /// let x = ColumnIndex::new(7);
    /// assert_eq!(x.to_string(), "x7");
    /// ```
    ColumnIndex,
    "x"
);
