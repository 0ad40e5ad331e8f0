//! Strongly-typed domain types for safer APIs.
//!
//! This module provides newtypes and structured types to make APIs
//! self-documenting and prevent parameter mix-ups.
//!
//! # Design Philosophy
//!
//! - **Newtypes prevent mix-ups**: `TimeIndex(3)` vs `LevelIndex(3)` are distinct types
//! - **Named fields over positional**: `AxisBoundaries { x, y, z }`
//! - **Resolve once**: `AxisPair` turns the physical axes into dim1/dim2 up front
//!
//! # Example
//!
//! ```
//! use elliptic_rs::types::{
//!     AxisBoundaries, AxisPair, BoundaryCondition, DimensionCombination, Extents4D, GridSpacing,
//! };
//!
//! let extents = Extents4D::new(4, 10, 33, 65);
//! let axes = AxisPair::resolve(
//!     DimensionCombination::XY,
//!     extents,
//!     GridSpacing::new(1e4, 1e4, 100.0),
//!     AxisBoundaries::uniform(BoundaryCondition::Fixed).with_x(BoundaryCondition::Periodic),
//! );
//!
//! assert_eq!(axes.dim1.count, 65);
//! assert!(axes.dim1.bc.is_periodic());
//! ```

mod boundary;
mod dimension;
mod extents;
mod indices;

pub use boundary::{AxisBoundaries, BoundaryCondition};
pub use dimension::{AxisDescriptor, AxisPair, DimensionCombination, GridSpacing};
pub use extents::Extents4D;
pub use indices::{ColumnIndex, LevelIndex, TimeIndex};
