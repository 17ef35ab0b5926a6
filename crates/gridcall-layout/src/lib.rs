//! Responsive grid layout for video tiles.
//!
//! Three cooperating pieces, all free of I/O:
//!
//! - [`solve`]: pure function choosing the row/column decomposition and tile
//!   size that best fits a container.
//! - [`Paginator`]: splits an ordered tile list into fixed-capacity pages.
//! - [`CapacityEstimator`]: derives the page capacity from viewport and
//!   measured tile dimensions.
//!
//! The solver is deterministic: identical inputs always produce identical
//! solutions, which the property tests rely on.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod capacity;
mod pagination;
mod solver;

pub use capacity::CapacityEstimator;
pub use pagination::Paginator;
pub use solver::{Dimensions, LayoutSolution, solve};
