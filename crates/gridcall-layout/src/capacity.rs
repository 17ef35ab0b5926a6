//! Page capacity estimation.
//!
//! Combines the viewport size, the most recently measured tile size, and the
//! fixed chrome height into an integer tiles-per-page value for the
//! [`crate::Paginator`]. Recomputed on every resize.

use gridcall_core::SessionConfig;

use crate::Dimensions;

/// Derives how many tiles fit on one page.
///
/// Falls back to the configured minimum tile dimensions until a tile has been
/// measured, and never reports a capacity of zero: a zero capacity would make
/// pagination divide by zero or render nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityEstimator {
    min_tile: Dimensions,
    chrome_height: f64,
    measured_tile: Option<Dimensions>,
    last: usize,
}

impl CapacityEstimator {
    /// Create an estimator from session configuration.
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            min_tile: Dimensions::new(config.min_tile_width, config.min_tile_height),
            chrome_height: config.chrome_height,
            measured_tile: None,
            last: 1,
        }
    }

    /// Record the dimensions of a representative rendered tile.
    ///
    /// Non-positive measurements are ignored; the element has not laid out
    /// yet and the minimums remain in effect.
    pub fn record_tile(&mut self, tile: Dimensions) {
        if tile.width > 0.0 && tile.height > 0.0 {
            self.measured_tile = Some(tile);
        }
    }

    /// Most recently computed capacity.
    #[must_use]
    pub fn last(&self) -> usize {
        self.last
    }

    /// Recompute capacity for the given viewport.
    ///
    /// Usable area is the viewport minus the chrome height; capacity is the
    /// usable area divided by the per-tile area, floored, never below one.
    pub fn estimate(&mut self, viewport: Dimensions) -> usize {
        let tile = self.measured_tile.unwrap_or(self.min_tile);
        let tile_area = tile.width * tile.height;

        let usable_height = (viewport.height - self.chrome_height).max(0.0);
        let usable_area = viewport.width * usable_height;

        let capacity = if tile_area > 0.0 { (usable_area / tile_area) as usize } else { 0 };

        if capacity == 0 {
            // Degenerate viewport or measurement; keep the previous estimate
            tracing::debug!(
                viewport_width = viewport.width,
                viewport_height = viewport.height,
                "capacity collapsed to zero; keeping previous value"
            );
            return self.last.max(1);
        }

        self.last = capacity;
        capacity
    }
}
