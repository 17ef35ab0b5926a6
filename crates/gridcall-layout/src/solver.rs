//! Grid decomposition solver.
//!
//! Given a container and an item count, pick the row/column split whose shape
//! is closest to the container's aspect ratio, then size tiles to fill the
//! container along the constrained axis.

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Dimensions {
    /// Construct from width and height.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width/height ratio. Zero-height containers yield an infinite ratio.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        self.width / self.height
    }
}

/// A solved grid decomposition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutSolution {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Width of each tile in pixels.
    pub tile_width: f64,
    /// Height of each tile in pixels.
    pub tile_height: f64,
}

/// Unit height used when comparing candidate decompositions. Only ratios
/// matter, so any positive constant works.
const THEORETICAL_UNIT_HEIGHT: f64 = 100.0;

/// Choose the grid decomposition for `items` tiles in `container`.
///
/// Evaluates every row count from 1 to `min(max_rows, items)`. For each
/// candidate the column count is `ceil(items / rows)` and the candidate's
/// shape ratio is compared against the container's ratio; the closest wins,
/// with ties resolving to the smallest row count. Tile dimensions then fill
/// the container along whichever axis the winning shape is constrained by,
/// after subtracting the gap budget.
///
/// `items` must be greater than zero; the zero case is a caller contract
/// violation and is only debug-asserted. If no candidate row count exists
/// (for example `max_rows == 0`), a degenerate 1x1 solution is returned
/// rather than an error.
#[must_use]
pub fn solve(
    container: Dimensions,
    aspect: f64,
    items: usize,
    max_rows: usize,
    gap: f64,
) -> LayoutSolution {
    debug_assert!(items > 0, "layout solver invoked with zero items");

    let container_ratio = container.ratio();

    let mut best: Option<(usize, usize, f64)> = None;
    for rows in 1..=max_rows.min(items) {
        let cols = items.div_ceil(rows);
        let width = cols as f64 * THEORETICAL_UNIT_HEIGHT * aspect;
        let height = rows as f64 * THEORETICAL_UNIT_HEIGHT;
        let ratio = width / height;

        let distance = (ratio - container_ratio).abs();
        let closer = match best {
            None => true,
            // Strict comparison keeps the first (smallest) row count on ties
            Some((_, _, best_distance)) => distance < best_distance,
        };
        if closer {
            best = Some((rows, cols, ratio));
        }
    }

    let Some((rows, cols, ratio)) = best else {
        tracing::debug!(items, max_rows, "no candidate row count; using degenerate 1x1");
        return sized(container, aspect, 1, 1, gap, aspect < container_ratio);
    };

    sized(container, aspect, rows, cols, gap, ratio < container_ratio)
}

/// Compute final tile dimensions for a chosen decomposition.
///
/// When the grid shape is narrower than the container, height is the
/// constrained axis: tiles consume the full height minus the gap budget and
/// width follows from the aspect ratio. Otherwise width is constrained and
/// height follows.
fn sized(
    container: Dimensions,
    aspect: f64,
    rows: usize,
    cols: usize,
    gap: f64,
    height_constrained: bool,
) -> LayoutSolution {
    let (tile_width, tile_height) = if height_constrained {
        let tile_height = (container.height - gap * rows as f64) / rows as f64;
        (tile_height * aspect, tile_height)
    } else {
        let tile_width = (container.width - gap * cols as f64) / cols as f64;
        (tile_width, tile_width / aspect)
    };

    LayoutSolution { rows, cols, tile_width, tile_height }
}
