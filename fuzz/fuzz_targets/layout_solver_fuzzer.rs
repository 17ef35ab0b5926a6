//! Fuzz target for the grid layout solver
//!
//! Ensure totality and coverage over the whole input space (HIGH priority)
//!
//! # Strategy
//!
//! - Container dimensions: tiny, huge, and extreme aspect ratios
//! - Item counts: 1 up to u8::MAX
//! - Row ceilings: including the degenerate 0 case
//! - Gaps larger than the container itself
//!
//! # Invariants
//!
//! - Never panics and never returns a zero-cell grid
//! - `rows * cols >= items` whenever a candidate row count exists
//! - `rows <= max_rows` whenever `max_rows >= 1`
//! - Identical inputs produce identical solutions

#![no_main]

use arbitrary::Arbitrary;
use gridcall_layout::{Dimensions, solve};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
struct SolveInput {
    width: u16,
    height: u16,
    aspect_num: u8,
    aspect_den: u8,
    items: u8,
    max_rows: u8,
    gap: u8,
}

fuzz_target!(|input: SolveInput| {
    let container = Dimensions::new(
        f64::from(input.width.max(1)),
        f64::from(input.height.max(1)),
    );
    let aspect = f64::from(input.aspect_num.max(1)) / f64::from(input.aspect_den.max(1));
    let items = usize::from(input.items.max(1));
    let max_rows = usize::from(input.max_rows);
    let gap = f64::from(input.gap);

    let solution = solve(container, aspect, items, max_rows, gap);

    assert!(solution.rows >= 1, "zero rows: {solution:?}");
    assert!(solution.cols >= 1, "zero cols: {solution:?}");

    if max_rows >= 1 {
        assert!(solution.rows <= max_rows, "row ceiling violated: {solution:?}");
        assert!(
            solution.rows * solution.cols >= items,
            "grid does not cover items: {solution:?} for {items} items"
        );
    }

    let again = solve(container, aspect, items, max_rows, gap);
    assert_eq!(solution, again, "solver is not deterministic");
});
