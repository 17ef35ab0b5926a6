//! Fuzz target for the tile paginator
//!
//! Ensure the current page stays in bounds under any operation order
//!
//! # Strategy
//!
//! - Interleave navigation with item-count and capacity churn
//! - Zero capacities and zero lengths
//! - Page slices against collections of the declared length
//!
//! # Invariants
//!
//! - `1 <= page <= page_count` after every operation
//! - `page_range` stays within the declared length
//! - A collapse to one page resets the current page
//! - Walking every page visits each item exactly once

#![no_main]

use arbitrary::Arbitrary;
use gridcall_layout::Paginator;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Arbitrary)]
enum PaginatorOp {
    Next,
    Previous,
    SetLen(u8),
    SetCapacity(u8),
}

fuzz_target!(|ops: Vec<PaginatorOp>| {
    let mut paginator = Paginator::new(3);
    let mut len = 0usize;

    for op in ops {
        match op {
            PaginatorOp::Next => paginator.next_page(),
            PaginatorOp::Previous => paginator.previous_page(),
            PaginatorOp::SetLen(n) => {
                len = usize::from(n);
                paginator.set_len(len);
            },
            PaginatorOp::SetCapacity(n) => paginator.set_capacity(usize::from(n)),
        }

        assert!(paginator.page() >= 1);
        assert!(paginator.page() <= paginator.page_count());
        assert!(paginator.capacity() >= 1);

        let range = paginator.page_range();
        assert!(range.start <= range.end);
        assert!(range.end <= len);

        if paginator.page_count() == 1 {
            assert_eq!(paginator.page(), 1);
        }
    }

    // A full walk from page one partitions the collection
    let items: Vec<usize> = (0..len).collect();
    while paginator.page() > 1 {
        paginator.previous_page();
    }
    let mut seen = Vec::new();
    loop {
        seen.extend_from_slice(paginator.page_slice(&items));
        if paginator.page() == paginator.page_count() {
            break;
        }
        paginator.next_page();
    }
    assert_eq!(seen, items);
});
