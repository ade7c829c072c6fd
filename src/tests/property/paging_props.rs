//! Pagination invariants.

use proptest::prelude::*;

use crate::core::query::{QueryState, PAGE_SIZES};

proptest! {
    #[test]
    fn total_pages_covers_every_record(total in 0u64..100_000, size in prop::sample::select(PAGE_SIZES.to_vec())) {
        let mut q = QueryState::new(size);
        q.total_records = total;
        let pages = u64::from(q.total_pages());
        prop_assert!(pages * u64::from(size) >= total);
        if total > 0 {
            prop_assert!((pages - 1) * u64::from(size) < total);
        } else {
            prop_assert_eq!(pages, 0);
        }
    }

    #[test]
    fn clamp_keeps_page_in_range(total in 0u64..10_000, page in 1u32..1_000, size in prop::sample::select(PAGE_SIZES.to_vec())) {
        let mut q = QueryState::new(size);
        q.total_records = total;
        q.page = page;
        let moved = q.clamp_page();
        prop_assert!(q.page >= 1);
        prop_assert!(q.page <= q.total_pages().max(1));
        prop_assert_eq!(moved, page > q.total_pages().max(1));
    }

    #[test]
    fn range_label_bounds(total in 1u64..10_000, size in prop::sample::select(PAGE_SIZES.to_vec()), page_seed in 0u32..1_000) {
        let mut q = QueryState::new(size);
        q.total_records = total;
        q.page = page_seed % q.total_pages() + 1;
        let label = q.page_range_label();

        let (range, tail) = label.split_once(" / ").unwrap();
        let (start, end) = range.split_once('-').unwrap();
        let start: u64 = start.parse().unwrap();
        let end: u64 = end.parse().unwrap();
        prop_assert_eq!(tail.parse::<u64>().unwrap(), total);
        prop_assert!(start >= 1 && start <= end && end <= total);
        prop_assert!(end - start < u64::from(size));
    }

    #[test]
    fn navigation_never_leaves_range(total in 0u64..500, steps in prop::collection::vec(any::<bool>(), 0..40)) {
        let mut q = QueryState::new(20);
        q.total_records = total;
        for forward in steps {
            if forward && q.can_go_next() {
                q.page += 1;
            } else if !forward && q.can_go_prev() {
                q.page -= 1;
            }
            prop_assert!(q.page >= 1);
            prop_assert!(q.page <= q.total_pages().max(1));
        }
    }
}
