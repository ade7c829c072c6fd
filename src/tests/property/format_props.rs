//! Preview and size formatting invariants.

use proptest::prelude::*;

use crate::core::format::{format_bytes, preview, ELLIPSIS, PREVIEW_CHARS};

proptest! {
    #[test]
    fn preview_never_exceeds_limit(text in "\\PC{0,300}") {
        let p = preview(Some(&text));
        prop_assert!(p.text.chars().count() <= PREVIEW_CHARS);
        prop_assert!(text.starts_with(&p.text));
    }

    #[test]
    fn preview_truncates_exactly_when_over_limit(text in "\\PC{0,300}") {
        let p = preview(Some(&text));
        let over = text.chars().count() > PREVIEW_CHARS;
        prop_assert_eq!(p.truncated, over);
        prop_assert_eq!(p.display().len() > p.text.len(), over);
        if over {
            prop_assert!(p.display().ends_with(ELLIPSIS));
        }
    }

    #[test]
    fn small_sizes_are_plain_bytes(bytes in 0u64..1024) {
        prop_assert_eq!(format_bytes(bytes), format!("{bytes} B"));
    }

    #[test]
    fn sizes_pick_one_unit(bytes in 0u64..(u64::MAX / 2)) {
        let s = format_bytes(bytes);
        let units = [" B", " KB", " MB"].iter().filter(|u| s.ends_with(*u)).count();
        prop_assert_eq!(units, 1);
    }
}
