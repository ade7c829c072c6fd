//! Client-side sort invariants.

use proptest::prelude::*;

use crate::api::{Record, RecordType};
use crate::core::query::{SortField, SortOrder};
use crate::core::sort::{compare, sort_records};

fn arb_record() -> impl Strategy<Value = Record> {
    (
        1i64..50,
        prop::option::of(0u64..4096),
        prop::option::of("[a-c]{0,3}"),
        prop::option::of(0u32..5),
    )
        .prop_map(|(id, file_size, content, hour)| Record {
            id,
            kind: RecordType::Text,
            content,
            file_path: None,
            file_hash: None,
            file_size,
            created_at: hour.map(|h| format!("2024-05-01T0{h}:00:00")),
            extra_data: None,
        })
}

fn arb_field() -> impl Strategy<Value = SortField> {
    prop::sample::select(SortField::ALL.to_vec())
}

fn arb_order() -> impl Strategy<Value = SortOrder> {
    prop_oneof![Just(SortOrder::Asc), Just(SortOrder::Desc)]
}

proptest! {
    #[test]
    fn sort_is_a_permutation(
        records in prop::collection::vec(arb_record(), 0..30),
        field in arb_field(),
        order in arb_order(),
    ) {
        let mut sorted = records.clone();
        sort_records(&mut sorted, field, order);

        let mut before: Vec<i64> = records.iter().map(|r| r.id).collect();
        let mut after: Vec<i64> = sorted.iter().map(|r| r.id).collect();
        before.sort_unstable();
        after.sort_unstable();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn sort_output_is_ordered(
        records in prop::collection::vec(arb_record(), 0..30),
        field in arb_field(),
        order in arb_order(),
    ) {
        let mut sorted = records;
        sort_records(&mut sorted, field, order);
        for pair in sorted.windows(2) {
            let ord = compare(&pair[0], &pair[1], field);
            match order {
                SortOrder::Asc => prop_assert!(ord.is_le()),
                SortOrder::Desc => prop_assert!(ord.is_ge()),
            }
        }
    }

    #[test]
    fn equal_keys_keep_relative_order(
        records in prop::collection::vec(arb_record(), 0..30),
        field in arb_field(),
        order in arb_order(),
    ) {
        // Tag each record with its original position.
        let tagged: Vec<Record> = records
            .into_iter()
            .enumerate()
            .map(|(i, mut r)| {
                r.file_hash = Some(i.to_string());
                r
            })
            .collect();
        let mut sorted = tagged;
        sort_records(&mut sorted, field, order);

        for pair in sorted.windows(2) {
            if compare(&pair[0], &pair[1], field).is_eq() {
                let a: usize = pair[0].file_hash.as_deref().unwrap().parse().unwrap();
                let b: usize = pair[1].file_hash.as_deref().unwrap().parse().unwrap();
                prop_assert!(a < b);
            }
        }
    }
}
