//! Client-side sort of one fetched page.

use std::cmp::Ordering;

use crate::api::Record;

use super::format::parse_timestamp;
use super::query::{SortField, SortOrder};

/// Compare two records on `field`, ascending. Missing values sort first.
pub fn compare(a: &Record, b: &Record, field: SortField) -> Ordering {
    match field {
        SortField::Id => a.id.cmp(&b.id),
        SortField::Type => a.kind.as_str().cmp(b.kind.as_str()),
        SortField::Content => a.content.cmp(&b.content),
        SortField::Size => a.file_size.cmp(&b.file_size),
        SortField::CreatedAt => {
            let ta = a.created_at.as_deref().and_then(parse_timestamp);
            let tb = b.created_at.as_deref().and_then(parse_timestamp);
            ta.cmp(&tb)
        }
    }
}

/// Stable sort in place; equal keys keep the server's relative order.
pub fn sort_records(records: &mut [Record], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| {
        let ord = compare(a, b, field);
        match order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}
