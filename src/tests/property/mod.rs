//! Property-based tests for the list controller core.
//!
//! Run with:
//! ```sh
//! cargo test property --release
//! ```
//!
//! - `format_props`: preview truncation and byte-size formatting
//! - `sort_props`: client-side sort keeps every record and is stable
//! - `paging_props`: page arithmetic, clamping and the range label

mod format_props;
mod paging_props;
mod sort_props;
