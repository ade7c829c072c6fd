//! Render target abstraction.
//!
//! The controller only ever writes through [`RenderTarget`]; the terminal
//! draws whatever the target holds. [`TableView`] is the in-memory target used
//! by the TUI and by tests.

use crate::api::{Record, RecordType};

use super::format::{format_size, format_time, parse_favorited, preview};
use super::query::{SortField, SortOrder};
use super::selection::SelectAllState;

/// One rendered table row.
#[derive(Clone, Debug, PartialEq)]
pub struct RowView {
    pub id: i64,
    pub kind: RecordType,
    /// Content preview, with the ellipsis marker when truncated.
    pub preview: String,
    pub truncated: bool,
    /// Full text shown on hover/detail when the preview was truncated.
    pub title: Option<String>,
    pub size: String,
    pub time: String,
    pub favorited: bool,
    pub selected: bool,
}

impl RowView {
    pub fn from_record(record: &Record, selected: bool) -> Self {
        let content = record.content.as_deref();
        let p = preview(content);
        Self {
            id: record.id,
            kind: record.kind.clone(),
            preview: p.display(),
            truncated: p.truncated,
            title: p.truncated.then(|| content.unwrap_or_default().to_string()),
            size: format_size(&record.kind, content, record.file_size),
            time: format_time(record.created_at.as_deref()),
            favorited: parse_favorited(record.extra_data.as_deref()),
            selected,
        }
    }
}

/// What the table body currently shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum TableBody {
    /// Nothing loaded yet.
    #[default]
    Pending,
    Rows,
    /// Successful load with zero items.
    Empty,
    /// Single inline error row.
    Error(String),
}

/// Pagination footer contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationView {
    pub range_label: String,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

/// Everything the controller renders.
pub trait RenderTarget {
    /// A fetch started.
    fn set_loading(&mut self, loading: bool);
    /// Replace the table body with these rows (empty state when none).
    fn replace_rows(&mut self, rows: Vec<RowView>);
    /// Replace the table body with a single error row.
    fn show_error(&mut self, message: &str);
    fn set_pagination(&mut self, pagination: PaginationView);
    fn set_row_selected(&mut self, id: i64, selected: bool);
    fn set_row_favorited(&mut self, id: i64, favorited: bool);
    fn set_select_all(&mut self, state: SelectAllState);
    /// Number of selected ids (drives the batch-delete control).
    fn set_selection_count(&mut self, count: usize);
    fn set_sort_indicator(&mut self, field: SortField, order: SortOrder);
}

/// In-memory render target.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableView {
    pub body: TableBody,
    pub rows: Vec<RowView>,
    pub loading: bool,
    pub pagination: PaginationView,
    pub select_all: SelectAllState,
    pub selection_count: usize,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl TableView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(&self, id: i64) -> Option<&RowView> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Whether the empty-state indicator is shown.
    pub fn shows_empty_state(&self) -> bool {
        self.body == TableBody::Empty
    }

    /// Batch-delete control label; `None` hides the control.
    pub fn batch_delete_label(&self) -> Option<String> {
        (self.selection_count > 0).then(|| format!("Delete selected ({})", self.selection_count))
    }

    fn row_mut(&mut self, id: i64) -> Option<&mut RowView> {
        self.rows.iter_mut().find(|r| r.id == id)
    }
}

impl RenderTarget for TableView {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn replace_rows(&mut self, rows: Vec<RowView>) {
        self.body = if rows.is_empty() {
            TableBody::Empty
        } else {
            TableBody::Rows
        };
        self.rows = rows;
    }

    fn show_error(&mut self, message: &str) {
        self.rows.clear();
        self.body = TableBody::Error(message.to_string());
    }

    fn set_pagination(&mut self, pagination: PaginationView) {
        self.pagination = pagination;
    }

    fn set_row_selected(&mut self, id: i64, selected: bool) {
        if let Some(row) = self.row_mut(id) {
            row.selected = selected;
        }
    }

    fn set_row_favorited(&mut self, id: i64, favorited: bool) {
        if let Some(row) = self.row_mut(id) {
            row.favorited = favorited;
        }
    }

    fn set_select_all(&mut self, state: SelectAllState) {
        self.select_all = state;
    }

    fn set_selection_count(&mut self, count: usize) {
        self.selection_count = count;
    }

    fn set_sort_indicator(&mut self, field: SortField, order: SortOrder) {
        self.sort_field = field;
        self.sort_order = order;
    }
}
