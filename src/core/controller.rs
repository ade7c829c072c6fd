//! List controller: query state, fetch cycle, selection and record actions.
//!
//! The controller never performs I/O. Operations that need the server are
//! split in two: a `begin_*`/query method that decides whether a request is
//! due and what it carries, and a `finish_*` method that applies the
//! response. The effect layer (`tui::services`) runs the request in between.
//!
//! Fetch cycle: Idle → Loading (`begin_refresh`) → Rendered | Errored
//! (`finish_refresh`) → Idle. `is_loading` is cleared on every path.

use crate::api::{ApiError, HistoryPage, HistoryQuery, Record, RecordType, Stats};

use super::query::{next_type_filter, FavoriteFilter, QueryState, SortField};
use super::selection::{SelectAllState, Selection};
use super::sort::sort_records;
use super::view::{PaginationView, RenderTarget, RowView, TableView};

/// A started refresh. `seq` must be handed back to [`ListController::finish_refresh`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshTicket {
    pub seq: u64,
    pub query: HistoryQuery,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Rows (or the empty state) were rendered.
    Rendered,
    /// An inline error row was rendered.
    Errored,
    /// The response belonged to an abandoned cycle and was dropped.
    Stale,
    /// The current page no longer exists; it was clamped and must be fetched.
    PageClamped,
}

/// What activating a row's content does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentAction {
    CopyText(String),
    OpenImage(i64),
    Download {
        id: i64,
        suggested_name: Option<String>,
    },
    Nothing,
}

/// Owns query state, the selection set and the fetched page, and writes
/// everything visible through a [`RenderTarget`].
pub struct ListController<R: RenderTarget = TableView> {
    query: QueryState,
    selection: Selection,
    /// Current page in display order.
    records: Vec<Record>,
    target: R,
    seq: u64,
    stats_in_flight: bool,
}

impl ListController<TableView> {
    pub fn with_table(page_size: u32) -> Self {
        Self::new(page_size, TableView::new())
    }
}

impl<R: RenderTarget> ListController<R> {
    pub fn new(page_size: u32, target: R) -> Self {
        let mut controller = Self {
            query: QueryState::new(page_size),
            selection: Selection::new(),
            records: Vec::new(),
            target,
            seq: 0,
            stats_in_flight: false,
        };
        controller.render_sort_indicator();
        controller.render_pagination();
        controller
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    /// Records of the current page, in display order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn record(&self, id: i64) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn visible_ids(&self) -> Vec<i64> {
        self.records.iter().map(|r| r.id).collect()
    }

    // ── Fetch cycle ─────────────────────────────────────────────────────

    /// Start a refresh. `None` while one is already in flight.
    pub fn begin_refresh(&mut self) -> Option<RefreshTicket> {
        if self.query.is_loading {
            log::debug!("Refresh dropped: fetch already in flight");
            return None;
        }
        self.query.is_loading = true;
        self.seq += 1;
        self.target.set_loading(true);
        Some(RefreshTicket {
            seq: self.seq,
            query: self.query.to_query(),
        })
    }

    /// Apply the result of the refresh started with ticket `seq`.
    pub fn finish_refresh(
        &mut self,
        seq: u64,
        result: Result<HistoryPage, ApiError>,
    ) -> RefreshOutcome {
        if seq != self.seq || !self.query.is_loading {
            log::debug!("Ignoring stale history response (seq {seq}, current {})", self.seq);
            return RefreshOutcome::Stale;
        }
        self.query.is_loading = false;
        self.target.set_loading(false);

        match result {
            Ok(page) => {
                log::debug!(
                    "Loaded page {} ({} items, total {})",
                    self.query.page,
                    page.items.len(),
                    page.total
                );
                self.query.total_records = page.total;
                self.records = page.items;
                self.render_page();

                let clamped = self.query.clamp_page();
                self.render_pagination();
                if clamped && self.query.total_records > 0 {
                    log::debug!("Page out of range, clamped to {}", self.query.page);
                    return RefreshOutcome::PageClamped;
                }
                RefreshOutcome::Rendered
            }
            Err(e) => {
                log::warn!("Failed to load history: {e}");
                self.records.clear();
                self.target.show_error(&format!("Failed to load: {e}"));
                self.target.set_select_all(SelectAllState::Unchecked);
                RefreshOutcome::Errored
            }
        }
    }

    /// Sort the cached page and write its rows.
    fn render_page(&mut self) {
        sort_records(&mut self.records, self.query.sort_field, self.query.sort_order);
        let rows = self
            .records
            .iter()
            .map(|r| RowView::from_record(r, self.selection.contains(r.id)))
            .collect();
        self.target.replace_rows(rows);
        self.sync_selection_controls();
    }

    fn render_pagination(&mut self) {
        self.target.set_pagination(PaginationView {
            range_label: self.query.page_range_label(),
            total: self.query.total_records,
            page: self.query.page,
            total_pages: self.query.total_pages(),
            prev_enabled: self.query.can_go_prev(),
            next_enabled: self.query.can_go_next(),
        });
    }

    fn render_sort_indicator(&mut self) {
        self.target
            .set_sort_indicator(self.query.sort_field, self.query.sort_order);
    }

    /// Select-all tri-state and batch count, recomputed after every mutation.
    fn sync_selection_controls(&mut self) {
        let state = self
            .selection
            .select_all_state(self.records.iter().map(|r| &r.id));
        self.target.set_select_all(state);
        self.target.set_selection_count(self.selection.len());
    }

    // ── Query mutations (each returns whether a refresh is due) ─────────

    pub fn set_search(&mut self, search: &str) -> bool {
        if self.query.search_query == search {
            return false;
        }
        self.query.search_query = search.to_string();
        self.query.page = 1;
        true
    }

    pub fn set_type_filter(&mut self, kind: Option<RecordType>) -> bool {
        self.query.type_filter = kind;
        self.query.page = 1;
        true
    }

    pub fn cycle_type_filter(&mut self) -> bool {
        let next = next_type_filter(self.query.type_filter.as_ref());
        self.set_type_filter(next)
    }

    pub fn set_favorite_filter(&mut self, filter: FavoriteFilter) -> bool {
        self.query.favorite_filter = filter;
        self.query.page = 1;
        true
    }

    pub fn cycle_favorite_filter(&mut self) -> bool {
        let next = self.query.favorite_filter.next();
        self.set_favorite_filter(next)
    }

    pub fn next_page(&mut self) -> bool {
        if !self.query.can_go_next() {
            return false;
        }
        self.query.page += 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if !self.query.can_go_prev() {
            return false;
        }
        self.query.page -= 1;
        true
    }

    pub fn step_page_size(&mut self, larger: bool) -> bool {
        self.query.step_page_size(larger)
    }

    /// Column click. Re-sorts the cached page; no request is needed.
    pub fn sort_by(&mut self, field: SortField) {
        self.query.set_sort(field);
        self.render_sort_indicator();
        if !self.records.is_empty() {
            self.render_page();
        }
    }

    // ── Selection ───────────────────────────────────────────────────────

    pub fn toggle_row(&mut self, id: i64) {
        let selected = self.selection.toggle(id);
        self.target.set_row_selected(id, selected);
        self.sync_selection_controls();
    }

    /// Add (`checked`) or remove every rendered id.
    pub fn toggle_select_all(&mut self, checked: bool) {
        let visible = self.visible_ids();
        self.selection.set_all(visible.iter().copied(), checked);
        for id in visible {
            self.target.set_row_selected(id, checked);
        }
        self.sync_selection_controls();
    }

    /// Activate the select-all control: checks unless everything is checked.
    pub fn activate_select_all(&mut self) {
        let state = self
            .selection
            .select_all_state(self.records.iter().map(|r| &r.id));
        self.toggle_select_all(state != SelectAllState::Checked);
    }

    /// Ids for a batch delete, or `None` when nothing is selected.
    pub fn batch_delete_ids(&self) -> Option<Vec<i64>> {
        (!self.selection.is_empty()).then(|| self.selection.to_vec())
    }

    /// Apply a batch-delete result. Returns true when a refresh is due.
    /// On failure the selection is kept.
    pub fn finish_batch_delete<T>(&mut self, result: &Result<T, ApiError>) -> bool {
        match result {
            Ok(_) => {
                self.selection.clear();
                self.sync_selection_controls();
                true
            }
            Err(e) => {
                log::warn!("Batch delete failed: {e}");
                false
            }
        }
    }

    // ── Single-record actions ───────────────────────────────────────────

    /// Record the server's favorite state for `id` and update that row only.
    pub fn apply_favorite(&mut self, id: i64, favorited: bool) {
        if let Some(record) = self.records.iter_mut().find(|r| r.id == id) {
            record.extra_data = Some(with_favorited(record.extra_data.as_deref(), favorited));
        }
        self.target.set_row_favorited(id, favorited);
    }

    /// Apply a single delete result. Returns true when a refresh is due.
    /// On failure the selection is unchanged.
    pub fn finish_delete<T>(&mut self, id: i64, result: &Result<T, ApiError>) -> bool {
        match result {
            Ok(_) => {
                self.selection.remove(id);
                self.sync_selection_controls();
                true
            }
            Err(e) => {
                log::warn!("Delete of record {id} failed: {e}");
                false
            }
        }
    }

    /// What activating the content cell of `id` does.
    pub fn content_action(&self, id: i64) -> ContentAction {
        let Some(record) = self.record(id) else {
            return ContentAction::Nothing;
        };
        match (&record.kind, record.file_path.as_deref()) {
            (RecordType::Text, _) => {
                ContentAction::CopyText(record.content.clone().unwrap_or_default())
            }
            (RecordType::Image, Some(_)) => ContentAction::OpenImage(id),
            (_, Some(_)) => ContentAction::Download {
                id,
                suggested_name: record.content.clone(),
            },
            _ => ContentAction::Nothing,
        }
    }

    // ── Change detection ────────────────────────────────────────────────

    /// Whether a stats check should be issued now. Marks it in flight.
    pub fn begin_stats_check(&mut self) -> bool {
        if self.query.has_active_filter() || self.stats_in_flight {
            return false;
        }
        self.stats_in_flight = true;
        true
    }

    /// Compare the server's total with ours. Returns true when a refresh is due.
    pub fn finish_stats_check(&mut self, result: Result<Stats, ApiError>) -> bool {
        self.stats_in_flight = false;
        match result {
            Ok(stats) if stats.total_records != self.query.total_records => {
                log::debug!(
                    "Record count changed ({} -> {}), refreshing",
                    self.query.total_records,
                    stats.total_records
                );
                true
            }
            Ok(_) => false,
            Err(e) => {
                log::debug!("Stats check failed: {e}");
                false
            }
        }
    }

    /// Drop all session state (logout). In-flight responses become stale.
    pub fn reset(&mut self) {
        let page_size = self.query.page_size;
        self.query = QueryState::new(page_size);
        self.selection.clear();
        self.records.clear();
        self.seq += 1;
        self.stats_in_flight = false;
        self.target.set_loading(false);
        self.target.replace_rows(Vec::new());
        self.sync_selection_controls();
        self.render_sort_indicator();
        self.render_pagination();
    }
}

/// `extra_data` with `favorited` set, keeping other keys when it was an object.
fn with_favorited(extra_data: Option<&str>, favorited: bool) -> String {
    let mut map = extra_data
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw).ok())
        .and_then(|v| match v {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        })
        .unwrap_or_default();
    map.insert("favorited".to_string(), serde_json::Value::Bool(favorited));
    serde_json::Value::Object(map).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::view::TableBody;

    fn text(id: i64, created_at: &str) -> Record {
        Record {
            id,
            kind: RecordType::Text,
            content: Some(format!("clip {id}")),
            file_path: None,
            file_hash: None,
            file_size: None,
            created_at: Some(created_at.to_string()),
            extra_data: None,
        }
    }

    fn page(ids: std::ops::RangeInclusive<i64>, total: u64) -> HistoryPage {
        HistoryPage {
            items: ids.map(|id| text(id, "2024-01-01T00:00:00")).collect(),
            total,
        }
    }

    fn loaded(ids: std::ops::RangeInclusive<i64>, total: u64) -> ListController {
        let mut c = ListController::with_table(20);
        let ticket = c.begin_refresh().unwrap();
        assert_eq!(c.finish_refresh(ticket.seq, Ok(page(ids, total))), RefreshOutcome::Rendered);
        c
    }

    #[test]
    fn test_refresh_while_loading_is_dropped() {
        let mut c = ListController::with_table(20);
        let first = c.begin_refresh();
        assert!(first.is_some());
        assert!(c.begin_refresh().is_none());
        assert!(c.query().is_loading);
        assert!(c.target().loading);
    }

    #[test]
    fn test_success_renders_rows_and_pagination() {
        let mut c = ListController::with_table(20);
        c.next_page_for_test(2);
        let ticket = c.begin_refresh().unwrap();
        assert_eq!(ticket.query.page, 2);
        c.finish_refresh(ticket.seq, Ok(page(21..=40, 45)));

        let view = c.target();
        assert_eq!(view.rows.len(), 20);
        assert_eq!(view.body, TableBody::Rows);
        assert_eq!(view.pagination.range_label, "21-40 / 45");
        assert_eq!(view.pagination.total, 45);
        assert!(view.pagination.prev_enabled);
        assert!(view.pagination.next_enabled);
        assert!(!c.query().is_loading);
        assert!(!view.loading);
    }

    #[test]
    fn test_empty_page_shows_empty_state() {
        let c = loaded(1..=0, 0);
        assert!(c.target().shows_empty_state());
        assert_eq!(c.target().pagination.range_label, "No records");
    }

    #[test]
    fn test_error_keeps_query_state() {
        let mut c = loaded(1..=20, 45);
        let before = c.query().clone();
        let ticket = c.begin_refresh().unwrap();
        let outcome = c.finish_refresh(
            ticket.seq,
            Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
        );
        assert_eq!(outcome, RefreshOutcome::Errored);
        assert!(matches!(c.target().body, TableBody::Error(_)));
        assert!(!c.query().is_loading);
        assert_eq!(c.query().total_records, before.total_records);
        assert_eq!(c.query().page, before.page);
        // Loading cleared, so the next refresh goes out.
        assert!(c.begin_refresh().is_some());
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut c = ListController::with_table(20);
        let ticket = c.begin_refresh().unwrap();
        c.reset();
        assert_eq!(c.finish_refresh(ticket.seq, Ok(page(1..=3, 3))), RefreshOutcome::Stale);
        assert!(c.target().rows.is_empty());
    }

    #[test]
    fn test_page_clamped_after_shrink() {
        let mut c = ListController::with_table(20);
        c.next_page_for_test(3);
        let ticket = c.begin_refresh().unwrap();
        let outcome = c.finish_refresh(ticket.seq, Ok(page(1..=0, 40)));
        assert_eq!(outcome, RefreshOutcome::PageClamped);
        assert_eq!(c.query().page, 2);
        assert!(c.begin_refresh().is_some());
    }

    #[test]
    fn test_select_all_tri_state() {
        let mut c = loaded(1..=20, 20);
        c.toggle_select_all(true);
        assert_eq!(c.target().select_all, SelectAllState::Checked);
        assert_eq!(c.selection().len(), 20);

        c.toggle_row(5);
        assert_eq!(c.target().select_all, SelectAllState::Indeterminate);
        assert!(!c.target().row(5).unwrap().selected);

        c.toggle_select_all(false);
        assert_eq!(c.target().select_all, SelectAllState::Unchecked);
        assert!(c.selection().is_empty());
    }

    #[test]
    fn test_activate_select_all() {
        let mut c = loaded(1..=3, 3);
        c.toggle_row(1);
        c.activate_select_all();
        assert_eq!(c.target().select_all, SelectAllState::Checked);
        c.activate_select_all();
        assert_eq!(c.target().select_all, SelectAllState::Unchecked);
    }

    #[test]
    fn test_delete_removes_id_from_selection() {
        let mut c = loaded(1..=5, 5);
        c.toggle_row(2);
        c.toggle_row(3);
        let ok: Result<(), ApiError> = Ok(());
        assert!(c.finish_delete(2, &ok));
        assert!(!c.selection().contains(2));
        assert!(c.selection().contains(3));
        assert_eq!(c.target().selection_count, 1);
    }

    #[test]
    fn test_failed_delete_keeps_selection() {
        let mut c = loaded(1..=5, 5);
        c.toggle_row(2);
        let err: Result<(), ApiError> = Err(ApiError::Status {
            status: 404,
            body: String::new(),
        });
        assert!(!c.finish_delete(2, &err));
        assert!(c.selection().contains(2));
    }

    #[test]
    fn test_batch_delete_flow() {
        let mut c = loaded(1..=5, 5);
        assert!(c.batch_delete_ids().is_none());
        c.toggle_row(4);
        c.toggle_row(1);
        assert_eq!(c.batch_delete_ids(), Some(vec![4, 1]));

        let err: Result<(), ApiError> = Err(ApiError::Unauthorized);
        assert!(!c.finish_batch_delete(&err));
        assert_eq!(c.selection().len(), 2);

        let ok: Result<(), ApiError> = Ok(());
        assert!(c.finish_batch_delete(&ok));
        assert!(c.selection().is_empty());
        assert_eq!(c.target().selection_count, 0);
    }

    #[test]
    fn test_selection_survives_refresh_and_marks_rows() {
        let mut c = loaded(1..=5, 5);
        c.toggle_row(3);
        let ticket = c.begin_refresh().unwrap();
        c.finish_refresh(ticket.seq, Ok(page(1..=5, 5)));
        assert!(c.target().row(3).unwrap().selected);
        assert_eq!(c.target().select_all, SelectAllState::Indeterminate);
    }

    #[test]
    fn test_sort_by_resorts_cached_page() {
        let mut c = loaded(1..=3, 3);
        // Default: id descending.
        assert_eq!(c.visible_ids(), vec![3, 2, 1]);
        c.sort_by(SortField::Id);
        assert_eq!(c.visible_ids(), vec![1, 2, 3]);
        assert_eq!(
            c.target().rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(c.target().sort_order, crate::core::SortOrder::Asc);
    }

    #[test]
    fn test_apply_favorite_updates_row_and_cache() {
        let mut c = loaded(1..=3, 3);
        c.apply_favorite(2, true);
        assert!(c.target().row(2).unwrap().favorited);
        c.sort_by(SortField::Id);
        assert!(c.target().row(2).unwrap().favorited);
        c.apply_favorite(2, false);
        assert!(!c.target().row(2).unwrap().favorited);
    }

    #[test]
    fn test_with_favorited_keeps_other_keys() {
        let out = with_favorited(Some(r#"{"source":"phone"}"#), true);
        let v: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(v["source"], "phone");
        assert_eq!(v["favorited"], true);

        let out = with_favorited(Some("garbage"), true);
        assert_eq!(out, r#"{"favorited":true}"#);
    }

    #[test]
    fn test_content_actions() {
        let mut c = ListController::with_table(20);
        let mut image = text(2, "2024-01-01T00:00:00");
        image.kind = RecordType::Image;
        image.file_path = Some("history/a.png".to_string());
        let mut file = text(3, "2024-01-01T00:00:00");
        file.kind = RecordType::File;
        file.content = Some("report.pdf".to_string());
        file.file_path = Some("history/report.pdf".to_string());
        let mut orphan = text(4, "2024-01-01T00:00:00");
        orphan.kind = RecordType::Image;

        let ticket = c.begin_refresh().unwrap();
        c.finish_refresh(
            ticket.seq,
            Ok(HistoryPage {
                items: vec![text(1, "2024-01-01T00:00:00"), image, file, orphan],
                total: 4,
            }),
        );

        assert_eq!(c.content_action(1), ContentAction::CopyText("clip 1".to_string()));
        assert_eq!(c.content_action(2), ContentAction::OpenImage(2));
        assert_eq!(
            c.content_action(3),
            ContentAction::Download {
                id: 3,
                suggested_name: Some("report.pdf".to_string())
            }
        );
        assert_eq!(c.content_action(4), ContentAction::Nothing);
        assert_eq!(c.content_action(99), ContentAction::Nothing);
    }

    #[test]
    fn test_stats_check_skipped_with_filters() {
        let mut c = loaded(1..=3, 3);
        c.set_search("foo");
        assert!(!c.begin_stats_check());

        let mut c = loaded(1..=3, 3);
        c.cycle_favorite_filter();
        assert!(!c.begin_stats_check());
    }

    #[test]
    fn test_stats_check_detects_count_change() {
        let mut c = loaded(1..=3, 3);
        assert!(c.begin_stats_check());
        assert!(!c.begin_stats_check(), "only one stats request in flight");
        let same = Stats {
            total_records: 3,
            by_type: Default::default(),
            latest_sync: None,
        };
        assert!(!c.finish_stats_check(Ok(same)));

        assert!(c.begin_stats_check());
        let grew = Stats {
            total_records: 4,
            by_type: Default::default(),
            latest_sync: None,
        };
        assert!(c.finish_stats_check(Ok(grew)));

        assert!(c.begin_stats_check());
        assert!(!c.finish_stats_check(Err(ApiError::Unauthorized)));
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let mut c = loaded(1..=20, 100);
        assert!(c.next_page());
        assert_eq!(c.query().page, 2);
        assert!(c.cycle_type_filter());
        assert_eq!(c.query().page, 1);
        assert_eq!(c.query().type_filter, Some(RecordType::Text));

        assert!(c.next_page());
        assert!(c.set_search("abc"));
        assert_eq!(c.query().page, 1);
        assert!(!c.set_search("abc"));
    }

    #[test]
    fn test_page_navigation_guards() {
        let mut c = loaded(1..=20, 30);
        assert!(!c.prev_page());
        assert!(c.next_page());
        assert!(!c.next_page());
        assert!(c.prev_page());
    }

    impl ListController {
        fn next_page_for_test(&mut self, page: u32) {
            self.query.page = page;
        }
    }
}
