//! History screen: filter bar, record table, detail line, pagination footer.
//!
//! Owns the [`ListController`] and wires it to the effect layer. Key input is
//! resolved to [`Action`]s by the app's keymap before it reaches this view;
//! modals and search-bar text editing are handled here directly.

use std::time::{Duration, Instant};

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::api::{ApiError, BatchDeleteResult, FavoriteState, HistoryPage, Stats};
use crate::core::view::TableBody;
use crate::core::{ContentAction, ListController, RefreshOutcome, SortField};
use crate::tui::clipboard;
use crate::tui::events::{Action, NotificationLevel};
use crate::tui::keymap::Control;
use crate::tui::services::Services;
use crate::tui::theme;
use crate::tui::widgets::image_preview::ImagePreview;
use crate::tui::widgets::input_buffer::InputBuffer;

use super::modals::{ConfirmAction, ImageState, Modal, ModalResult};

const SEARCH_LABEL: &str = " [/] Search: ";

pub struct HistoryView {
    controller: ListController,
    /// Index of the cursor row in the rendered rows.
    cursor: usize,
    control: Control,
    search: InputBuffer,

    // ── Debounce state ──────────────────────────────────────────────
    search_pending: bool,
    last_search_edit: Option<Instant>,
    search_debounce: Duration,

    modal: Option<Modal>,
}

impl HistoryView {
    pub fn new(page_size: u32, search_debounce: Duration) -> Self {
        Self {
            controller: ListController::with_table(page_size),
            cursor: 0,
            control: Control::Table,
            search: InputBuffer::new(),
            search_pending: false,
            last_search_edit: None,
            search_debounce,
            modal: None,
        }
    }

    pub fn controller(&self) -> &ListController {
        &self.controller
    }

    pub fn control(&self) -> Control {
        self.control
    }

    pub fn has_modal(&self) -> bool {
        self.modal.is_some()
    }

    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Id of the record under the cursor.
    pub fn cursor_id(&self) -> Option<i64> {
        self.controller.target().rows.get(self.cursor).map(|r| r.id)
    }

    /// Issue one history fetch for the current query. Dropped while loading.
    pub fn refresh(&mut self, services: &Services) -> bool {
        match self.controller.begin_refresh() {
            Some(ticket) => {
                services.load_history(ticket);
                true
            }
            None => false,
        }
    }

    /// Poll-interval hook: compare record counts with the server.
    pub fn poll_changes(&mut self, services: &Services) {
        if self.controller.begin_stats_check() {
            services.check_stats();
        }
    }

    /// Tick hook: fire the debounced search once the input has settled.
    pub fn on_tick(&mut self, services: &Services) {
        if !self.search_pending {
            return;
        }
        if let Some(ts) = self.last_search_edit {
            if ts.elapsed() >= self.search_debounce {
                self.apply_search(services);
            }
        }
    }

    fn apply_search(&mut self, services: &Services) {
        self.search_pending = false;
        let query = self.search.text().trim().to_string();
        if self.controller.set_search(&query) {
            self.refresh(services);
        }
    }

    /// Text editing while the search bar has focus.
    pub fn edit_search(&mut self, key: &KeyEvent) {
        if self.search.handle_key(key) {
            self.search_pending = true;
            self.last_search_edit = Some(Instant::now());
        }
    }

    /// Drop all session state (logout or lost session).
    pub fn reset(&mut self) {
        self.controller.reset();
        self.cursor = 0;
        self.control = Control::Table;
        self.search.clear();
        self.search_pending = false;
        self.last_search_edit = None;
        self.modal = None;
    }

    fn clamp_cursor(&mut self) {
        let len = self.controller.target().rows.len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    // ── Actions ─────────────────────────────────────────────────────────

    pub fn apply(&mut self, action: Action, services: &Services) {
        let row_count = self.controller.target().rows.len();
        match action {
            Action::CursorDown => {
                if self.cursor + 1 < row_count {
                    self.cursor += 1;
                }
            }
            Action::CursorUp => self.cursor = self.cursor.saturating_sub(1),
            Action::CursorFirst => self.cursor = 0,
            Action::CursorLast => self.cursor = row_count.saturating_sub(1),
            Action::ToggleRow => {
                if let Some(id) = self.cursor_id() {
                    self.controller.toggle_row(id);
                }
            }
            Action::ToggleSelectAll => self.controller.activate_select_all(),
            Action::Activate => self.activate(services),
            Action::Preview => self.open_preview(),
            Action::ToggleFavorite => {
                if let Some(id) = self.cursor_id() {
                    services.toggle_favorite(id);
                }
            }
            Action::Delete => {
                if let Some(id) = self.cursor_id() {
                    self.modal = Some(Modal::confirm_delete(id));
                }
            }
            Action::BatchDelete => {
                if let Some(ids) = self.controller.batch_delete_ids() {
                    self.modal = Some(Modal::confirm_batch_delete(ids));
                }
            }
            Action::SortBy(field) => {
                let id = self.cursor_id();
                self.controller.sort_by(field);
                // Keep the cursor on the same record.
                if let Some(id) = id {
                    if let Some(idx) = self.controller.target().rows.iter().position(|r| r.id == id) {
                        self.cursor = idx;
                    }
                }
            }
            Action::FocusSearch => self.control = Control::SearchBar,
            Action::LeaveSearch => {
                self.control = Control::Table;
                if self.search_pending {
                    self.apply_search(services);
                }
            }
            Action::ClearSearch => {
                self.control = Control::Table;
                self.search.clear();
                self.apply_search(services);
            }
            Action::CycleTypeFilter => {
                if self.controller.cycle_type_filter() {
                    self.refresh(services);
                }
            }
            Action::CycleFavoriteFilter => {
                if self.controller.cycle_favorite_filter() {
                    self.refresh(services);
                }
            }
            Action::NextPage => {
                if self.controller.next_page() {
                    self.cursor = 0;
                    self.refresh(services);
                }
            }
            Action::PrevPage => {
                if self.controller.prev_page() {
                    self.cursor = 0;
                    self.refresh(services);
                }
            }
            Action::LargerPageSize | Action::SmallerPageSize => {
                if self.controller.step_page_size(action == Action::LargerPageSize) {
                    self.refresh(services);
                }
            }
            Action::Refresh => {
                self.refresh(services);
            }
            // Handled by the app.
            Action::Logout | Action::ShowHelp | Action::Quit => {}
        }
    }

    fn activate(&mut self, services: &Services) {
        let Some(id) = self.cursor_id() else {
            return;
        };
        match self.controller.content_action(id) {
            ContentAction::CopyText(text) => copy_to_clipboard(&text, services),
            ContentAction::OpenImage(id) => {
                self.modal = Some(Modal::Image {
                    id,
                    state: ImageState::Loading,
                });
                services.load_image(id);
            }
            ContentAction::Download { id, suggested_name } => {
                services.notify(format!("Downloading record #{id}..."), NotificationLevel::Info);
                services.download(id, suggested_name);
            }
            ContentAction::Nothing => {}
        }
    }

    fn open_preview(&mut self) {
        let Some(record) = self.cursor_id().and_then(|id| self.controller.record(id)) else {
            return;
        };
        self.modal = Some(Modal::TextPreview {
            id: record.id,
            text: record.content.clone().unwrap_or_default(),
            scroll: 0,
        });
    }

    pub fn handle_modal_key(&mut self, key: &KeyEvent, services: &Services) {
        let Some(modal) = self.modal.as_mut() else {
            return;
        };
        match modal.handle_key(key) {
            ModalResult::Consumed => {}
            ModalResult::Close => self.modal = None,
            ModalResult::Copy(text) => copy_to_clipboard(&text, services),
            ModalResult::Confirm(action) => {
                self.modal = None;
                match action {
                    ConfirmAction::DeleteRecord(id) => services.delete_record(id),
                    ConfirmAction::BatchDelete(ids) => services.batch_delete(ids),
                }
            }
        }
    }

    // ── API results ─────────────────────────────────────────────────────

    pub fn on_history_loaded(
        &mut self,
        seq: u64,
        result: Result<HistoryPage, ApiError>,
        services: &Services,
    ) {
        let outcome = self.controller.finish_refresh(seq, result);
        self.clamp_cursor();
        if outcome == RefreshOutcome::PageClamped {
            self.refresh(services);
        }
    }

    pub fn on_stats(&mut self, result: Result<Stats, ApiError>, services: &Services) {
        if self.controller.finish_stats_check(result) {
            self.refresh(services);
        }
    }

    pub fn on_favorite_toggled(
        &mut self,
        id: i64,
        result: Result<FavoriteState, ApiError>,
        services: &Services,
    ) {
        match result {
            Ok(state) => self.controller.apply_favorite(id, state.favorited),
            Err(e) => {
                log::warn!("Favorite toggle for {id} failed: {e}");
                services.notify(format!("Favorite failed: {e}"), NotificationLevel::Error);
            }
        }
    }

    pub fn on_record_deleted(&mut self, id: i64, result: Result<(), ApiError>, services: &Services) {
        if self.controller.finish_delete(id, &result) {
            services.notify(format!("Deleted record #{id}"), NotificationLevel::Success);
            self.refresh(services);
        } else if let Err(e) = result {
            self.modal = Some(Modal::alert("Delete failed", e.to_string()));
        }
    }

    pub fn on_batch_deleted(
        &mut self,
        result: Result<BatchDeleteResult, ApiError>,
        services: &Services,
    ) {
        let requested = self.controller.selection().len() as u64;
        if self.controller.finish_batch_delete(&result) {
            let count = result
                .ok()
                .and_then(|r| r.deleted_count)
                .unwrap_or(requested);
            services.notify(format!("Deleted {count} records"), NotificationLevel::Success);
            self.refresh(services);
        } else if let Err(e) = result {
            self.modal = Some(Modal::alert("Batch delete failed", e.to_string()));
        }
    }

    pub fn on_image_loaded(&mut self, id: i64, result: Result<ImagePreview, ApiError>) {
        let Some(Modal::Image { id: open_id, state }) = self.modal.as_mut() else {
            return;
        };
        if *open_id != id {
            return;
        }
        *state = match result {
            Ok(preview) => ImageState::Ready(preview),
            Err(e) => ImageState::Failed(format!("Failed to load image: {e}")),
        };
    }

    pub fn on_downloaded(
        &mut self,
        id: i64,
        result: Result<std::path::PathBuf, ApiError>,
        services: &Services,
    ) {
        match result {
            Ok(path) => services.notify(
                format!("Saved to {}", path.display()),
                NotificationLevel::Success,
            ),
            Err(e) => {
                log::warn!("Download of record {id} failed: {e}");
                services.notify(format!("Download failed: {e}"), NotificationLevel::Error);
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let rows = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

        self.render_filter_bar(frame, rows[0]);
        self.render_table(frame, rows[1]);
        self.render_detail(frame, rows[2]);
        self.render_footer(frame, rows[3]);

        if let Some(ref modal) = self.modal {
            modal.render(frame, area);
        }
    }

    fn render_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let query = self.controller.query();
        let focused = self.control == Control::SearchBar;
        let text = self.search.text();

        let search = if focused {
            Span::styled(text.to_string(), Style::default().fg(theme::TEXT))
        } else if text.is_empty() {
            Span::styled("Press / to search...", theme::dim())
        } else {
            Span::styled(text.to_string(), Style::default().fg(theme::TEXT))
        };
        let prefix = if focused { theme::key_hint() } else { theme::muted() };
        let kind = query
            .type_filter
            .as_ref()
            .map(|k| k.as_str().to_string())
            .unwrap_or_else(|| "all".to_string());

        let line = Line::from(vec![
            Span::styled(SEARCH_LABEL, prefix),
            search,
            Span::raw("  "),
            Span::styled("[t] Type: ", theme::muted()),
            Span::styled(kind, theme::heading()),
            Span::raw("  "),
            Span::styled("[F] Favorites: ", theme::muted()),
            Span::styled(query.favorite_filter.label(), theme::heading()),
            Span::raw("  "),
            Span::styled("[+/-] Per page: ", theme::muted()),
            Span::styled(query.page_size.to_string(), theme::heading()),
        ]);
        frame.render_widget(Paragraph::new(line), area);

        if let Some(position) = self.search_cursor(area) {
            frame.set_cursor_position(position);
        }
    }

    /// Terminal cursor cell while the search bar has focus.
    fn search_cursor(&self, area: Rect) -> Option<(u16, u16)> {
        if self.control != Control::SearchBar || self.modal.is_some() {
            return None;
        }
        let col = SEARCH_LABEL.chars().count() + self.search.cursor_col();
        let x = area.x.saturating_add(u16::try_from(col).unwrap_or(u16::MAX));
        (x < area.right()).then_some((x, area.y))
    }

    fn render_table(&self, frame: &mut Frame, area: Rect) {
        let view = self.controller.target();
        let block = if self.control == Control::Table && self.modal.is_none() {
            theme::block_focused("Clipboard History")
        } else {
            theme::block_default("Clipboard History")
        };

        match view.body {
            TableBody::Pending => {
                frame.render_widget(
                    Paragraph::new(Span::styled("  Loading...", theme::muted())).block(block),
                    area,
                );
                return;
            }
            TableBody::Empty => {
                frame.render_widget(
                    Paragraph::new(Span::styled("  No clipboard records", theme::muted()))
                        .block(block),
                    area,
                );
                return;
            }
            TableBody::Error(ref message) => {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("  {message}"),
                        Style::default().fg(theme::ERROR),
                    ))
                    .block(block),
                    area,
                );
                return;
            }
            TableBody::Rows => {}
        }

        let header_cell = |field: SortField| {
            let label = if view.sort_field == field {
                format!("{} {}", field.label(), view.sort_order.arrow())
            } else {
                field.label().to_string()
            };
            Cell::from(label)
        };
        let header = Row::new(vec![
            Cell::from(view.select_all.glyph()),
            header_cell(SortField::Id),
            header_cell(SortField::Type),
            Cell::from("★"),
            header_cell(SortField::Content),
            header_cell(SortField::Size),
            header_cell(SortField::CreatedAt),
        ])
        .style(theme::heading());

        let rows: Vec<Row> = view
            .rows
            .iter()
            .map(|row| {
                let check = if row.selected { "[x]" } else { "[ ]" };
                let star = if row.favorited {
                    Span::styled("★", Style::default().fg(theme::FAVORITE))
                } else {
                    Span::styled("☆", theme::dim())
                };
                let preview = row.preview.replace(['\n', '\r', '\t'], " ");
                Row::new(vec![
                    Cell::from(check),
                    Cell::from(row.id.to_string()),
                    Cell::from(Span::styled(
                        row.kind.as_str().to_string(),
                        Style::default().fg(theme::type_color(&row.kind)),
                    )),
                    Cell::from(star),
                    Cell::from(preview),
                    Cell::from(row.size.clone()),
                    Cell::from(row.time.clone()),
                ])
            })
            .collect();

        let widths = [
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Length(6),
            Constraint::Length(2),
            Constraint::Min(10),
            Constraint::Length(11),
            Constraint::Length(16),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(theme::highlight());
        let mut state = TableState::default().with_selected(Some(self.cursor));
        frame.render_stateful_widget(table, area, &mut state);
    }

    /// Full text of the cursor row when its preview was truncated.
    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let Some(row) = self.controller.target().rows.get(self.cursor) else {
            return;
        };
        let text = match row.title {
            Some(ref full) => full.replace(['\n', '\r', '\t'], " "),
            None => self
                .controller
                .record(row.id)
                .and_then(|r| r.file_path.clone())
                .unwrap_or_default(),
        };
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {text}"),
                theme::muted().add_modifier(Modifier::ITALIC),
            )),
            area,
        );
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let view = self.controller.target();
        let p = &view.pagination;

        let nav = |enabled: bool, label: &'static str| {
            if enabled {
                Span::styled(label, theme::key_hint())
            } else {
                Span::styled(label, theme::dim())
            }
        };

        let mut spans = vec![
            Span::raw(" "),
            nav(p.prev_enabled, "‹ p"),
            Span::raw("  "),
            Span::styled(p.range_label.clone(), Style::default().fg(theme::TEXT)),
            Span::styled(
                format!("  page {}/{}", p.page, p.total_pages.max(1)),
                theme::muted(),
            ),
            Span::raw("  "),
            nav(p.next_enabled, "n ›"),
        ];

        if let Some(label) = view.batch_delete_label() {
            spans.push(Span::raw("   "));
            spans.push(Span::styled("[x] ", theme::key_hint()));
            spans.push(Span::styled(label, Style::default().fg(theme::ERROR)));
        }
        if view.loading {
            spans.push(Span::styled("   loading...", theme::muted()));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

fn copy_to_clipboard(text: &str, services: &Services) {
    match clipboard::copy(text) {
        Ok(()) => services.notify("Copied", NotificationLevel::Success),
        Err(e) => {
            log::warn!("Clipboard write failed: {e}");
            services.notify(format!("Copy failed: {e}"), NotificationLevel::Error);
        }
    }
}
