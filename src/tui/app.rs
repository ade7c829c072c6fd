use std::io;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};
use tokio::sync::mpsc;

use crate::api::{ApiError, AuthStatus, Credentials};
use crate::config::AppConfig;

use super::events::{Action, AppEvent, Notification, NotificationLevel};
use super::keymap::{Control, KeyMap};
use super::layout::{centered_rect, AppLayout};
use super::services::Services;
use super::theme;
use super::views::history::HistoryView;
use super::views::login::{LoginResult, LoginState};

/// Maximum notifications shown at once.
const MAX_NOTIFICATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Waiting for the startup auth check (or the automatic login).
    Connecting,
    Login,
    History,
}

/// Central application state (Elm architecture).
pub struct AppState {
    pub running: bool,
    screen: Screen,
    pub login: LoginState,
    pub history: HistoryView,
    /// Active notifications (max 3 visible).
    pub notifications: Vec<Notification>,
    notification_counter: u64,
    pub show_help: bool,
    username: Option<String>,
    server: String,
    keymap: KeyMap,
    /// Configured credentials, consumed by the one automatic login attempt.
    auto_credentials: Option<Credentials>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    services: Services,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        services: Services,
    ) -> Self {
        let server = &config.server;
        let auto_credentials = match (&server.username, &server.password) {
            (Some(username), Some(password)) => Some(Credentials {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };
        Self {
            running: true,
            screen: Screen::Connecting,
            login: LoginState::new(&server.base_url, server.username.as_deref()),
            history: HistoryView::new(
                config.list.page_size,
                Duration::from_millis(config.list.search_debounce_ms),
            ),
            notifications: Vec::new(),
            notification_counter: 0,
            show_help: false,
            username: None,
            server: server.base_url.clone(),
            keymap: KeyMap::default(),
            auto_credentials,
            event_rx,
            services,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Kick off the startup auth check.
    pub fn start(&mut self) {
        self.services.check_auth();
    }

    // ── Elm event loop ──────────────────────────────────────────────────

    /// Main event loop: render → select → update → loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        tick_rate: Duration,
        poll_interval: Duration,
    ) -> io::Result<()> {
        let mut tick_interval = tokio::time::interval(tick_rate);
        let mut poll_interval = tokio::time::interval(poll_interval);
        poll_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut event_stream = EventStream::new();

        self.start();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;

            tokio::select! {
                _ = tick_interval.tick() => {
                    self.handle_event(AppEvent::Tick);
                }
                _ = poll_interval.tick() => {
                    self.on_poll();
                }
                Some(event) = self.event_rx.recv() => {
                    self.handle_event(event);
                }
                Some(Ok(crossterm_event)) = event_stream.next() => {
                    self.handle_event(AppEvent::Input(crossterm_event));
                }
            }
        }

        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(Event::Key(key)) => self.handle_key(&key),
            AppEvent::Input(_) => {}
            AppEvent::Tick => self.on_tick(),
            AppEvent::AuthChecked(result) => self.on_auth_checked(result),
            AppEvent::LoginFinished(result) => self.on_login_finished(result),
            AppEvent::LoggedOut => {
                self.history.reset();
                self.login.reset();
                self.username = None;
                self.screen = Screen::Login;
                log::info!("Logged out");
            }
            AppEvent::HistoryLoaded { seq, result } => {
                if !self.session_lost(&result) {
                    self.history.on_history_loaded(seq, result, &self.services);
                }
            }
            AppEvent::StatsLoaded(result) => {
                if !self.session_lost(&result) {
                    self.history.on_stats(result, &self.services);
                }
            }
            AppEvent::FavoriteToggled { id, result } => {
                if !self.session_lost(&result) {
                    self.history.on_favorite_toggled(id, result, &self.services);
                }
            }
            AppEvent::RecordDeleted { id, result } => {
                if !self.session_lost(&result) {
                    self.history.on_record_deleted(id, result, &self.services);
                }
            }
            AppEvent::BatchDeleted(result) => {
                if !self.session_lost(&result) {
                    self.history.on_batch_deleted(result, &self.services);
                }
            }
            AppEvent::ImageLoaded { id, result } => {
                if !self.session_lost(&result) {
                    self.history.on_image_loaded(id, result);
                }
            }
            AppEvent::Downloaded { id, result } => {
                if !self.session_lost(&result) {
                    self.history.on_downloaded(id, result, &self.services);
                }
            }
            AppEvent::Notification(notification) => {
                self.push_notification(notification.message, notification.level);
            }
            AppEvent::Quit => self.running = false,
        }
    }

    /// On a 401, drop the session and return to the login form.
    fn session_lost<T>(&mut self, result: &Result<T, ApiError>) -> bool {
        let lost = matches!(result, Err(e) if e.is_unauthorized());
        if lost && self.screen == Screen::History {
            log::warn!("Session rejected by server, returning to login");
            self.history.reset();
            self.login.reset();
            self.login.set_error("Session expired, please sign in again");
            self.username = None;
            self.screen = Screen::Login;
        }
        lost
    }

    fn on_auth_checked(&mut self, result: Result<AuthStatus, ApiError>) {
        match result {
            Ok(status) if status.authenticated => self.enter_history(status.username),
            Ok(_) => match self.auto_credentials.take() {
                Some(credentials) => {
                    log::info!("Signing in as {} from configuration", credentials.username);
                    self.services.login(credentials);
                }
                None => self.screen = Screen::Login,
            },
            Err(e) => {
                log::warn!("Auth check failed: {e}");
                self.login.set_error(format!("Cannot reach server: {e}"));
                self.screen = Screen::Login;
            }
        }
    }

    fn on_login_finished(&mut self, result: Result<AuthStatus, ApiError>) {
        match result {
            Ok(status) if status.authenticated => self.enter_history(status.username),
            Ok(_) => {
                self.login.set_error("Login did not establish a session");
                self.screen = Screen::Login;
            }
            Err(ApiError::Unauthorized) => {
                self.login.set_error("Invalid username or password");
                self.screen = Screen::Login;
            }
            Err(e) => {
                log::warn!("Login failed: {e}");
                self.login.set_error(format!("Login failed: {e}"));
                self.screen = Screen::Login;
            }
        }
    }

    fn enter_history(&mut self, username: Option<String>) {
        log::info!("Signed in as {}", username.as_deref().unwrap_or("<unknown>"));
        self.username = username;
        self.login.reset();
        self.screen = Screen::History;
        self.history.refresh(&self.services);
    }

    fn handle_key(&mut self, key: &KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return;
        }

        match self.screen {
            Screen::Connecting => {
                let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL)
                    && key.code == KeyCode::Char('c');
                if ctrl_c || key.code == KeyCode::Char('q') {
                    self.running = false;
                }
            }
            Screen::Login => match self.login.handle_key(key) {
                LoginResult::Submit(credentials) => self.services.login(credentials),
                LoginResult::Quit => self.running = false,
                LoginResult::Consumed => {}
            },
            Screen::History => {
                if self.history.has_modal() {
                    self.history.handle_modal_key(key, &self.services);
                    return;
                }
                let control = self.history.control();
                match self.keymap.resolve(control, key) {
                    Some(action) => self.handle_action(action),
                    None if control == Control::SearchBar => self.history.edit_search(key),
                    None => {}
                }
            }
        }
    }

    fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::Logout => self.services.logout(),
            Action::ShowHelp => self.show_help = true,
            other => self.history.apply(other, &self.services),
        }
    }

    // ── Timers ──────────────────────────────────────────────────────────

    /// Tick: decrement notification TTLs, run the search debounce.
    fn on_tick(&mut self) {
        for n in &mut self.notifications {
            n.ttl_ticks = n.ttl_ticks.saturating_sub(1);
        }
        self.notifications.retain(|n| n.ttl_ticks > 0);

        if self.screen == Screen::History {
            self.history.on_tick(&self.services);
        }
    }

    fn on_poll(&mut self) {
        if self.screen == Screen::History {
            self.history.poll_changes(&self.services);
        }
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Push a notification (dedup by message, max 3).
    pub fn push_notification(&mut self, message: String, level: NotificationLevel) {
        if self.notifications.iter().any(|n| n.message == message) {
            return;
        }

        self.notification_counter += 1;
        let mut notification = Notification::new(message, level);
        notification.id = self.notification_counter;
        self.notifications.push(notification);

        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.remove(0);
        }
    }

    // ── Rendering ───────────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let layout = AppLayout::compute(area);

        self.render_header(frame, layout.header);
        match self.screen {
            Screen::Connecting => {
                frame.render_widget(
                    Paragraph::new(Span::styled(
                        format!("Connecting to {}...", self.server),
                        theme::muted(),
                    ))
                    .alignment(Alignment::Center),
                    layout.main,
                );
            }
            Screen::Login => self.login.render(frame, layout.main),
            Screen::History => self.history.render(frame, layout.main),
        }
        self.render_status_bar(frame, layout.status);

        self.render_notifications(frame, area);
        if self.show_help {
            self.render_help_modal(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" cliptui ", theme::brand_badge()),
            Span::raw(" "),
            Span::styled(self.server.clone(), theme::dim()),
        ];
        if let Some(ref user) = self.username {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(format!("● {user}"), Style::default().fg(theme::SUCCESS)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let hints: &[(&str, &str)] = match self.screen {
            Screen::History if self.history.control() == Control::SearchBar => {
                &[("Enter", "apply"), ("Esc", "clear"), ("Ctrl+U", "erase")]
            }
            Screen::History => &[
                ("Space", "select"),
                ("Enter", "open"),
                ("v", "view"),
                ("f", "fav"),
                ("d", "delete"),
                ("1-5", "sort"),
                ("?", "help"),
                ("q", "quit"),
            ],
            _ => &[("Esc", "quit")],
        };

        let mut spans = Vec::with_capacity(hints.len() * 2);
        for (key, label) in hints {
            spans.push(Span::styled(format!(" {key}"), theme::key_hint()));
            spans.push(Span::styled(format!(":{label}"), theme::muted()));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_notifications(&self, frame: &mut Frame, area: Rect) {
        if self.notifications.is_empty() {
            return;
        }

        let max_width = 50.min(area.width.saturating_sub(2));
        let height = (self.notifications.len() as u16).min(area.height);
        let x = area.width.saturating_sub(max_width + 1);
        let notification_area = Rect::new(x, 1.min(area.height.saturating_sub(height)), max_width, height);

        let lines: Vec<Line> = self
            .notifications
            .iter()
            .map(|n| {
                let (prefix, color) = match n.level {
                    NotificationLevel::Info => ("ℹ", theme::INFO),
                    NotificationLevel::Success => ("✓", theme::SUCCESS),
                    NotificationLevel::Warning => ("⚠", theme::WARNING),
                    NotificationLevel::Error => ("✗", theme::ERROR),
                };
                Line::from(vec![
                    Span::styled(format!(" {prefix} "), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                    Span::raw(n.message.as_str()),
                ])
            })
            .collect();

        frame.render_widget(Clear, notification_area);
        frame.render_widget(Paragraph::new(lines), notification_area);
    }

    fn render_help_modal(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_rect(60, 80, area);

        let keybindings = [
            ("Table:", ""),
            ("j/k  ↓/↑", "Move cursor"),
            ("g / G", "First / last row"),
            ("Space", "Select row"),
            ("a", "Select / deselect all rows"),
            ("Enter", "Copy text / view image / download file"),
            ("v", "View full text"),
            ("f", "Toggle favorite"),
            ("d / Delete", "Delete record"),
            ("x", "Delete selected records"),
            ("1-5", "Sort by ID, Type, Content, Size, Time"),
            ("", ""),
            ("Filters:", ""),
            ("/", "Search (Enter applies, Esc clears)"),
            ("t", "Cycle type filter"),
            ("F", "Cycle favorite filter"),
            ("n / p  → / ←", "Next / previous page"),
            ("+ / -", "Larger / smaller pages"),
            ("r", "Refresh"),
            ("", ""),
            ("Application:", ""),
            ("L", "Log out"),
            ("?", "Toggle this help"),
            ("q / Ctrl+C", "Quit"),
        ];

        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(" Keybindings", theme::title())),
            Line::raw(""),
        ];

        for (key, desc) in keybindings {
            if key.is_empty() {
                lines.push(Line::raw(""));
            } else if desc.is_empty() {
                lines.push(Line::from(Span::styled(format!("  {key}"), theme::title())));
            } else {
                lines.push(Line::from(vec![
                    Span::raw("  "),
                    Span::styled(format!("{key:<16}"), theme::key_hint()),
                    Span::raw(desc),
                ]));
            }
        }

        lines.push(Line::raw(""));
        lines.push(Line::from(vec![
            Span::raw("  Press "),
            Span::styled("?", theme::key_hint()),
            Span::raw(" or "),
            Span::styled("Esc", theme::key_hint()),
            Span::raw(" to close"),
        ]));

        let block = Block::default()
            .title(" Help ")
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::ACCENT).add_modifier(Modifier::BOLD));

        frame.render_widget(Clear, modal);
        frame.render_widget(Paragraph::new(lines).block(block), modal);
    }
}
