//! Login form.
//!
//! Two fields and a submit on Enter. The form never talks to the server; it
//! hands [`Credentials`] to the app, which calls `Services::login`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::api::Credentials;
use crate::tui::layout::centered_fixed;
use crate::tui::theme;
use crate::tui::widgets::input_buffer::InputBuffer;

/// `"{label:>10}: "`
const LABEL_WIDTH: usize = 12;
/// Username line within the form; the password line follows it.
const FIELD_ROW: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginResult {
    Consumed,
    Submit(Credentials),
    Quit,
}

pub struct LoginState {
    username: InputBuffer,
    password: InputBuffer,
    field: LoginField,
    error: Option<String>,
    submitting: bool,
    server: String,
}

impl LoginState {
    pub fn new(server: &str, username: Option<&str>) -> Self {
        let username = username.map(InputBuffer::with_text).unwrap_or_default();
        let field = if username.text().is_empty() {
            LoginField::Username
        } else {
            LoginField::Password
        };
        Self {
            username,
            password: InputBuffer::new(),
            field,
            error: None,
            submitting: false,
            server: server.to_string(),
        }
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.submitting = false;
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Clear the password and any in-flight state (after logout or success).
    pub fn reset(&mut self) {
        self.password.clear();
        self.submitting = false;
        self.error = None;
        self.field = if self.username.text().is_empty() {
            LoginField::Username
        } else {
            LoginField::Password
        };
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> LoginResult {
        if key.kind != KeyEventKind::Press {
            return LoginResult::Consumed;
        }
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c')) | (_, KeyCode::Esc) => LoginResult::Quit,
            (_, KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up) => {
                self.field = match self.field {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
                LoginResult::Consumed
            }
            (_, KeyCode::Enter) => self.submit(),
            _ => {
                let buffer = match self.field {
                    LoginField::Username => &mut self.username,
                    LoginField::Password => &mut self.password,
                };
                if buffer.handle_key(key) {
                    self.error = None;
                }
                LoginResult::Consumed
            }
        }
    }

    fn submit(&mut self) -> LoginResult {
        if self.submitting {
            return LoginResult::Consumed;
        }
        if self.field == LoginField::Username && self.password.text().is_empty() {
            self.field = LoginField::Password;
            return LoginResult::Consumed;
        }
        let username = self.username.text().trim().to_string();
        if username.is_empty() || self.password.text().is_empty() {
            self.error = Some("Username and password are required".to_string());
            return LoginResult::Consumed;
        }
        self.submitting = true;
        self.error = None;
        LoginResult::Submit(Credentials {
            username,
            password: self.password.text().to_string(),
        })
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let modal = centered_fixed(50, 11, area);
        frame.render_widget(Clear, modal);

        let field_line = |label: &str, value: String, focused: bool| {
            let label_style = if focused {
                theme::key_hint()
            } else {
                theme::muted()
            };
            Line::from(vec![
                Span::styled(format!("{label:>10}: "), label_style),
                Span::styled(value, Style::default().fg(theme::TEXT)),
            ])
        };

        let status = if self.is_submitting() {
            Line::from(Span::styled("Signing in...", theme::muted()))
        } else if let Some(ref error) = self.error {
            Line::from(Span::styled(error.clone(), Style::default().fg(theme::ERROR)))
        } else {
            Line::raw("")
        };

        let lines = vec![
            Line::from(Span::styled(self.server.clone(), theme::dim())),
            Line::raw(""),
            field_line(
                "Username",
                self.username.text().to_string(),
                self.field == LoginField::Username,
            ),
            field_line(
                "Password",
                self.password.masked(),
                self.field == LoginField::Password,
            ),
            Line::raw(""),
            status,
            Line::raw(""),
            Line::from(vec![
                Span::styled("Enter", theme::key_hint()),
                Span::raw(" sign in  "),
                Span::styled("Tab", theme::key_hint()),
                Span::raw(" switch field  "),
                Span::styled("Esc", theme::key_hint()),
                Span::raw(" quit"),
            ]),
        ];

        let block = theme::block_focused("Clipboard History · Sign in");
        let inner = block.inner(modal);
        frame.render_widget(
            Paragraph::new(lines).alignment(Alignment::Center).block(block),
            modal,
        );

        if let Some(position) = self.cursor_position(inner) {
            frame.set_cursor_position(position);
        }
    }

    /// Terminal cursor cell in the focused field of the centered form.
    /// Hidden while a sign-in is in flight.
    fn cursor_position(&self, inner: Rect) -> Option<(u16, u16)> {
        if self.is_submitting() {
            return None;
        }
        let (buffer, row) = match self.field {
            LoginField::Username => (&self.username, FIELD_ROW),
            LoginField::Password => (&self.password, FIELD_ROW + 1),
        };
        let line_width = LABEL_WIDTH + buffer.text().chars().count();
        let line_width = u16::try_from(line_width).unwrap_or(u16::MAX);
        // Same offset Paragraph uses for centered lines.
        let offset = (inner.width / 2).saturating_sub(line_width / 2);
        let col = u16::try_from(LABEL_WIDTH + buffer.cursor_col()).unwrap_or(u16::MAX);
        let x = inner.x.saturating_add(offset).saturating_add(col);
        let y = inner.y + row;
        (x < inner.right() && y < inner.bottom()).then_some((x, y))
    }
}
