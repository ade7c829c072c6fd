//! Modal overlays for the history screen.
//!
//! A modal consumes all key input while open. Closing and confirming are
//! reported to the owner through [`ModalResult`]; the modal itself never
//! touches the controller.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
    Frame,
};

use crate::tui::layout::{centered_fixed, centered_rect};
use crate::tui::theme;
use crate::tui::widgets::image_preview::ImagePreview;

/// Destructive operation awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteRecord(i64),
    BatchDelete(Vec<i64>),
}

pub enum ImageState {
    Loading,
    Ready(ImagePreview),
    Failed(String),
}

pub enum Modal {
    Confirm {
        message: String,
        action: ConfirmAction,
    },
    /// Blocking error report; only dismissal is possible.
    Alert { title: String, message: String },
    TextPreview { id: i64, text: String, scroll: u16 },
    Image { id: i64, state: ImageState },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalResult {
    Consumed,
    Close,
    Confirm(ConfirmAction),
    Copy(String),
}

impl Modal {
    pub fn confirm_delete(id: i64) -> Self {
        Modal::Confirm {
            message: format!("Delete record #{id}?"),
            action: ConfirmAction::DeleteRecord(id),
        }
    }

    pub fn confirm_batch_delete(ids: Vec<i64>) -> Self {
        Modal::Confirm {
            message: format!("Delete {} selected records?", ids.len()),
            action: ConfirmAction::BatchDelete(ids),
        }
    }

    pub fn alert(title: impl Into<String>, message: impl Into<String>) -> Self {
        Modal::Alert {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> ModalResult {
        if key.kind != KeyEventKind::Press {
            return ModalResult::Consumed;
        }
        match self {
            Modal::Confirm { action, .. } => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => ModalResult::Confirm(action.clone()),
                KeyCode::Char('n') | KeyCode::Esc | KeyCode::Char('q') => ModalResult::Close,
                _ => ModalResult::Consumed,
            },
            Modal::Alert { .. } => match key.code {
                KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q') => ModalResult::Close,
                _ => ModalResult::Consumed,
            },
            Modal::TextPreview { text, scroll, .. } => match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('v') => ModalResult::Close,
                KeyCode::Char('c') | KeyCode::Char('y') | KeyCode::Enter => {
                    ModalResult::Copy(text.clone())
                }
                KeyCode::Char('j') | KeyCode::Down => {
                    *scroll = scroll.saturating_add(1);
                    ModalResult::Consumed
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    *scroll = scroll.saturating_sub(1);
                    ModalResult::Consumed
                }
                KeyCode::PageDown => {
                    *scroll = scroll.saturating_add(10);
                    ModalResult::Consumed
                }
                KeyCode::PageUp => {
                    *scroll = scroll.saturating_sub(10);
                    ModalResult::Consumed
                }
                KeyCode::Char('g') => {
                    *scroll = 0;
                    ModalResult::Consumed
                }
                _ => ModalResult::Consumed,
            },
            Modal::Image { .. } => match key.code {
                KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => ModalResult::Close,
                _ => ModalResult::Consumed,
            },
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        match self {
            Modal::Confirm { message, .. } => render_confirm(frame, area, message),
            Modal::Alert { title, message } => render_alert(frame, area, title, message),
            Modal::TextPreview { id, text, scroll } => {
                render_text_preview(frame, area, *id, text, *scroll)
            }
            Modal::Image { id, state } => render_image(frame, area, *id, state),
        }
    }
}

fn render_confirm(frame: &mut Frame, area: Rect, message: &str) {
    let modal = centered_fixed(48, 7, area);
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(message.to_string(), theme::title())),
        Line::raw(""),
        Line::from(vec![
            Span::styled("y", theme::key_hint()),
            Span::raw(" confirm   "),
            Span::styled("n", theme::key_hint()),
            Span::raw(" cancel"),
        ]),
    ];
    frame.render_widget(Clear, modal);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .block(theme::block_focused("Confirm")),
        modal,
    );
}

fn render_alert(frame: &mut Frame, area: Rect, title: &str, message: &str) {
    let modal = centered_fixed(56, 8, area);
    let block = theme::block_focused(title).border_style(Style::default().fg(theme::ERROR));
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(message.to_string(), Style::default().fg(theme::TEXT))),
        Line::raw(""),
        Line::from(vec![Span::styled("Enter", theme::key_hint()), Span::raw(" dismiss")]),
    ];
    frame.render_widget(Clear, modal);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block),
        modal,
    );
}

fn render_text_preview(frame: &mut Frame, area: Rect, id: i64, text: &str, scroll: u16) {
    let modal = centered_rect(80, 80, area);
    let title = format!("Record #{id}");
    let block = theme::block_focused(&title);
    let inner = block.inner(modal);
    frame.render_widget(Clear, modal);
    frame.render_widget(block, modal);

    let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
    frame.render_widget(
        Paragraph::new(text.to_string())
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("c", theme::key_hint()),
            Span::raw(" copy  "),
            Span::styled("j/k", theme::key_hint()),
            Span::raw(" scroll  "),
            Span::styled("Esc", theme::key_hint()),
            Span::raw(" close"),
        ])),
        rows[1],
    );
}

fn render_image(frame: &mut Frame, area: Rect, id: i64, state: &ImageState) {
    let modal = centered_rect(80, 85, area);
    let title = format!("Image #{id}");
    let block = theme::block_focused(&title);
    let inner = block.inner(modal);
    frame.render_widget(Clear, modal);
    frame.render_widget(block, modal);

    match state {
        ImageState::Loading => frame.render_widget(
            Paragraph::new(Span::styled("Loading image...", theme::muted()))
                .alignment(Alignment::Center),
            inner,
        ),
        ImageState::Failed(message) => frame.render_widget(
            Paragraph::new(Span::styled(
                message.clone(),
                Style::default().fg(theme::ERROR),
            ))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
            inner,
        ),
        ImageState::Ready(preview) => {
            let rows = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
            let lines = preview.lines(rows[0].width, rows[0].height);
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), rows[0]);
            let (w, h) = preview.dimensions();
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!("{w}×{h}"),
                    theme::muted().add_modifier(Modifier::ITALIC),
                ))
                .alignment(Alignment::Center),
                rows[1],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_confirm_yes_and_no() {
        let mut modal = Modal::confirm_delete(4);
        assert_eq!(
            modal.handle_key(&press(KeyCode::Char('y'))),
            ModalResult::Confirm(ConfirmAction::DeleteRecord(4))
        );
        assert_eq!(modal.handle_key(&press(KeyCode::Esc)), ModalResult::Close);
        assert_eq!(modal.handle_key(&press(KeyCode::Char('x'))), ModalResult::Consumed);
    }

    #[test]
    fn test_batch_confirm_carries_ids_in_order() {
        let mut modal = Modal::confirm_batch_delete(vec![9, 2, 5]);
        assert_eq!(
            modal.handle_key(&press(KeyCode::Enter)),
            ModalResult::Confirm(ConfirmAction::BatchDelete(vec![9, 2, 5]))
        );
        match modal {
            Modal::Confirm { message, .. } => assert_eq!(message, "Delete 3 selected records?"),
            _ => panic!("expected confirm modal"),
        }
    }

    #[test]
    fn test_text_preview_scroll_and_copy() {
        let mut modal = Modal::TextPreview {
            id: 1,
            text: "hello".to_string(),
            scroll: 0,
        };
        modal.handle_key(&press(KeyCode::Char('k')));
        modal.handle_key(&press(KeyCode::Char('j')));
        modal.handle_key(&press(KeyCode::Char('j')));
        assert!(matches!(modal, Modal::TextPreview { scroll: 2, .. }));
        assert_eq!(
            modal.handle_key(&press(KeyCode::Char('c'))),
            ModalResult::Copy("hello".to_string())
        );
        assert_eq!(modal.handle_key(&press(KeyCode::Esc)), ModalResult::Close);
    }

    #[test]
    fn test_alert_only_dismisses() {
        let mut modal = Modal::alert("Delete failed", "Server returned 500");
        assert_eq!(modal.handle_key(&press(KeyCode::Char('y'))), ModalResult::Consumed);
        assert_eq!(modal.handle_key(&press(KeyCode::Enter)), ModalResult::Close);
    }
}
