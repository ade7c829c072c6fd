//! Key dispatch table.
//!
//! Every binding is an entry `(Control, KeyCode, KeyModifiers) → Action`.
//! Character keys are stored without `SHIFT`, since terminals disagree on
//! whether `G` arrives with the modifier set.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::events::Action;
use crate::core::SortField;

/// The control that currently receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Table,
    SearchBar,
}

pub struct KeyMap {
    bindings: HashMap<(Control, KeyCode, KeyModifiers), Action>,
}

impl Default for KeyMap {
    fn default() -> Self {
        use Action::*;
        use Control::*;

        let mut map = Self {
            bindings: HashMap::new(),
        };

        for (code, action) in [
            (KeyCode::Char('j'), CursorDown),
            (KeyCode::Down, CursorDown),
            (KeyCode::Char('k'), CursorUp),
            (KeyCode::Up, CursorUp),
            (KeyCode::Char('g'), CursorFirst),
            (KeyCode::Char('G'), CursorLast),
            (KeyCode::Char(' '), ToggleRow),
            (KeyCode::Char('a'), ToggleSelectAll),
            (KeyCode::Enter, Activate),
            (KeyCode::Char('v'), Preview),
            (KeyCode::Char('f'), ToggleFavorite),
            (KeyCode::Char('d'), Delete),
            (KeyCode::Delete, Delete),
            (KeyCode::Char('x'), BatchDelete),
            (KeyCode::Char('/'), FocusSearch),
            (KeyCode::Char('t'), CycleTypeFilter),
            (KeyCode::Char('F'), CycleFavoriteFilter),
            (KeyCode::Char('n'), NextPage),
            (KeyCode::Right, NextPage),
            (KeyCode::Char('p'), PrevPage),
            (KeyCode::Left, PrevPage),
            (KeyCode::Char('+'), LargerPageSize),
            (KeyCode::Char('='), LargerPageSize),
            (KeyCode::Char('-'), SmallerPageSize),
            (KeyCode::Char('r'), Refresh),
            (KeyCode::Char('L'), Logout),
            (KeyCode::Char('?'), ShowHelp),
            (KeyCode::Char('q'), Quit),
        ] {
            map.bind(Table, code, KeyModifiers::NONE, action);
        }

        for (n, field) in SortField::ALL.iter().enumerate() {
            if let Some(c) = char::from_digit(n as u32 + 1, 10) {
                map.bind(Table, KeyCode::Char(c), KeyModifiers::NONE, SortBy(*field));
            }
        }

        map.bind(SearchBar, KeyCode::Enter, KeyModifiers::NONE, LeaveSearch);
        map.bind(SearchBar, KeyCode::Tab, KeyModifiers::NONE, LeaveSearch);
        map.bind(SearchBar, KeyCode::Esc, KeyModifiers::NONE, ClearSearch);

        for control in [Table, SearchBar] {
            map.bind(control, KeyCode::Char('c'), KeyModifiers::CONTROL, Quit);
        }

        map
    }
}

impl KeyMap {
    pub fn bind(&mut self, control: Control, code: KeyCode, modifiers: KeyModifiers, action: Action) {
        self.bindings.insert((control, code, modifiers), action);
    }

    /// Resolve a key press for `control`. Releases and repeats are ignored.
    pub fn resolve(&self, control: Control, key: &KeyEvent) -> Option<Action> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let mut modifiers = key.modifiers;
        if matches!(key.code, KeyCode::Char(_)) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        self.bindings.get(&(control, key.code, modifiers)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_table_bindings() {
        let map = KeyMap::default();
        let none = KeyModifiers::NONE;
        assert_eq!(map.resolve(Control::Table, &press(KeyCode::Char('j'), none)), Some(Action::CursorDown));
        assert_eq!(map.resolve(Control::Table, &press(KeyCode::Char(' '), none)), Some(Action::ToggleRow));
        assert_eq!(map.resolve(Control::Table, &press(KeyCode::Delete, none)), Some(Action::Delete));
        assert_eq!(
            map.resolve(Control::Table, &press(KeyCode::Char('5'), none)),
            Some(Action::SortBy(SortField::CreatedAt))
        );
        assert_eq!(
            map.resolve(Control::Table, &press(KeyCode::Char('1'), none)),
            Some(Action::SortBy(SortField::Id))
        );
    }

    #[test]
    fn test_shift_is_ignored_for_characters() {
        let map = KeyMap::default();
        let key = press(KeyCode::Char('G'), KeyModifiers::SHIFT);
        assert_eq!(map.resolve(Control::Table, &key), Some(Action::CursorLast));
        let key = press(KeyCode::Char('F'), KeyModifiers::SHIFT);
        assert_eq!(map.resolve(Control::Table, &key), Some(Action::CycleFavoriteFilter));
    }

    #[test]
    fn test_search_bar_passes_text_through() {
        let map = KeyMap::default();
        let key = press(KeyCode::Char('j'), KeyModifiers::NONE);
        assert_eq!(map.resolve(Control::SearchBar, &key), None);
        let key = press(KeyCode::Esc, KeyModifiers::NONE);
        assert_eq!(map.resolve(Control::SearchBar, &key), Some(Action::ClearSearch));
    }

    #[test]
    fn test_ctrl_c_quits_everywhere() {
        let map = KeyMap::default();
        let key = press(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map.resolve(Control::Table, &key), Some(Action::Quit));
        assert_eq!(map.resolve(Control::SearchBar, &key), Some(Action::Quit));
    }

    #[test]
    fn test_release_is_ignored() {
        let map = KeyMap::default();
        let mut key = press(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(map.resolve(Control::Table, &key), None);
    }
}
