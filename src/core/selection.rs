//! Selection set for batch operations.

use indexmap::IndexSet;

/// Tri-state of the select-all control, derived from the rendered rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectAllState {
    #[default]
    Unchecked,
    Indeterminate,
    Checked,
}

impl SelectAllState {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Unchecked => "[ ]",
            Self::Indeterminate => "[-]",
            Self::Checked => "[x]",
        }
    }
}

/// Selected record ids, in the order they were selected.
///
/// Ids for rows that are no longer rendered stay in the set until a delete
/// removes them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    ids: IndexSet<i64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Flip one id. Returns whether it is now selected.
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.remove(id) {
            false
        } else {
            self.insert(id);
            true
        }
    }

    pub fn insert(&mut self, id: i64) {
        self.ids.insert(id);
    }

    pub fn remove(&mut self, id: i64) -> bool {
        self.ids.shift_remove(&id)
    }

    /// Add (`checked`) or remove every id in `visible`.
    pub fn set_all<I: IntoIterator<Item = i64>>(&mut self, visible: I, checked: bool) {
        for id in visible {
            if checked {
                self.insert(id);
            } else {
                self.remove(id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Ids in selection order, as sent to batch delete.
    pub fn to_vec(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    /// Select-all state relative to the rendered ids.
    pub fn select_all_state<'a, I: IntoIterator<Item = &'a i64>>(&self, visible: I) -> SelectAllState {
        let mut total = 0usize;
        let mut checked = 0usize;
        for id in visible {
            total += 1;
            if self.ids.contains(id) {
                checked += 1;
            }
        }
        if total == 0 || checked == 0 {
            SelectAllState::Unchecked
        } else if checked == total {
            SelectAllState::Checked
        } else {
            SelectAllState::Indeterminate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_and_removes() {
        let mut sel = Selection::new();
        assert!(sel.toggle(3));
        assert!(sel.contains(3));
        assert!(!sel.toggle(3));
        assert!(sel.is_empty());
    }

    #[test]
    fn test_order_is_preserved() {
        let mut sel = Selection::new();
        sel.toggle(9);
        sel.toggle(2);
        sel.toggle(5);
        sel.toggle(2);
        sel.toggle(2);
        assert_eq!(sel.to_vec(), vec![9, 5, 2]);
    }

    #[test]
    fn test_tri_state() {
        let visible: Vec<i64> = (1..=20).collect();
        let mut sel = Selection::new();
        assert_eq!(sel.select_all_state(&visible), SelectAllState::Unchecked);

        sel.set_all(visible.iter().copied(), true);
        assert_eq!(sel.select_all_state(&visible), SelectAllState::Checked);

        sel.toggle(7);
        assert_eq!(sel.select_all_state(&visible), SelectAllState::Indeterminate);

        sel.set_all(visible.iter().copied(), false);
        assert_eq!(sel.select_all_state(&visible), SelectAllState::Unchecked);
    }

    #[test]
    fn test_tri_state_no_rows_is_unchecked() {
        let mut sel = Selection::new();
        sel.insert(1);
        let visible: Vec<i64> = Vec::new();
        assert_eq!(sel.select_all_state(&visible), SelectAllState::Unchecked);
    }

    #[test]
    fn test_stale_ids_do_not_affect_tri_state() {
        let mut sel = Selection::new();
        sel.insert(100);
        sel.set_all([1, 2], true);
        assert_eq!(sel.select_all_state(&[1, 2]), SelectAllState::Checked);
        assert_eq!(sel.len(), 3);
    }

    #[test]
    fn test_deselect_all_keeps_offscreen_ids() {
        let mut sel = Selection::new();
        sel.insert(100);
        sel.set_all([1, 2], true);
        sel.set_all([1, 2], false);
        assert_eq!(sel.to_vec(), vec![100]);
    }
}
