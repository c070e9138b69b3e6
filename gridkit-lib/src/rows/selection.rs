//! RowSelection

use std::collections::HashSet;

use crate::model::RowId;

/// Selected row ids. Survives page changes; cleared explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSelection {
    ids: HashSet<RowId>,
}

impl RowSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips one row. Returns the new state.
    pub fn toggle(&mut self, id: &RowId) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.clone());
            true
        }
    }

    pub fn select(&mut self, id: RowId) {
        self.ids.insert(id);
    }

    pub fn deselect(&mut self, id: &RowId) {
        self.ids.remove(id);
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.ids.contains(id)
    }

    /// Returns `true` if every row of the page is selected.
    pub fn is_all_selected(&self, page: &[RowId]) -> bool {
        !page.is_empty() && page.iter().all(|id| self.ids.contains(id))
    }

    /// Header checkbox: selects the whole page, or deselects it if it was
    /// fully selected already.
    pub fn toggle_all(&mut self, page: &[RowId]) {
        if self.is_all_selected(page) {
            for id in page {
                self.ids.remove(id);
            }
        } else {
            self.ids.extend(page.iter().cloned());
        }
    }

    /// Forgets ids that no longer exist.
    pub fn retain(&mut self, f: impl Fn(&RowId) -> bool) {
        self.ids.retain(|id| f(id));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn ids(&self) -> &HashSet<RowId> {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
