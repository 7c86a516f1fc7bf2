//! Row selection
//!
//! Selection is keyed by row identity. Keys whose rows left the store never
//! surface as selected rows and are pruned before a bulk action runs.

use std::collections::HashSet;

use orgdesk_core::{Row, RowId};

use crate::store::RowStore;

#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    ids: HashSet<RowId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.ids.contains(id)
    }

    pub fn select(&mut self, id: RowId) {
        self.ids.insert(id);
    }

    pub fn deselect(&mut self, id: &RowId) {
        self.ids.remove(id);
    }

    /// Flip one row. Returns the new state.
    pub fn toggle(&mut self, id: RowId) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn select_all(&mut self, store: &RowStore) {
        self.ids
            .extend(store.rows().iter().filter_map(|row| store.row_id(row)));
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop keys whose rows are no longer loaded
    pub fn prune(&mut self, store: &RowStore) {
        self.ids.retain(|id| store.contains(id));
    }

    /// Selected rows that are loaded, in store order
    pub fn selected_rows(&self, store: &RowStore) -> Vec<Row> {
        store
            .rows()
            .iter()
            .filter(|row| store.row_id(row).is_some_and(|id| self.ids.contains(&id)))
            .cloned()
            .collect()
    }

    /// Ids of the selected rows that are loaded, in store order
    pub fn selected_ids(&self, store: &RowStore) -> Vec<RowId> {
        store
            .rows()
            .iter()
            .filter_map(|row| store.row_id(row))
            .filter(|id| self.ids.contains(id))
            .collect()
    }

    /// Number of selected rows that are loaded
    pub fn count(&self, store: &RowStore) -> usize {
        self.selected_ids(store).len()
    }
}
