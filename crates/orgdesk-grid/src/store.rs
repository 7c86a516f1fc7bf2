//! Row store
//!
//! The in-memory page(s) of rows plus the server's total count. Every
//! mutation goes through one of the primitives here, addressed by row
//! identity rather than position.

use orgdesk_core::{Row, RowId};

#[derive(Debug, Clone, Default)]
pub struct RowStore {
    id_field: String,
    rows: Vec<Row>,
    total_count: u64,
}

impl RowStore {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            rows: Vec::new(),
            total_count: 0,
        }
    }

    pub fn id_field(&self) -> &str {
        &self.id_field
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn set_total_count(&mut self, total_count: u64) {
        self.total_count = total_count;
    }

    pub fn row_id(&self, row: &Row) -> Option<RowId> {
        row.id(&self.id_field)
    }

    pub fn position(&self, id: &RowId) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.id(&self.id_field).as_ref() == Some(id))
    }

    pub fn find(&self, id: &RowId) -> Option<&Row> {
        self.position(id).map(|ix| &self.rows[ix])
    }

    pub fn contains(&self, id: &RowId) -> bool {
        self.position(id).is_some()
    }

    /// Replace the whole contents with a freshly fetched page
    pub fn replace_all(&mut self, rows: Vec<Row>, total_count: u64) {
        self.rows = rows;
        self.total_count = total_count;
    }

    /// Append a lazily loaded page
    pub fn append(&mut self, rows: Vec<Row>, total_count: u64) {
        self.rows.extend(rows);
        self.total_count = total_count;
    }

    /// Prepend a row the server just created
    pub fn add(&mut self, row: Row) {
        self.rows.insert(0, row);
        self.total_count += 1;
    }

    /// Put a row back at a known index (used when undoing a removal)
    pub fn insert_at(&mut self, index: usize, row: Row) {
        let index = index.min(self.rows.len());
        self.rows.insert(index, row);
        self.total_count += 1;
    }

    /// Mutate a row in place. Returns false when the row is not loaded.
    pub fn update_by_id(&mut self, id: &RowId, update: impl FnOnce(&mut Row)) -> bool {
        match self.position(id) {
            Some(ix) => {
                update(&mut self.rows[ix]);
                true
            }
            None => false,
        }
    }

    /// Swap a row for a newer copy. Returns the previous copy.
    pub fn replace_by_id(&mut self, id: &RowId, row: Row) -> Option<Row> {
        let ix = self.position(id)?;
        Some(std::mem::replace(&mut self.rows[ix], row))
    }

    /// Remove a row, returning its former index and value
    pub fn remove_by_id(&mut self, id: &RowId) -> Option<(usize, Row)> {
        let ix = self.position(id)?;
        let row = self.rows.remove(ix);
        self.total_count = self.total_count.saturating_sub(1);
        Some((ix, row))
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.total_count = 0;
    }
}
