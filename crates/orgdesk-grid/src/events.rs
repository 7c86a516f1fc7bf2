//! Grid events
//!
//! Events emitted by a grid instance to its host screen. Failures are
//! reported here rather than returned, since most of them surface after the
//! triggering call already went back to the caller.

use orgdesk_core::RowId;
use serde_json::Value;

/// Kind of bulk action, for reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkActionKind {
    Delete,
    /// One field set to one value across the selection
    Update { accessor_path: String },
}

impl std::fmt::Display for BulkActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Delete => write!(f, "delete"),
            Self::Update { accessor_path } => write!(f, "update of '{}'", accessor_path),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// A page landed in the row store
    RowsLoaded {
        /// 1-based page that was fetched
        page: usize,
        rows: usize,
        total_count: u64,
        appended: bool,
    },

    /// A page fetch failed; the row store kept its previous contents
    FetchFailed { message: String },

    /// Local rejection of an edit value. Nothing was sent.
    ValidationWarning { column_id: String, message: String },

    EditStarted { row_id: RowId, column_id: String },

    EditCancelled { row_id: RowId, column_id: String },

    /// A cell value was applied locally and sent to the backend
    CellCommitted {
        row_id: RowId,
        column_id: String,
        value: Value,
    },

    /// The backend rejected a cell update; the cell was rolled back
    CommitFailed {
        row_id: RowId,
        column_id: String,
        message: String,
    },

    RowCreated { row_id: Option<RowId> },

    RowCreateFailed { message: String },

    RowDeleted { row_id: RowId },

    /// The backend rejected a delete; the row was put back
    RowDeleteFailed { row_id: RowId, message: String },

    /// Dynamic columns were reordered locally
    ColumnOrderChanged { field_names: Vec<String> },

    ColumnOrderPersisted { field_names: Vec<String> },

    /// Persisting the column order failed. The local order is kept.
    ColumnOrderPersistFailed { message: String },

    SelectionChanged { selected: usize },

    BulkActionCompleted { action: BulkActionKind, rows: usize },

    /// At least one row of a bulk action failed. Rows that succeeded stay applied.
    BulkActionFailed {
        action: BulkActionKind,
        rows: usize,
        message: String,
    },

    /// Advanced filters were applied or removed
    FiltersApplied { active: usize },
}
