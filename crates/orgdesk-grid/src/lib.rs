//! orgdesk data-grid engine
//!
//! A reusable grid over rows whose shape is only known at configuration
//! time. Every admin screen builds one `DataGrid` from its column
//! declarations and a `GridBackend`, then drives it with user intents.
//!
//! # Architecture
//!
//! ```text
//! host screen
//!     ↓ intents              ↑ GridEvent
//! DataGrid (one state container per instance)
//!     ├── ColumnModel ── FieldRegistry
//!     ├── RowStore
//!     ├── EditSession          (one active cell)
//!     ├── QueryState + FetchTracker
//!     ├── AdvancedSearch
//!     └── SelectionSet
//!     ↓
//! GridBackend (orgdesk-core)
//! ```
//!
//! # Modules
//!
//! - [`registry`] - display, editor and normalization rules per field type
//! - [`columns`] - merges base and dynamic column declarations
//! - [`store`] - loaded rows and the total count
//! - [`edit`] - the edit session and row-level edit helpers
//! - [`pagination`] - query state and the fetch slot
//! - [`filters`] - advanced search draft and sanitization
//! - [`column_order`] - dynamic column reordering
//! - [`selection`] - row selection
//! - [`export`] - export matrix and sinks

pub mod column_order;
pub mod columns;
mod debounce;
pub mod edit;
mod error;
pub mod events;
pub mod export;
pub mod filters;
mod grid;
pub mod pagination;
pub mod registry;
pub mod selection;
pub mod store;

pub use columns::{ColumnModel, ColumnModelBuilder};
pub use debounce::Debouncer;
pub use edit::{ActiveEdit, CellRef, EditSession};
pub use error::{GridError, GridResult, ValidationError};
pub use events::{BulkActionKind, GridEvent};
pub use export::{CsvSink, ExportMatrix, ExportScope, ExportSink};
pub use filters::{AdvancedSearch, FilterInput};
pub use grid::{AlwaysConfirm, ConfirmPrompt, DataGrid};
pub use pagination::{QueryState, SortSpec};
pub use registry::{EditorKind, FieldRegistry, Normalized};
pub use selection::SelectionSet;
pub use store::RowStore;
