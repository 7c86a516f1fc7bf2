//! Grid instance
//
// `DataGrid` is a cheap handle over one grid's shared state. The state sits
// behind a single mutex that is never held across an `.await`; operations
// that talk to the backend take what they need under the lock, release it,
// and re-acquire it to apply the result.
//
// The operations are split by concern into the submodules below, each one
// adding an `impl DataGrid` block.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Weak};

use futures::future::try_join_all;
use orgdesk_core::{
    BackendCapabilities, ColumnDescriptor, FieldType, GridBackend, Row, RowId, RowUpdate,
};
use orgdesk_settings::{GridSettings, LoadMode};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::columns::ColumnModel;
use crate::debounce::Debouncer;
use crate::edit::{self, ActiveEdit, CellRef, EditSession};
use crate::error::{GridError, GridResult};
use crate::events::{BulkActionKind, GridEvent};
use crate::export::{ExportMatrix, ExportScope, ExportSink};
use crate::filters::{AdvancedSearch, FilterInput};
use crate::pagination::{FetchKind, FetchTracker, QueryState, SortSpec, near_bottom};
use crate::registry::{EditorKind, FieldRegistry, Normalized, is_truthy};
use crate::selection::SelectionSet;
use crate::store::RowStore;

mod bulk_edit;
mod column_ops;
mod export;
mod inline_edit;
mod loader;
mod rows;
mod search;

pub use bulk_edit::{AlwaysConfirm, ConfirmPrompt};

/// Mutable state of one grid instance
pub(crate) struct GridState {
    pub(crate) columns: ColumnModel,
    pub(crate) store: RowStore,
    pub(crate) query: QueryState,
    pub(crate) fetch: FetchTracker,
    pub(crate) has_more: bool,
    /// Search box text, applied to loaded rows without debounce
    pub(crate) search_input: String,
    pub(crate) edit: EditSession,
    /// Toggled checkbox values awaiting confirmation by a refetch
    pub(crate) checkbox_overrides: HashMap<CellRef, bool>,
    pub(crate) selection: SelectionSet,
    pub(crate) advanced_search: AdvancedSearch,
}

pub(crate) struct GridInner {
    pub(crate) settings: GridSettings,
    pub(crate) registry: FieldRegistry,
    pub(crate) backend: Arc<dyn GridBackend>,
    pub(crate) capabilities: BackendCapabilities,
    pub(crate) state: Mutex<GridState>,
    events: mpsc::UnboundedSender<GridEvent>,
    pub(crate) search_debounce: Debouncer,
    pub(crate) column_order_debounce: Debouncer,
}

impl GridInner {
    pub(crate) fn emit(&self, event: GridEvent) {
        if self.events.send(event).is_err() {
            tracing::trace!("Grid event receiver dropped");
        }
    }
}

/// Handle to one grid instance
///
/// Clones share the same instance. Debounce timers are cancelled once the
/// last handle is dropped.
#[derive(Clone)]
pub struct DataGrid {
    inner: Arc<GridInner>,
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("DataGrid")
            .field("load_mode", &self.inner.settings.load_mode)
            .field("columns", &state.columns.len())
            .field("rows", &state.store.len())
            .field("total_count", &state.store.total_count())
            .finish()
    }
}

impl DataGrid {
    /// Create a grid over `backend`. Events are delivered on the returned receiver.
    ///
    /// Nothing is fetched until `refresh` or `load_more` is called.
    pub fn new(
        settings: GridSettings,
        mut columns: ColumnModel,
        backend: Arc<dyn GridBackend>,
    ) -> (Self, mpsc::UnboundedReceiver<GridEvent>) {
        let settings = settings.sanitized();
        let (events, receiver) = mpsc::unbounded_channel();
        let capabilities = backend.capabilities();

        columns.resolve_dynamic_headers(|field| backend.resolve_field_label(field));

        let state = GridState {
            columns,
            store: RowStore::new(settings.id_field.clone()),
            query: QueryState::new(settings.page_size),
            fetch: FetchTracker::default(),
            has_more: true,
            search_input: String::new(),
            edit: EditSession::Viewing,
            checkbox_overrides: HashMap::new(),
            selection: SelectionSet::new(),
            advanced_search: AdvancedSearch::new(),
        };

        tracing::debug!(
            load_mode = ?settings.load_mode,
            page_size = settings.page_size,
            ?capabilities,
            "Creating grid"
        );

        let inner = GridInner {
            registry: FieldRegistry::from_settings(&settings),
            search_debounce: Debouncer::new("search", settings.search_debounce()),
            column_order_debounce: Debouncer::new("column_order", settings.column_order_debounce()),
            settings,
            backend,
            capabilities,
            state: Mutex::new(state),
            events,
        };

        (
            Self {
                inner: Arc::new(inner),
            },
            receiver,
        )
    }

    pub(crate) fn downgrade(&self) -> Weak<GridInner> {
        Arc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Arc<GridInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn emit(&self, event: GridEvent) {
        self.inner.emit(event);
    }

    pub fn settings(&self) -> &GridSettings {
        &self.inner.settings
    }

    pub fn load_mode(&self) -> LoadMode {
        self.inner.settings.load_mode
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.inner.registry
    }

    pub fn capabilities(&self) -> BackendCapabilities {
        self.inner.capabilities
    }

    /// Snapshot of the columns in display order
    pub fn columns(&self) -> ColumnModel {
        self.inner.state.lock().columns.clone()
    }

    pub fn column(&self, column_id: &str) -> Option<ColumnDescriptor> {
        self.inner.state.lock().columns.get(column_id).cloned()
    }

    /// Snapshot of every loaded row
    pub fn rows(&self) -> Vec<Row> {
        self.inner.state.lock().store.rows().to_vec()
    }

    pub fn row(&self, row_id: &RowId) -> Option<Row> {
        self.inner.state.lock().store.find(row_id).cloned()
    }

    /// Identity of the loaded row at `index`
    pub fn row_id_at(&self, index: usize) -> GridResult<RowId> {
        let state = self.inner.state.lock();
        let row = state
            .store
            .rows()
            .get(index)
            .ok_or_else(|| GridError::RowNotFound(format!("#{}", index)))?;
        state
            .store
            .row_id(row)
            .ok_or_else(|| GridError::MissingRowId(state.store.id_field().to_string()))
    }

    pub fn loaded_count(&self) -> usize {
        self.inner.state.lock().store.len()
    }

    pub fn total_count(&self) -> u64 {
        self.inner.state.lock().store.total_count()
    }

    pub fn query(&self) -> QueryState {
        self.inner.state.lock().query.clone()
    }

    pub fn has_more(&self) -> bool {
        self.inner.state.lock().has_more
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.lock().fetch.is_in_flight()
    }

    pub fn page_index(&self) -> usize {
        self.inner.state.lock().query.page_index
    }

    pub fn page_count(&self) -> usize {
        let state = self.inner.state.lock();
        state.query.page_count(state.store.total_count())
    }

    pub fn edit_session(&self) -> EditSession {
        self.inner.state.lock().edit.clone()
    }

    /// Display text of one cell
    pub fn display_text(&self, row_id: &RowId, column_id: &str) -> GridResult<String> {
        let state = self.inner.state.lock();
        let column = state.columns.require(column_id)?;
        let row = state
            .store
            .find(row_id)
            .ok_or_else(|| GridError::RowNotFound(row_id.to_string()))?;
        Ok(self
            .inner
            .registry
            .display_text(column, row.get_path(&column.accessor_path)))
    }

    /// Editor widget for a column
    pub fn editor(&self, column_id: &str) -> GridResult<EditorKind> {
        let state = self.inner.state.lock();
        let column = state.columns.require(column_id)?;
        Ok(self.inner.registry.editor(column))
    }

    /// Loaded rows matching the search box text
    ///
    /// The match is a case-insensitive substring test over the display text
    /// of the visible data columns. It applies immediately, while the
    /// backend only sees the text once the debounce settles.
    pub fn visible_rows(&self) -> Vec<Row> {
        let state = self.inner.state.lock();
        self.filter_visible(&state)
    }

    pub(crate) fn filter_visible(&self, state: &GridState) -> Vec<Row> {
        let needle = state.search_input.trim().to_lowercase();
        if needle.is_empty() {
            return state.store.rows().to_vec();
        }

        let columns: Vec<&ColumnDescriptor> = state.columns.visible_data().collect();
        state
            .store
            .rows()
            .iter()
            .filter(|row| {
                columns.iter().any(|column| {
                    self.inner
                        .registry
                        .display_text(column, row.get_path(&column.accessor_path))
                        .to_lowercase()
                        .contains(&needle)
                })
            })
            .cloned()
            .collect()
    }

    /// Fail unless the backend supports an optional operation
    pub(crate) fn require_capability(
        &self,
        supported: bool,
        operation: &'static str,
    ) -> GridResult<()> {
        if supported {
            Ok(())
        } else {
            Err(GridError::Unsupported(operation))
        }
    }
}
