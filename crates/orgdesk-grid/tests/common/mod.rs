//! Common test utilities and mocks

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use orgdesk_core::{
    BackendCapabilities, ColumnDecl, CoreError, CoreResult, FieldType, GridBackend, PageQuery,
    PageResult, Row, RowId, RowUpdate, SelectOption,
};
use orgdesk_grid::{ColumnModel, DataGrid, GridEvent};
use orgdesk_settings::GridSettings;
use serde_json::{Value, json};
use tokio::sync::{mpsc, oneshot};

/// In-memory backend for exercising grid logic without a remote API.
///
/// Rows live in a server-side list that fetches page through. Every call is
/// logged for assertions, and each kind of mutation can be switched to fail
/// at any point during a test.
pub struct MockBackend {
    pub capabilities: BackendCapabilities,
    pub server_rows: Arc<parking_lot::Mutex<Vec<Row>>>,
    /// Log of every page query received
    pub fetch_log: Arc<parking_lot::Mutex<Vec<PageQuery>>>,
    pub update_log: Arc<parking_lot::Mutex<Vec<RowUpdate>>>,
    pub delete_log: Arc<parking_lot::Mutex<Vec<RowId>>>,
    pub persisted_orders: Arc<parking_lot::Mutex<Vec<Vec<String>>>>,
    pub fail_fetch: Arc<parking_lot::Mutex<bool>>,
    pub fail_update: Arc<parking_lot::Mutex<bool>>,
    pub fail_persist: Arc<parking_lot::Mutex<bool>>,
    pub fail_create: Arc<parking_lot::Mutex<bool>>,
    /// Delete of these ids fails
    pub fail_delete_ids: Arc<parking_lot::Mutex<Vec<RowId>>>,
    /// Apply accepted updates to the server rows
    pub apply_updates: Arc<parking_lot::Mutex<bool>>,
    held_fetches: Arc<parking_lot::Mutex<VecDeque<oneshot::Receiver<()>>>>,
    held_updates: Arc<parking_lot::Mutex<VecDeque<oneshot::Receiver<()>>>>,
    held_deletes: Arc<parking_lot::Mutex<VecDeque<oneshot::Receiver<()>>>>,
    next_id: Arc<parking_lot::Mutex<u64>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            capabilities: BackendCapabilities::all(),
            server_rows: Arc::new(parking_lot::Mutex::new(Vec::new())),
            fetch_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
            update_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
            delete_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
            persisted_orders: Arc::new(parking_lot::Mutex::new(Vec::new())),
            fail_fetch: Arc::new(parking_lot::Mutex::new(false)),
            fail_update: Arc::new(parking_lot::Mutex::new(false)),
            fail_persist: Arc::new(parking_lot::Mutex::new(false)),
            fail_create: Arc::new(parking_lot::Mutex::new(false)),
            fail_delete_ids: Arc::new(parking_lot::Mutex::new(Vec::new())),
            apply_updates: Arc::new(parking_lot::Mutex::new(true)),
            held_fetches: Arc::new(parking_lot::Mutex::new(VecDeque::new())),
            held_updates: Arc::new(parking_lot::Mutex::new(VecDeque::new())),
            held_deletes: Arc::new(parking_lot::Mutex::new(VecDeque::new())),
            next_id: Arc::new(parking_lot::Mutex::new(1000)),
        }
    }

    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        *self.server_rows.lock() = rows;
        self
    }

    pub fn with_capabilities(mut self, capabilities: BackendCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        *self.fail_fetch.lock() = fail;
    }

    pub fn set_fail_update(&self, fail: bool) {
        *self.fail_update.lock() = fail;
    }

    pub fn set_fail_persist(&self, fail: bool) {
        *self.fail_persist.lock() = fail;
    }

    pub fn set_fail_create(&self, fail: bool) {
        *self.fail_create.lock() = fail;
    }

    pub fn fail_delete_of(&self, id: &str) {
        self.fail_delete_ids.lock().push(RowId::new(id));
    }

    pub fn set_apply_updates(&self, apply: bool) {
        *self.apply_updates.lock() = apply;
    }

    /// Hold the next fetch until the returned sender fires or is dropped
    pub fn hold_next_fetch(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_fetches.lock().push_back(rx);
        tx
    }

    /// Hold the next update until the returned sender fires or is dropped
    pub fn hold_next_update(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_updates.lock().push_back(rx);
        tx
    }

    /// Hold the next delete until the returned sender fires or is dropped
    pub fn hold_next_delete(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.held_deletes.lock().push_back(rx);
        tx
    }

    /// Overwrite a field on the server copy of a row
    pub fn set_server_field(&self, id: &str, path: &str, value: Value) {
        let mut rows = self.server_rows.lock();
        if let Some(row) = rows
            .iter_mut()
            .find(|row| row.id("_id").is_some_and(|rid| rid.as_str() == id))
        {
            row.set_path(path, value);
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_log.lock().len()
    }

    pub fn fetch_log(&self) -> Vec<PageQuery> {
        self.fetch_log.lock().clone()
    }

    pub fn last_query(&self) -> Option<PageQuery> {
        self.fetch_log.lock().last().cloned()
    }

    pub fn update_log(&self) -> Vec<RowUpdate> {
        self.update_log.lock().clone()
    }

    pub fn delete_log(&self) -> Vec<RowId> {
        self.delete_log.lock().clone()
    }

    pub fn persisted_orders(&self) -> Vec<Vec<String>> {
        self.persisted_orders.lock().clone()
    }

    fn matches(row: &Row, query: &PageQuery) -> bool {
        let search_ok = match &query.search {
            Some(text) => {
                let needle = text.to_lowercase();
                row.as_map().values().any(|value| match value {
                    Value::String(s) => s.to_lowercase().contains(&needle),
                    _ => false,
                })
            }
            None => true,
        };
        let filters_ok = query
            .filters
            .iter()
            .all(|(path, expected)| row.get_path(path) == Some(expected));
        search_ok && filters_ok
    }
}

#[async_trait]
impl GridBackend for MockBackend {
    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    async fn fetch_page(&self, query: &PageQuery) -> CoreResult<PageResult> {
        self.fetch_log.lock().push(query.clone());

        let held = self.held_fetches.lock().pop_front();
        if let Some(gate) = held {
            let _ = gate.await;
        }

        if *self.fail_fetch.lock() {
            return Err(CoreError::Remote("fetch failed".into()));
        }

        let rows = self.server_rows.lock();
        let matching: Vec<Row> = rows
            .iter()
            .filter(|row| Self::matches(row, query))
            .cloned()
            .collect();
        let total_count = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset())
            .take(query.limit)
            .collect();
        Ok(PageResult {
            rows: page,
            total_count,
        })
    }

    async fn create_row(&self, data: Row) -> CoreResult<Row> {
        if *self.fail_create.lock() {
            return Err(CoreError::Remote("create failed".into()));
        }
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            *next
        };
        let row = data.with("_id", id.to_string());
        self.server_rows.lock().insert(0, row.clone());
        Ok(row)
    }

    async fn update_row(&self, update: RowUpdate) -> CoreResult<Option<Row>> {
        self.update_log.lock().push(update.clone());

        let held = self.held_updates.lock().pop_front();
        if let Some(gate) = held {
            let _ = gate.await;
        }

        if *self.fail_update.lock() {
            return Err(CoreError::Remote("update rejected".into()));
        }
        if !*self.apply_updates.lock() {
            return Ok(None);
        }

        let mut rows = self.server_rows.lock();
        let row = rows
            .iter_mut()
            .find(|row| row.id("_id").as_ref() == Some(&update.id))
            .ok_or_else(|| CoreError::NotFound(update.id.to_string()))?;
        for (field, value) in update.changes {
            row.insert(field, value);
        }
        Ok(Some(row.clone()))
    }

    async fn delete_row(&self, id: &RowId) -> CoreResult<()> {
        self.delete_log.lock().push(id.clone());

        let held = self.held_deletes.lock().pop_front();
        if let Some(gate) = held {
            let _ = gate.await;
        }

        if self.fail_delete_ids.lock().contains(id) {
            return Err(CoreError::Remote(format!("delete of {} rejected", id)));
        }
        self.server_rows
            .lock()
            .retain(|row| row.id("_id").as_ref() != Some(id));
        Ok(())
    }

    async fn persist_column_order(&self, field_names: Vec<String>) -> CoreResult<()> {
        if *self.fail_persist.lock() {
            return Err(CoreError::Remote("persist failed".into()));
        }
        self.persisted_orders.lock().push(field_names);
        Ok(())
    }

    fn resolve_field_label(&self, field_name: &str) -> Option<String> {
        (field_name == "allergies").then(|| "Allergy Notes".to_string())
    }
}

/// A child record as the admin API returns it
pub fn child(id: u64, first_name: &str, age: i64) -> Row {
    Row::new()
        .with("_id", id.to_string())
        .with("firstName", first_name)
        .with("age", age)
        .with("active", false)
        .with("tags", json!([]))
        .with(
            "dynamicFields",
            json!({"allergies": "none", "shirtSize": "M", "busRoute": "north"}),
        )
}

/// `count` children with ids 1..=count
pub fn children(count: u64) -> Vec<Row> {
    (1..=count)
        .map(|i| child(i, &format!("Child {}", i), 10))
        .collect()
}

pub fn tag_options() -> Vec<SelectOption> {
    vec![
        SelectOption::new("art", "Art"),
        SelectOption::new("music", "Music"),
        SelectOption::new("swim", "Swimming"),
    ]
}

pub fn child_columns() -> ColumnModel {
    ColumnModel::builder()
        .base([
            ColumnDecl::new("firstName"),
            ColumnDecl::new("age").with_type(FieldType::Number),
            ColumnDecl::new("active").with_type(FieldType::Checkbox),
            ColumnDecl::new("tags")
                .with_type(FieldType::MultiSelect)
                .with_options(tag_options()),
            ColumnDecl::new("_id").with_header("ID").read_only(),
        ])
        .dynamic([
            ColumnDecl::new("allergies"),
            ColumnDecl::new("shirtSize"),
            ColumnDecl::new("busRoute"),
        ])
        .with_selection_column()
        .with_actions_column()
        .build()
        .unwrap()
}

pub fn grid_with(
    settings: GridSettings,
    backend: Arc<MockBackend>,
) -> (DataGrid, mpsc::UnboundedReceiver<GridEvent>) {
    DataGrid::new(settings, child_columns(), backend)
}

/// Every event emitted so far
pub fn drain_events(rx: &mut mpsc::UnboundedReceiver<GridEvent>) -> Vec<GridEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
