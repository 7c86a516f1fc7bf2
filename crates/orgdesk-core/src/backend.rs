//! Remote collaborator interface
//!
//! The grid engine never talks to the admin API directly. Each screen hands
//! it a `GridBackend`, which fetches pages and applies mutations.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, CoreResult};
use crate::types::{Row, RowId};

/// Sort direction sent to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// Query parameters for one page fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    /// 1-based page number
    pub page: usize,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, Value>,
}

impl PageQuery {
    pub fn first_page(limit: usize) -> Self {
        Self {
            page: 1,
            limit,
            sort_by: None,
            sort_order: None,
            search: None,
            filters: BTreeMap::new(),
        }
    }

    /// Row offset of this page
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1) * self.limit
    }
}

/// One page of rows plus the total count across all pages
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    pub rows: Vec<Row>,
    pub total_count: u64,
}

/// Partial update of a single row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowUpdate {
    pub id: RowId,
    /// Top-level fields to overwrite. A cleared field is sent as `null`.
    pub changes: Map<String, Value>,
}

impl RowUpdate {
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            changes: Map::new(),
        }
    }

    pub fn with(mut self, field: impl Into<String>, value: Value) -> Self {
        self.changes.insert(field.into(), value);
        self
    }
}

/// Which optional operations a backend supports
///
/// A missing capability disables the matching grid feature: no update means
/// read-only cells, no delete means no row or bulk delete, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BackendCapabilities {
    pub create: bool,
    pub update: bool,
    pub delete: bool,
    pub persist_column_order: bool,
}

impl BackendCapabilities {
    pub fn read_only() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        Self {
            create: true,
            update: true,
            delete: true,
            persist_column_order: true,
        }
    }
}

/// Remote collaborator for one grid instance
#[async_trait]
pub trait GridBackend: Send + Sync {
    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::read_only()
    }

    /// Fetch one page for the given query
    async fn fetch_page(&self, query: &PageQuery) -> CoreResult<PageResult>;

    /// Create a row and return the server's copy (with its identity)
    async fn create_row(&self, _data: Row) -> CoreResult<Row> {
        Err(CoreError::NotSupported("create_row".into()))
    }

    /// Apply a partial update. May return the server's updated row.
    async fn update_row(&self, _update: RowUpdate) -> CoreResult<Option<Row>> {
        Err(CoreError::NotSupported("update_row".into()))
    }

    async fn delete_row(&self, _id: &RowId) -> CoreResult<()> {
        Err(CoreError::NotSupported("delete_row".into()))
    }

    /// Persist the display order of organization-defined fields
    async fn persist_column_order(&self, _field_names: Vec<String>) -> CoreResult<()> {
        Err(CoreError::NotSupported("persist_column_order".into()))
    }

    /// Editable header label for an organization-defined field
    fn resolve_field_label(&self, _field_name: &str) -> Option<String> {
        None
    }
}
