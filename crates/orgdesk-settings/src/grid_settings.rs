use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How fetched pages accumulate in the row store
///
/// Fixed for the lifetime of a grid instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoadMode {
    /// Each fetch replaces the store; page count comes from the total
    #[default]
    Paged,
    /// Each fetch appends the next page (infinite scroll)
    #[serde(alias = "lazy")]
    LazyAppend,
}

impl LoadMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Paged => "Page Based",
            Self::LazyAppend => "Infinite Scroll",
        }
    }
}

/// Per-instance grid configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub load_mode: LoadMode,
    pub page_size: usize,
    /// Row field carrying the row identity
    pub id_field: String,
    pub search_debounce_ms: u64,
    pub column_order_debounce_ms: u64,
    /// Remaining scroll distance (px) under which lazy mode loads more
    pub scroll_threshold_px: f64,
    pub currency_symbol: String,
    /// chrono format used for DATE display and edit values
    pub date_format: String,
    pub available_page_sizes: Vec<usize>,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            load_mode: LoadMode::Paged,
            page_size: 25,
            id_field: "_id".to_string(),
            search_debounce_ms: 400,
            column_order_debounce_ms: 500,
            scroll_threshold_px: 150.0,
            currency_symbol: "₪".to_string(),
            date_format: "%d/%m/%Y".to_string(),
            available_page_sizes: vec![10, 25, 50, 100],
        }
    }
}

impl GridSettings {
    pub fn lazy() -> Self {
        Self {
            load_mode: LoadMode::LazyAppend,
            ..Self::default()
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn column_order_debounce(&self) -> Duration {
        Duration::from_millis(self.column_order_debounce_ms)
    }

    /// Clamp values that would break paging arithmetic
    pub fn sanitized(mut self) -> Self {
        if self.page_size == 0 {
            tracing::warn!("page_size of 0 is not usable, falling back to default");
            self.page_size = Self::default().page_size;
        }
        if self.id_field.trim().is_empty() {
            self.id_field = Self::default().id_field;
        }
        self
    }
}
