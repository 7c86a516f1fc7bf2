//! Query state and fetch slot bookkeeping
//!
//! `QueryState` holds everything that shapes a page request. `FetchSlot`
//! makes the single in-flight fetch explicit: every request takes a new
//! generation, and only the response for the current generation is applied.

use std::collections::BTreeMap;

use orgdesk_core::{PageQuery, SortOrder};
use serde_json::Value;

use crate::columns::ColumnModel;

/// Single-column sort
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column_id: String,
    pub desc: bool,
}

impl SortSpec {
    pub fn asc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            desc: false,
        }
    }

    pub fn desc(column_id: impl Into<String>) -> Self {
        Self {
            column_id: column_id.into(),
            desc: true,
        }
    }

    pub fn order(&self) -> SortOrder {
        if self.desc {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    /// 0-based page index
    pub page_index: usize,
    pub page_size: usize,
    pub sorting: Option<SortSpec>,
    /// Search text as sent to the backend, after the debounce settled
    pub global_filter_text: String,
    pub advanced_filters: BTreeMap<String, Value>,
    pub extra_filters: BTreeMap<String, Value>,
}

impl QueryState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
            sorting: None,
            global_filter_text: String::new(),
            advanced_filters: BTreeMap::new(),
            extra_filters: BTreeMap::new(),
        }
    }

    /// Number of pages for a total row count (at least 1)
    pub fn page_count(&self, total_count: u64) -> usize {
        let page_size = self.page_size.max(1) as u64;
        let pages = total_count.saturating_add(page_size - 1) / page_size;
        pages.max(1).min(usize::MAX as u64) as usize
    }

    pub fn can_go_next(&self, total_count: u64) -> bool {
        self.page_index + 1 < self.page_count(total_count)
    }

    pub fn can_go_prev(&self) -> bool {
        self.page_index > 0
    }

    /// 1-based page to request next in lazy-append mode
    pub fn next_lazy_page(&self, loaded: usize) -> usize {
        loaded.div_ceil(self.page_size.max(1)) + 1
    }

    /// Cycle a column's sort: none, ascending, descending, none
    pub fn toggle_sort(&mut self, column_id: &str) {
        self.sorting = match self.sorting.take() {
            Some(spec) if spec.column_id == column_id && !spec.desc => {
                Some(SortSpec::desc(column_id))
            }
            Some(spec) if spec.column_id == column_id => None,
            _ => Some(SortSpec::asc(column_id)),
        };
    }

    /// Filters sent to the backend; advanced filters win over extra ones
    pub fn merged_filters(&self) -> BTreeMap<String, Value> {
        let mut filters = self.extra_filters.clone();
        filters.extend(
            self.advanced_filters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        filters
    }

    /// Assemble the request for a 1-based page
    pub fn build_query(&self, columns: &ColumnModel, page: usize) -> PageQuery {
        let sort_by = self.sorting.as_ref().map(|spec| {
            columns
                .get(&spec.column_id)
                .map(|c| c.accessor_path.clone())
                .unwrap_or_else(|| spec.column_id.clone())
        });
        let search = Some(self.global_filter_text.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        PageQuery {
            page: page.max(1),
            limit: self.page_size,
            sort_by,
            sort_order: self.sorting.as_ref().map(SortSpec::order),
            search,
            filters: self.merged_filters(),
        }
    }
}

/// How a fetched page lands in the row store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Replace,
    Append,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchSlot {
    #[default]
    Idle,
    InFlight { generation: u64, kind: FetchKind },
}

/// Owner of the fetch slot and its generation counter
#[derive(Debug, Default)]
pub struct FetchTracker {
    slot: FetchSlot,
    last_generation: u64,
}

impl FetchTracker {
    pub fn slot(&self) -> FetchSlot {
        self.slot
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.slot, FetchSlot::InFlight { .. })
    }

    /// Claim the slot for a new request, superseding any outstanding one
    pub fn begin(&mut self, kind: FetchKind) -> u64 {
        self.last_generation += 1;
        self.slot = FetchSlot::InFlight {
            generation: self.last_generation,
            kind,
        };
        self.last_generation
    }

    /// Release the slot if `generation` is still current
    ///
    /// Returns `None` for a superseded request, whose result must be dropped.
    pub fn finish(&mut self, generation: u64) -> Option<FetchKind> {
        match self.slot {
            FetchSlot::InFlight {
                generation: current,
                kind,
            } if current == generation => {
                self.slot = FetchSlot::Idle;
                Some(kind)
            }
            _ => None,
        }
    }
}

/// Whether the remaining scroll distance is under the load-more threshold
pub fn near_bottom(scroll_top: f64, viewport_height: f64, content_height: f64, threshold: f64) -> bool {
    content_height - (scroll_top + viewport_height) < threshold
}
