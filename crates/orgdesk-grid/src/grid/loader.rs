use super::*;

impl DataGrid {
    /// Refetch with the current query
    ///
    /// In paged mode this reloads the current page. In lazy mode it starts
    /// over from the first page.
    pub async fn refresh(&self) -> GridResult<()> {
        match self.load_mode() {
            LoadMode::Paged => {
                let page = self.inner.state.lock().query.page_index + 1;
                self.fetch(FetchKind::Replace, page).await
            }
            LoadMode::LazyAppend => self.fetch(FetchKind::Replace, 1).await,
        }
    }

    /// Append the next page (lazy mode)
    ///
    /// Refused while another fetch is in flight and once every row is loaded.
    pub async fn load_more(&self) -> GridResult<()> {
        if self.load_mode() != LoadMode::LazyAppend {
            return Err(GridError::Unsupported("load_more in paged mode"));
        }

        let page = {
            let state = self.inner.state.lock();
            if state.fetch.is_in_flight() {
                return Err(GridError::FetchInFlight);
            }
            if !state.has_more {
                return Err(GridError::NoMoreRows);
            }
            state.query.next_lazy_page(state.store.len())
        };

        self.fetch(FetchKind::Append, page).await
    }

    /// Scroll position report from the host. Loads more when close to the
    /// bottom in lazy mode; returns whether a load was started.
    pub async fn on_scroll(
        &self,
        scroll_top: f64,
        viewport_height: f64,
        content_height: f64,
    ) -> GridResult<bool> {
        if self.load_mode() != LoadMode::LazyAppend {
            return Ok(false);
        }

        let threshold = self.inner.settings.scroll_threshold_px;
        if !near_bottom(scroll_top, viewport_height, content_height, threshold) {
            return Ok(false);
        }

        {
            let state = self.inner.state.lock();
            if state.fetch.is_in_flight() || !state.has_more {
                return Ok(false);
            }
        }

        self.load_more().await.map(|_| true)
    }

    /// Jump to a 0-based page (paged mode)
    pub async fn set_page(&self, page_index: usize) -> GridResult<()> {
        if self.load_mode() != LoadMode::Paged {
            return Err(GridError::Unsupported("set_page in lazy mode"));
        }

        let page = {
            let mut state = self.inner.state.lock();
            let last = state.query.page_count(state.store.total_count()) - 1;
            state.query.page_index = page_index.min(last);
            state.query.page_index + 1
        };
        self.fetch(FetchKind::Replace, page).await
    }

    pub async fn next_page(&self) -> GridResult<()> {
        let next = {
            let state = self.inner.state.lock();
            if !state.query.can_go_next(state.store.total_count()) {
                return Ok(());
            }
            state.query.page_index + 1
        };
        self.set_page(next).await
    }

    pub async fn prev_page(&self) -> GridResult<()> {
        let prev = {
            let state = self.inner.state.lock();
            if !state.query.can_go_prev() {
                return Ok(());
            }
            state.query.page_index - 1
        };
        self.set_page(prev).await
    }

    pub async fn set_page_size(&self, page_size: usize) -> GridResult<()> {
        if page_size == 0 {
            return Err(GridError::Configuration("page size must be positive".into()));
        }
        self.change_query(|query| query.page_size = page_size).await
    }

    /// Cycle the sort of a column: ascending, descending, unsorted
    pub async fn toggle_sort(&self, column_id: &str) -> GridResult<()> {
        self.check_sortable(column_id)?;
        self.change_query(|query| query.toggle_sort(column_id)).await
    }

    pub async fn set_sort(&self, sorting: Option<SortSpec>) -> GridResult<()> {
        if let Some(spec) = &sorting {
            self.check_sortable(&spec.column_id)?;
        }
        self.change_query(|query| query.sorting = sorting).await
    }

    /// Filters supplied by the host screen, outside advanced search
    pub async fn set_extra_filters(&self, filters: BTreeMap<String, Value>) -> GridResult<()> {
        self.change_query(|query| query.extra_filters = filters).await
    }

    fn check_sortable(&self, column_id: &str) -> GridResult<()> {
        let state = self.inner.state.lock();
        let column = state.columns.require(column_id)?;
        if column.is_control() {
            return Err(GridError::Unsupported("sorting on a control column"));
        }
        Ok(())
    }

    /// Apply a query change, go back to the first page and refetch
    pub(crate) async fn change_query(
        &self,
        change: impl FnOnce(&mut QueryState),
    ) -> GridResult<()> {
        {
            let mut state = self.inner.state.lock();
            change(&mut state.query);
            state.query.page_index = 0;
        }
        self.fetch(FetchKind::Replace, 1).await
    }

    /// Request one page and land it in the store
    ///
    /// A newer request supersedes this one; a superseded response is
    /// dropped whether it succeeded or not.
    #[tracing::instrument(skip(self))]
    pub(crate) async fn fetch(&self, kind: FetchKind, page: usize) -> GridResult<()> {
        let (generation, query) = {
            let mut state = self.inner.state.lock();
            let generation = state.fetch.begin(kind);
            (generation, state.query.build_query(&state.columns, page))
        };
        tracing::debug!(generation, ?query, "Fetching page");

        let result = self.inner.backend.fetch_page(&query).await;

        let mut state = self.inner.state.lock();
        if state.fetch.finish(generation).is_none() {
            tracing::debug!(generation, "Discarding superseded page response");
            return Ok(());
        }

        match result {
            Ok(result) => {
                let rows = result.rows.len();
                let total_count = result.total_count;
                let appended = kind == FetchKind::Append;
                if appended {
                    state.store.append(result.rows, total_count);
                } else {
                    state.store.replace_all(result.rows, total_count);
                }
                Self::reconcile_checkbox_overrides(&mut state, !appended);

                let has_more = match self.load_mode() {
                    LoadMode::LazyAppend => (state.store.len() as u64) < total_count,
                    LoadMode::Paged => state.query.can_go_next(total_count),
                };
                state.has_more = has_more;
                drop(state);

                tracing::info!(page, rows, total_count, has_more, appended, "Loaded page");
                self.emit(GridEvent::RowsLoaded {
                    page,
                    rows,
                    total_count,
                    appended,
                });
                Ok(())
            }
            Err(e) => {
                drop(state);
                tracing::warn!(page, error = %e, "Failed to load page");
                self.emit(GridEvent::FetchFailed {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }
}
