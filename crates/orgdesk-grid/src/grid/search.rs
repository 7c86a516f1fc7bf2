use super::*;

impl DataGrid {
    /// Search box text, used by the client-side filter
    pub fn search_text(&self) -> String {
        self.inner.state.lock().search_input.clone()
    }

    /// Search box keystroke
    ///
    /// `visible_rows` reflects the text immediately. The backend query only
    /// picks it up once typing pauses for the search debounce. Must be
    /// called from within a tokio runtime.
    pub fn set_search_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.inner.state.lock().search_input = text.clone();

        let grid = self.downgrade();
        self.inner.search_debounce.schedule(async move {
            let Some(inner) = grid.upgrade() else {
                return;
            };
            let grid = DataGrid::from_inner(inner);

            let unchanged = grid.inner.state.lock().query.global_filter_text == text;
            if unchanged {
                return;
            }

            tracing::debug!(search = %text, "Search settled");
            if let Err(e) = grid
                .change_query(|query| query.global_filter_text = text)
                .await
            {
                tracing::debug!(error = %e, "Search refetch did not complete");
            }
        });
    }

    /// Columns offered by advanced search
    pub fn searchable_columns(&self) -> Vec<ColumnDescriptor> {
        self.inner
            .state
            .lock()
            .columns
            .searchable()
            .cloned()
            .collect()
    }

    pub fn open_advanced_search(&self) {
        self.inner.state.lock().advanced_search.open();
    }

    pub fn close_advanced_search(&self) {
        self.inner.state.lock().advanced_search.close();
    }

    pub fn is_advanced_search_open(&self) -> bool {
        self.inner.state.lock().advanced_search.is_open()
    }

    /// Pick a searchable field for the advanced search form
    pub fn select_filter_field(&self, accessor_path: &str) -> GridResult<()> {
        let mut state = self.inner.state.lock();
        if !state
            .columns
            .searchable()
            .any(|c| c.accessor_path == accessor_path)
        {
            return Err(GridError::UnknownColumn(accessor_path.to_string()));
        }
        state.advanced_search.select_field(accessor_path);
        Ok(())
    }

    pub fn deselect_filter_field(&self, accessor_path: &str) {
        self.inner
            .state
            .lock()
            .advanced_search
            .deselect_field(accessor_path);
    }

    pub fn set_filter_value(&self, accessor_path: &str, value: Value) -> GridResult<()> {
        if self
            .inner
            .state
            .lock()
            .advanced_search
            .set_value(accessor_path, value)
        {
            Ok(())
        } else {
            Err(GridError::UnknownColumn(accessor_path.to_string()))
        }
    }

    /// Inputs of the advanced search form, one per picked field
    pub fn filter_inputs(&self) -> Vec<FilterInput> {
        let state = self.inner.state.lock();
        state
            .advanced_search
            .inputs(&state.columns, &self.inner.registry)
    }

    /// Clear the advanced search form; the dialog stays open
    pub fn reset_advanced_search(&self) {
        self.inner.state.lock().advanced_search.reset();
    }

    /// Number of advanced filters currently applied
    pub fn active_filter_count(&self) -> usize {
        self.inner.state.lock().advanced_search.active_count()
    }

    /// Apply the advanced search form and refetch
    pub async fn apply_advanced_search(&self) -> GridResult<()> {
        let filters = self.inner.state.lock().advanced_search.apply();
        self.commit_advanced_filters(filters).await
    }

    /// Drop every advanced filter, close the dialog and refetch
    pub async fn remove_advanced_filters(&self) -> GridResult<()> {
        let filters = self.inner.state.lock().advanced_search.remove_filter();
        self.commit_advanced_filters(filters).await
    }

    async fn commit_advanced_filters(&self, filters: BTreeMap<String, Value>) -> GridResult<()> {
        let active = filters.len();
        tracing::debug!(active, "Applying advanced filters");
        self.emit(GridEvent::FiltersApplied { active });
        self.change_query(|query| query.advanced_filters = filters)
            .await
    }
}
