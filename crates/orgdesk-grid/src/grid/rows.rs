use super::*;

impl DataGrid {
    /// Create a row through the backend and show the server's copy first
    ///
    /// Creation is not optimistic: the row appears once the backend
    /// returns it with its identity.
    #[tracing::instrument(skip(self, data))]
    pub async fn create_row(&self, data: Row) -> GridResult<Row> {
        self.require_capability(self.inner.capabilities.create, "create_row")?;

        match self.inner.backend.create_row(data).await {
            Ok(row) => {
                let row_id = {
                    let mut state = self.inner.state.lock();
                    let row_id = state.store.row_id(&row);
                    state.store.add(row.clone());
                    row_id
                };
                tracing::info!(row_id = ?row_id, "Row created");
                self.emit(GridEvent::RowCreated { row_id });
                Ok(row)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to create row");
                self.emit(GridEvent::RowCreateFailed {
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Remove a row right away and delete it on the backend
    ///
    /// On failure the row goes back to where it was, unless a refetch has
    /// already reloaded it.
    #[tracing::instrument(skip(self))]
    pub async fn delete_row(&self, row_id: &RowId) -> GridResult<()> {
        self.require_capability(self.inner.capabilities.delete, "delete_row")?;

        let (index, removed) = {
            let mut state = self.inner.state.lock();
            let removed = state
                .store
                .remove_by_id(row_id)
                .ok_or_else(|| GridError::RowNotFound(row_id.to_string()))?;
            if state
                .edit
                .active()
                .is_some_and(|active| &active.cell.row_id == row_id)
            {
                state.edit = EditSession::Viewing;
            }
            removed
        };

        match self.inner.backend.delete_row(row_id).await {
            Ok(()) => {
                self.inner.state.lock().selection.deselect(row_id);
                tracing::info!(row_id = %row_id, "Row deleted");
                self.emit(GridEvent::RowDeleted {
                    row_id: row_id.clone(),
                });
                Ok(())
            }
            Err(e) => {
                tracing::warn!(row_id = %row_id, error = %e, "Delete rejected, restoring row");
                {
                    // A refetch while the delete was in flight may have
                    // brought the row back already
                    let mut state = self.inner.state.lock();
                    if !state.store.contains(row_id) {
                        state.store.insert_at(index, removed);
                    }
                }
                self.emit(GridEvent::RowDeleteFailed {
                    row_id: row_id.clone(),
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Push a server-confirmed row into the store without refetching
    ///
    /// A row whose identity is already loaded is replaced in place,
    /// otherwise it is added at the top.
    pub fn add_item(&self, row: Row) {
        let mut state = self.inner.state.lock();
        let loaded = state
            .store
            .row_id(&row)
            .filter(|id| state.store.contains(id));
        match loaded {
            Some(id) => {
                state.store.replace_by_id(&id, row);
            }
            None => state.store.add(row),
        }
    }

    /// Replace a loaded row with a newer server-confirmed copy
    pub fn update_item(&self, row: Row) -> GridResult<()> {
        let mut state = self.inner.state.lock();
        let id = state
            .store
            .row_id(&row)
            .ok_or_else(|| GridError::MissingRowId(state.store.id_field().to_string()))?;
        state
            .store
            .replace_by_id(&id, row)
            .map(|_| ())
            .ok_or_else(|| GridError::RowNotFound(id.to_string()))
    }
}
