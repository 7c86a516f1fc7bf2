use async_trait::async_trait;

use super::*;

/// Confirmation step shown before destructive bulk actions
#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Prompt that accepts everything, for non-interactive hosts
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

#[async_trait]
impl ConfirmPrompt for AlwaysConfirm {
    async fn confirm(&self, _message: &str) -> bool {
        true
    }
}

impl DataGrid {
    pub fn is_selected(&self, row_id: &RowId) -> bool {
        self.inner.state.lock().selection.is_selected(row_id)
    }

    /// Flip one row's selection. Returns the new state.
    pub fn toggle_row_selection(&self, row_id: &RowId) -> GridResult<bool> {
        let (selected, count) = {
            let mut state = self.inner.state.lock();
            if !state.store.contains(row_id) {
                return Err(GridError::RowNotFound(row_id.to_string()));
            }
            let selected = state.selection.toggle(row_id.clone());
            (selected, state.selection.count(&state.store))
        };
        self.emit(GridEvent::SelectionChanged { selected: count });
        Ok(selected)
    }

    /// Select every loaded row
    pub fn select_all_loaded(&self) {
        let count = {
            let mut state = self.inner.state.lock();
            let GridState {
                selection, store, ..
            } = &mut *state;
            selection.select_all(store);
            selection.count(store)
        };
        self.emit(GridEvent::SelectionChanged { selected: count });
    }

    pub fn clear_selection(&self) {
        self.inner.state.lock().selection.clear();
        self.emit(GridEvent::SelectionChanged { selected: 0 });
    }

    /// Selected rows that are still loaded, in display order
    pub fn selected_rows(&self) -> Vec<Row> {
        let state = self.inner.state.lock();
        state.selection.selected_rows(&state.store)
    }

    pub fn selected_count(&self) -> usize {
        let state = self.inner.state.lock();
        state.selection.count(&state.store)
    }

    /// Delete every selected row after confirmation
    ///
    /// All deletes run concurrently. If any fails, one aggregate
    /// `BulkActionFailed` is emitted, rows already deleted stay deleted and
    /// the selection is kept. Either way the grid refetches.
    #[tracing::instrument(skip(self, prompt))]
    pub async fn bulk_delete(&self, prompt: &dyn ConfirmPrompt) -> GridResult<usize> {
        self.require_capability(self.inner.capabilities.delete, "delete_row")?;

        let ids = self.bulk_targets();
        if ids.is_empty() {
            return Ok(0);
        }

        let message = format!("Delete {} selected row(s)?", ids.len());
        if !prompt.confirm(&message).await {
            tracing::debug!(rows = ids.len(), "Bulk delete cancelled");
            return Err(GridError::Cancelled);
        }

        let backend = &self.inner.backend;
        let result = try_join_all(ids.iter().map(|id| backend.delete_row(id))).await;
        self.finish_bulk(BulkActionKind::Delete, ids.len(), result.map(|_| ()))
            .await
    }

    /// Set one field to one value on every selected row
    ///
    /// The value goes through the same normalization as an inline edit.
    /// Failure handling matches `bulk_delete`.
    #[tracing::instrument(skip(self))]
    pub async fn bulk_update(&self, column_id: &str, input: Value) -> GridResult<usize> {
        let (updates, accessor_path) = {
            let mut guard = self.inner.state.lock();
            let state = &mut *guard;
            state.selection.prune(&state.store);
            let column = state.columns.require(column_id)?;
            self.check_bulk_editable(column)?;

            let normalized = match self.inner.registry.normalize(column, &input) {
                Ok(normalized) => normalized,
                Err(e) => {
                    self.emit(GridEvent::ValidationWarning {
                        column_id: column.id.clone(),
                        message: e.to_string(),
                    });
                    return Err(e.into());
                }
            };

            let path = column.accessor_path.clone();
            let updates: Vec<RowUpdate> = state
                .selection
                .selected_rows(&state.store)
                .into_iter()
                .filter_map(|mut row| {
                    let id = state.store.row_id(&row)?;
                    edit::apply_normalized(&mut row, &path, &normalized);
                    let (field, value) = edit::update_entry(&row, &path);
                    Some(RowUpdate::new(id).with(field, value))
                })
                .collect();
            (updates, path)
        };

        if updates.is_empty() {
            return Ok(0);
        }

        let rows = updates.len();
        let backend = &self.inner.backend;
        let result = try_join_all(updates.into_iter().map(|u| backend.update_row(u))).await;
        self.finish_bulk(
            BulkActionKind::Update { accessor_path },
            rows,
            result.map(|_| ()),
        )
        .await
    }

    fn check_bulk_editable(&self, column: &ColumnDescriptor) -> GridResult<()> {
        if !column.can_edit() {
            return Err(GridError::NotEditable(column.id.clone()));
        }
        self.require_capability(self.inner.capabilities.update, "update_row")
    }

    /// Selected ids of loaded rows, with orphaned keys dropped first
    fn bulk_targets(&self) -> Vec<RowId> {
        let mut guard = self.inner.state.lock();
        let state = &mut *guard;
        state.selection.prune(&state.store);
        state.selection.selected_ids(&state.store)
    }

    async fn finish_bulk(
        &self,
        action: BulkActionKind,
        rows: usize,
        result: orgdesk_core::CoreResult<()>,
    ) -> GridResult<usize> {
        let outcome = match result {
            Ok(()) => {
                tracing::info!(%action, rows, "Bulk action completed");
                self.inner.state.lock().selection.clear();
                self.emit(GridEvent::BulkActionCompleted { action, rows });
                self.emit(GridEvent::SelectionChanged { selected: 0 });
                Ok(rows)
            }
            Err(e) => {
                tracing::warn!(%action, rows, error = %e, "Bulk action failed");
                self.emit(GridEvent::BulkActionFailed {
                    action,
                    rows,
                    message: e.to_string(),
                });
                Err(GridError::from(e))
            }
        };

        if let Err(e) = self.refresh().await {
            tracing::debug!(error = %e, "Refresh after bulk action failed");
        }
        outcome
    }
}
