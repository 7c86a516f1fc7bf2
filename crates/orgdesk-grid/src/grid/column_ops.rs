use super::*;
use crate::column_order;

impl DataGrid {
    /// Field names of the dynamic columns in display order
    pub fn dynamic_field_order(&self) -> Vec<String> {
        self.inner.state.lock().columns.dynamic_field_names()
    }

    /// Drag-end inside the dynamic columns, positions in the displayed order
    pub fn move_dynamic_column(&self, from: usize, to: usize) -> GridResult<Vec<String>> {
        self.reorder(|columns| column_order::move_dynamic(columns, from, to))
    }

    /// Drop column `column_id` onto the slot of `target_id`
    pub fn move_column_to(&self, column_id: &str, target_id: &str) -> GridResult<Vec<String>> {
        self.reorder(|columns| column_order::move_column_to(columns, column_id, target_id))
    }

    pub fn set_column_hidden(&self, column_id: &str, hidden: bool) -> GridResult<()> {
        self.inner.state.lock().columns.set_hidden(column_id, hidden)
    }

    /// Re-read dynamic column headers from the backend's label resolver
    pub fn refresh_field_labels(&self) {
        let backend = self.inner.backend.clone();
        self.inner
            .state
            .lock()
            .columns
            .resolve_dynamic_headers(|field| backend.resolve_field_label(field));
    }

    fn reorder(
        &self,
        compute: impl FnOnce(&[ColumnDescriptor]) -> GridResult<Vec<ColumnDescriptor>>,
    ) -> GridResult<Vec<String>> {
        let field_names = {
            let mut state = self.inner.state.lock();
            let reordered = compute(state.columns.columns())?;
            state.columns.set_order(reordered);
            state.columns.dynamic_field_names()
        };

        tracing::debug!(?field_names, "Dynamic columns reordered");
        self.emit(GridEvent::ColumnOrderChanged {
            field_names: field_names.clone(),
        });

        if self.inner.capabilities.persist_column_order {
            self.schedule_column_order_persist();
        }
        Ok(field_names)
    }

    /// Persist the order once drags pause. The local order stays as is
    /// whatever the outcome.
    fn schedule_column_order_persist(&self) {
        let grid = self.downgrade();
        self.inner.column_order_debounce.schedule(async move {
            let Some(inner) = grid.upgrade() else {
                return;
            };

            let field_names = inner.state.lock().columns.dynamic_field_names();
            match inner
                .backend
                .persist_column_order(field_names.clone())
                .await
            {
                Ok(()) => {
                    tracing::info!(fields = field_names.len(), "Column order persisted");
                    inner.emit(GridEvent::ColumnOrderPersisted { field_names });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to persist column order");
                    inner.emit(GridEvent::ColumnOrderPersistFailed {
                        message: e.to_string(),
                    });
                }
            }
        });
    }
}
