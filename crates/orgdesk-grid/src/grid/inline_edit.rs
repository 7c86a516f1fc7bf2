use super::*;

impl DataGrid {
    /// Handle a click on a cell: checkboxes toggle, other editable cells
    /// enter edit mode
    pub async fn click_cell(&self, row_id: &RowId, column_id: &str) -> GridResult<()> {
        let toggles = {
            let state = self.inner.state.lock();
            let column = state.columns.require(column_id)?;
            self.inner.registry.commits_on_toggle(column)
        };

        if toggles {
            self.toggle_checkbox(row_id, column_id).await.map(|_| ())
        } else {
            self.begin_edit(row_id, column_id).map(|_| ())
        }
    }

    /// Enter edit mode on a cell and return the editor's seed value
    ///
    /// Any other cell being edited is cancelled without committing.
    pub fn begin_edit(&self, row_id: &RowId, column_id: &str) -> GridResult<Value> {
        let mut state = self.inner.state.lock();
        let column = state.columns.require(column_id)?.clone();
        self.check_editable(&column)?;
        if self.inner.registry.commits_on_toggle(&column) {
            return Err(GridError::Unsupported("checkbox cells toggle instead of editing"));
        }

        let cell = CellRef::new(row_id.clone(), column.accessor_path.clone());
        if let Some(active) = state.edit.active().filter(|a| a.cell == cell) {
            return Ok(active.draft.clone());
        }

        let row = state
            .store
            .find(row_id)
            .ok_or_else(|| GridError::RowNotFound(row_id.to_string()))?;
        let seed = self
            .inner
            .registry
            .edit_value(&column, row.get_path(&column.accessor_path));

        if let Some(previous) = state.edit.take() {
            tracing::debug!(
                row_id = %previous.cell.row_id,
                column_id = %previous.column_id,
                "Cancelling edit in favour of another cell"
            );
            self.emit(GridEvent::EditCancelled {
                row_id: previous.cell.row_id,
                column_id: previous.column_id,
            });
        }

        state.edit = EditSession::Editing(ActiveEdit {
            cell,
            column_id: column.id.clone(),
            draft: seed.clone(),
            seed: seed.clone(),
        });
        drop(state);

        self.emit(GridEvent::EditStarted {
            row_id: row_id.clone(),
            column_id: column.id,
        });
        Ok(seed)
    }

    /// Update the draft of the cell being edited
    pub fn set_draft(&self, draft: Value) -> GridResult<()> {
        if self.inner.state.lock().edit.set_draft(draft) {
            Ok(())
        } else {
            Err(GridError::NoActiveEdit)
        }
    }

    /// Leave edit mode without committing
    pub fn cancel_edit(&self) {
        let cancelled = self.inner.state.lock().edit.take();
        if let Some(active) = cancelled {
            self.emit(GridEvent::EditCancelled {
                row_id: active.cell.row_id,
                column_id: active.column_id,
            });
        }
    }

    /// Commit the cell being edited
    ///
    /// The normalized value is applied to the row store and the session
    /// returns to `Viewing` before the backend is called. If the backend
    /// rejects the update the field is restored to its pre-edit value and a
    /// `CommitFailed` event is emitted.
    #[tracing::instrument(skip(self))]
    pub async fn commit_edit(&self) -> GridResult<()> {
        let (cell, column_id, update, snapshot) = {
            let mut state = self.inner.state.lock();
            let active = state.edit.take().ok_or(GridError::NoActiveEdit)?;
            let column = state.columns.require(&active.column_id)?.clone();

            if active.is_unchanged() {
                tracing::debug!(column_id = %column.id, "Draft untouched, nothing to commit");
                return Ok(());
            }

            let normalized = match self.inner.registry.normalize(&column, &active.draft) {
                Ok(normalized) => normalized,
                Err(e) => {
                    drop(state);
                    tracing::warn!(column_id = %column.id, error = %e, "Edit value rejected");
                    self.emit(GridEvent::ValidationWarning {
                        column_id: column.id.clone(),
                        message: e.to_string(),
                    });
                    self.emit(GridEvent::EditCancelled {
                        row_id: active.cell.row_id,
                        column_id: column.id,
                    });
                    return Err(e.into());
                }
            };

            let path = active.cell.accessor_path.as_str();
            let row = state
                .store
                .find(&active.cell.row_id)
                .ok_or_else(|| GridError::RowNotFound(active.cell.row_id.to_string()))?;
            let snapshot = row.get_path(path).cloned();

            // The stored value may be in a looser shape than the normalizer
            // emits (a number for money, a timestamp for a date), so compare
            // in normalized form as well
            let seed_normalized = self.inner.registry.normalize(&column, &active.seed).ok();
            let unchanged = seed_normalized.as_ref() == Some(&normalized)
                || match (&normalized, &snapshot) {
                    (Normalized::Set(new), Some(old)) => new == old,
                    (Normalized::Unset, None) | (Normalized::Unset, Some(Value::Null)) => true,
                    _ => false,
                };
            if unchanged {
                tracing::debug!(column_id = %column.id, "Value unchanged, nothing to commit");
                return Ok(());
            }

            let mut entry = None;
            state.store.update_by_id(&active.cell.row_id, |row| {
                edit::apply_normalized(row, path, &normalized);
                entry = Some(edit::update_entry(row, path));
            });
            let Some((field, value)) = entry else {
                return Err(GridError::RowNotFound(active.cell.row_id.to_string()));
            };

            let update = RowUpdate::new(active.cell.row_id.clone()).with(field, value);
            (active.cell, column.id, update, (snapshot, normalized))
        };
        let (snapshot, normalized) = snapshot;

        self.emit(GridEvent::CellCommitted {
            row_id: cell.row_id.clone(),
            column_id: column_id.clone(),
            value: normalized.to_value(),
        });

        match self.inner.backend.update_row(update).await {
            Ok(_) => {
                tracing::info!(
                    row_id = %cell.row_id,
                    column_id = %column_id,
                    "Cell committed"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(
                    row_id = %cell.row_id,
                    column_id = %column_id,
                    error = %e,
                    "Cell update rejected, rolling back"
                );
                self.inner
                    .state
                    .lock()
                    .store
                    .update_by_id(&cell.row_id, |row| {
                        edit::restore_field(row, &cell.accessor_path, snapshot)
                    });
                self.emit(GridEvent::CommitFailed {
                    row_id: cell.row_id,
                    column_id,
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Flip a checkbox cell and send it right away
    ///
    /// The new value is also kept as an override until a refetch returns
    /// the same value from the server, so a refetch that raced the update
    /// does not flip the cell back.
    #[tracing::instrument(skip(self))]
    pub async fn toggle_checkbox(&self, row_id: &RowId, column_id: &str) -> GridResult<bool> {
        let (cell, update, snapshot, checked) = {
            let mut state = self.inner.state.lock();
            let column = state.columns.require(column_id)?.clone();
            self.check_editable(&column)?;
            if column.field_type != FieldType::Checkbox {
                return Err(GridError::Unsupported("toggle on a non-checkbox column"));
            }

            if let Some(previous) = state.edit.take() {
                self.emit(GridEvent::EditCancelled {
                    row_id: previous.cell.row_id,
                    column_id: previous.column_id,
                });
            }

            let path = column.accessor_path.clone();
            let row = state
                .store
                .find(row_id)
                .ok_or_else(|| GridError::RowNotFound(row_id.to_string()))?;
            let snapshot = row.get_path(&path).cloned();
            let checked = !snapshot.as_ref().is_some_and(is_truthy);

            let mut entry = None;
            state.store.update_by_id(row_id, |row| {
                row.set_path(&path, Value::Bool(checked));
                entry = Some(edit::update_entry(row, &path));
            });
            let Some((field, value)) = entry else {
                return Err(GridError::RowNotFound(row_id.to_string()));
            };

            let cell = CellRef::new(row_id.clone(), path);
            state.checkbox_overrides.insert(cell.clone(), checked);
            let update = RowUpdate::new(row_id.clone()).with(field, value);
            (cell, update, snapshot, checked)
        };

        self.emit(GridEvent::CellCommitted {
            row_id: row_id.clone(),
            column_id: column_id.to_string(),
            value: Value::Bool(checked),
        });

        match self.inner.backend.update_row(update).await {
            Ok(_) => {
                tracing::info!(row_id = %row_id, column_id, checked, "Checkbox committed");
                Ok(checked)
            }
            Err(e) => {
                tracing::warn!(row_id = %row_id, column_id, error = %e, "Checkbox update rejected");
                {
                    let mut state = self.inner.state.lock();
                    if state.checkbox_overrides.get(&cell) == Some(&checked) {
                        state.checkbox_overrides.remove(&cell);
                    }
                    state.store.update_by_id(row_id, |row| {
                        edit::restore_field(row, &cell.accessor_path, snapshot)
                    });
                }
                self.emit(GridEvent::CommitFailed {
                    row_id: row_id.clone(),
                    column_id: column_id.to_string(),
                    message: e.to_string(),
                });
                Err(e.into())
            }
        }
    }

    /// Whether a column accepts edits in this grid
    pub fn can_edit(&self, column_id: &str) -> bool {
        let state = self.inner.state.lock();
        state
            .columns
            .get(column_id)
            .is_some_and(|column| self.check_editable(column).is_ok())
    }

    fn check_editable(&self, column: &ColumnDescriptor) -> GridResult<()> {
        if !column.can_edit() {
            return Err(GridError::NotEditable(column.id.clone()));
        }
        self.require_capability(self.inner.capabilities.update, "update_row")
    }

    /// Re-apply pending checkbox overrides after a fetch, dropping the ones
    /// the server now agrees with
    ///
    /// After a full replace, overrides for rows that are no longer loaded
    /// are dropped too.
    pub(crate) fn reconcile_checkbox_overrides(state: &mut GridState, replaced: bool) {
        if state.checkbox_overrides.is_empty() {
            return;
        }

        let overrides: Vec<(CellRef, bool)> = state
            .checkbox_overrides
            .iter()
            .map(|(cell, checked)| (cell.clone(), *checked))
            .collect();

        for (cell, checked) in overrides {
            let Some(row) = state.store.find(&cell.row_id) else {
                if replaced {
                    state.checkbox_overrides.remove(&cell);
                }
                continue;
            };
            let server = row.get_path(&cell.accessor_path).is_some_and(is_truthy);
            if server == checked {
                state.checkbox_overrides.remove(&cell);
            } else {
                state.store.update_by_id(&cell.row_id, |row| {
                    row.set_path(&cell.accessor_path, Value::Bool(checked))
                });
            }
        }
    }
}
