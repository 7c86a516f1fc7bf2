use super::*;

impl DataGrid {
    /// Header/row string matrix for the visible data columns
    pub fn export_matrix(&self, scope: ExportScope) -> ExportMatrix {
        let state = self.inner.state.lock();
        let rows = match scope {
            ExportScope::Visible => self.filter_visible(&state),
            ExportScope::Selected => state.selection.selected_rows(&state.store),
        };
        ExportMatrix::build(&state.columns, &self.inner.registry, &rows)
    }

    /// Write an export through a sink. Returns the number of rows written.
    pub fn export_to(&self, scope: ExportScope, sink: &mut dyn ExportSink) -> GridResult<usize> {
        let matrix = self.export_matrix(scope);
        if matrix.is_empty() {
            tracing::info!(?scope, "No data to export");
            return Ok(0);
        }
        sink.write_matrix(&matrix)?;
        Ok(matrix.rows.len())
    }
}
