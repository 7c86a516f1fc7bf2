//! Export matrix and sinks
//!
//! The grid produces a header/row string matrix using the same display
//! rules as the cells. Turning the matrix into bytes is the sink's job.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use orgdesk_core::{ColumnDescriptor, Row};
use serde_json::Value;

use crate::columns::ColumnModel;
use crate::error::{GridError, GridResult};
use crate::registry::FieldRegistry;

/// Which rows an export covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportScope {
    /// Loaded rows passing the client-side search filter
    #[default]
    Visible,
    /// Selected rows that are loaded
    Selected,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExportMatrix {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportMatrix {
    /// Build the matrix over the visible data columns
    pub fn build(columns: &ColumnModel, registry: &FieldRegistry, rows: &[Row]) -> Self {
        let columns: Vec<&ColumnDescriptor> = columns.visible_data().collect();
        let headers = columns.iter().map(|c| c.header.clone()).collect();
        let rows = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| cell_text(registry, column, row))
                    .collect()
            })
            .collect();

        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell_text(registry: &FieldRegistry, column: &ColumnDescriptor, row: &Row) -> String {
    match row.get_path(&column.accessor_path) {
        Some(Value::Bool(true)) => "Yes".to_string(),
        Some(Value::Bool(false)) => "No".to_string(),
        value => registry.display_text(column, value),
    }
}

/// Writer collaborator for an export matrix
pub trait ExportSink {
    fn write_matrix(&mut self, matrix: &ExportMatrix) -> GridResult<()>;
}

/// CSV writer backed by the `csv` crate
pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl CsvSink<File> {
    pub fn create(path: &Path) -> GridResult<Self> {
        let writer = csv::Writer::from_path(path)
            .map_err(|e| GridError::Export(format!("{}: {}", path.display(), e)))?;
        Ok(Self { writer })
    }
}

impl<W: Write> CsvSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(inner),
        }
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(self) -> GridResult<W> {
        self.writer
            .into_inner()
            .map_err(|e| GridError::Export(e.to_string()))
    }
}

impl<W: Write> ExportSink for CsvSink<W> {
    fn write_matrix(&mut self, matrix: &ExportMatrix) -> GridResult<()> {
        let to_export = |e: csv::Error| GridError::Export(e.to_string());

        self.writer.write_record(&matrix.headers).map_err(to_export)?;
        for row in &matrix.rows {
            self.writer.write_record(row).map_err(to_export)?;
        }
        self.writer
            .flush()
            .map_err(|e| GridError::Export(e.to_string()))?;

        tracing::info!(rows = matrix.rows.len(), "Exported rows as CSV");
        Ok(())
    }
}
