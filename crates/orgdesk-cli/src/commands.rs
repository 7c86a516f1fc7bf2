//! Command handlers

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use comfy_table::{Cell, ContentArrangement, Table, presets::UTF8_FULL};
use orgdesk_core::{ColumnDecl, ColumnDescriptor, Row, RowId};
use orgdesk_grid::{
    AlwaysConfirm, ColumnModel, ConfirmPrompt, CsvSink, DataGrid, EditorKind, ExportScope,
    GridEvent, SortSpec,
};
use orgdesk_settings::{GridSettings, LoadMode};
use serde::Deserialize;
use serde_json::Value;

use crate::json_backend::JsonFileBackend;

/// Column declarations file
///
/// Either a plain array of base columns, or an object separating base and
/// organization-defined columns with optional header labels for the latter.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ColumnsFile {
    Base(Vec<ColumnDecl>),
    Split(SplitColumns),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitColumns {
    #[serde(default)]
    pub base: Vec<ColumnDecl>,
    #[serde(default)]
    pub dynamic: Vec<ColumnDecl>,
    #[serde(default)]
    pub field_labels: BTreeMap<String, String>,
}

impl ColumnsFile {
    pub fn load(path: &Path) -> Result<SplitColumns> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read columns file: {:?}", path))?;
        let file: ColumnsFile = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse columns file: {:?}", path))?;
        Ok(match file {
            ColumnsFile::Base(base) => SplitColumns {
                base,
                ..Default::default()
            },
            ColumnsFile::Split(split) => split,
        })
    }
}

/// Where a grid's data and columns come from
pub struct GridSource<'a> {
    pub rows: &'a Path,
    pub columns: &'a Path,
    pub order_file: Option<PathBuf>,
}

/// Build a grid over a rows file. Grid events are logged as they arrive.
pub fn open_grid(source: &GridSource<'_>, settings: GridSettings) -> Result<DataGrid> {
    let columns = ColumnsFile::load(source.columns)?;
    let mut backend = JsonFileBackend::open(source.rows, settings.id_field.clone())?
        .with_labels(columns.field_labels);
    if let Some(order_file) = &source.order_file {
        backend = backend.with_order_file(order_file.clone());
    }

    let model = ColumnModel::builder()
        .base(columns.base)
        .dynamic(columns.dynamic)
        .build()?;

    let (grid, mut events) = DataGrid::new(settings, model, Arc::new(backend));
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });
    Ok(grid)
}

fn log_event(event: &GridEvent) {
    match event {
        GridEvent::FetchFailed { message }
        | GridEvent::RowCreateFailed { message }
        | GridEvent::ColumnOrderPersistFailed { message } => {
            tracing::warn!(%message, "Grid operation failed")
        }
        GridEvent::CommitFailed {
            row_id,
            column_id,
            message,
        } => tracing::warn!(%row_id, %column_id, %message, "Edit rolled back"),
        GridEvent::BulkActionFailed {
            action,
            rows,
            message,
        } => tracing::warn!(%action, rows, %message, "Bulk action failed"),
        GridEvent::ValidationWarning { column_id, message } => {
            tracing::warn!(%column_id, %message, "Value rejected")
        }
        other => tracing::debug!(event = ?other, "Grid event"),
    }
}

/// Resolve a column by id or accessor path
fn find_column(grid: &DataGrid, field: &str) -> Result<ColumnDescriptor> {
    let columns = grid.columns();
    columns
        .get(field)
        .or_else(|| columns.by_accessor(field))
        .cloned()
        .ok_or_else(|| anyhow!("Unknown column '{}'", field))
}

/// `column` or `column:desc`
pub fn parse_sort(value: &str) -> SortSpec {
    match value.rsplit_once(':') {
        Some((column, "desc")) => SortSpec::desc(column),
        Some((column, "asc")) => SortSpec::asc(column),
        _ => SortSpec::asc(value),
    }
}

/// `path=value` pairs for advanced search
pub fn parse_filter(value: &str) -> Result<(String, String)> {
    let (path, wanted) = value
        .split_once('=')
        .ok_or_else(|| anyhow!("Filter '{}' is not of the form path=value", value))?;
    Ok((path.trim().to_string(), wanted.trim().to_string()))
}

pub struct BrowseOptions {
    pub page: usize,
    pub sort: Option<String>,
    pub search: Option<String>,
    pub filters: Vec<String>,
    pub json: bool,
}

pub async fn browse(grid: &DataGrid, options: BrowseOptions) -> Result<()> {
    if let Some(sort) = &options.sort {
        let spec = parse_sort(sort);
        let column = find_column(grid, &spec.column_id)?;
        grid.set_sort(Some(SortSpec { column_id: column.id, ..spec }))
            .await?;
    }

    if !options.filters.is_empty() {
        for filter in &options.filters {
            let (path, wanted) = parse_filter(filter)?;
            let column = find_column(grid, &path)?;
            grid.select_filter_field(&column.accessor_path)?;
            grid.set_filter_value(&column.accessor_path, Value::String(wanted))?;
        }
        grid.apply_advanced_search().await?;
    }

    if let Some(search) = &options.search {
        grid.set_search_text(search.clone());
        // Let the debounced query run
        tokio::time::sleep(grid.settings().search_debounce() * 2).await;
    }

    match grid.load_mode() {
        LoadMode::Paged => grid.set_page(options.page.saturating_sub(1)).await?,
        LoadMode::LazyAppend => {
            grid.refresh().await?;
            for _ in 1..options.page {
                if !grid.has_more() {
                    break;
                }
                grid.load_more().await?;
            }
        }
    }

    let rows = grid.visible_rows();
    if options.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    print_rows_table(grid, &rows);
    match grid.load_mode() {
        LoadMode::Paged => println!(
            "Page {} of {} ({} rows total)",
            grid.page_index() + 1,
            grid.page_count(),
            grid.total_count()
        ),
        LoadMode::LazyAppend => println!(
            "Loaded {} of {} rows",
            grid.loaded_count(),
            grid.total_count()
        ),
    }
    Ok(())
}

fn print_rows_table(grid: &DataGrid, rows: &[Row]) {
    let columns = grid.columns();
    let visible: Vec<&ColumnDescriptor> = columns.visible_data().collect();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(visible.iter().map(|c| Cell::new(&c.header)));

    for row in rows {
        table.add_row(visible.iter().map(|column| {
            Cell::new(
                grid.registry()
                    .display_text(column, row.get_path(&column.accessor_path)),
            )
        }));
    }

    println!("{table}");
}

/// Load the row with `row_id` into the grid
async fn focus_row(grid: &DataGrid, row_id: &RowId) -> Result<()> {
    let id_field = grid.settings().id_field.clone();
    let mut filters = BTreeMap::new();
    filters.insert(id_field, Value::String(row_id.to_string()));
    grid.set_extra_filters(filters).await?;

    if grid.row(row_id).is_none() {
        bail!("Row '{}' not found", row_id);
    }
    Ok(())
}

pub async fn edit(grid: &DataGrid, row_id: &RowId, field: &str, value: &str) -> Result<()> {
    focus_row(grid, row_id).await?;
    let column = find_column(grid, field)?;

    if grid.editor(&column.id)? == EditorKind::Toggle {
        let wanted = matches!(value.trim().to_lowercase().as_str(), "true" | "yes" | "1");
        let current = grid.display_text(row_id, &column.id)? == "Yes";
        if wanted != current {
            grid.toggle_checkbox(row_id, &column.id).await?;
        }
    } else {
        grid.begin_edit(row_id, &column.id)?;
        grid.set_draft(Value::String(value.to_string()))?;
        grid.commit_edit().await?;
    }

    println!(
        "{} = {}",
        column.header,
        grid.display_text(row_id, &column.id)?
    );
    Ok(())
}

/// Asks on stdin before destructive actions
pub struct StdinConfirm;

#[async_trait]
impl ConfirmPrompt for StdinConfirm {
    async fn confirm(&self, message: &str) -> bool {
        let message = message.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            print!("{} [y/N]: ", message);
            io::stdout().flush().ok();
            let mut input = String::new();
            io::stdin().read_line(&mut input).ok();
            input
        })
        .await
        .unwrap_or_default();
        is_yes(&answer)
    }
}

fn is_yes(answer: &str) -> bool {
    let normalized = answer.trim().to_lowercase();
    normalized == "y" || normalized == "yes"
}

pub async fn delete(grid: &DataGrid, row_ids: &[RowId], assume_yes: bool) -> Result<()> {
    let id_field = grid.settings().id_field.clone();
    let mut filters = BTreeMap::new();
    filters.insert(
        id_field,
        Value::Array(
            row_ids
                .iter()
                .map(|id| Value::String(id.to_string()))
                .collect(),
        ),
    );
    grid.set_extra_filters(filters).await?;

    for id in row_ids {
        grid.toggle_row_selection(id)
            .with_context(|| format!("Row '{}' not found", id))?;
    }

    let deleted = if assume_yes {
        grid.bulk_delete(&AlwaysConfirm).await?
    } else {
        grid.bulk_delete(&StdinConfirm).await?
    };
    println!("Deleted {} row(s)", deleted);
    Ok(())
}

pub async fn reorder(grid: &DataGrid, from: usize, to: usize) -> Result<()> {
    let order = grid.move_dynamic_column(from, to)?;
    if grid.capabilities().persist_column_order {
        // Let the debounced save run
        tokio::time::sleep(grid.settings().column_order_debounce() * 2).await;
    }
    println!("{}", order.join(", "));
    Ok(())
}

pub async fn export(grid: &DataGrid, out: &Path, search: Option<String>) -> Result<()> {
    match search {
        Some(search) => {
            grid.set_search_text(search);
            tokio::time::sleep(grid.settings().search_debounce() * 2).await;
        }
        None => grid.refresh().await?,
    }
    while grid.load_mode() == LoadMode::LazyAppend && grid.has_more() {
        grid.load_more().await?;
    }

    let mut sink = CsvSink::create(out)?;
    let written = grid.export_to(ExportScope::Visible, &mut sink)?;
    sink.into_inner()?;
    println!("Exported {} row(s) to {}", written, out.display());
    Ok(())
}
