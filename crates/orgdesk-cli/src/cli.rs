//! orgdesk - browse and edit grid data from the terminal
//!
//! Runs the grid engine over a JSON rows file and a column declarations
//! file, the same way an admin screen drives it.

mod commands;
mod json_backend;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use orgdesk_core::RowId;
use orgdesk_settings::{GridSettings, LoadMode};

use crate::commands::{BrowseOptions, GridSource};

#[derive(Parser)]
#[command(name = "orgdesk")]
#[command(about = "Browse, edit and export grid data", long_about = None)]
#[command(version)]
struct Cli {
    /// Grid settings file (defaults to <config dir>/orgdesk/grid.toml)
    #[arg(long, global = true, env = "ORGDESK_SETTINGS")]
    settings: Option<PathBuf>,

    /// Column declarations file
    #[arg(long, global = true, default_value = "columns.json")]
    columns: PathBuf,

    /// Log level
    #[arg(long, value_parser = ["error", "warn", "info", "debug", "trace"], default_value = "warn", global = true)]
    log_level: String,

    /// Also write JSON logs to the log directory
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one page of rows
    Browse {
        rows: PathBuf,

        /// 1-based page; in lazy mode, the number of pages to load
        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(long)]
        page_size: Option<usize>,

        /// Infinite-scroll loading instead of pages
        #[arg(long)]
        lazy: bool,

        /// Sort column, `column` or `column:desc`
        #[arg(long)]
        sort: Option<String>,

        /// Global search text
        #[arg(long)]
        search: Option<String>,

        /// Advanced filter, `path=value` (repeatable)
        #[arg(long = "filter")]
        filters: Vec<String>,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Set one cell
    Edit {
        rows: PathBuf,

        #[arg(long)]
        row: String,

        /// Column id or accessor path
        #[arg(long)]
        field: String,

        #[arg(long)]
        value: String,
    },

    /// Delete rows after confirmation
    Delete {
        rows: PathBuf,

        #[arg(long = "row", required = true)]
        row_ids: Vec<String>,

        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Move an organization-defined column
    Reorder {
        rows: PathBuf,

        #[arg(long)]
        from: usize,

        #[arg(long)]
        to: usize,

        /// File the new order is saved to
        #[arg(long, default_value = "column-order.json")]
        order_file: PathBuf,
    },

    /// Export every matching row to CSV
    Export {
        rows: PathBuf,

        #[arg(long)]
        out: PathBuf,

        #[arg(long)]
        search: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = logging::LoggingConfig::with_level(&cli.log_level);
    if cli.log_file {
        log_config = log_config.with_json_file();
    }
    let _log_guard = logging::init(log_config)?;

    let settings = orgdesk_settings::load_or_default(cli.settings.as_deref())?;

    match cli.command {
        Commands::Browse {
            rows,
            page,
            page_size,
            lazy,
            sort,
            search,
            filters,
            json,
        } => {
            let mut settings = settings;
            if lazy {
                settings.load_mode = LoadMode::LazyAppend;
            }
            if let Some(page_size) = page_size {
                settings = settings.with_page_size(page_size);
            }
            let grid = commands::open_grid(&source(&rows, &cli.columns, None), settings)?;
            commands::browse(
                &grid,
                BrowseOptions {
                    page,
                    sort,
                    search,
                    filters,
                    json,
                },
            )
            .await
        }
        Commands::Edit {
            rows,
            row,
            field,
            value,
        } => {
            let grid = commands::open_grid(&source(&rows, &cli.columns, None), settings)?;
            commands::edit(&grid, &RowId::new(row), &field, &value).await
        }
        Commands::Delete { rows, row_ids, yes } => {
            let grid = commands::open_grid(&source(&rows, &cli.columns, None), settings)?;
            let row_ids: Vec<RowId> = row_ids.into_iter().map(RowId::new).collect();
            commands::delete(&grid, &row_ids, yes).await
        }
        Commands::Reorder {
            rows,
            from,
            to,
            order_file,
        } => {
            let grid = commands::open_grid(
                &source(&rows, &cli.columns, Some(order_file)),
                settings,
            )?;
            commands::reorder(&grid, from, to).await
        }
        Commands::Export { rows, out, search } => {
            let grid = commands::open_grid(
                &source(&rows, &cli.columns, None),
                for_export(settings),
            )?;
            commands::export(&grid, &out, search).await
        }
    }
}

fn source<'a>(
    rows: &'a std::path::Path,
    columns: &'a std::path::Path,
    order_file: Option<PathBuf>,
) -> GridSource<'a> {
    GridSource {
        rows,
        columns,
        order_file,
    }
}

/// Exports page through everything, so load lazily
fn for_export(settings: GridSettings) -> GridSettings {
    GridSettings {
        load_mode: LoadMode::LazyAppend,
        ..settings
    }
}
