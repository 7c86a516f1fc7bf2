use orgdesk_core::CoreError;
use thiserror::Error;

pub type GridResult<T> = Result<T, GridError>;

/// Local rejection of an edit value. Never reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Time must be in HH:MM format, got '{0}'")]
    InvalidTime(String),

    #[error("'{0}' is not a valid amount")]
    InvalidMoney(String),

    #[error("'{0}' is not a valid number")]
    InvalidNumber(String),

    #[error("'{0}' is not a valid ID number")]
    InvalidIdNumber(String),
}

/// Grid-level errors with user-facing messages
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Invalid value: {0}")]
    Validation(#[from] ValidationError),

    #[error("Column '{0}' is not editable")]
    NotEditable(String),

    #[error("Column '{0}' cannot be reordered")]
    NotDraggable(String),

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Row has no identity field '{0}'")]
    MissingRowId(String),

    #[error("Row '{0}' is not loaded")]
    RowNotFound(String),

    #[error("No cell is being edited")]
    NoActiveEdit,

    #[error("Operation not supported by this table: {0}")]
    Unsupported(&'static str),

    #[error("A page fetch is already in flight")]
    FetchInFlight,

    #[error("All rows are already loaded")]
    NoMoreRows,

    #[error("Cancelled by user")]
    Cancelled,

    #[error("Invalid column configuration: {0}")]
    Configuration(String),

    #[error("Export failed: {0}")]
    Export(String),

    #[error(transparent)]
    Remote(#[from] CoreError),
}
