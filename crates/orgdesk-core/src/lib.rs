//! orgdesk core - shared types for the data-grid engine
//!
//! This crate holds everything the grid engine and its hosts agree on:
//!
//! - `Row` / `RowId` - opaque JSON records and their identity
//! - `FieldType`, `ColumnDecl`, `ColumnDescriptor` - the column schema
//! - `GridBackend` - the remote collaborator the grid calls into
//! - `CoreError` - errors raised by collaborators

mod backend;
mod error;
mod field;
mod types;

pub use backend::*;
pub use error::*;
pub use field::*;
pub use types::*;
