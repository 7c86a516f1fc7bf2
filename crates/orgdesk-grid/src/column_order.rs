//! Dynamic column reordering
//!
//! Only dynamic columns move. Everything else stays at its global index and
//! the reordered dynamic sub-sequence is written back into the slots the
//! dynamic columns occupied.

use orgdesk_core::ColumnDescriptor;

use crate::error::{GridError, GridResult};

/// Ids of the dynamic columns in their current display order
pub fn dynamic_ids(columns: &[ColumnDescriptor]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| c.dynamic)
        .map(|c| c.id.clone())
        .collect()
}

/// Move a dynamic column from one position of the dynamic sub-sequence to another
///
/// Positions refer to the current display order, so repeated moves compose.
pub fn move_dynamic(
    columns: &[ColumnDescriptor],
    from: usize,
    to: usize,
) -> GridResult<Vec<ColumnDescriptor>> {
    let mut dynamic: Vec<ColumnDescriptor> =
        columns.iter().filter(|c| c.dynamic).cloned().collect();
    if from >= dynamic.len() || to >= dynamic.len() {
        return Err(GridError::NotDraggable(format!(
            "dynamic column position {} -> {} out of range (0..{})",
            from,
            to,
            dynamic.len()
        )));
    }

    let moved = dynamic.remove(from);
    dynamic.insert(to, moved);
    Ok(splice_dynamic(columns, dynamic))
}

/// Move column `column_id` to where `target_id` currently sits
pub fn move_column_to(
    columns: &[ColumnDescriptor],
    column_id: &str,
    target_id: &str,
) -> GridResult<Vec<ColumnDescriptor>> {
    let ids = dynamic_ids(columns);
    let position_of = |id: &str| -> GridResult<usize> {
        if let Some(pos) = ids.iter().position(|d| d == id) {
            return Ok(pos);
        }
        if columns.iter().any(|c| c.id == id) {
            Err(GridError::NotDraggable(id.to_string()))
        } else {
            Err(GridError::UnknownColumn(id.to_string()))
        }
    };

    let from = position_of(column_id)?;
    let to = position_of(target_id)?;
    move_dynamic(columns, from, to)
}

/// Write a reordered dynamic sub-sequence back into the dynamic slots
fn splice_dynamic(
    columns: &[ColumnDescriptor],
    reordered: Vec<ColumnDescriptor>,
) -> Vec<ColumnDescriptor> {
    let mut reordered = reordered.into_iter();
    columns
        .iter()
        .map(|column| {
            if column.dynamic {
                reordered.next().unwrap_or_else(|| column.clone())
            } else {
                column.clone()
            }
        })
        .collect()
}
