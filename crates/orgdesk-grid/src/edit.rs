//! Cell edit session
//!
//! At most one cell per grid is in edit mode. The session holds the draft
//! the editor widget works on; committing or cancelling drops it back to
//! `Viewing`. The row-level helpers below are the only way an edit touches
//! a row.

use orgdesk_core::{Row, RowId};
use serde_json::Value;

use crate::registry::Normalized;

/// Address of one cell, by row identity and accessor path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row_id: RowId,
    pub accessor_path: String,
}

impl CellRef {
    pub fn new(row_id: RowId, accessor_path: impl Into<String>) -> Self {
        Self {
            row_id,
            accessor_path: accessor_path.into(),
        }
    }
}

/// The cell currently in edit mode
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEdit {
    pub cell: CellRef,
    pub column_id: String,
    /// Current editor value
    pub draft: Value,
    /// Editor value the session was seeded with
    pub seed: Value,
}

impl ActiveEdit {
    /// Whether the draft still holds the seed value
    pub fn is_unchanged(&self) -> bool {
        self.draft == self.seed
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditSession {
    #[default]
    Viewing,
    Editing(ActiveEdit),
}

impl EditSession {
    pub fn is_editing(&self) -> bool {
        matches!(self, Self::Editing(_))
    }

    pub fn active(&self) -> Option<&ActiveEdit> {
        match self {
            Self::Editing(active) => Some(active),
            Self::Viewing => None,
        }
    }

    pub fn is_editing_cell(&self, cell: &CellRef) -> bool {
        self.active().is_some_and(|active| &active.cell == cell)
    }

    /// End the session, returning what was being edited
    pub fn take(&mut self) -> Option<ActiveEdit> {
        match std::mem::take(self) {
            Self::Editing(active) => Some(active),
            Self::Viewing => None,
        }
    }

    /// Replace the draft. Returns false when nothing is being edited.
    pub fn set_draft(&mut self, draft: Value) -> bool {
        match self {
            Self::Editing(active) => {
                active.draft = draft;
                true
            }
            Self::Viewing => false,
        }
    }
}

/// Write a normalized value into a row
///
/// Nested paths merge into the parent object, so siblings under
/// `dynamicFields` survive.
pub fn apply_normalized(row: &mut Row, accessor_path: &str, value: &Normalized) {
    match value {
        Normalized::Set(v) => row.set_path(accessor_path, v.clone()),
        Normalized::Unset => {
            row.remove_path(accessor_path);
        }
    }
}

/// Put back a field value captured before an optimistic change
pub fn restore_field(row: &mut Row, accessor_path: &str, snapshot: Option<Value>) {
    match snapshot {
        Some(value) => row.set_path(accessor_path, value),
        None => {
            row.remove_path(accessor_path);
        }
    }
}

/// Backend payload entry for a changed path
///
/// Updates are sent per top-level field. For a nested path that is the whole
/// merged parent object as it stands in `row`.
pub fn update_entry(row: &Row, accessor_path: &str) -> (String, Value) {
    let top = accessor_path
        .split('.')
        .next()
        .unwrap_or(accessor_path)
        .to_string();
    let value = row.get(&top).cloned().unwrap_or(Value::Null);
    (top, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn row() -> Row {
        Row::try_from(json!({
            "_id": "1",
            "amount": 10,
            "dynamicFields": {"bus": "north", "shirt": "M"}
        }))
        .unwrap()
    }

    #[test]
    fn test_session_take_returns_to_viewing() {
        let mut session = EditSession::Editing(ActiveEdit {
            cell: CellRef::new(RowId::new("1"), "amount"),
            column_id: "amount".into(),
            draft: json!("10"),
            seed: json!("10"),
        });
        assert!(session.active().unwrap().is_unchanged());
        assert!(session.set_draft(json!("20")));
        let active = session.take().unwrap();
        assert!(!active.is_unchanged());
        assert_eq!(active.draft, json!("20"));
        assert_eq!(session, EditSession::Viewing);
        assert!(!session.set_draft(json!("30")));
    }

    #[test]
    fn test_dynamic_update_entry_carries_merged_object() {
        let mut r = row();
        apply_normalized(&mut r, "dynamicFields.bus", &Normalized::Set(json!("south")));
        let (key, value) = update_entry(&r, "dynamicFields.bus");
        assert_eq!(key, "dynamicFields");
        assert_eq!(value, json!({"bus": "south", "shirt": "M"}));
    }

    #[test]
    fn test_unset_removes_field_and_sends_null() {
        let mut r = row();
        apply_normalized(&mut r, "amount", &Normalized::Unset);
        assert_eq!(r.get("amount"), None);
        assert_eq!(update_entry(&r, "amount"), ("amount".to_string(), Value::Null));
    }

    #[test]
    fn test_restore_field_only_touches_path() {
        let mut r = row();
        apply_normalized(&mut r, "dynamicFields.bus", &Normalized::Set(json!("south")));
        r.set_path("dynamicFields.shirt", json!("L"));

        restore_field(&mut r, "dynamicFields.bus", Some(json!("north")));
        assert_eq!(
            r.get("dynamicFields"),
            Some(&json!({"bus": "north", "shirt": "L"}))
        );
    }
}
