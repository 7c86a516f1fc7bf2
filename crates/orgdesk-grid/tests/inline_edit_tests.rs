//! Inline editing against a mock backend

mod common;

use std::sync::Arc;

use common::*;
use orgdesk_core::{BackendCapabilities, ColumnDecl, FieldType, Row, RowId};
use orgdesk_grid::{ColumnModel, DataGrid, EditSession, GridError, GridEvent, ValidationError};
use orgdesk_settings::GridSettings;
use pretty_assertions::assert_eq;
use serde_json::json;

async fn loaded_grid(
    backend: Arc<MockBackend>,
) -> (
    orgdesk_grid::DataGrid,
    tokio::sync::mpsc::UnboundedReceiver<GridEvent>,
) {
    let (grid, mut rx) = grid_with(GridSettings::default(), backend);
    grid.refresh().await.unwrap();
    drain_events(&mut rx);
    (grid, rx)
}

#[tokio::test]
async fn test_commit_sends_normalized_value() {
    let backend = Arc::new(MockBackend::new().with_rows(children(3)));
    let (grid, mut rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");

    let seed = grid.begin_edit(&id, "age").unwrap();
    assert_eq!(seed, json!("10"));
    grid.set_draft(json!("12")).unwrap();
    grid.commit_edit().await.unwrap();

    assert_eq!(grid.row(&id).unwrap().get("age"), Some(&json!(12)));
    assert!(!grid.edit_session().is_editing());

    let updates = backend.update_log();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].id, id);
    assert_eq!(updates[0].changes.get("age"), Some(&json!(12)));

    let events = drain_events(&mut rx);
    assert!(events.contains(&GridEvent::CellCommitted {
        row_id: id.clone(),
        column_id: "age".to_string(),
        value: json!(12),
    }));
}

#[tokio::test]
async fn test_rejected_commit_rolls_back() {
    let backend = Arc::new(MockBackend::new().with_rows(children(3)));
    let (grid, mut rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");
    backend.set_fail_update(true);
    let gate = backend.hold_next_update();

    grid.begin_edit(&id, "age").unwrap();
    grid.set_draft(json!("20")).unwrap();
    let pending = tokio::spawn({
        let grid = grid.clone();
        async move { grid.commit_edit().await }
    });
    while backend.update_log().is_empty() {
        tokio::task::yield_now().await;
    }

    // The optimistic value shows while the backend is deciding
    assert_eq!(grid.row(&id).unwrap().get("age"), Some(&json!(20)));
    assert!(!grid.edit_session().is_editing());

    gate.send(()).unwrap();
    let err = pending.await.unwrap().unwrap_err();
    assert!(matches!(err, GridError::Remote(_)));

    assert_eq!(grid.row(&id).unwrap().get("age"), Some(&json!(10)));

    let events = drain_events(&mut rx);
    let committed = events
        .iter()
        .position(|e| matches!(e, GridEvent::CellCommitted { value, .. } if value == &json!(20)));
    let failed = events
        .iter()
        .position(|e| matches!(e, GridEvent::CommitFailed { .. }));
    assert!(committed.is_some());
    assert!(failed > committed);
}

#[tokio::test]
async fn test_unchanged_value_skips_backend() {
    let backend = Arc::new(MockBackend::new().with_rows(children(2)));
    let (grid, _rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("2");

    grid.begin_edit(&id, "age").unwrap();
    grid.commit_edit().await.unwrap();

    assert!(backend.update_log().is_empty());
    assert_eq!(grid.edit_session(), EditSession::Viewing);
}

#[tokio::test]
async fn test_invalid_value_returns_to_viewing() {
    let backend = Arc::new(MockBackend::new().with_rows(children(2)));
    let (grid, mut rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");

    grid.begin_edit(&id, "age").unwrap();
    grid.set_draft(json!("ten")).unwrap();
    let err = grid.commit_edit().await.unwrap_err();

    assert!(matches!(
        err,
        GridError::Validation(ValidationError::InvalidNumber(_))
    ));
    assert_eq!(grid.edit_session(), EditSession::Viewing);
    assert!(backend.update_log().is_empty());
    assert_eq!(grid.row(&id).unwrap().get("age"), Some(&json!(10)));

    let events = drain_events(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, GridEvent::ValidationWarning { column_id, .. } if column_id == "age"))
    );
}

#[tokio::test]
async fn test_only_one_cell_edits_at_a_time() {
    let backend = Arc::new(MockBackend::new().with_rows(children(3)));
    let (grid, mut rx) = loaded_grid(backend).await;

    grid.begin_edit(&RowId::new("1"), "firstName").unwrap();
    grid.set_draft(json!("Dana")).unwrap();
    grid.begin_edit(&RowId::new("2"), "age").unwrap();

    let active = grid.edit_session().active().cloned().unwrap();
    assert_eq!(active.cell.row_id, RowId::new("2"));
    assert_eq!(active.column_id, "age");
    // The abandoned draft was not committed
    assert_eq!(
        grid.row(&RowId::new("1")).unwrap().get("firstName"),
        Some(&json!("Child 1"))
    );

    let events = drain_events(&mut rx);
    assert!(events.contains(&GridEvent::EditCancelled {
        row_id: RowId::new("1"),
        column_id: "firstName".to_string(),
    }));
}

#[tokio::test]
async fn test_begin_edit_on_same_cell_keeps_draft() {
    let backend = Arc::new(MockBackend::new().with_rows(children(1)));
    let (grid, _rx) = loaded_grid(backend).await;
    let id = RowId::new("1");

    grid.begin_edit(&id, "firstName").unwrap();
    grid.set_draft(json!("Noa")).unwrap();
    assert_eq!(grid.begin_edit(&id, "firstName").unwrap(), json!("Noa"));
}

#[tokio::test]
async fn test_nested_edit_sends_merged_parent() {
    let backend = Arc::new(MockBackend::new().with_rows(children(1)));
    let (grid, _rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");

    grid.begin_edit(&id, "dynamicFields_allergies").unwrap();
    grid.set_draft(json!("peanuts")).unwrap();
    grid.commit_edit().await.unwrap();

    let updates = backend.update_log();
    assert_eq!(
        updates[0].changes.get("dynamicFields"),
        Some(&json!({"allergies": "peanuts", "shirtSize": "M", "busRoute": "north"}))
    );
}

#[tokio::test]
async fn test_multi_select_commits_option_values() {
    let backend = Arc::new(MockBackend::new().with_rows(children(1)));
    let (grid, _rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");

    grid.begin_edit(&id, "tags").unwrap();
    grid.set_draft(json!("Art, Music")).unwrap();
    grid.commit_edit().await.unwrap();

    assert_eq!(
        grid.row(&id).unwrap().get("tags"),
        Some(&json!(["art", "music"]))
    );
    assert_eq!(grid.display_text(&id, "tags").unwrap(), "Art, Music");
}

#[tokio::test]
async fn test_cancel_edit_discards_draft() {
    let backend = Arc::new(MockBackend::new().with_rows(children(1)));
    let (grid, _rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");

    grid.begin_edit(&id, "firstName").unwrap();
    grid.set_draft(json!("Other")).unwrap();
    grid.cancel_edit();

    assert!(!grid.edit_session().is_editing());
    assert!(matches!(grid.set_draft(json!("x")), Err(GridError::NoActiveEdit)));
    assert!(matches!(grid.commit_edit().await, Err(GridError::NoActiveEdit)));
    assert!(backend.update_log().is_empty());
}

#[tokio::test]
async fn test_checkbox_toggles_without_edit_state() {
    let backend = Arc::new(MockBackend::new().with_rows(children(1)));
    let (grid, _rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");

    grid.click_cell(&id, "active").await.unwrap();

    assert!(!grid.edit_session().is_editing());
    assert_eq!(grid.row(&id).unwrap().get("active"), Some(&json!(true)));
    assert_eq!(backend.update_log()[0].changes.get("active"), Some(&json!(true)));
    assert!(matches!(
        grid.begin_edit(&id, "active"),
        Err(GridError::Unsupported(_))
    ));
}

#[tokio::test]
async fn test_checkbox_override_survives_stale_refetch() {
    let backend = Arc::new(MockBackend::new().with_rows(children(1)));
    let (grid, _rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");
    backend.set_apply_updates(false);

    assert!(grid.toggle_checkbox(&id, "active").await.unwrap());

    // Server still reports the old value
    grid.refresh().await.unwrap();
    assert_eq!(grid.row(&id).unwrap().get("active"), Some(&json!(true)));

    // Server catches up, which clears the override
    backend.set_server_field("1", "active", json!(true));
    grid.refresh().await.unwrap();
    assert_eq!(grid.row(&id).unwrap().get("active"), Some(&json!(true)));

    backend.set_server_field("1", "active", json!(false));
    grid.refresh().await.unwrap();
    assert_eq!(grid.row(&id).unwrap().get("active"), Some(&json!(false)));
}

#[tokio::test]
async fn test_rejected_checkbox_restores_value() {
    let backend = Arc::new(MockBackend::new().with_rows(children(1)));
    let (grid, mut rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");
    backend.set_fail_update(true);

    assert!(grid.toggle_checkbox(&id, "active").await.is_err());
    assert_eq!(grid.row(&id).unwrap().get("active"), Some(&json!(false)));

    grid.refresh().await.unwrap();
    assert_eq!(grid.row(&id).unwrap().get("active"), Some(&json!(false)));

    let events = drain_events(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, GridEvent::CommitFailed { column_id, .. } if column_id == "active"))
    );
}

#[tokio::test]
async fn test_read_only_column_refuses_edit() {
    let backend = Arc::new(MockBackend::new().with_rows(children(1)));
    let (grid, _rx) = loaded_grid(backend).await;

    assert!(!grid.can_edit("_id"));
    assert!(matches!(
        grid.begin_edit(&RowId::new("1"), "_id"),
        Err(GridError::NotEditable(_))
    ));
    assert!(matches!(
        grid.begin_edit(&RowId::new("1"), "missing"),
        Err(GridError::UnknownColumn(_))
    ));
}

#[tokio::test]
async fn test_backend_without_update_is_read_only() {
    let backend = Arc::new(
        MockBackend::new()
            .with_rows(children(1))
            .with_capabilities(BackendCapabilities::read_only()),
    );
    let (grid, _rx) = loaded_grid(backend.clone()).await;
    let id = RowId::new("1");

    assert!(!grid.can_edit("firstName"));
    assert!(matches!(
        grid.begin_edit(&id, "firstName"),
        Err(GridError::Unsupported("update_row"))
    ));
    assert!(grid.toggle_checkbox(&id, "active").await.is_err());
    assert!(backend.update_log().is_empty());
}

fn enrollment_columns() -> ColumnModel {
    ColumnModel::builder()
        .base([
            ColumnDecl::new("amount").with_type(FieldType::Money),
            ColumnDecl::new("born").with_type(FieldType::Date),
            ColumnDecl::new("idNumber"),
        ])
        .build()
        .unwrap()
}

async fn enrollment_grid(
    backend: Arc<MockBackend>,
) -> (DataGrid, tokio::sync::mpsc::UnboundedReceiver<GridEvent>) {
    let (grid, mut rx) = DataGrid::new(GridSettings::default(), enrollment_columns(), backend);
    grid.refresh().await.unwrap();
    drain_events(&mut rx);
    (grid, rx)
}

fn enrollment() -> Row {
    Row::new()
        .with("_id", "1")
        .with("amount", 12.5)
        .with("born", "2024-03-05T08:30:00.000Z")
        .with("idNumber", "000000018")
}

#[tokio::test]
async fn test_untouched_money_and_date_commit_nothing() {
    let backend = Arc::new(MockBackend::new().with_rows(vec![enrollment()]));
    let (grid, _rx) = enrollment_grid(backend.clone()).await;
    let id = RowId::new("1");

    grid.begin_edit(&id, "amount").unwrap();
    grid.commit_edit().await.unwrap();

    let seed = grid.begin_edit(&id, "born").unwrap();
    assert_eq!(seed, json!("05/03/2024"));
    grid.commit_edit().await.unwrap();

    assert!(backend.update_log().is_empty());
    let row = grid.row(&id).unwrap();
    assert_eq!(row.get("amount"), Some(&json!(12.5)));
    assert_eq!(row.get("born"), Some(&json!("2024-03-05T08:30:00.000Z")));
}

#[tokio::test]
async fn test_retyped_money_value_commits_nothing() {
    let backend = Arc::new(MockBackend::new().with_rows(vec![enrollment()]));
    let (grid, _rx) = enrollment_grid(backend.clone()).await;
    let id = RowId::new("1");

    let seed = grid.begin_edit(&id, "amount").unwrap();
    grid.set_draft(json!(format!(" {} ", seed.as_str().unwrap()))).unwrap();
    grid.commit_edit().await.unwrap();

    assert!(backend.update_log().is_empty());
    assert_eq!(grid.row(&id).unwrap().get("amount"), Some(&json!(12.5)));
}

#[tokio::test]
async fn test_invalid_id_number_cancels_edit() {
    let backend = Arc::new(MockBackend::new().with_rows(vec![enrollment()]));
    let (grid, mut rx) = enrollment_grid(backend.clone()).await;
    let id = RowId::new("1");

    grid.begin_edit(&id, "idNumber").unwrap();
    grid.set_draft(json!("123456789")).unwrap();
    let err = grid.commit_edit().await.unwrap_err();

    assert!(matches!(
        err,
        GridError::Validation(ValidationError::InvalidIdNumber(_))
    ));
    assert_eq!(grid.edit_session(), EditSession::Viewing);
    assert!(matches!(grid.set_draft(json!("1")), Err(GridError::NoActiveEdit)));
    assert!(backend.update_log().is_empty());
    assert_eq!(grid.row(&id).unwrap().get("idNumber"), Some(&json!("000000018")));

    let events = drain_events(&mut rx);
    assert!(events.iter().any(
        |e| matches!(e, GridEvent::ValidationWarning { column_id, .. } if column_id == "idNumber")
    ));
    assert!(events.contains(&GridEvent::EditCancelled {
        row_id: id,
        column_id: "idNumber".to_string(),
    }));
}

#[tokio::test]
async fn test_override_for_row_gone_from_refetch_is_dropped() {
    let backend = Arc::new(MockBackend::new().with_rows(children(2)));
    let (grid, _rx) = loaded_grid(backend.clone()).await;
    backend.set_apply_updates(false);

    assert!(grid.toggle_checkbox(&RowId::new("2"), "active").await.unwrap());

    // Row 2 leaves the result set, then comes back unchanged on the server
    let mut filters = std::collections::BTreeMap::new();
    filters.insert("firstName".to_string(), json!("Child 1"));
    grid.set_extra_filters(filters).await.unwrap();
    assert!(grid.row(&RowId::new("2")).is_none());

    grid.set_extra_filters(Default::default()).await.unwrap();
    assert_eq!(
        grid.row(&RowId::new("2")).unwrap().get("active"),
        Some(&json!(false))
    );
}
