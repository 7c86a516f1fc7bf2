//! Paging, lazy loading and fetch ordering

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::*;
use orgdesk_core::SortOrder;
use orgdesk_grid::{GridError, GridEvent};
use orgdesk_settings::GridSettings;
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn test_paged_navigation() {
    let backend = Arc::new(MockBackend::new().with_rows(children(30)));
    let (grid, _rx) = grid_with(GridSettings::default().with_page_size(10), backend.clone());

    grid.refresh().await.unwrap();
    assert_eq!(grid.loaded_count(), 10);
    assert_eq!(grid.total_count(), 30);
    assert_eq!(grid.page_count(), 3);
    assert!(grid.has_more());

    grid.next_page().await.unwrap();
    assert_eq!(grid.page_index(), 1);
    assert_eq!(backend.last_query().unwrap().page, 2);
    assert_eq!(grid.rows()[0].get("_id"), Some(&json!("11")));

    grid.set_page(99).await.unwrap();
    assert_eq!(grid.page_index(), 2);
    assert!(!grid.has_more());

    // Already on the last page
    let before = backend.fetch_count();
    grid.next_page().await.unwrap();
    assert_eq!(backend.fetch_count(), before);

    grid.prev_page().await.unwrap();
    assert_eq!(grid.page_index(), 1);
}

#[tokio::test]
async fn test_paged_mode_replaces_rows() {
    let backend = Arc::new(MockBackend::new().with_rows(children(15)));
    let (grid, mut rx) = grid_with(GridSettings::default().with_page_size(10), backend);

    grid.refresh().await.unwrap();
    grid.next_page().await.unwrap();
    assert_eq!(grid.loaded_count(), 5);

    let events = drain_events(&mut rx);
    assert!(events.contains(&GridEvent::RowsLoaded {
        page: 2,
        rows: 5,
        total_count: 15,
        appended: false,
    }));
}

#[tokio::test]
async fn test_lazy_loading_appends_until_exhausted() {
    let backend = Arc::new(MockBackend::new().with_rows(children(25)));
    let (grid, _rx) = grid_with(GridSettings::lazy().with_page_size(10), backend.clone());

    grid.refresh().await.unwrap();
    assert_eq!(grid.loaded_count(), 10);
    assert!(grid.has_more());

    grid.load_more().await.unwrap();
    assert_eq!(grid.loaded_count(), 20);
    assert!(grid.has_more());

    grid.load_more().await.unwrap();
    assert_eq!(grid.loaded_count(), 25);
    assert!(!grid.has_more());

    assert!(matches!(grid.load_more().await, Err(GridError::NoMoreRows)));

    let pages: Vec<usize> = backend.fetch_log().iter().map(|q| q.page).collect();
    assert_eq!(pages, vec![1, 2, 3]);
    assert_eq!(grid.rows()[24].get("_id"), Some(&json!("25")));
}

#[tokio::test]
async fn test_load_more_refused_in_paged_mode() {
    let backend = Arc::new(MockBackend::new().with_rows(children(25)));
    let (grid, _rx) = grid_with(GridSettings::default(), backend);

    assert!(matches!(
        grid.load_more().await,
        Err(GridError::Unsupported(_))
    ));
}

#[tokio::test]
async fn test_scroll_near_bottom_loads_more() {
    let backend = Arc::new(MockBackend::new().with_rows(children(25)));
    let (grid, _rx) = grid_with(GridSettings::lazy().with_page_size(10), backend);
    grid.refresh().await.unwrap();

    assert!(!grid.on_scroll(0.0, 400.0, 2000.0).await.unwrap());
    assert_eq!(grid.loaded_count(), 10);

    assert!(grid.on_scroll(1500.0, 400.0, 2000.0).await.unwrap());
    assert_eq!(grid.loaded_count(), 20);
}

#[tokio::test]
async fn test_load_more_refused_while_in_flight() {
    let backend = Arc::new(MockBackend::new().with_rows(children(25)));
    let (grid, _rx) = grid_with(GridSettings::lazy().with_page_size(10), backend.clone());
    grid.refresh().await.unwrap();

    let gate = backend.hold_next_fetch();
    let pending = tokio::spawn({
        let grid = grid.clone();
        async move { grid.load_more().await }
    });
    while backend.fetch_count() < 2 {
        tokio::task::yield_now().await;
    }

    assert!(grid.is_loading());
    assert!(matches!(grid.load_more().await, Err(GridError::FetchInFlight)));
    assert!(!grid.on_scroll(1500.0, 400.0, 2000.0).await.unwrap());

    gate.send(()).unwrap();
    pending.await.unwrap().unwrap();
    assert!(!grid.is_loading());
    assert_eq!(grid.loaded_count(), 20);
    assert_eq!(backend.fetch_count(), 2);
}

#[tokio::test]
async fn test_superseded_response_is_discarded() {
    let backend = Arc::new(MockBackend::new().with_rows(children(25)));
    let (grid, _rx) = grid_with(GridSettings::lazy().with_page_size(10), backend.clone());

    let gate = backend.hold_next_fetch();
    let stale = tokio::spawn({
        let grid = grid.clone();
        async move { grid.refresh().await }
    });
    while backend.fetch_count() < 1 {
        tokio::task::yield_now().await;
    }

    let mut filters = BTreeMap::new();
    filters.insert("firstName".to_string(), json!("Child 3"));
    grid.set_extra_filters(filters).await.unwrap();
    assert_eq!(grid.loaded_count(), 1);

    gate.send(()).unwrap();
    stale.await.unwrap().unwrap();

    assert_eq!(grid.loaded_count(), 1);
    assert_eq!(grid.total_count(), 1);
    assert_eq!(grid.rows()[0].get("firstName"), Some(&json!("Child 3")));
}

#[tokio::test]
async fn test_fetch_failure_keeps_rows() {
    let backend = Arc::new(MockBackend::new().with_rows(children(5)));
    let (grid, mut rx) = grid_with(GridSettings::default(), backend.clone());
    grid.refresh().await.unwrap();
    drain_events(&mut rx);

    backend.set_fail_fetch(true);
    assert!(matches!(grid.refresh().await, Err(GridError::Remote(_))));
    assert_eq!(grid.loaded_count(), 5);
    assert!(!grid.is_loading());

    let events = drain_events(&mut rx);
    assert!(matches!(events.as_slice(), [GridEvent::FetchFailed { .. }]));
}

#[tokio::test]
async fn test_sort_cycles_and_resets_page() {
    let backend = Arc::new(MockBackend::new().with_rows(children(30)));
    let (grid, _rx) = grid_with(GridSettings::default().with_page_size(10), backend.clone());
    grid.refresh().await.unwrap();
    grid.next_page().await.unwrap();

    grid.toggle_sort("dynamicFields_busRoute").await.unwrap();
    let query = backend.last_query().unwrap();
    assert_eq!(query.page, 1);
    assert_eq!(query.sort_by.as_deref(), Some("dynamicFields.busRoute"));
    assert_eq!(query.sort_order, Some(SortOrder::Asc));
    assert_eq!(grid.page_index(), 0);

    grid.toggle_sort("dynamicFields_busRoute").await.unwrap();
    assert_eq!(backend.last_query().unwrap().sort_order, Some(SortOrder::Desc));

    grid.toggle_sort("dynamicFields_busRoute").await.unwrap();
    let query = backend.last_query().unwrap();
    assert_eq!(query.sort_by, None);
    assert_eq!(query.sort_order, None);

    assert!(matches!(
        grid.toggle_sort("select").await,
        Err(GridError::Unsupported(_))
    ));
}

#[tokio::test]
async fn test_page_size_change_refetches_first_page() {
    let backend = Arc::new(MockBackend::new().with_rows(children(30)));
    let (grid, _rx) = grid_with(GridSettings::default().with_page_size(10), backend.clone());
    grid.refresh().await.unwrap();

    grid.set_page_size(25).await.unwrap();
    let query = backend.last_query().unwrap();
    assert_eq!((query.page, query.limit), (1, 25));
    assert_eq!(grid.page_count(), 2);

    assert!(matches!(
        grid.set_page_size(0).await,
        Err(GridError::Configuration(_))
    ));
}
