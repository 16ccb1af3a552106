//! Data-quality analysis over a real store.

use datalens::ingest;
use datalens::quality;
use datalens::store::Store;
use serde_json::json;

fn temp_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("test.db")).unwrap();
    (dir, store)
}

fn seed_customers(store: &Store) {
    let mut conn = store.connect().unwrap();
    let batch: Vec<ingest::Record> = json!([
        {"customer_id": "c1", "name": "Ada", "email": "ada@example.com"},
        {"customer_id": "c2", "name": "Bob", "email": ""},
        {"customer_id": "c3", "name": "Cyd", "email": "cyd@example.com"}
    ])
    .as_array()
    .unwrap()
    .iter()
    .map(|v| v.as_object().unwrap().clone())
    .collect();
    ingest::ingest(&mut conn, "customer", &batch).unwrap();
}

#[tokio::test]
async fn mixed_batch_does_not_abort_on_unknown_table() {
    let (_dir, store) = temp_store();
    seed_customers(&store);
    let conn = store.connect().unwrap();

    let results = quality::analyze(
        &conn,
        None,
        &["customer".to_string(), "ghosts".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 2);

    let valid = &results[0];
    assert_eq!(valid.table_name, "customer");
    assert_eq!(valid.error, None);
    assert_eq!(valid.total_rows, 3);

    let invalid = &results[1];
    assert_eq!(invalid.table_name, "ghosts");
    assert_eq!(invalid.error.as_deref(), Some("Table not found"));
    assert_eq!(invalid.llm_analysis, None);
}

#[tokio::test]
async fn empty_table_yields_marker_not_division_error() {
    let (_dir, store) = temp_store();
    let conn = store.connect().unwrap();

    let results = quality::analyze(&conn, None, &["sales".to_string()])
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    let metrics = &results[0];
    assert_eq!(metrics.error.as_deref(), Some("Table is empty"));
    assert_eq!(metrics.total_rows, 0);
    assert_eq!(metrics.missing_values, 0);
    assert_eq!(metrics.duplicate_rows, 0);
    assert_eq!(metrics.completeness_percentage, 0.0);
    assert_eq!(metrics.null_values_percentage, 0.0);
    assert_eq!(metrics.uniqueness_percentage, 0.0);
}

#[tokio::test]
async fn metrics_reflect_ingested_rows() {
    let (_dir, store) = temp_store();
    seed_customers(&store);
    let conn = store.connect().unwrap();

    let results = quality::analyze(&conn, None, &["customer".to_string()])
        .await
        .unwrap();
    let metrics = &results[0];

    assert_eq!(metrics.total_rows, 3);
    // 6 columns; phone, address, created_at are NULL everywhere (9 cells)
    // plus one empty email cell.
    assert_eq!(metrics.missing_values, 10);
    assert_eq!(metrics.duplicate_rows, 0);

    let sum = metrics.completeness_percentage + metrics.null_values_percentage;
    assert!((sum - 100.0).abs() < 1e-9);

    let email = &metrics.columns["email"];
    assert_eq!(email.missing_values, 1);
    assert!((email.completeness_percentage - 200.0 / 3.0).abs() < 1e-9);
    assert!((email.uniqueness_percentage - 200.0 / 3.0).abs() < 1e-9);

    let id = &metrics.columns["customer_id"];
    assert_eq!(id.missing_values, 0);
    assert!((id.uniqueness_percentage - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn clean_table_scores_full_completeness() {
    let (_dir, store) = temp_store();
    {
        let mut conn = store.connect().unwrap();
        let batch: Vec<ingest::Record> = json!([
            {"category_id": "cat1", "category_name": "Beverages"},
            {"category_id": "cat2", "category_name": "Produce"}
        ])
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();
        ingest::ingest(&mut conn, "product_category", &batch).unwrap();
    }

    let conn = store.connect().unwrap();
    let results = quality::analyze(&conn, None, &["product_category".to_string()])
        .await
        .unwrap();
    let metrics = &results[0];

    assert_eq!(metrics.completeness_percentage, 100.0);
    assert_eq!(metrics.null_values_percentage, 0.0);
    assert_eq!(metrics.duplicate_rows, 0);
    // Both columns fully distinct: cell-normalized table uniqueness is
    // (2 + 2) / 4 = 100%.
    assert!((metrics.uniqueness_percentage - 100.0).abs() < 1e-9);
}

#[tokio::test]
async fn requested_names_are_trimmed() {
    let (_dir, store) = temp_store();
    seed_customers(&store);
    let conn = store.connect().unwrap();

    let results = quality::analyze(
        &conn,
        None,
        &[" customer ".to_string(), "".to_string()],
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].table_name, "customer");
    assert_eq!(results[0].error, None);
}
