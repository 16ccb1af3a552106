//! Key-relationship extraction over the real fixed schema.

use datalens::catalog::{key_relation_report, SqliteCatalog};
use datalens::store::Store;

fn temp_store() -> (tempfile::TempDir, Store) {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path().join("test.db")).unwrap();
    (dir, store)
}

#[test]
fn report_covers_every_table() {
    let (_dir, store) = temp_store();
    let conn = store.connect().unwrap();

    let report = key_relation_report(&SqliteCatalog::new(&conn)).unwrap();

    for table in [
        "customer",
        "product",
        "product_category",
        "retailer",
        "sales",
        "orders",
        "self_position",
    ] {
        assert!(report.contains_key(table), "missing table {}", table);
    }
}

#[test]
fn sales_edges_point_at_their_dimensions() {
    let (_dir, store) = temp_store();
    let conn = store.connect().unwrap();

    let report = key_relation_report(&SqliteCatalog::new(&conn)).unwrap();

    let sales = &report["sales"];
    assert_eq!(sales.primary_keys, vec!["sales_id"]);
    assert_eq!(sales.foreign_keys.len(), 3);

    let mut targets: Vec<&str> = sales
        .foreign_keys
        .iter()
        .map(|fk| fk.references_table.as_str())
        .collect();
    targets.sort();
    assert_eq!(targets, vec!["customer", "product", "retailer"]);

    let customer_edge = sales
        .foreign_keys
        .iter()
        .find(|fk| fk.references_table == "customer")
        .unwrap();
    assert_eq!(customer_edge.column, vec!["customer_id"]);
    assert_eq!(customer_edge.references_column, vec!["customer_id"]);
}

#[test]
fn dimension_tables_have_no_outgoing_edges() {
    let (_dir, store) = temp_store();
    let conn = store.connect().unwrap();

    let report = key_relation_report(&SqliteCatalog::new(&conn)).unwrap();

    assert!(report["customer"].foreign_keys.is_empty());
    assert!(report["retailer"].foreign_keys.is_empty());
    assert!(report["product_category"].foreign_keys.is_empty());

    let product = &report["product"];
    assert_eq!(product.foreign_keys.len(), 1);
    assert_eq!(product.foreign_keys[0].references_table, "product_category");
}

#[test]
fn wire_shape_matches_the_contract() {
    let (_dir, store) = temp_store();
    let conn = store.connect().unwrap();

    let report = key_relation_report(&SqliteCatalog::new(&conn)).unwrap();
    let json = serde_json::to_value(&report).unwrap();

    let orders = &json["orders"];
    assert!(orders["primary_keys"].is_array());
    let fk = &orders["foreign_keys"][0];
    assert!(fk["column"].is_array());
    assert!(fk["references_table"].is_string());
    assert!(fk["references_column"].is_array());
}

#[test]
fn extraction_is_idempotent() {
    let (_dir, store) = temp_store();
    let conn = store.connect().unwrap();
    let catalog = SqliteCatalog::new(&conn);

    let first = key_relation_report(&catalog).unwrap();
    let second = key_relation_report(&catalog).unwrap();
    assert_eq!(first, second);
}
