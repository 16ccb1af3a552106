//! Key-relationship extraction.
//!
//! Composes [`CatalogInspector`] output into a per-table report of primary
//! keys and outgoing foreign-key edges. Idempotent and side-effect-free.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{CatalogInspector, CatalogResult};

/// One outgoing foreign-key edge. Field names are the wire contract.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KeyRelation {
    pub column: Vec<String>,
    pub references_table: String,
    pub references_column: Vec<String>,
}

/// Primary keys and outgoing foreign keys of one table.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableKeys {
    pub primary_keys: Vec<String>,
    pub foreign_keys: Vec<KeyRelation>,
}

/// Mapping from table name to its key structure, ordered by table name.
pub type KeyRelationReport = BTreeMap<String, TableKeys>;

/// Build the key-relation report for every table currently in the catalog.
///
/// Dangling foreign-key declarations are reported as-is; no cross-table
/// validation happens here.
pub fn key_relation_report(catalog: &dyn CatalogInspector) -> CatalogResult<KeyRelationReport> {
    let mut report = KeyRelationReport::new();

    for table in catalog.table_names()? {
        let primary_keys = catalog.primary_keys(&table)?;
        let foreign_keys = catalog
            .foreign_keys(&table)?
            .into_iter()
            .map(|fk| KeyRelation {
                column: fk.columns,
                references_table: fk.referenced_table,
                references_column: fk.referenced_columns,
            })
            .collect();

        report.insert(
            table,
            TableKeys {
                primary_keys,
                foreign_keys,
            },
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogError, ForeignKeyInfo};

    /// Minimal in-memory catalog for exercising the extractor without a
    /// database.
    struct FakeCatalog {
        tables: Vec<(String, Vec<String>, Vec<ForeignKeyInfo>)>,
    }

    impl CatalogInspector for FakeCatalog {
        fn table_names(&self) -> Result<Vec<String>, CatalogError> {
            Ok(self.tables.iter().map(|(n, _, _)| n.clone()).collect())
        }

        fn table_columns(&self, _table: &str) -> Result<Vec<String>, CatalogError> {
            Ok(Vec::new())
        }

        fn primary_keys(&self, table: &str) -> Result<Vec<String>, CatalogError> {
            Ok(self
                .tables
                .iter()
                .find(|(n, _, _)| n == table)
                .map(|(_, pk, _)| pk.clone())
                .unwrap_or_default())
        }

        fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, CatalogError> {
            Ok(self
                .tables
                .iter()
                .find(|(n, _, _)| n == table)
                .map(|(_, _, fks)| fks.clone())
                .unwrap_or_default())
        }
    }

    #[test]
    fn test_report_shape() {
        let catalog = FakeCatalog {
            tables: vec![
                ("a".into(), vec!["id".into()], vec![]),
                (
                    "b".into(),
                    vec!["id".into()],
                    vec![ForeignKeyInfo {
                        columns: vec!["a_id".into()],
                        referenced_table: "a".into(),
                        referenced_columns: vec!["id".into()],
                    }],
                ),
            ],
        };

        let report = key_relation_report(&catalog).unwrap();
        assert_eq!(report.len(), 2);

        let a = &report["a"];
        assert_eq!(a.primary_keys, vec!["id"]);
        assert!(a.foreign_keys.is_empty());

        let b = &report["b"];
        assert_eq!(b.primary_keys, vec!["id"]);
        assert_eq!(
            b.foreign_keys,
            vec![KeyRelation {
                column: vec!["a_id".into()],
                references_table: "a".into(),
                references_column: vec!["id".into()],
            }]
        );
    }

    #[test]
    fn test_wire_field_names() {
        let catalog = FakeCatalog {
            tables: vec![(
                "b".into(),
                vec!["id".into()],
                vec![ForeignKeyInfo {
                    columns: vec!["a_id".into()],
                    referenced_table: "a".into(),
                    referenced_columns: vec!["id".into()],
                }],
            )],
        };

        let report = key_relation_report(&catalog).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        let fk = &json["b"]["foreign_keys"][0];
        assert_eq!(fk["column"][0], "a_id");
        assert_eq!(fk["references_table"], "a");
        assert_eq!(fk["references_column"][0], "id");
    }

    #[test]
    fn test_dangling_foreign_key_reported_as_is() {
        let catalog = FakeCatalog {
            tables: vec![(
                "b".into(),
                vec!["id".into()],
                vec![ForeignKeyInfo {
                    columns: vec!["ghost_id".into()],
                    referenced_table: "ghost".into(),
                    referenced_columns: vec!["id".into()],
                }],
            )],
        };

        let report = key_relation_report(&catalog).unwrap();
        assert_eq!(report["b"].foreign_keys[0].references_table, "ghost");
    }
}
