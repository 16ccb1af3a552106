//! Live-catalog introspection.
//!
//! [`CatalogInspector`] abstracts over the schema metadata of the active
//! database: table names, column lists, primary keys, and foreign-key
//! constraints. The production implementation, [`SqliteCatalog`], reads
//! `sqlite_master` and the `table_info` / `foreign_key_list` pragmas; tests
//! substitute a fake. Everything here is a pure read of schema metadata —
//! no data rows are touched.

mod relations;

pub use relations::{key_relation_report, KeyRelation, KeyRelationReport, TableKeys};

use rusqlite::Connection;

/// Errors that can occur during catalog introspection.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// A foreign-key constraint as declared in the catalog.
///
/// `columns` and `referenced_columns` are aligned sequences; multi-column
/// constraints keep their declared column order. No cross-table validation
/// is performed — a dangling declaration is reported as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyInfo {
    pub columns: Vec<String>,
    pub referenced_table: String,
    pub referenced_columns: Vec<String>,
}

/// Read access to the live schema catalog.
pub trait CatalogInspector {
    /// Names of all user tables, sorted.
    fn table_names(&self) -> CatalogResult<Vec<String>>;

    /// Column names of a table, in declared order. Empty for unknown tables.
    fn table_columns(&self, table: &str) -> CatalogResult<Vec<String>>;

    /// Primary-key column names of a table, in declared key order.
    fn primary_keys(&self, table: &str) -> CatalogResult<Vec<String>>;

    /// Foreign-key constraints of a table.
    fn foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>>;
}

/// [`CatalogInspector`] over a live SQLite connection.
pub struct SqliteCatalog<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteCatalog<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl CatalogInspector for SqliteCatalog<'_> {
    fn table_names(&self) -> CatalogResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    fn table_columns(&self, table: &str) -> CatalogResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map([table], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(columns)
    }

    fn primary_keys(&self, table: &str) -> CatalogResult<Vec<String>> {
        // pk is the 1-based position of the column within the primary key,
        // 0 for non-key columns.
        let mut stmt = self.conn.prepare(
            "SELECT name FROM pragma_table_info(?1) WHERE pk > 0 ORDER BY pk",
        )?;
        let keys = stmt
            .query_map([table], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn foreign_keys(&self, table: &str) -> CatalogResult<Vec<ForeignKeyInfo>> {
        // One row per (constraint id, column seq); rows of one constraint
        // share an id and are ordered by seq. The referenced column ("to")
        // is NULL when the constraint targets the referenced table's
        // implicit primary key.
        let mut stmt = self.conn.prepare(
            "SELECT id, \"table\", \"from\", \"to\" FROM pragma_foreign_key_list(?1)
             ORDER BY id, seq",
        )?;
        let rows = stmt
            .query_map([table], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut constraints: Vec<(i64, ForeignKeyInfo)> = Vec::new();
        for (id, referenced_table, from, to) in rows {
            let referenced_column = match to {
                Some(column) => column,
                // Resolve an implicit-PK reference to the actual key column.
                None => {
                    let pk = self.primary_keys(&referenced_table)?;
                    let seq = constraints
                        .last()
                        .filter(|(last_id, _)| *last_id == id)
                        .map(|(_, info)| info.columns.len())
                        .unwrap_or(0);
                    pk.get(seq).cloned().unwrap_or_default()
                }
            };

            match constraints.last_mut() {
                Some((last_id, info)) if *last_id == id => {
                    info.columns.push(from);
                    info.referenced_columns.push(referenced_column);
                }
                _ => constraints.push((
                    id,
                    ForeignKeyInfo {
                        columns: vec![from],
                        referenced_table,
                        referenced_columns: vec![referenced_column],
                    },
                )),
            }
        }

        Ok(constraints.into_iter().map(|(_, info)| info).collect())
    }
}
