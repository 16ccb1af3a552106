//! Static registry of the persisted tables.
//!
//! The registry is the single source of truth for the fixed schema: it
//! drives DDL generation on startup, the known-table check at the ingestion
//! boundary, and the per-column coercion rules. Extending the service with a
//! new table means adding one `TableDef` here; no call site changes.

/// Storage class and coercion rule for a column.
///
/// `Identifier` columns are always stored as opaque strings, even when the
/// input is numeric, so leading zeros and non-numeric identifiers survive.
/// `Timestamp` columns are parsed to a canonical textual timestamp, or NULL
/// when the input does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Identifier,
    Text,
    Integer,
    Real,
    Timestamp,
}

impl ColumnKind {
    /// SQL type name used in DDL.
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Identifier | ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Timestamp => "TIMESTAMP",
        }
    }
}

/// A declared column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub not_null: bool,
}

/// A declared foreign-key constraint (single-column; that is all the fixed
/// schema uses).
#[derive(Debug, Clone, Copy)]
pub struct ForeignKeyDef {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
}

/// A declared table.
#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [ColumnDef],
    pub foreign_keys: &'static [ForeignKeyDef],
}

impl TableDef {
    /// Look up a column by its (already normalized) name.
    pub fn column(&self, name: &str) -> Option<&'static ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Render the `CREATE TABLE IF NOT EXISTS` statement for this table.
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|col| {
                let mut s = format!("{} {}", col.name, col.kind.sql_type());
                if col.name == self.primary_key {
                    s.push_str(" PRIMARY KEY");
                } else if col.not_null {
                    s.push_str(" NOT NULL");
                }
                s
            })
            .collect();

        for fk in self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                fk.column, fk.references_table, fk.references_column
            ));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
            self.name,
            parts.join(",\n    ")
        )
    }
}

const fn col(name: &'static str, kind: ColumnKind, not_null: bool) -> ColumnDef {
    ColumnDef {
        name,
        kind,
        not_null,
    }
}

const fn fk(
    column: &'static str,
    references_table: &'static str,
    references_column: &'static str,
) -> ForeignKeyDef {
    ForeignKeyDef {
        column,
        references_table,
        references_column,
    }
}

use ColumnKind::{Identifier, Integer, Real, Text, Timestamp};

const CUSTOMER: TableDef = TableDef {
    name: "customer",
    primary_key: "customer_id",
    columns: &[
        col("customer_id", Identifier, true),
        col("name", Text, true),
        col("email", Text, false),
        col("phone", Identifier, false),
        col("address", Text, false),
        col("created_at", Timestamp, false),
    ],
    foreign_keys: &[],
};

const PRODUCT_CATEGORY: TableDef = TableDef {
    name: "product_category",
    primary_key: "category_id",
    columns: &[
        col("category_id", Identifier, true),
        col("category_name", Text, true),
    ],
    foreign_keys: &[],
};

const PRODUCT: TableDef = TableDef {
    name: "product",
    primary_key: "product_id",
    columns: &[
        col("product_id", Identifier, true),
        col("name", Text, true),
        col("category_id", Identifier, false),
        col("price", Real, true),
        col("stock_quantity", Integer, true),
    ],
    foreign_keys: &[fk("category_id", "product_category", "category_id")],
};

const RETAILER: TableDef = TableDef {
    name: "retailer",
    primary_key: "retailer_id",
    columns: &[
        col("retailer_id", Identifier, true),
        col("name", Text, true),
        col("location", Text, false),
    ],
    foreign_keys: &[],
};

const SALES: TableDef = TableDef {
    name: "sales",
    primary_key: "sales_id",
    columns: &[
        col("sales_id", Identifier, true),
        col("customer_id", Identifier, false),
        col("product_id", Identifier, false),
        col("retailer_id", Identifier, false),
        col("quantity", Integer, true),
        col("total_price", Real, true),
        col("sales_date", Timestamp, false),
    ],
    foreign_keys: &[
        fk("customer_id", "customer", "customer_id"),
        fk("product_id", "product", "product_id"),
        fk("retailer_id", "retailer", "retailer_id"),
    ],
};

const ORDERS: TableDef = TableDef {
    name: "orders",
    primary_key: "order_id",
    columns: &[
        col("order_id", Identifier, true),
        col("customer_id", Identifier, false),
        col("product_id", Identifier, false),
        col("retailer_id", Identifier, false),
        col("order_date", Timestamp, false),
        col("status", Text, true),
    ],
    foreign_keys: &[
        fk("customer_id", "customer", "customer_id"),
        fk("product_id", "product", "product_id"),
        fk("retailer_id", "retailer", "retailer_id"),
    ],
};

const SELF_POSITION: TableDef = TableDef {
    name: "self_position",
    primary_key: "position_id",
    columns: &[
        col("position_id", Identifier, true),
        col("product_id", Identifier, false),
        col("shelf_location", Text, true),
        col("height", Real, true),
    ],
    foreign_keys: &[fk("product_id", "product", "product_id")],
};

/// All tables in the fixed schema.
pub const TABLES: &[TableDef] = &[
    CUSTOMER,
    PRODUCT_CATEGORY,
    PRODUCT,
    RETAILER,
    SALES,
    ORDERS,
    SELF_POSITION,
];

/// Look up a table definition by name.
pub fn table_def(name: &str) -> Option<&'static TableDef> {
    TABLES.iter().find(|t| t.name == name)
}

/// All declared table names, in registry order.
pub fn table_names() -> Vec<&'static str> {
    TABLES.iter().map(|t| t.name).collect()
}

/// Render the full schema as one DDL batch.
pub fn schema_ddl() -> String {
    let statements: Vec<String> = TABLES.iter().map(|t| t.create_sql()).collect();
    statements.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_lookup() {
        assert!(table_def("customer").is_some());
        assert!(table_def("sales").is_some());
        assert!(table_def("not_a_table").is_none());
    }

    #[test]
    fn test_identifier_columns_are_textual() {
        let sales = table_def("sales").unwrap();
        let id = sales.column("customer_id").unwrap();
        assert_eq!(id.kind, ColumnKind::Identifier);
        assert_eq!(id.kind.sql_type(), "TEXT");

        // phone is not an id but still coerces to string
        let customer = table_def("customer").unwrap();
        assert_eq!(
            customer.column("phone").unwrap().kind,
            ColumnKind::Identifier
        );
    }

    #[test]
    fn test_create_sql_shape() {
        let sql = table_def("sales").unwrap().create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS sales"));
        assert!(sql.contains("sales_id TEXT PRIMARY KEY"));
        assert!(sql.contains("quantity INTEGER NOT NULL"));
        assert!(sql.contains("FOREIGN KEY (customer_id) REFERENCES customer (customer_id)"));
    }

    #[test]
    fn test_schema_ddl_covers_all_tables() {
        let ddl = schema_ddl();
        for table in TABLES {
            assert!(ddl.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table.name)));
        }
    }
}
