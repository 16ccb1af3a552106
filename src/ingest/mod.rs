//! Record ingestion.
//!
//! Accepts a named table and a batch of field→value records, normalizes and
//! coerces them against the table registry, and performs one atomic batch
//! insert. Field names are lower-cased and trimmed before matching; fields
//! not declared in the target schema are silently dropped. Identifier-like
//! columns are stored as strings even for numeric input; timestamp columns
//! parse to a canonical form or degrade to NULL. A constraint violation
//! anywhere in the batch rolls the whole batch back.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::{params_from_iter, types::Value as SqlValue, Connection};
use serde_json::{Map, Value};

use crate::store::schema::{self, ColumnKind, TableDef};

/// A single ingestion record: normalized-or-raw field names mapped to
/// JSON-typed values.
pub type Record = Map<String, Value>;

/// Errors that can occur during ingestion.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The requested table is not part of the fixed schema.
    #[error("invalid table name: {0}")]
    InvalidTable(String),

    /// The CSV payload could not be parsed at all.
    #[error("malformed csv payload: {0}")]
    Csv(#[from] csv::Error),

    /// A row violated a storage constraint; the entire batch is rolled back.
    #[error("batch insert failed: {0}")]
    BatchInsert(#[from] rusqlite::Error),
}

pub type IngestResult<T> = Result<T, IngestError>;

/// Parse a raw CSV payload into ingestion records.
///
/// Every cell arrives as a string; all typing happens in [`ingest`]. Short
/// rows are padded with empty cells (flexible record length).
pub fn records_from_csv(payload: &str) -> IngestResult<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(payload.as_bytes());

    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut record = Record::new();
        for (i, header) in headers.iter().enumerate() {
            let cell = row.get(i).unwrap_or("");
            record.insert(header.to_string(), Value::String(cell.to_string()));
        }
        records.push(record);
    }

    Ok(records)
}

/// Insert a batch of records into `table_name` as one transaction.
///
/// Returns the number of rows inserted. On any storage error the
/// transaction is rolled back and nothing is committed.
pub fn ingest(
    conn: &mut Connection,
    table_name: &str,
    records: &[Record],
) -> IngestResult<usize> {
    let def = schema::table_def(table_name)
        .ok_or_else(|| IngestError::InvalidTable(table_name.to_string()))?;

    let rows: Vec<(Vec<&'static str>, Vec<SqlValue>)> =
        records.iter().map(|r| coerce_record(def, r)).collect();

    let tx = conn.transaction()?;
    let mut inserted = 0;
    for (columns, values) in &rows {
        if columns.is_empty() {
            continue;
        }
        let placeholders: Vec<String> =
            (1..=columns.len()).map(|i| format!("?{}", i)).collect();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            def.name,
            columns.join(", "),
            placeholders.join(", ")
        );
        tx.execute(&sql, params_from_iter(values.iter()))?;
        inserted += 1;
    }
    tx.commit()?;

    Ok(inserted)
}

/// Normalize a record against the table definition: match normalized field
/// names, drop unknown fields, coerce values per the declared column kind.
fn coerce_record(def: &'static TableDef, record: &Record) -> (Vec<&'static str>, Vec<SqlValue>) {
    let mut columns = Vec::new();
    let mut values = Vec::new();

    for (field, value) in record {
        let normalized = normalize_field(field);
        let Some(column) = def.column(&normalized) else {
            continue;
        };
        if columns.contains(&column.name) {
            continue;
        }
        columns.push(column.name);
        values.push(coerce_value(column.kind, value));
    }

    (columns, values)
}

/// Normalize a field name for matching against declared columns.
pub fn normalize_field(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Coerce one JSON value into its storage representation.
///
/// Empty and whitespace-only strings become NULL across all column kinds
/// (CSV empty-cell semantics).
pub fn coerce_value(kind: ColumnKind, value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::String(s) if s.trim().is_empty() => SqlValue::Null,
        _ => match kind {
            ColumnKind::Identifier => coerce_identifier(value),
            ColumnKind::Timestamp => coerce_timestamp(value),
            ColumnKind::Text => match value {
                Value::String(s) => SqlValue::Text(s.clone()),
                other => SqlValue::Text(other.to_string()),
            },
            ColumnKind::Integer | ColumnKind::Real => coerce_numeric(value),
        },
    }
}

/// Identifier and phone columns: keep strings verbatim (leading zeros
/// survive), render numbers as their string form.
fn coerce_identifier(value: &Value) -> SqlValue {
    match value {
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Number(n) => SqlValue::Text(n.to_string()),
        Value::Bool(b) => SqlValue::Text(b.to_string()),
        other => SqlValue::Text(other.to_string()),
    }
}

/// Timestamp columns: parse textual input, canonicalize, NULL on failure.
fn coerce_timestamp(value: &Value) -> SqlValue {
    match value {
        Value::String(s) => match parse_timestamp(s.trim()) {
            Some(canonical) => SqlValue::Text(canonical),
            None => SqlValue::Null,
        },
        _ => SqlValue::Null,
    }
}

/// Numeric columns: integers and floats pass through; numeric text is
/// parsed; anything else is stored as text and left to storage affinity.
fn coerce_numeric(value: &Value) -> SqlValue {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                SqlValue::Integer(i)
            } else {
                SqlValue::Real(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                SqlValue::Integer(i)
            } else if let Ok(f) = trimmed.parse::<f64>() {
                SqlValue::Real(f)
            } else {
                SqlValue::Text(s.clone())
            }
        }
        other => SqlValue::Text(other.to_string()),
    }
}

/// Parse a textual timestamp in any of the accepted layouts and render the
/// canonical `%Y-%m-%dT%H:%M:%S` form. Bare dates map to midnight.
pub fn parse_timestamp(s: &str) -> Option<String> {
    const CANONICAL: &str = "%Y-%m-%dT%H:%M:%S";

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc().format(CANONICAL).to_string());
    }

    const DATETIME_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(dt.format(CANONICAL).to_string());
        }
    }

    const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            let midnight = date.and_hms_opt(0, 0, 0)?;
            return Some(midnight.format(CANONICAL).to_string());
        }
    }

    None
}
