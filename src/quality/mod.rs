//! Per-table data-quality metrics.
//!
//! The analyzer loads every row of a requested table, computes table-level
//! and column-level statistics, and optionally attaches a natural-language
//! summary from the external summarizer. Results are computed fresh per
//! request and never cached. Unknown tables produce per-item soft errors;
//! one bad name never aborts the batch.

pub mod summary;

pub use summary::Summarizer;

use std::collections::{BTreeMap, HashSet};

use rusqlite::{types::ValueRef, Connection};
use serde::Serialize;
use tracing::warn;

use crate::catalog::{CatalogInspector, SqliteCatalog};

/// Errors that can occur while loading table data.
#[derive(Debug, thiserror::Error)]
pub enum QualityError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("catalog error: {0}")]
    Catalog(#[from] crate::catalog::CatalogError),
}

pub type QualityResult<T> = Result<T, QualityError>;

/// Column-level quality figures, normalized by row count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnQuality {
    pub missing_values: u64,
    pub null_values_percentage: f64,
    pub completeness_percentage: f64,
    pub uniqueness_percentage: f64,
}

/// Table-level quality metrics plus per-column breakdown.
///
/// `error` is a soft marker ("Table not found", "Table is empty"); items
/// carrying it keep their zeroed figures and skip summarization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub table_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_rows: u64,
    pub missing_values: u64,
    pub duplicate_rows: u64,
    pub null_values_percentage: f64,
    pub completeness_percentage: f64,
    pub uniqueness_percentage: f64,
    pub columns: BTreeMap<String, ColumnQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_analysis: Option<String>,
}

impl QualityMetrics {
    fn empty(table_name: &str, error: &str) -> Self {
        Self {
            table_name: table_name.to_string(),
            error: Some(error.to_string()),
            total_rows: 0,
            missing_values: 0,
            duplicate_rows: 0,
            null_values_percentage: 0.0,
            completeness_percentage: 0.0,
            uniqueness_percentage: 0.0,
            columns: BTreeMap::new(),
            llm_analysis: None,
        }
    }

    /// Soft-error item for a table absent from the live catalog.
    pub fn not_found(table_name: &str) -> Self {
        Self::empty(table_name, "Table not found")
    }
}

/// One loaded table: column names plus all rows, cells rendered as
/// `Option<String>` (NULL stays `None`).
#[derive(Debug)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Load every row of a table. Bounded by table size; there is no
/// pagination.
pub fn load_table(conn: &Connection, table: &str) -> QualityResult<TableData> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM \"{}\"", table))?;
    let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
    let width = columns.len();

    let rows = stmt
        .query_map([], |row| {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(render_cell(row.get_ref(i)?));
            }
            Ok(cells)
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TableData { columns, rows })
}

/// Canonical textual rendering of one stored cell.
fn render_cell(value: ValueRef<'_>) -> Option<String> {
    match value {
        ValueRef::Null => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Some(String::from_utf8_lossy(b).into_owned()),
    }
}

/// Compute the quality metrics for one loaded table.
///
/// Over `total_cells = rows × columns`:
/// - missing cells are NULLs;
/// - completeness and null percentage are complementary by construction;
/// - table-level uniqueness normalizes the per-column distinct-count sum by
///   the total cell count (not the row count) — the established contract of
///   this metric, preserved as-is;
/// - duplicate rows are exact full-row repeats, NULLs comparing equal.
///
/// Per-column figures are normalized by row count instead, and distinct
/// counts ignore NULLs.
pub fn compute_metrics(table_name: &str, data: &TableData) -> QualityMetrics {
    let total_rows = data.rows.len() as u64;
    let total_columns = data.columns.len() as u64;
    let total_cells = total_rows * total_columns;

    if total_rows == 0 {
        return QualityMetrics::empty(table_name, "Table is empty");
    }

    let mut missing_per_column = vec![0u64; data.columns.len()];
    let mut distinct_per_column: Vec<HashSet<&str>> =
        vec![HashSet::new(); data.columns.len()];

    let mut seen_rows: HashSet<&Vec<Option<String>>> = HashSet::new();
    let mut duplicate_rows = 0u64;

    for row in &data.rows {
        if !seen_rows.insert(row) {
            duplicate_rows += 1;
        }
        for (i, cell) in row.iter().enumerate() {
            match cell {
                Some(value) => {
                    distinct_per_column[i].insert(value.as_str());
                }
                None => missing_per_column[i] += 1,
            }
        }
    }

    let missing_values: u64 = missing_per_column.iter().sum();
    let distinct_sum: u64 = distinct_per_column.iter().map(|s| s.len() as u64).sum();

    let cells = total_cells as f64;
    let rows = total_rows as f64;

    let mut columns = BTreeMap::new();
    for (i, name) in data.columns.iter().enumerate() {
        let missing = missing_per_column[i];
        let distinct = distinct_per_column[i].len() as u64;
        columns.insert(
            name.clone(),
            ColumnQuality {
                missing_values: missing,
                null_values_percentage: missing as f64 / rows * 100.0,
                completeness_percentage: (1.0 - missing as f64 / rows) * 100.0,
                uniqueness_percentage: distinct as f64 / rows * 100.0,
            },
        );
    }

    QualityMetrics {
        table_name: table_name.to_string(),
        error: None,
        total_rows,
        missing_values,
        duplicate_rows,
        null_values_percentage: missing_values as f64 / cells * 100.0,
        completeness_percentage: (1.0 - missing_values as f64 / cells) * 100.0,
        uniqueness_percentage: distinct_sum as f64 / cells * 100.0,
        columns,
        llm_analysis: None,
    }
}

/// Analyze a batch of tables.
///
/// Each requested name yields exactly one item: full metrics, or a soft
/// error for names absent from the live catalog. When a summarizer is
/// configured, each successfully analyzed table gets one synchronous
/// summarization call; a failed call degrades that item only (the
/// `llm_analysis` field carries an unavailability marker) and is never
/// retried.
pub async fn analyze(
    conn: &Connection,
    summarizer: Option<&Summarizer>,
    table_names: &[String],
) -> QualityResult<Vec<QualityMetrics>> {
    let existing: HashSet<String> = SqliteCatalog::new(conn)
        .table_names()?
        .into_iter()
        .collect();

    let mut results = Vec::with_capacity(table_names.len());
    for name in table_names {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        if !existing.contains(name) {
            results.push(QualityMetrics::not_found(name));
            continue;
        }

        let data = load_table(conn, name)?;
        let mut metrics = compute_metrics(name, &data);

        if metrics.error.is_none() {
            if let Some(summarizer) = summarizer {
                metrics.llm_analysis = match summarizer.summarize(&metrics).await {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!(table = name, error = %e, "summarization degraded");
                        Some(format!("analysis unavailable: {}", e))
                    }
                };
            }
        }

        results.push(metrics);
    }

    Ok(results)
}
