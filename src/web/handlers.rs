//! API handlers.
//!
//! Soft errors (unknown table, bad payload) ride a 200 response as an
//! `error` field in the payload; only storage-layer failures surface as a
//! 500 with a plain message. Every handler opens one scoped connection and
//! releases it on return, success or failure.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::{key_relation_report, CatalogInspector, KeyRelationReport, SqliteCatalog};
use crate::ingest;
use crate::quality::{self, QualityMetrics};
use crate::store::schema;

use super::server::AppState;

/// Convert an infrastructure failure into a 500 response.
fn internal(err: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}

// ============================================================================
// Response Types
// ============================================================================

/// Response for CSV ingestion.
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    /// Success message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error message if ingestion failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestResponse {
    fn message(message: String) -> Self {
        Self {
            message: Some(message),
            error: None,
        }
    }

    fn error(error: String) -> Self {
        Self {
            message: None,
            error: Some(error),
        }
    }
}

/// Response for key-relationship extraction.
#[derive(Debug, Serialize)]
pub struct KeyRelationsResponse {
    pub key_relationships: KeyRelationReport,
}

/// Response for table listing.
#[derive(Debug, Serialize)]
pub struct TablesResponse {
    pub tables: Vec<String>,
}

/// Response for the table→columns map.
#[derive(Debug, Serialize)]
pub struct TablesWithColumnsResponse {
    pub tables_with_columns: BTreeMap<String, Vec<String>>,
}

/// Response for one table's column list.
#[derive(Debug, Serialize)]
pub struct TableColumnsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query parameters for data-quality analysis.
#[derive(Debug, Deserialize)]
pub struct DataQualityParams {
    /// Comma-separated table names; absent or empty analyzes every table
    /// in the registry.
    pub table_names: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /ingest/{table_name} - Ingest a CSV payload into one table.
pub async fn ingest_csv(
    State(state): State<Arc<AppState>>,
    Path(table_name): Path<String>,
    body: String,
) -> Result<Json<IngestResponse>, (StatusCode, String)> {
    let records = match ingest::records_from_csv(&body) {
        Ok(records) => records,
        Err(e) => return Ok(Json(IngestResponse::error(e.to_string()))),
    };

    let mut conn = state.store.connect().map_err(internal)?;

    match ingest::ingest(&mut conn, &table_name, &records) {
        Ok(inserted) => {
            info!(table = %table_name, rows = inserted, "csv ingested");
            Ok(Json(IngestResponse::message(format!(
                "ingested {} rows into {}",
                inserted, table_name
            ))))
        }
        Err(e) => Ok(Json(IngestResponse::error(e.to_string()))),
    }
}

/// GET /keys_relation and /get_keys_relations - Key structure of every
/// table in the live catalog.
pub async fn keys_relation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<KeyRelationsResponse>, (StatusCode, String)> {
    let conn = state.store.connect().map_err(internal)?;
    let report = key_relation_report(&SqliteCatalog::new(&conn)).map_err(internal)?;

    Ok(Json(KeyRelationsResponse {
        key_relationships: report,
    }))
}

/// GET /get_tables - Names of all tables in the live catalog.
pub async fn get_tables(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TablesResponse>, (StatusCode, String)> {
    let conn = state.store.connect().map_err(internal)?;
    let tables = SqliteCatalog::new(&conn).table_names().map_err(internal)?;

    Ok(Json(TablesResponse { tables }))
}

/// GET /get_tables_with_columns - Column lists for every table.
pub async fn get_tables_with_columns(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TablesWithColumnsResponse>, (StatusCode, String)> {
    let conn = state.store.connect().map_err(internal)?;
    let catalog = SqliteCatalog::new(&conn);

    let mut tables_with_columns = BTreeMap::new();
    for table in catalog.table_names().map_err(internal)? {
        let columns = catalog.table_columns(&table).map_err(internal)?;
        tables_with_columns.insert(table, columns);
    }

    Ok(Json(TablesWithColumnsResponse {
        tables_with_columns,
    }))
}

/// GET /get_table_columns/{table_name} - Column list for one table, or a
/// soft error for unknown names.
pub async fn get_table_columns(
    State(state): State<Arc<AppState>>,
    Path(table_name): Path<String>,
) -> Result<Json<TableColumnsResponse>, (StatusCode, String)> {
    let conn = state.store.connect().map_err(internal)?;
    let catalog = SqliteCatalog::new(&conn);

    let tables = catalog.table_names().map_err(internal)?;
    if !tables.contains(&table_name) {
        return Ok(Json(TableColumnsResponse {
            table: None,
            columns: None,
            error: Some(format!("Table '{}' does not exist", table_name)),
        }));
    }

    let columns = catalog.table_columns(&table_name).map_err(internal)?;
    Ok(Json(TableColumnsResponse {
        table: Some(table_name),
        columns: Some(columns),
        error: None,
    }))
}

/// POST /data-quality/ - Quality metrics for a batch of tables.
pub async fn data_quality(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DataQualityParams>,
) -> Result<Json<Vec<QualityMetrics>>, (StatusCode, String)> {
    let names: Vec<String> = match params
        .table_names
        .as_deref()
        .filter(|list| !list.trim().is_empty())
    {
        Some(list) => list
            .split(',')
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect(),
        None => schema::table_names()
            .into_iter()
            .map(String::from)
            .collect(),
    };

    let conn = state.store.connect().map_err(internal)?;
    let results = quality::analyze(&conn, state.summarizer.as_ref(), &names)
        .await
        .map_err(internal)?;

    Ok(Json(results))
}
