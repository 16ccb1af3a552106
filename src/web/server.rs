//! Axum server: shared state, router, and serve loop.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::quality::Summarizer;
use crate::store::Store;

use super::handlers;

/// Application state shared across handlers.
///
/// The store is a connection provider — handlers open one scoped connection
/// per request — and the summarizer client is immutable, so no mutable
/// state is shared across requests.
pub struct AppState {
    /// Storage connection provider.
    pub store: Store,
    /// External summarizer; `None` disables summarization.
    pub summarizer: Option<Summarizer>,
}

/// Build the axum router with all routes.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ingest/{table_name}", post(handlers::ingest_csv))
        // Two spellings of the same operation; kept for caller
        // compatibility.
        .route("/keys_relation", get(handlers::keys_relation))
        .route("/get_keys_relations", get(handlers::keys_relation))
        .route("/get_tables", get(handlers::get_tables))
        .route(
            "/get_tables_with_columns",
            get(handlers::get_tables_with_columns),
        )
        .route(
            "/get_table_columns/{table_name}",
            get(handlers::get_table_columns),
        )
        .route("/data-quality/", post(handlers::data_quality))
        .layer(cors)
        .with_state(state)
}

/// Start the web server.
pub async fn serve(
    state: AppState,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let database = state.store.path().display().to_string();
    let app = router(Arc::new(state));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, %database, "datalens listening");

    axum::serve(listener, app).await?;
    Ok(())
}
