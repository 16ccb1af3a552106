//! HTTP service facade.
//!
//! Thin transport boundary over the ingestion, catalog, and quality
//! components: route wiring, CORS, and JSON marshaling. No business logic
//! lives here.

mod handlers;
mod server;

pub use server::{router, serve, AppState};
