//! # Datalens
//!
//! A small backend service that ingests tabular data into a fixed relational
//! schema, exposes schema-introspection endpoints, and computes per-table
//! data-quality metrics with an optional language-model summary.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 HTTP API (axum + CORS)                   │
//! │   /ingest  /get_tables  /keys_relation  /data-quality    │
//! └─────────────────────────────────────────────────────────┘
//!          │               │                │
//!          ▼               ▼                ▼
//! ┌──────────────┐ ┌──────────────┐ ┌──────────────────────┐
//! │   Ingestion  │ │   Catalog    │ │   Quality Analyzer   │
//! │  (coercion + │ │ (inspector + │ │  (metrics + external │
//! │ batch insert)│ │  relations)  │ │     summarizer)      │
//! └──────────────┘ └──────────────┘ └──────────────────────┘
//!          │               │                │
//!          ▼               ▼                ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │        Store (SQLite, request-scoped connections)        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Derived data (key-relation reports, quality metrics) is computed fresh
//! per request and never cached.

pub mod catalog;
pub mod config;
pub mod ingest;
pub mod quality;
pub mod store;
pub mod web;

pub use config::Settings;
pub use store::Store;
