//! COVID Index Tooling Library
//!
//! Keeps an Elasticsearch index of the daily per-state COVID series in step with the
//! public dataset, queries it, and exports curated snapshots to files.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! - **`store`**: The narrow document-store client (`DocumentStore`) with an Elasticsearch
//!   REST implementation and an in-memory one.
//! - **`query`**: The named-query registry and the scroll engine that pages a query to
//!   completion under a result cap.
//! - **`ingestion`**: The record model, the dataset fetch, watermark-based sync and
//!   best-effort range deletion.
//! - **`curation`**: Population join and the derived per-capita and rate fields.
//! - **`export`**: KI / ES / CSV file writers.
//! - **`service`**: The action surface shared by the CLI and the HTTP API.
//! - **`api`**: axum routes over the service.

pub mod api;
pub mod config;
pub mod curation;
pub mod error;
pub mod export;
pub mod ingestion;
pub mod query;
pub mod service;
pub mod store;

pub use error::{Error, Result};
