//! HTTP Action Surface
//!
//! Exposes the index actions over HTTP, one route per CLI subcommand.
//!
//! ## Routes
//! - `GET /query/:name?return_size=`: runs a registered query and returns the result set.
//! - `POST /sync`: fetches the dataset and inserts everything newer than the watermark.
//! - `DELETE /index`: drops the whole index.
//! - `DELETE /docs/:id`: deletes one document.
//! - `POST /docs/delete?from=&to=`: deletes the fetched records dated within the range.
//! - `POST /export`: writes the fetched dataset to a file.
//! - `POST /curate`: enriches the fetched dataset and exports it.
//!
//! Failures come back as `{"error": ...}` with a status derived from the error class.

pub mod handlers;
pub mod types;

use crate::service::IndexService;

use axum::routing::{delete, get, post};
use axum::{Extension, Router};
use std::sync::Arc;

pub fn router(service: Arc<IndexService>) -> Router {
    Router::new()
        .route("/query/:name", get(handlers::handle_query))
        .route("/sync", post(handlers::handle_sync))
        .route("/index", delete(handlers::handle_delete_index))
        .route("/docs/:id", delete(handlers::handle_delete_doc))
        .route("/docs/delete", post(handlers::handle_delete_docs))
        .route("/export", post(handlers::handle_export))
        .route("/curate", post(handlers::handle_curate))
        .layer(Extension(service))
}
