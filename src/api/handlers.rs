use super::types::*;
use crate::error::Error;
use crate::export::{ExportRequest, ExportSummary};
use crate::ingestion::{DeleteReport, Record, SyncReport};
use crate::service::IndexService;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

/// Status code an error class is reported with.
pub fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::UnknownQuery(_) => StatusCode::NOT_FOUND,
        Error::CursorExpired => StatusCode::GATEWAY_TIMEOUT,
        Error::EmptyExport { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        Error::Store { .. } | Error::Http(_) => StatusCode::BAD_GATEWAY,
        Error::Io(_) | Error::Json(_) | Error::Csv(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: Error) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!("Request failed with {}: {}", status, err);
    } else {
        tracing::warn!("Request rejected with {}: {}", status, err);
    }
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub async fn handle_query(
    Path(name): Path<String>,
    Query(params): Query<QueryParams>,
    Extension(service): Extension<Arc<IndexService>>,
) -> ApiResult<Vec<Record>> {
    let results = service
        .query(&name, params.return_size.as_deref())
        .await
        .map_err(api_error)?;

    tracing::info!("Query '{}' returned {} records", name, results.len());
    Ok(Json(results))
}

pub async fn handle_sync(
    Extension(service): Extension<Arc<IndexService>>,
) -> ApiResult<SyncReport> {
    let batch = service.fetch_dataset().await.map_err(api_error)?;
    let report = service.insert_latest(&batch).await.map_err(api_error)?;
    Ok(Json(report))
}

pub async fn handle_delete_index(
    Extension(service): Extension<Arc<IndexService>>,
) -> ApiResult<DeleteIndexResponse> {
    let deleted = service.delete_index().await.map_err(api_error)?;
    Ok(Json(DeleteIndexResponse { deleted }))
}

pub async fn handle_delete_doc(
    Path(doc_id): Path<String>,
    Extension(service): Extension<Arc<IndexService>>,
) -> ApiResult<DeleteDocResponse> {
    let success = service.delete_doc(&doc_id).await.map_err(api_error)?;
    Ok(Json(DeleteDocResponse { doc_id, success }))
}

pub async fn handle_delete_docs(
    Query(params): Query<RangeParams>,
    Extension(service): Extension<Arc<IndexService>>,
) -> ApiResult<DeleteReport> {
    let report = service
        .delete_docs_latest(params.from.as_deref(), params.to.as_deref())
        .await
        .map_err(api_error)?;
    Ok(Json(report))
}

pub async fn handle_export(
    Extension(service): Extension<Arc<IndexService>>,
    Json(request): Json<ExportRequest>,
) -> ApiResult<ExportSummary> {
    let summary = service.export_latest(&request).await.map_err(api_error)?;
    Ok(Json(summary))
}

pub async fn handle_curate(
    Extension(service): Extension<Arc<IndexService>>,
) -> ApiResult<ExportSummary> {
    let summary = service.curate_latest().await.map_err(api_error)?;
    Ok(Json(summary))
}
