//! HTTP handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use uuid::Uuid;

use super::ServerState;
use super::error::ApiError;
use super::types::{AdsOptimizeRequest, OptimizeParams, OptimizeResponse, config_from_params};
use crate::ads::sync::{SyncReport, run_cycle};
use crate::ads::{ApiResponse, BidUpdateResult, TargetQuery, UpdateBidsRequest};
use crate::ingest::parse_upload;
use crate::optimizer::Target;
use crate::report::OptimizationReport;

pub async fn health() -> &'static str {
    "ok"
}

// -- Upload / download --

/// Optimize an uploaded batch and store the report for download.
pub async fn optimize(
    State(state): State<ServerState>,
    params: Result<Query<OptimizeParams>, QueryRejection>,
    body: Bytes,
) -> Result<Json<OptimizeResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let config = config_from_params(params.target_acos, params.increase_spend, params.aov)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let upload = parse_upload(&body)?;
    let batch =
        state
            .optimizer
            .optimize_batch_with_aov(&upload.targets, &config, &upload.aov_by_product)?;

    let report = OptimizationReport::new(config, batch);
    let summary = report.summary.clone();
    let download_id = state.reports.insert(report).await;

    let stored = state.reports.count().await;
    tracing::info!(
        download_id = %download_id,
        targets = summary.total_count,
        updates = summary.updates_recommended_count,
        promising = summary.promising_count,
        stored,
        "Optimization report ready"
    );

    Ok(Json(OptimizeResponse {
        message: format!(
            "Optimized {} targets, {} bid updates recommended",
            summary.total_count, summary.updates_recommended_count
        ),
        download_id,
        summary,
    }))
}

/// Serve a stored report as a JSON attachment.
pub async fn download(
    State(state): State<ServerState>,
    download_id: Result<Path<Uuid>, PathRejection>,
) -> Result<Response, ApiError> {
    let Path(download_id) = download_id
        .map_err(|_| ApiError::NotFound("Download not found".to_string()))?;

    let report = state
        .reports
        .get(download_id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("Download {} not found", download_id)))?;

    let body = report
        .to_json()
        .map_err(|e| ApiError::Internal(format!("Failed to render report: {}", e)))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.file_name()),
            ),
        ],
        body,
    )
        .into_response())
}

// -- Ads API --

pub async fn list_targets(
    State(state): State<ServerState>,
    query: Result<Query<TargetQuery>, QueryRejection>,
) -> Result<Json<ApiResponse<Vec<Target>>>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let targets = state.ads.get_optimizable_targets(&query).await?;
    Ok(Json(ApiResponse::ok(targets)))
}

pub async fn update_bids(
    State(state): State<ServerState>,
    request: Result<Json<UpdateBidsRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Vec<BidUpdateResult>>>, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let results = state.ads.update_target_bids(&request).await?;
    Ok(Json(ApiResponse::ok(results)))
}

/// Run a fetch/optimize/push cycle against the ads API.
pub async fn optimize_ads(
    State(state): State<ServerState>,
    request: Result<Json<AdsOptimizeRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SyncReport>>, ApiError> {
    let Json(request) = request.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let config = config_from_params(
        request.target_acos,
        request.increase_spend,
        request.average_order_value,
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let report = run_cycle(
        state.ads.as_ref(),
        &state.optimizer,
        &request.query(),
        &config,
    )
    .await?;
    Ok(Json(ApiResponse::ok(report)))
}
