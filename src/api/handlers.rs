use axum::extract::{Query, State};
use axum::Json;

use super::types::{ApiError, LogsQuery, LogsResponse, StatusResponse};
use crate::app::{Health, Service};
use crate::core::miner::MAX_LOGS;
use crate::core::system_info::{Metrics, Specs};
use crate::observability;

pub(super) async fn get_health(State(service): State<Service>) -> Json<Health> {
    Json(service.health())
}

pub(super) async fn get_specs(State(service): State<Service>) -> Result<Json<Specs>, ApiError> {
    let specs = tokio::task::spawn_blocking(move || service.specs())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    specs.map(Json).map_err(|e| {
        log::warn!("http specs: {}", e);
        observability::capture_error(&e, &[("component", "http"), ("handler", "specs")]);
        ApiError::internal(e.to_string())
    })
}

pub(super) async fn get_metrics(
    State(service): State<Service>,
) -> Result<Json<Metrics>, ApiError> {
    let metrics = tokio::task::spawn_blocking(move || service.metrics())
        .await
        .map_err(|e| ApiError::internal(e.to_string()))?;
    metrics.map(Json).map_err(|e| {
        log::warn!("http metrics: {}", e);
        observability::capture_error(&e, &[("component", "http"), ("handler", "metrics")]);
        ApiError::internal(e.to_string())
    })
}

pub(super) async fn get_xmrig_status(State(service): State<Service>) -> Json<StatusResponse> {
    Json(StatusResponse::from(service.miner_status()))
}

pub(super) async fn get_xmrig_logs(
    State(service): State<Service>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ApiError> {
    let requested = match query.n.as_deref() {
        None => None,
        Some(raw) => Some(
            raw.trim()
                .parse::<i64>()
                .map_err(|_| ApiError::bad_request("invalid n"))?,
        ),
    };
    let count = log_count(requested)?;

    let logs = service.miner_logs(count as i64);
    Ok(Json(LogsResponse {
        count: logs.len(),
        logs,
    }))
}

/// Resolve the `n` query parameter: omitted means the full ring, non-positive is rejected.
pub fn log_count(n: Option<i64>) -> Result<usize, ApiError> {
    match n {
        None => Ok(MAX_LOGS),
        Some(count) if count <= 0 => Err(ApiError::bad_request("invalid n")),
        Some(count) => Ok(usize::try_from(count).map_or(MAX_LOGS, |count| count.min(MAX_LOGS))),
    }
}
