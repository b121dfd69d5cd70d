// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Knowledge excerpt endpoint handler

use axum::{extract::State, http::StatusCode, Json};
use tracing::{debug, warn};

use crate::api::http_server::AppState;
use crate::knowledge::{AggregationRequest, AggregationResult};

/// POST /v1/knowledge/excerpt - Build a byte-bounded excerpt from remote files
///
/// # Request
/// - `files`: Array of `{title, blobUrl, sizeBytes?}` in output order
/// - `capBytes`: Combined content budget (default 204800)
/// - `timeoutMs`: Per-file fetch timeout (default 2000)
///
/// # Response
/// - `excerpt`, `totalBytes`, `nbTimeouts`, `nbFiles`, `capped`
///
/// # Errors
/// - 400 Bad Request: Invalid parameters. Per-file failures never error.
pub async fn knowledge_excerpt_handler(
    State(state): State<AppState>,
    Json(request): Json<AggregationRequest>,
) -> Result<Json<AggregationResult>, (StatusCode, String)> {
    debug!(
        "Knowledge excerpt request: {} files, cap {} bytes",
        request.files.len(),
        request.cap_bytes
    );

    if let Err(e) = request.validate() {
        warn!("Knowledge excerpt validation failed: {}", e);
        return Err((StatusCode::BAD_REQUEST, e));
    }

    Ok(Json(state.aggregator.aggregate(&request).await))
}
