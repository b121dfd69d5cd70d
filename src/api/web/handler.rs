// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web summarize endpoint handler

use axum::{extract::State, http::StatusCode, Json};
use tracing::{debug, warn};

use crate::api::http_server::AppState;
use crate::enrich::{EnrichRequest, EnrichResult};

/// POST /v1/web/summarize - Fetch one page and return its title and text
///
/// # Request
/// - `url`: Page to fetch (required)
/// - `timeoutMs`: Fetch timeout (default 1000)
/// - `maxBytes`: Excerpt size limit (default 51200)
///
/// # Response
/// - `value`: `{url, title, excerpt}` or null when the fetch failed
/// - `timedOut`: Whether the failure was a timeout
///
/// # Errors
/// - 400 Bad Request: Missing url or zero timeout
pub async fn web_summarize_handler(
    State(state): State<AppState>,
    Json(request): Json<EnrichRequest>,
) -> Result<Json<EnrichResult>, (StatusCode, String)> {
    debug!("Web summarize request: {}", request.url);

    if let Err(e) = request.validate() {
        warn!("Web summarize validation failed: {}", e);
        return Err((StatusCode::BAD_REQUEST, e));
    }

    Ok(Json(state.enricher.enrich(&request).await))
}
