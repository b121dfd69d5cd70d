// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP transport for the knowledge and web enrichment operations

use axum::{
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::knowledge::knowledge_excerpt_handler;
use super::web::web_summarize_handler;
use crate::enrich::WebEnricher;
use crate::knowledge::{Aggregator, FetchClient, KnowledgeConfig, Sanitizer, TextFetcher};
use crate::version::{FEATURES, VERSION};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<Aggregator>,
    pub enricher: Arc<WebEnricher>,
}

impl AppState {
    /// Both operations share `fetcher` and therefore one connection pool
    pub fn new(fetcher: Arc<dyn TextFetcher>, sanitizer: Sanitizer, concurrency: usize) -> Self {
        Self {
            aggregator: Arc::new(Aggregator::new(Arc::clone(&fetcher), sanitizer, concurrency)),
            enricher: Arc::new(WebEnricher::new(fetcher)),
        }
    }

    pub fn from_config(config: &KnowledgeConfig) -> anyhow::Result<Self> {
        let fetcher: Arc<dyn TextFetcher> = Arc::new(FetchClient::new(config)?);
        let sanitizer = Sanitizer::new(&config.extra_redact_phrases)?;
        Ok(Self::new(fetcher, sanitizer, config.concurrency))
    }
}

/// Build the router with all routes and layers
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/knowledge/excerpt", post(knowledge_excerpt_handler))
        .route("/v1/web/summarize", post(web_summarize_handler))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind `config.bind_addr` and serve until the process exits
pub async fn start_server(config: KnowledgeConfig) -> anyhow::Result<()> {
    config.validate().map_err(anyhow::Error::msg)?;

    let state = AppState::from_config(&config)?;
    info!(
        "Excerpt aggregation: {} concurrent fetches",
        state.aggregator.concurrency()
    );
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": VERSION,
        "features": FEATURES,
    }))
}
