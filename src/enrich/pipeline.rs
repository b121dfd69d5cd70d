// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-page fetch and summarize

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::reducer::reduce_html;
use super::types::{EnrichRequest, EnrichResult, EnrichedPage};
use crate::knowledge::config::KnowledgeConfig;
use crate::knowledge::fetcher::{FetchClient, TextFetcher};

/// Fetches one page and reduces it to a title plus a short text excerpt
#[derive(Clone)]
pub struct WebEnricher {
    fetcher: Arc<dyn TextFetcher>,
}

impl WebEnricher {
    pub fn new(fetcher: Arc<dyn TextFetcher>) -> Self {
        Self { fetcher }
    }

    /// Create an enricher backed by a [`FetchClient`]
    pub fn from_config(config: &KnowledgeConfig) -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(FetchClient::new(config)?)))
    }

    /// Fetch and reduce `request.url`. Failures collapse into an empty value.
    pub async fn enrich(&self, request: &EnrichRequest) -> EnrichResult {
        let start = Instant::now();
        let timeout = Duration::from_millis(request.timeout_ms);

        let html = match self.fetcher.fetch(&request.url, timeout).await {
            Ok(html) => html,
            Err(e) if e.is_timeout() => {
                warn!("{}", e);
                return EnrichResult::timeout();
            }
            Err(e) => {
                debug!("Web enrichment failed: {}", e);
                return EnrichResult::failed();
            }
        };

        let page = reduce_html(&html, request.max_bytes);

        info!(
            "Summarized {} ({} bytes of {} fetched) in {}ms",
            request.url,
            page.text.len(),
            html.len(),
            start.elapsed().as_millis()
        );

        EnrichResult::page(EnrichedPage {
            url: request.url.clone(),
            title: page.title,
            excerpt: Some(page.text),
        })
    }
}
