// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request and result types for single-page web enrichment

use serde::{Deserialize, Serialize};

/// Default enrichment fetch timeout in milliseconds
pub const DEFAULT_ENRICH_TIMEOUT_MS: u64 = 1000;

/// Default maximum excerpt size (50KB)
pub const DEFAULT_ENRICH_MAX_BYTES: usize = 50 * 1024;

/// Request body for POST /v1/web/summarize
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichRequest {
    /// Page to fetch
    pub url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Byte limit for the returned excerpt
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_ENRICH_TIMEOUT_MS
}

fn default_max_bytes() -> usize {
    DEFAULT_ENRICH_MAX_BYTES
}

impl EnrichRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: DEFAULT_ENRICH_TIMEOUT_MS,
            max_bytes: DEFAULT_ENRICH_MAX_BYTES,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Validate the request
    pub fn validate(&self) -> Result<(), String> {
        if self.url.trim().is_empty() {
            return Err("url cannot be empty".to_string());
        }
        if self.timeout_ms == 0 {
            return Err("timeoutMs must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Cleaned page content
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedPage {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

/// Response body for POST /v1/web/summarize
///
/// `value` is `None` on any failure; `timed_out` tells a deadline apart from
/// every other failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnrichResult {
    pub value: Option<EnrichedPage>,
    #[serde(default)]
    pub timed_out: bool,
}

impl EnrichResult {
    pub fn page(page: EnrichedPage) -> Self {
        Self {
            value: Some(page),
            timed_out: false,
        }
    }

    pub fn timeout() -> Self {
        Self {
            value: None,
            timed_out: true,
        }
    }

    pub fn failed() -> Self {
        Self {
            value: None,
            timed_out: false,
        }
    }
}
