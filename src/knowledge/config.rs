// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for knowledge aggregation and web enrichment
//!
//! Process-wide settings. Per-request limits (byte caps, timeouts) travel
//! with each request instead.

use std::env;
use std::net::SocketAddr;

use crate::version::VERSION_NUMBER;

/// Upper bound accepted for `KNOWLEDGE_CONCURRENCY`
const MAX_CONCURRENCY: usize = 32;

/// Service configuration
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    /// Maximum in-flight fetches per aggregation request (default: 5)
    pub concurrency: usize,
    /// Redirect hops followed per fetch (default: 10)
    pub max_redirects: usize,
    /// User agent sent with every fetch
    pub user_agent: String,
    /// Phrases redacted in addition to the built-in list
    pub extra_redact_phrases: Vec<String>,
    /// Address the HTTP server binds to (default: 0.0.0.0:8000)
    pub bind_addr: SocketAddr,
}

impl KnowledgeConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = env::var("API_HOST").unwrap_or_else(|_| defaults.bind_addr.ip().to_string());
        let port = env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.bind_addr.port());

        Self {
            concurrency: env::var("KNOWLEDGE_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.concurrency)
                .clamp(1, MAX_CONCURRENCY),
            max_redirects: env::var("KNOWLEDGE_MAX_REDIRECTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_redirects),
            user_agent: env::var("KNOWLEDGE_USER_AGENT").unwrap_or(defaults.user_agent),
            extra_redact_phrases: env::var("KNOWLEDGE_REDACT_PHRASES")
                .map(|v| parse_phrase_list(&v))
                .unwrap_or_default(),
            bind_addr: format!("{}:{}", host, port)
                .parse()
                .unwrap_or(defaults.bind_addr),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.concurrency == 0 {
            return Err("concurrency must be at least 1".to_string());
        }
        if self.concurrency > MAX_CONCURRENCY {
            return Err(format!("concurrency cannot exceed {}", MAX_CONCURRENCY));
        }
        if self.user_agent.trim().is_empty() {
            return Err("user_agent cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            max_redirects: 10,
            user_agent: format!("FabstirKnowledge/{}", VERSION_NUMBER),
            extra_redact_phrases: Vec::new(),
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
        }
    }
}

fn parse_phrase_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
