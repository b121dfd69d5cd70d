// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Bounded-time HTTP text fetching
//!
//! A single GET per call, redirects followed, no retry. The deadline covers
//! connecting, headers and reading the body.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use super::config::KnowledgeConfig;

/// Classified fetch failure
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Deadline elapsed before the body was read
    #[error("Timeout fetching: {url}")]
    Timeout { url: String },

    /// Response status >= 400
    #[error("HTTP {status} for: {url}")]
    HttpStatus { status: u16, url: String },

    /// Connection, DNS, TLS or body decoding failure
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

/// Source of remote text, implemented by [`FetchClient`]
#[async_trait]
pub trait TextFetcher: Send + Sync {
    /// Fetch `url` as text, giving up after `timeout`
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError>;
}

/// HTTP fetch client sharing one connection pool across requests
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    /// Build the client from configuration
    pub fn new(config: &KnowledgeConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TextFetcher for FetchClient {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        debug!("Fetching text from: {} (timeout {}ms)", url, timeout.as_millis());

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))
    }
}
