// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Request and result types for knowledge excerpt aggregation

use serde::{Deserialize, Serialize};

/// Default combined excerpt budget (200KB)
pub const DEFAULT_CAP_BYTES: u64 = 200 * 1024;

/// Default per-file fetch timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS_PER_FILE: u64 = 2000;

/// A remote text file to include in the excerpt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptor {
    /// Display title used in the chunk header
    pub title: String,
    /// Where the file content is fetched from (empty = skipped)
    #[serde(rename = "blobUrl")]
    pub source_url: String,
    /// Size reported by the caller, shown in the chunk header
    #[serde(rename = "sizeBytes", default, skip_serializing_if = "Option::is_none")]
    pub declared_size_bytes: Option<u64>,
}

impl FileDescriptor {
    pub fn new(title: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            source_url: source_url.into(),
            declared_size_bytes: None,
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.declared_size_bytes = Some(size_bytes);
        self
    }

    /// Header line written in front of this file's chunk
    pub fn chunk_header(&self) -> String {
        let size = self
            .declared_size_bytes
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unknown".to_string());
        format!("\n\n# File: {} ({} bytes)\n", self.title, size)
    }
}

/// Request body for POST /v1/knowledge/excerpt
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRequest {
    /// Files in the order their chunks must appear
    pub files: Vec<FileDescriptor>,

    /// Byte budget for the combined excerpt content
    #[serde(default = "default_cap_bytes")]
    pub cap_bytes: u64,

    /// Deadline for each individual fetch
    #[serde(rename = "timeoutMs", default = "default_timeout_ms_per_file")]
    pub timeout_ms_per_file: u64,
}

fn default_cap_bytes() -> u64 {
    DEFAULT_CAP_BYTES
}

fn default_timeout_ms_per_file() -> u64 {
    DEFAULT_TIMEOUT_MS_PER_FILE
}

impl AggregationRequest {
    pub fn new(files: Vec<FileDescriptor>) -> Self {
        Self {
            files,
            cap_bytes: DEFAULT_CAP_BYTES,
            timeout_ms_per_file: DEFAULT_TIMEOUT_MS_PER_FILE,
        }
    }

    pub fn with_cap_bytes(mut self, cap_bytes: u64) -> Self {
        self.cap_bytes = cap_bytes;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms_per_file = timeout_ms;
        self
    }

    /// Validate the request
    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms_per_file == 0 {
            return Err("timeoutMs must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Response body for POST /v1/knowledge/excerpt
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregationResult {
    /// Ordered, budget-limited concatenation of file chunks
    pub excerpt: String,
    /// Content bytes charged against the budget (headers excluded)
    pub total_bytes: u64,
    /// Number of files whose fetch hit the deadline
    #[serde(rename = "nbTimeouts")]
    pub timeout_count: u64,
    /// Number of files that contributed a non-empty chunk
    #[serde(rename = "nbFiles")]
    pub included_file_count: usize,
    /// Whether the budget was fully consumed
    pub capped: bool,
}
