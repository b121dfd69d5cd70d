// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Knowledge excerpt aggregation
//!
//! Turns a list of uploaded file blobs into one byte-bounded excerpt that can
//! be placed in an LLM prompt.
//!
//! ## Architecture
//!
//! ```text
//! FileDescriptor[] → Aggregator ─┬→ TextFetcher (≤5 in flight) → Sanitizer
//!                                └→ BudgetCoordinator (try_admit / reserve)
//!                                        ↓
//!                         slots[index] → ordered excerpt
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let aggregator = Aggregator::from_config(&KnowledgeConfig::from_env())?;
//! let request = AggregationRequest::new(files).with_cap_bytes(100 * 1024);
//! let result = aggregator.aggregate(&request).await;
//! ```

pub mod aggregator;
pub mod budget;
pub mod config;
pub mod fetcher;
pub mod sanitizer;
pub mod types;

pub use aggregator::Aggregator;
pub use budget::BudgetCoordinator;
pub use config::KnowledgeConfig;
pub use fetcher::{FetchClient, FetchError, TextFetcher};
pub use sanitizer::{Sanitizer, SanitizerError, REDACTION_MARKER};
pub use types::{AggregationRequest, AggregationResult, FileDescriptor};
