// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web summarize API endpoint
//!
//! Provides the `/v1/web/summarize` HTTP endpoint.

pub mod handler;

pub use handler::web_summarize_handler;
