// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Knowledge excerpt API endpoint
//!
//! Provides the `/v1/knowledge/excerpt` HTTP endpoint.

pub mod handler;

pub use handler::knowledge_excerpt_handler;
