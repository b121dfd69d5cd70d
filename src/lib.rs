// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod enrich;
pub mod knowledge;
pub mod utils;
pub mod version;

pub use api::{create_app, start_server, AppState};
pub use enrich::{EnrichRequest, EnrichResult, EnrichedPage, WebEnricher};
pub use knowledge::{
    AggregationRequest, AggregationResult, Aggregator, FetchClient, FetchError, FileDescriptor,
    KnowledgeConfig, TextFetcher,
};
