// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Web page enrichment
//!
//! ```text
//! URL → TextFetcher → HTML → reduce_html → {title, excerpt}
//! ```

pub mod pipeline;
pub mod reducer;
pub mod types;

pub use pipeline::WebEnricher;
pub use reducer::{reduce_html, ReducedPage};
pub use types::{EnrichRequest, EnrichResult, EnrichedPage};
