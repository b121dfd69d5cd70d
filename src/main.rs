// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use fabstir_knowledge_node::{knowledge::KnowledgeConfig, start_server, version};
use std::env;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!(
        "Starting Fabstir Knowledge Node {} (built {})",
        version::VERSION,
        version::BUILD_DATE
    );

    let config = KnowledgeConfig::from_env();
    info!(
        "Concurrency {}, {} extra redaction phrases",
        config.concurrency,
        config.extra_redact_phrases.len()
    );

    start_server(config).await
}
