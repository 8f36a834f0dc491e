// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bundle Checker - coordinated-holder detection for SPL token launches.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use bundle_checker::{BundleEngine, EngineConfig, HttpLedgerClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: bundle-checker <mint_address> [OPTIONS]");
        eprintln!("       bundle-checker --serve [--port <N>]");
        eprintln!("\nDetect coordinated holder bundles around a token launch.");
        eprintln!("\nOptions:");
        eprintln!("  --serve           Run the HTTP analysis server instead of a one-shot scan");
        eprintln!("  --port <N>        Server port (default: 8080)");
        eprintln!("\nEnvironment:");
        eprintln!("  SOLANA_RPC_URL             RPC endpoint (default: mainnet-beta)");
        eprintln!("  CLASSIFICATION_API_URL     Optional address-label service");
        eprintln!("  BUNDLE_GAP_THRESHOLD_SECS  Clustering gap threshold (default: 1)");
        std::process::exit(1);
    }

    let serve_mode = args.contains(&"--serve".to_string());
    let port: u16 = args
        .iter()
        .position(|a| a == "--port")
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .unwrap_or(8080);

    let config = EngineConfig::from_env()
        .map_err(anyhow::Error::msg)
        .context("Failed to load configuration")?;
    info!("📡 RPC: {}", config.rpc_url);

    let ledger = Arc::new(HttpLedgerClient::new(&config));
    let engine = BundleEngine::new(ledger, config);

    if serve_mode {
        bundle_checker::server::serve(engine, port)
            .await
            .map_err(anyhow::Error::msg)?;
        return Ok(());
    }

    let mint = &args[1];
    let analysis = engine.analyze(mint).await?;
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
