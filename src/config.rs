// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads engine settings from environment variables.

/// Engine configuration. Every tunable is explicit here so tests can build
/// deterministic engines with injected ledger fakes instead of reading
/// process state.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    // Ledger
    pub rpc_url: String,
    /// Optional address-classification endpoint. Labels are best-effort;
    /// absence disables lookups entirely.
    pub classification_url: Option<String>,

    // Temporal clustering
    /// Max gap in seconds between consecutive signatures of one run.
    /// Coarse heuristic - a known source of false positives/negatives.
    pub gap_threshold_secs: i64,

    // Holder classification
    /// Holders above this share of supply (percent) become candidates.
    pub concentration_threshold_pct: f64,

    // Fetch limits
    pub signature_fetch_limit: usize,
    pub holder_snapshot_limit: usize,
    /// Concurrent transaction-body fetches in flight per analysis.
    pub max_concurrent_tx_fetches: usize,

    // Retry policy at the ledger adapter boundary
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,

    // Result cache
    pub cache_ttl_secs: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            classification_url: None,
            gap_threshold_secs: 1,
            concentration_threshold_pct: 1.0,
            signature_fetch_limit: 1000,
            holder_snapshot_limit: 20,
            max_concurrent_tx_fetches: 8,
            max_retries: 3,
            retry_base_delay_ms: 250,
            cache_ttl_secs: 30,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            rpc_url: env_var_or("SOLANA_RPC_URL", &defaults.rpc_url),
            classification_url: std::env::var("CLASSIFICATION_API_URL").ok(),
            gap_threshold_secs: env_var_or("BUNDLE_GAP_THRESHOLD_SECS", "1")
                .parse()
                .unwrap_or(defaults.gap_threshold_secs),
            concentration_threshold_pct: env_var_or("CONCENTRATION_THRESHOLD_PCT", "1.0")
                .parse()
                .unwrap_or(defaults.concentration_threshold_pct),
            signature_fetch_limit: env_var_or("SIGNATURE_FETCH_LIMIT", "1000")
                .parse()
                .unwrap_or(defaults.signature_fetch_limit),
            holder_snapshot_limit: env_var_or("HOLDER_SNAPSHOT_LIMIT", "20")
                .parse()
                .unwrap_or(defaults.holder_snapshot_limit),
            max_concurrent_tx_fetches: env_var_or("MAX_CONCURRENT_TX_FETCHES", "8")
                .parse()
                .unwrap_or(defaults.max_concurrent_tx_fetches),
            max_retries: env_var_or("LEDGER_MAX_RETRIES", "3")
                .parse()
                .unwrap_or(defaults.max_retries),
            retry_base_delay_ms: env_var_or("LEDGER_RETRY_BASE_DELAY_MS", "250")
                .parse()
                .unwrap_or(defaults.retry_base_delay_ms),
            cache_ttl_secs: env_var_or("ANALYSIS_CACHE_TTL_SECS", "30")
                .parse()
                .unwrap_or(defaults.cache_ttl_secs),
        })
    }
}

fn env_var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
