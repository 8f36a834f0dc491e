// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bundle engine - orchestrates both detection strategies over the ledger
//! client and memoizes completed analyses.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{AnalysisCache, Clock, SystemClock};
use crate::config::EngineConfig;
use crate::detection::{aggregate, cluster_signatures, HolderClassifier, ResolvedBundle, TransactionResolver};
use crate::error::AnalysisError;
use crate::rpc::LedgerClient;
use crate::types::MintBundleAnalysis;

pub struct BundleEngine<L: LedgerClient> {
    ledger: Arc<L>,
    config: EngineConfig,
    clock: Arc<dyn Clock>,
    cache: AnalysisCache,
}

impl<L: LedgerClient> BundleEngine<L> {
    pub fn new(ledger: Arc<L>, config: EngineConfig) -> Self {
        Self::with_clock(ledger, config, Arc::new(SystemClock))
    }

    /// Build an engine with an explicit time source. Tests pair this with a
    /// manual clock to drive cache expiry and staleness stamps.
    pub fn with_clock(ledger: Arc<L>, config: EngineConfig, clock: Arc<dyn Clock>) -> Self {
        let cache = AnalysisCache::new(config.cache_ttl_secs, clock.clone());
        Self {
            ledger,
            config,
            clock,
            cache,
        }
    }

    /// Analyze a mint, serving a memoized result while it is fresh.
    /// Concurrent requests for the same mint share one computation.
    pub async fn analyze(&self, mint: &str) -> Result<MintBundleAnalysis, AnalysisError> {
        self.cache
            .get_or_compute(mint, || self.run_analysis(mint))
            .await
    }

    async fn run_analysis(&self, mint: &str) -> Result<MintBundleAnalysis, AnalysisError> {
        info!("🔍 analyzing bundles for mint {}", mint);

        // Everything downstream divides by total supply; without mint info
        // there is no meaningful partial result.
        let mint_info = self
            .ledger
            .get_mint_account_info(mint)
            .await
            .map_err(|e| {
                error!("❌ mint info unavailable for {}: {}", mint, e);
                AnalysisError::MintNotFound {
                    mint: mint.to_string(),
                    source: e,
                }
            })?;
        debug!(
            "mint {}: supply={} decimals={}",
            mint, mint_info.supply, mint_info.decimals
        );

        // Independent reads against the same remote service; run together.
        let classifier =
            HolderClassifier::new(self.ledger.as_ref(), self.config.concentration_threshold_pct);
        let (temporal, concentration) = tokio::join!(
            self.temporal_candidates(mint),
            classifier.classify(mint, &mint_info, self.clock.unix_now()),
        );

        let analysis = aggregate(mint, temporal, concentration);
        info!(
            "✅ {}: {} bundles, {:.4} SOL deployed, {} wallets",
            mint, analysis.total_bundles, analysis.total_sol_spent, analysis.total_unique_wallets
        );
        Ok(analysis)
    }

    /// Temporal strategy: signature history -> gap clustering -> bounded
    /// body resolution. Ledger failures here degrade to zero candidates.
    async fn temporal_candidates(&self, mint: &str) -> Vec<ResolvedBundle> {
        let signatures = match self.ledger.get_signatures_for_address(mint).await {
            Ok(signatures) => signatures,
            Err(e) => {
                warn!("signature history unavailable for {}: {}", mint, e);
                return Vec::new();
            }
        };

        let missing = signatures.iter().filter(|s| s.block_time.is_none()).count();
        if missing > 0 {
            warn!(
                "{} of {} signatures lack block times, clustering degraded",
                missing,
                signatures.len()
            );
        }

        let runs = cluster_signatures(&signatures, self.config.gap_threshold_secs);
        debug!(
            "clustered {} signatures into {} candidate runs",
            signatures.len(),
            runs.len()
        );

        let resolver =
            TransactionResolver::new(self.ledger.as_ref(), self.config.max_concurrent_tx_fetches);
        resolver.resolve_all(runs).await
    }
}
