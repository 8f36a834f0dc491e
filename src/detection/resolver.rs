// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transaction resolution - enrich temporal runs with participant wallets
//! and fund-flow totals.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::detection::clusterer::TemporalRun;
use crate::rpc::LedgerClient;
use crate::types::TransactionBody;

const LAMPORTS_PER_SOL: f64 = 1_000_000_000.0;

/// A temporal run enriched with whatever the ledger still knows about it.
#[derive(Debug, Clone)]
pub struct ResolvedBundle {
    pub signatures: Vec<String>,
    /// Distinct first-signer wallets across resolved bodies. Ordered so the
    /// aggregator's representative pick is deterministic.
    pub wallets: BTreeSet<String>,
    /// SOL debited from fee payers across resolved bodies.
    pub sol_spent: f64,
    /// Earliest resolved block time, or the run's own when nothing resolved.
    pub timestamp: i64,
    /// True when every body fetch failed - the temporal signal alone is kept.
    pub degraded: bool,
}

/// Fetches transaction bodies for candidate runs, bounded by a shared
/// in-flight cap so a burst of runs cannot exceed the ledger's rate limits.
pub struct TransactionResolver<'a, L: LedgerClient + ?Sized> {
    ledger: &'a L,
    limiter: Arc<Semaphore>,
}

impl<'a, L: LedgerClient + ?Sized> TransactionResolver<'a, L> {
    pub fn new(ledger: &'a L, max_in_flight: usize) -> Self {
        Self {
            ledger,
            limiter: Arc::new(Semaphore::new(max_in_flight.max(1))),
        }
    }

    /// Resolve every run concurrently. Excess fetches queue on the shared
    /// semaphore rather than failing.
    pub async fn resolve_all(&self, runs: Vec<TemporalRun>) -> Vec<ResolvedBundle> {
        join_all(runs.into_iter().map(|run| self.resolve(run))).await
    }

    async fn resolve(&self, run: TemporalRun) -> ResolvedBundle {
        let bodies = join_all(run.signatures.iter().map(|sig| self.fetch_body(sig))).await;
        summarize(run, bodies.into_iter().flatten().collect())
    }

    async fn fetch_body(&self, signature: &str) -> Option<TransactionBody> {
        let _permit = self.limiter.acquire().await.ok()?;
        match self.ledger.get_transaction(signature).await {
            Ok(Some(body)) => Some(body),
            Ok(None) => {
                debug!("transaction {} not indexed, dropping from extraction", signature);
                None
            }
            Err(e) => {
                warn!("transaction fetch failed for {}: {}", signature, e);
                None
            }
        }
    }
}

fn summarize(run: TemporalRun, bodies: Vec<TransactionBody>) -> ResolvedBundle {
    let mut wallets = BTreeSet::new();
    let mut sol_spent = 0.0;
    let mut earliest: Option<i64> = None;

    for body in &bodies {
        if let Some(signer) = body.first_signer() {
            wallets.insert(signer.to_string());
        }
        sol_spent += body.fee_payer_debit_lamports() as f64 / LAMPORTS_PER_SOL;
        if let Some(time) = body.block_time {
            earliest = Some(earliest.map_or(time, |t| t.min(time)));
        }
    }

    let degraded = bodies.is_empty();
    if degraded {
        warn!(
            "⚠️ no bodies resolved for a {}-signature run, keeping temporal signal only",
            run.signatures.len()
        );
    }

    ResolvedBundle {
        timestamp: earliest.unwrap_or(run.earliest_block_time),
        signatures: run.signatures,
        wallets,
        sol_spent,
        degraded,
    }
}
