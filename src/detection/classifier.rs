// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Holder classification - flag high-concentration wallets as bundle
//! candidates from the current holder snapshot.

use std::collections::HashSet;

use tracing::{info, warn};

use crate::rpc::LedgerClient;
use crate::types::{HolderSnapshot, MintInfo};

/// Labels that mark a holder as a known launch-platform wallet. Matched
/// case-insensitively as substrings; best-effort heuristic.
const PLATFORM_LABELS: &[&str] = &["pumpfun", "pump.fun", "moonshot", "bonk"];

/// A bundle candidate proposed by the concentration strategy.
#[derive(Debug, Clone)]
pub struct ConcentrationCandidate {
    pub owner: String,
    /// Current holdings in UI units - authoritative present-tense balance.
    pub current_holdings: f64,
    pub supply_percentage: f64,
    pub classification: Option<String>,
    pub is_platform_bundle: bool,
    /// When the snapshot was taken, so consumers know the staleness window.
    pub fetched_at: i64,
}

pub struct HolderClassifier<'a, L: LedgerClient + ?Sized> {
    ledger: &'a L,
    threshold_pct: f64,
}

impl<'a, L: LedgerClient + ?Sized> HolderClassifier<'a, L> {
    pub fn new(ledger: &'a L, threshold_pct: f64) -> Self {
        Self {
            ledger,
            threshold_pct,
        }
    }

    /// Fetch the holder snapshot and flag every holder above the
    /// concentration threshold. A failed fetch degrades to zero candidates;
    /// the temporal strategy still runs.
    pub async fn classify(
        &self,
        mint: &str,
        mint_info: &MintInfo,
        fetched_at: i64,
    ) -> Vec<ConcentrationCandidate> {
        let snapshot = match self.ledger.get_holders_classification(mint).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("holder snapshot unavailable for {}: {}", mint, e);
                return Vec::new();
            }
        };

        info!(
            "📊 {}: {} top holders of {} total",
            mint,
            snapshot.top_holders.len(),
            snapshot.total_holders
        );

        classify_holders(&snapshot, mint_info, self.threshold_pct, fetched_at)
    }
}

/// Core classification over a snapshot. Pure so threshold and labeling
/// behavior are testable without a ledger.
pub fn classify_holders(
    snapshot: &HolderSnapshot,
    mint_info: &MintInfo,
    threshold_pct: f64,
    fetched_at: i64,
) -> Vec<ConcentrationCandidate> {
    let total_supply = mint_info.total_supply();
    if total_supply <= 0.0 {
        warn!("zero total supply, skipping concentration classification");
        return Vec::new();
    }

    let scale = 10f64.powi(mint_info.decimals as i32);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut candidates = Vec::new();

    for holder in &snapshot.top_holders {
        if !seen.insert(&holder.owner) {
            continue;
        }

        let holdings = holder.balance as f64 / scale;
        let share = holdings / total_supply * 100.0;
        if share <= threshold_pct {
            continue;
        }

        let is_platform_bundle = holder
            .classification
            .as_deref()
            .map(is_platform_label)
            .unwrap_or(false);
        if is_platform_bundle {
            info!(
                "🚨 {} holds {:.2}% and is labeled {:?}",
                holder.owner, share, holder.classification
            );
        }

        candidates.push(ConcentrationCandidate {
            owner: holder.owner.clone(),
            current_holdings: holdings,
            supply_percentage: share,
            classification: holder.classification.clone(),
            is_platform_bundle,
            fetched_at,
        });
    }

    candidates
}

fn is_platform_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    PLATFORM_LABELS.iter().any(|p| lower.contains(p))
}
