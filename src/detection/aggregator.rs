// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Stats aggregation - reconcile both detection strategies into one ranked
//! analysis.
//!
//! A Concentration candidate and a Temporal candidate describe the same
//! bundle iff the concentration owner appears in the temporal wallet set.
//! Unmatched candidates from either side are kept standalone: a wallet that
//! concentrated holdings via off-chain transfer has no signature cluster,
//! and a wallet that clustered transactions but distributed since has zero
//! current balance.

use crate::detection::classifier::ConcentrationCandidate;
use crate::detection::resolver::ResolvedBundle;
use crate::types::{BundleStats, MintBundleAnalysis};

/// Merge, rank and total the candidate sets. Pure; the engine has already
/// validated mint info before any candidate exists.
pub fn aggregate(
    mint_address: &str,
    temporal: Vec<ResolvedBundle>,
    concentration: Vec<ConcentrationCandidate>,
) -> MintBundleAnalysis {
    let mut temporal: Vec<Option<ResolvedBundle>> = temporal.into_iter().map(Some).collect();

    // Strongest holders claim their temporal counterpart first; each run
    // merges at most once so its solSpent is never double-counted.
    let mut concentration = concentration;
    concentration.sort_by(|a, b| b.supply_percentage.total_cmp(&a.supply_percentage));

    let mut bundles = Vec::new();

    for candidate in concentration {
        let matched = temporal.iter().position(|slot| {
            slot.as_ref()
                .is_some_and(|run| run.wallets.contains(&candidate.owner))
        });

        match matched.and_then(|i| temporal[i].take()) {
            Some(run) => bundles.push(merged_stats(candidate, run)),
            None => bundles.push(concentration_stats(candidate)),
        }
    }

    bundles.extend(temporal.into_iter().flatten().map(temporal_stats));

    bundles.sort_by(|a, b| {
        b.supply_percentage
            .total_cmp(&a.supply_percentage)
            .then_with(|| b.unique_wallets.cmp(&a.unique_wallets))
            .then_with(|| a.bundle_address.cmp(&b.bundle_address))
    });

    MintBundleAnalysis {
        mint_address: mint_address.to_string(),
        total_bundles: bundles.len(),
        total_sol_spent: bundles.iter().map(|b| b.sol_spent).sum(),
        // Intentionally not de-duplicated across bundles: a wallet in two
        // bundles counts twice, matching the per-bundle accounting model.
        total_unique_wallets: bundles.iter().map(|b| b.unique_wallets).sum(),
        largest_bundle: bundles.first().cloned(),
        bundles,
    }
}

/// Both strategies agree: present-tense holdings from the concentration
/// side, historical activity from the temporal side.
fn merged_stats(candidate: ConcentrationCandidate, run: ResolvedBundle) -> BundleStats {
    let mut wallets = run.wallets;
    wallets.insert(candidate.owner.clone());

    BundleStats {
        bundle_address: candidate.owner,
        supply_percentage: candidate.supply_percentage,
        sol_spent: run.sol_spent,
        unique_wallets: wallets.len(),
        current_holdings: candidate.current_holdings,
        is_platform_bundle: candidate.is_platform_bundle,
        timestamp: run.timestamp,
    }
}

fn concentration_stats(candidate: ConcentrationCandidate) -> BundleStats {
    BundleStats {
        bundle_address: candidate.owner,
        supply_percentage: candidate.supply_percentage,
        sol_spent: 0.0,
        unique_wallets: 1,
        current_holdings: candidate.current_holdings,
        is_platform_bundle: candidate.is_platform_bundle,
        timestamp: candidate.fetched_at,
    }
}

fn temporal_stats(run: ResolvedBundle) -> BundleStats {
    // Smallest resolved wallet keeps the representative deterministic; a
    // fully-degraded run falls back to its first signature, the only stable
    // identifier left.
    let bundle_address = run
        .wallets
        .iter()
        .next()
        .cloned()
        .or_else(|| run.signatures.first().cloned())
        .unwrap_or_default();

    BundleStats {
        bundle_address,
        supply_percentage: 0.0,
        sol_spent: run.sol_spent,
        // A multi-signature run has at least one signer even when no body
        // resolved.
        unique_wallets: run.wallets.len().max(1),
        current_holdings: 0.0,
        is_platform_bundle: false,
        timestamp: run.timestamp,
    }
}
