// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core data model for bundle analysis.

use serde::{Deserialize, Serialize};

/// One entry from an address's signature history, newest first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureRecord {
    pub signature: String,
    /// Unix seconds. Absent when the ledger never recorded a block time.
    #[serde(default)]
    pub block_time: Option<i64>,
}

/// A resolved transaction body. The balance vectors are in lamports and
/// indexed like `account_keys`, so fund flows can be attributed per wallet.
#[derive(Debug, Clone)]
pub struct TransactionBody {
    pub signature: String,
    pub account_keys: Vec<String>,
    pub block_time: Option<i64>,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
}

impl TransactionBody {
    /// First signer (fee payer) of the transaction, if any keys resolved.
    pub fn first_signer(&self) -> Option<&str> {
        self.account_keys.first().map(String::as_str)
    }

    /// Lamports the fee payer lost in this transaction (0 if it gained).
    pub fn fee_payer_debit_lamports(&self) -> u64 {
        match (self.pre_balances.first(), self.post_balances.first()) {
            (Some(pre), Some(post)) => pre.saturating_sub(*post),
            _ => 0,
        }
    }
}

/// A current holder of the mint. Balance is in raw (pre-decimal) units.
#[derive(Debug, Clone)]
pub struct HolderRecord {
    pub owner: String,
    pub balance: u64,
    /// Best-effort label from an external classification service.
    pub classification: Option<String>,
}

/// Point-in-time holder snapshot for a mint.
#[derive(Debug, Clone)]
pub struct HolderSnapshot {
    pub top_holders: Vec<HolderRecord>,
    pub total_holders: usize,
}

/// Supply and decimal precision of a mint account.
#[derive(Debug, Clone, Copy)]
pub struct MintInfo {
    pub supply: u64,
    pub decimals: u8,
}

impl MintInfo {
    /// Supply scaled to UI units.
    pub fn total_supply(&self) -> f64 {
        self.supply as f64 / 10f64.powi(self.decimals as i32)
    }
}

/// Statistics for a single detected bundle.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStats {
    /// Representative / controller address of the bundle.
    pub bundle_address: String,
    /// Share of total supply currently held, in [0, 100].
    pub supply_percentage: f64,
    /// SOL deployed across the bundle's resolved transactions.
    pub sol_spent: f64,
    pub unique_wallets: usize,
    /// Current holdings in UI units.
    pub current_holdings: f64,
    /// True when the classification label matches a known launch platform.
    pub is_platform_bundle: bool,
    /// Unix seconds: bundle activity time, or snapshot time for
    /// concentration-only bundles.
    pub timestamp: i64,
}

/// Final ranked analysis for one mint. Immutable once constructed; the
/// result cache hands out clones.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintBundleAnalysis {
    pub mint_address: String,
    pub total_bundles: usize,
    pub total_sol_spent: f64,
    pub total_unique_wallets: usize,
    pub largest_bundle: Option<BundleStats>,
    /// Descending by supply percentage.
    pub bundles: Vec<BundleStats>,
}
