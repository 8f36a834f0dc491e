// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ledger client adapter - the engine's only external collaborator.

pub mod http;

pub use http::HttpLedgerClient;

use async_trait::async_trait;

use crate::error::LedgerError;
use crate::types::{HolderSnapshot, MintInfo, SignatureRecord, TransactionBody};

/// Read-only view of the ledger. Implementations are expected to be slow,
/// rate-limited and occasionally partial; the engine never assumes a call
/// succeeds. Tests inject fakes through this seam.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Signature history for an address, newest first.
    async fn get_signatures_for_address(
        &self,
        address: &str,
    ) -> Result<Vec<SignatureRecord>, LedgerError>;

    /// Full transaction body. `Ok(None)` means the ledger pruned or never
    /// indexed the transaction - a soft failure, not an error.
    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionBody>, LedgerError>;

    /// Supply and decimals for a mint account.
    async fn get_mint_account_info(&self, mint: &str) -> Result<MintInfo, LedgerError>;

    /// Current top holders with best-effort classification labels.
    async fn get_holders_classification(
        &self,
        mint: &str,
    ) -> Result<HolderSnapshot, LedgerError>;
}
