// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Typed failure taxonomy for the analysis pipeline.

use thiserror::Error;

/// Errors from the ledger client adapter. Strategy-local failures are
/// absorbed where they occur; only mint-info failures escalate.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("account not found: {0}")]
    NotFound(String),
}

/// Errors surfaced to callers of `BundleEngine::analyze`. The caller gets
/// either a complete (possibly degraded) analysis or exactly one of these.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Mint account info unavailable or the address is malformed. Fatal:
    /// all percentage math depends on a valid total supply.
    #[error("mint not found: {mint}")]
    MintNotFound {
        mint: String,
        #[source]
        source: LedgerError,
    },

    /// A whole-pipeline ledger blocker outside the mint-info path.
    #[error("ledger unavailable: {0}")]
    Ledger(#[from] LedgerError),
}
