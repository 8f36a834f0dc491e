// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! JSON-RPC ledger client over HTTP with bounded retry.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::LedgerError;
use crate::rpc::LedgerClient;
use crate::types::{HolderRecord, HolderSnapshot, MintInfo, SignatureRecord, TransactionBody};

/// Solana JSON-RPC client. Transient transport failures are retried with
/// exponential backoff up to a fixed attempt count; semantic RPC errors are
/// surfaced immediately.
pub struct HttpLedgerClient {
    http: reqwest::Client,
    rpc_url: String,
    classification_url: Option<String>,
    signature_fetch_limit: usize,
    holder_snapshot_limit: usize,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl HttpLedgerClient {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            rpc_url: config.rpc_url.clone(),
            classification_url: config.classification_url.clone(),
            signature_fetch_limit: config.signature_fetch_limit,
            holder_snapshot_limit: config.holder_snapshot_limit,
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }
    }

    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let mut attempt = 0;
        loop {
            match self.rpc_call_once(&body).await {
                Ok(result) => return Ok(result),
                Err(e) if attempt < self.max_retries && is_retryable(&e) => {
                    let delay = self.retry_base_delay * 2u32.saturating_pow(attempt);
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {:?}: {}",
                        method,
                        attempt + 1,
                        self.max_retries,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn rpc_call_once(&self, body: &Value) -> Result<Value, LedgerError> {
        let resp = self
            .http
            .post(&self.rpc_url)
            .json(body)
            .send()
            .await?
            .json::<Value>()
            .await?;

        if let Some(err) = resp.get("error") {
            return Err(LedgerError::Rpc {
                code: err["code"].as_i64().unwrap_or(0),
                message: err["message"].as_str().unwrap_or("unknown").to_string(),
            });
        }

        Ok(resp.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Resolve the owning wallet of a token account.
    async fn token_account_owner(&self, token_account: &str) -> Option<String> {
        let result = self
            .rpc_call(
                "getAccountInfo",
                json!([token_account, { "encoding": "jsonParsed" }]),
            )
            .await
            .ok()?;

        result["value"]["data"]["parsed"]["info"]["owner"]
            .as_str()
            .map(str::to_string)
    }

    /// Best-effort label lookup for an address. Any failure is normal and
    /// resolves to no label.
    async fn classify_address(&self, owner: &str) -> Option<String> {
        let base = self.classification_url.as_ref()?;
        let url = format!("{}/{}", base.trim_end_matches('/'), owner);

        let resp = match self.http.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                debug!("classification lookup failed for {}: {}", owner, e);
                return None;
            }
        };

        let value: Value = resp.json().await.ok()?;
        value["classification"].as_str().map(str::to_string)
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn get_signatures_for_address(
        &self,
        address: &str,
    ) -> Result<Vec<SignatureRecord>, LedgerError> {
        let result = self
            .rpc_call(
                "getSignaturesForAddress",
                json!([address, { "limit": self.signature_fetch_limit }]),
            )
            .await?;

        serde_json::from_value(result)
            .map_err(|e| LedgerError::Malformed(format!("signature list: {}", e)))
    }

    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionBody>, LedgerError> {
        let result = self
            .rpc_call(
                "getTransaction",
                json!([signature, { "encoding": "json", "maxSupportedTransactionVersion": 0 }]),
            )
            .await?;

        if result.is_null() {
            return Ok(None);
        }

        let account_keys = result["transaction"]["message"]["accountKeys"]
            .as_array()
            .map(|keys| {
                keys.iter()
                    .filter_map(|k| k.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Some(TransactionBody {
            signature: signature.to_string(),
            account_keys,
            block_time: result["blockTime"].as_i64(),
            pre_balances: lamport_vec(&result["meta"]["preBalances"]),
            post_balances: lamport_vec(&result["meta"]["postBalances"]),
        }))
    }

    async fn get_mint_account_info(&self, mint: &str) -> Result<MintInfo, LedgerError> {
        let result = self
            .rpc_call("getAccountInfo", json!([mint, { "encoding": "jsonParsed" }]))
            .await?;

        if result["value"].is_null() {
            return Err(LedgerError::NotFound(mint.to_string()));
        }

        let info = &result["value"]["data"]["parsed"]["info"];
        let supply = info["supply"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| LedgerError::Malformed(format!("mint {} has no parsed supply", mint)))?;
        let decimals = info["decimals"]
            .as_u64()
            .ok_or_else(|| LedgerError::Malformed(format!("mint {} has no decimals", mint)))?
            as u8;

        Ok(MintInfo { supply, decimals })
    }

    async fn get_holders_classification(
        &self,
        mint: &str,
    ) -> Result<HolderSnapshot, LedgerError> {
        let result = self
            .rpc_call("getTokenLargestAccounts", json!([mint]))
            .await?;

        let accounts = result["value"]
            .as_array()
            .cloned()
            .ok_or_else(|| LedgerError::Malformed(format!("no largest accounts for {}", mint)))?;

        // The plain RPC exposes no cheap full holder count; the largest-
        // accounts list length is the best available approximation.
        let total_holders = accounts.len();

        let lookups = accounts
            .iter()
            .take(self.holder_snapshot_limit)
            .filter_map(|acc| {
                let token_account = acc["address"].as_str()?.to_string();
                let balance: u64 = acc["amount"].as_str()?.parse().ok()?;
                Some((token_account, balance))
            })
            .map(|(token_account, balance)| async move {
                let owner = self.token_account_owner(&token_account).await?;
                let classification = self.classify_address(&owner).await;
                Some(HolderRecord {
                    owner,
                    balance,
                    classification,
                })
            });

        let top_holders: Vec<HolderRecord> =
            join_all(lookups).await.into_iter().flatten().collect();

        if top_holders.len() < total_holders.min(self.holder_snapshot_limit) {
            debug!(
                "resolved {} of {} holder accounts for {}",
                top_holders.len(),
                total_holders.min(self.holder_snapshot_limit),
                mint
            );
        }

        Ok(HolderSnapshot {
            top_holders,
            total_holders,
        })
    }
}

fn lamport_vec(value: &Value) -> Vec<u64> {
    value
        .as_array()
        .map(|arr| arr.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default()
}

fn is_retryable(error: &LedgerError) -> bool {
    matches!(error, LedgerError::Transport(_))
}
