//! End-to-end engine tests against an injected ledger fake.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use bundle_checker::error::LedgerError;
use bundle_checker::rpc::LedgerClient;
use bundle_checker::types::{
    HolderRecord, HolderSnapshot, MintInfo, SignatureRecord, TransactionBody,
};
use bundle_checker::{AnalysisError, BundleEngine, EngineConfig};

#[derive(Default)]
struct FakeLedger {
    signatures: Vec<SignatureRecord>,
    transactions: HashMap<String, TransactionBody>,
    mint_info: Option<MintInfo>,
    holders: Vec<HolderRecord>,
    signature_calls: AtomicUsize,
    signature_delay_ms: u64,
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn get_signatures_for_address(
        &self,
        _address: &str,
    ) -> Result<Vec<SignatureRecord>, LedgerError> {
        self.signature_calls.fetch_add(1, Ordering::SeqCst);
        if self.signature_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.signature_delay_ms)).await;
        }
        Ok(self.signatures.clone())
    }

    async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<TransactionBody>, LedgerError> {
        Ok(self.transactions.get(signature).cloned())
    }

    async fn get_mint_account_info(&self, mint: &str) -> Result<MintInfo, LedgerError> {
        self.mint_info
            .ok_or_else(|| LedgerError::NotFound(mint.to_string()))
    }

    async fn get_holders_classification(
        &self,
        _mint: &str,
    ) -> Result<HolderSnapshot, LedgerError> {
        Ok(HolderSnapshot {
            total_holders: self.holders.len(),
            top_holders: self.holders.clone(),
        })
    }
}

fn sig(signature: &str, block_time: i64) -> SignatureRecord {
    SignatureRecord {
        signature: signature.to_string(),
        block_time: Some(block_time),
    }
}

fn tx(signature: &str, signer: &str, pre: u64, post: u64, block_time: i64) -> TransactionBody {
    TransactionBody {
        signature: signature.to_string(),
        account_keys: vec![signer.to_string(), "11111111111111111111111111111111".to_string()],
        block_time: Some(block_time),
        pre_balances: vec![pre, 0],
        post_balances: vec![post, 0],
    }
}

// 1_000_000_000 raw units at 6 decimals -> total supply 1000.0
const MINT_INFO: MintInfo = MintInfo {
    supply: 1_000_000_000,
    decimals: 6,
};

fn engine(ledger: FakeLedger) -> BundleEngine<FakeLedger> {
    BundleEngine::new(Arc::new(ledger), EngineConfig::default())
}

#[tokio::test]
async fn merges_temporal_and_concentration_signals() {
    let ledger = FakeLedger {
        signatures: vec![
            sig("s3", 101),
            sig("s2", 100),
            sig("s1", 100),
            sig("s0", 50), // far gap, singleton, excluded
        ],
        transactions: HashMap::from([
            ("s1".to_string(), tx("s1", "sniperA", 4_000_000_000, 2_000_000_000, 100)),
            ("s2".to_string(), tx("s2", "sniperB", 3_000_000_000, 2_500_000_000, 100)),
            ("s3".to_string(), tx("s3", "sniperA", 2_000_000_000, 2_000_000_000, 101)),
        ]),
        mint_info: Some(MINT_INFO),
        // sniperA holds 100.0 of 1000.0 -> 10%
        holders: vec![HolderRecord {
            owner: "sniperA".to_string(),
            balance: 100_000_000,
            classification: Some("pumpfun bundler".to_string()),
        }],
        ..Default::default()
    };

    let analysis = engine(ledger).analyze("mint").await.expect("analysis");

    assert_eq!(analysis.total_bundles, 1);
    let bundle = &analysis.bundles[0];
    assert_eq!(bundle.bundle_address, "sniperA");
    assert!((bundle.supply_percentage - 10.0).abs() < 1e-9);
    assert!((bundle.sol_spent - 2.5).abs() < 1e-9);
    assert_eq!(bundle.unique_wallets, 2);
    assert!(bundle.is_platform_bundle);
    assert_eq!(bundle.timestamp, 100);
    assert!((bundle.current_holdings - 100.0).abs() < 1e-9);

    let largest = analysis.largest_bundle.expect("largest bundle");
    assert_eq!(largest.bundle_address, "sniperA");
}

#[tokio::test]
async fn unresolvable_bodies_degrade_instead_of_failing() {
    let ledger = FakeLedger {
        signatures: vec![sig("s2", 100), sig("s1", 100)],
        transactions: HashMap::new(), // every getTransaction returns absent
        mint_info: Some(MINT_INFO),
        ..Default::default()
    };

    let analysis = engine(ledger).analyze("mint").await.expect("analysis");

    assert_eq!(analysis.total_bundles, 1);
    let bundle = &analysis.bundles[0];
    assert_eq!(bundle.sol_spent, 0.0);
    assert_eq!(bundle.supply_percentage, 0.0);
    assert_eq!(bundle.unique_wallets, 1);
    assert_eq!(bundle.bundle_address, "s2"); // first signature fallback
}

#[tokio::test]
async fn missing_mint_info_is_fatal() {
    let ledger = FakeLedger {
        signatures: vec![sig("s2", 100), sig("s1", 100)],
        mint_info: None,
        ..Default::default()
    };

    let err = engine(ledger).analyze("bogus").await.expect_err("must fail");
    assert!(matches!(err, AnalysisError::MintNotFound { .. }));
}

#[tokio::test]
async fn empty_history_and_holders_yield_empty_analysis() {
    let ledger = FakeLedger {
        mint_info: Some(MINT_INFO),
        ..Default::default()
    };

    let analysis = engine(ledger).analyze("mint").await.expect("analysis");

    assert_eq!(analysis.total_bundles, 0);
    assert!(analysis.largest_bundle.is_none());
    assert_eq!(analysis.total_sol_spent, 0.0);
    assert_eq!(analysis.total_unique_wallets, 0);
}

#[tokio::test]
async fn concurrent_requests_for_one_mint_coalesce() {
    let ledger = Arc::new(FakeLedger {
        signatures: vec![sig("s2", 100), sig("s1", 100)],
        mint_info: Some(MINT_INFO),
        signature_delay_ms: 30,
        ..Default::default()
    });
    let engine = BundleEngine::new(ledger.clone(), EngineConfig::default());

    let (a, b) = tokio::join!(engine.analyze("mint"), engine.analyze("mint"));

    assert!(a.is_ok() && b.is_ok());
    // Both callers observed the same in-flight computation.
    assert_eq!(1, ledger.signature_calls.load(Ordering::SeqCst));
}

#[tokio::test]
async fn cached_result_is_served_within_ttl() {
    let ledger = Arc::new(FakeLedger {
        signatures: vec![sig("s2", 100), sig("s1", 100)],
        mint_info: Some(MINT_INFO),
        ..Default::default()
    });
    let engine = BundleEngine::new(ledger.clone(), EngineConfig::default());

    engine.analyze("mint").await.expect("first analysis");
    engine.analyze("mint").await.expect("second analysis");

    assert_eq!(1, ledger.signature_calls.load(Ordering::SeqCst));
}

#[tokio::test]
async fn holder_only_bundle_survives_without_temporal_signal() {
    let ledger = FakeLedger {
        mint_info: Some(MINT_INFO),
        // 5% holder with no transaction history at all
        holders: vec![HolderRecord {
            owner: "quietWhale".to_string(),
            balance: 50_000_000,
            classification: None,
        }],
        ..Default::default()
    };

    let analysis = engine(ledger).analyze("mint").await.expect("analysis");

    assert_eq!(analysis.total_bundles, 1);
    let bundle = &analysis.bundles[0];
    assert_eq!(bundle.bundle_address, "quietWhale");
    assert!((bundle.supply_percentage - 5.0).abs() < 1e-9);
    assert_eq!(bundle.sol_spent, 0.0);
    assert!(!bundle.is_platform_bundle);
}
