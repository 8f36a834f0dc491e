// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Result cache - short-TTL memoization with request coalescing.
//!
//! At most one computation per mint is in flight; concurrent callers await
//! the same per-key cell instead of issuing duplicate ledger traffic. Expiry
//! is lazy (checked on the next lookup) and failed computations are never
//! cached.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;
use tracing::debug;

use crate::error::AnalysisError;
use crate::types::MintBundleAnalysis;

/// Time source, injectable so expiry and staleness stamps are testable.
pub trait Clock: Send + Sync {
    fn unix_now(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

type Slot = Arc<OnceCell<(MintBundleAnalysis, i64)>>;

pub struct AnalysisCache {
    ttl_secs: i64,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, Slot>>,
}

impl AnalysisCache {
    pub fn new(ttl_secs: i64, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl_secs,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached analysis for `mint` when fresh, otherwise run
    /// `compute` - once, no matter how many callers arrive while it is in
    /// flight. A waiter cancelling does not wedge the remaining waiters;
    /// one of them takes over initialization.
    pub async fn get_or_compute<F, Fut>(
        &self,
        mint: &str,
        compute: F,
    ) -> Result<MintBundleAnalysis, AnalysisError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MintBundleAnalysis, AnalysisError>>,
    {
        let slot = self.slot_for(mint);

        let outcome = slot
            .get_or_try_init(|| async move {
                let analysis = compute().await?;
                Ok::<_, AnalysisError>((analysis, self.clock.unix_now()))
            })
            .await;

        match outcome {
            Ok((analysis, _)) => Ok(analysis.clone()),
            Err(e) => {
                self.evict_if_uninitialized(mint, &slot);
                Err(e)
            }
        }
    }

    /// Check-then-insert as one atomic step: the map lock is a short
    /// synchronous critical section; the await on the cell happens outside.
    fn slot_for(&self, mint: &str) -> Slot {
        let now = self.clock.unix_now();
        let mut entries = self.lock_entries();

        if let Some(slot) = entries.get(mint) {
            let expired = slot
                .get()
                .is_some_and(|(_, cached_at)| now - cached_at >= self.ttl_secs);
            if !expired {
                return slot.clone();
            }
            debug!("cache entry for {} expired, recomputing", mint);
        }

        let fresh: Slot = Arc::new(OnceCell::new());
        entries.insert(mint.to_string(), fresh.clone());
        fresh
    }

    /// Drop a slot whose computation failed so the next caller retries.
    fn evict_if_uninitialized(&self, mint: &str, slot: &Slot) {
        let mut entries = self.lock_entries();
        if let Some(current) = entries.get(mint) {
            if Arc::ptr_eq(current, slot) && current.get().is_none() {
                entries.remove(mint);
            }
        }
    }

    fn lock_entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
    use std::time::Duration;

    struct ManualClock {
        now: AtomicI64,
    }

    impl ManualClock {
        fn new(start: i64) -> Self {
            Self {
                now: AtomicI64::new(start),
            }
        }

        fn advance(&self, secs: i64) {
            self.now.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn unix_now(&self) -> i64 {
            self.now.load(Ordering::SeqCst)
        }
    }

    fn analysis(mint: &str) -> MintBundleAnalysis {
        MintBundleAnalysis {
            mint_address: mint.to_string(),
            total_bundles: 0,
            total_sol_spent: 0.0,
            total_unique_wallets: 0,
            largest_bundle: None,
            bundles: Vec::new(),
        }
    }

    #[tokio::test]
    async fn concurrent_callers_share_one_computation() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = AnalysisCache::new(30, clock);
        let computations = AtomicUsize::new(0);

        let compute = || async {
            computations.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(analysis("mint"))
        };
        let compute2 = || async {
            computations.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(analysis("mint"))
        };

        let (a, b) = tokio::join!(
            cache.get_or_compute("mint", compute),
            cache.get_or_compute("mint", compute2),
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(computations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = AnalysisCache::new(30, clock.clone());
        let computations = AtomicUsize::new(0);

        for _ in 0..2 {
            let result = cache
                .get_or_compute("mint", || async {
                    computations.fetch_add(1, Ordering::SeqCst);
                    Ok(analysis("mint"))
                })
                .await;
            assert!(result.is_ok());
        }
        assert_eq!(computations.load(Ordering::SeqCst), 1, "fresh entry served");

        clock.advance(31);
        let result = cache
            .get_or_compute("mint", || async {
                computations.fetch_add(1, Ordering::SeqCst);
                Ok(analysis("mint"))
            })
            .await;
        assert!(result.is_ok());
        assert_eq!(computations.load(Ordering::SeqCst), 2, "expired entry recomputed");
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = AnalysisCache::new(30, clock);

        let failed = cache
            .get_or_compute("mint", || async {
                Err(AnalysisError::MintNotFound {
                    mint: "mint".to_string(),
                    source: LedgerError::NotFound("mint".to_string()),
                })
            })
            .await;
        assert!(failed.is_err());

        let recovered = cache
            .get_or_compute("mint", || async { Ok(analysis("mint")) })
            .await;
        assert!(recovered.is_ok());
    }

    #[tokio::test]
    async fn distinct_mints_do_not_coalesce() {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = AnalysisCache::new(30, clock);
        let computations = AtomicUsize::new(0);

        let (a, b) = tokio::join!(
            cache.get_or_compute("mint-a", || async {
                computations.fetch_add(1, Ordering::SeqCst);
                Ok(analysis("mint-a"))
            }),
            cache.get_or_compute("mint-b", || async {
                computations.fetch_add(1, Ordering::SeqCst);
                Ok(analysis("mint-b"))
            }),
        );

        assert_eq!(a.unwrap().mint_address, "mint-a");
        assert_eq!(b.unwrap().mint_address, "mint-b");
        assert_eq!(computations.load(Ordering::SeqCst), 2);
    }
}
