// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Temporal clustering - partition a signature history into candidate runs.

use crate::types::SignatureRecord;

/// A run of signatures that landed within the gap threshold of each other.
/// Always contains at least two signatures.
#[derive(Debug, Clone)]
pub struct TemporalRun {
    pub signatures: Vec<String>,
    /// Earliest block time observed in the run, unix seconds. Fallback
    /// timestamp when no transaction body resolves later.
    pub earliest_block_time: i64,
}

/// Cluster a reverse-chronological signature history.
///
/// Consecutive records (in the ledger's native ordering) join the same run
/// iff their block-time gap is at most `gap_threshold_secs` - the boundary is
/// inclusive. Records without a block time break the current run without
/// joining it; singleton runs are not coordinated activity and are dropped.
pub fn cluster_signatures(
    records: &[SignatureRecord],
    gap_threshold_secs: i64,
) -> Vec<TemporalRun> {
    let mut runs = Vec::new();
    let mut current: Vec<(&str, i64)> = Vec::new();

    for record in records {
        let Some(block_time) = record.block_time else {
            // No adjacency can be established across a missing timestamp.
            flush(&mut current, &mut runs);
            continue;
        };

        if let Some(&(_, prev_time)) = current.last() {
            if (prev_time - block_time).abs() > gap_threshold_secs {
                flush(&mut current, &mut runs);
            }
        }
        current.push((&record.signature, block_time));
    }
    flush(&mut current, &mut runs);

    runs
}

fn flush(current: &mut Vec<(&str, i64)>, runs: &mut Vec<TemporalRun>) {
    if current.len() > 1 {
        let earliest = current
            .iter()
            .map(|&(_, time)| time)
            .min()
            .unwrap_or_default();
        runs.push(TemporalRun {
            signatures: current.iter().map(|&(sig, _)| sig.to_string()).collect(),
            earliest_block_time: earliest,
        });
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(signature: &str, block_time: Option<i64>) -> SignatureRecord {
        SignatureRecord {
            signature: signature.to_string(),
            block_time,
        }
    }

    #[test]
    fn clusters_tight_run_and_excludes_trailing_singleton() {
        // Newest-first history: the three old transactions are 0-1s apart,
        // the newest is 99s away and stays a singleton.
        let records = vec![
            record("d", Some(200)),
            record("c", Some(101)),
            record("b", Some(100)),
            record("a", Some(100)),
        ];

        let runs = cluster_signatures(&records, 1);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].signatures, vec!["c", "b", "a"]);
        assert_eq!(runs[0].earliest_block_time, 100);
    }

    #[test]
    fn gap_of_exactly_threshold_is_inclusive() {
        let records = vec![record("b", Some(101)), record("a", Some(100))];
        let runs = cluster_signatures(&records, 1);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].signatures.len(), 2);
    }

    #[test]
    fn gap_above_threshold_splits() {
        let records = vec![record("b", Some(102)), record("a", Some(100))];
        assert!(cluster_signatures(&records, 1).is_empty());
    }

    #[test]
    fn missing_block_time_breaks_run_without_joining() {
        let records = vec![
            record("e", Some(100)),
            record("d", Some(100)),
            record("c", None),
            record("b", Some(100)),
            record("a", Some(100)),
        ];

        let runs = cluster_signatures(&records, 1);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].signatures, vec!["e", "d"]);
        assert_eq!(runs[1].signatures, vec!["b", "a"]);
        assert!(runs.iter().all(|run| !run.signatures.contains(&"c".to_string())));
    }

    #[test]
    fn fewer_than_two_records_yield_nothing() {
        assert!(cluster_signatures(&[], 1).is_empty());
        assert!(cluster_signatures(&[record("a", Some(100))], 1).is_empty());
    }

    #[test]
    fn all_timestamps_missing_yield_nothing() {
        let records = vec![record("b", None), record("a", None)];
        assert!(cluster_signatures(&records, 1).is_empty());
    }
}
