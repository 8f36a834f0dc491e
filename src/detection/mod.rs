// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Bundle detection strategies and their reconciliation.

pub mod aggregator;
pub mod classifier;
pub mod clusterer;
pub mod resolver;

pub use aggregator::aggregate;
pub use classifier::{ConcentrationCandidate, HolderClassifier};
pub use clusterer::{cluster_signatures, TemporalRun};
pub use resolver::{ResolvedBundle, TransactionResolver};
