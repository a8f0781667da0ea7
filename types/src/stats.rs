//! Per-collection statistics accumulated by the scanners.
//!
//! Each accumulator is built by folding documents in one at a time with an
//! `observe` step that takes and returns the accumulator by value.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::TransactionState;

fn is_zero(n: &u64) -> bool {
    *n == 0
}

/// Queue depth statistics for one collection.
///
/// The extrema are zero when no documents were observed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CollectionStats {
    #[serde(skip_serializing_if = "is_zero")]
    pub doc_count: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub max_queued: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub min_queued: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_queued: u64,
}

impl CollectionStats {
    /// Fold in one document with `queue_len` queued tokens.
    pub fn observe(mut self, queue_len: u64) -> Self {
        if self.doc_count == 0 {
            self.min_queued = queue_len;
            self.max_queued = queue_len;
        } else {
            self.min_queued = self.min_queued.min(queue_len);
            self.max_queued = self.max_queued.max(queue_len);
        }
        self.doc_count += 1;
        self.total_queued += queue_len;
        self
    }

    /// Whether any document in the collection has a pending transaction.
    pub fn has_queued(&self) -> bool {
        self.total_queued > 0
    }
}

/// Histogram of transaction states plus operation-count extrema for the
/// bookkeeping collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InProgressStats {
    pub states: BTreeMap<TransactionState, u64>,
    #[serde(skip_serializing_if = "is_zero")]
    pub max_ops: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_ops: u64,
    #[serde(skip_serializing_if = "is_zero")]
    pub total_txns: u64,
}

impl InProgressStats {
    /// Empty histogram with every named state present at zero.
    pub fn new() -> Self {
        Self {
            states: TransactionState::NAMED.iter().map(|s| (*s, 0)).collect(),
            max_ops: 0,
            total_ops: 0,
            total_txns: 0,
        }
    }

    /// Fold in one transaction in `state` carrying `op_count` operations.
    pub fn observe(mut self, state: TransactionState, op_count: u64) -> Self {
        self.total_txns += 1;
        self.total_ops += op_count;
        self.max_ops = self.max_ops.max(op_count);
        *self.states.entry(state).or_default() += 1;
        self
    }

    /// Occurrences of `state`, zero if never seen.
    pub fn count(&self, state: TransactionState) -> u64 {
        self.states.get(&state).copied().unwrap_or(0)
    }

    /// Transactions not yet in a terminal state.
    pub fn pending(&self) -> u64 {
        self.states
            .iter()
            .filter(|(state, _)| !state.is_terminal())
            .map(|(_, n)| n)
            .sum()
    }
}

impl Default for InProgressStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Size of the transaction log collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LogStats {
    #[serde(skip_serializing_if = "is_zero")]
    pub doc_count: u64,
}
