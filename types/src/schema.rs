//! On-disk document shapes of the transaction layer.
//!
//! These are decode-only views: each carries just the fields a scanner
//! projects, and unknown fields are ignored.

use serde::{Deserialize, Deserializer};

use crate::TransactionState;

/// Any document taking part in transactions. The queue holds one token per
/// transaction that has not yet been fully applied to the document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct QueueDoc {
    #[serde(rename = "txn-queue", default, deserialize_with = "null_as_empty")]
    pub queue: Vec<String>,
}

impl QueueDoc {
    /// Fields to project when only the queue is needed.
    pub const FIELDS: &'static [&'static str] = &["txn-queue"];

    pub fn queue_len(&self) -> u64 {
        self.queue.len() as u64
    }
}

/// A document in the transaction bookkeeping collection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TxnDoc {
    #[serde(rename = "s", default, deserialize_with = "null_as_invalid")]
    pub state: TransactionState,
    #[serde(rename = "o", default, deserialize_with = "null_as_empty")]
    pub ops: Vec<TxnOp>,
    #[serde(rename = "n", default)]
    pub nonce: Option<String>,
}

impl TxnDoc {
    /// Fields to project for the in-progress histogram.
    pub const FIELDS: &'static [&'static str] = &["o", "s"];

    pub fn op_count(&self) -> u64 {
        self.ops.len() as u64
    }
}

/// One operation of a transaction. Only the target collection is decoded;
/// the document id, assertion and change payloads are skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct TxnOp {
    #[serde(rename = "c", default)]
    pub collection: String,
}

/// A stored `null` array decodes the same as a missing one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A stored `null` state reads as the zero code.
fn null_as_invalid<'de, D>(deserializer: D) -> Result<TransactionState, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?
        .map(TransactionState::classify)
        .unwrap_or_default())
}
