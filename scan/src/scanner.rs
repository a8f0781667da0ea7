//! Per-collection scanners.
//!
//! Each scanner opens one cursor and folds the documents it yields into an
//! accumulator owned by the fold. Memory use is bounded by the cursor batch
//! size, not by the collection size. On error the partial accumulator is
//! dropped.

use futures_util::{future, TryStreamExt};

use txnstats_store::{DocumentCollection, DocumentStream};
use txnstats_types::{CollectionStats, InProgressStats, LogStats, QueueDoc, TxnDoc};

use crate::ScanError;

/// Queue depth statistics for one collection.
pub async fn scan_collection<C: DocumentCollection>(
    collection: &C,
    batch_size: u32,
) -> Result<CollectionStats, ScanError> {
    let name = collection.name();
    let docs: DocumentStream<QueueDoc> = collection
        .find(QueueDoc::FIELDS, batch_size)
        .await
        .map_err(|source| ScanError::Query {
            collection: name.to_string(),
            source,
        })?;

    let stats = docs
        .try_fold(CollectionStats::default(), |stats, doc| {
            future::ready(Ok(stats.observe(doc.queue_len())))
        })
        .await
        .map_err(|source| ScanError::Cursor {
            collection: name.to_string(),
            source,
        })?;

    tracing::debug!(
        collection = name,
        docs = stats.doc_count,
        queued = stats.total_queued,
        "scanned collection"
    );
    Ok(stats)
}

/// State histogram and operation counts of the transaction bookkeeping
/// collection.
pub async fn scan_transactions<C: DocumentCollection>(
    collection: &C,
    batch_size: u32,
) -> Result<InProgressStats, ScanError> {
    let name = collection.name();
    let docs: DocumentStream<TxnDoc> = collection
        .find(TxnDoc::FIELDS, batch_size)
        .await
        .map_err(|source| ScanError::Query {
            collection: name.to_string(),
            source,
        })?;

    let stats = docs
        .try_fold(InProgressStats::new(), |stats, txn| {
            future::ready(Ok(stats.observe(txn.state, txn.op_count())))
        })
        .await
        .map_err(|source| ScanError::Cursor {
            collection: name.to_string(),
            source,
        })?;

    tracing::debug!(
        collection = name,
        txns = stats.total_txns,
        pending = stats.pending(),
        "scanned transactions"
    );
    Ok(stats)
}

/// Number of entries in the transaction log.
pub async fn scan_log<C: DocumentCollection>(collection: &C) -> Result<LogStats, ScanError> {
    let doc_count = collection
        .count()
        .await
        .map_err(|source| ScanError::Count {
            collection: collection.name().to_string(),
            source,
        })?;
    tracing::debug!(collection = collection.name(), docs = doc_count, "counted log");
    Ok(LogStats { doc_count })
}
