use std::time::Duration;
use thiserror::Error;
use tokio::sync::AcquireError;
use tokio::task::JoinError;

use txnstats_store::StoreError;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot list collections")]
    ListCollections(#[source] StoreError),

    #[error("cannot query collection {collection:?}")]
    Query {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("iteration over collection {collection:?} failed")]
    Cursor {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("cannot count items in collection {collection:?}")]
    Count {
        collection: String,
        #[source]
        source: StoreError,
    },

    #[error("scan task did not complete")]
    Task(#[source] JoinError),

    #[error("scan limiter closed")]
    Limiter(#[source] AcquireError),

    #[error("{0} scan produced no result")]
    MissingResult(String),

    #[error("scan did not finish within {0:?}")]
    Timeout(Duration),
}

impl ScanError {
    /// The collection the failure happened on, if it was collection-specific.
    pub fn collection(&self) -> Option<&str> {
        match self {
            Self::Query { collection, .. }
            | Self::Cursor { collection, .. }
            | Self::Count { collection, .. } => Some(collection),
            _ => None,
        }
    }
}
