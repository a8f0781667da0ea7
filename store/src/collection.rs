//! Database and collection traits.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;

use crate::StoreError;

/// A lazy, finite stream of decoded documents backed by a server-side cursor.
///
/// The stream ends when the cursor is exhausted; a failed batch fetch or an
/// undecodable document is yielded as an `Err` item.
pub type DocumentStream<T> = BoxStream<'static, Result<T, StoreError>>;

/// A database holding named collections.
///
/// Implementations must be cheap to share between tasks: collection handles
/// handed out by [`DocumentStore::collection`] are used concurrently.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    type Collection: DocumentCollection + 'static;

    /// Names of every collection visible in the database, in no particular order.
    async fn collection_names(&self) -> Result<Vec<String>, StoreError>;

    /// Handle on the named collection. Does not touch the network.
    fn collection(&self, name: &str) -> Self::Collection;
}

/// Read access to one collection.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    fn name(&self) -> &str;

    /// Stream every document, projecting only `fields` and fetching
    /// `batch_size` documents per round trip.
    async fn find<T>(
        &self,
        fields: &[&str],
        batch_size: u32,
    ) -> Result<DocumentStream<T>, StoreError>
    where
        T: DeserializeOwned + Send + Sync + Unpin + 'static;

    /// Total number of documents.
    async fn count(&self) -> Result<u64, StoreError>;
}
