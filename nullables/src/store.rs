//! Nullable store: thread-safe in-memory document database for testing.

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use txnstats_store::{DocumentCollection, DocumentStore, DocumentStream, StoreError};

/// Injected failure for one collection.
#[derive(Clone, Debug)]
enum Fault {
    /// `find` itself fails.
    Find(String),
    /// The cursor yields this many documents, then an error.
    CursorAfter(usize, String),
    /// `count` fails.
    Count(String),
    /// `find` panics, taking its task down with it.
    Panic(String),
}

#[derive(Default)]
struct Inner {
    collections: Mutex<BTreeMap<String, Vec<Value>>>,
    faults: Mutex<HashMap<String, Fault>>,
    listing_fault: Mutex<Option<String>>,
    latency: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    opened: AtomicUsize,
}

/// An in-memory document database for testing.
///
/// Cloning shares the underlying collections, like a pooled client.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Clone, Default)]
pub struct NullStore {
    inner: Arc<Inner>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection so it shows up in the listing.
    pub fn create_collection(&self, name: &str) {
        self.inner
            .collections
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default();
    }

    /// Append documents to a collection, creating it if needed.
    pub fn insert_many(&self, name: &str, docs: impl IntoIterator<Item = Value>) {
        self.inner
            .collections
            .lock()
            .unwrap()
            .entry(name.to_string())
            .or_default()
            .extend(docs);
    }

    pub fn insert(&self, name: &str, doc: Value) {
        self.insert_many(name, [doc]);
    }

    /// Make `find` on the collection fail before any document is returned.
    pub fn fail_find(&self, name: &str, message: &str) {
        self.set_fault(name, Fault::Find(message.to_string()));
    }

    /// Make the collection's cursor fail after yielding `after` documents.
    pub fn fail_cursor_after(&self, name: &str, after: usize, message: &str) {
        self.set_fault(name, Fault::CursorAfter(after, message.to_string()));
    }

    pub fn fail_count(&self, name: &str, message: &str) {
        self.set_fault(name, Fault::Count(message.to_string()));
    }

    /// Make `find` on the collection panic.
    pub fn panic_on_find(&self, name: &str, message: &str) {
        self.set_fault(name, Fault::Panic(message.to_string()));
    }

    /// Make collection enumeration fail.
    pub fn fail_listing(&self, message: &str) {
        *self.inner.listing_fault.lock().unwrap() = Some(message.to_string());
    }

    /// Delay every cursor fetch and count by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock().unwrap() = Some(latency);
    }

    /// Highest number of cursors and counts that were open at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.inner.max_in_flight.load(Ordering::SeqCst)
    }

    /// Cursors and counts currently open.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    /// Total cursors and counts ever opened.
    pub fn operations_started(&self) -> usize {
        self.inner.opened.load(Ordering::SeqCst)
    }

    fn set_fault(&self, name: &str, fault: Fault) {
        self.inner
            .faults
            .lock()
            .unwrap()
            .insert(name.to_string(), fault);
    }
}

#[async_trait]
impl DocumentStore for NullStore {
    type Collection = NullCollection;

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let fault = self.inner.listing_fault.lock().unwrap().clone();
        if let Some(message) = fault {
            return Err(StoreError::Backend(message));
        }
        // Reverse order: callers must not rely on the listing being sorted.
        Ok(self
            .inner
            .collections
            .lock()
            .unwrap()
            .keys()
            .rev()
            .cloned()
            .collect())
    }

    fn collection(&self, name: &str) -> NullCollection {
        NullCollection {
            name: name.to_string(),
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Marks one open operation for the in-flight counters.
struct InFlight {
    inner: Arc<Inner>,
}

impl InFlight {
    fn enter(inner: &Arc<Inner>) -> Self {
        inner.opened.fetch_add(1, Ordering::SeqCst);
        let now = inner.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        inner.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self {
            inner: Arc::clone(inner),
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.inner.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

struct Cursor {
    docs: std::vec::IntoIter<Value>,
    served: usize,
    fail_after: Option<(usize, String)>,
    latency: Option<Duration>,
    _in_flight: InFlight,
}

/// Handle on one in-memory collection.
pub struct NullCollection {
    name: String,
    inner: Arc<Inner>,
}

impl NullCollection {
    fn fault(&self) -> Option<Fault> {
        self.inner.faults.lock().unwrap().get(&self.name).cloned()
    }

    fn latency(&self) -> Option<Duration> {
        *self.inner.latency.lock().unwrap()
    }
}

#[async_trait]
impl DocumentCollection for NullCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn find<T>(
        &self,
        _fields: &[&str],
        _batch_size: u32,
    ) -> Result<DocumentStream<T>, StoreError>
    where
        T: DeserializeOwned + Send + Sync + Unpin + 'static,
    {
        let fail_after = match self.fault() {
            Some(Fault::Find(message)) => return Err(StoreError::Backend(message)),
            Some(Fault::Panic(message)) => panic!("{message}"),
            Some(Fault::CursorAfter(after, message)) => Some((after, message)),
            _ => None,
        };
        // Snapshot at open time, as a server-side cursor would see it.
        let docs = self
            .inner
            .collections
            .lock()
            .unwrap()
            .get(&self.name)
            .cloned()
            .unwrap_or_default();

        let cursor = Cursor {
            docs: docs.into_iter(),
            served: 0,
            fail_after,
            latency: self.latency(),
            _in_flight: InFlight::enter(&self.inner),
        };

        Ok(stream::unfold(Some(cursor), |cursor| async move {
            let mut cursor = cursor?;
            if let Some(latency) = cursor.latency {
                tokio::time::sleep(latency).await;
            }
            if let Some((after, message)) = &cursor.fail_after {
                if cursor.served == *after {
                    return Some((Err(StoreError::Backend(message.clone())), None));
                }
            }
            let doc = cursor.docs.next()?;
            cursor.served += 1;
            let item = serde_json::from_value::<T>(doc)
                .map_err(|e| StoreError::Decode(e.to_string()));
            Some((item, Some(cursor)))
        })
        .boxed())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let _in_flight = InFlight::enter(&self.inner);
        if let Some(latency) = self.latency() {
            tokio::time::sleep(latency).await;
        }
        if let Some(Fault::Count(message)) = self.fault() {
            return Err(StoreError::Backend(message));
        }
        Ok(self
            .inner
            .collections
            .lock()
            .unwrap()
            .get(&self.name)
            .map_or(0, |docs| docs.len() as u64))
    }
}
