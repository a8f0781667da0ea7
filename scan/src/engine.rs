//! Bounded-parallel scan of every transactional collection.
//!
//! Every scan is an independent tokio task. A shared semaphore caps how many
//! of them hold a cursor at once; the rest wait for a permit. A single
//! collector loop receives finished units, so result slots and the first
//! error never need a lock.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

use txnstats_store::DocumentStore;
use txnstats_types::{CollectionStats, InProgressStats, LogStats, Report};

use crate::{scan_collection, scan_log, scan_transactions, ScanError};

/// Scans allowed to run at the same time.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Documents fetched per cursor round trip.
pub const DEFAULT_BATCH_SIZE: u32 = 1000;

/// Collections with this prefix are reserved by the database server.
const SYSTEM_PREFIX: &str = "system.";

/// Tuning and naming for one engine run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub concurrency: usize,
    pub batch_size: u32,
    /// The transaction bookkeeping collection.
    pub txns_collection: String,
    /// The transaction log collection.
    pub log_collection: String,
    /// Fail the run if it has not finished by then.
    pub timeout: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            batch_size: DEFAULT_BATCH_SIZE,
            txns_collection: "txns".to_string(),
            log_collection: "txns.log".to_string(),
            timeout: None,
        }
    }
}

impl EngineConfig {
    /// Whether a collection gets queue depth statistics. The bookkeeping
    /// collection has no queues and system collections are not ours.
    pub fn wants_collection_stats(&self, name: &str) -> bool {
        name != self.txns_collection && !name.starts_with(SYSTEM_PREFIX)
    }
}

/// Result of one finished unit of work.
enum Unit {
    /// Queue statistics for the collection at this slot.
    Collection(usize, CollectionStats),
    InProgress(InProgressStats),
    Log(LogStats),
}

type UnitResult = Result<Unit, ScanError>;

pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(mut config: EngineConfig) -> Self {
        config.concurrency = config.concurrency.max(1);
        config.batch_size = config.batch_size.max(1);
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Scan the whole database and build the report.
    ///
    /// Fails on the first error from any scan; tasks still running at that
    /// point are cancelled and no partial report is produced.
    pub async fn run<S: DocumentStore>(&self, store: &S) -> Result<Report, ScanError> {
        let started = Instant::now();
        let report = match self.config.timeout {
            Some(limit) => tokio::time::timeout(limit, self.scan_all(store))
                .await
                .map_err(|_| ScanError::Timeout(limit))??,
            None => self.scan_all(store).await?,
        };
        tracing::info!(
            collections = report.collections.len(),
            txns = report.in_progress.total_txns,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan complete"
        );
        Ok(report)
    }

    /// Sorted names of the collections that get queue statistics.
    pub async fn discover<S: DocumentStore>(&self, store: &S) -> Result<Vec<String>, ScanError> {
        let mut names = store
            .collection_names()
            .await
            .map_err(ScanError::ListCollections)?;
        names.sort();
        names.retain(|name| self.config.wants_collection_stats(name));
        Ok(names)
    }

    async fn scan_all<S: DocumentStore>(&self, store: &S) -> Result<Report, ScanError> {
        let targets = self.discover(store).await?;
        tracing::info!(
            collections = targets.len(),
            concurrency = self.config.concurrency,
            "starting scan"
        );

        let limiter = Arc::new(Semaphore::new(self.config.concurrency));
        let mut tasks = JoinSet::new();
        let batch_size = self.config.batch_size;

        for (slot, name) in targets.iter().enumerate() {
            let collection = store.collection(name);
            spawn_unit(&mut tasks, &limiter, name, async move {
                let stats = scan_collection(&collection, batch_size).await?;
                Ok(Unit::Collection(slot, stats))
            });
        }

        let txns = store.collection(&self.config.txns_collection);
        spawn_unit(&mut tasks, &limiter, &self.config.txns_collection, async move {
            Ok(Unit::InProgress(scan_transactions(&txns, batch_size).await?))
        });

        let log = store.collection(&self.config.log_collection);
        spawn_unit(&mut tasks, &limiter, &self.config.log_collection, async move {
            Ok(Unit::Log(scan_log(&log).await?))
        });

        // Slot i belongs to targets[i] and is written only here.
        let mut slots: Vec<Option<CollectionStats>> = vec![None; targets.len()];
        let mut in_progress = None;
        let mut log = None;

        while let Some(joined) = tasks.join_next().await {
            let unit = match joined {
                Ok(Ok(unit)) => unit,
                Ok(Err(e)) => {
                    tracing::warn!(error = %e, "scan failed, cancelling remaining scans");
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(ScanError::Task(e));
                }
            };
            match unit {
                Unit::Collection(slot, stats) => slots[slot] = Some(stats),
                Unit::InProgress(stats) => in_progress = Some(stats),
                Unit::Log(stats) => log = Some(stats),
            }
        }

        let missing = |what: &str| ScanError::MissingResult(what.to_string());
        let mut report = Report {
            in_progress: in_progress.ok_or_else(|| missing("transaction"))?,
            log: log.ok_or_else(|| missing("log"))?,
            ..Report::default()
        };
        for (name, stats) in targets.into_iter().zip(slots) {
            let stats = stats.ok_or_else(|| missing(name.as_str()))?;
            if stats.has_queued() {
                report.collections.insert(name, stats);
            }
        }
        Ok(report)
    }
}

/// Spawn one unit of work that first waits for a permit from `limiter`.
fn spawn_unit<F>(tasks: &mut JoinSet<UnitResult>, limiter: &Arc<Semaphore>, label: &str, unit: F)
where
    F: Future<Output = UnitResult> + Send + 'static,
{
    let limiter = Arc::clone(limiter);
    let span = tracing::debug_span!("scan_unit", collection = %label);
    tasks.spawn(
        async move {
            let _permit = limiter
                .acquire_owned()
                .await
                .map_err(ScanError::Limiter)?;
            unit.await
        }
        .instrument(span),
    );
}
