//! Scan-and-aggregate engine for txnstats.
//!
//! Three scanners reduce one collection each into a statistics record by
//! folding over a document stream:
//! - [`scan_collection`]: queue depth of any transactional collection
//! - [`scan_transactions`]: state histogram of the bookkeeping collection
//! - [`scan_log`]: size of the transaction log
//!
//! The [`Engine`] discovers collections, runs the scanners under a bounded
//! concurrency budget and merges their results into a [`Report`].
//!
//! [`Report`]: txnstats_types::Report

pub mod engine;
pub mod error;
pub mod scanner;

pub use engine::{Engine, EngineConfig, DEFAULT_BATCH_SIZE, DEFAULT_CONCURRENCY};
pub use error::ScanError;
pub use scanner::{scan_collection, scan_log, scan_transactions};
