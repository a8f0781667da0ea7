//! Fundamental types for txnstats.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! the on-disk document shapes of the transaction layer, the transaction
//! lifecycle states, and the statistics that make up the final report.

pub mod report;
pub mod schema;
pub mod state;
pub mod stats;

pub use report::Report;
pub use schema::{QueueDoc, TxnDoc, TxnOp};
pub use state::TransactionState;
pub use stats::{CollectionStats, InProgressStats, LogStats};
