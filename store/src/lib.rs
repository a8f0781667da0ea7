//! Abstract document-store traits for txnstats.
//!
//! Every backend (MongoDB, in-memory for testing) implements these traits.
//! The scanners depend only on the traits.

pub mod collection;
pub mod error;

pub use collection::{DocumentCollection, DocumentStore, DocumentStream};
pub use error::StoreError;
