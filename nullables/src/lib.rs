//! Nullable infrastructure for deterministic testing.
//!
//! The scanners only ever see the `txnstats-store` traits. This crate
//! provides an in-memory implementation of them that:
//! - Returns deterministic documents
//! - Can be made to fail or slow down programmatically
//! - Never touches the network
//!
//! Usage: swap a dialed `MongoStore` for a [`NullStore`] in tests.

pub mod store;

pub use store::{NullCollection, NullStore};
