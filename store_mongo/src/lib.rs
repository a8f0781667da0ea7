//! MongoDB storage backend for txnstats.
//!
//! Implements the traits from `txnstats-store` on top of the official
//! `mongodb` driver. One [`MongoStore`] wraps a pooled client and hands out
//! collection handles that can be read from concurrently.

pub mod database;
pub mod dial;
pub mod error;

pub use database::{MongoCollection, MongoStore};
pub use dial::{dial, Credentials, DialInfo};
pub use error::MongoError;
