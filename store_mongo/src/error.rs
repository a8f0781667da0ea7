use mongodb::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Driver(String),

    #[error("cannot decode document: {0}")]
    Decode(String),

    #[error("cannot connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },
}

impl From<mongodb::error::Error> for MongoError {
    fn from(e: mongodb::error::Error) -> Self {
        match *e.kind {
            ErrorKind::BsonDeserialization(_) => MongoError::Decode(e.to_string()),
            _ => MongoError::Driver(e.to_string()),
        }
    }
}

impl From<MongoError> for txnstats_store::StoreError {
    fn from(e: MongoError) -> Self {
        match e {
            MongoError::Decode(msg) => txnstats_store::StoreError::Decode(msg),
            other => txnstats_store::StoreError::Backend(other.to_string()),
        }
    }
}
