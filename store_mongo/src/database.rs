//! `DocumentStore` implementation over a MongoDB database.

use async_trait::async_trait;
use futures_util::{StreamExt, TryStreamExt};
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection, Database};
use serde::de::DeserializeOwned;

use txnstats_store::{DocumentCollection, DocumentStore, DocumentStream, StoreError};

use crate::MongoError;

/// One database on a pooled client. Cloning shares the pool.
#[derive(Clone, Debug)]
pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(client: &Client, database: &str) -> Self {
        Self {
            db: client.database(database),
        }
    }

    pub fn database_name(&self) -> &str {
        self.db.name()
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    type Collection = MongoCollection;

    async fn collection_names(&self) -> Result<Vec<String>, StoreError> {
        let names = self
            .db
            .list_collection_names()
            .await
            .map_err(MongoError::from)?;
        Ok(names)
    }

    fn collection(&self, name: &str) -> MongoCollection {
        MongoCollection {
            inner: self.db.collection::<Document>(name),
        }
    }
}

/// Handle on one collection; safe to move into a task.
#[derive(Clone, Debug)]
pub struct MongoCollection {
    inner: Collection<Document>,
}

fn projection(fields: &[&str]) -> Document {
    let mut projection = Document::new();
    for field in fields {
        projection.insert(*field, 1);
    }
    projection
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn find<T>(
        &self,
        fields: &[&str],
        batch_size: u32,
    ) -> Result<DocumentStream<T>, StoreError>
    where
        T: DeserializeOwned + Send + Sync + Unpin + 'static,
    {
        let cursor = self
            .inner
            .clone_with_type::<T>()
            .find(doc! {})
            .projection(projection(fields))
            .batch_size(batch_size)
            .await
            .map_err(MongoError::from)?;
        Ok(cursor
            .map_err(|e| StoreError::from(MongoError::from(e)))
            .boxed())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let n = self
            .inner
            .count_documents(doc! {})
            .await
            .map_err(MongoError::from)?;
        Ok(n)
    }
}
