//! Partitioned key-value storage.
//!
//! Items live in a single table keyed by a partition key (`type`) and a sort
//! key (`uuid`). The partition key is the channel concatenated with the record
//! type, so every record of one kind in one channel can be fetched with a
//! single range query.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod memory;
pub mod postgres;

#[cfg(feature = "dynamo")]
pub mod dynamo;

pub use memory::InMemoryStore;
pub use postgres::PostgresStore;

#[cfg(feature = "dynamo")]
pub use dynamo::DynamoStore;

/// Attribute holding the partition key.
pub const PARTITION_KEY: &str = "type";
/// Attribute holding the sort key.
pub const SORT_KEY: &str = "uuid";

/// A typed attribute value. Numbers travel as strings, as DynamoDB does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    N(String),
}

impl AttributeValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            AttributeValue::N(_) => None,
        }
    }

    pub fn as_n(&self) -> Option<&str> {
        match self {
            AttributeValue::N(n) => Some(n),
            AttributeValue::S(_) => None,
        }
    }
}

/// One stored record, keyed by attribute name.
pub type Item = HashMap<String, AttributeValue>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    #[error("item is missing its sort key attribute 'uuid'")]
    MissingSortKey,

    #[error("stored attributes could not be read: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Raw primitives of a remote key-value table.
///
/// Implementations do not retry; every failure is returned as-is. Deleting an
/// item that does not exist succeeds.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// All items sharing `partition_key`.
    async fn query(&self, partition_key: &str) -> Result<Vec<Item>>;

    async fn get(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>>;

    /// Writes `item`, replacing any existing item with the same keys.
    /// The item must already carry both key attributes.
    async fn put(&self, item: Item) -> Result<()>;

    async fn delete(&self, partition_key: &str, sort_key: &str) -> Result<()>;
}

/// Builds the partition key for a record type within a channel.
///
/// This is plain concatenation: callers must not pick channel and type values
/// whose concatenations collide.
pub fn partition_key(channel: &str, record_type: &str) -> String {
    format!("{}{}", channel, record_type)
}

/// Channel-scoped view over a [`KeyValueStore`].
#[derive(Clone)]
pub struct PartitionedTable {
    store: Arc<dyn KeyValueStore>,
}

impl PartitionedTable {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn query_by_type(&self, channel: &str, record_type: &str) -> Result<Vec<Item>> {
        let pk = partition_key(channel, record_type);
        let items = self.store.query(&pk).await?;
        debug!(partition = %pk, count = items.len(), "Queried partition");
        Ok(items)
    }

    pub async fn get_item(
        &self,
        channel: &str,
        record_type: &str,
        uuid: &str,
    ) -> Result<Option<Item>> {
        let pk = partition_key(channel, record_type);
        self.store.get(&pk, uuid).await
    }

    /// Stores `attributes` under the channel's partition. The sort key must be
    /// present in `attributes`; the partition key is always overwritten.
    pub async fn put_item(
        &self,
        channel: &str,
        record_type: &str,
        mut attributes: Item,
    ) -> Result<()> {
        if !matches!(attributes.get(SORT_KEY), Some(AttributeValue::S(_))) {
            return Err(StoreError::MissingSortKey);
        }
        let pk = partition_key(channel, record_type);
        debug!(partition = %pk, "Putting item");
        attributes.insert(PARTITION_KEY.to_string(), AttributeValue::S(pk));
        self.store.put(attributes).await
    }

    pub async fn delete_item(&self, channel: &str, record_type: &str, uuid: &str) -> Result<()> {
        let pk = partition_key(channel, record_type);
        debug!(partition = %pk, uuid = %uuid, "Deleting item");
        self.store.delete(&pk, uuid).await
    }
}
