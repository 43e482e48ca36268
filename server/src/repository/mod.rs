//! Channel-scoped persistence for events.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{Event, EVENT_RECORD_TYPE};
use crate::store::{KeyValueStore, PartitionedTable, StoreError};

pub mod codec;

pub use codec::{decode, encode, CodecError};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("event '{0}' was not found")]
    NotFound(String),

    #[error("stored event is malformed: {0}")]
    Malformed(#[from] CodecError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Owns every write of event records.
#[derive(Clone)]
pub struct EventRepository {
    table: PartitionedTable,
}

impl EventRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            table: PartitionedTable::new(store),
        }
    }

    /// Writes `event`, replacing any record with the same id.
    pub async fn create(&self, channel: &str, event: &Event) -> Result<String> {
        self.table
            .put_item(channel, EVENT_RECORD_TYPE, encode(event))
            .await?;
        debug!(channel = %channel, id = %event.id, "Stored event");
        Ok(event.id.clone())
    }

    pub async fn read(&self, channel: &str, id: &str) -> Result<Event> {
        let item = self
            .table
            .get_item(channel, EVENT_RECORD_TYPE, id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        Ok(decode(&item)?)
    }

    /// Whether a record with this id is stored, without decoding it.
    pub async fn exists(&self, channel: &str, id: &str) -> Result<bool> {
        Ok(self
            .table
            .get_item(channel, EVENT_RECORD_TYPE, id)
            .await?
            .is_some())
    }

    /// Every event in the channel, in sort-key order.
    ///
    /// A single undecodable record fails the whole listing.
    pub async fn list(&self, channel: &str) -> Result<Vec<Event>> {
        let items = self.table.query_by_type(channel, EVENT_RECORD_TYPE).await?;
        items
            .iter()
            .map(|item| {
                decode(item).map_err(|e| {
                    warn!(channel = %channel, error = %e, "Undecodable event record");
                    RepositoryError::from(e)
                })
            })
            .collect()
    }

    pub async fn delete(&self, channel: &str, id: &str) -> Result<()> {
        self.table
            .delete_item(channel, EVENT_RECORD_TYPE, id)
            .await?;
        debug!(channel = %channel, id = %id, "Deleted event");
        Ok(())
    }
}
