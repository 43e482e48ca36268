//! In-process store used for development and tests.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{AttributeValue, Item, KeyValueStore, Result, StoreError, PARTITION_KEY, SORT_KEY};

/// Items ordered by (partition key, sort key), mirroring a range-keyed table.
#[derive(Default)]
pub struct InMemoryStore {
    items: RwLock<BTreeMap<(String, String), Item>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

fn key_of(item: &Item, name: &'static str) -> Result<String> {
    match item.get(name) {
        Some(AttributeValue::S(value)) => Ok(value.clone()),
        _ if name == SORT_KEY => Err(StoreError::MissingSortKey),
        _ => Err(StoreError::Backend {
            operation: "put",
            message: format!("item is missing key attribute '{}'", name),
        }),
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn query(&self, partition_key: &str) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        Ok(items
            .range((partition_key.to_string(), String::new())..)
            .take_while(|((pk, _), _)| pk == partition_key)
            .map(|(_, item)| item.clone())
            .collect())
    }

    async fn get(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>> {
        let items = self.items.read().await;
        Ok(items
            .get(&(partition_key.to_string(), sort_key.to_string()))
            .cloned())
    }

    async fn put(&self, item: Item) -> Result<()> {
        let pk = key_of(&item, PARTITION_KEY)?;
        let sk = key_of(&item, SORT_KEY)?;
        self.items.write().await.insert((pk, sk), item);
        Ok(())
    }

    async fn delete(&self, partition_key: &str, sort_key: &str) -> Result<()> {
        self.items
            .write()
            .await
            .remove(&(partition_key.to_string(), sort_key.to_string()));
        Ok(())
    }
}
