//! DynamoDB-backed table.
//!
//! Table schema:
//! - PK: `type` (String), channel concatenated with record type
//! - SK: `uuid` (String)

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue as DynamoValue;
use aws_sdk_dynamodb::Client;
use tracing::{debug, info};

use super::{AttributeValue, Item, KeyValueStore, Result, StoreError, PARTITION_KEY, SORT_KEY};

pub struct DynamoStore {
    client: Client,
    table_name: String,
}

impl DynamoStore {
    pub async fn new(
        table_name: impl Into<String>,
        region: Option<&str>,
        endpoint_url: Option<&str>,
    ) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let config = loader.load().await;

        let client = if let Some(endpoint) = endpoint_url {
            let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamo_config)
        } else {
            Client::new(&config)
        };

        let table_name = table_name.into();
        info!(table = %table_name, "Connected to DynamoDB");

        Ok(Self { client, table_name })
    }
}

fn backend(operation: &'static str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Backend {
        operation,
        message: err.to_string(),
    }
}

fn to_dynamo(item: Item) -> HashMap<String, DynamoValue> {
    item.into_iter()
        .map(|(name, value)| {
            let value = match value {
                AttributeValue::S(s) => DynamoValue::S(s),
                AttributeValue::N(n) => DynamoValue::N(n),
            };
            (name, value)
        })
        .collect()
}

fn from_dynamo(item: HashMap<String, DynamoValue>) -> Result<Item> {
    item.into_iter()
        .map(|(name, value)| match value {
            DynamoValue::S(s) => Ok((name, AttributeValue::S(s))),
            DynamoValue::N(n) => Ok((name, AttributeValue::N(n))),
            other => Err(backend(
                "decode",
                format!("attribute '{}' has unsupported type {:?}", name, other),
            )),
        })
        .collect()
}

#[async_trait]
impl KeyValueStore for DynamoStore {
    async fn query(&self, partition_key: &str) -> Result<Vec<Item>> {
        let mut items = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.table_name)
                .key_condition_expression("#pk = :pk")
                .expression_attribute_names("#pk", PARTITION_KEY)
                .expression_attribute_values(":pk", DynamoValue::S(partition_key.to_string()))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| backend("query", e))?;

            for item in output.items.unwrap_or_default() {
                items.push(from_dynamo(item)?);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!(partition = %partition_key, count = items.len(), "Queried DynamoDB");
        Ok(items)
    }

    async fn get(&self, partition_key: &str, sort_key: &str) -> Result<Option<Item>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(PARTITION_KEY, DynamoValue::S(partition_key.to_string()))
            .key(SORT_KEY, DynamoValue::S(sort_key.to_string()))
            .send()
            .await
            .map_err(|e| backend("get_item", e))?;

        output.item.map(from_dynamo).transpose()
    }

    async fn put(&self, item: Item) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_dynamo(item)))
            .send()
            .await
            .map_err(|e| backend("put_item", e))?;

        Ok(())
    }

    async fn delete(&self, partition_key: &str, sort_key: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(PARTITION_KEY, DynamoValue::S(partition_key.to_string()))
            .key(SORT_KEY, DynamoValue::S(sort_key.to_string()))
            .send()
            .await
            .map_err(|e| backend("delete_item", e))?;

        Ok(())
    }
}
