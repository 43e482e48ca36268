//! Chat surface whose messages live in the key-value store.
//!
//! Messages share the table with events under the `message` record type, so
//! they outlive the process exactly as long as the events they announce.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{ChatSurface, Message, PresentationError, Result};
use crate::store::{AttributeValue, Item, KeyValueStore, PartitionedTable, SORT_KEY};

pub const MESSAGE_RECORD_TYPE: &str = "message";

const CONTENT: &str = "Content";
const AFFORDANCES: &str = "Affordances";
const EDITED: &str = "Edited";
const POSTED: &str = "Posted";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostedMessage {
    pub id: String,
    pub content: String,
    pub affordances: Vec<String>,
    pub edited: bool,
    pub posted: String,
}

impl PostedMessage {
    fn to_item(&self) -> Item {
        let mut item = Item::new();
        item.insert(SORT_KEY.to_string(), AttributeValue::S(self.id.clone()));
        item.insert(CONTENT.to_string(), AttributeValue::S(self.content.clone()));
        item.insert(POSTED.to_string(), AttributeValue::S(self.posted.clone()));
        item.insert(
            EDITED.to_string(),
            AttributeValue::N(u8::from(self.edited).to_string()),
        );
        if !self.affordances.is_empty() {
            item.insert(
                AFFORDANCES.to_string(),
                AttributeValue::S(self.affordances.join(",")),
            );
        }
        item
    }

    fn from_item(item: &Item) -> Result<Self> {
        let id = item
            .get(SORT_KEY)
            .and_then(AttributeValue::as_s)
            .unwrap_or_default()
            .to_string();
        let malformed = |reason: &str| PresentationError::MalformedMessage {
            id: id.clone(),
            reason: reason.to_string(),
        };

        let text = |name: &str| item.get(name).and_then(AttributeValue::as_s);
        let content = text(CONTENT).ok_or_else(|| malformed("missing content"))?;
        let posted = text(POSTED).ok_or_else(|| malformed("missing post time"))?;
        let edited = match item.get(EDITED).and_then(AttributeValue::as_n) {
            Some("0") => false,
            Some("1") => true,
            _ => return Err(malformed("edited flag is not 0 or 1")),
        };
        let affordances = text(AFFORDANCES)
            .map(|list| list.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Self {
            content: content.to_string(),
            posted: posted.to_string(),
            edited,
            affordances,
            id,
        })
    }
}

#[derive(Clone)]
pub struct StoredSurface {
    table: PartitionedTable,
}

impl StoredSurface {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            table: PartitionedTable::new(store),
        }
    }

    /// Messages in a channel, oldest first.
    pub async fn messages(&self, channel: &str) -> Result<Vec<PostedMessage>> {
        let items = self
            .table
            .query_by_type(channel, MESSAGE_RECORD_TYPE)
            .await?;
        let mut messages = items
            .iter()
            .map(PostedMessage::from_item)
            .collect::<Result<Vec<_>>>()?;
        messages.sort_by(|a, b| a.posted.cmp(&b.posted).then_with(|| a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn push(&self, channel: &str, message: Message) -> Result<String> {
        let posted = PostedMessage {
            id: Uuid::new_v4().to_string(),
            content: message.content,
            affordances: message.affordances,
            edited: false,
            posted: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
        };
        self.save(channel, &posted).await?;
        Ok(posted.id)
    }

    async fn save(&self, channel: &str, message: &PostedMessage) -> Result<()> {
        self.table
            .put_item(channel, MESSAGE_RECORD_TYPE, message.to_item())
            .await?;
        Ok(())
    }

    async fn load(&self, channel: &str, id: &str) -> Result<PostedMessage> {
        let item = self
            .table
            .get_item(channel, MESSAGE_RECORD_TYPE, id)
            .await?
            .ok_or_else(|| PresentationError::ArtifactNotFound(id.to_string()))?;
        PostedMessage::from_item(&item)
    }
}

#[async_trait]
impl ChatSurface for StoredSurface {
    async fn post(&self, channel: &str, message: Message) -> Result<()> {
        self.push(channel, message).await?;
        Ok(())
    }

    async fn open_artifact(&self, channel: &str, placeholder: Message) -> Result<String> {
        self.push(channel, placeholder).await
    }

    async fn edit_artifact(&self, channel: &str, id: &str, message: Message) -> Result<()> {
        let mut posted = self.load(channel, id).await?;
        posted.content = message.content;
        posted.affordances = message.affordances;
        posted.edited = true;
        self.save(channel, &posted).await
    }

    async fn find_artifact(&self, channel: &str, id: &str) -> Result<bool> {
        Ok(self
            .table
            .get_item(channel, MESSAGE_RECORD_TYPE, id)
            .await?
            .is_some())
    }

    async fn clear_affordances(&self, channel: &str, id: &str) -> Result<()> {
        let mut posted = self.load(channel, id).await?;
        posted.affordances.clear();
        self.save(channel, &posted).await
    }
}
