//! Boundary to the chat platform.
//!
//! The controller only talks to the platform through [`ChatSurface`] and only
//! builds message content through [`Formatter`].

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

pub mod format;
pub mod stored;

pub use format::{Formatter, PlainFormatter};
pub use stored::{PostedMessage, StoredSurface};

/// Reactions offered on an active event message.
pub const JOIN: &str = "join";
pub const LEAVE: &str = "leave";

/// Content for one chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub content: String,
    /// Interactive affordances (reactions or buttons) attached to the message.
    pub affordances: Vec<String>,
}

impl Message {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            affordances: Vec::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PresentationError {
    #[error("message '{0}' does not exist in this channel")]
    ArtifactNotFound(String),

    #[error("message '{id}' is malformed: {reason}")]
    MalformedMessage { id: String, reason: String },

    #[error("message store error: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, PresentationError>;

#[async_trait]
pub trait ChatSurface: Send + Sync {
    /// Sends a plain reply to the channel.
    async fn post(&self, channel: &str, message: Message) -> Result<()>;

    /// Opens a new message for an event being created and returns its id,
    /// which becomes the event's id.
    async fn open_artifact(&self, channel: &str, placeholder: Message) -> Result<String>;

    async fn edit_artifact(&self, channel: &str, id: &str, message: Message) -> Result<()>;

    /// Whether a message with this id exists in the channel.
    async fn find_artifact(&self, channel: &str, id: &str) -> Result<bool>;

    async fn clear_affordances(&self, channel: &str, id: &str) -> Result<()>;
}
