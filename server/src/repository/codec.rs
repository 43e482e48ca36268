//! Mapping between [`Event`] and stored attribute maps.

use thiserror::Error;

use crate::models::Event;
use crate::store::{AttributeValue, Item, SORT_KEY};

pub const TITLE: &str = "Title";
pub const START_TIME: &str = "StartTime";
pub const CREATED_BY: &str = "CreatedBy";
pub const CREATED: &str = "Created";
pub const MAX_PARTICIPANTS: &str = "MaxParticipants";
pub const SETUP: &str = "Setup";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("missing attribute '{0}'")]
    Missing(&'static str),

    #[error("attribute '{name}' should be {expected}")]
    WrongType {
        name: &'static str,
        expected: &'static str,
    },

    #[error("attribute '{name}' is not a valid count: '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}

pub fn encode(event: &Event) -> Item {
    let mut item = Item::new();
    item.insert(SORT_KEY.to_string(), AttributeValue::S(event.id.clone()));
    item.insert(TITLE.to_string(), AttributeValue::S(event.title.clone()));
    item.insert(
        START_TIME.to_string(),
        AttributeValue::S(event.start_time.clone()),
    );
    item.insert(
        CREATED_BY.to_string(),
        AttributeValue::S(event.created_by.clone()),
    );
    item.insert(CREATED.to_string(), AttributeValue::S(event.created.clone()));

    if let Some(max) = event.max_participants {
        item.insert(
            MAX_PARTICIPANTS.to_string(),
            AttributeValue::N(max.to_string()),
        );
    }
    if let Some(setup) = event.setup.as_ref().filter(|s| !s.is_empty()) {
        item.insert(SETUP.to_string(), AttributeValue::S(setup.clone()));
    }

    item
}

pub fn decode(item: &Item) -> Result<Event, CodecError> {
    let max_participants = match item.get(MAX_PARTICIPANTS) {
        None => None,
        Some(value) => {
            let raw = value.as_n().ok_or(CodecError::WrongType {
                name: MAX_PARTICIPANTS,
                expected: "a number",
            })?;
            let parsed = raw.parse::<u64>().map_err(|_| CodecError::InvalidNumber {
                name: MAX_PARTICIPANTS,
                value: raw.to_string(),
            })?;
            Some(parsed)
        }
    };

    let setup = match item.get(SETUP) {
        None => None,
        Some(_) => Some(optional_string(item, SETUP)?).filter(|s| !s.is_empty()),
    };

    Ok(Event {
        id: required_string(item, SORT_KEY)?,
        title: required_string(item, TITLE)?,
        start_time: required_string(item, START_TIME)?,
        created_by: required_string(item, CREATED_BY)?,
        created: required_string(item, CREATED)?,
        max_participants,
        setup,
    })
}

fn required_string(item: &Item, name: &'static str) -> Result<String, CodecError> {
    match item.get(name) {
        None => Err(CodecError::Missing(name)),
        Some(_) => optional_string(item, name),
    }
}

fn optional_string(item: &Item, name: &'static str) -> Result<String, CodecError> {
    item.get(name)
        .and_then(AttributeValue::as_s)
        .map(str::to_string)
        .ok_or(CodecError::WrongType {
            name,
            expected: "a string",
        })
}
