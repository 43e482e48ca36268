//! Per-command validation of parsed options.

use std::num::IntErrorKind;

use super::parser::{self, ParsedOptions};
use crate::models::parse_instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRequest {
    pub title: String,
    pub start_time: String,
    pub max_participants: Option<u64>,
    pub setup: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteRequest {
    pub id: String,
}

/// Builds a create request, or every reason it cannot be built.
///
/// Parser errors are carried over ahead of validation errors.
pub fn validate_create(options: ParsedOptions) -> Result<CreateRequest, Vec<String>> {
    let mut errors = options.errors;

    let title = options.title.filter(|t| !t.trim().is_empty());
    if title.is_none() {
        errors.push(format!("Missing required option: {}", parser::TITLE));
    }

    match options.start_time.as_deref() {
        None => errors.push(format!("Missing required option: {}", parser::START_TIME)),
        Some(raw) if parse_instant(raw).is_none() => errors.push(format!(
            "Invalid {} '{}': expected an ISO-8601 timestamp",
            parser::START_TIME,
            raw
        )),
        Some(_) => {}
    }

    let max_participants = match options.max_participants.as_deref() {
        None => None,
        Some(raw) => match raw.parse::<u64>() {
            Ok(max) => Some(max),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => {
                errors.push(format!(
                    "Invalid {} '{}': value is too large (maximum {})",
                    parser::MAX_PARTICIPANTS,
                    raw,
                    u64::MAX
                ));
                None
            }
            Err(_) => {
                errors.push(format!(
                    "Invalid {} '{}': expected a non-negative integer",
                    parser::MAX_PARTICIPANTS,
                    raw
                ));
                None
            }
        },
    };

    match (title, options.start_time) {
        (Some(title), Some(start_time)) if errors.is_empty() => Ok(CreateRequest {
            title,
            start_time,
            max_participants,
            setup: options.setup,
        }),
        _ => Err(errors),
    }
}

pub fn validate_delete(options: ParsedOptions) -> Result<DeleteRequest, Vec<String>> {
    let mut errors = options.errors;
    let id = options.id.filter(|id| !id.is_empty());
    if id.is_none() {
        errors.push(format!("Missing required option: {}", parser::ID));
    }

    match id {
        Some(id) if errors.is_empty() => Ok(DeleteRequest { id }),
        _ => Err(errors),
    }
}
