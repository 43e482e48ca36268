use crate::models::Event;
use crate::utils::error::AppError;

use super::{Message, JOIN, LEAVE};

pub trait Formatter: Send + Sync {
    /// Shown while an event is being stored.
    fn pending(&self) -> Message;

    fn event(&self, event: &Event) -> Message;

    fn events(&self, events: &[Event]) -> Message;

    fn no_events(&self) -> Message;

    fn deleted(&self, id: &str) -> Message;

    fn failure(&self, error: &AppError) -> Message;
}

/// Markdown rendering used by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainFormatter;

impl PlainFormatter {
    fn details(event: &Event) -> String {
        let mut lines = vec![
            format!("**{}**", event.title),
            format!("Starts: {}", event.start_time),
        ];
        if let Some(max) = event.max_participants {
            lines.push(format!("Max participants: {}", max));
        }
        if let Some(setup) = &event.setup {
            lines.push(format!("Setup: {}", setup));
        }
        lines.push(format!("Created by {} at {}", event.created_by, event.created));
        lines.push(format!("Id: {}", event.id));
        lines.join("\n")
    }
}

impl Formatter for PlainFormatter {
    fn pending(&self) -> Message {
        Message::text("Scheduling event...")
    }

    fn event(&self, event: &Event) -> Message {
        Message {
            content: Self::details(event),
            affordances: vec![JOIN.to_string(), LEAVE.to_string()],
        }
    }

    fn events(&self, events: &[Event]) -> Message {
        let body = events
            .iter()
            .map(|e| format!("- **{}** at {} (id {})", e.title, e.start_time, e.id))
            .collect::<Vec<_>>()
            .join("\n");
        Message::text(format!("Upcoming events:\n{}", body))
    }

    fn no_events(&self) -> Message {
        Message::text("No upcoming events in this channel.")
    }

    fn deleted(&self, id: &str) -> Message {
        Message::text(format!("~~Event {} was deleted.~~", id))
    }

    fn failure(&self, error: &AppError) -> Message {
        match error {
            AppError::ValidationError(errors) => {
                let list = errors
                    .iter()
                    .map(|e| format!("- {}", e))
                    .collect::<Vec<_>>()
                    .join("\n");
                Message::text(format!("Could not run the command:\n{}", list))
            }
            other => Message::text(format!("Error: {}", other.public_message())),
        }
    }
}
