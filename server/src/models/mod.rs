pub mod event;

pub use event::{format_instant, parse_instant, Event, EVENT_RECORD_TYPE};
