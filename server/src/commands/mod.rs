//! The `event` command namespace: `create`, `list` and `delete`.

pub mod parser;
pub mod validate;

pub use parser::{parse_options, ParsedOptions};
pub use validate::{validate_create, validate_delete, CreateRequest, DeleteRequest};

/// Optional leading namespace word, e.g. `event create --title ...`.
pub const NAMESPACE: &str = "event";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcommand {
    Create,
    List,
    Delete,
}

impl Subcommand {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "create" => Some(Subcommand::Create),
            "list" => Some(Subcommand::List),
            "delete" => Some(Subcommand::Delete),
            _ => None,
        }
    }
}

/// A subcommand and its option tokens, split from raw command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub subcommand: Subcommand,
    pub args: Vec<String>,
}

impl CommandLine {
    /// Splits `text` on whitespace.
    ///
    /// Returns the offending word (or an empty string when no subcommand was
    /// given) if the subcommand is unknown.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut words = text.split_whitespace().peekable();
        if words.peek() == Some(&NAMESPACE) {
            words.next();
        }

        let name = words.next().unwrap_or_default();
        let subcommand = Subcommand::from_name(name).ok_or_else(|| name.to_string())?;

        Ok(Self {
            subcommand,
            args: words.map(str::to_string).collect(),
        })
    }
}
