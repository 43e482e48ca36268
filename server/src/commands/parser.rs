//! `--option value ...` token parsing.
//!
//! Parsing never fails: whatever could be extracted is returned together with
//! every problem found along the way.

pub const TITLE: &str = "--title";
pub const START_TIME: &str = "--startTime";
pub const MAX_PARTICIPANTS: &str = "--maxParticipants";
pub const SETUP: &str = "--setup";
pub const ID: &str = "--id";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    pub title: Option<String>,
    pub start_time: Option<String>,
    /// Raw text; checked when a create request is validated.
    pub max_participants: Option<String>,
    pub setup: Option<String>,
    pub id: Option<String>,
    pub errors: Vec<String>,
}

/// `--name`; a bare `--` is ordinary text.
fn is_option(token: &str) -> bool {
    token.len() > 2 && token.starts_with("--")
}

/// Reads options from `tokens` with a cursor; the slice is never modified.
///
/// A repeated option keeps its last value.
pub fn parse_options<S: AsRef<str>>(tokens: &[S]) -> ParsedOptions {
    let mut parsed = ParsedOptions::default();
    let mut cursor = 0;

    while cursor < tokens.len() {
        let name = tokens[cursor].as_ref();
        cursor += 1;

        let slot = match name {
            TITLE => &mut parsed.title,
            START_TIME => &mut parsed.start_time,
            MAX_PARTICIPANTS => &mut parsed.max_participants,
            ID => &mut parsed.id,
            SETUP => {
                let end = next_option(tokens, cursor);
                let text = join(&tokens[cursor..end]);
                cursor = end;
                parsed.setup = Some(text).filter(|s| !s.is_empty());
                continue;
            }
            _ => {
                parsed.errors.push(format!("Unrecognized option: {}", name));
                cursor = next_option(tokens, cursor);
                continue;
            }
        };

        match tokens.get(cursor).map(AsRef::as_ref) {
            Some(value) if !is_option(value) => {
                *slot = Some(value.to_string());
                cursor += 1;
            }
            _ => parsed
                .errors
                .push(format!("Missing value for option: {}", name)),
        }
    }

    parsed
}

fn next_option<S: AsRef<str>>(tokens: &[S], from: usize) -> usize {
    tokens[from..]
        .iter()
        .position(|t| is_option(t.as_ref()))
        .map_or(tokens.len(), |offset| from + offset)
}

fn join<S: AsRef<str>>(tokens: &[S]) -> String {
    let joined = tokens
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    joined.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_title_and_start_time() {
        let parsed = parse_options(&["--title", "A", "--startTime", "2025-01-01T00:00:00Z"]);
        assert_eq!(parsed.title.as_deref(), Some("A"));
        assert_eq!(parsed.start_time.as_deref(), Some("2025-01-01T00:00:00Z"));
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_setup_stops_at_next_option() {
        let parsed = parse_options(&["--setup", "step", "one", "--title", "X"]);
        assert_eq!(parsed.setup.as_deref(), Some("step one"));
        assert_eq!(parsed.title.as_deref(), Some("X"));
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_setup_keeps_embedded_double_dash() {
        let parsed = parse_options(&["--setup", "note", "--", "see", "a--b", "--id", "7"]);
        assert_eq!(parsed.setup.as_deref(), Some("note -- see a--b"));
        assert_eq!(parsed.id.as_deref(), Some("7"));
    }

    #[test]
    fn test_unrecognized_option_is_reported() {
        let parsed = parse_options(&["--bogus", "v"]);
        assert_eq!(parsed.errors, vec!["Unrecognized option: --bogus".to_string()]);
        let expected = ParsedOptions {
            errors: parsed.errors.clone(),
            ..ParsedOptions::default()
        };
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_errors_accumulate_and_parsing_continues() {
        let parsed = parse_options(&["--bogus", "--title", "Raid", "--other", "x", "y", "--id"]);
        assert_eq!(parsed.title.as_deref(), Some("Raid"));
        assert_eq!(
            parsed.errors,
            vec![
                "Unrecognized option: --bogus".to_string(),
                "Unrecognized option: --other".to_string(),
                "Missing value for option: --id".to_string(),
            ]
        );
    }

    #[test]
    fn test_missing_value_does_not_swallow_next_option() {
        let parsed = parse_options(&["--title", "--startTime", "2025-01-01"]);
        assert_eq!(parsed.title, None);
        assert_eq!(parsed.start_time.as_deref(), Some("2025-01-01"));
        assert_eq!(parsed.errors, vec!["Missing value for option: --title".to_string()]);
    }

    #[test]
    fn test_stray_value_is_unrecognized() {
        let parsed = parse_options(&["hello", "--id", "9"]);
        assert_eq!(parsed.errors, vec!["Unrecognized option: hello".to_string()]);
        assert_eq!(parsed.id.as_deref(), Some("9"));
    }

    #[test]
    fn test_empty_setup_is_absent() {
        let parsed = parse_options(&["--setup"]);
        assert_eq!(parsed.setup, None);
        assert!(parsed.errors.is_empty());
    }

    #[test]
    fn test_input_is_untouched() {
        let tokens = vec!["--title".to_string(), "A".to_string()];
        let _ = parse_options(&tokens);
        assert_eq!(tokens, vec!["--title".to_string(), "A".to_string()]);
    }
}
