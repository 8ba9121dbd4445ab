// Command Parser
//
// Turns raw chat text into a structured command. Pure, no registry access.

use super::entry::{EntryId, Tag};
use super::error::{DomainError, Result};

/// Keyword that addresses the bot in a channel
pub const COMMAND_KEYWORD: &str = "queue";

pub const ADD_USAGE: &str = "Usage: queue add <title> <MR link> @tag @tag";
pub const UNKNOWN_COMMAND: &str = "Unknown command. Try `queue help`.";
pub const INVALID_ID: &str = "Invalid queue ID.";

const OPEN_QUOTES: &[char] = &['"', '\u{201C}'];
const CLOSE_QUOTES: &[char] = &['"', '\u{201D}'];

/// Command verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Add,
    List,
    Remove,
    Approve,
    Review,
    Update,
    Help,
    Report,
}

impl Verb {
    pub const ALL: [Verb; 8] = [
        Verb::Add,
        Verb::List,
        Verb::Remove,
        Verb::Approve,
        Verb::Review,
        Verb::Update,
        Verb::Help,
        Verb::Report,
    ];

    /// Case-insensitive lookup
    pub fn parse(token: &str) -> Option<Verb> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str().eq_ignore_ascii_case(token))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Add => "add",
            Verb::List => "list",
            Verb::Remove => "remove",
            Verb::Approve => "approve",
            Verb::Review => "review",
            Verb::Update => "update",
            Verb::Help => "help",
            Verb::Report => "report",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed queue command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        title: String,
        link: String,
        tags: Vec<Tag>,
    },
    List,
    Remove {
        id: EntryId,
    },
    Approve {
        id: EntryId,
    },
    Review {
        id: EntryId,
    },
    Update {
        id: EntryId,
    },
    Help,
    Report,
}

impl Command {
    pub fn verb(&self) -> Verb {
        match self {
            Command::Add { .. } => Verb::Add,
            Command::List => Verb::List,
            Command::Remove { .. } => Verb::Remove,
            Command::Approve { .. } => Verb::Approve,
            Command::Review { .. } => Verb::Review,
            Command::Update { .. } => Verb::Update,
            Command::Help => Verb::Help,
            Command::Report => Verb::Report,
        }
    }

    /// Build a command from a verb token and its positional arguments
    pub fn from_parts(verb: &str, args: &[String]) -> Result<Command> {
        let verb = Verb::parse(verb).ok_or_else(|| DomainError::malformed(UNKNOWN_COMMAND))?;

        match verb {
            Verb::Add => {
                let [title, link, tags @ ..] = args else {
                    return Err(DomainError::malformed(ADD_USAGE));
                };
                Ok(Command::Add {
                    title: title.clone(),
                    link: link.clone(),
                    tags: tags.to_vec(),
                })
            }
            Verb::List => Ok(Command::List),
            Verb::Help => Ok(Command::Help),
            Verb::Report => Ok(Command::Report),
            Verb::Remove => Ok(Command::Remove {
                id: parse_id(verb, args)?,
            }),
            Verb::Approve => Ok(Command::Approve {
                id: parse_id(verb, args)?,
            }),
            Verb::Review => Ok(Command::Review {
                id: parse_id(verb, args)?,
            }),
            Verb::Update => Ok(Command::Update {
                id: parse_id(verb, args)?,
            }),
        }
    }
}

/// Parse a channel message.
///
/// Returns `Ok(None)` for ordinary chatter that does not start with the
/// `queue` keyword.
pub fn parse_message(text: &str) -> Result<Option<Command>> {
    let tokens = tokenize(text);
    match tokens.split_first() {
        Some((keyword, rest)) if keyword.eq_ignore_ascii_case(COMMAND_KEYWORD) => {
            parse_tokens(rest).map(Some)
        }
        _ => Ok(None),
    }
}

/// Parse a command where the `queue` keyword is optional (generic entry point)
pub fn parse_command(text: &str) -> Result<Command> {
    let tokens = tokenize(text);
    let rest = match tokens.split_first() {
        Some((keyword, rest)) if keyword.eq_ignore_ascii_case(COMMAND_KEYWORD) => rest,
        _ => tokens.as_slice(),
    };
    parse_tokens(rest)
}

fn parse_tokens(tokens: &[String]) -> Result<Command> {
    let (verb, args) = tokens
        .split_first()
        .ok_or_else(|| DomainError::malformed(UNKNOWN_COMMAND))?;
    Command::from_parts(verb, args)
}

fn parse_id(verb: Verb, args: &[String]) -> Result<EntryId> {
    let token = args
        .first()
        .ok_or_else(|| DomainError::malformed(format!("Usage: queue {} <id>", verb)))?;
    token
        .parse::<EntryId>()
        .map_err(|_| DomainError::malformed(INVALID_ID))
}

/// Split on whitespace; a double-quoted run becomes a single token.
/// An unterminated quote runs to the end of the text.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut words = text.split_whitespace();

    while let Some(word) = words.next() {
        let Some(opened) = word.strip_prefix(OPEN_QUOTES) else {
            tokens.push(word.to_string());
            continue;
        };

        if let Some(inner) = opened.strip_suffix(CLOSE_QUOTES) {
            tokens.push(inner.to_string());
            continue;
        }

        let mut parts = vec![opened];
        for next in words.by_ref() {
            if let Some(inner) = next.strip_suffix(CLOSE_QUOTES) {
                parts.push(inner);
                break;
            }
            parts.push(next);
        }
        tokens.push(parts.join(" ").trim().to_string());
    }

    tokens.retain(|t| !t.is_empty());
    tokens
}
