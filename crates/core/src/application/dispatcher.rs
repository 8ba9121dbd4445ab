// Command Dispatcher - the coordinator's entry point
//
// Parses text, runs the verb against the lifecycle engine and renders
// failures as plain reply text. Shared by the chat and generic adapters so
// both paths go through one engine and one registry.

use crate::application::lifecycle::LifecycleEngine;
use crate::domain::{parse_command, parse_message, Command, DomainError, UserId};
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info_span, warn};

/// Who issued a command, and where
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub user: UserId,
    pub channel: String,
}

impl Invocation {
    pub fn new(user: impl Into<UserId>, channel: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            channel: channel.into(),
        }
    }
}

/// Classification of a rendered reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    MalformedCommand,
    NotFound,
    Forbidden,
    /// Not a user error; logged and reported generically
    Internal,
}

impl From<&DomainError> for Outcome {
    fn from(err: &DomainError) -> Self {
        match err {
            DomainError::MalformedCommand(_) => Outcome::MalformedCommand,
            DomainError::NotFound(_) => Outcome::NotFound,
            DomainError::Forbidden(_) => Outcome::Forbidden,
        }
    }
}

/// Text to post back to the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub outcome: Outcome,
}

impl Reply {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            outcome: Outcome::Ok,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.outcome == Outcome::Ok
    }
}

impl From<DomainError> for Reply {
    fn from(err: DomainError) -> Self {
        Self {
            outcome: Outcome::from(&err),
            text: err.to_string(),
        }
    }
}

pub struct CommandDispatcher {
    engine: Arc<LifecycleEngine>,
}

impl CommandDispatcher {
    pub fn new(engine: Arc<LifecycleEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &LifecycleEngine {
        &self.engine
    }

    /// Run an already-parsed command.
    ///
    /// Domain failures come back as `AppError::Domain`; anything else is an
    /// internal fault.
    pub fn execute(&self, command: Command, invocation: &Invocation) -> Result<String> {
        let span = info_span!(
            "queue_command",
            verb = %command.verb(),
            user = %invocation.user,
            channel = %invocation.channel
        );
        let _enter = span.enter();

        match command {
            Command::Add { title, link, tags } => {
                self.engine.add(&title, &link, tags, &invocation.user)
            }
            Command::List => Ok(self.engine.list()),
            Command::Remove { id } => self.engine.remove(id),
            Command::Approve { id } => self.engine.approve(id, &invocation.user),
            Command::Review { id } => self.engine.review(id),
            Command::Update { id } => self.engine.update(id),
            Command::Help => Ok(self.engine.help()),
            Command::Report => Ok(self.engine.report()),
        }
    }

    /// Chat path: text must start with the `queue` keyword.
    ///
    /// Returns `None` for ordinary chatter.
    pub fn respond_to_message(&self, text: &str, invocation: &Invocation) -> Option<Reply> {
        match parse_message(text) {
            Ok(Some(command)) => Some(self.render(command, invocation)),
            Ok(None) => None,
            Err(err) => Some(Reply::from(err)),
        }
    }

    /// Generic path: the `queue` keyword is optional and every input gets a reply
    pub fn respond_to_command(&self, text: &str, invocation: &Invocation) -> Reply {
        match parse_command(text) {
            Ok(command) => self.render(command, invocation),
            Err(err) => Reply::from(err),
        }
    }

    fn render(&self, command: Command, invocation: &Invocation) -> Reply {
        match self.execute(command, invocation) {
            Ok(text) => Reply::ok(text),
            Err(AppError::Domain(err)) => Reply::from(err),
            Err(err) => {
                warn!(error = %err, user = %invocation.user, "Command failed");
                Reply {
                    text: "Something went wrong handling that command.".to_string(),
                    outcome: Outcome::Internal,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::lifecycle::{MentionStyle, HELP_TEXT, NO_QUEUES};
    use crate::application::registry::QueueRegistry;
    use crate::port::SystemTimeProvider;

    fn dispatcher() -> CommandDispatcher {
        CommandDispatcher::new(Arc::new(LifecycleEngine::new(
            Arc::new(QueueRegistry::new()),
            Arc::new(SystemTimeProvider),
            MentionStyle::Slack,
        )))
    }

    fn alice() -> Invocation {
        Invocation::new("UALICE", "C1")
    }

    #[test]
    fn test_chatter_gets_no_reply() {
        assert_eq!(dispatcher().respond_to_message("lunch?", &alice()), None);
    }

    #[test]
    fn test_usage_rendered_as_reply() {
        let reply = dispatcher()
            .respond_to_message("queue add OnlyTitle", &alice())
            .unwrap();
        assert_eq!(reply.outcome, Outcome::MalformedCommand);
        assert_eq!(reply.text, "Usage: queue add <title> <MR link> @tag @tag");
    }

    #[test]
    fn test_owner_is_invoking_user() {
        let d = dispatcher();
        let reply = d
            .respond_to_message("queue add Fix http://x <@UBOB>", &alice())
            .unwrap();
        assert!(reply.is_ok());
        assert_eq!(d.engine().snapshot(1).unwrap().owner, "UALICE");
    }

    #[test]
    fn test_approve_matches_invoking_user_mention() {
        let d = dispatcher();
        d.respond_to_message("queue add Fix http://x <@UBOB> <@UCAROL>", &alice());

        let reply = d
            .respond_to_message("queue approve 1", &alice())
            .unwrap();
        assert_eq!(reply.outcome, Outcome::Forbidden);
        assert_eq!(reply.text, "Your tag was not found in queue 1.");

        let reply = d
            .respond_to_message("queue approve 1", &Invocation::new("UBOB", "C1"))
            .unwrap();
        assert!(reply.is_ok());
        assert_eq!(d.engine().snapshot(1).unwrap().tags, vec!["<@UCAROL>"]);
    }

    #[test]
    fn test_not_found_rendered() {
        let reply = dispatcher().respond_to_command("remove 9", &alice());
        assert_eq!(reply.outcome, Outcome::NotFound);
        assert_eq!(reply.text, "Queue 9 not found.");
    }

    #[test]
    fn test_generic_path_shares_state() {
        let d = dispatcher();
        d.respond_to_command("add Fix http://x", &alice());
        let reply = d.respond_to_message("queue list", &alice()).unwrap();
        assert!(reply.text.starts_with("ID: 1 | Title: Fix"));
    }

    #[test]
    fn test_execute_help_and_list() {
        let d = dispatcher();
        assert_eq!(d.execute(Command::Help, &alice()).unwrap(), HELP_TEXT);
        assert_eq!(d.execute(Command::List, &alice()).unwrap(), NO_QUEUES);
    }
}
