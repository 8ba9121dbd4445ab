// Reply rendering for the lifecycle engine
//
// Every function here runs while the caller holds the registry guard, so the
// text reflects one consistent snapshot.

use super::MentionStyle;
use crate::application::registry::RegistryGuard;
use crate::domain::{EntryState, QueueEntry};
use std::fmt::Write;

pub const NO_QUEUES: &str = "No queues available.";
pub const NO_QUEUES_REPORT: &str = "No queues found.";

pub const HELP_TEXT: &str = "Here are the available queue commands:
- `queue add <title> <link> @tag @tag...`: Adds a queue with a title, link, and optional tags (user mentions)
  Example: `queue add \"New Feature\" https://example.com @user1 @user2`
- `queue list`: Lists all queues
- `queue remove <queueID>`: Removes a queue by ID
- `queue approve <queueID>`: Approves a queue by ID (removes your tag)
- `queue review <queueID>`: Marks a queue as under review
- `queue update <queueID>`: Marks a queue as updated and no longer in review
- `queue report`: Shows how long each queue has been waiting
- `queue help`: Displays this help message";

pub(crate) fn join_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "none".to_string()
    } else {
        tags.join(", ")
    }
}

pub(crate) fn entry_line(entry: &QueueEntry, style: MentionStyle) -> String {
    let who = if entry.in_review {
        format!("Owner: {}", style.mention(&entry.owner))
    } else if entry.is_approved() {
        "Tags: none (approved)".to_string()
    } else {
        format!("Tags: {}", entry.tags.join(", "))
    };
    format!(
        "ID: {} | Title: {} | MR: {} | {}",
        entry.id, entry.title, entry.link, who
    )
}

pub(crate) fn list(guard: &RegistryGuard<'_>, style: MentionStyle) -> String {
    if guard.is_empty() {
        return NO_QUEUES.to_string();
    }
    let mut lines = Vec::with_capacity(guard.len());
    guard.for_each(|entry| lines.push(entry_line(entry, style)));
    lines.join("\n")
}

pub(crate) fn report(guard: &RegistryGuard<'_>, now: i64) -> String {
    if guard.is_empty() {
        return NO_QUEUES_REPORT.to_string();
    }
    let mut out = String::from("Queue Report:");
    guard.for_each(|entry| {
        let status = match entry.state() {
            EntryState::Approved => {
                let finished = entry.last_approved_at.unwrap_or(entry.created_at);
                format!("Approved after {}", format_duration(finished - entry.created_at))
            }
            EntryState::InReview => {
                format!("In review for {}", format_duration(now - entry.created_at))
            }
            EntryState::Open => format!(
                "Waiting on {} approval(s) for {}",
                entry.tags.len(),
                format_duration(now - entry.created_at)
            ),
        };
        let _ = write!(
            out,
            "\nID: {} | Title: {} | Status: {}",
            entry.id, entry.title, status
        );
    });
    out
}

/// Human-readable duration, coarsest two units
pub fn format_duration(millis: i64) -> String {
    let secs = millis.max(0) / 1000;
    let (days, hours, mins) = (secs / 86_400, (secs % 86_400) / 3600, (secs % 3600) / 60);

    if days > 0 {
        format!("{}d {}h {}m", days, hours, mins)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else if mins > 0 {
        format!("{}m", mins)
    } else {
        format!("{}s", secs)
    }
}
