// Queue Lifecycle Engine - one method per verb
//
// Each method takes the registry guard for its whole critical section and
// returns the reply text. Nothing here performs I/O, so the guard is always
// dropped before the caller delivers the reply.

pub mod render;

use crate::application::registry::{QueueRegistry, RegistryGuard};
use crate::domain::command::ADD_USAGE;
use crate::domain::{DomainError, EntryId, EntryState, QueueEntry, Tag};
use crate::error::Result;
use crate::port::TimeProvider;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub use render::{format_duration, HELP_TEXT, NO_QUEUES, NO_QUEUES_REPORT};

/// How a user id is written when it appears as a tag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionStyle {
    /// `<@U123>`
    #[default]
    Slack,
    /// The id verbatim (`@alice` stays `@alice`)
    Plain,
}

impl MentionStyle {
    pub fn mention(&self, user: &str) -> Tag {
        match self {
            MentionStyle::Slack => format!("<@{}>", user),
            MentionStyle::Plain => user.to_string(),
        }
    }
}

impl std::str::FromStr for MentionStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "slack" => Ok(MentionStyle::Slack),
            "plain" => Ok(MentionStyle::Plain),
            other => Err(format!("unknown mention style: {}", other)),
        }
    }
}

/// Entry counts by derived state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub total: usize,
    pub open: usize,
    pub in_review: usize,
    pub approved: usize,
}

/// Lifecycle engine (injected registry, clock and mention style)
pub struct LifecycleEngine {
    registry: Arc<QueueRegistry>,
    time_provider: Arc<dyn TimeProvider>,
    mention_style: MentionStyle,
}

impl LifecycleEngine {
    pub fn new(
        registry: Arc<QueueRegistry>,
        time_provider: Arc<dyn TimeProvider>,
        mention_style: MentionStyle,
    ) -> Self {
        Self {
            registry,
            time_provider,
            mention_style,
        }
    }

    /// Create a new entry owned by `owner`
    pub fn add(&self, title: &str, link: &str, tags: Vec<Tag>, owner: &str) -> Result<String> {
        if title.trim().is_empty() || link.trim().is_empty() {
            return Err(DomainError::malformed(ADD_USAGE).into());
        }
        let now = self.time_provider.now_millis();

        let entry = {
            let mut guard = self.registry.lock();
            let id = guard.next_id();
            let entry = QueueEntry::new(id, title, link, tags, owner, now);
            guard.insert(entry.clone())?;
            entry
        };

        info!(queue_id = entry.id, owner = %owner, tags = entry.tags.len(), "Queue added");

        Ok(format!(
            "Queue added (ID: {}): *{}*\nMR Link: {}\nTags: {}",
            entry.id,
            entry.title,
            entry.link,
            render::join_tags(&entry.tags)
        ))
    }

    /// Render every entry, or the fixed "no queues" notice
    pub fn list(&self) -> String {
        let guard = self.registry.lock();
        render::list(&guard, self.mention_style)
    }

    pub fn remove(&self, id: EntryId) -> Result<String> {
        let removed = self.registry.lock().remove(id);
        match removed {
            Some(entry) => {
                info!(queue_id = id, title = %entry.title, "Queue removed");
                Ok(format!("Queue {} removed.", id))
            }
            None => Err(DomainError::NotFound(id).into()),
        }
    }

    /// Remove the approving user's tag.
    ///
    /// Find, remove and the emptiness check happen under one lock. An entry
    /// with no tags left is reported as already approved, not as an error.
    pub fn approve(&self, id: EntryId, user: &str) -> Result<String> {
        let mention = self.mention_style.mention(user);
        let now = self.time_provider.now_millis();

        let mut guard = self.registry.lock();
        let entry = guard.get_mut(id).ok_or(DomainError::NotFound(id))?;

        let head = if entry.is_approved() {
            debug!(queue_id = id, user = %user, "Approve on already approved queue");
            format!("Queue {} is already approved; no tags left.", id)
        } else if entry.remove_tag(&mention, now) {
            info!(queue_id = id, user = %user, remaining = entry.tags.len(), "Queue approved");
            if entry.is_approved() {
                format!(
                    "Queue {} approved by {}. All tags cleared; queue is approved.",
                    id, mention
                )
            } else {
                format!(
                    "Queue {} approved by {}. Remaining tags: {}",
                    id,
                    mention,
                    entry.tags.join(", ")
                )
            }
        } else {
            return Err(DomainError::Forbidden(id).into());
        };

        Ok(self.with_listing(head, &guard))
    }

    /// Flag the entry for re-review by its owner
    pub fn review(&self, id: EntryId) -> Result<String> {
        let mut guard = self.registry.lock();
        let entry = guard.get_mut(id).ok_or(DomainError::NotFound(id))?;
        entry.mark_in_review();
        info!(queue_id = id, "Queue in review");

        Ok(self.with_listing(format!("Queue {} is now in review.", id), &guard))
    }

    /// Clear the review flag; tags are left as they are
    pub fn update(&self, id: EntryId) -> Result<String> {
        let mut guard = self.registry.lock();
        let entry = guard.get_mut(id).ok_or(DomainError::NotFound(id))?;
        entry.clear_review();
        info!(queue_id = id, "Queue updated");

        Ok(self.with_listing(
            format!("Queue {} has been updated and is no longer in review.", id),
            &guard,
        ))
    }

    pub fn help(&self) -> String {
        HELP_TEXT.to_string()
    }

    /// Age and derived status of every entry
    pub fn report(&self) -> String {
        let now = self.time_provider.now_millis();
        let guard = self.registry.lock();
        render::report(&guard, now)
    }

    pub fn stats(&self) -> QueueStats {
        let guard = self.registry.lock();
        let mut stats = QueueStats {
            total: guard.len(),
            ..Default::default()
        };
        guard.for_each(|entry| match entry.state() {
            EntryState::Open => stats.open += 1,
            EntryState::InReview => stats.in_review += 1,
            EntryState::Approved => stats.approved += 1,
        });
        stats
    }

    /// Copy of one entry, for callers that need structured state
    pub fn snapshot(&self, id: EntryId) -> Option<QueueEntry> {
        self.registry.lock().get(id).cloned()
    }

    fn with_listing(&self, head: String, guard: &RegistryGuard<'_>) -> String {
        format!("{}\n\n{}", head, render::list(guard, self.mention_style))
    }
}
