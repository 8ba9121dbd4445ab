// Queue Entry Domain Model

use serde::{Deserialize, Serialize};

/// Queue entry identifier (monotonic, never reused within a process)
pub type EntryId = u64;

/// Reviewer tag as it appears in chat (e.g. `<@U123>`)
pub type Tag = String;

/// User identifier as delivered by the chat platform
pub type UserId = String;

/// Effective state of an entry.
///
/// There is no stored status field: the state is derived from the tag list
/// and the in-review flag, which are tracked independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryState {
    /// Tags outstanding, not in review
    Open,
    /// Owner flagged the entry for re-examination
    InReview,
    /// No tags left
    Approved,
}

impl std::fmt::Display for EntryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryState::Open => write!(f, "OPEN"),
            EntryState::InReview => write!(f, "IN_REVIEW"),
            EntryState::Approved => write!(f, "APPROVED"),
        }
    }
}

/// One review request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub title: String,
    /// Opaque reference, usually a merge request URL
    pub link: String,
    /// Reviewers still required to approve, in the order they were tagged
    pub tags: Vec<Tag>,
    pub owner: UserId,
    pub in_review: bool,

    pub created_at: i64, // epoch ms
    pub last_approved_at: Option<i64>,
}

impl QueueEntry {
    /// Create a new entry (not in review)
    pub fn new(
        id: EntryId,
        title: impl Into<String>,
        link: impl Into<String>,
        tags: Vec<Tag>,
        owner: impl Into<UserId>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            link: link.into(),
            tags: tags.into_iter().filter(|t| !t.is_empty()).collect(),
            owner: owner.into(),
            in_review: false,
            created_at,
            last_approved_at: None,
        }
    }

    /// Derived state; approval wins over review since `in_review` is never
    /// cleared when the last tag goes away.
    pub fn state(&self) -> EntryState {
        if self.is_approved() {
            EntryState::Approved
        } else if self.in_review {
            EntryState::InReview
        } else {
            EntryState::Open
        }
    }

    pub fn is_approved(&self) -> bool {
        self.tags.is_empty()
    }

    /// Remove the first occurrence of `tag`, keeping the others in order.
    ///
    /// Returns false (and leaves the entry untouched) when the tag is absent.
    pub fn remove_tag(&mut self, tag: &str, now: i64) -> bool {
        match self.tags.iter().position(|t| t == tag) {
            Some(index) => {
                self.tags.remove(index);
                self.last_approved_at = Some(now);
                true
            }
            None => false,
        }
    }

    pub fn mark_in_review(&mut self) {
        self.in_review = true;
    }

    pub fn clear_review(&mut self) {
        self.in_review = false;
    }
}
