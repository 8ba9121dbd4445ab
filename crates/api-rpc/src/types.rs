//! RPC Request/Response Types

use reviewq_core::application::Outcome;
use reviewq_core::domain::{EntryId, EntryState, QueueEntry};
use serde::{Deserialize, Serialize};

/// Channel recorded for commands that do not come from a chat channel
pub const RPC_CHANNEL: &str = "rpc";

/// queue.command.v1 - Run one queue command
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandRequest {
    pub text: String,
    pub user_id: String,
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_channel() -> String {
    RPC_CHANNEL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub reply: String,
    pub outcome: Outcome,
}

/// queue.get.v1 - Fetch one entry as structured data
#[derive(Debug, Serialize, Deserialize)]
pub struct GetQueueRequest {
    pub id: EntryId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetQueueResponse {
    pub id: EntryId,
    pub title: String,
    pub link: String,
    pub tags: Vec<String>,
    pub owner: String,
    pub in_review: bool,
    pub state: EntryState,
    pub created_at: i64,
}

impl From<QueueEntry> for GetQueueResponse {
    fn from(entry: QueueEntry) -> Self {
        Self {
            state: entry.state(),
            id: entry.id,
            title: entry.title,
            link: entry.link,
            tags: entry.tags,
            owner: entry.owner,
            in_review: entry.in_review,
            created_at: entry.created_at,
        }
    }
}

/// admin.stats.v1 - Queue counts
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StatsRequest {
    // No parameters needed
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_queues: usize,
    pub open_queues: usize,
    pub in_review_queues: usize,
    pub approved_queues: usize,
    pub uptime_seconds: u64,
}
