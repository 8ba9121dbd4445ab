// Domain Layer - Pure business logic and entities

pub mod command;
pub mod entry;
pub mod error;

// Re-exports
pub use command::{parse_command, parse_message, Command, Verb};
pub use entry::{EntryId, EntryState, QueueEntry, Tag, UserId};
pub use error::DomainError;
