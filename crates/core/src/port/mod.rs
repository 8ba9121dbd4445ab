// Port Layer - Interfaces for external dependencies

pub mod reply_sink;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use reply_sink::ReplySink;
pub use time_provider::{FixedTimeProvider, SystemTimeProvider, TimeProvider};
