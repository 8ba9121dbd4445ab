//! Slack Events API Adapter
//!
//! Receives signed webhook deliveries, decodes the event envelope, hands
//! queue commands to the core dispatcher and posts replies back with
//! `chat.postMessage`.

pub mod client;
pub mod error;
pub mod events;
pub mod handler;
pub mod server;
pub mod signature;

pub use client::SlackClient;
pub use error::SlackError;
pub use handler::SlackState;
pub use server::{SlackServer, SlackServerConfig};
