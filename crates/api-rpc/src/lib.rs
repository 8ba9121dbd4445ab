//! JSON-RPC API Layer
//!
//! Generic entry point for queue commands (`{text, user_id}`), served over
//! JSON-RPC 2.0 on localhost. Runs against the same dispatcher as the Slack
//! adapter, so both paths share one registry.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig, RunningRpcServer};
