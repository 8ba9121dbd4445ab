// Reply Sink Port
// Outbound delivery of reply text to a channel. Implemented by chat adapters.

use crate::error::Result;
use async_trait::async_trait;

/// Delivers reply text back to the channel a command came from.
///
/// Callers must never hold the registry lock while awaiting a delivery.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, channel: &str, text: &str) -> Result<()>;
}
