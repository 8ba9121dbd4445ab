//! RPC Method Handlers

use crate::error::to_rpc_error;
use crate::types::{
    CommandRequest, CommandResponse, GetQueueRequest, GetQueueResponse, StatsRequest,
    StatsResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use reviewq_core::application::{CommandDispatcher, Invocation};
use reviewq_core::domain::DomainError;
use reviewq_core::error::AppError;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    dispatcher: Arc<CommandDispatcher>,
    start_time: Instant,
}

impl RpcHandler {
    pub fn new(dispatcher: Arc<CommandDispatcher>) -> Self {
        Self {
            dispatcher,
            start_time: Instant::now(),
        }
    }

    /// queue.command.v1
    ///
    /// Domain failures are part of the reply (`outcome`), not RPC errors.
    pub fn command(&self, params: CommandRequest) -> Result<CommandResponse, ErrorObjectOwned> {
        if params.user_id.trim().is_empty() {
            return Err(to_rpc_error(AppError::Validation(
                "user_id must not be empty".to_string(),
            )));
        }
        if params.text.trim().is_empty() {
            return Err(to_rpc_error(AppError::Validation(
                "text must not be empty".to_string(),
            )));
        }

        let invocation = Invocation::new(params.user_id, params.channel);
        let reply = self
            .dispatcher
            .respond_to_command(&params.text, &invocation);
        debug!(user = %invocation.user, outcome = ?reply.outcome, "RPC command handled");

        Ok(CommandResponse {
            reply: reply.text,
            outcome: reply.outcome,
        })
    }

    /// queue.get.v1
    pub fn get_queue(&self, params: GetQueueRequest) -> Result<GetQueueResponse, ErrorObjectOwned> {
        self.dispatcher
            .engine()
            .snapshot(params.id)
            .map(GetQueueResponse::from)
            .ok_or_else(|| to_rpc_error(AppError::Domain(DomainError::NotFound(params.id))))
    }

    /// admin.stats.v1
    pub fn stats(&self, _params: StatsRequest) -> Result<StatsResponse, ErrorObjectOwned> {
        let stats = self.dispatcher.engine().stats();
        Ok(StatsResponse {
            total_queues: stats.total,
            open_queues: stats.open,
            in_review_queues: stats.in_review,
            approved_queues: stats.approved,
            uptime_seconds: self.start_time.elapsed().as_secs(),
        })
    }
}
