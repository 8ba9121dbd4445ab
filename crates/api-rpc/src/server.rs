//! JSON-RPC Server
//!
//! Serves the generic command entry point over TCP on localhost.

use crate::handler::RpcHandler;
use crate::types::{CommandRequest, GetQueueRequest, StatsRequest};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use reviewq_core::application::CommandDispatcher;
use reviewq_core::error::{AppError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// Handle to a started server
pub struct RunningRpcServer {
    pub local_addr: SocketAddr,
    pub handle: ServerHandle,
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, dispatcher: Arc<CommandDispatcher>) -> Self {
        Self {
            config,
            handler: Arc::new(RpcHandler::new(dispatcher)),
        }
    }

    /// Start the JSON-RPC server
    ///
    /// Security: intended to bind to 127.0.0.1 only (no external access)
    pub async fn start(self) -> Result<RunningRpcServer> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to build server on {}: {}", addr, e)))?;
        let local_addr = server
            .local_addr()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let mut module = RpcModule::new(());

        // Register methods
        let handler = self.handler.clone();
        module
            .register_async_method("queue.command.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: CommandRequest = params.parse()?;
                    handler.command(req)
                }
            })
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let handler = self.handler.clone();
        module
            .register_async_method("queue.get.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: GetQueueRequest = params.parse()?;
                    handler.get_queue(req)
                }
            })
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let handler = self.handler.clone();
        module
            .register_async_method("admin.stats.v1", move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: StatsRequest = params.parse()?;
                    handler.stats(req)
                }
            })
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let handle = server.start(module);
        info!(%local_addr, "JSON-RPC server started successfully");

        Ok(RunningRpcServer { local_addr, handle })
    }
}
