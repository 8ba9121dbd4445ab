//! Review Queue Bot - Main Entry Point
//! Wires the shared registry into the Slack adapter and the JSON-RPC entry point.

mod config;

use anyhow::{Context, Result};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::{LogFormat, Settings, CONFIG_PATH_ENV};
use reviewq_api_rpc::{RpcServer, RpcServerConfig};
use reviewq_api_slack::{SlackClient, SlackError, SlackServer, SlackServerConfig, SlackState};
use reviewq_core::application::{
    shutdown_channel, CommandDispatcher, LifecycleEngine, QueueRegistry,
};
use reviewq_core::port::{SystemTimeProvider, TimeProvider};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

type SlackTask = JoinHandle<Result<(), SlackError>>;

/// Why the daemon is leaving its serving loop
#[derive(Debug)]
enum Exit {
    Signal,
    SlackStopped(anyhow::Error),
}

/// Wait for Ctrl+C, or for the Slack server to stop on its own
async fn wait_for_exit<S>(slack_task: Option<&mut SlackTask>, signal: S) -> Result<Exit>
where
    S: Future<Output = std::io::Result<()>>,
{
    match slack_task {
        Some(task) => tokio::select! {
            res = signal => {
                res.context("Failed to listen for shutdown signal")?;
                Ok(Exit::Signal)
            }
            joined = task => Ok(Exit::SlackStopped(match joined {
                Ok(Ok(())) => anyhow::anyhow!("Slack events server exited unexpectedly"),
                Ok(Err(e)) => anyhow::Error::new(e).context("Slack events server failed"),
                Err(e) => anyhow::Error::new(e).context("Slack events server task aborted"),
            })),
        },
        None => {
            signal.await.context("Failed to listen for shutdown signal")?;
            Ok(Exit::Signal)
        }
    }
}

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("reviewq=info,tower_http=info"))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => {
            // Production: JSON structured logging
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .try_init()
        }
        LogFormat::Pretty => {
            // Development: Pretty formatting with colors
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .try_init()
        }
    }
    .context("Failed to install tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config_path = std::env::var(CONFIG_PATH_ENV).ok();
    let settings = Settings::load(config_path.as_deref()).context("Invalid configuration")?;

    // 2. Initialize logging
    init_logging(settings.log.format)?;
    info!("Review queue bot v{} starting...", VERSION);

    // 3. Setup dependencies (DI wiring): one registry behind one engine
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let registry = Arc::new(QueueRegistry::new());
    let engine = Arc::new(LifecycleEngine::new(
        registry,
        time_provider.clone(),
        settings.slack.mention_style,
    ));
    let dispatcher = Arc::new(CommandDispatcher::new(engine));

    let (shutdown_tx, shutdown_rx) = shutdown_channel();

    // 4. Start JSON-RPC server
    let rpc = if settings.rpc.enabled {
        let rpc_config = RpcServerConfig {
            host: settings.rpc.host.clone(),
            port: settings.rpc.port,
        };
        let running = RpcServer::new(rpc_config, dispatcher.clone())
            .start()
            .await
            .context("RPC server start failed")?;
        Some(running)
    } else {
        info!("JSON-RPC entry point disabled");
        None
    };

    // 5. Start Slack events server
    let mut slack_task: Option<SlackTask> = if settings.slack.enabled {
        let (bot_token, signing_secret) = settings.slack.credentials()?;
        let client = SlackClient::new(bot_token).context("Failed to build Slack client")?;

        let bot_user_id = match client.auth_test().await {
            Ok(user_id) => {
                info!(bot_user_id = %user_id, "Authenticated with Slack");
                Some(user_id)
            }
            Err(e) => {
                warn!(error = %e, "Failed to authenticate bot; own messages will not be filtered");
                None
            }
        };

        let state = Arc::new(SlackState {
            dispatcher: dispatcher.clone(),
            sink: Arc::new(client),
            time_provider: time_provider.clone(),
            signing_secret: signing_secret.to_string(),
            bot_user_id,
        });
        let server_config = SlackServerConfig {
            host: settings.slack.host.clone(),
            port: settings.slack.port,
        };
        let token = shutdown_rx.clone();
        Some(tokio::spawn(SlackServer::new(server_config, state).run(token)))
    } else {
        info!("Slack adapter disabled");
        None
    };

    info!("System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal (or a dead Slack server)
    let exit = wait_for_exit(slack_task.as_mut(), tokio::signal::ctrl_c()).await?;
    match &exit {
        Exit::Signal => info!("Shutdown signal received. Exiting gracefully..."),
        Exit::SlackStopped(e) => error!(error = ?e, "Slack events server stopped. Shutting down..."),
    }

    // 7. Graceful shutdown
    shutdown_tx.shutdown();
    if let Some(rpc) = rpc {
        rpc.handle
            .stop()
            .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    }

    match exit {
        Exit::Signal => {
            if let Some(task) = slack_task {
                if tokio::time::timeout(SHUTDOWN_GRACE, task).await.is_err() {
                    warn!("Slack server did not stop within grace period");
                }
            }
            info!("Shutdown complete.");
            Ok(())
        }
        Exit::SlackStopped(e) => Err(e),
    }
}
