//! Review Queue CLI - Command-line client for the review queue bot
//! Talks to the daemon's JSON-RPC entry point.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";

#[derive(Parser)]
#[command(name = "reviewq")]
#[command(about = "Review queue bot CLI", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, global = true, env = "REVIEWQ_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,

    /// Identity the command is issued as (matched against tags on approve)
    #[arg(short, long, global = true, env = "REVIEWQ_USER", default_value = "cli")]
    user: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a merge request to the queue
    Add {
        /// Title (quote it if it contains spaces)
        title: String,

        /// Merge request link
        link: String,

        /// Reviewers who must approve
        tags: Vec<String>,
    },

    /// List all queues
    List,

    /// Remove a queue
    Remove { id: u64 },

    /// Approve a queue as the current user
    Approve { id: u64 },

    /// Mark a queue as in review
    Review { id: u64 },

    /// Mark a queue as updated (no longer in review)
    Update { id: u64 },

    /// Show the bot's help text
    Help,

    /// Show how long each queue has been waiting
    Report,

    /// Show one queue as structured data
    Show { id: u64 },

    /// Show daemon status and queue counts
    Status,
}

impl Commands {
    /// Command text as it would be typed in the channel
    fn to_text(&self) -> Option<String> {
        let text = match self {
            Commands::Add { title, link, tags } => {
                let mut parts = vec!["queue add".to_string(), quote(title), quote(link)];
                parts.extend(tags.iter().map(|t| quote(t)));
                parts.join(" ")
            }
            Commands::List => "queue list".to_string(),
            Commands::Remove { id } => format!("queue remove {}", id),
            Commands::Approve { id } => format!("queue approve {}", id),
            Commands::Review { id } => format!("queue review {}", id),
            Commands::Update { id } => format!("queue update {}", id),
            Commands::Help => "queue help".to_string(),
            Commands::Report => "queue report".to_string(),
            Commands::Show { .. } | Commands::Status => return None,
        };
        Some(text)
    }
}

fn quote(arg: &str) -> String {
    if arg.chars().any(char::is_whitespace) {
        format!("\"{}\"", arg.replace('"', ""))
    } else {
        arg.to_string()
    }
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct CommandResult {
    reply: String,
    outcome: String,
}

#[derive(Deserialize, Tabled)]
struct QueueRow {
    id: u64,
    title: String,
    link: String,
    #[tabled(display_with = "display_tags")]
    tags: Vec<String>,
    owner: String,
    in_review: bool,
    state: String,
}

fn display_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        "-".to_string()
    } else {
        tags.join(", ")
    }
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(text) = cli.command.to_text() {
        let params = json!({
            "text": text,
            "user_id": cli.user,
            "channel": "cli",
        });

        let result = call_rpc(&cli.rpc_url, "queue.command.v1", params).await?;
        let result: CommandResult = serde_json::from_value(result)?;

        if result.outcome == "ok" {
            println!("{}", result.reply);
        } else {
            println!("{} {}", "✗".red().bold(), result.reply.yellow());
            std::process::exit(1);
        }
        return Ok(());
    }

    match cli.command {
        Commands::Show { id } => {
            let result = call_rpc(&cli.rpc_url, "queue.get.v1", json!({ "id": id })).await?;
            let row: QueueRow = serde_json::from_value(result)?;

            let table = Table::new(vec![row]).to_string();
            println!("{}", table);
        }

        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();
                    println!("  {} {}", "Total Queues:".bold(), stats["total_queues"]);
                    println!("  {} {}", "Open:".bold(), stats["open_queues"]);
                    println!("  {} {}", "In Review:".bold(), stats["in_review_queues"]);
                    println!("  {} {}", "Approved:".bold(), stats["approved_queues"]);
                    println!();
                    println!("  {} {} seconds", "Uptime:".bold(), stats["uptime_seconds"]);
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }

        // Text commands were handled above
        _ => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_text_quotes_multiword_title() {
        let cmd = Commands::Add {
            title: "Fix login".to_string(),
            link: "https://git/mr/1".to_string(),
            tags: vec!["@alice".to_string(), "@bob".to_string()],
        };
        assert_eq!(
            cmd.to_text().unwrap(),
            "queue add \"Fix login\" https://git/mr/1 @alice @bob"
        );
    }

    #[test]
    fn test_id_commands_render_verb_and_id() {
        assert_eq!(
            Commands::Approve { id: 3 }.to_text().unwrap(),
            "queue approve 3"
        );
        assert_eq!(Commands::Update { id: 7 }.to_text().unwrap(), "queue update 7");
    }

    #[test]
    fn test_structured_commands_have_no_text() {
        assert!(Commands::Status.to_text().is_none());
        assert!(Commands::Show { id: 1 }.to_text().is_none());
    }

    #[test]
    fn test_cli_parses_user_flag() {
        let cli = Cli::try_parse_from(["reviewq", "--user", "alice", "approve", "2"]).unwrap();
        assert_eq!(cli.user, "alice");
        assert!(matches!(cli.command, Commands::Approve { id: 2 }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "reviewq",
            "approve",
            "2",
            "--user",
            "bob",
            "--rpc-url",
            "http://127.0.0.1:1234",
        ])
        .unwrap();
        assert_eq!(cli.user, "bob");
        assert_eq!(cli.rpc_url, "http://127.0.0.1:1234");
        assert!(matches!(cli.command, Commands::Approve { id: 2 }));
    }
}
