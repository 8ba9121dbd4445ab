//! Daemon configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then
//! `REVIEWQ__SECTION__KEY` environment variables.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat};
use reviewq_core::application::MentionStyle;
use reviewq_core::error::{AppError, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "~/.reviewq/config.toml";
pub const CONFIG_PATH_ENV: &str = "REVIEWQ_CONFIG";
const ENV_PREFIX: &str = "REVIEWQ";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub slack: SlackSettings,
    pub rpc: RpcSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackSettings {
    pub enabled: bool,
    pub bot_token: Option<String>,
    pub signing_secret: Option<String>,
    pub host: String,
    pub port: u16,
    pub mention_style: MentionStyle,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcSettings {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub format: LogFormat,
}

impl SlackSettings {
    /// Bot token and signing secret, both required when Slack is enabled
    pub fn credentials(&self) -> Result<(&str, &str)> {
        let token = non_empty(self.bot_token.as_deref())
            .ok_or_else(|| AppError::Config("slack.bot_token is not set".to_string()))?;
        let secret = non_empty(self.signing_secret.as_deref())
            .ok_or_else(|| AppError::Config("slack.signing_secret is not set".to_string()))?;
        Ok((token, secret))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl Settings {
    /// Load settings; an explicitly named file must exist, the default one may not
    pub fn load(explicit_path: Option<&str>) -> Result<Self> {
        let (path, required) = match explicit_path {
            Some(path) => (shellexpand::tilde(path).into_owned(), true),
            None => (shellexpand::tilde(DEFAULT_CONFIG_PATH).into_owned(), false),
        };

        let builder = base_builder()
            .map_err(config_error)?
            .add_source(File::new(&path, FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR),
            );

        Self::build(builder)
    }

    /// Load settings from a TOML string over the defaults (no environment)
    pub fn from_toml(toml: &str) -> Result<Self> {
        let builder = base_builder()
            .map_err(config_error)?
            .add_source(File::from_str(toml, FileFormat::Toml));
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error)?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !self.slack.enabled && !self.rpc.enabled {
            return Err(AppError::Config(
                "at least one of slack.enabled or rpc.enabled must be true".to_string(),
            ));
        }
        if self.slack.enabled {
            self.slack.credentials()?;
        }
        Ok(())
    }
}

fn base_builder() -> std::result::Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("slack.enabled", true)?
        .set_default("slack.host", "0.0.0.0")?
        .set_default("slack.port", 3000)?
        .set_default("slack.mention_style", "slack")?
        .set_default("rpc.enabled", true)?
        .set_default("rpc.host", "127.0.0.1")?
        .set_default("rpc.port", 9527)?
        .set_default("log.format", "pretty")
}

fn config_error(err: ConfigError) -> AppError {
    AppError::Config(err.to_string())
}
