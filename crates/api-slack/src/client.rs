//! Slack Web API client (outbound replies)

use crate::error::SlackError;
use async_trait::async_trait;
use reviewq_core::port::ReplySink;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct PostMessageRequest<'a> {
    channel: &'a str,
    text: &'a str,
}

/// Common shape of Web API responses
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
}

impl ApiResponse {
    fn into_result(self) -> Result<Self, SlackError> {
        if self.ok {
            Ok(self)
        } else {
            Err(SlackError::Api(
                self.error.unwrap_or_else(|| "unknown_error".to_string()),
            ))
        }
    }
}

/// Bot-token client for `chat.postMessage` and `auth.test`
#[derive(Clone)]
pub struct SlackClient {
    http: reqwest::Client,
    bot_token: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(bot_token: impl Into<String>) -> Result<Self, SlackError> {
        Self::with_api_base(bot_token, DEFAULT_API_BASE)
    }

    /// Point the client at another base URL (used by tests)
    pub fn with_api_base(
        bot_token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Result<Self, SlackError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            bot_token: bot_token.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// Post plain text to a channel
    pub async fn post_message(&self, channel: &str, text: &str) -> Result<(), SlackError> {
        let response: ApiResponse = self
            .http
            .post(self.url("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&PostMessageRequest { channel, text })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response.into_result()?;
        debug!(channel = %channel, bytes = text.len(), "Message posted");
        Ok(())
    }

    /// Resolve the bot's own user id
    pub async fn auth_test(&self) -> Result<String, SlackError> {
        let response: ApiResponse = self
            .http
            .post(self.url("auth.test"))
            .bearer_auth(&self.bot_token)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        response
            .into_result()?
            .user_id
            .ok_or_else(|| SlackError::Api("auth.test returned no user_id".to_string()))
    }
}

#[async_trait]
impl ReplySink for SlackClient {
    async fn deliver(&self, channel: &str, text: &str) -> reviewq_core::Result<()> {
        self.post_message(channel, text).await.map_err(Into::into)
    }
}
