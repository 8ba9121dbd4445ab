//! Slack Adapter Error Types

use reviewq_core::AppError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered with `ok: false`
    #[error("Slack API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<SlackError> for AppError {
    fn from(err: SlackError) -> Self {
        AppError::Delivery(err.to_string())
    }
}
