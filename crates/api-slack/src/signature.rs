//! Slack request signature verification
//!
//! `X-Slack-Signature` is `v0=` + hex(HMAC-SHA256(secret, "v0:{timestamp}:{body}")).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests older (or newer) than this are treated as replays
pub const MAX_CLOCK_SKEW_SECS: i64 = 5 * 60;

const VERSION_PREFIX: &str = "v0=";

type HmacSha256 = Hmac<Sha256>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid timestamp header: {0}")]
    InvalidTimestamp(String),

    #[error("timestamp {timestamp} outside allowed window (now {now})")]
    StaleTimestamp { timestamp: i64, now: i64 },

    #[error("malformed signature header")]
    Malformed,

    #[error("signature mismatch")]
    Mismatch,

    #[error("invalid signing secret")]
    InvalidKey,
}

fn mac_for(secret: &str, timestamp: &str, body: &[u8]) -> Result<HmacSha256, SignatureError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(b"v0:");
    mac.update(timestamp.as_bytes());
    mac.update(b":");
    mac.update(body);
    Ok(mac)
}

/// Compute the signature header value Slack would send for this body
pub fn sign(secret: &str, timestamp: &str, body: &[u8]) -> Result<String, SignatureError> {
    let digest = mac_for(secret, timestamp, body)?.finalize().into_bytes();
    Ok(format!("{}{}", VERSION_PREFIX, hex::encode(digest)))
}

/// Verify a delivery. `now_secs` is the current unix time in seconds.
pub fn verify(
    secret: &str,
    timestamp: &str,
    body: &[u8],
    signature: &str,
    now_secs: i64,
) -> Result<(), SignatureError> {
    let ts: i64 = timestamp
        .trim()
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_string()))?;

    // Out-of-range timestamps count as stale
    let skew = now_secs.checked_sub(ts).and_then(i64::checked_abs);
    if skew.map_or(true, |skew| skew > MAX_CLOCK_SKEW_SECS) {
        return Err(SignatureError::StaleTimestamp {
            timestamp: ts,
            now: now_secs,
        });
    }

    let signature_hex = signature
        .strip_prefix(VERSION_PREFIX)
        .ok_or(SignatureError::Malformed)?;
    let expected = hex::decode(signature_hex).map_err(|_| SignatureError::Malformed)?;

    // Constant-time comparison
    mac_for(secret, timestamp, body)?
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}
