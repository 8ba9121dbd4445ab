//! Slack Events API envelope types
//!
//! Decoded as explicit tagged variants; anything we do not handle lands in an
//! `Unsupported` arm instead of failing deserialization.

use serde::Deserialize;

/// Outer envelope of an Events API delivery
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SlackEnvelope {
    /// Endpoint ownership handshake
    UrlVerification { challenge: String },
    EventCallback {
        event: InnerEvent,
        #[serde(default)]
        event_id: Option<String>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InnerEvent {
    Message(MessageEvent),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageEvent {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub channel: String,
    /// Edits, joins, bot messages etc. all carry a subtype
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub bot_id: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
}

impl MessageEvent {
    /// Plain user-authored message text, if this event is a candidate command.
    ///
    /// Returns `None` for messages from the bot itself, from other bots, or
    /// with any subtype.
    pub fn command_text(&self, bot_user_id: Option<&str>) -> Option<(&str, &str)> {
        if self.subtype.is_some() || self.bot_id.is_some() || self.channel.is_empty() {
            return None;
        }
        let user = self.user.as_deref()?;
        if bot_user_id == Some(user) {
            return None;
        }
        let text = self.text.as_deref()?.trim();
        (!text.is_empty()).then_some((user, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: serde_json::Value) -> SlackEnvelope {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_url_verification() {
        let env = decode(json!({
            "token": "Jhj5dZrVaK7ZwHHjRyZWjbDl",
            "challenge": "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P",
            "type": "url_verification"
        }));
        assert_eq!(
            env,
            SlackEnvelope::UrlVerification {
                challenge: "3eZbrw1aBm2rZgRNFdxV2595E9CY3gmdALWMmHkvFXO7tYXAYM8P".to_string()
            }
        );
    }

    #[test]
    fn test_decode_message_event() {
        let env = decode(json!({
            "type": "event_callback",
            "team_id": "T1",
            "event_id": "Ev1",
            "event": {
                "type": "message",
                "channel": "C1",
                "user": "U1",
                "text": "queue list",
                "ts": "1355517523.000005",
                "channel_type": "channel"
            }
        }));
        let SlackEnvelope::EventCallback { event, event_id } = env else {
            panic!("expected event callback");
        };
        assert_eq!(event_id.as_deref(), Some("Ev1"));
        let InnerEvent::Message(msg) = event else {
            panic!("expected message event");
        };
        assert_eq!(msg.command_text(Some("UBOT")), Some(("U1", "queue list")));
    }

    #[test]
    fn test_decode_unsupported_inner_event() {
        let env = decode(json!({
            "type": "event_callback",
            "event": { "type": "reaction_added", "user": "U1", "reaction": "thumbsup" }
        }));
        assert!(matches!(
            env,
            SlackEnvelope::EventCallback {
                event: InnerEvent::Unsupported,
                ..
            }
        ));
    }

    #[test]
    fn test_decode_unsupported_envelope() {
        let env = decode(json!({ "type": "app_rate_limited", "minute_rate_limited": 1 }));
        assert_eq!(env, SlackEnvelope::Unsupported);
    }

    #[test]
    fn test_command_text_filters() {
        let base = MessageEvent {
            user: Some("U1".to_string()),
            text: Some("  queue list  ".to_string()),
            channel: "C1".to_string(),
            subtype: None,
            bot_id: None,
            ts: None,
        };
        assert_eq!(base.command_text(None), Some(("U1", "queue list")));

        let own = MessageEvent {
            user: Some("UBOT".to_string()),
            ..base.clone()
        };
        assert_eq!(own.command_text(Some("UBOT")), None);

        let edited = MessageEvent {
            subtype: Some("message_changed".to_string()),
            ..base.clone()
        };
        assert_eq!(edited.command_text(None), None);

        let bot = MessageEvent {
            bot_id: Some("B1".to_string()),
            ..base.clone()
        };
        assert_eq!(bot.command_text(None), None);

        let blank = MessageEvent {
            text: Some("   ".to_string()),
            ..base
        };
        assert_eq!(blank.command_text(None), None);
    }
}
