//! Slack webhook handlers
//!
//! The reply is computed synchronously by the core (which takes and drops the
//! registry lock), then delivered from a spawned task so the webhook is
//! acknowledged right away and no outbound call ever runs under the lock.

use crate::events::{InnerEvent, MessageEvent, SlackEnvelope};
use crate::signature::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER};
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use reviewq_core::application::{CommandDispatcher, Invocation, Reply};
use reviewq_core::port::{ReplySink, TimeProvider};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Upper bound on webhook body size
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared state for the Slack routes (injected dependencies)
pub struct SlackState {
    pub dispatcher: Arc<CommandDispatcher>,
    pub sink: Arc<dyn ReplySink>,
    pub time_provider: Arc<dyn TimeProvider>,
    pub signing_secret: String,
    /// Our own user id, learned via `auth.test`; messages from it are ignored
    pub bot_user_id: Option<String>,
}

/// Middleware: reject deliveries whose signature does not verify
pub async fn verify_slack_signature(
    State(state): State<Arc<SlackState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let header_value = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
    };
    let (Some(timestamp), Some(sig)) = (header_value(TIMESTAMP_HEADER), header_value(SIGNATURE_HEADER))
    else {
        warn!("Slack request without signature headers");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let now_secs = state.time_provider.now_millis() / 1000;
    if let Err(e) = signature::verify(&state.signing_secret, &timestamp, &bytes, &sig, now_secs) {
        warn!(error = %e, "Slack signature verification failed");
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

/// `POST /slack/events`
pub async fn slack_events_handler(State(state): State<Arc<SlackState>>, body: Bytes) -> Response {
    let request_id = Uuid::new_v4();
    info_span!("slack_event", %request_id).in_scope(|| route_envelope(&state, &body))
}

fn route_envelope(state: &SlackState, body: &[u8]) -> Response {
    let envelope: SlackEnvelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "Failed to parse Slack event");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    match envelope {
        SlackEnvelope::UrlVerification { challenge } => {
            info!("Answering URL verification challenge");
            ([(header::CONTENT_TYPE, "text/plain")], challenge).into_response()
        }
        SlackEnvelope::EventCallback { event, event_id } => {
            debug!(event_id = ?event_id, "Event callback received");
            match event {
                InnerEvent::Message(message) => {
                    handle_message(state, &message);
                }
                InnerEvent::Unsupported => {
                    debug!("Ignoring unsupported inner event");
                }
            }
            StatusCode::OK.into_response()
        }
        SlackEnvelope::Unsupported => {
            warn!("Unsupported Slack envelope type");
            StatusCode::NOT_IMPLEMENTED.into_response()
        }
    }
}

/// Compute the reply for a message event, if it is a queue command
pub fn reply_for(state: &SlackState, message: &MessageEvent) -> Option<Reply> {
    let (user, text) = message.command_text(state.bot_user_id.as_deref())?;
    let invocation = Invocation::new(user, message.channel.as_str());
    let reply = state.dispatcher.respond_to_message(text, &invocation);
    if reply.is_none() {
        debug!(user = %user, "Ignoring non-command message");
    }
    reply
}

/// Post the reply; failures are logged, never retried
pub async fn deliver_reply(sink: &dyn ReplySink, channel: &str, reply: &Reply) {
    match sink.deliver(channel, &reply.text).await {
        Ok(()) => debug!(channel = %channel, outcome = ?reply.outcome, "Reply delivered"),
        Err(e) => warn!(channel = %channel, error = %e, "Failed to deliver reply"),
    }
}

fn handle_message(state: &SlackState, message: &MessageEvent) -> Option<JoinHandle<()>> {
    let reply = reply_for(state, message)?;
    let sink = state.sink.clone();
    let channel = message.channel.clone();
    Some(tokio::spawn(
        async move { deliver_reply(sink.as_ref(), &channel, &reply).await }
            .instrument(tracing::Span::current()),
    ))
}
