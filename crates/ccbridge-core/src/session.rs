//! Stream session controller: one CLI request from launch to terminal outcome.
//!
//! The controller subscribes to the request's stream topic before asking the
//! host to launch, then drives a small state machine over the delivered
//! events. Exactly one terminal callback fires per session, and the
//! subscription is released on every exit path.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{Instant, timeout_at};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::bus::{EventBus, Subscription, stream_topic};
use crate::conversation::Message;
use crate::events::{CliMessage, ContentBlock, WireEvent};
use crate::host::{AttachmentFetcher, LaunchRequest, ProcessHost};
use crate::model::{ModelConfig, resolve_model_alias};
use crate::prompt::format_conversation;

/// Hard deadline for one session, measured from the launch request.
pub const STREAM_TIMEOUT: Duration = Duration::from_secs(300);

/// Fallback for `error` events that carry no message.
const GENERIC_STREAM_ERROR: &str = "Claude CLI reported an error";

/// Surfaced when no terminal event arrives within `STREAM_TIMEOUT`.
const TIMEOUT_ERROR: &str = "Claude CLI stream timed out after 300 seconds";

/// Caller hooks for one session.
///
/// `on_chunk` fires zero or more times, in assistant-event order, inline from
/// the event path — keep it fast and non-blocking. Exactly one of
/// `on_complete` / `on_error` fires, at most once, no matter how many
/// terminal-looking events arrive.
pub struct SessionCallbacks {
    pub on_chunk: Box<dyn FnMut(&str) + Send>,
    pub on_complete: Box<dyn FnOnce() + Send>,
    pub on_error: Box<dyn FnOnce(String) + Send>,
}

impl SessionCallbacks {
    pub fn new(
        on_chunk: impl FnMut(&str) + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
        on_error: impl FnOnce(String) + Send + 'static,
    ) -> Self {
        Self {
            on_chunk: Box::new(on_chunk),
            on_complete: Box::new(on_complete),
            on_error: Box::new(on_error),
        }
    }
}

/// Bridges conversations to the Claude CLI through a host runtime.
pub struct StreamController {
    host: Arc<dyn ProcessHost>,
    bus: Arc<dyn EventBus>,
    fetcher: Arc<dyn AttachmentFetcher>,
}

impl StreamController {
    pub fn new(
        host: Arc<dyn ProcessHost>,
        bus: Arc<dyn EventBus>,
        fetcher: Arc<dyn AttachmentFetcher>,
    ) -> Self {
        Self { host, bus, fetcher }
    }

    /// Runs one request end to end.
    ///
    /// Stream errors and the timeout are surfaced through `on_error`; launch
    /// and attachment-fetch failures propagate as `Err` without invoking the
    /// terminal callbacks.
    ///
    /// # Errors
    /// Returns an error if prompt formatting or the launch request fails.
    pub async fn stream_response(
        &self,
        conversation: &[Message],
        config: &ModelConfig,
        callbacks: SessionCallbacks,
    ) -> Result<()> {
        let request_id = Uuid::new_v4().to_string();
        let prompt = format_conversation(conversation, self.fetcher.as_ref())
            .await
            .context("Failed to format conversation prompt")?;
        let model = resolve_model_alias(&config.model_id).map(str::to_string);

        // Subscribe before launching so early events are not missed. The
        // subscription's Drop covers release on the launch-failure path.
        let mut subscription = self.bus.subscribe(&stream_topic(&request_id));

        let request = LaunchRequest {
            request_id: request_id.clone(),
            prompt,
            system_prompt: config.system_prompt.clone(),
            model,
            general_assistant: true,
        };
        debug!(
            target: "ccbridge",
            request_id = %request_id,
            model = ?request.model,
            "Launching CLI stream"
        );
        self.host
            .launch(request)
            .await
            .context("Failed to launch Claude CLI process")?;

        drive_events(&mut subscription, callbacks).await;
        subscription.release();
        Ok(())
    }
}

/// Consumes events until a terminal outcome or the deadline, whichever comes
/// first.
async fn drive_events(subscription: &mut Subscription, callbacks: SessionCallbacks) {
    let deadline = Instant::now() + STREAM_TIMEOUT;
    let mut session = SessionState::new(callbacks);

    while !session.is_completed() {
        match timeout_at(deadline, subscription.recv()).await {
            Ok(Some(event)) => session.handle_event(event),
            Ok(None) => {
                // Producer vanished without a terminal event. The deadline
                // stays the terminal authority for this session.
                tokio::time::sleep_until(deadline).await;
                session.fail(TIMEOUT_ERROR.to_string());
            }
            Err(_) => session.fail(TIMEOUT_ERROR.to_string()),
        }
    }
}

/// Per-session state. The terminal callback pair doubles as the completed
/// flag: taking it out of the `Option` is the check-and-set that makes
/// termination idempotent.
struct SessionState {
    on_chunk: Box<dyn FnMut(&str) + Send>,
    terminal: Option<TerminalCallbacks>,
}

struct TerminalCallbacks {
    on_complete: Box<dyn FnOnce() + Send>,
    on_error: Box<dyn FnOnce(String) + Send>,
}

impl SessionState {
    fn new(callbacks: SessionCallbacks) -> Self {
        Self {
            on_chunk: callbacks.on_chunk,
            terminal: Some(TerminalCallbacks {
                on_complete: callbacks.on_complete,
                on_error: callbacks.on_error,
            }),
        }
    }

    fn is_completed(&self) -> bool {
        self.terminal.is_none()
    }

    fn handle_event(&mut self, event: WireEvent) {
        match event {
            WireEvent::Data { data } => self.handle_data(&data),
            WireEvent::Error { error } => {
                self.fail(error.unwrap_or_else(|| GENERIC_STREAM_ERROR.to_string()));
            }
            // Diagnostics only; never resolves the session.
            WireEvent::Stderr { .. } => {}
            WireEvent::Done { exit_code } => {
                debug!(target: "ccbridge", ?exit_code, "Stream done");
                self.complete();
            }
        }
    }

    fn handle_data(&mut self, payload: &str) {
        let message = match serde_json::from_str::<CliMessage>(payload) {
            Ok(message) => message,
            Err(err) => {
                // The CLI may interleave non-JSON noise on stdout. Drop it.
                debug!(target: "ccbridge", %err, "Dropping undecodable data payload");
                return;
            }
        };
        match message {
            CliMessage::Assistant { message } => {
                for block in message.content {
                    if let ContentBlock::Text { text } = block {
                        (self.on_chunk)(&text);
                    }
                }
            }
            // Init metadata carries no output.
            CliMessage::System { .. } => {}
            // Result text was already streamed through assistant events;
            // re-emitting it would double the output.
            CliMessage::Result { .. } => {}
            CliMessage::Unknown => {
                debug!(target: "ccbridge", "Dropping data payload with unknown type");
            }
        }
    }

    fn complete(&mut self) {
        if let Some(terminal) = self.terminal.take() {
            (terminal.on_complete)();
        }
    }

    fn fail(&mut self, message: String) {
        if let Some(terminal) = self.terminal.take() {
            warn!(target: "ccbridge", %message, "Stream session failed");
            (terminal.on_error)(message);
        }
    }
}
