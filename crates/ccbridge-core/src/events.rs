//! Event shapes carried over a request's stream topic.
//!
//! The host runtime forwards the CLI's stdout and stderr as tagged events.
//! `data` payloads are expected to be one JSON message each, but stdout
//! framing is not guaranteed: payloads that fail to decode are dropped by the
//! session controller, never treated as fatal.

use serde::{Deserialize, Serialize};

/// Event published on a request's stream topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WireEvent {
    /// Raw stdout payload, expected (not guaranteed) to be a JSON message.
    Data { data: String },
    /// Producer-reported failure; the message field may be absent.
    Error {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
    /// Diagnostic output. Never affects session state.
    Stderr { data: String },
    /// Terminal event, with the process exit code when known.
    Done {
        #[serde(
            default,
            rename = "exitCode",
            skip_serializing_if = "Option::is_none"
        )]
        exit_code: Option<i64>,
    },
}

/// Decoded `data` payload, tagged by the CLI's message type.
///
/// Unrecognized discriminants land in `Unknown` rather than failing the
/// decode; the controller drops them the same way it drops non-JSON payloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CliMessage {
    /// Session init metadata. Carries no output.
    System {
        #[serde(default)]
        subtype: Option<String>,
        #[serde(default)]
        session_id: Option<String>,
        #[serde(default)]
        model: Option<String>,
    },
    /// Incremental assistant output as ordered content blocks.
    Assistant { message: AssistantMessage },
    /// Final result summary. Its text duplicates what the assistant events
    /// already streamed, so the controller does not re-emit it.
    Result {
        #[serde(default)]
        subtype: Option<String>,
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        error: Option<String>,
    },
    #[serde(other)]
    Unknown,
}

/// Message body of an assistant event.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantMessage {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// Content block inside an assistant message. Only text blocks produce
/// chunks; every other block type is skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}
