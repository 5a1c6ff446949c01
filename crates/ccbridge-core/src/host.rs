//! Seams to the surrounding host runtime.
//!
//! Process supervision, IPC transport, and attachment retrieval live outside
//! this crate. The controller only consumes these traits; embedders provide
//! the implementations.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::conversation::Attachment;

/// Launch request handed to the host runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchRequest {
    /// Correlation id for this request; also keys its stream topic.
    pub request_id: String,
    /// Fully formatted prompt.
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    /// Canonical model name; `None` lets the CLI pick its default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Always set by the controller: the CLI runs as a general assistant,
    /// without ambient project context.
    pub general_assistant: bool,
}

/// Host runtime that spawns and supervises the external CLI process.
#[async_trait]
pub trait ProcessHost: Send + Sync {
    /// Starts the CLI for one request. Events for the request are published
    /// on its stream topic as the process runs.
    ///
    /// # Errors
    /// Returns an error if the host rejects or fails the launch. The session
    /// never starts in that case.
    async fn launch(&self, request: LaunchRequest) -> Result<()>;

    /// Side-channel probe of CLI availability, independent of any session.
    ///
    /// Implementations report failure as the all-negative default rather
    /// than returning an error.
    async fn check_availability(&self) -> ToolAvailability {
        ToolAvailability::default()
    }
}

/// Result of the CLI availability probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolAvailability {
    pub available: bool,
    pub version: Option<String>,
    pub authenticated: bool,
}

/// Resolves attachment references to raw text.
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    /// Fetches the content of a text attachment.
    ///
    /// # Errors
    /// Returns an error if the reference cannot be resolved.
    async fn fetch_text(&self, attachment: &Attachment) -> Result<String>;

    /// Fetches the extracted text of a webpage attachment.
    ///
    /// # Errors
    /// Returns an error if the reference cannot be resolved.
    async fn fetch_webpage(&self, attachment: &Attachment) -> Result<String>;
}
