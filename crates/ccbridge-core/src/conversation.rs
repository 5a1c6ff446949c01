//! Conversation data model shared by the formatter and the session controller.

use serde::{Deserialize, Serialize};

/// A single turn in a conversation, tagged by role.
///
/// Turn order is semantically meaningful; callers pass turns in the order they
/// occurred and the formatter preserves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    /// End-user turn; the only role that carries attachments.
    User {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attachments: Vec<Attachment>,
    },
    /// Assistant turn, plain text.
    Assistant { content: String },
    /// Tool output fed back into the conversation, plain text.
    ToolResults { content: String },
}

impl Message {
    /// Creates a user message without attachments.
    pub fn user(content: impl Into<String>) -> Self {
        Self::User {
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    /// Creates a user message with attachments.
    pub fn user_with_attachments(
        content: impl Into<String>,
        attachments: Vec<Attachment>,
    ) -> Self {
        Self::User {
            content: content.into(),
            attachments,
        }
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant {
            content: content.into(),
        }
    }

    /// Creates a tool-results message.
    pub fn tool_results(content: impl Into<String>) -> Self {
        Self::ToolResults {
            content: content.into(),
        }
    }
}

/// Attachment kinds accepted on user messages.
///
/// Only `Text` and `Webpage` resolve to raw text; `Image` and `Pdf` degrade to
/// a placeholder annotation in the formatted prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    Text,
    Webpage,
    Image,
    Pdf,
}

impl AttachmentKind {
    /// Returns the string identifier used in prompt annotations.
    pub fn id(self) -> &'static str {
        match self {
            AttachmentKind::Text => "text",
            AttachmentKind::Webpage => "webpage",
            AttachmentKind::Image => "image",
            AttachmentKind::Pdf => "pdf",
        }
    }

    /// Returns true when the attachment content can be resolved to raw text.
    pub fn is_text_convertible(self) -> bool {
        matches!(self, AttachmentKind::Text | AttachmentKind::Webpage)
    }
}

/// A resource attached to a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub kind: AttachmentKind,
    /// Original display name, shown verbatim in prompt labels.
    pub name: String,
    /// Opaque reference (path, URL, handle) resolved by the host's fetchers.
    pub reference: String,
}

impl Attachment {
    pub fn new(
        kind: AttachmentKind,
        name: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            name: name.into(),
            reference: reference.into(),
        }
    }
}
