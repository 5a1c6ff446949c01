//! Conversation-to-prompt formatting.
//!
//! Pure transformation except for delegated attachment fetches. A single-turn
//! user conversation elides transcript framing; anything else renders a
//! `Human:`/`Assistant:` transcript with blank-line separators, preserving
//! turn order.

use anyhow::Result;

use crate::conversation::{Attachment, AttachmentKind, Message};
use crate::host::AttachmentFetcher;

/// Formats a conversation into the single prompt handed to the CLI.
///
/// # Errors
/// Returns an error if an attachment fetch fails. Fetch failures are not
/// handled here; they propagate and abort the request before launch.
pub async fn format_conversation(
    messages: &[Message],
    fetcher: &dyn AttachmentFetcher,
) -> Result<String> {
    // Common single-turn case: no transcript framing.
    if let [Message::User {
        content,
        attachments,
    }] = messages
    {
        return render_user_content(content, attachments, fetcher).await;
    }

    let mut lines = Vec::with_capacity(messages.len());
    for message in messages {
        lines.push(render_transcript_line(message, fetcher).await?);
    }
    Ok(lines.join("\n\n"))
}

async fn render_transcript_line(
    message: &Message,
    fetcher: &dyn AttachmentFetcher,
) -> Result<String> {
    Ok(match message {
        Message::User {
            content,
            attachments,
        } => {
            let rendered = render_user_content(content, attachments, fetcher).await?;
            format!("Human: {rendered}")
        }
        Message::Assistant { content } => format!("Assistant: {content}"),
        Message::ToolResults { content } => format!("Tool Results: {content}"),
    })
}

/// Renders user text with attachments inlined in their given order.
async fn render_user_content(
    content: &str,
    attachments: &[Attachment],
    fetcher: &dyn AttachmentFetcher,
) -> Result<String> {
    let mut rendered = content.to_string();
    for attachment in attachments {
        match attachment.kind {
            AttachmentKind::Text => {
                let text = fetcher.fetch_text(attachment).await?;
                rendered.push_str(&format!("\n\n[Attachment: {}]\n{text}", attachment.name));
            }
            AttachmentKind::Webpage => {
                let text = fetcher.fetch_webpage(attachment).await?;
                rendered.push_str(&format!("\n\n[Webpage: {}]\n{text}", attachment.name));
            }
            AttachmentKind::Image | AttachmentKind::Pdf => {
                rendered.push_str(&format!(
                    "\n\n[Attachment: {}] (Note: {} attachments are not supported in general-assistant mode)",
                    attachment.name,
                    attachment.kind.id()
                ));
            }
        }
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use anyhow::bail;
    use async_trait::async_trait;

    use super::*;

    /// Fetcher stub that echoes the attachment reference.
    struct StubFetcher;

    #[async_trait]
    impl AttachmentFetcher for StubFetcher {
        async fn fetch_text(&self, attachment: &Attachment) -> Result<String> {
            Ok(format!("text:{}", attachment.reference))
        }

        async fn fetch_webpage(&self, attachment: &Attachment) -> Result<String> {
            Ok(format!("page:{}", attachment.reference))
        }
    }

    /// Fetcher stub that always fails.
    struct FailingFetcher;

    #[async_trait]
    impl AttachmentFetcher for FailingFetcher {
        async fn fetch_text(&self, _attachment: &Attachment) -> Result<String> {
            bail!("unreadable attachment")
        }

        async fn fetch_webpage(&self, _attachment: &Attachment) -> Result<String> {
            bail!("unreachable webpage")
        }
    }

    /// Verifies a single user message without attachments formats to its raw
    /// content.
    #[tokio::test]
    async fn test_single_user_message_is_raw_content() {
        let messages = [Message::user("Hi")];
        let prompt = format_conversation(&messages, &StubFetcher).await.unwrap();
        assert_eq!(prompt, "Hi");
    }

    /// Verifies a text attachment is appended with its bracketed label.
    #[tokio::test]
    async fn test_text_attachment_is_inlined() {
        let messages = [Message::user_with_attachments(
            "Summarize this",
            vec![Attachment::new(AttachmentKind::Text, "notes.txt", "ref-1")],
        )];
        let prompt = format_conversation(&messages, &StubFetcher).await.unwrap();
        assert_eq!(
            prompt,
            "Summarize this\n\n[Attachment: notes.txt]\ntext:ref-1"
        );
    }

    /// Verifies webpage attachments use the `[Webpage: ...]` label.
    #[tokio::test]
    async fn test_webpage_attachment_label() {
        let messages = [Message::user_with_attachments(
            "What does it say?",
            vec![Attachment::new(
                AttachmentKind::Webpage,
                "example.com",
                "https://example.com",
            )],
        )];
        let prompt = format_conversation(&messages, &StubFetcher).await.unwrap();
        assert_eq!(
            prompt,
            "What does it say?\n\n[Webpage: example.com]\npage:https://example.com"
        );
    }

    /// Verifies image and pdf attachments degrade to a placeholder with no
    /// fetch attempted.
    #[tokio::test]
    async fn test_binary_attachments_get_placeholder() {
        let messages = [Message::user_with_attachments(
            "Look at these",
            vec![
                Attachment::new(AttachmentKind::Image, "photo.png", "ref-img"),
                Attachment::new(AttachmentKind::Pdf, "paper.pdf", "ref-pdf"),
            ],
        )];
        // FailingFetcher proves neither kind is fetched.
        let prompt = format_conversation(&messages, &FailingFetcher)
            .await
            .unwrap();
        assert_eq!(
            prompt,
            "Look at these\
             \n\n[Attachment: photo.png] (Note: image attachments are not supported in general-assistant mode)\
             \n\n[Attachment: paper.pdf] (Note: pdf attachments are not supported in general-assistant mode)"
        );
    }

    /// Verifies multi-message conversations render as an ordered transcript
    /// joined by blank lines.
    #[tokio::test]
    async fn test_transcript_preserves_order() {
        let messages = [
            Message::user("Hi"),
            Message::assistant("Hello! How can I help?"),
            Message::tool_results("42"),
            Message::user("Thanks"),
        ];
        let prompt = format_conversation(&messages, &StubFetcher).await.unwrap();
        assert_eq!(
            prompt,
            "Human: Hi\n\nAssistant: Hello! How can I help?\n\nTool Results: 42\n\nHuman: Thanks"
        );
    }

    /// Verifies a single non-user message falls back to the transcript line
    /// format.
    #[tokio::test]
    async fn test_single_assistant_message_keeps_role_prefix() {
        let messages = [Message::assistant("Hello")];
        let prompt = format_conversation(&messages, &StubFetcher).await.unwrap();
        assert_eq!(prompt, "Assistant: Hello");
    }

    /// Verifies attachments are inlined inside transcript lines too.
    #[tokio::test]
    async fn test_transcript_user_line_includes_attachments() {
        let messages = [
            Message::user_with_attachments(
                "See attachment",
                vec![Attachment::new(AttachmentKind::Text, "a.txt", "r")],
            ),
            Message::assistant("Got it"),
        ];
        let prompt = format_conversation(&messages, &StubFetcher).await.unwrap();
        assert_eq!(
            prompt,
            "Human: See attachment\n\n[Attachment: a.txt]\ntext:r\n\nAssistant: Got it"
        );
    }

    /// Verifies a fetch failure propagates out of formatting.
    #[tokio::test]
    async fn test_fetch_failure_propagates() {
        let messages = [Message::user_with_attachments(
            "Read this",
            vec![Attachment::new(AttachmentKind::Text, "a.txt", "r")],
        )];
        let result = format_conversation(&messages, &FailingFetcher).await;
        assert!(result.is_err());
    }

    /// Verifies an empty conversation formats to an empty prompt.
    #[tokio::test]
    async fn test_empty_conversation() {
        let prompt = format_conversation(&[], &StubFetcher).await.unwrap();
        assert_eq!(prompt, "");
    }
}
