//! Chat-completion wire types
//!
//! Request and response shapes for OpenAI-compatible `/chat/completions`
//! endpoints. Only the fields the panel reads are modelled; unknown fields are
//! ignored on the way in.

use serde::{Deserialize, Serialize};

// ============================================================================
// Request Types
// ============================================================================

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System prompt
    System,
    /// User input
    User,
    /// Model output
    Assistant,
}

/// One chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author role
    pub role: ChatRole,
    /// Message text
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    /// Model name
    pub model: String,
    /// Conversation, system prompt first
    pub messages: Vec<ChatMessage>,
    /// Request server-sent events instead of a single JSON body
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    /// Optional completion length cap
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl ChatCompletionRequest {
    /// Build the two-message commentary request
    pub fn commentary(
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        user_content: impl Into<String>,
        stream: bool,
    ) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_content)],
            stream,
            max_tokens: None,
        }
    }
}

/// User message body for a file: label, blank line, content
#[must_use]
pub fn user_content(file_label: &str, content: &str) -> String {
    format!("{file_label}\n\n{content}")
}

// ============================================================================
// Streaming Response Types
// ============================================================================

/// One `data:` frame of a streaming response
#[derive(Debug, Default, Deserialize)]
pub struct StreamChunk {
    /// Choices carried by this frame
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

/// Choice inside a streaming frame
#[derive(Debug, Default, Deserialize)]
pub struct StreamChoice {
    /// Incremental delta
    #[serde(default)]
    pub delta: Delta,
}

/// Incremental delta of a streaming choice
#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    /// Text fragment, absent on role-only or finish frames
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamChunk {
    /// Text fragment of the first choice, if present and non-empty
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.delta.content.as_deref())
            .filter(|text| !text.is_empty())
    }
}

// ============================================================================
// Non-streaming Response Types
// ============================================================================

/// Pull `choices[0].message.content` out of a full completion body
///
/// The body must be an object with a non-empty `choices` array whose first
/// entry carries a string `message.content`. Anything else is `None`.
#[must_use]
pub fn completion_content(body: &serde_json::Value) -> Option<&str> {
    body.as_object()?
        .get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
}
