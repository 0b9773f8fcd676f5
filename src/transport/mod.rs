//! Transport layer for chat-completion endpoints
//!
//! This module provides the transport abstraction the refresh orchestrator
//! talks to, the endpoint and credential types it needs, and the reqwest
//! implementation in [`http`].

pub mod http;
pub mod sse;

use futures::future::BoxFuture;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{CommentaryError, Result};

/// Path every OpenAI-compatible chat endpoint ends with
pub const COMPLETIONS_PATH: &str = "/chat/completions";

/// Endpoint used when none is configured
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "nvidia/nemotron-3-nano-30b-a3b:free";

/// Callback receiving the full accumulated text after every fragment
pub type ProgressCallback<'a> = &'a mut (dyn FnMut(&str) + Send);

// ============================================================================
// Endpoint Configuration
// ============================================================================

/// Where to send requests and which model to ask for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Base URL or full completions URL
    pub base_url: String,
    /// Model name
    pub model: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl EndpointConfig {
    /// Create an endpoint config without validation
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    /// Create an endpoint config, trimming and validating both fields
    ///
    /// # Errors
    /// Returns `InvalidConfig` if the URL is neither `https://` nor
    /// `http://localhost`, does not parse, or the model is blank.
    pub fn validated(base_url: &str, model: &str) -> Result<Self> {
        let base_url = base_url.trim();
        if !base_url.starts_with("https://") && !base_url.starts_with("http://localhost") {
            return Err(CommentaryError::invalid_config(
                "API Base URL must use HTTPS (or http://localhost for local development)",
            ));
        }
        Url::parse(base_url)
            .map_err(|e| CommentaryError::invalid_config(format!("Invalid API Base URL format: {e}")))?;

        let model = model.trim();
        if model.is_empty() {
            return Err(CommentaryError::invalid_config("Model name cannot be empty"));
        }

        Ok(Self::new(base_url, model))
    }

    /// Full completions URL for this endpoint
    #[must_use]
    pub fn completions_url(&self) -> String {
        normalize_endpoint(&self.base_url)
    }
}

/// Append the completions path unless the URL already ends with it
///
/// One trailing slash is dropped before appending, so both
/// `https://host/v1` and `https://host/v1/` become
/// `https://host/v1/chat/completions`.
#[must_use]
pub fn normalize_endpoint(base_url: &str) -> String {
    let trimmed = base_url.trim();
    if trimmed.ends_with(COMPLETIONS_PATH) {
        return trimmed.to_string();
    }
    let stem = trimmed.strip_suffix('/').unwrap_or(trimmed);
    format!("{stem}{COMPLETIONS_PATH}")
}

// ============================================================================
// Credential
// ============================================================================

/// Bearer token for the endpoint
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Expose the secret for the authorization header
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Everything one commentary request needs
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Endpoint and model
    pub endpoint: EndpointConfig,
    /// Bearer credential
    pub credential: Credential,
    /// Persona system prompt
    pub system_prompt: String,
    /// User message (file label and content)
    pub user_content: String,
}

/// Transport trait for chat-completion endpoints
///
/// The orchestrator only ever streams; the trait exists so tests and other
/// hosts can stand in for the HTTP client.
pub trait CompletionTransport: Send + Sync {
    /// Stream a completion, reporting the full text after every fragment
    ///
    /// Resolves with the final text once the sentinel arrives or the body
    /// ends.
    ///
    /// # Errors
    /// Returns `Transport`, `Auth`, `RateLimit`, `Server`, `Request` or
    /// `MalformedResponse` errors; see [`CommentaryError::kind`].
    fn stream<'a>(
        &'a self,
        request: CompletionRequest,
        on_progress: ProgressCallback<'a>,
    ) -> BoxFuture<'a, Result<String>>;
}

pub use http::CompletionClient;
