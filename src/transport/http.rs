//! reqwest client for OpenAI-compatible chat-completion endpoints

use std::time::Duration;

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use futures::future::BoxFuture;
use reqwest::{Client, Response};

use super::sse::{StreamAccumulator, StreamStatus};
use super::{CompletionRequest, CompletionTransport, Credential, EndpointConfig, ProgressCallback};
use crate::error::{CommentaryError, Result};
use crate::types::messages::{ChatCompletionRequest, ChatMessage, completion_content};
use crate::types::options::DEFAULT_STREAM_IDLE_TIMEOUT;

/// Message sent by [`CompletionClient::test_connection`]
pub const TEST_MESSAGE: &str = "1+1=?";

/// Completion cap for the connection test
const TEST_MAX_TOKENS: u32 = 50;

/// One step of a streaming completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate {
    /// Full text accumulated so far, after a new fragment
    Progress(String),
    /// Final text; always the last item of a successful stream
    Done(String),
}

/// HTTP client for chat completions
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    idle_timeout: Option<Duration>,
}

impl Default for CompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionClient {
    /// Create a client with the default idle timeout
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Wrap an existing reqwest client
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            idle_timeout: Some(DEFAULT_STREAM_IDLE_TIMEOUT),
        }
    }

    /// Set or disable the maximum silence between streamed chunks
    #[must_use]
    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// POST `body` and fail on any non-success status
    async fn send(
        &self,
        endpoint: &EndpointConfig,
        credential: &Credential,
        body: &ChatCompletionRequest,
    ) -> Result<Response> {
        let url = endpoint.completions_url();
        log::debug!("POST {url} (model {}, stream {})", body.model, body.stream);

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::debug!("Completion endpoint answered {status}");
            return Err(CommentaryError::from_status(status));
        }
        Ok(response)
    }

    /// Stream a completion as a sequence of [`StreamUpdate`]s
    ///
    /// The stream yields one `Progress` per text fragment and ends with a
    /// single `Done`, or with one `Err` if the request fails.
    pub fn stream_updates(
        &self,
        request: CompletionRequest,
    ) -> impl Stream<Item = Result<StreamUpdate>> + Send + '_ {
        try_stream! {
            let body = ChatCompletionRequest::commentary(
                request.endpoint.model.clone(),
                request.system_prompt,
                request.user_content,
                true,
            );
            let response = self.send(&request.endpoint, &request.credential, &body).await?;

            let mut bytes = response.bytes_stream();
            let mut accumulator = StreamAccumulator::new();

            loop {
                let next = match self.idle_timeout {
                    Some(limit) => tokio::time::timeout(limit, bytes.next())
                        .await
                        .map_err(|_| {
                            CommentaryError::timeout(format!(
                                "no data from endpoint for {}s",
                                limit.as_secs()
                            ))
                        })?,
                    None => bytes.next().await,
                };
                let Some(chunk) = next else {
                    break;
                };
                let chunk = chunk.map_err(CommentaryError::from)?;

                let mut progress = Vec::new();
                let status = accumulator.feed(&chunk, |text| progress.push(text.to_string()));
                for text in progress {
                    yield StreamUpdate::Progress(text);
                }
                if status == StreamStatus::Done {
                    break;
                }
            }

            let mut progress = Vec::new();
            let text = accumulator.finish(|text| progress.push(text.to_string()));
            for text in progress {
                yield StreamUpdate::Progress(text);
            }
            yield StreamUpdate::Done(text);
        }
    }

    /// Stream a completion, calling `on_progress` with the full text so far
    ///
    /// # Errors
    /// Returns the classified request error; see [`CommentaryError::kind`].
    pub async fn stream_completion(
        &self,
        request: CompletionRequest,
        on_progress: ProgressCallback<'_>,
    ) -> Result<String> {
        let mut updates = Box::pin(self.stream_updates(request));
        let mut final_text = String::new();

        while let Some(update) = updates.next().await {
            match update? {
                StreamUpdate::Progress(text) => on_progress(&text),
                StreamUpdate::Done(text) => final_text = text,
            }
        }

        Ok(final_text)
    }

    /// Request a completion in one piece
    ///
    /// # Errors
    /// Returns `MalformedResponse` unless the body is an object with a
    /// non-empty `choices` array whose first `message.content` is a string,
    /// or the classified request error.
    pub async fn complete(&self, request: CompletionRequest) -> Result<String> {
        let body = ChatCompletionRequest::commentary(
            request.endpoint.model.clone(),
            request.system_prompt,
            request.user_content,
            false,
        );
        let response = self.send(&request.endpoint, &request.credential, &body).await?;
        let value: serde_json::Value = response.json().await?;

        completion_content(&value)
            .map(str::to_string)
            .ok_or_else(|| CommentaryError::malformed("missing choices[0].message.content"))
    }

    /// Check that the endpoint, model and credential work together
    ///
    /// # Errors
    /// Same as [`complete`](Self::complete).
    pub async fn test_connection(
        &self,
        endpoint: &EndpointConfig,
        credential: &Credential,
    ) -> Result<String> {
        let body = ChatCompletionRequest {
            model: endpoint.model.clone(),
            messages: vec![ChatMessage::user(TEST_MESSAGE)],
            stream: false,
            max_tokens: Some(TEST_MAX_TOKENS),
        };
        let response = self.send(endpoint, credential, &body).await?;
        let value: serde_json::Value = response.json().await?;

        if completion_content(&value).is_none() {
            return Err(CommentaryError::malformed("missing choices[0].message.content"));
        }
        Ok("Connection successful!".to_string())
    }
}

impl CompletionTransport for CompletionClient {
    fn stream<'a>(
        &'a self,
        request: CompletionRequest,
        on_progress: ProgressCallback<'a>,
    ) -> BoxFuture<'a, Result<String>> {
        Box::pin(self.stream_completion(request, on_progress))
    }
}
