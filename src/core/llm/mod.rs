//! LLM text generation: the [`TextGenerator`] seam and its OpenRouter implementation.

mod error;
mod stream;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use futures::StreamExt;
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use crate::core::config::Config;

pub use error::GenerateError;

use error::map_api_error;
use stream::{MAX_CONTENT_BYTES, append_capped, chunk_content, chunk_error, parse_usage};

/// Callback for each streamed content chunk (text only).
pub type OnContentChunk = Box<dyn Fn(&str) + Send + Sync>;

/// Turns a chat prompt (API-format messages) into the model's full text reply.
pub trait TextGenerator {
    /// Model identifier recorded with generated versions.
    fn model(&self) -> &str;

    async fn generate_text(&self, prompt: &[Value]) -> Result<String, GenerateError>;
}

/// Streaming chat completions against an OpenAI-compatible endpoint (OpenRouter by default).
pub struct OpenRouterGenerator {
    client: Client<OpenAIConfig>,
    model: String,
    on_content_chunk: Option<OnContentChunk>,
    cancel_token: Option<CancellationToken>,
}

impl OpenRouterGenerator {
    pub fn new(config: &Config, model: &str) -> Self {
        Self {
            client: Client::with_config(config.openai_config.clone()),
            model: model.to_string(),
            on_content_chunk: None,
            cancel_token: None,
        }
    }

    /// Call `cb` with each content chunk as it arrives.
    pub fn on_content_chunk(mut self, cb: OnContentChunk) -> Self {
        self.on_content_chunk = Some(cb);
        self
    }

    /// Abort the request when `token` is cancelled.
    pub fn cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = Some(token);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_token.as_ref().is_some_and(|t| t.is_cancelled())
    }
}

impl TextGenerator for OpenRouterGenerator {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate_text(&self, prompt: &[Value]) -> Result<String, GenerateError> {
        if self.is_cancelled() {
            return Err(GenerateError::Cancelled);
        }
        log::info!("Requesting proof from {}", self.model);

        // Start the streaming API call, racing against cancellation.
        let chat_api = self.client.chat();
        let stream_future = chat_api.create_stream_byot::<_, Value>(json!({
            "model": self.model,
            "messages": prompt,
            "stream": true,
        }));
        let stream_result = if let Some(token) = &self.cancel_token {
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(GenerateError::Cancelled),
                result = stream_future => result,
            }
        } else {
            stream_future.await
        };
        let mut stream = stream_result.map_err(map_api_error)?;

        let mut full_content = String::new();
        let mut usage = None;
        loop {
            let chunk_opt = if let Some(token) = &self.cancel_token {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return Err(GenerateError::Cancelled),
                    chunk = stream.next() => chunk,
                }
            } else {
                stream.next().await
            };
            let Some(chunk_result) = chunk_opt else { break };
            let chunk = chunk_result.map_err(map_api_error)?;

            if let Some(msg) = chunk_error(&chunk) {
                return Err(GenerateError::ApiMessage(msg));
            }
            if let Some(u) = parse_usage(&chunk) {
                usage = Some(u);
            }
            let Some(content) = chunk_content(&chunk) else {
                continue;
            };
            append_capped(&mut full_content, content, MAX_CONTENT_BYTES)?;
            if let Some(cb) = &self.on_content_chunk {
                cb(content);
            }
        }

        if let Some(u) = usage {
            log::info!(
                "Token usage: {} prompt + {} completion = {} total",
                u.prompt_tokens,
                u.completion_tokens,
                u.total_tokens
            );
        }
        Ok(full_content)
    }
}
