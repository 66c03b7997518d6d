//! Streaming chat response: content deltas, size limits, token usage.

use serde_json::Value;

use super::GenerateError;

/// Max content size (2MB) to prevent unbounded memory growth from malformed streams.
pub(super) const MAX_CONTENT_BYTES: usize = 2 * 1024 * 1024;

/// Token usage reported by the API in the final streaming chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Parse token usage from a streaming chunk's `usage` field (present in the final chunk).
pub(super) fn parse_usage(chunk: &Value) -> Option<TokenUsage> {
    let usage = chunk.get("usage")?.as_object()?;
    let field = |name: &str| usage.get(name).and_then(|v| v.as_u64()).unwrap_or(0);
    Some(TokenUsage {
        prompt_tokens: field("prompt_tokens"),
        completion_tokens: field("completion_tokens"),
        total_tokens: field("total_tokens"),
    })
}

/// Error message carried inside a chunk (OpenRouter reports mid-stream failures this way).
pub(super) fn chunk_error(chunk: &Value) -> Option<String> {
    let err = chunk.get("error")?;
    Some(
        err.get("message")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error")
            .to_string(),
    )
}

/// Text delta of the first choice, if the chunk carries one.
pub(super) fn chunk_content(chunk: &Value) -> Option<&str> {
    chunk
        .get("choices")?
        .as_array()?
        .first()?
        .get("delta")?
        .get("content")?
        .as_str()
        .filter(|s| !s.is_empty())
}

/// Append `content` to `buf`, failing instead of truncating once the reply would
/// exceed `limit` bytes. A partial proof must never be stored as a version.
pub(super) fn append_capped(
    buf: &mut String,
    content: &str,
    limit: usize,
) -> Result<(), GenerateError> {
    if buf.len() + content.len() > limit {
        return Err(GenerateError::ResponseTooLarge { limit });
    }
    buf.push_str(content);
    Ok(())
}
