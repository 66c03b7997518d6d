//! Generation and API error types.

use std::io;

/// Errors from proof generation.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("{0}")]
    ApiAuth(String),
    #[error("API error: {0}")]
    ApiMessage(String),
    #[error("The model returned an empty proof")]
    EmptyResponse,
    #[error("Response exceeded {limit} bytes; nothing was saved")]
    ResponseTooLarge { limit: usize },
    /// The request was cancelled by the user.
    #[error("Request cancelled")]
    Cancelled,
    #[error("Failed to store proof: {0}")]
    Store(#[from] io::Error),
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Map async-openai or API errors into GenerateError.
pub fn map_api_error<E>(e: E) -> GenerateError
where
    E: std::fmt::Display + Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    let s = e.to_string();
    if s.contains("401") {
        return GenerateError::ApiAuth(
            "API error (401): authentication failed. Check OPENROUTER_API_KEY in your environment or .env file.".to_string(),
        );
    }
    if s.contains("\"error\"")
        && let Some((_, rest)) = s.split_once("\"message\":\"")
        && let Some((msg, _)) = rest.split_once('"')
    {
        return GenerateError::ApiMessage(msg.to_string());
    }
    GenerateError::Other(e.into())
}
