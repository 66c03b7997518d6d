use std::env;

use async_openai::config::OpenAIConfig;

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "anthropic/claude-haiku-4.5";
const DEFAULT_MAX_VERSIONS: u32 = 20;

/// Settings for LLM generation. Requires an API key.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_config: OpenAIConfig,
    pub model_id: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingApiKey,
    InvalidNumber { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingApiKey => write!(f, "OPENROUTER_API_KEY is not set"),
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{} must be a non-negative integer, got '{}'", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load generation settings from environment. Returns an error if API key is missing.
pub fn load() -> Result<Config, ConfigError> {
    let base_url = env::var("OPENROUTER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    let api_key = env::var("OPENROUTER_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)?;

    let openai_config = OpenAIConfig::new()
        .with_api_base(base_url)
        .with_api_key(api_key);

    Ok(Config {
        openai_config,
        model_id: model_id(),
    })
}

/// Model used for generation: `OPENROUTER_MODEL` or the default.
pub fn model_id() -> String {
    env::var("OPENROUTER_MODEL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// Whether `OPENROUTER_MODEL` overrides the default model.
pub fn model_from_env() -> bool {
    env::var("OPENROUTER_MODEL")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .is_some()
}

/// Maximum versions kept per proof (`PROOF_PAGER_MAX_VERSIONS`). 0 keeps everything.
pub fn max_versions() -> Result<u32, ConfigError> {
    match env::var("PROOF_PAGER_MAX_VERSIONS") {
        Ok(value) => parse_max_versions(&value),
        Err(_) => Ok(DEFAULT_MAX_VERSIONS),
    }
}

fn parse_max_versions(value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            var: "PROOF_PAGER_MAX_VERSIONS",
            value: value.to_string(),
        })
}
