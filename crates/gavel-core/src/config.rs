use crate::errors::ConfigError;
use crate::providers::llm::openai::DEFAULT_BASE_URL;

/// Provider credentials, resolved from the environment before any batch work
/// starts. A missing key is a configuration error, not a per-assignment one.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub api_key: String,
    pub base_url: String,
}

impl ProviderSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| {
            ConfigError("OPENAI_API_KEY is not set (required for judge calls)".into())
        })?;
        if api_key.trim().is_empty() {
            return Err(ConfigError("OPENAI_API_KEY is empty".into()));
        }
        let base_url =
            std::env::var("GAVEL_OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self { api_key, base_url })
    }
}
