use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::GenerationParams;

const DEFAULT_LLM_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub llm_max_tokens: u32,
    /// Bounded wait for a single assistant turn.
    pub llm_timeout: Duration,
    /// Prompt history cap in turns (`ASSISTANT_MAX_HISTORY_TURNS`). `None` sends the
    /// whole history. An odd cap effectively sends one turn fewer: the window never
    /// opens on an assistant turn.
    pub max_history_turns: Option<usize>,
    /// Session store backend. In-memory when unset.
    pub redis_url: Option<String>,
    pub session_ttl_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let max_history_turns: usize = parse_env("ASSISTANT_MAX_HISTORY_TURNS", 20)?;

        Ok(Config {
            llm_api_key: require_env("LLM_API_KEY")?,
            llm_api_url: optional_env("LLM_API_URL")
                .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            llm_model: optional_env("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            llm_temperature: parse_env("LLM_TEMPERATURE", 0.7)?,
            llm_max_tokens: parse_env("LLM_MAX_TOKENS", 1024)?,
            llm_timeout: Duration::from_secs(parse_env("LLM_TIMEOUT_SECS", 30)?),
            max_history_turns: (max_history_turns > 0).then_some(max_history_turns),
            redis_url: optional_env("REDIS_URL"),
            session_ttl_secs: parse_env("SESSION_TTL_SECS", 86_400)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn generation_params(&self) -> GenerationParams {
        GenerationParams {
            model: self.llm_model.clone(),
            temperature: self.llm_temperature,
            max_tokens: self.llm_max_tokens,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("RODRIGO_TEST_UNSET_PORT", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("RODRIGO_TEST_BAD_TIMEOUT", "soon");
        let result: Result<u64> = parse_env("RODRIGO_TEST_BAD_TIMEOUT", 30);
        assert!(result.is_err());
        std::env::remove_var("RODRIGO_TEST_BAD_TIMEOUT");
    }

    #[test]
    fn test_optional_env_treats_blank_as_unset() {
        std::env::set_var("RODRIGO_TEST_BLANK", "   ");
        assert!(optional_env("RODRIGO_TEST_BLANK").is_none());
        std::env::remove_var("RODRIGO_TEST_BLANK");
    }
}
