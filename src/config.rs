//! Configuration management for the report enhancer.
//!
//! Configuration can be set via environment variables:
//! - `OPENROUTER_API_KEY` - Required. Your OpenRouter API key.
//! - `OPENROUTER_API_URL` - Optional. Chat-completions endpoint. Defaults to OpenRouter.
//! - `ENHANCER_MODEL` - Optional. Model for every call. Defaults to `google/gemini-2.5-pro`.
//! - `IDENTIFIER_REASONING_EFFORT` - Optional. `low|medium|high|<tokens>`. Defaults to `high`.
//! - `SUB_AGENT_REASONING_EFFORT` - Optional. Same format. Defaults to `medium`.
//! - `MAX_ENHANCEMENT_TASKS` - Optional. Cap on identified tasks. Defaults to `8`.
//! - `RETRY_MAX_ATTEMPTS` - Optional. Calls per generation, including the first. Defaults to `3`.
//! - `RETRY_BASE_DELAY_MS` - Optional. Base backoff delay. Defaults to `2000`.
//! - `REQUEST_TIMEOUT_SECS` - Optional. Per-call timeout. Defaults to `300`.
//! - `GROUNDING_STORE` - Optional. Grounding/reference store name.

use std::time::Duration;

use thiserror::Error;

use crate::llm::{ReasoningEffort, RetryPolicy};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

pub const DEFAULT_MODEL: &str = "google/gemini-2.5-pro";
pub const DEFAULT_MAX_TASKS: usize = 8;

/// Enhancer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// OpenRouter API key
    pub api_key: String,

    /// Chat-completions endpoint override
    pub api_url: Option<String>,

    /// Model identifier (OpenRouter format)
    pub model: String,

    /// Reasoning budget for the task identifier call
    pub identifier_effort: Option<ReasoningEffort>,

    /// Reasoning budget for each sub-agent call
    pub sub_agent_effort: Option<ReasoningEffort>,

    /// Maximum number of tasks kept from the identifier
    pub max_tasks: usize,

    /// Backoff for transient generation failures
    pub retry: RetryPolicy,

    /// Per-call timeout at the client boundary
    pub request_timeout: Duration,

    /// Grounding/reference store the backend may consult
    pub grounding_store: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `OPENROUTER_API_KEY` is not set, and
    /// `ConfigError::InvalidValue` for unparsable optional values.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("OPENROUTER_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENROUTER_API_KEY".to_string()))?;

        let defaults = Self::new(api_key, DEFAULT_MODEL);

        let parse = |key: &str| -> Option<String> {
            lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        };

        let identifier_effort = match parse("IDENTIFIER_REASONING_EFFORT") {
            Some(v) => Some(parse_value("IDENTIFIER_REASONING_EFFORT", &v)?),
            None => defaults.identifier_effort,
        };
        let sub_agent_effort = match parse("SUB_AGENT_REASONING_EFFORT") {
            Some(v) => Some(parse_value("SUB_AGENT_REASONING_EFFORT", &v)?),
            None => defaults.sub_agent_effort,
        };

        let max_tasks = match parse("MAX_ENHANCEMENT_TASKS") {
            Some(v) => parse_value("MAX_ENHANCEMENT_TASKS", &v)?,
            None => defaults.max_tasks,
        };

        let max_attempts: u32 = match parse("RETRY_MAX_ATTEMPTS") {
            Some(v) => parse_value("RETRY_MAX_ATTEMPTS", &v)?,
            None => defaults.retry.max_attempts,
        };
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "RETRY_MAX_ATTEMPTS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let base_delay = match parse("RETRY_BASE_DELAY_MS") {
            Some(v) => Duration::from_millis(parse_value("RETRY_BASE_DELAY_MS", &v)?),
            None => defaults.retry.base_delay,
        };

        let request_timeout = match parse("REQUEST_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(parse_value("REQUEST_TIMEOUT_SECS", &v)?),
            None => defaults.request_timeout,
        };

        Ok(Self {
            api_url: parse("OPENROUTER_API_URL"),
            model: parse("ENHANCER_MODEL").unwrap_or(defaults.model.clone()),
            identifier_effort,
            sub_agent_effort,
            max_tasks,
            retry: RetryPolicy::new(max_attempts, base_delay),
            request_timeout,
            grounding_store: parse("GROUNDING_STORE"),
            ..defaults
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: None,
            model: model.into(),
            identifier_effort: Some(ReasoningEffort::High),
            sub_agent_effort: Some(ReasoningEffort::Medium),
            max_tasks: DEFAULT_MAX_TASKS,
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(300),
            grounding_store: None,
        }
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue(key.to_string(), format!("{}", e)))
}
