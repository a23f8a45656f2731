//! Process configuration, read once at startup.
//!
//! Values come from the environment, after an optional `.env` file has been
//! loaded. Recognized variables:
//!
//! - `LLM_API_KEY` (required)
//! - `LLM_API_HOST`, `LLM_MODEL`, `LLM_TEMPERATURE`, `LLM_MAX_TOKENS`
//! - `TRANSACTION_DATA_FILE_PATH`
//! - `AGENT_MAX_ROUNDS`
use config::{Config, Environment, Map};
use serde::Deserialize;
use std::path::PathBuf;

use crate::errors::{AgentError, AgentResult};
use crate::providers::configs::{OPENAI_HOST, OPENAI_MODEL};

pub const DEFAULT_DATA_FILE_PATH: &str = "default_path.csv";
pub const DEFAULT_MAX_ROUNDS: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub api_host: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
    pub data_file_path: PathBuf,
    pub max_rounds: usize,
}

// Mirrors the flat environment variable names
#[derive(Debug, Deserialize)]
struct RawSettings {
    llm_api_key: Option<String>,
    llm_api_host: String,
    llm_model: String,
    llm_temperature: Option<f32>,
    llm_max_tokens: Option<i32>,
    transaction_data_file_path: String,
    agent_max_rounds: usize,
}

impl Settings {
    /// Load settings from `.env` (if present) and the process environment
    pub fn from_env() -> AgentResult<Self> {
        if let Ok(path) = dotenv::dotenv() {
            tracing::debug!("Loaded environment from {:?}", path);
        }
        Self::load(Environment::default().try_parsing(true))
    }

    /// Load settings from an explicit variable map instead of the process environment
    pub fn from_vars(vars: Map<String, String>) -> AgentResult<Self> {
        Self::load(Environment::default().try_parsing(true).source(Some(vars)))
    }

    fn load(environment: Environment) -> AgentResult<Self> {
        let raw: RawSettings = Config::builder()
            .set_default("llm_api_host", OPENAI_HOST)?
            .set_default("llm_model", OPENAI_MODEL)?
            .set_default("transaction_data_file_path", DEFAULT_DATA_FILE_PATH)?
            .set_default("agent_max_rounds", DEFAULT_MAX_ROUNDS as i64)?
            .add_source(environment)
            .build()?
            .try_deserialize()?;

        let api_key = raw
            .llm_api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                AgentError::Configuration("LLM_API_KEY is missing from the environment".to_string())
            })?;

        if raw.transaction_data_file_path.trim().is_empty() {
            return Err(AgentError::Configuration(
                "TRANSACTION_DATA_FILE_PATH is set but empty".to_string(),
            ));
        }

        if raw.agent_max_rounds == 0 {
            return Err(AgentError::Configuration(
                "AGENT_MAX_ROUNDS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            api_host: raw.llm_api_host,
            model: raw.llm_model,
            temperature: raw.llm_temperature,
            max_tokens: raw.llm_max_tokens,
            data_file_path: PathBuf::from(raw.transaction_data_file_path),
            max_rounds: raw.agent_max_rounds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::from_vars(vars(&[("LLM_API_KEY", "test-key")])).unwrap();
        assert_eq!(settings.api_key, "test-key");
        assert_eq!(settings.api_host, OPENAI_HOST);
        assert_eq!(settings.model, OPENAI_MODEL);
        assert_eq!(settings.data_file_path, PathBuf::from(DEFAULT_DATA_FILE_PATH));
        assert_eq!(settings.max_rounds, DEFAULT_MAX_ROUNDS);
        assert_eq!(settings.temperature, None);
    }

    #[test]
    fn test_environment_override() {
        let settings = Settings::from_vars(vars(&[
            ("LLM_API_KEY", "test-key"),
            ("LLM_API_HOST", "http://localhost:8080"),
            ("LLM_MODEL", "gpt-4o"),
            ("LLM_TEMPERATURE", "0.2"),
            ("TRANSACTION_DATA_FILE_PATH", "/data/sales.csv"),
            ("AGENT_MAX_ROUNDS", "3"),
        ]))
        .unwrap();

        assert_eq!(settings.api_host, "http://localhost:8080");
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.temperature, Some(0.2));
        assert_eq!(settings.data_file_path, PathBuf::from("/data/sales.csv"));
        assert_eq!(settings.max_rounds, 3);
    }

    #[test]
    fn test_missing_api_key() {
        let err = Settings::from_vars(vars(&[("LLM_MODEL", "gpt-4o")])).unwrap_err();
        assert!(matches!(err, AgentError::Configuration(ref msg) if msg.contains("LLM_API_KEY")));
    }

    #[test]
    fn test_zero_rounds_rejected() {
        let err = Settings::from_vars(vars(&[
            ("LLM_API_KEY", "test-key"),
            ("AGENT_MAX_ROUNDS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
    }
}
