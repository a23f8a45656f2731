use crate::configuration::Settings;
use crate::errors::{AgentError, AgentResult};

pub const OPENAI_HOST: &str = "https://api.openai.com";
pub const OPENAI_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct OpenAiProviderConfig {
    pub host: String,
    pub api_key: String,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<i32>,
}

impl OpenAiProviderConfig {
    pub fn new(api_key: impl Into<String>) -> AgentResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AgentError::Configuration(
                "the completion service API key is empty".to_string(),
            ));
        }

        Ok(Self {
            host: OPENAI_HOST.to_string(),
            api_key,
            model: OPENAI_MODEL.to_string(),
            temperature: None,
            max_tokens: None,
        })
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn from_settings(settings: &Settings) -> AgentResult<Self> {
        let mut config = Self::new(settings.api_key.clone())?
            .with_host(settings.api_host.clone())
            .with_model(settings.model.clone());
        config.temperature = settings.temperature;
        config.max_tokens = settings.max_tokens;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_is_a_configuration_error() {
        let err = OpenAiProviderConfig::new("  ").unwrap_err();
        assert!(matches!(err, AgentError::Configuration(_)));
    }

    #[test]
    fn test_defaults() {
        let config = OpenAiProviderConfig::new("sk-test").unwrap();
        assert_eq!(config.host, OPENAI_HOST);
        assert_eq!(config.model, OPENAI_MODEL);
        assert_eq!(config.temperature, None);
    }
}
