use serde::{Deserialize, Serialize};
use thiserror::Error;

#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Completion service error: {0}")]
    Service(String),

    #[error("Could not decode completion response: {0}")]
    Decode(String),

    #[error("Data access failed: {0}")]
    DataAccess(String),

    #[error("Tool not found: {0}")]
    UnknownTool(String),

    #[error("Malformed tool arguments: {0}")]
    MalformedToolArguments(String),

    #[error("No final answer after {0} rounds")]
    LoopExceeded(usize),

    #[error("Prompt template error: {0}")]
    Template(String),
}

impl From<config::ConfigError> for AgentError {
    fn from(err: config::ConfigError) -> Self {
        AgentError::Configuration(err.to_string())
    }
}

impl From<rusqlite::Error> for AgentError {
    fn from(err: rusqlite::Error) -> Self {
        AgentError::DataAccess(err.to_string())
    }
}

impl From<tera::Error> for AgentError {
    fn from(err: tera::Error) -> Self {
        // tera keeps the useful detail in the source chain
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        AgentError::Template(message)
    }
}

pub type AgentResult<T> = Result<T, AgentError>;
