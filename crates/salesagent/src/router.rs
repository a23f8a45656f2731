use std::sync::Arc;

use crate::configuration::{Settings, DEFAULT_MAX_ROUNDS};
use crate::data::SqliteBackend;
use crate::errors::{AgentError, AgentResult};
use crate::models::message::{Message, Reply, ToolRequest};
use crate::models::role::Role;
use crate::models::tool::Tool;
use crate::prompt_template::PromptTemplates;
use crate::providers::base::Provider;
use crate::providers::configs::OpenAiProviderConfig;
use crate::providers::openai::OpenAiProvider;
use crate::tools::{SalesTools, ToolKind};

/// What a caller hands to [`Router::run_agent`]
#[derive(Debug, Clone, PartialEq)]
pub enum AgentInput {
    Prompt(String),
    Transcript(Vec<Message>),
}

impl From<&str> for AgentInput {
    fn from(prompt: &str) -> Self {
        AgentInput::Prompt(prompt.to_string())
    }
}

impl From<String> for AgentInput {
    fn from(prompt: String) -> Self {
        AgentInput::Prompt(prompt)
    }
}

impl From<Vec<Message>> for AgentInput {
    fn from(messages: Vec<Message>) -> Self {
        AgentInput::Transcript(messages)
    }
}

impl AgentInput {
    fn into_messages(self) -> Vec<Message> {
        match self {
            AgentInput::Prompt(prompt) => vec![Message::user().with_text(prompt)],
            AgentInput::Transcript(messages) => messages,
        }
    }
}

/// Router alternates between the completion service and the sales tools until the
/// model answers without requesting a tool
pub struct Router {
    provider: Arc<dyn Provider>,
    tools: Vec<Tool>,
    handlers: SalesTools,
    system_prompt: String,
    max_rounds: usize,
}

impl Router {
    pub fn new(provider: Arc<dyn Provider>, handlers: SalesTools) -> Self {
        let system_prompt = handlers.templates().system.clone();
        Self {
            provider,
            tools: ToolKind::declarations(),
            handlers,
            system_prompt,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Build a router that talks to the configured OpenAI endpoint and reads the
    /// configured CSV file
    pub fn from_settings(settings: &Settings) -> AgentResult<Self> {
        let provider: Arc<dyn Provider> = Arc::new(OpenAiProvider::new(
            OpenAiProviderConfig::from_settings(settings)?,
        )?);
        let handlers = SalesTools::new(
            provider.clone(),
            Box::new(SqliteBackend::new()),
            settings.data_file_path.clone(),
            PromptTemplates::default(),
        );
        Ok(Self::new(provider, handlers).with_max_rounds(settings.max_rounds))
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Append the system instruction unless the transcript already has a system message
    pub fn ensure_system_prompt(&self, messages: &mut Vec<Message>) {
        if !messages.iter().any(|message| message.role == Role::System) {
            messages.push(Message::system().with_text(self.system_prompt.as_str()));
        }
    }

    /// Run a prompt or transcript to completion and return the model's final text
    pub async fn run_agent(&self, input: impl Into<AgentInput>) -> AgentResult<String> {
        let mut messages = input.into().into_messages();
        self.run_transcript(&mut messages).await
    }

    /// Like `run_agent`, but leaves the full exchange in `messages`
    pub async fn run_transcript(&self, messages: &mut Vec<Message>) -> AgentResult<String> {
        tracing::info!(messages = messages.len(), "running agent");
        self.ensure_system_prompt(messages);

        for round in 1..=self.max_rounds {
            tracing::info!(round, "making router call to completion service");
            let (response, _) = self.provider.complete(messages, &self.tools).await?;
            let reply = response.reply();
            messages.push(response);

            match reply {
                Reply::Text(text) => {
                    tracing::info!(round, "received final answer");
                    return Ok(text);
                }
                Reply::ToolCalls(requests) => {
                    tracing::info!(round, count = requests.len(), "received tool calls");
                    for request in requests {
                        let output = self.dispatch_tool_call(&request).await?;
                        messages.push(Message::tool().with_tool_response(request.id, output));
                    }
                }
            }
        }

        Err(AgentError::LoopExceeded(self.max_rounds))
    }

    async fn dispatch_tool_call(&self, request: &ToolRequest) -> AgentResult<String> {
        let call = request.tool_call.clone()?;
        let kind = ToolKind::from_name(&call.name)?;
        tracing::debug!(id = %request.id, tool = kind.name(), "dispatching tool call");
        self.handlers.call(kind, call.arguments).await
    }
}
