use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::base::{Provider, Usage};
use super::configs::OpenAiProviderConfig;
use super::utils::{messages_to_openai_spec, openai_response_to_message, tools_to_openai_spec};
use crate::errors::{AgentError, AgentResult};
use crate::models::message::Message;
use crate::models::tool::Tool;

pub struct OpenAiProvider {
    client: Client,
    config: OpenAiProviderConfig,
}

impl OpenAiProvider {
    pub fn new(config: OpenAiProviderConfig) -> AgentResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(600)) // 10 minutes timeout
            .build()
            .map_err(|e| AgentError::Configuration(format!("could not build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn get_usage(data: &Value) -> Usage {
        let Some(usage) = data.get("usage") else {
            tracing::debug!("No usage data in response");
            return Usage::default();
        };

        let input_tokens = usage
            .get("prompt_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let output_tokens = usage
            .get("completion_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32);

        let total_tokens = usage
            .get("total_tokens")
            .and_then(|v| v.as_i64())
            .map(|v| v as i32)
            .or_else(|| match (input_tokens, output_tokens) {
                (Some(input), Some(output)) => Some(input + output),
                _ => None,
            });

        Usage::new(input_tokens, output_tokens, total_tokens)
    }

    async fn post(&self, payload: Value) -> anyhow::Result<Value> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.host.trim_end_matches('/')
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(anyhow!("Request failed: {}\nResponse: {}", status, body))
            }
        }
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, messages: &[Message], tools: &[Tool]) -> AgentResult<(Message, Usage)> {
        let mut payload = Map::new();
        payload.insert("model".to_string(), json!(self.config.model));
        payload.insert(
            "messages".to_string(),
            json!(messages_to_openai_spec(messages)),
        );

        if !tools.is_empty() {
            payload.insert("tools".to_string(), json!(tools_to_openai_spec(tools)?));
        }
        if let Some(temp) = self.config.temperature {
            payload.insert("temperature".to_string(), json!(temp));
        }
        if let Some(tokens) = self.config.max_tokens {
            payload.insert("max_tokens".to_string(), json!(tokens));
        }

        let response = self
            .post(Value::Object(payload))
            .await
            .map_err(|e| AgentError::Service(format!("{:#}", e)))?;

        if let Some(error) = response.get("error") {
            return Err(AgentError::Service(format!("OpenAI API error: {}", error)));
        }

        let message = openai_response_to_message(&response)?;
        let usage = Self::get_usage(&response);
        tracing::debug!(
            model = %self.config.model,
            input_tokens = ?usage.input_tokens,
            output_tokens = ?usage.output_tokens,
            "completion received"
        );

        Ok((message, usage))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::message::MessageContent;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn _setup_mock_server(status: u16, response_body: Value) -> (MockServer, OpenAiProvider) {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Authorization", "Bearer test_api_key"))
            .respond_with(ResponseTemplate::new(status).set_body_json(response_body))
            .mount(&mock_server)
            .await;

        let config = OpenAiProviderConfig::new("test_api_key")
            .unwrap()
            .with_host(mock_server.uri())
            .with_model("gpt-4o-mini");

        let provider = OpenAiProvider::new(config).unwrap();
        (mock_server, provider)
    }

    #[tokio::test]
    async fn test_complete_basic() -> AgentResult<()> {
        let response_body = json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "Total sales last month were $12,400.",
                    "tool_calls": null
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 12,
                "completion_tokens": 15,
                "total_tokens": 27
            }
        });

        let (_server, provider) = _setup_mock_server(200, response_body).await;

        let messages = vec![Message::user().with_text("What were total sales last month?")];
        let (message, usage) = provider.complete(&messages, &[]).await?;

        assert_eq!(
            message.content[0],
            MessageContent::text("Total sales last month were $12,400.")
        );
        assert_eq!(usage.input_tokens, Some(12));
        assert_eq!(usage.output_tokens, Some(15));
        assert_eq!(usage.total_tokens, Some(27));

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_tool_request() -> AgentResult<()> {
        let response_body = json!({
            "id": "chatcmpl-tool",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_123",
                        "type": "function",
                        "function": {
                            "name": "lookup_sales_data",
                            "arguments": "{\"prompt\":\"What were total sales last month?\"}"
                        }
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {
                "prompt_tokens": 20,
                "completion_tokens": 15,
                "total_tokens": 35
            }
        });

        let (_server, provider) = _setup_mock_server(200, response_body).await;

        let messages = vec![Message::user().with_text("What were total sales last month?")];
        let tool = Tool::new(
            "lookup_sales_data",
            "Look up data from the sales transaction dataset",
            json!({
                "type": "object",
                "properties": {
                    "prompt": {"type": "string"}
                },
                "required": ["prompt"]
            }),
        );

        let (message, _) = provider.complete(&messages, &[tool]).await?;

        let requests = message.tool_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].id, "call_123");
        let tool_call = requests[0].tool_call.as_ref().unwrap();
        assert_eq!(tool_call.name, "lookup_sales_data");
        assert_eq!(
            tool_call.arguments,
            json!({"prompt": "What were total sales last month?"})
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_server_error_is_service_error() {
        let (_server, provider) =
            _setup_mock_server(500, json!({"error": {"message": "boom"}})).await;

        let err = provider
            .complete(&[Message::user().with_text("Hi")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Service(ref msg) if msg.contains("500")));
    }

    #[tokio::test]
    async fn test_complete_api_error_payload() {
        let (_server, provider) = _setup_mock_server(
            200,
            json!({"error": {"code": "insufficient_quota", "message": "quota"}}),
        )
        .await;

        let err = provider
            .complete(&[Message::user().with_text("Hi")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Service(ref msg) if msg.contains("insufficient_quota")));
    }

    #[tokio::test]
    async fn test_complete_unexpected_shape_is_decode_error() {
        let (_server, provider) = _setup_mock_server(200, json!({"choices": []})).await;

        let err = provider
            .complete(&[Message::user().with_text("Hi")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::Decode(_)));
    }
}
