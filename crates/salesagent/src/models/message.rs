use super::role::Role;
use super::tool::ToolCall;
use crate::errors::AgentResult;
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub id: String,
    pub tool_call: AgentResult<ToolCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub id: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Content passed inside a message, which can be both simple text and tool content
pub enum MessageContent {
    Text(String),
    ToolRequest(ToolRequest),
    ToolResponse(ToolResponse),
}

impl MessageContent {
    pub fn text<S: Into<String>>(text: S) -> Self {
        MessageContent::Text(text.into())
    }

    pub fn tool_request<S: Into<String>>(id: S, tool_call: AgentResult<ToolCall>) -> Self {
        MessageContent::ToolRequest(ToolRequest {
            id: id.into(),
            tool_call,
        })
    }

    pub fn tool_response<S: Into<String>, T: Into<String>>(id: S, output: T) -> Self {
        MessageContent::ToolResponse(ToolResponse {
            id: id.into(),
            output: output.into(),
        })
    }

    pub fn as_tool_request(&self) -> Option<&ToolRequest> {
        if let MessageContent::ToolRequest(ref tool_request) = self {
            Some(tool_request)
        } else {
            None
        }
    }

    pub fn as_tool_response(&self) -> Option<&ToolResponse> {
        if let MessageContent::ToolResponse(ref tool_response) = self {
            Some(tool_response)
        } else {
            None
        }
    }

    /// Get the text content if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            MessageContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// What an assistant message asks the router to do next
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A final answer with no pending tool calls
    Text(String),
    /// One or more tool calls, in the order the model listed them
    ToolCalls(Vec<ToolRequest>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A message to or from an LLM
pub struct Message {
    pub role: Role,
    pub created: i64,
    pub content: Vec<MessageContent>,
}

impl Message {
    fn new(role: Role) -> Self {
        Message {
            role,
            created: Utc::now().timestamp(),
            content: Vec::new(),
        }
    }

    /// Create a new system message with the current timestamp
    pub fn system() -> Self {
        Self::new(Role::System)
    }

    /// Create a new user message with the current timestamp
    pub fn user() -> Self {
        Self::new(Role::User)
    }

    /// Create a new assistant message with the current timestamp
    pub fn assistant() -> Self {
        Self::new(Role::Assistant)
    }

    /// Create a new tool message with the current timestamp
    pub fn tool() -> Self {
        Self::new(Role::Tool)
    }

    /// Add any MessageContent to the message
    pub fn with_content(mut self, content: MessageContent) -> Self {
        self.content.push(content);
        self
    }

    /// Add text content to the message
    pub fn with_text<S: Into<String>>(self, text: S) -> Self {
        self.with_content(MessageContent::text(text))
    }

    /// Add a tool request to the message
    pub fn with_tool_request<S: Into<String>>(
        self,
        id: S,
        tool_call: AgentResult<ToolCall>,
    ) -> Self {
        self.with_content(MessageContent::tool_request(id, tool_call))
    }

    /// Add a tool response to the message
    pub fn with_tool_response<S: Into<String>, T: Into<String>>(self, id: S, output: T) -> Self {
        self.with_content(MessageContent::tool_response(id, output))
    }

    /// All text content joined with newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(MessageContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn tool_requests(&self) -> Vec<&ToolRequest> {
        self.content
            .iter()
            .filter_map(MessageContent::as_tool_request)
            .collect()
    }

    pub fn reply(&self) -> Reply {
        let requests = self.tool_requests();
        if requests.is_empty() {
            Reply::Text(self.text())
        } else {
            Reply::ToolCalls(requests.into_iter().cloned().collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AgentError;
    use serde_json::json;

    #[test]
    fn test_text_joins_all_text_content() {
        let message = Message::assistant().with_text("first").with_text("second");
        assert_eq!(message.text(), "first\nsecond");
        assert_eq!(Message::assistant().text(), "");
    }

    #[test]
    fn test_reply_without_tool_requests_is_text() {
        let message = Message::assistant().with_text("Sales were up 4%");
        assert_eq!(message.reply(), Reply::Text("Sales were up 4%".to_string()));
    }

    #[test]
    fn test_reply_keeps_tool_request_order() {
        let message = Message::assistant()
            .with_text("Let me look that up")
            .with_tool_request(
                "call_1",
                Ok(ToolCall::new("lookup_sales_data", json!({"prompt": "a"}))),
            )
            .with_tool_request(
                "call_2",
                Err(AgentError::MalformedToolArguments("bad".into())),
            );

        match message.reply() {
            Reply::ToolCalls(requests) => {
                let ids: Vec<&str> = requests.iter().map(|r| r.id.as_str()).collect();
                assert_eq!(ids, vec!["call_1", "call_2"]);
            }
            Reply::Text(_) => panic!("Expected tool calls"),
        }
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let value = serde_json::to_value(Message::tool().with_tool_response("1", "ok")).unwrap();
        assert_eq!(value["role"], "tool");
    }
}
