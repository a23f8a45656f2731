use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::collections::HashSet;

use crate::errors::{AgentError, AgentResult};
use crate::models::message::{Message, MessageContent};
use crate::models::role::Role;
use crate::models::tool::{Tool, ToolCall};

lazy_static! {
    static ref INVALID_NAME_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9_-]").unwrap();
    static ref VALID_NAME: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Convert internal Message format to OpenAI's API message specification
pub fn messages_to_openai_spec(messages: &[Message]) -> Vec<Value> {
    let mut messages_spec = Vec::new();

    for message in messages {
        let mut converted = Map::new();
        converted.insert("role".to_string(), json!(message.role));

        let mut output = Vec::new();
        let mut tool_calls = Vec::new();

        for content in &message.content {
            match content {
                MessageContent::Text(text) => {
                    if !text.is_empty() {
                        converted.insert("content".to_string(), json!(message.text()));
                    }
                }
                MessageContent::ToolRequest(request) => {
                    // Requests that failed to decode are never dispatched, so they are not echoed
                    if let Ok(tool_call) = &request.tool_call {
                        tool_calls.push(json!({
                            "id": request.id,
                            "type": "function",
                            "function": {
                                "name": sanitize_function_name(&tool_call.name),
                                "arguments": tool_call.arguments.to_string(),
                            }
                        }));
                    }
                }
                MessageContent::ToolResponse(response) => {
                    output.push(json!({
                        "role": Role::Tool,
                        "content": response.output,
                        "tool_call_id": response.id
                    }));
                }
            }
        }

        if !tool_calls.is_empty() {
            converted.insert("tool_calls".to_string(), Value::Array(tool_calls));
        }

        if converted.contains_key("content") || converted.contains_key("tool_calls") {
            output.insert(0, Value::Object(converted));
        }
        messages_spec.extend(output);
    }

    messages_spec
}

/// Convert internal Tool format to OpenAI's API tool specification
pub fn tools_to_openai_spec(tools: &[Tool]) -> AgentResult<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(AgentError::Configuration(format!(
                "Duplicate tool name: {}",
                tool.name
            )));
        }

        result.push(json!({
            "type": "function",
            "function": {
                "name": tool.name,
                "description": tool.description,
                "parameters": tool.parameters,
            }
        }));
    }

    Ok(result)
}

/// Convert OpenAI's API response to internal Message format
///
/// The response must carry `choices[0].message` with `content` that is text or null and
/// `tool_calls` that is an array or null. Anything else is a decode error. Individual tool
/// calls with a bad name or unparsable arguments are kept as failed requests so the router
/// can report them against their id.
pub fn openai_response_to_message(response: &Value) -> AgentResult<Message> {
    let original = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .and_then(|choice| choice.get("message"))
        .and_then(Value::as_object)
        .ok_or_else(|| AgentError::Decode("response has no choices[0].message".to_string()))?;

    let mut message = Message::assistant();

    match original.get("content") {
        None | Some(Value::Null) => {}
        Some(Value::String(text)) => message = message.with_text(text.as_str()),
        Some(other) => {
            return Err(AgentError::Decode(format!(
                "message content is neither text nor null: {}",
                other
            )))
        }
    }

    let tool_calls = match original.get("tool_calls") {
        None | Some(Value::Null) => return Ok(message),
        Some(Value::Array(tool_calls)) => tool_calls,
        Some(other) => {
            return Err(AgentError::Decode(format!(
                "tool_calls is not an array: {}",
                other
            )))
        }
    };

    for tool_call in tool_calls {
        let id = tool_call
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::Decode(format!("tool call without an id: {}", tool_call)))?;
        let function_name = tool_call
            .pointer("/function/name")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                AgentError::Decode(format!("tool call {} has no function name", id))
            })?;
        let arguments = tool_call
            .pointer("/function/arguments")
            .and_then(Value::as_str)
            .unwrap_or("{}");

        let request = if !is_valid_function_name(function_name) {
            Err(AgentError::UnknownTool(format!(
                "The provided function name '{}' had invalid characters, it must match this regex [a-zA-Z0-9_-]+",
                function_name
            )))
        } else {
            serde_json::from_str::<Value>(arguments)
                .map(|params| ToolCall::new(function_name, params))
                .map_err(|e| {
                    AgentError::MalformedToolArguments(format!(
                        "Could not interpret tool use parameters for id {}: {}",
                        id, e
                    ))
                })
        };
        message = message.with_tool_request(id, request);
    }

    Ok(message)
}

fn sanitize_function_name(name: &str) -> String {
    INVALID_NAME_CHARS.replace_all(name, "_").to_string()
}

fn is_valid_function_name(name: &str) -> bool {
    VALID_NAME.is_match(name)
}
