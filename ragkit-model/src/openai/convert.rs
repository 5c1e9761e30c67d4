//! Conversion between ragkit messages and the chat completions wire format.

use ragkit_core::{GenerationConfig, Message, RagError, Result, Role, ToolCall, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub(crate) struct CompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct WireMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct WireFunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as a string.
    pub arguments: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireTool {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: WireFunction,
}

#[derive(Debug, Serialize)]
pub(crate) struct WireFunction {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: WireMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    pub message: String,
}

fn function_type() -> String {
    "function".to_string()
}

pub(crate) fn build_request<'a>(
    model: &'a str,
    messages: &[Message],
    tools: &[ToolSpec],
    config: Option<&GenerationConfig>,
    default_temperature: Option<f32>,
) -> CompletionRequest<'a> {
    CompletionRequest {
        model,
        messages: messages.iter().map(to_wire_message).collect(),
        tools: tools.iter().map(to_wire_tool).collect(),
        temperature: config.and_then(|c| c.temperature).or(default_temperature),
        max_tokens: config.and_then(|c| c.max_output_tokens),
    }
}

pub(crate) fn to_wire_message(message: &Message) -> WireMessage {
    let content = if message.content.is_empty() && message.has_tool_calls() {
        None
    } else {
        Some(message.content.clone())
    };

    WireMessage {
        role: message.role.as_str().to_string(),
        content,
        tool_calls: message
            .tool_calls
            .iter()
            .map(|call| WireToolCall {
                id: call.id.clone(),
                kind: function_type(),
                function: WireFunctionCall {
                    name: call.name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect(),
        tool_call_id: message.tool_call_id.clone(),
    }
}

pub(crate) fn to_wire_tool(spec: &ToolSpec) -> WireTool {
    WireTool {
        kind: "function",
        function: WireFunction {
            name: spec.name.clone(),
            description: spec.description.clone(),
            parameters: spec.parameters.clone(),
        },
    }
}

/// Convert the first choice of a response into an Assistant message.
///
/// Tool call arguments arrive JSON-encoded; an empty string means no arguments.
pub(crate) fn from_response(model: &str, response: CompletionResponse) -> Result<Message> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| RagError::generation(model, "response contained no choices"))?;

    let tool_calls = choice
        .message
        .tool_calls
        .into_iter()
        .map(|call| -> Result<ToolCall> {
            let arguments = if call.function.arguments.trim().is_empty() {
                Value::Object(Default::default())
            } else {
                serde_json::from_str(&call.function.arguments).map_err(|e| {
                    RagError::generation(
                        model,
                        format!("tool call '{}' has invalid arguments: {e}", call.function.name),
                    )
                })?
            };
            Ok(ToolCall { id: call.id, name: call.function.name, arguments })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Message::new(Role::Assistant, choice.message.content.unwrap_or_default())
        .with_tool_calls(tool_calls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_uses_per_call_temperature_over_default() {
        let config = GenerationConfig { temperature: Some(0.2), max_output_tokens: Some(64) };
        let request = build_request("m", &[Message::user("hi")], &[], Some(&config), Some(0.7));
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["temperature"], json!(0.2f32));
        assert_eq!(body["max_tokens"], 64);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn tools_serialize_as_functions() {
        let spec = ToolSpec {
            name: "search_product".into(),
            description: "Search products".into(),
            parameters: json!({"type": "object"}),
        };
        let request = build_request("m", &[Message::user("hi")], &[spec], None, Some(0.7));
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["temperature"], json!(0.7f32));
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "search_product");
    }

    #[test]
    fn tool_result_message_carries_call_id() {
        let wire = to_wire_message(&Message::tool("call_1", "{\"ok\":true}"));
        assert_eq!(wire.role, "tool");
        assert_eq!(wire.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn parses_tool_calls_with_string_arguments() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": { "name": "search_product", "arguments": "{\"sql\":\"SELECT 1\"}" }
                    }]
                }
            }]
        }))
        .unwrap();

        let message = from_response("m", response).unwrap();
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.tool_calls[0].arguments, json!({"sql": "SELECT 1"}));
    }

    #[test]
    fn invalid_arguments_are_a_generation_error() {
        let response: CompletionResponse = serde_json::from_value(json!({
            "choices": [{ "message": { "role": "assistant", "tool_calls": [{
                "id": "c", "function": { "name": "f", "arguments": "{not json" }
            }]}}]
        }))
        .unwrap();

        assert!(matches!(from_response("m", response), Err(RagError::Generation { .. })));
    }

    #[test]
    fn empty_choices_are_a_generation_error() {
        let response = CompletionResponse { choices: vec![] };
        assert!(from_response("m", response).is_err());
    }
}
