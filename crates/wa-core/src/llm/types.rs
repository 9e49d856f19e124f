//! Chat API types
//!
//! The canonical in-memory shape follows the OpenAI chat-completions
//! model (most supported backends speak it natively); Ollama and Gemini
//! requests/responses are converted at the wire boundary.

use serde::{Deserialize, Serialize};

/// Message in conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
    /// Tool calls requested by an assistant message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool-result messages: the call being answered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// For tool-result messages: the tool's name (Gemini needs it).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(text: impl Into<String>) -> Self {
        Self::text("system", text)
    }

    /// Create a user message with text
    pub fn user(text: impl Into<String>) -> Self {
        Self::text("user", text)
    }

    /// Create an assistant message with text
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text("assistant", text)
    }

    fn text(role: &str, text: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            content: vec![ContentPart::Text { text: text.into() }],
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a user message with text and images
    pub fn user_with_images(text: impl Into<String>, images: Vec<ImageSource>) -> Self {
        let mut content = vec![ContentPart::Text { text: text.into() }];
        for image in images {
            content.push(ContentPart::Image { source: image });
        }
        Self {
            role: "user".to_string(),
            content,
            tool_calls: Vec::new(),
            tool_call_id: None,
            name: None,
        }
    }

    /// Create an assistant message carrying tool calls
    pub fn assistant_with_calls(text: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        let text = text.into();
        let content = if text.is_empty() {
            Vec::new()
        } else {
            vec![ContentPart::Text { text }]
        };
        Self {
            role: "assistant".to_string(),
            content,
            tool_calls,
            tool_call_id: None,
            name: None,
        }
    }

    /// Create a tool-result message answering a call
    pub fn tool_result(
        call_id: impl Into<String>,
        tool_name: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            role: "tool".to_string(),
            content: vec![ContentPart::Text {
                text: output.into(),
            }],
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
            name: Some(tool_name.into()),
        }
    }

    /// Get text content from message
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                ContentPart::Text { text } => Some(text.clone()),
                ContentPart::Image { .. } => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Check if message contains images
    pub fn has_images(&self) -> bool {
        self.content
            .iter()
            .any(|c| matches!(c, ContentPart::Image { .. }))
    }
}

/// Content block in a message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    Image { source: ImageSource },
}

/// Base64 image attached to a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageSource {
    pub media_type: String,
    pub data: String,
}

impl ImageSource {
    pub const MEDIA_TYPE_PNG: &'static str = "image/png";

    /// Create an image source from raw bytes (encodes to base64)
    pub fn from_bytes(media_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            media_type: media_type.into(),
            data: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes),
        }
    }

    /// Create a PNG image source from bytes
    pub fn png(bytes: &[u8]) -> Self {
        Self::from_bytes(Self::MEDIA_TYPE_PNG, bytes)
    }

    /// Convert to a data URL
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A tool call requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Tool definition advertised to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Why the model stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopKind {
    End,
    ToolCalls,
    Other(String),
}

/// One assistant turn, normalized across backends
#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub text: String,
    pub tool_calls: Vec<ToolCall>,
    pub stop: StopKind,
}

// ============================================================================
// OpenAI-compatible wire types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiTool>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiMessage {
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<OpenAiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<OpenAiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OpenAiContent {
    Text(String),
    Parts(Vec<OpenAiPart>),
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAiPart {
    Text { text: String },
    ImageUrl { image_url: OpenAiImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiTool {
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: OpenAiFunction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl From<&ToolDefinition> for OpenAiTool {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: OpenAiFunction {
                name: tool.name.clone(),
                description: tool.description.clone(),
                parameters: tool.parameters.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: OpenAiFunctionCall,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiFunctionCall {
    pub name: String,
    pub arguments: String,
}

impl From<&ChatMessage> for OpenAiMessage {
    fn from(msg: &ChatMessage) -> Self {
        let content = if msg.has_images() {
            let parts = msg
                .content
                .iter()
                .map(|p| match p {
                    ContentPart::Text { text } => OpenAiPart::Text { text: text.clone() },
                    ContentPart::Image { source } => OpenAiPart::ImageUrl {
                        image_url: OpenAiImageUrl {
                            url: source.to_data_url(),
                        },
                    },
                })
                .collect();
            Some(OpenAiContent::Parts(parts))
        } else if msg.content.is_empty() {
            None
        } else {
            Some(OpenAiContent::Text(msg.text_content()))
        };

        let tool_calls = if msg.tool_calls.is_empty() {
            None
        } else {
            Some(
                msg.tool_calls
                    .iter()
                    .map(|tc| OpenAiToolCall {
                        id: tc.id.clone(),
                        call_type: "function".to_string(),
                        function: OpenAiFunctionCall {
                            name: tc.name.clone(),
                            arguments: tc.arguments.to_string(),
                        },
                    })
                    .collect(),
            )
        };

        Self {
            role: msg.role.clone(),
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

impl OpenAiRequest {
    pub fn from_chat(
        model: &str,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Self {
        Self {
            model: model.to_string(),
            messages: messages.iter().map(OpenAiMessage::from).collect(),
            max_tokens: Some(4096),
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.iter().map(OpenAiTool::from).collect())
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponse {
    pub choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    pub message: OpenAiChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<OpenAiResponseToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponseToolCall {
    pub id: String,
    pub function: OpenAiResponseFunction,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponseFunction {
    pub name: String,
    /// JSON-encoded argument object.
    pub arguments: String,
}

impl OpenAiResponse {
    pub fn into_turn(self) -> ChatTurn {
        let Some(choice) = self.choices.into_iter().next() else {
            return ChatTurn {
                text: String::new(),
                tool_calls: Vec::new(),
                stop: StopKind::End,
            };
        };

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| ToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: serde_json::from_str(&tc.function.arguments)
                    .unwrap_or(serde_json::Value::Null),
            })
            .collect::<Vec<_>>();

        let stop = match choice.finish_reason.as_deref() {
            Some("stop") | None => StopKind::End,
            Some("tool_calls") => StopKind::ToolCalls,
            Some(other) => StopKind::Other(other.to_string()),
        };

        ChatTurn {
            text: choice.message.content.unwrap_or_default(),
            tool_calls,
            stop,
        }
    }
}

// ============================================================================
// Ollama native chat wire types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OllamaRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
    pub options: OllamaOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<OpenAiTool>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OllamaOptions {
    pub num_ctx: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OllamaMessage {
    pub role: String,
    pub content: String,
    /// Raw base64 payloads, no data-URL wrapper.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl From<&ChatMessage> for OllamaMessage {
    fn from(msg: &ChatMessage) -> Self {
        let images: Vec<String> = msg
            .content
            .iter()
            .filter_map(|p| match p {
                ContentPart::Image { source } => Some(source.data.clone()),
                ContentPart::Text { .. } => None,
            })
            .collect();
        Self {
            role: msg.role.clone(),
            content: msg.text_content(),
            images: if images.is_empty() { None } else { Some(images) },
        }
    }
}

impl OllamaRequest {
    pub fn from_chat(
        model: &str,
        num_ctx: u32,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Self {
        Self {
            model: model.to_string(),
            messages: messages.iter().map(OllamaMessage::from).collect(),
            stream: false,
            options: OllamaOptions { num_ctx },
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.iter().map(OpenAiTool::from).collect())
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaResponse {
    pub message: OllamaResponseMessage,
    #[serde(default)]
    pub done_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaResponseMessage {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tool_calls: Option<Vec<OllamaToolCall>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaToolCall {
    pub function: OllamaFunctionCall,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaFunctionCall {
    pub name: String,
    /// Already-structured argument object.
    pub arguments: serde_json::Value,
}

impl OllamaResponse {
    /// Ollama does not assign call ids; synthesize stable ones.
    pub fn into_turn(self) -> ChatTurn {
        let tool_calls: Vec<ToolCall> = self
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, tc)| ToolCall {
                id: format!("call_{}", i),
                name: tc.function.name,
                arguments: tc.function.arguments,
            })
            .collect();

        let stop = if !tool_calls.is_empty() {
            StopKind::ToolCalls
        } else {
            match self.done_reason.as_deref() {
                Some("stop") | None => StopKind::End,
                Some(other) => StopKind::Other(other.to_string()),
            }
        };

        ChatTurn {
            text: self.message.content,
            tool_calls,
            stop,
        }
    }
}

// ============================================================================
// Gemini wire types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<GeminiToolset>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Absent when generation was cut off before any output.
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum GeminiPart {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "inlineData")]
    InlineData(GeminiBlob),
    #[serde(rename = "functionCall")]
    FunctionCall(GeminiFunctionCall),
    #[serde(rename = "functionResponse")]
    FunctionResponse(GeminiFunctionResponse),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiBlob {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiFunctionResponse {
    pub name: String,
    pub response: serde_json::Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiToolset {
    pub function_declarations: Vec<GeminiFunctionDecl>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiFunctionDecl {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl GeminiRequest {
    pub fn from_chat(messages: &[ChatMessage], tools: &[ToolDefinition]) -> Self {
        let mut system_instruction = None;
        let mut contents: Vec<GeminiContent> = Vec::new();

        for msg in messages {
            match msg.role.as_str() {
                "system" => {
                    system_instruction = Some(GeminiContent {
                        role: None,
                        parts: vec![GeminiPart::Text(msg.text_content())],
                    });
                }
                "assistant" => {
                    let mut parts = Vec::new();
                    let text = msg.text_content();
                    if !text.is_empty() {
                        parts.push(GeminiPart::Text(text));
                    }
                    for tc in &msg.tool_calls {
                        parts.push(GeminiPart::FunctionCall(GeminiFunctionCall {
                            name: tc.name.clone(),
                            args: tc.arguments.clone(),
                        }));
                    }
                    contents.push(GeminiContent {
                        role: Some("model".to_string()),
                        parts,
                    });
                }
                "tool" => {
                    contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts: vec![GeminiPart::FunctionResponse(GeminiFunctionResponse {
                            name: msg.name.clone().unwrap_or_default(),
                            response: serde_json::json!({ "result": msg.text_content() }),
                        })],
                    });
                }
                _ => {
                    let parts = msg
                        .content
                        .iter()
                        .map(|p| match p {
                            ContentPart::Text { text } => GeminiPart::Text(text.clone()),
                            ContentPart::Image { source } => {
                                GeminiPart::InlineData(GeminiBlob {
                                    mime_type: source.media_type.clone(),
                                    data: source.data.clone(),
                                })
                            }
                        })
                        .collect();
                    contents.push(GeminiContent {
                        role: Some("user".to_string()),
                        parts,
                    });
                }
            }
        }

        Self {
            system_instruction,
            contents,
            tools: if tools.is_empty() {
                None
            } else {
                Some(vec![GeminiToolset {
                    function_declarations: tools
                        .iter()
                        .map(|t| GeminiFunctionDecl {
                            name: t.name.clone(),
                            description: t.description.clone(),
                            parameters: t.parameters.clone(),
                        })
                        .collect(),
                }])
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: GeminiContent,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl GeminiResponse {
    pub fn into_turn(self) -> ChatTurn {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ChatTurn {
                text: String::new(),
                tool_calls: Vec::new(),
                stop: StopKind::End,
            };
        };

        let mut text_parts = Vec::new();
        let mut tool_calls = Vec::new();
        for part in candidate.content.parts {
            match part {
                GeminiPart::Text(t) => text_parts.push(t),
                GeminiPart::FunctionCall(fc) => tool_calls.push(ToolCall {
                    id: format!("call_{}", tool_calls.len()),
                    name: fc.name,
                    arguments: fc.args,
                }),
                _ => {}
            }
        }

        let stop = if !tool_calls.is_empty() {
            StopKind::ToolCalls
        } else {
            match candidate.finish_reason.as_deref() {
                Some("STOP") | None => StopKind::End,
                Some(other) => StopKind::Other(other.to_string()),
            }
        };

        ChatTurn {
            text: text_parts.join("\n"),
            tool_calls,
            stop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_content_joins_text_parts() {
        let msg = ChatMessage::user_with_images("look", vec![ImageSource::png(b"img")]);
        assert_eq!(msg.text_content(), "look");
        assert!(msg.has_images());
    }

    #[test]
    fn test_image_source_data_url() {
        let img = ImageSource::from_bytes("image/png", b"test");
        assert!(img.to_data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_openai_request_plain_text() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let req = OpenAiRequest::from_chat("gpt-4o-mini", &messages, &[]);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "gpt-4o-mini");
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][0]["content"], "sys");
        assert_eq!(v["messages"][1]["content"], "hi");
        assert!(v.get("tools").is_none());
    }

    #[test]
    fn test_openai_request_image_parts() {
        let messages = vec![ChatMessage::user_with_images(
            "what is this",
            vec![ImageSource::png(b"bytes")],
        )];
        let req = OpenAiRequest::from_chat("gpt-4o-mini", &messages, &[]);
        let v = serde_json::to_value(&req).unwrap();
        let parts = v["messages"][0]["content"].as_array().unwrap();
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[1]["type"], "image_url");
        assert!(
            parts[1]["image_url"]["url"]
                .as_str()
                .unwrap()
                .starts_with("data:image/png;base64,")
        );
    }

    #[test]
    fn test_openai_request_tool_result_message() {
        let messages = vec![ChatMessage::tool_result("call_0", "navigate", "At: page")];
        let req = OpenAiRequest::from_chat("m", &messages, &[]);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["messages"][0]["role"], "tool");
        assert_eq!(v["messages"][0]["tool_call_id"], "call_0");
        assert_eq!(v["messages"][0]["content"], "At: page");
    }

    #[test]
    fn test_openai_request_tool_definitions() {
        let tools = vec![ToolDefinition::new(
            "navigate",
            "Go to a URL",
            json!({"type": "object", "properties": {"url": {"type": "string"}}}),
        )];
        let req = OpenAiRequest::from_chat("m", &[ChatMessage::user("x")], &tools);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["tools"][0]["type"], "function");
        assert_eq!(v["tools"][0]["function"]["name"], "navigate");
    }

    #[test]
    fn test_openai_response_into_turn_tool_calls() {
        let body = json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_abc",
                        "type": "function",
                        "function": {"name": "click", "arguments": "{\"selector\": \"#go\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }]
        });
        let resp: OpenAiResponse = serde_json::from_value(body).unwrap();
        let turn = resp.into_turn();
        assert_eq!(turn.stop, StopKind::ToolCalls);
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].name, "click");
        assert_eq!(turn.tool_calls[0].arguments["selector"], "#go");
    }

    #[test]
    fn test_openai_response_into_turn_text() {
        let body = json!({
            "choices": [{
                "message": {"content": "done"},
                "finish_reason": "stop"
            }]
        });
        let turn = serde_json::from_value::<OpenAiResponse>(body)
            .unwrap()
            .into_turn();
        assert_eq!(turn.text, "done");
        assert_eq!(turn.stop, StopKind::End);
        assert!(turn.tool_calls.is_empty());
    }

    #[test]
    fn test_ollama_request_shape() {
        let messages = vec![ChatMessage::user("hi")];
        let req = OllamaRequest::from_chat("qwen2.5", 32_000, &messages, &[]);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["stream"], false);
        assert_eq!(v["options"]["num_ctx"], 32_000);
        assert_eq!(v["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_ollama_response_synthesizes_call_ids() {
        let body = json!({
            "message": {
                "content": "",
                "tool_calls": [
                    {"function": {"name": "navigate", "arguments": {"url": "https://example.com"}}},
                    {"function": {"name": "read_text", "arguments": {}}}
                ]
            },
            "done_reason": "stop"
        });
        let turn = serde_json::from_value::<OllamaResponse>(body)
            .unwrap()
            .into_turn();
        assert_eq!(turn.stop, StopKind::ToolCalls);
        assert_eq!(turn.tool_calls[0].id, "call_0");
        assert_eq!(turn.tool_calls[1].id, "call_1");
        assert_eq!(turn.tool_calls[0].arguments["url"], "https://example.com");
    }

    #[test]
    fn test_gemini_request_roles_and_system() {
        let messages = vec![
            ChatMessage::system("you are a browser"),
            ChatMessage::user("go"),
            ChatMessage::assistant_with_calls(
                "",
                vec![ToolCall {
                    id: "call_0".into(),
                    name: "navigate".into(),
                    arguments: json!({"url": "https://example.com"}),
                }],
            ),
            ChatMessage::tool_result("call_0", "navigate", "At: https://example.com"),
        ];
        let req = GeminiRequest::from_chat(&messages, &[]);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v["systemInstruction"]["parts"][0]["text"],
            "you are a browser"
        );
        assert_eq!(v["contents"][0]["role"], "user");
        assert_eq!(v["contents"][1]["role"], "model");
        assert_eq!(
            v["contents"][1]["parts"][0]["functionCall"]["name"],
            "navigate"
        );
        assert_eq!(
            v["contents"][2]["parts"][0]["functionResponse"]["name"],
            "navigate"
        );
    }

    #[test]
    fn test_gemini_response_into_turn() {
        let body = json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "clicking now"},
                        {"functionCall": {"name": "click", "args": {"selector": "a"}}}
                    ]
                },
                "finishReason": "STOP"
            }]
        });
        let turn = serde_json::from_value::<GeminiResponse>(body)
            .unwrap()
            .into_turn();
        assert_eq!(turn.text, "clicking now");
        assert_eq!(turn.stop, StopKind::ToolCalls);
        assert_eq!(turn.tool_calls[0].name, "click");
    }

    #[test]
    fn test_gemini_empty_candidates() {
        let turn = serde_json::from_value::<GeminiResponse>(json!({}))
            .unwrap()
            .into_turn();
        assert_eq!(turn.stop, StopKind::End);
        assert!(turn.text.is_empty());
    }
}
