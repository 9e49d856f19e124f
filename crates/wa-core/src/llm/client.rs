//! Chat API HTTP client
//!
//! One client per resolved provider. Requests are converted to the
//! backend's wire format on the way out and normalized into a
//! [`ChatTurn`] on the way back, so the agent loop never sees
//! provider-specific shapes.

use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::provider::{ProviderKind, ResolvedProvider};

use super::types::*;

/// Fixed Gemini API root; this backend ignores `BASE_URL`.
const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// HTTP timeout for a single model call.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Chat client bound to one resolved provider
#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    provider: ResolvedProvider,
}

impl ChatClient {
    /// Create a new chat client
    pub fn new(provider: ResolvedProvider) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(Error::Http)?;

        Ok(Self { client, provider })
    }

    /// Get the effective model name
    pub fn model(&self) -> &str {
        &self.provider.model
    }

    /// Send one conversation state, get one normalized assistant turn
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatTurn> {
        match self.provider.kind {
            ProviderKind::OpenAiCompat => self.send_openai(messages, tools).await,
            ProviderKind::Ollama => self.send_ollama(messages, tools).await,
            ProviderKind::Gemini => self.send_gemini(messages, tools).await,
        }
    }

    /// POST and return the body, normalizing HTTP-level failures.
    async fn post_json(
        &self,
        url: &str,
        bearer: bool,
        body: &impl serde::Serialize,
    ) -> Result<String> {
        debug!("Sending request to {}", url);

        let mut req = self.client.post(url).header("content-type", "application/json");
        if bearer {
            req = req.header("Authorization", format!("Bearer {}", self.provider.api_key));
        }

        let response = req.json(body).send().await.map_err(Error::Http)?;
        let status = response.status();
        let text = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            warn!("Model API error: {} - {}", status, text);
            return Err(Error::Api(format!("{}: {}", status, text)));
        }

        Ok(text)
    }

    async fn send_openai(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatTurn> {
        let base = self
            .provider
            .base_url
            .as_deref()
            .ok_or_else(|| Error::Config("missing endpoint for OpenAI-compatible backend".into()))?;
        let url = format!("{}/chat/completions", base.trim_end_matches('/'));

        let request = OpenAiRequest::from_chat(&self.provider.model, messages, tools);
        let body = self.post_json(&url, true, &request).await?;

        let parsed: OpenAiResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("Failed to parse response: {} - {}", e, body)))?;
        Ok(parsed.into_turn())
    }

    async fn send_ollama(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatTurn> {
        let base = self
            .provider
            .base_url
            .as_deref()
            .ok_or_else(|| Error::Config("missing endpoint for Ollama backend".into()))?;
        let url = format!("{}/api/chat", base.trim_end_matches('/'));

        let num_ctx = self.provider.num_ctx.unwrap_or(2048);
        let request = OllamaRequest::from_chat(&self.provider.model, num_ctx, messages, tools);
        let body = self.post_json(&url, true, &request).await?;

        let parsed: OllamaResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("Failed to parse response: {} - {}", e, body)))?;
        Ok(parsed.into_turn())
    }

    async fn send_gemini(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolDefinition],
    ) -> Result<ChatTurn> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            GEMINI_ENDPOINT, self.provider.model, self.provider.api_key
        );

        let request = GeminiRequest::from_chat(messages, tools);
        let body = self.post_json(&url, false, &request).await?;

        let parsed: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Api(format!("Failed to parse response: {} - {}", e, body)))?;
        Ok(parsed.into_turn())
    }

    /// Run the tool-calling loop for one task.
    ///
    /// The executor runs each requested tool against the live session
    /// and may attach an image to its result (visual mode); any images
    /// from a round are fed back as a separate user message. The loop
    /// ends on a plain completion, a `done` tool call, or the
    /// iteration cap.
    pub async fn run_agent_loop(
        &self,
        system: &str,
        task: &str,
        tools: &[ToolDefinition],
        max_iterations: usize,
        tool_executor: impl Fn(&str, &serde_json::Value) -> Result<ToolExecution>,
    ) -> Result<AgentLoopResult> {
        let mut messages = vec![ChatMessage::system(system), ChatMessage::user(task)];
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > max_iterations {
                info!("Agent reached iteration cap ({})", max_iterations);
                return Ok(AgentLoopResult {
                    final_text: "Max iterations reached".to_string(),
                    iterations,
                });
            }

            let turn = self.chat(&messages, tools).await?;

            if turn.tool_calls.is_empty() {
                if let StopKind::Other(reason) = &turn.stop {
                    warn!("Model stopped with reason: {}", reason);
                }
                return Ok(AgentLoopResult {
                    final_text: turn.text,
                    iterations,
                });
            }

            let tool_calls = turn.tool_calls.clone();
            messages.push(ChatMessage::assistant_with_calls(turn.text, turn.tool_calls));

            let mut round_images = Vec::new();
            let mut finished = false;
            for call in &tool_calls {
                debug!("Executing tool: {} with input: {}", call.name, call.arguments);
                let execution = match tool_executor(&call.name, &call.arguments) {
                    Ok(execution) => execution,
                    Err(e) => ToolExecution::error(format!("Error: {}", e)),
                };
                if call.name == "done" {
                    finished = true;
                }
                if let Some(image) = execution.image {
                    round_images.push(image);
                }
                messages.push(ChatMessage::tool_result(
                    &call.id,
                    &call.name,
                    truncate(&execution.output, 8_000),
                ));
            }

            if finished {
                return Ok(AgentLoopResult {
                    final_text: "done".to_string(),
                    iterations,
                });
            }

            if !round_images.is_empty() {
                messages.push(ChatMessage::user_with_images(
                    "Current page screenshot:",
                    round_images,
                ));
            }
        }
    }
}

/// Result of one tool execution inside the loop
#[derive(Debug, Clone)]
pub struct ToolExecution {
    pub output: String,
    pub is_error: bool,
    /// Viewport snapshot to feed back to the model (visual mode).
    pub image: Option<ImageSource>,
}

impl ToolExecution {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: false,
            image: None,
        }
    }

    pub fn error(output: impl Into<String>) -> Self {
        Self {
            output: output.into(),
            is_error: true,
            image: None,
        }
    }

    pub fn with_image(mut self, image: Option<ImageSource>) -> Self {
        self.image = image;
        self
    }
}

/// Result of agent loop execution
#[derive(Debug)]
pub struct AgentLoopResult {
    pub final_text: String,
    pub iterations: usize,
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() > max {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &text[..end])
    } else {
        text.to_string()
    }
}
