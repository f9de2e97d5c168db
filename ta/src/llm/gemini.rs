//! Google Gemini API client implementation
//!
//! Implements the LlmClient trait over the `generateContent` REST
//! endpoint, including function-calling support for the weather tools.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{
    CompletionRequest, CompletionResponse, ContentBlock, LlmClient, LlmError, Message, MessageContent, Role,
    StopReason, TokenUsage, ToolCall,
};
use crate::config::LlmConfig;

/// Google Gemini API client
pub struct GeminiClient {
    model: String,
    api_key: String,
    base_url: String,
    http: Client,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
}

impl GeminiClient {
    /// Create a new client from configuration
    ///
    /// Resolves the API key from the environment (or `.env`) named in
    /// the config.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.get_api_key().map_err(|e| LlmError::Config(e.to_string()))?;

        let timeout = Duration::from_millis(config.timeout_ms);
        let http = Client::builder().timeout(timeout).build().map_err(LlmError::Network)?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout,
        })
    }

    /// Build the request body for the generateContent endpoint
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "system_instruction": {
                "parts": [{ "text": request.system_prompt }]
            },
            "contents": convert_messages(&request.messages),
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens.min(self.max_tokens),
            }
        });

        if !request.tools.is_empty() {
            let declarations: Vec<serde_json::Value> = request
                .tools
                .iter()
                .map(|t| {
                    serde_json::json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.input_schema,
                    })
                })
                .collect();
            body["tools"] = serde_json::json!([{ "functionDeclarations": declarations }]);
        }

        body
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let body = self.build_request_body(&request);

        debug!(model = %self.model, messages = request.messages.len(), tools = request.tools.len(), "Sending completion request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, self.timeout))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| classify_transport_error(e, self.timeout))?;

        if status.as_u16() == 429 {
            return Err(LlmError::RateLimited {
                retry_after: Duration::from_secs(60),
            });
        }
        if !status.is_success() {
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: extract_error_message(&text),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response body: {e}")))?;
        convert_response(parsed)
    }
}

/// Convert internal messages to Gemini `contents` entries
fn convert_messages(messages: &[Message]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Assistant => "model",
            };
            let parts: Vec<serde_json::Value> = match &msg.content {
                MessageContent::Text(text) => vec![serde_json::json!({ "text": text })],
                MessageContent::Blocks(blocks) => blocks.iter().map(convert_part).collect(),
            };
            serde_json::json!({ "role": role, "parts": parts })
        })
        .collect()
}

/// Convert a ContentBlock to a Gemini part
///
/// Gemini keys function responses by function name, so the tool_use_id
/// carried through these blocks is the function name.
fn convert_part(block: &ContentBlock) -> serde_json::Value {
    match block {
        ContentBlock::Text { text } => serde_json::json!({ "text": text }),
        ContentBlock::ToolUse { name, input, .. } => serde_json::json!({
            "functionCall": { "name": name, "args": input }
        }),
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => serde_json::json!({
            "functionResponse": {
                "name": tool_use_id,
                "response": { "content": content, "is_error": is_error }
            }
        }),
    }
}

/// Wire format of a generateContent response (fields we consume)
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(rename = "functionCall")]
    function_call: Option<FunctionCallPart>,
}

#[derive(Debug, Deserialize)]
struct FunctionCallPart {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_token_count: u64,
    #[serde(rename = "candidatesTokenCount", default)]
    candidates_token_count: u64,
}

/// Map a parsed wire response onto the internal CompletionResponse
fn convert_response(response: GenerateContentResponse) -> Result<CompletionResponse, LlmError> {
    let usage = response
        .usage_metadata
        .map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        })
        .unwrap_or_default();

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("Response contained no candidates".to_string()))?;

    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();
    if let Some(content) = candidate.content {
        for part in content.parts {
            if let Some(text) = part.text {
                text_parts.push(text);
            }
            if let Some(call) = part.function_call {
                tool_calls.push(ToolCall {
                    id: call.name.clone(),
                    name: call.name,
                    input: call.args,
                });
            }
        }
    }

    let stop_reason = if !tool_calls.is_empty() {
        StopReason::ToolUse
    } else {
        match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        }
    };

    let content = if text_parts.is_empty() {
        None
    } else {
        Some(text_parts.join(""))
    };

    Ok(CompletionResponse {
        content,
        tool_calls,
        stop_reason,
        usage,
    })
}

/// Pull a human-readable message out of an error response body
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn classify_transport_error(error: reqwest::Error, timeout: Duration) -> LlmError {
    if error.is_timeout() {
        LlmError::Timeout(timeout)
    } else {
        LlmError::Network(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::types::ToolDefinition;

    fn client() -> GeminiClient {
        GeminiClient {
            model: "gemini-2.0-flash".into(),
            api_key: "test-key".into(),
            base_url: "https://example.invalid/v1beta".into(),
            http: Client::new(),
            max_tokens: 1024,
            temperature: 0.7,
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_build_request_body_includes_tools() {
        let request = CompletionRequest {
            system_prompt: "You are a planner".into(),
            messages: vec![Message::user("plan Paris")],
            tools: vec![ToolDefinition {
                name: "get_current_weather".into(),
                description: "Current conditions".into(),
                input_schema: serde_json::json!({"type": "object"}),
            }],
            max_tokens: 4096,
            temperature: 0.2,
        };

        let body = client().build_request_body(&request);
        assert_eq!(body["system_instruction"]["parts"][0]["text"], "You are a planner");
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(
            body["tools"][0]["functionDeclarations"][0]["name"],
            "get_current_weather"
        );
        // request cap wins when below the configured ceiling
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1024);
    }

    #[test]
    fn test_build_request_body_without_tools() {
        let request = CompletionRequest {
            system_prompt: "advisor".into(),
            messages: vec![Message::user("hi")],
            tools: vec![],
            max_tokens: 256,
            temperature: 0.7,
        };
        let body = client().build_request_body(&request);
        assert!(body.get("tools").is_none());
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn test_convert_function_response_part() {
        let part = convert_part(&ContentBlock::tool_result("get_weather_alerts", "No alerts", false));
        assert_eq!(part["functionResponse"]["name"], "get_weather_alerts");
        assert_eq!(part["functionResponse"]["response"]["content"], "No alerts");
    }

    #[test]
    fn test_convert_response_text_only() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "Day 1: Louvre. " }, { "text": "Day 2: Montmartre." }] },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 34 }
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let response = convert_response(parsed).unwrap();

        assert_eq!(response.content.as_deref(), Some("Day 1: Louvre. Day 2: Montmartre."));
        assert_eq!(response.stop_reason, StopReason::EndTurn);
        assert!(response.tool_calls.is_empty());
        assert_eq!(response.usage.input_tokens, 12);
        assert_eq!(response.usage.output_tokens, 34);
    }

    #[test]
    fn test_convert_response_with_function_call() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{
                    "functionCall": { "name": "get_current_weather", "args": { "city": "Paris" } }
                }] },
                "finishReason": "STOP"
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let response = convert_response(parsed).unwrap();

        assert_eq!(response.stop_reason, StopReason::ToolUse);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "get_current_weather");
        assert_eq!(response.tool_calls[0].input["city"], "Paris");
    }

    #[test]
    fn test_convert_response_no_candidates() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({ "candidates": [] })).unwrap();
        assert!(matches!(convert_response(parsed), Err(LlmError::InvalidResponse(_))));
    }

    #[test]
    fn test_convert_response_max_tokens() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": { "parts": [{ "text": "truncated" }] },
                "finishReason": "MAX_TOKENS"
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(convert_response(parsed).unwrap().stop_reason, StopReason::MaxTokens);
    }

    #[test]
    fn test_extract_error_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid"}}"#;
        assert_eq!(extract_error_message(body), "API key not valid");
        assert_eq!(extract_error_message("plain failure"), "plain failure");
    }
}
