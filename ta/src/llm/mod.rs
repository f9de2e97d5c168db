//! LLM client module
//!
//! Provider-agnostic completion requests; the live provider is Google
//! Gemini, and a mock client backs the tests.

use std::sync::Arc;

use tracing::debug;

mod client;
mod error;
mod gemini;
mod types;

pub use client::LlmClient;
pub use client::mock::{EchoLlmClient, MockLlmClient};
pub use error::LlmError;
pub use gemini::GeminiClient;
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, Role, StopReason, TokenUsage,
    ToolCall, ToolDefinition,
};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "Creating LLM client");
    match config.provider.as_str() {
        "gemini" => Ok(Arc::new(GeminiClient::from_config(config)?)),
        other => Err(LlmError::Config(format!(
            "Unknown LLM provider: '{other}'. Supported: gemini"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_client_unknown_provider() {
        let config = LlmConfig {
            provider: "openai".to_string(),
            ..Default::default()
        };
        let err = create_client(&config).err().unwrap();
        assert!(matches!(err, LlmError::Config(_)));
        assert!(err.to_string().contains("openai"));
    }
}
