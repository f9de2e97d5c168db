//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent
///
/// This is the core abstraction for interacting with language models.
/// No conversation state is maintained between calls; the agent layer
/// assembles the full message list for every request.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Test doubles for the client trait
///
/// Not gated behind `cfg(test)` because the integration tests also
/// drive sessions against these.
pub mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Mock client that returns canned responses in order
    pub struct MockLlmClient {
        responses: Vec<CompletionResponse>,
        call_count: AtomicUsize,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<CompletionResponse>) -> Self {
            Self {
                responses,
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            self.responses
                .get(idx)
                .cloned()
                .ok_or_else(|| LlmError::InvalidResponse("No more mock responses".to_string()))
        }
    }

    /// Mock client that echoes each prompt back as the response text
    ///
    /// Records every request it sees, so tests can assert on assembled
    /// prompts.
    #[derive(Default)]
    pub struct EchoLlmClient {
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl EchoLlmClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// All requests seen so far
        pub fn requests(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmClient for EchoLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let echoed = request
                .messages
                .iter()
                .filter_map(|m| m.content.as_text())
                .collect::<Vec<_>>()
                .join("\n");
            self.requests.lock().unwrap().push(request);
            Ok(CompletionResponse::text(echoed))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::*;
    use super::*;
    use crate::llm::types::{CompletionResponse, Message};

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest {
            system_prompt: "test".into(),
            messages: vec![Message::user(text)],
            tools: vec![],
            max_tokens: 256,
            temperature: 0.0,
        }
    }

    #[tokio::test]
    async fn test_mock_returns_responses_in_order() {
        let mock = MockLlmClient::new(vec![CompletionResponse::text("one"), CompletionResponse::text("two")]);

        let first = mock.complete(request("a")).await.unwrap();
        let second = mock.complete(request("b")).await.unwrap();
        assert_eq!(first.content.as_deref(), Some("one"));
        assert_eq!(second.content.as_deref(), Some("two"));
        assert_eq!(mock.call_count(), 2);

        assert!(mock.complete(request("c")).await.is_err());
    }

    #[tokio::test]
    async fn test_echo_client_reflects_prompt() {
        let echo = EchoLlmClient::new();
        let response = echo.complete(request("plan Paris")).await.unwrap();
        assert_eq!(response.content.as_deref(), Some("plan Paris"));
        assert_eq!(echo.requests().len(), 1);
    }
}
