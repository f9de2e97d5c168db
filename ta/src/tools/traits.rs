//! Tool trait definition

use async_trait::async_trait;
use serde_json::Value;

/// A capability the model can invoke while composing a response
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the model's function-call name)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool
    async fn execute(&self, input: Value) -> ToolResult;
}

/// Result of a tool execution
///
/// Failures are returned to the model as error-flagged content rather
/// than propagated, so a dead weather provider degrades the answer
/// instead of aborting the exchange.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_success() {
        let result = ToolResult::success("22°C, clear sky");
        assert!(!result.is_error);
        assert_eq!(result.content, "22°C, clear sky");
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("city not found");
        assert!(result.is_error);
        assert_eq!(result.content, "city not found");
    }
}
