//! ToolExecutor - manages tool execution for an agent

use std::collections::HashMap;
use std::sync::Arc;

use crate::llm::{ToolCall, ToolDefinition};
use crate::weather::WeatherClient;

use super::weather::{AlertsTool, CurrentWeatherTool, ForecastTool};
use super::{Tool, ToolResult};

/// Manages tool execution for an agent
pub struct ToolExecutor {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolExecutor {
    /// Create an executor with the three weather tools
    pub fn weather(client: Arc<WeatherClient>) -> Self {
        let mut executor = Self::empty();
        executor.add_tool(Box::new(CurrentWeatherTool::new(client.clone())));
        executor.add_tool(Box::new(ForecastTool::new(client.clone())));
        executor.add_tool(Box::new(AlertsTool::new(client)));
        executor
    }

    /// Create an empty executor (agents without capabilities, tests)
    pub fn empty() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Add a tool to the executor
    pub fn add_tool(&mut self, tool: Box<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Get tool definitions for the LLM request
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Execute a tool call
    pub async fn execute(&self, tool_call: &ToolCall) -> ToolResult {
        match self.tools.get(&tool_call.name) {
            Some(tool) => tool.execute(tool_call.input.clone()).await,
            None => ToolResult::error(format!("Unknown tool: {}", tool_call.name)),
        }
    }

    /// Execute multiple tool calls in order
    pub async fn execute_all(&self, tool_calls: &[ToolCall]) -> Vec<(String, ToolResult)> {
        let mut results = Vec::with_capacity(tool_calls.len());

        for call in tool_calls {
            let result = self.execute(call).await;
            results.push((call.id.clone(), result));
        }

        results
    }

    /// Check if a tool exists
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get tool names
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StaticTool;

    #[async_trait]
    impl Tool for StaticTool {
        fn name(&self) -> &'static str {
            "static"
        }

        fn description(&self) -> &'static str {
            "Always answers the same thing"
        }

        fn input_schema(&self) -> serde_json::Value {
            serde_json::json!({ "type": "object" })
        }

        async fn execute(&self, _input: serde_json::Value) -> ToolResult {
            ToolResult::success("fixed")
        }
    }

    #[tokio::test]
    async fn test_execute_known_and_unknown_tools() {
        let mut executor = ToolExecutor::empty();
        executor.add_tool(Box::new(StaticTool));
        assert!(executor.has_tool("static"));

        let ok = executor
            .execute(&ToolCall {
                id: "static".into(),
                name: "static".into(),
                input: serde_json::json!({}),
            })
            .await;
        assert!(!ok.is_error);
        assert_eq!(ok.content, "fixed");

        let missing = executor
            .execute(&ToolCall {
                id: "nope".into(),
                name: "nope".into(),
                input: serde_json::json!({}),
            })
            .await;
        assert!(missing.is_error);
    }

    #[test]
    fn test_definitions_cover_all_tools() {
        let mut executor = ToolExecutor::empty();
        executor.add_tool(Box::new(StaticTool));
        let defs = executor.definitions();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "static");
    }
}
