//! The agent roster
//!
//! Three role-bound agents share one model connection and differ only
//! in their static instructions and whether the weather capability is
//! attached. Roles are a closed enum (`tripstore::AgentKind`) dispatched
//! by exhaustive matching.

use std::sync::Arc;

use tracing::{debug, warn};
use tripstore::AgentKind;

use crate::config::LlmConfig;
use crate::llm::{CompletionRequest, CompletionResponse, ContentBlock, LlmClient, LlmError, Message, StopReason};
use crate::prompts::embedded;
use crate::tools::ToolExecutor;
use crate::weather::WeatherClient;

/// Cap on model/tool round-trips within one `run`
const MAX_TOOL_TURNS: usize = 8;

/// Static role instructions
pub fn instructions(kind: AgentKind) -> &'static str {
    match kind {
        AgentKind::Itinerary => embedded::ITINERARY_INSTRUCTIONS,
        AgentKind::Advisor => embedded::ADVISOR_INSTRUCTIONS,
        AgentKind::Memory => embedded::MEMORY_INSTRUCTIONS,
    }
}

/// Whether a role gets the weather capability
pub fn has_weather(kind: AgentKind) -> bool {
    match kind {
        AgentKind::Itinerary | AgentKind::Advisor => true,
        AgentKind::Memory => false,
    }
}

/// A role-bound conversational agent
///
/// Immutable after construction: a role, a model connection, and the
/// role's tool set. No local state survives between `run` calls.
pub struct Agent {
    kind: AgentKind,
    llm: Arc<dyn LlmClient>,
    executor: ToolExecutor,
    max_tokens: u32,
    temperature: f32,
}

impl Agent {
    fn new(kind: AgentKind, llm: Arc<dyn LlmClient>, weather: Option<Arc<WeatherClient>>, config: &LlmConfig) -> Self {
        let executor = match weather {
            Some(client) if has_weather(kind) => ToolExecutor::weather(client),
            _ => ToolExecutor::empty(),
        };
        Self {
            kind,
            llm,
            executor,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Which role this agent plays
    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    /// Send a prompt to the model and return its textual answer
    ///
    /// Runs the tool loop: when the model requests function calls, they
    /// are executed and their results fed back until the model ends its
    /// turn or the turn cap is hit. Text emitted across turns is
    /// concatenated.
    pub async fn run(&self, prompt: &str) -> Result<String, LlmError> {
        let tool_defs = self.executor.definitions();
        let mut messages = vec![Message::user(prompt)];
        let mut transcript: Vec<String> = Vec::new();
        let mut turn = 0;

        loop {
            turn += 1;
            if turn > MAX_TOOL_TURNS {
                warn!(agent = %self.kind, "Tool loop hit the turn cap");
                break;
            }

            let request = CompletionRequest {
                system_prompt: instructions(self.kind).to_string(),
                messages: messages.clone(),
                tools: tool_defs.clone(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
            };

            let response = self.llm.complete(request).await?;
            if let Some(text) = &response.content {
                transcript.push(text.clone());
            }
            messages.push(build_assistant_message(&response));

            match response.stop_reason {
                StopReason::EndTurn | StopReason::MaxTokens => break,
                StopReason::ToolUse => {
                    debug!(agent = %self.kind, calls = response.tool_calls.len(), "Executing tool calls");
                    let results = self.executor.execute_all(&response.tool_calls).await;
                    let blocks = results
                        .iter()
                        .map(|(id, result)| ContentBlock::tool_result(id, &result.content, result.is_error))
                        .collect();
                    messages.push(Message::user_blocks(blocks));
                }
            }
        }

        Ok(transcript.join("\n\n"))
    }
}

fn build_assistant_message(response: &CompletionResponse) -> Message {
    let mut blocks = Vec::new();
    if let Some(text) = &response.content {
        blocks.push(ContentBlock::text(text));
    }
    for call in &response.tool_calls {
        blocks.push(ContentBlock::ToolUse {
            id: call.id.clone(),
            name: call.name.clone(),
            input: call.input.clone(),
        });
    }
    Message::assistant_blocks(blocks)
}

/// The three agents, constructed once per session
pub struct AgentRoster {
    itinerary: Agent,
    advisor: Agent,
    memory: Agent,
}

impl AgentRoster {
    /// Build the roster around one model connection
    ///
    /// `weather` is attached to the itinerary and advisor agents; the
    /// memory agent never carries tools.
    pub fn new(llm: Arc<dyn LlmClient>, weather: Option<Arc<WeatherClient>>, config: &LlmConfig) -> Self {
        Self {
            itinerary: Agent::new(AgentKind::Itinerary, llm.clone(), weather.clone(), config),
            advisor: Agent::new(AgentKind::Advisor, llm.clone(), weather.clone(), config),
            memory: Agent::new(AgentKind::Memory, llm, weather, config),
        }
    }

    /// Look up the agent for a role
    pub fn agent(&self, kind: AgentKind) -> &Agent {
        match kind {
            AgentKind::Itinerary => &self.itinerary,
            AgentKind::Advisor => &self.advisor,
            AgentKind::Memory => &self.memory,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionResponse, MockLlmClient, TokenUsage, ToolCall};
    use crate::tools::{Tool, ToolResult};
    use async_trait::async_trait;

    struct CountingTool;

    #[async_trait]
    impl Tool for CountingTool {
        fn name(&self) -> &'static str {
            "lookup"
        }

        fn description(&self) -> &'static str {
            "test lookup"
        }

        fn input_schema(&self) -> serde_json::Value {
            serde_json::json!({ "type": "object" })
        }

        async fn execute(&self, _input: serde_json::Value) -> ToolResult {
            ToolResult::success("sunny, 25°C")
        }
    }

    fn config() -> LlmConfig {
        LlmConfig::default()
    }

    #[tokio::test]
    async fn test_run_plain_text_turn() {
        let llm = Arc::new(MockLlmClient::new(vec![CompletionResponse::text("Day 1: Louvre")]));
        let roster = AgentRoster::new(llm, None, &config());
        let text = roster.agent(AgentKind::Memory).run("recall").await.unwrap();
        assert_eq!(text, "Day 1: Louvre");
    }

    #[tokio::test]
    async fn test_run_executes_tool_round() {
        let llm = Arc::new(MockLlmClient::new(vec![
            CompletionResponse {
                content: None,
                tool_calls: vec![ToolCall {
                    id: "lookup".into(),
                    name: "lookup".into(),
                    input: serde_json::json!({ "city": "Paris" }),
                }],
                stop_reason: StopReason::ToolUse,
                usage: TokenUsage::default(),
            },
            CompletionResponse::text("Pack sunscreen"),
        ]));

        let mut agent = Agent::new(AgentKind::Advisor, llm.clone(), None, &config());
        agent.executor.add_tool(Box::new(CountingTool));

        let text = agent.run("what should I pack").await.unwrap();
        assert_eq!(text, "Pack sunscreen");
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_turn_cap_stops_runaway_tool_loops() {
        let responses: Vec<CompletionResponse> = (0..20)
            .map(|_| CompletionResponse {
                content: None,
                tool_calls: vec![ToolCall {
                    id: "lookup".into(),
                    name: "lookup".into(),
                    input: serde_json::json!({}),
                }],
                stop_reason: StopReason::ToolUse,
                usage: TokenUsage::default(),
            })
            .collect();
        let llm = Arc::new(MockLlmClient::new(responses));

        let mut agent = Agent::new(AgentKind::Itinerary, llm.clone(), None, &config());
        agent.executor.add_tool(Box::new(CountingTool));

        let text = agent.run("loop forever").await.unwrap();
        assert!(text.is_empty());
        assert_eq!(llm.call_count(), MAX_TOOL_TURNS);
    }

    #[test]
    fn test_capability_flags() {
        assert!(has_weather(AgentKind::Itinerary));
        assert!(has_weather(AgentKind::Advisor));
        assert!(!has_weather(AgentKind::Memory));
    }

    #[test]
    fn test_roles_have_distinct_instructions() {
        let all = [AgentKind::Itinerary, AgentKind::Advisor, AgentKind::Memory];
        for a in all {
            for b in all {
                if a != b {
                    assert_ne!(instructions(a), instructions(b));
                }
            }
        }
    }
}
