//! Agentic loop controller.
//!
//! [`run_exchange`] is one attempt: prime a fresh session, send the prompt,
//! and alternate model turns with tool dispatches until the model answers in
//! text or the tool-use cap is hit. [`Orchestrator::respond`] wraps it with
//! model failover on rate limits and turns every outcome into reply text.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::agent::fallback::ModelFallback;
use crate::agent::gemini::GeminiClient;
use crate::agent::history::build_session_history;
use crate::agent::prompts::{
    error_message, ALL_MODELS_RATE_LIMITED_MESSAGE, EMPTY_REPLY_MESSAGE, TOOL_LIMIT_MESSAGE,
};
use crate::agent::provider::{ChatSession, ModelProvider};
use crate::agent::types::{ConversationTurn, ModelBinding, ModelReply};
use crate::config::{AgentConfig, Config};
use crate::error::Result;
use crate::telemetry::preview;
use crate::tools::ToolRegistry;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Limits for a single attempt.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Tool dispatches allowed before the attempt gives up.
    pub max_tool_iterations: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        LoopConfig::from(&AgentConfig::default())
    }
}

impl From<&AgentConfig> for LoopConfig {
    fn from(config: &AgentConfig) -> Self {
        LoopConfig {
            max_tool_iterations: config.max_tool_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// Single attempt
// ---------------------------------------------------------------------------

/// How an attempt finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// The model answered in text.
    Reply(String),
    /// The model was still asking for tools when the cap was reached.
    ToolLimitReached,
}

/// Result of one attempt, with counters for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub outcome: ExchangeOutcome,
    /// Tool dispatches performed.
    pub tool_calls: u32,
    /// Provider calls made.
    pub round_trips: u32,
}

/// Run one attempt against `binding`.
///
/// The session is seeded with the priming exchange and `history`. Provider
/// errors propagate unchanged so the caller can classify them.
pub async fn run_exchange(
    provider: &dyn ModelProvider,
    tools: &ToolRegistry,
    binding: &ModelBinding,
    prompt: &str,
    history: &[ConversationTurn],
    config: &LoopConfig,
) -> Result<Exchange> {
    let mut session = ChatSession::start(provider, binding, build_session_history(history));
    let mut reply = session.send_prompt(prompt).await?;
    let mut tool_calls: u32 = 0;

    loop {
        match reply {
            ModelReply::Text(text) => {
                debug!(
                    "Exchange finished on {}: tool_calls={}, round_trips={}",
                    binding.model,
                    tool_calls,
                    session.round_trips()
                );
                return Ok(Exchange {
                    outcome: ExchangeOutcome::Reply(text),
                    tool_calls,
                    round_trips: session.round_trips(),
                });
            }
            ModelReply::ToolCall(call) => {
                if tool_calls >= config.max_tool_iterations {
                    warn!(
                        "Tool limit of {} reached on {}; model still wants {}",
                        config.max_tool_iterations, binding.model, call.name
                    );
                    return Ok(Exchange {
                        outcome: ExchangeOutcome::ToolLimitReached,
                        tool_calls,
                        round_trips: session.round_trips(),
                    });
                }

                tool_calls += 1;
                info!(
                    "Tool iteration {}/{}: {}",
                    tool_calls, config.max_tool_iterations, call.name
                );

                let result = tools.execute(&call).await;
                debug!("Function result: {}", preview(&result.content, 200));

                reply = session.send_tool_result(&result).await?;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Turns a prompt plus history into a reply, failing over between models.
///
/// Clones share their state, so a failover seen by one request applies to
/// all of them.
#[derive(Clone)]
pub struct Orchestrator {
    provider: Arc<dyn ModelProvider>,
    tools: Arc<ToolRegistry>,
    fallback: Arc<ModelFallback>,
    config: LoopConfig,
}

impl Orchestrator {
    /// Build an orchestrator whose fallback chain carries `tools`' declarations
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        tools: ToolRegistry,
        primary_model: impl Into<String>,
        fallback_models: impl IntoIterator<Item = String>,
        config: LoopConfig,
    ) -> Self {
        let fallback = ModelFallback::new(primary_model, fallback_models, tools.declarations());
        Orchestrator {
            provider,
            tools: Arc::new(tools),
            fallback: Arc::new(fallback),
            config,
        }
    }

    /// Gemini-backed orchestrator.
    ///
    /// Fails with a configuration error when no API key is set.
    pub fn from_config(config: &Config, tools: ToolRegistry) -> Result<Self> {
        let client = GeminiClient::new(config.provider.clone())?;
        Ok(Orchestrator::new(
            Arc::new(client),
            tools,
            config.provider.primary_model.clone(),
            config.provider.fallback_models.clone(),
            LoopConfig::from(&config.agent),
        ))
    }

    /// Shared fallback chain
    pub fn fallback(&self) -> &ModelFallback {
        &self.fallback
    }

    /// Registered tools
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Model the next attempt will use
    pub fn active_model(&self) -> String {
        self.fallback.active_model()
    }

    /// Produce the reply to `prompt`.
    ///
    /// Never fails and never returns an empty string; every failure maps
    /// to a fixed message.
    pub async fn respond(&self, prompt: &str, history: &[ConversationTurn]) -> String {
        let max_attempts = self.fallback.remaining() + 1;
        info!(
            "Processing prompt ({} history turns): {}",
            history.len(),
            preview(prompt, 100)
        );

        for attempt in 0..max_attempts {
            let binding = self.fallback.binding();
            info!(
                "Attempt {}/{} using model {}",
                attempt + 1,
                max_attempts,
                binding.model
            );

            let result = run_exchange(
                self.provider.as_ref(),
                &self.tools,
                &binding,
                prompt,
                history,
                &self.config,
            )
            .await;

            match result {
                Ok(exchange) => {
                    return match exchange.outcome {
                        ExchangeOutcome::Reply(text) if text.trim().is_empty() => {
                            warn!("Model {} returned an empty reply", binding.model);
                            EMPTY_REPLY_MESSAGE.to_string()
                        }
                        ExchangeOutcome::Reply(text) => {
                            info!("Reply from {}: {}", binding.model, preview(&text, 100));
                            text
                        }
                        ExchangeOutcome::ToolLimitReached => TOOL_LIMIT_MESSAGE.to_string(),
                    };
                }
                Err(e) if e.is_rate_limit() => {
                    warn!("Rate limit on {}: {}", binding.model, e);

                    if attempt + 1 < max_attempts && self.fallback.advance_from(&binding.model) {
                        info!("Retrying with {}", self.fallback.active_model());
                        continue;
                    }

                    error!("All models rate limited");
                    return ALL_MODELS_RATE_LIMITED_MESSAGE.to_string();
                }
                Err(e) => {
                    error!("Error generating response on {}: {}", binding.model, e);
                    return error_message(&e);
                }
            }
        }

        ALL_MODELS_RATE_LIMITED_MESSAGE.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::prompts::SYSTEM_INSTRUCTION;
    use crate::agent::types::{Content, ContentRole, ToolDeclaration};
    use crate::error::Error;
    use crate::tools::testing::{FakeGateway, FakeWorkspace};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays a script of replies; once exhausted, repeats `repeat`.
    struct ScriptedProvider {
        script: Mutex<VecDeque<Result<Content>>>,
        repeat: Option<Content>,
        calls: Mutex<Vec<(String, Vec<Content>)>>,
    }

    impl ScriptedProvider {
        fn new(script: Vec<Result<Content>>) -> Self {
            ScriptedProvider {
                script: Mutex::new(script.into()),
                repeat: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn repeating(content: Content) -> Self {
            ScriptedProvider {
                repeat: Some(content),
                ..ScriptedProvider::new(Vec::new())
            }
        }

        fn models(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        async fn generate(
            &self,
            model: &str,
            contents: &[Content],
            _declarations: &[ToolDeclaration],
        ) -> Result<Content> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), contents.to_vec()));
            match self.script.lock().unwrap().pop_front() {
                Some(next) => next,
                None => self
                    .repeat
                    .clone()
                    .ok_or_else(|| Error::Internal("script exhausted".into())),
            }
        }
    }

    fn command_call() -> Content {
        Content::model_function_call("execute_command", json!({"command": "server list"}))
    }

    fn rate_limited() -> Result<Content> {
        Err(Error::Provider("Error 429: resource_exhausted".into()))
    }

    fn orchestrator(
        provider: Arc<ScriptedProvider>,
        gateway: Arc<FakeGateway>,
        fallbacks: &[&str],
    ) -> Orchestrator {
        let tools = ToolRegistry::standard(gateway, Arc::new(FakeWorkspace::default()), "mcp-toolkit");
        Orchestrator::new(
            provider,
            tools,
            "primary",
            fallbacks.iter().map(|s| s.to_string()),
            LoopConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_text_reply_without_tools() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(Content::model_text("Hello!"))]));
        let gateway = Arc::new(FakeGateway::default());
        let orch = orchestrator(provider.clone(), gateway.clone(), &[]);

        assert_eq!(orch.respond("hi", &[]).await, "Hello!");
        assert_eq!(provider.call_count(), 1);
        assert!(gateway.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_is_primed_before_history() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(Content::model_text("ok"))]));
        let orch = orchestrator(provider.clone(), Arc::new(FakeGateway::default()), &[]);
        let history = vec![
            ConversationTurn::user("earlier"),
            ConversationTurn::assistant("answer"),
        ];

        orch.respond("now", &history).await;

        let calls = provider.calls.lock().unwrap();
        let contents = &calls[0].1;
        assert_eq!(contents.len(), 2 + history.len() + 1);
        assert_eq!(contents[0].text(), SYSTEM_INSTRUCTION);
        assert_eq!(contents[1].role, ContentRole::Model);
        assert_eq!(contents[3].role, ContentRole::Model);
        assert_eq!(contents[4].text(), "now");
    }

    #[tokio::test]
    async fn test_tool_result_is_fed_back() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(command_call()),
            Ok(Content::model_text("Two servers are enabled.")),
        ]));
        let gateway = Arc::new(FakeGateway::default());
        let orch = orchestrator(provider.clone(), gateway.clone(), &[]);

        assert_eq!(orch.respond("which servers?", &[]).await, "Two servers are enabled.");
        assert_eq!(*gateway.commands.lock().unwrap(), vec!["server list"]);

        let calls = provider.calls.lock().unwrap();
        let last = calls[1].1.last().unwrap();
        let response = last.parts[0].function_response.as_ref().unwrap();
        assert_eq!(response.name, "execute_command");
        assert_eq!(response.response, json!({"result": "ran: server list"}));
    }

    #[tokio::test]
    async fn test_tool_limit_bounds_calls() {
        let provider = Arc::new(ScriptedProvider::repeating(command_call()));
        let gateway = Arc::new(FakeGateway::default());
        let orch = orchestrator(provider.clone(), gateway.clone(), &["fb"]);

        assert_eq!(orch.respond("loop forever", &[]).await, TOOL_LIMIT_MESSAGE);
        assert_eq!(gateway.commands.lock().unwrap().len(), 5);
        assert_eq!(provider.call_count(), 6);
        // Not a rate limit: no failover
        assert_eq!(orch.fallback().remaining(), 1);
    }

    #[tokio::test]
    async fn test_run_exchange_zero_cap() {
        let provider = ScriptedProvider::repeating(command_call());
        let tools = ToolRegistry::standard(
            Arc::new(FakeGateway::default()),
            Arc::new(FakeWorkspace::default()),
            "mcp-toolkit",
        );
        let binding = ModelFallback::new("m", Vec::new(), tools.declarations()).binding();

        let exchange = run_exchange(
            &provider,
            &tools,
            &binding,
            "hi",
            &[],
            &LoopConfig {
                max_tool_iterations: 0,
            },
        )
        .await
        .unwrap();

        assert_eq!(exchange.outcome, ExchangeOutcome::ToolLimitReached);
        assert_eq!(exchange.tool_calls, 0);
        assert_eq!(exchange.round_trips, 1);
    }

    #[tokio::test]
    async fn test_rate_limit_without_fallbacks() {
        let provider = Arc::new(ScriptedProvider::new(vec![rate_limited()]));
        let orch = orchestrator(provider.clone(), Arc::new(FakeGateway::default()), &[]);

        assert_eq!(orch.respond("hi", &[]).await, ALL_MODELS_RATE_LIMITED_MESSAGE);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(orch.active_model(), "primary");
    }

    #[tokio::test]
    async fn test_rate_limit_fails_over_and_restarts() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Ok(command_call()),
            Err(Error::RateLimit("quota exceeded".into())),
            Ok(Content::model_text("done")),
        ]));
        let gateway = Arc::new(FakeGateway::default());
        let orch = orchestrator(provider.clone(), gateway.clone(), &["fb1", "fb2"]);

        assert_eq!(orch.respond("hi", &[]).await, "done");
        assert_eq!(provider.models(), vec!["primary", "primary", "fb1"]);
        assert_eq!(orch.active_model(), "fb1");
        assert_eq!(orch.fallback().remaining(), 1);

        // The retry starts from scratch: same opening turn count as the first call
        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls[2].1.len(), calls[0].1.len());
    }

    #[tokio::test]
    async fn test_every_model_rate_limited() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            rate_limited(),
            rate_limited(),
            rate_limited(),
        ]));
        let orch = orchestrator(provider.clone(), Arc::new(FakeGateway::default()), &["fb1", "fb2"]);

        assert_eq!(orch.respond("hi", &[]).await, ALL_MODELS_RATE_LIMITED_MESSAGE);
        assert_eq!(provider.models(), vec!["primary", "fb1", "fb2"]);
        assert_eq!(orch.fallback().remaining(), 0);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let provider = Arc::new(ScriptedProvider::new(vec![Err(Error::Provider(
            "API error (500): boom".into(),
        ))]));
        let orch = orchestrator(provider.clone(), Arc::new(FakeGateway::default()), &["fb1"]);

        let reply = orch.respond("hi", &[]).await;
        assert!(reply.starts_with("I encountered an error"));
        assert!(reply.contains("boom"));
        assert_eq!(provider.call_count(), 1);
        assert_eq!(orch.fallback().remaining(), 1);
    }

    #[tokio::test]
    async fn test_empty_text_is_replaced() {
        let provider = Arc::new(ScriptedProvider::new(vec![Ok(Content::model_text(""))]));
        let orch = orchestrator(provider, Arc::new(FakeGateway::default()), &[]);
        assert_eq!(orch.respond("hi", &[]).await, EMPTY_REPLY_MESSAGE);
    }

    #[tokio::test]
    async fn test_declarations_survive_failover() {
        let provider = Arc::new(ScriptedProvider::new(vec![rate_limited(), Ok(Content::model_text("ok"))]));
        let orch = orchestrator(provider, Arc::new(FakeGateway::default()), &["fb1"]);
        let before = orch.fallback().binding();

        orch.respond("hi", &[]).await;

        let after = orch.fallback().binding();
        assert_ne!(before.model, after.model);
        assert_eq!(before.declarations, after.declarations);
    }
}
