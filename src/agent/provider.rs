//! Model provider seam and the per-attempt chat session built on it.

use async_trait::async_trait;
use tracing::warn;

use crate::agent::types::{Content, ModelBinding, ModelReply, ToolDeclaration, ToolResult};
use crate::error::Result;

/// A backend that can continue a conversation by one model turn.
///
/// Implementations are stateless with respect to the conversation; the full
/// turn list is passed on every call.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Generate the next model turn for `contents` using `model`.
    async fn generate(
        &self,
        model: &str,
        contents: &[Content],
        declarations: &[ToolDeclaration],
    ) -> Result<Content>;
}

/// One conversation against one model binding.
///
/// Accumulates turns so that each send carries the whole exchange so far.
pub struct ChatSession<'a> {
    provider: &'a dyn ModelProvider,
    binding: &'a ModelBinding,
    contents: Vec<Content>,
    round_trips: u32,
}

impl<'a> ChatSession<'a> {
    /// Open a session seeded with `history`
    pub fn start(
        provider: &'a dyn ModelProvider,
        binding: &'a ModelBinding,
        history: Vec<Content>,
    ) -> Self {
        ChatSession {
            provider,
            binding,
            contents: history,
            round_trips: 0,
        }
    }

    /// Send a user prompt and classify the model's answer
    pub async fn send_prompt(&mut self, prompt: &str) -> Result<ModelReply> {
        self.send(Content::user_text(prompt)).await
    }

    /// Send a tool result back and classify the model's answer
    pub async fn send_tool_result(&mut self, result: &ToolResult) -> Result<ModelReply> {
        self.send(Content::function_response(result)).await
    }

    /// Provider calls made by this session
    pub fn round_trips(&self) -> u32 {
        self.round_trips
    }

    /// Turns accumulated so far
    pub fn contents(&self) -> &[Content] {
        &self.contents
    }

    async fn send(&mut self, message: Content) -> Result<ModelReply> {
        self.contents.push(message);
        self.round_trips += 1;

        let mut reply = self
            .provider
            .generate(&self.binding.model, &self.contents, &self.binding.declarations)
            .await?;

        let (classified, extra_calls) = ModelReply::from_content(&reply);
        if extra_calls > 0 {
            warn!(
                "Model {} requested {} additional tool call(s) in one turn; only the first is executed",
                self.binding.model, extra_calls
            );
            // Keep the recorded turn consistent with the single response we send back
            let mut seen_call = false;
            reply.parts.retain(|part| {
                if part.function_call.is_none() {
                    return true;
                }
                !std::mem::replace(&mut seen_call, true)
            });
        }

        self.contents.push(reply);
        Ok(classified)
    }
}
