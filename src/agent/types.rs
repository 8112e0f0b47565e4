//! Type definitions for the agent module
//!
//! Two vocabularies live here: the provider-agnostic conversation types the
//! caller speaks (`ConversationTurn`, `ToolCall`, ...) and the Gemini-native
//! turn representation (`Content`, `Part`) the model session speaks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Role of a turn in the caller's conversation history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant (AI) response
    Assistant,
}

impl Role {
    /// Parse a role string; anything that is not "assistant" is a user turn.
    pub fn parse_lenient(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("assistant") {
            Role::Assistant
        } else {
            Role::User
        }
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Any shape is accepted; only the string "assistant" is an assistant turn
        Ok(match Value::deserialize(deserializer)? {
            Value::String(raw) => Role::parse_lenient(&raw),
            _ => Role::User,
        })
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One historical exchange, as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who spoke
    #[serde(default = "default_role")]
    pub role: Role,
    /// What was said
    #[serde(default, deserialize_with = "lenient_content")]
    pub content: String,
    /// When it was said (informational only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

fn default_role() -> Role {
    Role::User
}

/// `null` becomes empty text; other non-string values keep their JSON text
fn lenient_content<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl ConversationTurn {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        ConversationTurn {
            role: Role::User,
            content: content.into(),
            timestamp: None,
        }
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        ConversationTurn {
            role: Role::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }

    /// Stamp the turn with the current time
    pub fn now(mut self) -> Self {
        self.timestamp = Some(Utc::now());
        self
    }
}

/// A capability invocation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Capability name
    pub name: String,
    /// Arguments keyed by parameter name
    pub arguments: Map<String, Value>,
}

/// The text produced by dispatching a `ToolCall`
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    /// Capability name (echoes the call)
    pub name: String,
    /// Model-consumable result text
    pub content: String,
}

/// Static description of one capability exposed to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    /// Function name
    pub name: String,
    /// What the function does
    pub description: String,
    /// OpenAPI-style parameter schema
    pub parameters: Value,
}

/// An active model identifier bound to the fixed declaration set
#[derive(Debug, Clone)]
pub struct ModelBinding {
    /// Model identifier
    pub model: String,
    /// Declarations shared by every model in the fallback chain
    pub declarations: Arc<[ToolDeclaration]>,
}

/// What the model answered with, as a closed set of cases
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// The model wants a capability invoked
    ToolCall(ToolCall),
    /// The model produced its final text
    Text(String),
}

impl ModelReply {
    /// Classify a model turn.
    ///
    /// The first function call wins; later ones in the same turn are
    /// counted in the second element and not acted upon.
    pub fn from_content(content: &Content) -> (Self, usize) {
        let mut calls = content.parts.iter().filter_map(|p| p.function_call.as_ref());

        match calls.next() {
            Some(call) => {
                let extra_calls = calls.count();
                let arguments = match &call.args {
                    Value::Object(map) => map.clone(),
                    _ => Map::new(),
                };
                (
                    ModelReply::ToolCall(ToolCall {
                        name: call.name.clone(),
                        arguments,
                    }),
                    extra_calls,
                )
            }
            None => (ModelReply::Text(content.text()), 0),
        }
    }
}

// ---------------------------------------------------------------------------
// Gemini-native turn representation
// ---------------------------------------------------------------------------

/// Role of a turn in the model's native schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentRole {
    /// User-side turn (prompts and function responses)
    User,
    /// Model-side turn
    Model,
}

/// A single turn in the model session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    /// Turn author
    #[serde(default = "default_content_role")]
    pub role: ContentRole,
    /// Turn parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

fn default_content_role() -> ContentRole {
    ContentRole::Model
}

impl Content {
    /// A user turn holding plain text
    pub fn user_text(text: impl Into<String>) -> Self {
        Content {
            role: ContentRole::User,
            parts: vec![Part::text(text)],
        }
    }

    /// A model turn holding plain text
    pub fn model_text(text: impl Into<String>) -> Self {
        Content {
            role: ContentRole::Model,
            parts: vec![Part::text(text)],
        }
    }

    /// A model turn requesting a function call
    pub fn model_function_call(name: impl Into<String>, args: Value) -> Self {
        Content {
            role: ContentRole::Model,
            parts: vec![Part::function_call(name, args)],
        }
    }

    /// A user turn carrying a tool result back to the model
    pub fn function_response(result: &ToolResult) -> Self {
        Content {
            role: ContentRole::User,
            parts: vec![Part::function_response(
                &result.name,
                serde_json::json!({ "result": result.content }),
            )],
        }
    }

    /// Concatenated text of all text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect::<Vec<_>>()
            .join("")
    }
}

/// One part of a turn; exactly one field is set in practice
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    /// Plain text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Function call requested by the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<FunctionCall>,
    /// Function result sent back to the model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_response: Option<FunctionResponse>,
    /// Opaque signature thinking models attach to their parts; echoed back as received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl Part {
    /// Text part
    pub fn text(text: impl Into<String>) -> Self {
        Part {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Function call part
    pub fn function_call(name: impl Into<String>, args: Value) -> Self {
        Part {
            function_call: Some(FunctionCall {
                name: name.into(),
                args,
            }),
            ..Default::default()
        }
    }

    /// Function response part
    pub fn function_response(name: impl Into<String>, response: Value) -> Self {
        Part {
            function_response: Some(FunctionResponse {
                name: name.into(),
                response,
            }),
            ..Default::default()
        }
    }
}

/// Function call details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,
    /// Arguments as a JSON object
    #[serde(default)]
    pub args: Value,
}

/// Function response details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    /// Name of the function that ran
    pub name: String,
    /// Result payload
    pub response: Value,
}
