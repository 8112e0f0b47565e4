//! Core tool trait and output type

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::agent::types::ToolDeclaration;
use crate::error::Result;

/// A capability the model can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Function name as declared to the model
    fn name(&self) -> &str;

    /// What the function does, for the model
    fn description(&self) -> &str;

    /// Parameter schema in Gemini's OpenAPI subset (`OBJECT`, `STRING`, ...)
    fn parameters_schema(&self) -> Value;

    /// Execute with the arguments the model supplied
    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput>;

    /// Declaration sent to the model
    fn to_declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// Result of a tool execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the execution was successful
    pub success: bool,
    /// Result content (for successful execution)
    pub content: Option<String>,
    /// Error message (for failed execution)
    pub error: Option<String>,
}

impl ToolOutput {
    /// Create a successful result
    pub fn success(content: impl Into<String>) -> Self {
        ToolOutput {
            success: true,
            content: Some(content.into()),
            error: None,
        }
    }

    /// Create a failed result
    pub fn failure(error: impl Into<String>) -> Self {
        ToolOutput {
            success: false,
            content: None,
            error: Some(error.into()),
        }
    }

    /// Text handed back to the model
    pub fn into_text(self) -> String {
        if self.success {
            self.content.unwrap_or_default()
        } else {
            format!("Error: {}", self.error.unwrap_or_default())
        }
    }
}

/// String argument, if present and a string
pub(crate) fn string_arg<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// Positive integer argument; models sometimes send `10.0` or `"10"`
pub(crate) fn positive_int_arg(args: &Map<String, Value>, key: &str) -> Option<u32> {
    let value = args.get(key)?;
    let n = value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))?;
    u32::try_from(n).ok().filter(|n| *n > 0)
}
