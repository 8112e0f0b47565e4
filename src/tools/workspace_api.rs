//! workspace_api_call tool - raw access to the workspace REST API

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::traits::{string_arg, Tool, ToolOutput};
use crate::error::Result;
use crate::workspace::WorkspaceApi;

/// Forwards a REST call to the workspace service
pub struct WorkspaceApiTool {
    api: Arc<dyn WorkspaceApi>,
}

impl WorkspaceApiTool {
    pub fn new(api: Arc<dyn WorkspaceApi>) -> Self {
        WorkspaceApiTool { api }
    }
}

/// `body` may arrive as a JSON string or, from some models, as an object
fn body_arg(args: &Map<String, Value>) -> String {
    match args.get("body") {
        Some(Value::String(body)) => body.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[async_trait]
impl Tool for WorkspaceApiTool {
    fn name(&self) -> &str {
        "workspace_api_call"
    }

    fn description(&self) -> &str {
        "Calls the Notion REST API directly with the configured integration token. \
         Use for operations the MCP gateway does not cover. The endpoint is relative to \
         https://api.notion.com/v1 (for example 'search' or 'databases/ID/query'); \
         the body is a JSON string. Returns the JSON response."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "method": {
                    "type": "STRING",
                    "description": "HTTP method: GET, POST, PATCH, PUT or DELETE"
                },
                "endpoint": {
                    "type": "STRING",
                    "description": "API path, e.g. 'search', 'pages/ID', 'databases/ID/query'"
                },
                "body": {
                    "type": "STRING",
                    "description": "JSON request body as a string; omit for none"
                }
            },
            "required": ["method", "endpoint"]
        })
    }

    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput> {
        let method = string_arg(args, "method").unwrap_or("GET");
        let Some(endpoint) = string_arg(args, "endpoint").filter(|e| !e.trim().is_empty()) else {
            return Ok(ToolOutput::failure("Missing 'endpoint' parameter"));
        };

        let output = self
            .api
            .workspace_api_call(method, endpoint, &body_arg(args))
            .await?;
        Ok(ToolOutput::success(output))
    }
}
