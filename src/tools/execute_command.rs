//! execute_command tool - runs Docker MCP gateway subcommands

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::traits::{string_arg, Tool, ToolOutput};
use crate::docker::ContainerGateway;
use crate::error::Result;

/// Passes a command through to `docker mcp`
pub struct ExecuteCommandTool {
    gateway: Arc<dyn ContainerGateway>,
}

impl ExecuteCommandTool {
    pub fn new(gateway: Arc<dyn ContainerGateway>) -> Self {
        ExecuteCommandTool { gateway }
    }
}

#[async_trait]
impl Tool for ExecuteCommandTool {
    fn name(&self) -> &str {
        "execute_command"
    }

    fn description(&self) -> &str {
        "Runs a Docker MCP gateway command and returns its output. Pass only the part after \
         'docker mcp', for example 'server list' or \
         'tools call API-post-search'. JSON arguments go in single quotes: \
         tools call API-retrieve-a-page '{\"page_id\":\"ID\"}'"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "command": {
                    "type": "STRING",
                    "description": "The MCP gateway command to run, without the 'docker mcp' prefix"
                }
            },
            "required": ["command"]
        })
    }

    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput> {
        let command = string_arg(args, "command").unwrap_or("");
        let output = self.gateway.execute_command(command).await?;
        Ok(ToolOutput::success(output))
    }
}
