//! get_logs tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::traits::{positive_int_arg, string_arg, Tool, ToolOutput};
use crate::docker::ContainerGateway;
use crate::error::Result;

/// Lines returned when the model does not ask for a count
pub const DEFAULT_TAIL: u32 = 50;

/// Reads the tail of a container's log stream
pub struct GetLogsTool {
    gateway: Arc<dyn ContainerGateway>,
    default_container: String,
}

impl GetLogsTool {
    pub fn new(gateway: Arc<dyn ContainerGateway>, default_container: impl Into<String>) -> Self {
        GetLogsTool {
            gateway,
            default_container: default_container.into(),
        }
    }
}

#[async_trait]
impl Tool for GetLogsTool {
    fn name(&self) -> &str {
        "get_logs"
    }

    fn description(&self) -> &str {
        "Retrieves recent log output from a container, with timestamps. \
         Defaults to the MCP toolkit container. Useful for debugging or checking container activity."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {
                "container_name": {
                    "type": "STRING",
                    "description": format!("Container to read (default: {})", self.default_container)
                },
                "tail": {
                    "type": "INTEGER",
                    "description": format!("Number of log lines to retrieve (default: {})", DEFAULT_TAIL)
                }
            }
        })
    }

    async fn execute(&self, args: &Map<String, Value>) -> Result<ToolOutput> {
        let container = string_arg(args, "container_name")
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(self.default_container.as_str());
        let tail = positive_int_arg(args, "tail").unwrap_or(DEFAULT_TAIL);

        Ok(ToolOutput::success(self.gateway.get_logs(container, tail).await?))
    }
}
