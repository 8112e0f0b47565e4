//! list_containers tool

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::traits::{Tool, ToolOutput};
use crate::docker::ContainerGateway;
use crate::error::Result;

/// Lists every container on the host
pub struct ListContainersTool {
    gateway: Arc<dyn ContainerGateway>,
}

impl ListContainersTool {
    pub fn new(gateway: Arc<dyn ContainerGateway>) -> Self {
        ListContainersTool { gateway }
    }
}

#[async_trait]
impl Tool for ListContainersTool {
    fn name(&self) -> &str {
        "list_containers"
    }

    fn description(&self) -> &str {
        "Lists all Docker containers on the system (running and stopped) with their status, \
         image and ID. Use this to see what containers are available."
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "OBJECT",
            "properties": {}
        })
    }

    async fn execute(&self, _args: &Map<String, Value>) -> Result<ToolOutput> {
        Ok(ToolOutput::success(self.gateway.list_containers().await?))
    }
}
