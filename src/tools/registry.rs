//! Tool registry: the declaration list and the function dispatcher

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::agent::types::{ToolCall, ToolDeclaration, ToolResult};
use crate::docker::ContainerGateway;
use crate::error::Error;
use crate::workspace::WorkspaceApi;

use super::traits::Tool;
use super::{ExecuteCommandTool, GetLogsTool, ListContainersTool, WorkspaceApiTool};

/// Ordered registry of available tools
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        ToolRegistry { tools: Vec::new() }
    }

    /// The four built-in tools, in declaration order
    pub fn standard(
        gateway: Arc<dyn ContainerGateway>,
        workspace: Arc<dyn WorkspaceApi>,
        default_container: impl Into<String>,
    ) -> Self {
        let mut registry = ToolRegistry::new();
        registry.register(ExecuteCommandTool::new(Arc::clone(&gateway)));
        registry.register(ListContainersTool::new(Arc::clone(&gateway)));
        registry.register(GetLogsTool::new(gateway, default_container));
        registry.register(WorkspaceApiTool::new(workspace));
        info!("Tools registered: {}", registry.names().join(", "));
        registry
    }

    /// Register a tool, replacing any tool of the same name in place
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(index) => self.tools[index] = Box::new(tool),
            None => self.tools.push(Box::new(tool)),
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.iter().find(|t| t.name() == name).map(|t| t.as_ref())
    }

    /// Declarations for every registered tool, in registration order
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools.iter().map(|t| t.to_declaration()).collect()
    }

    /// Run the named tool and return model-consumable text.
    ///
    /// Never fails: unknown names, tool failures and provider errors all
    /// come back as `"Error: ..."` strings.
    pub async fn dispatch(&self, name: &str, arguments: &Map<String, Value>) -> String {
        info!("Model calling function: {}", name);
        let args = Value::Object(arguments.clone());
        debug!("Function arguments: {}", args);

        let Some(tool) = self.get(name) else {
            let err = Error::UnknownTool(name.to_string());
            warn!("{}", err);
            return format!("Error: {}", err);
        };

        match tool.execute(arguments).await {
            Ok(output) => {
                if !output.success {
                    warn!("Function {} reported failure: {:?}", name, output.error);
                }
                output.into_text()
            }
            Err(e) => {
                warn!("Error in function {}: {}", name, e);
                format!("Error: {}", e)
            }
        }
    }

    /// Dispatch a model tool call
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        ToolResult {
            name: call.name.clone(),
            content: self.dispatch(&call.name, &call.arguments).await,
        }
    }

    /// Get tool count
    pub fn count(&self) -> usize {
        self.tools.len()
    }

    /// List tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeGateway, FakeWorkspace};
    use serde_json::json;

    fn registry(gateway: FakeGateway) -> ToolRegistry {
        ToolRegistry::standard(Arc::new(gateway), Arc::new(FakeWorkspace::default()), "mcp-toolkit")
    }

    fn args(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_declarations_fixed_order() {
        let registry = registry(FakeGateway::default());
        let names: Vec<String> = registry.declarations().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["execute_command", "list_containers", "get_logs", "workspace_api_call"]
        );
        for decl in registry.declarations() {
            assert_eq!(decl.parameters["type"], "OBJECT");
        }
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = registry(FakeGateway::default());
        registry.register(ListContainersTool::new(Arc::new(FakeGateway::default())));
        assert_eq!(registry.count(), 4);
        assert_eq!(registry.names()[1], "list_containers");
    }

    #[tokio::test]
    async fn test_unknown_function_is_text() {
        let registry = registry(FakeGateway::default());
        let out = registry.dispatch("format_disk", &Map::new()).await;
        assert_eq!(out, "Error: Unknown function 'format_disk'.");
    }

    #[tokio::test]
    async fn test_provider_error_becomes_text() {
        let gateway = FakeGateway {
            command_error: Some("Connection failed".into()),
            ..Default::default()
        };
        let registry = registry(gateway);
        let out = registry
            .dispatch("execute_command", &args(json!({"command": "server list"})))
            .await;
        assert!(out.starts_with("Error: "));
        assert!(out.contains("Connection failed"));
    }

    #[tokio::test]
    async fn test_dispatch_routes_to_provider() {
        let gateway = FakeGateway {
            containers: "Containers on this system:\n\n• web\n".into(),
            ..Default::default()
        };
        let registry = registry(gateway);
        let out = registry.dispatch("list_containers", &Map::new()).await;
        assert!(out.contains("• web"));
    }

    #[tokio::test]
    async fn test_execute_echoes_name() {
        let registry = registry(FakeGateway::default());
        let result = registry
            .execute(&ToolCall {
                name: "get_logs".into(),
                arguments: Map::new(),
            })
            .await;
        assert_eq!(result.name, "get_logs");
        assert_eq!(result.content, "logs of mcp-toolkit (50)");
    }
}
