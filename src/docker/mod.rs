//! Docker-backed capability providers
//!
//! The [`ContainerGateway`] trait is the seam the tools call through.
//! [`DockerGateway`] implements it against the local daemon (bollard) and
//! the `docker mcp` CLI plugin.

mod command;
mod gateway;

use async_trait::async_trait;

use crate::error::Result;

pub use command::{split_command, strip_gateway_prefix};
pub use gateway::DockerGateway;

/// Output returned when a gateway command succeeds silently
pub const NO_OUTPUT_MESSAGE: &str = "(command completed successfully, no output)";

/// Operations the container tools need from the host
#[async_trait]
pub trait ContainerGateway: Send + Sync {
    /// Run an MCP gateway subcommand and return its output
    async fn execute_command(&self, command: &str) -> Result<String>;

    /// Describe every container on the host, running or not
    async fn list_containers(&self) -> Result<String>;

    /// Return the last `tail` log lines of `container_name`
    async fn get_logs(&self, container_name: &str, tail: u32) -> Result<String>;

    /// Whether the daemon connection is usable
    fn is_healthy(&self) -> bool;
}

/// One row of a container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEntry {
    pub name: String,
    pub state: String,
    pub image: Option<String>,
    pub short_id: String,
}

/// Render a container listing the way the model expects to read it
pub fn format_container_list(entries: &[ContainerEntry]) -> String {
    if entries.is_empty() {
        return "No containers found on this system".to_string();
    }

    let mut output = String::from("Containers on this system:\n\n");
    for entry in entries {
        output.push_str(&format!(
            "• {}\n  Status: {}\n  Image: {}\n  ID: {}\n\n",
            entry.name,
            entry.state,
            entry.image.as_deref().filter(|i| !i.is_empty()).unwrap_or("N/A"),
            entry.short_id
        ));
    }
    output
}

/// Render log output with its header
pub fn format_logs(tail: u32, logs: &str) -> String {
    if logs.is_empty() {
        "No logs available".to_string()
    } else {
        format!("Last {} lines of container logs:\n\n{}", tail, logs)
    }
}
