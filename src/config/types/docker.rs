//! Docker MCP gateway configuration

use serde::{Deserialize, Serialize};

/// Settings for reaching the Docker daemon and the `docker mcp` CLI plugin
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DockerConfig {
    /// Container whose logs `get_logs` reads by default
    #[serde(default = "default_container")]
    pub mcp_container: String,
    /// Docker CLI binary used to run `mcp` subcommands
    #[serde(default = "default_docker_bin")]
    pub docker_bin: String,
    /// Per-command timeout in seconds
    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,
}

impl Default for DockerConfig {
    fn default() -> Self {
        DockerConfig {
            mcp_container: default_container(),
            docker_bin: default_docker_bin(),
            command_timeout_secs: default_command_timeout(),
        }
    }
}

fn default_container() -> String {
    "mcp-toolkit".to_string()
}

fn default_docker_bin() -> String {
    "docker".to_string()
}

fn default_command_timeout() -> u64 {
    30
}
