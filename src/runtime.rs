//! Wiring shared by the binaries: providers, tools, orchestrator and health

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::agent::Orchestrator;
use crate::config::Config;
use crate::docker::{ContainerGateway, DockerGateway};
use crate::error::{Error, Result};
use crate::tools::ToolRegistry;
use crate::workspace::WorkspaceClient;

/// Overall service state reported by health checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Partial,
    Unhealthy,
}

/// Health snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub docker_connected: bool,
    pub llm_configured: bool,
    pub container_name: String,
    pub container_status: String,
}

impl HealthReport {
    pub fn new(docker_connected: bool, llm_configured: bool, container_name: impl Into<String>) -> Self {
        let status = match (docker_connected, llm_configured) {
            (true, true) => HealthStatus::Healthy,
            (false, false) => HealthStatus::Unhealthy,
            _ => HealthStatus::Partial,
        };
        HealthReport {
            status,
            docker_connected,
            llm_configured,
            container_name: container_name.into(),
            container_status: if docker_connected { "running" } else { "disconnected" }.to_string(),
        }
    }
}

/// Everything a front end needs to serve requests
pub struct Services {
    pub config: Config,
    pub docker: Arc<DockerGateway>,
    /// `None` when the model provider is not configured
    pub orchestrator: Option<Orchestrator>,
}

impl Services {
    /// Connect to Docker and build the orchestrator.
    ///
    /// A missing model key is tolerated and reported through [`Services::health`];
    /// other construction errors are returned.
    pub async fn start(config: Config) -> Result<Self> {
        let docker = Arc::new(DockerGateway::connect(&config.docker).await);
        let workspace = Arc::new(WorkspaceClient::new(&config.workspace)?);

        let tools = ToolRegistry::standard(
            docker.clone(),
            workspace,
            config.docker.mcp_container.clone(),
        );

        let orchestrator = match Orchestrator::from_config(&config, tools) {
            Ok(orchestrator) => {
                info!(
                    "Model service ready: active={}, fallbacks={:?}",
                    orchestrator.active_model(),
                    orchestrator.fallback().queued()
                );
                Some(orchestrator)
            }
            Err(Error::Config(message)) => {
                warn!("Model service not configured: {}", message);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(Services {
            config,
            docker,
            orchestrator,
        })
    }

    /// Current health snapshot
    pub fn health(&self) -> HealthReport {
        HealthReport::new(
            self.docker.is_healthy(),
            self.orchestrator.is_some(),
            self.docker.default_container(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_matrix() {
        assert_eq!(HealthReport::new(true, true, "c").status, HealthStatus::Healthy);
        assert_eq!(HealthReport::new(true, false, "c").status, HealthStatus::Partial);
        assert_eq!(HealthReport::new(false, true, "c").status, HealthStatus::Partial);
        assert_eq!(HealthReport::new(false, false, "c").status, HealthStatus::Unhealthy);
    }

    #[test]
    fn test_health_serialization() {
        let report = HealthReport::new(false, true, "mcp-toolkit");
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["status"], "partial");
        assert_eq!(value["container_status"], "disconnected");
        assert_eq!(value["container_name"], "mcp-toolkit");
    }
}
