//! Local Docker daemon + `docker mcp` CLI gateway

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use bollard::container::{InspectContainerOptions, ListContainersOptions, LogOutput, LogsOptions};
use bollard::Docker;
use futures::StreamExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::command::{split_command, strip_gateway_prefix};
use super::{format_container_list, format_logs, ContainerEntry, ContainerGateway, NO_OUTPUT_MESSAGE};
use crate::config::DockerConfig;
use crate::error::{Error, Result};

const NOT_CONNECTED: &str = "Not connected to Docker daemon";
const CHECK_TIMEOUT_SECS: u64 = 5;

/// Gateway backed by the local Docker daemon
pub struct DockerGateway {
    /// Daemon client; `None` when the startup connection failed
    docker: Option<Docker>,
    config: DockerConfig,
}

impl DockerGateway {
    /// Connect to the local daemon.
    ///
    /// Never fails: an unreachable daemon is logged and reported through
    /// [`ContainerGateway::is_healthy`].
    pub async fn connect(config: &DockerConfig) -> Self {
        let docker = match Docker::connect_with_local_defaults() {
            Ok(docker) => match docker.ping().await {
                Ok(_) => {
                    info!("Connected to Docker daemon");
                    Some(docker)
                }
                Err(e) => {
                    warn!("Failed to connect to Docker daemon. Is Docker running? ({})", e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to connect to Docker daemon. Is Docker running? ({})", e);
                None
            }
        };

        let gateway = DockerGateway {
            docker,
            config: config.clone(),
        };

        if gateway.docker.is_some() {
            gateway.check_mcp_gateway().await;
        }

        gateway
    }

    /// Gateway that reports unhealthy and never touches a daemon
    pub fn disconnected(config: &DockerConfig) -> Self {
        DockerGateway {
            docker: None,
            config: config.clone(),
        }
    }

    /// Container `get_logs` reads when the model names none
    pub fn default_container(&self) -> &str {
        &self.config.mcp_container
    }

    fn client(&self) -> Result<&Docker> {
        self.docker
            .as_ref()
            .ok_or_else(|| Error::Container(NOT_CONNECTED.to_string()))
    }

    async fn check_mcp_gateway(&self) {
        let check = Command::new(&self.config.docker_bin)
            .args(["mcp", "server", "list"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(Duration::from_secs(CHECK_TIMEOUT_SECS), check).await {
            Ok(Ok(output)) if output.status.success() => {
                let servers = String::from_utf8_lossy(&output.stdout);
                info!("MCP gateway accessible, servers: {}", servers.trim());
            }
            Ok(Ok(output)) => {
                warn!(
                    "MCP gateway check returned error: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Ok(Err(e)) => warn!("Could not verify MCP gateway: {}", e),
            Err(_) => warn!("Could not verify MCP gateway: timed out"),
        }
    }

    async fn is_running(&self, docker: &Docker, container_name: &str) -> Result<bool> {
        let details = docker
            .inspect_container(container_name, None::<InspectContainerOptions>)
            .await?;

        Ok(details
            .state
            .and_then(|state| state.running)
            .unwrap_or(false))
    }
}

#[async_trait]
impl ContainerGateway for DockerGateway {
    async fn execute_command(&self, command: &str) -> Result<String> {
        let args = strip_gateway_prefix(split_command(command)?);
        let secs = self.config.command_timeout_secs;

        info!("Executing MCP command: {} mcp {}", self.config.docker_bin, args.join(" "));

        let child = Command::new(&self.config.docker_bin)
            .arg("mcp")
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(Duration::from_secs(secs), child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(Error::Command {
                    command: command.to_string(),
                    message: format!("Failed to execute command: {}", e),
                    exit_code: None,
                });
            }
            Err(_) => {
                warn!("MCP command timed out after {}s: {}", secs, command);
                return Err(Error::Timeout {
                    command: command.to_string(),
                    secs,
                });
            }
        };

        if output.status.success() {
            let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
            debug!("MCP command succeeded: {} bytes of output", stdout.len());
            if stdout.is_empty() {
                Ok(NO_OUTPUT_MESSAGE.to_string())
            } else {
                Ok(stdout)
            }
        } else {
            let exit_code = output.status.code();
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!(
                    "Command failed with exit code {}",
                    exit_code.map(|c| c.to_string()).unwrap_or_else(|| "unknown".into())
                )
            } else {
                stderr
            };
            warn!("MCP command failed: {}", message);
            Err(Error::Command {
                command: command.to_string(),
                message,
                exit_code,
            })
        }
    }

    async fn list_containers(&self) -> Result<String> {
        let docker = self.client()?;

        let options = ListContainersOptions::<String> {
            all: true,
            ..Default::default()
        };
        let summaries = docker.list_containers(Some(options)).await?;

        let entries: Vec<ContainerEntry> = summaries
            .into_iter()
            .map(|summary| ContainerEntry {
                name: summary
                    .names
                    .and_then(|names| names.into_iter().next())
                    .map(|n| n.trim_start_matches('/').to_string())
                    .unwrap_or_default(),
                state: summary.state.unwrap_or_else(|| "unknown".to_string()),
                image: summary.image,
                short_id: summary
                    .id
                    .map(|id| id.chars().take(12).collect())
                    .unwrap_or_default(),
            })
            .collect();

        debug!("Listed {} containers", entries.len());
        Ok(format_container_list(&entries))
    }

    async fn get_logs(&self, container_name: &str, tail: u32) -> Result<String> {
        let docker = self.client()?;

        if !self.is_running(docker, container_name).await? {
            return Ok("Error: Container is not running".to_string());
        }

        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            timestamps: true,
            tail: tail.to_string(),
            ..Default::default()
        };

        let mut stream = docker.logs(container_name, Some(options));
        let mut logs = String::new();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(LogOutput::StdOut { message })
                | Ok(LogOutput::StdErr { message })
                | Ok(LogOutput::Console { message }) => {
                    logs.push_str(&String::from_utf8_lossy(&message));
                }
                Ok(LogOutput::StdIn { .. }) => {}
                Err(e) => return Err(Error::Container(format!("Error retrieving logs: {}", e))),
            }
        }

        Ok(format_logs(tail, &logs))
    }

    fn is_healthy(&self) -> bool {
        self.docker.is_some()
    }
}
