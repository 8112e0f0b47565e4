//! Configuration module - Modular configuration management
//!
//! - types/mod.rs: Root `Config` plus agent, gateway and log sections
//! - types/provider.rs: Gemini provider and fallback chain
//! - types/docker.rs: Docker MCP gateway
//! - types/workspace.rs: Workspace API
//! - io.rs: Configuration loading
//! - validation.rs: Configuration validation
//! - paths.rs: Config directory and file lookup (json, then toml)

mod io;
mod paths;
mod types;
mod validation;

pub use types::{AgentConfig, Config, GatewayConfig, LogConfig, LogFormat};
pub use types::docker::DockerConfig;
pub use types::provider::{GeminiConfig, API_KEY_PLACEHOLDER};
pub use types::workspace::WorkspaceConfig;

pub use io::{apply_env_overrides, apply_overrides, load_config, load_config_from_path};
pub use paths::{config_dir, config_path};
pub use validation::{validate_config, ConfigValidationResult, ValidationIssue};
