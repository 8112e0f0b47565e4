//! Configuration I/O - Loading configuration
//!
//! Handles reading configuration from files and environment variables.

use std::path::Path;

use secrecy::SecretString;

use super::types::Config;
use crate::error::{Error, Result};

/// Load configuration with layered precedence:
/// 1. Config file (config.json / config.toml) if it exists, otherwise defaults
/// 2. Environment variable overrides (includes .env)
pub fn load_config() -> Result<Config> {
    let config_path = super::paths::config_path();

    let mut config = if config_path.exists() {
        load_config_from_path(&config_path)?
    } else {
        Config::default()
    };

    apply_env_overrides(&mut config);

    Ok(config)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config: Config = if path.extension().map_or(false, |ext| ext == "json") {
        json5::from_str(&content).map_err(|e| Error::Config(format!("Invalid JSON config: {}", e)))?
    } else if path.extension().map_or(false, |ext| ext == "toml") {
        toml::from_str(&content).map_err(|e| Error::Config(format!("Invalid TOML config: {}", e)))?
    } else {
        json5::from_str(&content)
            .or_else(|_| toml::from_str(&content).map_err(|e| Error::Config(e.to_string())))
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?
    };

    Ok(config)
}

/// Apply environment variable overrides to an existing config.
///
/// Loads `.env` first, then overlays any set variables. Env vars have the
/// highest precedence: defaults < file < env.
pub fn apply_env_overrides(config: &mut Config) {
    dotenvy::dotenv().ok();
    apply_overrides(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary key lookup.
pub fn apply_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    // Provider
    if let Some(key) = get("GOOGLE_API_KEY") {
        config.provider.api_key = SecretString::from(key);
    }
    if let Some(model) = get("GEMINI_MODEL_PRIMARY") {
        config.provider.primary_model = model;
    }
    if let Some(models) = get("GEMINI_MODEL_FALLBACKS") {
        config.provider.fallback_models = parse_list(&models);
    }
    if let Some(url) = get("GEMINI_BASE_URL") {
        config.provider.base_url = url;
    }
    if let Some(v) = get("GEMINI_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.provider.timeout_secs = v;
    }

    // Agent
    if let Some(v) = get("AGENT_MAX_TOOL_ITERATIONS").and_then(|v| v.parse().ok()) {
        config.agent.max_tool_iterations = v;
    }

    // Docker
    if let Some(name) = get("MCP_CONTAINER_NAME") {
        config.docker.mcp_container = name;
    }
    if let Some(bin) = get("DOCKER_BIN") {
        config.docker.docker_bin = bin;
    }
    if let Some(v) = get("MCP_COMMAND_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.docker.command_timeout_secs = v;
    }

    // Workspace
    if let Some(token) = get("NOTION_API_KEY") {
        config.workspace.api_token = Some(SecretString::from(token));
    }
    if let Some(url) = get("NOTION_BASE_URL") {
        config.workspace.base_url = url;
    }
    if let Some(version) = get("NOTION_VERSION") {
        config.workspace.api_version = version;
    }
    if let Some(version) = get("NOTION_FALLBACK_VERSION") {
        config.workspace.fallback_api_version = version;
    }

    // Gateway
    if let Some(host) = get("HOST") {
        config.gateway.bind = host;
    }
    if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
        config.gateway.port = port;
    }
    if let Some(v) = get("REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
        config.gateway.request_timeout_secs = v;
    }

    // Logging
    if let Some(level) = get("RUST_LOG") {
        config.log.level = level;
    }
    if let Some(format) = get("LOG_FORMAT").and_then(|v| v.parse().ok()) {
        config.log.format = format;
    }
}

/// Split a comma-separated list, dropping blanks
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            lookup(&[
                ("GOOGLE_API_KEY", "k-123"),
                ("GEMINI_MODEL_PRIMARY", "gemini-x"),
                ("GEMINI_MODEL_FALLBACKS", "a, b,,c "),
                ("MCP_CONTAINER_NAME", "toolkit"),
                ("PORT", "9000"),
                ("LOG_FORMAT", "json"),
                ("NOTION_API_KEY", "secret_abc"),
            ]),
        );

        assert_eq!(config.provider.api_key.expose_secret(), "k-123");
        assert_eq!(config.provider.primary_model, "gemini-x");
        assert_eq!(config.provider.fallback_models, vec!["a", "b", "c"]);
        assert_eq!(config.docker.mcp_container, "toolkit");
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.log.format, LogFormat::Json);
        assert!(config.workspace.has_token());
    }

    #[test]
    fn test_blank_and_invalid_values_are_ignored() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            lookup(&[("MCP_CONTAINER_NAME", "  "), ("PORT", "not-a-port")]),
        );
        assert_eq!(config.docker.mcp_container, "mcp-toolkit");
        assert_eq!(config.gateway.port, 8000);
    }

    #[test]
    fn test_load_json5_config_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{
                // comments are allowed
                provider: {{ primary_model: "gemini-file", fallback_models: ["f1"] }},
                docker: {{ mcp_container: "from-file" }},
            }}"#
        )
        .unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.provider.primary_model, "gemini-file");
        assert_eq!(config.provider.fallback_models, vec!["f1"]);
        assert_eq!(config.docker.mcp_container, "from-file");
        assert_eq!(config.agent.max_tool_iterations, 5);
    }

    #[test]
    fn test_load_toml_config_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        write!(
            file,
            "[gateway]\nport = 8080\n\n[agent]\nmax_tool_iterations = 3\n"
        )
        .unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.agent.max_tool_iterations, 3);
    }

    #[test]
    fn test_load_missing_file_is_config_error() {
        let err = load_config_from_path(Path::new("/nonexistent/mcpilot.json")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
