//! Configuration validation
//!
//! Validates configuration and reports issues.

use super::types::Config;

/// Result of configuration validation
#[derive(Debug, Clone)]
pub struct ConfigValidationResult {
    /// Whether the config is valid
    pub valid: bool,
    /// Validation errors (critical)
    pub errors: Vec<ValidationIssue>,
    /// Validation warnings (non-critical)
    pub warnings: Vec<ValidationIssue>,
}

impl ConfigValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        ConfigValidationResult {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error
    pub fn with_error(mut self, issue: ValidationIssue) -> Self {
        self.valid = false;
        self.errors.push(issue);
        self
    }

    /// Add a warning
    pub fn with_warning(mut self, issue: ValidationIssue) -> Self {
        self.warnings.push(issue);
        self
    }
}

/// A validation issue
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Path to the config field
    pub path: String,
    /// Issue message
    pub message: String,
    /// Suggested fix
    pub suggestion: Option<String>,
}

impl ValidationIssue {
    /// Create a new issue
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " ({})", suggestion)?;
        }
        Ok(())
    }
}

/// Validate the configuration
pub fn validate_config(config: &Config) -> ConfigValidationResult {
    let mut result = ConfigValidationResult::valid();

    result = validate_provider_config(config, result);
    result = validate_docker_config(config, result);
    result = validate_workspace_config(config, result);

    result
}

fn validate_provider_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if !config.provider.has_api_key() {
        result = result.with_error(
            ValidationIssue::new("provider.api_key", "GOOGLE_API_KEY is missing or invalid")
                .with_suggestion("Get a key from https://aistudio.google.com/app/apikey and add it to .env"),
        );
    }

    if config.provider.primary_model.trim().is_empty() {
        result = result.with_error(ValidationIssue::new(
            "provider.primary_model",
            "Primary model name is empty",
        ));
    }

    if config.provider.fallback_models.is_empty() {
        result = result.with_warning(ValidationIssue::new(
            "provider.fallback_models",
            "No fallback models configured; rate limits will not fail over",
        ));
    }

    result = check_base_url("provider.base_url", &config.provider.base_url, result);

    if config.agent.max_tool_iterations == 0 {
        result = result.with_error(ValidationIssue::new(
            "agent.max_tool_iterations",
            "Must allow at least one tool-use iteration",
        ));
    }

    result
}

fn validate_docker_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if config.docker.mcp_container.trim().is_empty() {
        result = result.with_error(
            ValidationIssue::new("docker.mcp_container", "MCP_CONTAINER_NAME is not configured")
                .with_suggestion("Set MCP_CONTAINER_NAME (default: mcp-toolkit)"),
        );
    }

    result
}

fn validate_workspace_config(config: &Config, mut result: ConfigValidationResult) -> ConfigValidationResult {
    if !config.workspace.has_token() {
        result = result.with_warning(
            ValidationIssue::new(
                "workspace.api_token",
                "No workspace API token configured; workspace_api_call will report an error",
            )
            .with_suggestion("Set NOTION_API_KEY to enable workspace access"),
        );
    }

    check_base_url("workspace.base_url", &config.workspace.base_url, result)
}

fn check_base_url(path: &str, raw: &str, result: ConfigValidationResult) -> ConfigValidationResult {
    match url::Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => result,
        Ok(url) => result.with_error(ValidationIssue::new(
            path,
            format!("Unsupported URL scheme '{}'", url.scheme()),
        )),
        Err(e) => result.with_error(ValidationIssue::new(path, format!("Invalid URL '{}': {}", raw, e))),
    }
}
