//! Workspace (Notion-style) API configuration

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Remote workspace API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Bearer token; `None` leaves the tool declared but unusable
    #[serde(skip_serializing, default)]
    pub api_token: Option<SecretString>,
    /// Base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// API version header sent on every request
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Version retried once when the server rejects `api_version`
    #[serde(default = "default_fallback_api_version")]
    pub fallback_api_version: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        WorkspaceConfig {
            api_token: None,
            base_url: default_base_url(),
            api_version: default_api_version(),
            fallback_api_version: default_fallback_api_version(),
            timeout_secs: default_timeout(),
        }
    }
}

impl WorkspaceConfig {
    /// Whether a non-empty token is configured
    pub fn has_token(&self) -> bool {
        self.api_token
            .as_ref()
            .map(|t| !t.expose_secret().trim().is_empty())
            .unwrap_or(false)
    }
}

fn default_base_url() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_api_version() -> String {
    "2022-06-28".to_string()
}

fn default_fallback_api_version() -> String {
    "2025-09-03".to_string()
}

fn default_timeout() -> u64 {
    30
}
