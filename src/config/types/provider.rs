//! Provider configuration types
//!
//! Configuration for the Gemini model provider and its fallback chain.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Placeholder shipped in `.env.template`; treated as "no key".
pub const API_KEY_PLACEHOLDER: &str = "your_gemini_api_key_here";

fn default_secret() -> SecretString {
    SecretString::from(String::new())
}

/// Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key
    #[serde(skip_serializing, default = "default_secret")]
    pub api_key: SecretString,
    /// Model tried first
    #[serde(default = "default_primary_model")]
    pub primary_model: String,
    /// Models tried in order when the active one is rate limited
    #[serde(default = "default_fallback_models")]
    pub fallback_models: Vec<String>,
    /// Base URL
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            api_key: default_secret(),
            primary_model: default_primary_model(),
            fallback_models: default_fallback_models(),
            base_url: default_gemini_url(),
            timeout_secs: default_timeout(),
            temperature: None,
        }
    }
}

impl GeminiConfig {
    /// Whether a usable API key is present
    pub fn has_api_key(&self) -> bool {
        let key = self.api_key.expose_secret().trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }
}

fn default_primary_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_fallback_models() -> Vec<String> {
    vec![
        "gemini-2.5-flash-lite".to_string(),
        "gemini-2.0-flash".to_string(),
        "gemini-1.5-flash".to_string(),
    ]
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_timeout() -> u64 {
    120
}
