//! Error types for mcpilot

use thiserror::Error;

/// Result type alias using mcpilot's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Substrings (lowercase) that mark a provider failure as rate limiting.
pub const RATE_LIMIT_MARKERS: &[&str] = &[
    "429",
    "rate limit",
    "quota exceeded",
    "resource_exhausted",
    "please retry",
];

/// Main error type for mcpilot
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model provider (Gemini) API error
    #[error("Model provider error: {0}")]
    Provider(String),

    /// Rate limit reported by the model provider
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// A gateway command ran but exited unsuccessfully
    #[error("Command '{command}' failed: {message}")]
    Command {
        command: String,
        message: String,
        exit_code: Option<i32>,
    },

    /// A gateway command did not finish in time
    #[error("Command '{command}' timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    /// Docker/container error
    #[error("Container error: {0}")]
    Container(String),

    /// Workspace API error
    #[error("Workspace API error: {0}")]
    Workspace(String),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The model asked for a function nobody declared
    #[error("Unknown function '{0}'.")]
    UnknownTool(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this failure means the active model is rate limited.
    ///
    /// Provider errors are classified on their rendered text, since the
    /// rate-limit signal often arrives inside a generic error body.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimit(_)) || is_rate_limit_message(&self.to_string())
    }
}

/// Case-insensitive match of `text` against [`RATE_LIMIT_MARKERS`].
pub fn is_rate_limit_message(text: &str) -> bool {
    let lower = text.to_lowercase();
    RATE_LIMIT_MARKERS.iter().any(|marker| lower.contains(marker))
}

impl From<bollard::errors::Error> for Error {
    fn from(err: bollard::errors::Error) -> Self {
        Error::Container(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_markers_case_insensitive() {
        assert!(is_rate_limit_message("Error 429: resource_exhausted"));
        assert!(is_rate_limit_message("RESOURCE_EXHAUSTED"));
        assert!(is_rate_limit_message("Quota Exceeded for metric"));
        assert!(is_rate_limit_message("Please retry in 20s"));
        assert!(is_rate_limit_message("hit the Rate Limit"));
        assert!(!is_rate_limit_message("500 internal server error"));
        assert!(!is_rate_limit_message(""));
    }

    #[test]
    fn test_is_rate_limit_variants() {
        assert!(Error::RateLimit("slow down".into()).is_rate_limit());
        assert!(Error::Provider("API error (429 Too Many Requests): {}".into()).is_rate_limit());
        assert!(!Error::Provider("API error (500): boom".into()).is_rate_limit());
        assert!(!Error::Config("missing key".into()).is_rate_limit());
    }

    #[test]
    fn test_command_error_display() {
        let err = Error::Command {
            command: "server list".into(),
            message: "Connection failed".into(),
            exit_code: Some(1),
        };
        assert_eq!(err.to_string(), "Command 'server list' failed: Connection failed");

        let err = Error::Timeout {
            command: "server list".into(),
            secs: 30,
        };
        assert_eq!(err.to_string(), "Command 'server list' timed out after 30s");
    }
}
