//! Gemini `generateContent` API client

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agent::provider::ModelProvider;
use crate::agent::types::{Content, ToolDeclaration};
use crate::config::GeminiConfig;
use crate::error::{Error, Result};

/// Gemini API client
#[derive(Clone)]
pub struct GeminiClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: GeminiConfig,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolSet<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolSet<'a> {
    function_declarations: &'a [ToolDeclaration],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Response from `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    prompt_feedback: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u32,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// Fails with [`Error::Config`] when no usable API key is configured.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        if !config.has_api_key() {
            return Err(Error::Config(
                "Google API key not configured. Please set GOOGLE_API_KEY in your .env file"
                    .to_string(),
            ));
        }

        let mut headers = header::HeaderMap::new();
        let mut key = header::HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|e| Error::Config(format!("Invalid API key format: {}", e)))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(GeminiClient { client, config })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    async fn generate(
        &self,
        model: &str,
        contents: &[Content],
        declarations: &[ToolDeclaration],
    ) -> Result<Content> {
        let request = GenerateContentRequest {
            contents,
            tools: if declarations.is_empty() {
                Vec::new()
            } else {
                vec![ToolSet {
                    function_declarations: declarations,
                }]
            },
            generation_config: self.config.temperature.map(|t| GenerationConfig {
                temperature: Some(t),
            }),
        };

        debug!("Sending request to Gemini: model={}, turns={}", model, contents.len());

        let response = self
            .client
            .post(self.endpoint(model))
            .json(&request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => {
                    warn!("Rate limit exceeded on {}: {}", model, error_text);
                    Error::RateLimit(format!("429 from {}: {}", model, error_text))
                }
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Error::Provider(format!("Unauthorized ({}): check GOOGLE_API_KEY", status))
                }
                _ => Error::Provider(format!("API error ({}): {}", status, error_text)),
            });
        }

        let body = response.json::<GenerateContentResponse>().await?;

        if let Some(ref usage) = body.usage_metadata {
            info!("Gemini response: model={}, tokens={}", model, usage.total_token_count);
        }

        let candidate = body.candidates.into_iter().next().ok_or_else(|| {
            Error::Provider(format!(
                "empty response from {} (prompt feedback: {})",
                model,
                body.prompt_feedback
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "none".to_string())
            ))
        })?;

        debug!("Gemini finish_reason: {:?}", candidate.finish_reason);

        candidate.content.ok_or_else(|| {
            Error::Provider(format!(
                "candidate without content from {} (finish reason: {})",
                model,
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::types::ContentRole;
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> GeminiConfig {
        GeminiConfig {
            api_key: SecretString::from("test-key"),
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    fn declarations() -> Vec<ToolDeclaration> {
        vec![ToolDeclaration {
            name: "list_containers".into(),
            description: "List containers".into(),
            parameters: json!({"type": "OBJECT", "properties": {}}),
        }]
    }

    #[test]
    fn test_missing_key_is_config_error() {
        let config = GeminiConfig::default();
        assert!(matches!(GeminiClient::new(config), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_generate_function_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"functionCall": {"name": "list_containers", "args": {}}}]
                    },
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"totalTokenCount": 42}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server.uri())).unwrap();
        let content = client
            .generate("gemini-2.5-flash", &[Content::user_text("hi")], &declarations())
            .await
            .unwrap();

        assert_eq!(content.role, ContentRole::Model);
        let call = content.parts[0].function_call.as_ref().unwrap();
        assert_eq!(call.name, "list_containers");
    }

    #[tokio::test]
    async fn test_request_carries_declarations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(wiremock::matchers::body_partial_json(json!({
                "tools": [{"functionDeclarations": [{"name": "list_containers"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"role": "model", "parts": [{"text": "ok"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server.uri())).unwrap();
        let content = client
            .generate("m", &[Content::user_text("hi")], &declarations())
            .await
            .unwrap();
        assert_eq!(content.text(), "ok");
    }

    #[tokio::test]
    async fn test_429_is_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": 429, "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server.uri())).unwrap();
        let err = client
            .generate("m", &[Content::user_text("hi")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RateLimit(_)));
        assert!(err.is_rate_limit());
    }

    #[tokio::test]
    async fn test_server_error_is_not_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server.uri())).unwrap();
        let err = client
            .generate("m", &[Content::user_text("hi")], &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Provider(_)));
        assert!(!err.is_rate_limit());
    }

    #[tokio::test]
    async fn test_no_candidates_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [],
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(test_config(&server.uri())).unwrap();
        let err = client
            .generate("m", &[Content::user_text("hi")], &[])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("empty response"));
    }
}
