//! Remote workspace (Notion-style) REST API provider

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use secrecy::ExposeSecret;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::WorkspaceConfig;
use crate::error::{Error, Result};

const ALLOWED_METHODS: &[&str] = &["GET", "POST", "PATCH", "PUT", "DELETE"];

/// Raw REST access to the workspace service
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// Perform `method endpoint` with an optional JSON `body` and return the
    /// pretty-printed response
    async fn workspace_api_call(&self, method: &str, endpoint: &str, body: &str) -> Result<String>;
}

/// Bearer-authenticated workspace client
pub struct WorkspaceClient {
    client: Client,
    config: WorkspaceConfig,
}

impl WorkspaceClient {
    /// Create a client. A missing token is allowed; calls then fail with a config error.
    pub fn new(config: &WorkspaceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        if !config.has_token() {
            warn!("Workspace API token not configured; workspace_api_call will fail");
        }

        Ok(WorkspaceClient {
            client,
            config: config.clone(),
        })
    }

    /// Whether a token is configured
    pub fn is_configured(&self) -> bool {
        self.config.has_token()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        version: &str,
    ) -> Result<(StatusCode, Value)> {
        let token = self
            .config
            .api_token
            .as_ref()
            .ok_or_else(|| Error::Config("workspace API token not configured".to_string()))?;

        let mut request = self
            .client
            .request(method.clone(), self.url(path))
            .bearer_auth(token.expose_secret())
            .header("Notion-Version", version);

        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("Workspace request: {} {} (version {})", method, path, version);

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok((status, value))
    }

    /// Send once, retrying with the fallback API version when the server rejects ours
    async fn send_versioned(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<(StatusCode, Value)> {
        let (status, value) = self.send(method, path, body, &self.config.api_version).await?;

        if rejects_version(status, &value) && self.config.fallback_api_version != self.config.api_version {
            warn!(
                "Workspace API rejected version {} ({}); retrying with {}",
                self.config.api_version, status, self.config.fallback_api_version
            );
            return self
                .send(method, path, body, &self.config.fallback_api_version)
                .await;
        }

        Ok((status, value))
    }

    /// Rebuild a database query result from a page search
    async fn query_via_search(&self, database_id: &str) -> Result<Value> {
        info!("Database query 404 for {}; re-deriving via search", database_id);

        let search = json!({
            "filter": {"property": "object", "value": "page"},
            "page_size": 100
        });
        let (status, value) = self
            .send_versioned(&Method::POST, "search", Some(&search))
            .await?;

        if !status.is_success() {
            return Err(api_error(status, &value));
        }

        let wanted = normalize_id(database_id);
        let results: Vec<Value> = value
            .get("results")
            .and_then(Value::as_array)
            .map(|pages| {
                pages
                    .iter()
                    .filter(|page| {
                        page.pointer("/parent/database_id")
                            .and_then(Value::as_str)
                            .map(|id| normalize_id(id) == wanted)
                            .unwrap_or(false)
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        debug!("Search re-derivation kept {} pages", results.len());

        Ok(json!({
            "object": "list",
            "results": results,
            "has_more": false,
            "next_cursor": null,
            "derived_from": "search"
        }))
    }
}

#[async_trait]
impl WorkspaceApi for WorkspaceClient {
    async fn workspace_api_call(&self, method: &str, endpoint: &str, body: &str) -> Result<String> {
        if !self.config.has_token() {
            return Err(Error::Config("workspace API token not configured".to_string()));
        }

        let method = parse_method(method)?;
        let path = normalize_endpoint(endpoint);

        let body: Option<Value> = if body.trim().is_empty() {
            None
        } else {
            Some(
                serde_json::from_str(body)
                    .map_err(|e| Error::InvalidInput(format!("Invalid JSON body: {}", e)))?,
            )
        };

        info!("Workspace API call: {} {}", method, path);

        let (status, value) = self.send_versioned(&method, &path, body.as_ref()).await?;

        let value = if status == StatusCode::NOT_FOUND && method == Method::POST {
            match database_query_id(&path) {
                Some(database_id) => self.query_via_search(database_id).await?,
                None => return Err(api_error(status, &value)),
            }
        } else if !status.is_success() {
            return Err(api_error(status, &value));
        } else {
            value
        };

        Ok(serde_json::to_string_pretty(&value)?)
    }
}

fn parse_method(method: &str) -> Result<Method> {
    let upper = method.trim().to_uppercase();
    if !ALLOWED_METHODS.contains(&upper.as_str()) {
        return Err(Error::InvalidInput(format!(
            "Unsupported HTTP method '{}'. Use one of {}",
            method,
            ALLOWED_METHODS.join(", ")
        )));
    }
    Method::from_bytes(upper.as_bytes())
        .map_err(|e| Error::InvalidInput(format!("Invalid HTTP method '{}': {}", method, e)))
}

/// Make `endpoint` relative to the base URL, tolerating `/v1/...`
fn normalize_endpoint(endpoint: &str) -> String {
    let path = endpoint.trim().trim_start_matches('/');
    path.strip_prefix("v1/").unwrap_or(path).to_string()
}

/// `databases/{id}/query` -> `{id}`
fn database_query_id(path: &str) -> Option<&str> {
    let mut segments = path.trim_end_matches('/').split('/');
    match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some("databases"), Some(id), Some("query"), None) if !id.is_empty() => Some(id),
        _ => None,
    }
}

fn normalize_id(id: &str) -> String {
    id.chars().filter(|c| *c != '-').collect::<String>().to_lowercase()
}

fn rejects_version(status: StatusCode, body: &Value) -> bool {
    match status {
        StatusCode::CONFLICT => true,
        StatusCode::BAD_REQUEST => body
            .get("message")
            .and_then(Value::as_str)
            .map(|m| m.to_lowercase().contains("version"))
            .unwrap_or(false),
        _ => false,
    }
}

fn api_error(status: StatusCode, body: &Value) -> Error {
    let code = body.get("code").and_then(Value::as_str).unwrap_or("unknown");
    let message = match body.get("message").and_then(Value::as_str) {
        Some(message) => message.to_string(),
        None => match body {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        },
    };
    Error::Workspace(format!("API error ({}): {}: {}", status.as_u16(), code, message))
}
