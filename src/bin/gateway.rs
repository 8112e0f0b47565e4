//! mcpilot Gateway - HTTP chat API in front of the orchestrator.
//!
//! Routes:
//! - `GET /`       service info
//! - `GET /health` Docker and model-provider status
//! - `POST /chat`  `{prompt, history}` -> `{reply}`

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clap::Parser;
use mcpilot::config::{validate_config, Config};
use mcpilot::docker::ContainerGateway;
use mcpilot::runtime::{HealthReport, Services};
use mcpilot::telemetry::{init_tracing, preview};
use mcpilot::{ConversationTurn, NAME, VERSION};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

// ---- CLI ----

#[derive(Parser)]
#[command(name = "mcpilot-gateway", version = VERSION, about = "mcpilot HTTP chat gateway")]
struct Args {
    /// Bind address (overrides HOST / config)
    #[arg(long)]
    bind: Option<String>,

    /// Port (overrides PORT / config)
    #[arg(long, short)]
    port: Option<u16>,
}

// ---- App State ----

#[derive(Clone)]
struct AppState {
    services: Arc<Services>,
}

// ---- Error Handling ----

enum AppError {
    /// Request failed validation
    Validation(String),
    /// A backing service is down or unconfigured
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::Validation(detail) => (StatusCode::UNPROCESSABLE_ENTITY, detail),
            AppError::Unavailable(detail) => (StatusCode::SERVICE_UNAVAILABLE, detail),
        };
        (status, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

// ---- Request / Response Types ----

#[derive(Deserialize)]
struct ChatRequest {
    prompt: String,
    #[serde(default)]
    history: Vec<ConversationTurn>,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
    status: &'static str,
    health: &'static str,
}

// ---- Handlers ----

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        name: NAME,
        version: VERSION,
        status: "running",
        health: "/health",
    })
}

async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.services.health())
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.prompt.trim().is_empty() {
        return Err(AppError::Validation("prompt must not be empty".to_string()));
    }

    if !state.services.docker.is_healthy() {
        return Err(AppError::Unavailable(
            "Docker service is not available. Please ensure Docker is running and the MCP \
             container is started."
                .to_string(),
        ));
    }

    let orchestrator = state.services.orchestrator.as_ref().ok_or_else(|| {
        AppError::Unavailable(
            "Model service is not configured. Set GOOGLE_API_KEY and restart the gateway."
                .to_string(),
        )
    })?;

    let request_id = Uuid::new_v4();
    let span = info_span!("chat", %request_id);

    let reply = async {
        info!(
            "New chat request ({} history messages): {}",
            request.history.len(),
            preview(&request.prompt, 100)
        );
        let reply = orchestrator.respond(&request.prompt, &request.history).await;
        info!("Response generated: {}", preview(&reply, 100));
        reply
    }
    .instrument(span)
    .await;

    Ok(Json(ChatResponse { reply }))
}

fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/chat", post(chat))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout))
                .layer(CorsLayer::permissive()),
        )
}

// ---- Main ----

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::from_env()?;
    init_tracing(&config.log)?;

    info!("Starting {} gateway v{}", NAME, VERSION);

    let validation = validate_config(&config);
    for issue in &validation.errors {
        warn!("Config error: {}", issue);
    }
    for issue in &validation.warnings {
        warn!("Config warning: {}", issue);
    }

    let bind = args.bind.unwrap_or_else(|| config.gateway.bind.clone());
    let port = args.port.unwrap_or(config.gateway.port);
    let request_timeout = Duration::from_secs(config.gateway.request_timeout_secs);

    let services = Services::start(config).await?;
    let health = services.health();
    info!(
        "Status: {:?} (docker_connected={}, llm_configured={})",
        health.status, health.docker_connected, health.llm_configured
    );

    let app = build_router(
        AppState {
            services: Arc::new(services),
        },
        request_timeout,
    );

    let addr: SocketAddr = format!("{}:{}", bind, port).parse()?;
    info!("Gateway listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
