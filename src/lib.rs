//! # mcpilot
//!
//! A Gemini-backed assistant that answers questions by calling tools on a
//! Docker MCP gateway, the local Docker daemon and a Notion-style workspace API.
//!
//! ## Features
//!
//! - **Agentic Loop:** Model turns alternate with tool calls until a text answer
//! - **Model Fallback:** Rate-limited models are swapped for the next in line
//! - **Docker MCP Tools:** Gateway commands, container listing and logs
//! - **Workspace API:** Direct REST access with version and 404 workarounds

pub mod agent;
pub mod config;
pub mod docker;
pub mod error;
pub mod runtime;
pub mod telemetry;
pub mod tools;
pub mod workspace;

pub use agent::{ConversationTurn, Orchestrator, Role};
pub use config::Config;
pub use error::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const NAME: &str = env!("CARGO_PKG_NAME");
