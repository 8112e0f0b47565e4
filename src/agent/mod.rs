//! Agent module - Gemini client, conversation handling and the agentic loop
//!
//! This module handles all model-facing functionality:
//! - Gemini API client behind the `ModelProvider` seam
//! - History conversion and the priming exchange
//! - Model fallback on rate limits
//! - The tool-calling loop and the `Orchestrator` entry point

pub mod agentic_loop;
pub mod fallback;
pub mod gemini;
pub mod history;
pub mod prompts;
pub mod provider;
pub mod types;

pub use agentic_loop::{run_exchange, Exchange, ExchangeOutcome, LoopConfig, Orchestrator};
pub use fallback::ModelFallback;
pub use gemini::GeminiClient;
pub use history::{build_session_history, convert_history, priming_turns};
pub use provider::{ChatSession, ModelProvider};
pub use types::*;
