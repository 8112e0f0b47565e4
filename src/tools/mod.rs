//! Tools module - the capabilities the model can call
//!
//! Each tool is a self-contained module that implements the `Tool` trait
//! and delegates to a capability provider (`docker`, `workspace`). Tools are
//! registered into a `ToolRegistry`, which produces the declarations sent to
//! the model and dispatches the calls it makes.
//!
//! ## Built-in Tools
//!
//! - **execute_command**: Docker MCP gateway subcommands
//! - **list_containers**: Containers on the host
//! - **get_logs**: Tail of a container's logs
//! - **workspace_api_call**: Raw workspace (Notion) REST calls

mod execute_command;
mod get_logs;
mod list_containers;
mod registry;
mod traits;
mod workspace_api;

// Core trait and types
pub use traits::{Tool, ToolOutput};

// Registry
pub use registry::ToolRegistry;

// Built-in tools
pub use execute_command::ExecuteCommandTool;
pub use get_logs::{GetLogsTool, DEFAULT_TAIL};
pub use list_containers::ListContainersTool;
pub use workspace_api::WorkspaceApiTool;
