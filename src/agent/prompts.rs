//! Fixed prompt text and user-facing fallback messages

/// Instruction sent as the first (user) priming turn of every exchange
pub const SYSTEM_INSTRUCTION: &str = r#"You have access to a Docker MCP gateway and a Notion workspace.

Available tools:
- execute_command(command) - Run MCP gateway commands. Format: "tools call <TOOL> '<JSON>'"
- list_containers() - List Docker containers on this machine
- get_logs(container_name, tail) - Read recent container logs
- workspace_api_call(method, endpoint, body) - Call the Notion REST API directly

Common Notion commands (pass to execute_command):
- Search all: tools call API-post-search
- Query DB: tools call API-post-database-query '{"database_id":"ID"}'
- Create page: tools call API-post-page '{"parent":{"database_id":"ID"},"properties":{...}}'
- Get page: tools call API-retrieve-a-page '{"page_id":"ID"}'
- Get DB schema: tools call API-retrieve-a-database '{"database_id":"ID"}'

When user asks to do something:
1. Find what you need (search if needed)
2. Do it
3. Confirm

Be proactive. Don't ask for IDs - find them yourself.

IMPORTANT: When calling execute_command, pass ONLY the MCP command part.
Example: execute_command("tools call API-post-search") NOT
execute_command("docker mcp tools call...")"#;

/// Model-side acknowledgement that closes the priming exchange
pub const PRIMING_ACKNOWLEDGEMENT: &str =
    "Understood! I have direct access to Docker MCP tools and will use them proactively to answer your questions.";

/// Returned when the tool-use cap is reached without a final answer
pub const TOOL_LIMIT_MESSAGE: &str =
    "I apologize, but I reached the maximum number of tool uses. Please try rephrasing your request.";

/// Returned when every model in the fallback chain is rate limited
pub const ALL_MODELS_RATE_LIMITED_MESSAGE: &str =
    "I'm experiencing rate limits across all available models. Please try again in a minute.";

/// Returned when the model finishes with no text at all
pub const EMPTY_REPLY_MESSAGE: &str =
    "I wasn't able to produce a response. Please try rephrasing your request.";

/// Message for an unclassified failure; never retried
pub fn error_message(err: &impl std::fmt::Display) -> String {
    format!("I encountered an error: Error generating response: {}", err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_names_every_tool() {
        for tool in ["execute_command", "list_containers", "get_logs", "workspace_api_call"] {
            assert!(SYSTEM_INSTRUCTION.contains(tool), "missing {}", tool);
        }
    }

    #[test]
    fn test_error_message_embeds_error_text() {
        let msg = error_message(&"socket closed");
        assert!(msg.starts_with("I encountered an error"));
        assert!(msg.ends_with("socket closed"));
    }
}
