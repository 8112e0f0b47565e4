//! Conversion of caller history into model-session turns.

use crate::agent::prompts::{PRIMING_ACKNOWLEDGEMENT, SYSTEM_INSTRUCTION};
use crate::agent::types::{Content, ContentRole, ConversationTurn, Part, Role};

/// Map caller turns onto the model's native turn schema.
///
/// Order and length are preserved: `User` becomes a user turn and
/// `Assistant` a model turn.
pub fn convert_history(history: &[ConversationTurn]) -> Vec<Content> {
    history
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::Assistant => ContentRole::Model,
                Role::User => ContentRole::User,
            };
            Content {
                role,
                parts: vec![Part::text(turn.content.clone())],
            }
        })
        .collect()
}

/// The fixed instruction/acknowledgement pair that opens every exchange.
pub fn priming_turns() -> [Content; 2] {
    [
        Content::user_text(SYSTEM_INSTRUCTION),
        Content::model_text(PRIMING_ACKNOWLEDGEMENT),
    ]
}

/// Priming turns followed by the converted history.
pub fn build_session_history(history: &[ConversationTurn]) -> Vec<Content> {
    let mut contents = Vec::with_capacity(history.len() + 2);
    contents.extend(priming_turns());
    contents.extend(convert_history(history));
    contents
}
