use serde_json::Value;

use crate::models::ModerationOutcome;

/// Maximum accepted chat message length, in characters.
pub const MAX_CHAT_MESSAGE_CHARS: usize = 500;

/// Rule-based content check for in-call content.
///
/// The rule set is a deliberate placeholder for a real content-safety
/// model: chat messages are length-checked, every other content type is
/// allowed through.
pub fn moderate(content_type: &str, content_data: &Value) -> ModerationOutcome {
    match content_type {
        "chat_message" => {
            let text = content_data
                .get("text")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            if text.chars().count() > MAX_CHAT_MESSAGE_CHARS {
                ModerationOutcome::warn("message_too_long")
            } else {
                ModerationOutcome::allow()
            }
        }
        // screen_share, virtual_background and anything else pass through
        _ => ModerationOutcome::allow(),
    }
}
