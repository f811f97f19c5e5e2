use dealband_agent::{should_handle_chat_pricing, DealIntentParser};
use serde_json::json;

use crate::commands::{finish, to_value, CommandResult};

/// Offline view of what the chat parser extracts; touches no database.
pub fn run(message: &str, previous_topic: Option<&str>) -> CommandResult {
    let intent = DealIntentParser::new().parse(message);
    let routed = should_handle_chat_pricing(&intent, previous_topic);

    finish(
        "parse",
        to_value(&intent).map(|intent| {
            let summary = if routed {
                "message would be routed to pricing"
            } else {
                "message would not be routed to pricing"
            };
            CommandResult::success_with_data(
                "parse",
                summary,
                Some(json!({ "routed": routed, "intent": intent })),
            )
        }),
    )
}
