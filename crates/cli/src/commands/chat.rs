use dealband_agent::ChatMessage;
use dealband_core::domain::deal::CreatorId;

use crate::commands::{
    block_on, correlation_id, finish, load_config, open_database, pricing_runtime, to_value,
    CommandFailure, CommandResult,
};

pub fn run(creator: &str, message: &str, previous_topic: Option<&str>) -> CommandResult {
    finish("chat", chat(creator, message, previous_topic))
}

fn chat(
    creator: &str,
    message: &str,
    previous_topic: Option<&str>,
) -> Result<CommandResult, CommandFailure> {
    let message = ChatMessage {
        user_id: CreatorId(creator.to_string()),
        message: message.to_string(),
        previous_topic: previous_topic.map(str::to_string),
    };
    let config = load_config()?;

    block_on(async {
        let pool = open_database(&config).await?;
        let response = pricing_runtime(&config, &pool)
            .handle_chat_message(&message, &correlation_id("chat"))
            .await
            .map_err(|error| ("pricing", error.to_string(), 7));
        pool.close().await;
        let response = response?;

        let summary = if response.handled {
            "message handled by the pricing flow"
        } else {
            "message left to the general assistant"
        };
        Ok::<_, CommandFailure>(CommandResult::success_with_data("chat", summary, Some(to_value(&response)?)))
    })
}
