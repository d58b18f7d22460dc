//! Multi-turn chat command.

use gptalk_conversation::ConversationManager;
use tracing::info;

use super::{build_conversation_config, init_common_components};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
    /// Optional system prompt override
    pub system_prompt: Option<String>,
}

/// Strategy for executing the Chat command.
///
/// With a message it runs one exchange and prints the reply; otherwise it
/// starts a streamed interactive session over a token-bounded history.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;
        let conversation_config =
            build_conversation_config(&common.config, input.model, input.system_prompt);

        info!(
            "Starting conversation {} with model {}",
            conversation_config.conversation_id, conversation_config.chat_model
        );
        let manager = ConversationManager::new(common.provider, conversation_config);

        if let Some(msg) = input.message {
            let reply = manager.send_message(&msg).await?;
            println!("{reply}");
        } else {
            manager.run_interactive().await?;

            let stats = manager.history_stats();
            info!(
                "Conversation ended: {} turns, {} characters",
                stats.total_turns, stats.total_characters
            );
        }

        Ok(())
    }
}
