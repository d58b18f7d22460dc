//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use std::sync::Arc;

use gptalk_config::Config;
use gptalk_conversation::ConversationConfig;
use gptalk_providers::OpenAIProvider;
use tracing::info;

mod chat;
mod info;
mod init;
mod speak;
mod thread;
mod transcribe;
mod version;
mod vision;

pub use chat::{ChatInput, ChatStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use speak::{SpeakInput, SpeakStrategy};
pub use thread::{ThreadInput, ThreadStrategy};
pub use transcribe::{TranscribeInput, TranscribeStrategy};
pub use version::VersionStrategy;
pub use vision::{VisionInput, VisionStrategy};

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust,ignore
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Components shared by every command that talks to the service.
pub struct CommonComponents {
    pub config: Config,
    pub provider: Arc<OpenAIProvider>,
}

/// Load the configuration and build the HTTP provider from it.
pub fn init_common_components() -> anyhow::Result<CommonComponents> {
    let config = Config::load()?;

    let provider = OpenAIProvider::new(config.provider.api_key.clone())
        .with_base_url(config.provider.base_url.clone())
        .with_thread_model(config.models.thread.clone());
    info!("Using API at {}", provider.base_url());

    Ok(CommonComponents {
        config,
        provider: Arc::new(provider),
    })
}

/// Conversation settings from the config file, with CLI overrides applied.
pub fn build_conversation_config(
    config: &Config,
    model: Option<String>,
    system_prompt: Option<String>,
) -> ConversationConfig {
    ConversationConfig {
        vision_model: config.models.vision.clone(),
        function_model: config.models.function.clone(),
        ..ConversationConfig::default()
    }
    .with_model(model.unwrap_or_else(|| config.models.chat.clone()))
    .with_system_prompt(system_prompt.unwrap_or_else(|| config.chat.system_prompt.clone()))
    .with_temperature(config.chat.temperature)
    .with_token_budget(config.chat.token_budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        serde_json::from_str(
            r#"{
                "provider": { "api_key": "sk-test" },
                "chat": { "system_prompt": "Be brief.", "token_budget": 512 },
                "models": { "chat": "gpt-4o", "vision": "gpt-4o-mini" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn conversation_config_follows_file() {
        let conversation = build_conversation_config(&config(), None, None);

        assert_eq!(conversation.chat_model, "gpt-4o");
        assert_eq!(conversation.vision_model, "gpt-4o-mini");
        assert_eq!(conversation.function_model, "gpt-4");
        assert_eq!(conversation.system_prompt, "Be brief.");
        assert_eq!(conversation.token_budget, 512);
    }

    #[test]
    fn cli_overrides_win() {
        let conversation = build_conversation_config(
            &config(),
            Some("gpt-3.5-turbo".to_string()),
            Some("Talk like a pirate.".to_string()),
        );

        assert_eq!(conversation.chat_model, "gpt-3.5-turbo");
        assert_eq!(conversation.system_prompt, "Talk like a pirate.");
    }
}
