use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use gptalk_conversation::ConversationManager;
use tracing::info;

use super::{build_conversation_config, init_common_components};

/// Input parameters for the Vision command strategy.
#[derive(Debug, Clone)]
pub struct VisionInput {
    /// JPEG image to describe
    pub image: PathBuf,
    pub prompt: String,
}

/// Strategy for asking a question about an image.
#[derive(Debug, Clone, Copy)]
pub struct VisionStrategy;

impl super::CommandStrategy for VisionStrategy {
    type Input = VisionInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;

        let image = tokio::fs::read(&input.image).await?;
        info!("Read {} bytes from {}", image.len(), input.image.display());
        let encoded = STANDARD.encode(image);

        let conversation_config = build_conversation_config(&common.config, None, None);
        let manager = ConversationManager::new(common.provider, conversation_config);

        let reply = manager.analyze_image(&encoded, &input.prompt).await?;
        println!("{reply}");
        Ok(())
    }
}
