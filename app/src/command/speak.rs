use std::path::PathBuf;

use gptalk_providers::{SpeechFormat, SpeechOptions, SpeechVoice};
use tracing::info;

use super::init_common_components;

/// Input parameters for the Speak command strategy.
#[derive(Debug, Clone)]
pub struct SpeakInput {
    pub text: String,
    /// Output file, `speech.<format>` when absent
    pub output: Option<PathBuf>,
    pub voice: Option<SpeechVoice>,
    pub format: Option<SpeechFormat>,
}

/// Strategy for synthesizing speech into an audio file.
#[derive(Debug, Clone, Copy)]
pub struct SpeakStrategy;

impl super::CommandStrategy for SpeakStrategy {
    type Input = SpeakInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;

        let options = SpeechOptions {
            model: common.config.models.speech.clone(),
            voice: input.voice.unwrap_or(common.config.speech.voice),
            format: input.format.unwrap_or(common.config.speech.format),
        };
        let output = input
            .output
            .unwrap_or_else(|| PathBuf::from(format!("speech.{}", options.format.extension())));

        let audio = common.provider.generate_speech(&input.text, &options).await?;
        tokio::fs::write(&output, &audio).await?;

        info!("Wrote {} bytes to {}", audio.len(), output.display());
        println!("{}", output.display());
        Ok(())
    }
}
