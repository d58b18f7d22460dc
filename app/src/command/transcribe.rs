use std::path::PathBuf;

use gptalk_providers::TranscriptionOptions;

use super::init_common_components;

/// Input parameters for the Transcribe command strategy.
#[derive(Debug, Clone)]
pub struct TranscribeInput {
    pub file: PathBuf,
    /// Language hint, config default when absent
    pub language: Option<String>,
}

/// Strategy for transcribing an audio file to text.
#[derive(Debug, Clone, Copy)]
pub struct TranscribeStrategy;

impl super::CommandStrategy for TranscribeStrategy {
    type Input = TranscribeInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let common = init_common_components()?;

        let audio = tokio::fs::read(&input.file).await?;
        let mut options = TranscriptionOptions {
            model: common.config.models.transcription.clone(),
            language: input
                .language
                .unwrap_or_else(|| common.config.transcription.language.clone()),
            ..TranscriptionOptions::default()
        };
        if let Some(name) = input.file.file_name().and_then(|name| name.to_str()) {
            options.file_name = name.to_string();
        }

        let transcript = common.provider.transcribe(audio, &options).await?;
        println!("{}", transcript.trim_end());
        Ok(())
    }
}
