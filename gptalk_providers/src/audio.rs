//! Text-to-speech and speech-to-text.

use std::time::Duration;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use gptalk_core::ClientError;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::OpenAIProvider;
use crate::classify::{ensure_ok, send};
use crate::wire::SpeechBody;

const TRANSCRIPTION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechVoice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeechFormat {
    Mp3,
    Opus,
    #[default]
    Aac,
    Flac,
    Wav,
    Pcm,
}

impl SpeechFormat {
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Mp3 => "mp3",
            Self::Opus => "opus",
            Self::Aac => "aac",
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Pcm => "pcm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechOptions {
    pub model: String,
    pub voice: SpeechVoice,
    pub format: SpeechFormat,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            model: "tts-1".to_string(),
            voice: SpeechVoice::default(),
            format: SpeechFormat::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptionOptions {
    pub model: String,
    pub file_name: String,
    pub language: String,
}

impl Default for TranscriptionOptions {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            file_name: "recording.m4a".to_string(),
            language: "en".to_string(),
        }
    }
}

/// Drain a chunked body into one buffer.
pub async fn collect_body<S, E>(chunks: S) -> Result<Vec<u8>, ClientError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<anyhow::Error>,
{
    let mut chunks = std::pin::pin!(chunks);
    let mut data = Vec::new();
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk.map_err(ClientError::transport)?;
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

impl OpenAIProvider {
    /// Synthesize `input` and return the complete audio container.
    pub async fn generate_speech(
        &self,
        input: &str,
        options: &SpeechOptions,
    ) -> Result<Vec<u8>, ClientError> {
        info!(
            "Requesting speech: model={}, voice={:?}, format={:?}",
            options.model, options.voice, options.format
        );

        let body = SpeechBody {
            model: &options.model,
            input,
            voice: options.voice,
            response_format: options.format,
        };
        let response = send(self.request(Method::POST, "/audio/speech").json(&body)).await?;
        let response = ensure_ok(response).await?;

        let audio = collect_body(response.bytes_stream()).await?;
        info!("Received {} bytes of audio", audio.len());
        Ok(audio)
    }

    /// Transcribe audio with a hand-built multipart form. The plain-text
    /// body of a 200 response is the transcript.
    pub async fn transcribe(
        &self,
        audio: Vec<u8>,
        options: &TranscriptionOptions,
    ) -> Result<String, ClientError> {
        info!(
            "Requesting transcription: model={}, {} bytes",
            options.model,
            audio.len()
        );

        let file = Part::bytes(audio)
            .file_name(options.file_name.clone())
            .mime_str("audio/mpeg")
            .map_err(ClientError::transport)?;
        let form = Form::new()
            .part("file", file)
            .text("model", options.model.clone())
            .text("language", options.language.clone())
            .text("response_format", "text");

        let response = send(
            self.request(Method::POST, "/audio/transcriptions")
                .timeout(TRANSCRIPTION_TIMEOUT)
                .multipart(form),
        )
        .await?;
        let response = ensure_ok(response).await?;

        let body = response.bytes().await.map_err(ClientError::transport)?;
        String::from_utf8(body.to_vec()).map_err(|_| ClientError::EmptyResponse)
    }
}
