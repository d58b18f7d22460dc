#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gptalk_providers::{SpeechFormat, SpeechVoice};
use serde::de::DeserializeOwned;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, InfoStrategy, InitStrategy, SpeakInput,
    SpeakStrategy, ThreadInput, ThreadStrategy, TranscribeInput, TranscribeStrategy,
    VersionStrategy, VisionInput, VisionStrategy,
};

#[derive(Parser)]
#[command(name = "gptalk")]
#[command(about = "Command-line client for OpenAI chat, vision, assistants and audio", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with a token-bounded history (interactive unless -m is given)
    Chat {
        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// System prompt to use
        #[arg(short = 's', long)]
        system: Option<String>,
    },
    /// Ask a question about a JPEG image
    Vision {
        image: PathBuf,

        #[arg(short = 'p', long)]
        prompt: String,
    },
    /// Run an assistant on a new thread
    Thread {
        #[arg(short = 'a', long)]
        assistant: String,

        #[arg(short = 'm', long)]
        message: String,

        /// Delete the thread afterwards
        #[arg(long)]
        delete: bool,
    },
    /// Convert text to speech
    Speak {
        text: String,

        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// alloy, echo, fable, onyx, nova or shimmer
        #[arg(long, value_parser = parse_lowercase::<SpeechVoice>)]
        voice: Option<SpeechVoice>,

        /// mp3, opus, aac, flac, wav or pcm
        #[arg(long, value_parser = parse_lowercase::<SpeechFormat>)]
        format: Option<SpeechFormat>,
    },
    /// Transcribe an audio file
    Transcribe {
        file: PathBuf,

        #[arg(short = 'l', long)]
        language: Option<String>,
    },
    /// Show configuration
    Info,
    /// Initialize configuration
    Init,
    /// Show version
    Version,
}

/// Parse a CLI value through its lowercase serde name.
fn parse_lowercase<T: DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(value.to_lowercase()))
        .map_err(|_| format!("unsupported value: {value}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            model,
            system,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    message,
                    model,
                    system_prompt: system,
                })
                .await
        }
        Commands::Vision { image, prompt } => {
            VisionStrategy
                .execute(VisionInput { image, prompt })
                .await
        }
        Commands::Thread {
            assistant,
            message,
            delete,
        } => {
            ThreadStrategy
                .execute(ThreadInput {
                    assistant_id: assistant,
                    message,
                    delete,
                })
                .await
        }
        Commands::Speak {
            text,
            output,
            voice,
            format,
        } => {
            SpeakStrategy
                .execute(SpeakInput {
                    text,
                    output,
                    voice,
                    format,
                })
                .await
        }
        Commands::Transcribe { file, language } => {
            TranscribeStrategy
                .execute(TranscribeInput { file, language })
                .await
        }
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn speech_values_parse_case_insensitively() {
        assert_eq!(parse_lowercase::<SpeechVoice>("Nova"), Ok(SpeechVoice::Nova));
        assert_eq!(parse_lowercase::<SpeechFormat>("mp3"), Ok(SpeechFormat::Mp3));
        assert!(parse_lowercase::<SpeechVoice>("robot").is_err());
    }

    #[test]
    fn chat_flags_parse() {
        let cli = Cli::try_parse_from(["gptalk", "chat", "-m", "hi", "-M", "gpt-4o"]).unwrap();
        let Commands::Chat { message, model, system } = cli.command else {
            panic!("expected chat");
        };
        assert_eq!(message.as_deref(), Some("hi"));
        assert_eq!(model.as_deref(), Some("gpt-4o"));
        assert!(system.is_none());
    }
}
