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

//! OpenAI API client.
//!
//! Every operation sends a single request (two for thread runs), never
//! retries, and reports failures with [`gptalk_core::ClientError`].

mod audio;
pub mod classify;
mod openai;
mod stream;
mod threads;
mod wire;

pub use audio::{SpeechFormat, SpeechOptions, SpeechVoice, TranscriptionOptions, collect_body};
pub use openai::OpenAIProvider;
pub use threads::{ThreadMessageContent, ThreadReply};
