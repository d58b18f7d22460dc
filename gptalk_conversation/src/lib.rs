#![warn(
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

//! Multi-turn conversation over a token-bounded history.
//!
//! # Key Features
//! - Oldest-first trimming of each request to a token budget
//! - History grows only on successful chat, vision and tool-call exchanges
//! - At most one chat exchange in flight per conversation
//! - Streamed replies that leave history untouched when abandoned

mod interactive;
mod manager;

pub use manager::{ChatOptions, ConversationConfig, ConversationManager};
