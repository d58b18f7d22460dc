//! Configuration file for the `gptalk` client, stored at
//! `~/gptalk/config.json`.

mod schema;

pub use schema::{
    API_KEY_ENV, ChatSettings, Config, ModelsConfig, ProviderConfig, SpeechSettings,
    TranscriptionSettings,
};
