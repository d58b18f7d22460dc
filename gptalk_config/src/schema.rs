use std::path::{Path, PathBuf};

use gptalk_core::util::{
    DEFAULT_BASE_URL, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE, DEFAULT_TOKEN_BUDGET,
};
use gptalk_providers::{SpeechFormat, SpeechVoice};
use serde::{Deserialize, Serialize};
use tracing::info;

const CONFIG_DIR: &str = "gptalk";
const CONFIG_FILE: &str = "config.json";

/// Environment variable that overrides `provider.api_key`.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const CONFIG_TEMPLATE: &str = r#"{
  "provider": {
    "api_key": "your-openai-api-key-here",
    "base_url": "https://api.openai.com/v1"
  },
  "chat": {
    "system_prompt": "You're a helpful assistant",
    "temperature": 0.5,
    "token_budget": 4096
  },
  "models": {
    "chat": "gpt-4-turbo",
    "vision": "gpt-4-turbo",
    "function": "gpt-4",
    "thread": "gpt-4-turbo",
    "speech": "tts-1",
    "transcription": "whisper-1"
  },
  "speech": {
    "voice": "alloy",
    "format": "aac"
  },
  "transcription": {
    "language": "en"
  }
}
"#;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub speech: SpeechSettings,
    #[serde(default)]
    pub transcription: TranscriptionSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
}

impl ProviderConfig {
    fn default_base_url() -> String {
        DEFAULT_BASE_URL.to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChatSettings {
    pub system_prompt: String,
    pub temperature: f64,
    /// Maximum token cost of one assembled request
    pub token_budget: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            token_budget: DEFAULT_TOKEN_BUDGET,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ModelsConfig {
    pub chat: String,
    pub vision: String,
    pub function: String,
    pub thread: String,
    pub speech: String,
    pub transcription: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            chat: "gpt-4-turbo".to_string(),
            vision: "gpt-4-turbo".to_string(),
            function: "gpt-4".to_string(),
            thread: "gpt-4-turbo".to_string(),
            speech: "tts-1".to_string(),
            transcription: "whisper-1".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SpeechSettings {
    pub voice: SpeechVoice,
    pub format: SpeechFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TranscriptionSettings {
    pub language: String,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

impl Config {
    /// Load `~/gptalk/config.json`, letting `OPENAI_API_KEY` override the
    /// stored key.
    pub fn load() -> anyhow::Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'gptalk init' to create config.",
                path.display()
            );
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Replace the stored API key when `key` is a non-empty value.
    #[must_use]
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|key| !key.trim().is_empty()) {
            self.provider.api_key = key;
        }
        self
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR);

        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    fn config_path() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR)
            .join(CONFIG_FILE))
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_path = Self::ensure_config_dir()?.join(CONFIG_FILE);
        Self::create_at(&config_path)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your OpenAI API key");
        println!("      (or export {API_KEY_ENV})");
        println!("   2. Run 'gptalk chat' to start a conversation");
        println!();
        println!("🔧 Configuration options:");
        println!("   - chat.token_budget: Token limit for each request, oldest turns are dropped first");
        println!("   - models: Model used by each command");
        println!("   - speech.voice: alloy, echo, fable, onyx, nova or shimmer");
        println!();
        Ok(())
    }

    /// Write the template to `path`, refusing to overwrite.
    pub fn create_at(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }
        std::fs::write(path, CONFIG_TEMPLATE)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> Config {
        serde_json::from_str(r#"{ "provider": { "api_key": "sk-file" } }"#).unwrap()
    }

    #[test]
    fn missing_sections_take_defaults() {
        let config = minimal();

        assert_eq!(config.provider.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.chat, ChatSettings::default());
        assert_eq!(config.chat.token_budget, 4096);
        assert_eq!(config.models.function, "gpt-4");
        assert_eq!(config.speech.voice, SpeechVoice::Alloy);
        assert_eq!(config.speech.format, SpeechFormat::Aac);
        assert_eq!(config.transcription.language, "en");
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
                "provider": { "api_key": "sk-file" },
                "chat": { "token_budget": 1000 },
                "speech": { "voice": "nova" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.chat.token_budget, 1000);
        assert_eq!(config.chat.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.speech.voice, SpeechVoice::Nova);
        assert_eq!(config.speech.format, SpeechFormat::Aac);
    }

    #[test]
    fn provider_section_is_required() {
        assert!(serde_json::from_str::<Config>("{}").is_err());
    }

    #[test]
    fn template_parses_to_defaults() {
        let config: Config = serde_json::from_str(CONFIG_TEMPLATE).unwrap();

        assert_eq!(config.chat, ChatSettings::default());
        assert_eq!(config.models, ModelsConfig::default());
        assert_eq!(config.speech, SpeechSettings::default());
        assert_eq!(config.transcription, TranscriptionSettings::default());
    }

    #[test]
    fn env_key_overrides_file_key() {
        let config = minimal().with_api_key_override(Some("sk-env".to_string()));
        assert_eq!(config.provider.api_key, "sk-env");

        let config = minimal().with_api_key_override(Some("  ".to_string()));
        assert_eq!(config.provider.api_key, "sk-file");

        let config = minimal().with_api_key_override(None);
        assert_eq!(config.provider.api_key, "sk-file");
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        Config::create_at(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.provider.api_key, "your-openai-api-key-here");

        let err = Config::create_at(&path).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn load_from_missing_file_suggests_init() {
        let dir = tempfile::tempdir().unwrap();

        let err = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap_err();

        assert!(err.to_string().contains("gptalk init"));
    }
}
