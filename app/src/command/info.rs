use gptalk_config::{API_KEY_ENV, Config};

/// Strategy for displaying configuration information.
///
/// The API key is masked; everything else is printed as loaded.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== gptalk Configuration ===\n");

        println!("Provider:");
        println!("  API Key: {}", mask_key(&config.provider.api_key));
        if std::env::var(API_KEY_ENV).is_ok() {
            println!("  (overridden by {API_KEY_ENV})");
        }
        println!("  Base URL: {}", config.provider.base_url);
        println!();

        println!("Chat:");
        println!("  System Prompt: {}", truncate(&config.chat.system_prompt, 60));
        println!("  Temperature: {}", config.chat.temperature);
        println!("  Token Budget: {}", config.chat.token_budget);
        println!();

        println!("Models:");
        println!("  Chat: {}", config.models.chat);
        println!("  Vision: {}", config.models.vision);
        println!("  Function: {}", config.models.function);
        println!("  Thread: {}", config.models.thread);
        println!("  Speech: {}", config.models.speech);
        println!("  Transcription: {}", config.models.transcription);
        println!();

        println!("Speech:");
        println!("  Voice: {:?}", config.speech.voice);
        println!("  Format: {}", config.speech.format.extension());
        println!();

        println!("Transcription:");
        println!("  Language: {}", config.transcription.language);

        Ok(())
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{head}...")
    }
}
