//! Client-wide defaults.

/// System prompt used when the caller does not supply one.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You're a helpful assistant";

/// System prompt for tool/function-calling requests.
pub const DEFAULT_FUNCTION_SYSTEM_PROMPT: &str = "Don't make assumptions about what values to plug into functions. Ask for clarification if a user request is ambiguous.";

pub const DEFAULT_TEMPERATURE: f64 = 0.5;

/// Sampling temperature for assistant thread runs.
pub const THREAD_RUN_TEMPERATURE: f64 = 0.2;

/// Maximum token cost of an assembled request.
pub const DEFAULT_TOKEN_BUDGET: usize = 4096;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
