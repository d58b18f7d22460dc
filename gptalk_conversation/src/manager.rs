//! Conversation manager for multi-turn dialogue.
//!
//! The `ConversationManager` owns one conversation's history and is the only
//! writer to it.
//!
//! # Concurrency
//!
//! Chat, vision, tool-call and streamed exchanges hold an exclusive exchange
//! lock from request assembly until the history append. Callers sharing one
//! manager between tasks are therefore queued, never interleaved; callers
//! that need a different ordering must serialize exchanges themselves.
//! History snapshots, replacement and clearing do not wait for the exchange
//! lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use gptalk_core::util::{
    DEFAULT_FUNCTION_SYSTEM_PROMPT, DEFAULT_SYSTEM_PROMPT, DEFAULT_TEMPERATURE,
    DEFAULT_TOKEN_BUDGET,
};
use gptalk_core::{
    AssembledRequest, ClientError, CompletionRequest, ContentPart, ConversationHistory,
    FragmentStream, HistoryError, HistoryStats, ImageDetail, LLMProvider, MessageAssembler,
    MessageContent, ResponseMessage, TokenBudgetEstimator, ToolChoice, ToolDefinition, Turn,
};
use tokio::sync::{Mutex as ExchangeLock, OwnedMutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Configuration for conversation management.
#[derive(Debug, Clone)]
pub struct ConversationConfig {
    /// Identifier used in logs
    pub conversation_id: Uuid,
    /// System prompt for chat and vision requests
    pub system_prompt: String,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum token cost of an assembled request
    pub token_budget: usize,
    pub chat_model: String,
    pub vision_model: String,
    pub function_model: String,
    /// System prompt for tool-call requests
    pub function_system_prompt: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            conversation_id: Uuid::now_v7(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            token_budget: DEFAULT_TOKEN_BUDGET,
            chat_model: "gpt-4-turbo".to_string(),
            vision_model: "gpt-4-turbo".to_string(),
            function_model: "gpt-4".to_string(),
            function_system_prompt: DEFAULT_FUNCTION_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ConversationConfig {
    /// Set the chat model name.
    #[must_use]
    pub fn with_model(mut self, model: String) -> Self {
        self.chat_model = model;
        self
    }

    /// Set the system prompt.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: String) -> Self {
        self.system_prompt = prompt;
        self
    }

    /// Set the token budget.
    #[must_use]
    pub const fn with_token_budget(mut self, budget: usize) -> Self {
        self.token_budget = budget;
        self
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Per-call overrides for a chat exchange.
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f64>,
}

/// Multi-turn conversation manager.
pub struct ConversationManager<P = Arc<dyn LLMProvider>>
where
    P: Send + Sync,
{
    provider: P,
    config: ConversationConfig,
    assembler: MessageAssembler,
    history: Arc<Mutex<ConversationHistory>>,
    exchange: Arc<ExchangeLock<()>>,
}

fn lock(history: &Mutex<ConversationHistory>) -> MutexGuard<'_, ConversationHistory> {
    history.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<P> ConversationManager<P>
where
    P: LLMProvider + Send + Sync,
{
    /// Create a manager with an empty history, counting tokens with
    /// `cl100k_base`.
    pub fn new(provider: P, config: ConversationConfig) -> Self {
        Self::with_estimator(provider, config, TokenBudgetEstimator::default())
    }

    /// Create a manager with a custom tokenizer.
    pub fn with_estimator(
        provider: P,
        config: ConversationConfig,
        estimator: TokenBudgetEstimator,
    ) -> Self {
        info!(
            "Creating conversation manager: {} (budget {} tokens)",
            config.conversation_id, config.token_budget
        );
        let assembler = MessageAssembler::new(estimator, config.token_budget);

        Self {
            provider,
            config,
            assembler,
            history: Arc::new(Mutex::new(ConversationHistory::new())),
            exchange: Arc::new(ExchangeLock::new(())),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &ConversationConfig {
        &self.config
    }

    /// Send `text` with the configured model, prompt and temperature.
    pub async fn send_message(&self, text: &str) -> Result<String, ClientError> {
        self.send_message_with(text, &ChatOptions::default()).await
    }

    /// Send `text` and return the assistant's reply. On success the
    /// user/assistant pair is appended to history.
    pub async fn send_message_with(
        &self,
        text: &str,
        options: &ChatOptions,
    ) -> Result<String, ClientError> {
        let _exchange = self.exchange.lock().await;

        let system = options
            .system_prompt
            .as_deref()
            .unwrap_or(&self.config.system_prompt);
        let assembled = self.assemble(text, system);
        let request = CompletionRequest::new(
            options.model.as_deref().unwrap_or(&self.config.chat_model),
            options.temperature.unwrap_or(self.config.temperature),
            assembled.to_messages(),
        );

        let message = self.provider.complete(request).await?;
        let reply = message.text().ok_or(ClientError::EmptyResponse)?.to_string();

        self.record(text, &reply);
        Ok(reply)
    }

    /// Ask about a base64-encoded JPEG. The image travels only in this
    /// request; history records `text` and the reply.
    pub async fn analyze_image(&self, image_base64: &str, text: &str) -> Result<String, ClientError> {
        let _exchange = self.exchange.lock().await;

        let assembled = self.assemble(text, &self.config.system_prompt);
        let content = MessageContent::Parts(vec![
            ContentPart::jpeg_base64(image_base64, ImageDetail::High),
            ContentPart::text(text),
        ]);
        let request = CompletionRequest::new(
            &self.config.vision_model,
            self.config.temperature,
            assembled.to_messages_with(content),
        );

        let message = self.provider.complete(request).await?;
        let reply = message.text().ok_or(ClientError::EmptyResponse)?.to_string();

        self.record(text, &reply);
        Ok(reply)
    }

    /// Offer `tools` to the model and return its message, which may hold
    /// tool calls instead of text. History grows only when the reply has
    /// text.
    pub async fn call_function(
        &self,
        prompt: &str,
        tools: Vec<ToolDefinition>,
        tool_choice: ToolChoice,
    ) -> Result<ResponseMessage, ClientError> {
        let _exchange = self.exchange.lock().await;

        let assembled = self.assemble(prompt, &self.config.function_system_prompt);
        let request = CompletionRequest::new(
            &self.config.function_model,
            self.config.temperature,
            assembled.to_messages(),
        )
        .with_tools(tools, tool_choice);

        let message = self.provider.complete(request).await?;
        if let Some(reply) = message.text() {
            self.record(prompt, reply);
        }
        Ok(message)
    }

    /// Stream the reply to `text` fragment by fragment.
    ///
    /// The exchange lock is held until the stream is finished or dropped.
    /// History is appended only when the stream runs to completion; an error
    /// item or dropping the stream early leaves it untouched.
    pub async fn send_message_stream(&self, text: &str) -> Result<FragmentStream, ClientError> {
        let exchange = Arc::clone(&self.exchange).lock_owned().await;

        let assembled = self.assemble(text, &self.config.system_prompt);
        let request = CompletionRequest::new(
            &self.config.chat_model,
            self.config.temperature,
            assembled.to_messages(),
        );
        let fragments = self.provider.complete_stream(request).await?;

        Ok(Box::pin(record_on_completion(
            fragments,
            exchange,
            Arc::clone(&self.history),
            text.to_string(),
        )))
    }

    /// Snapshot of the stored history, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<Turn> {
        lock(&self.history).snapshot()
    }

    /// Replace the stored history, e.g. with a previously exported one.
    pub fn replace_history(&self, turns: Vec<Turn>) -> Result<(), HistoryError> {
        lock(&self.history).replace(turns)
    }

    pub fn clear_history(&self) {
        lock(&self.history).clear();
    }

    #[must_use]
    pub fn history_stats(&self) -> HistoryStats {
        lock(&self.history).stats()
    }

    fn assemble(&self, text: &str, system: &str) -> AssembledRequest {
        let snapshot = self.history();
        let assembled = self.assembler.assemble(text, system, &snapshot);
        debug!(
            "Assembled request: {} history turns sent, {} dropped",
            assembled.history.len(),
            assembled.dropped()
        );
        assembled
    }

    fn record(&self, user_text: &str, reply: &str) {
        lock(&self.history).append(user_text, reply);
        debug!("Conversation {} recorded one exchange", self.config.conversation_id);
    }
}

/// Forward `fragments` and append the exchange to `history` once they are
/// exhausted without error.
fn record_on_completion(
    mut fragments: FragmentStream,
    exchange: OwnedMutexGuard<()>,
    history: Arc<Mutex<ConversationHistory>>,
    user_text: String,
) -> impl Stream<Item = Result<String, ClientError>> + Send {
    try_stream! {
        let _exchange = exchange;
        let mut reply = String::new();

        while let Some(fragment) = fragments.next().await {
            let fragment = fragment?;
            reply.push_str(&fragment);
            yield fragment;
        }

        if reply.is_empty() {
            Err::<(), _>(ClientError::EmptyResponse)?;
        }
        lock(&history).append(user_text, reply);
    }
}
