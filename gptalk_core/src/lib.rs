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

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;
use serde::{Deserialize, Serialize};

pub mod assembler;
pub mod error;
pub mod history;
pub mod message;
pub mod tokens;
pub mod util;

pub use assembler::{AssembledRequest, MessageAssembler};
pub use error::{ClientError, FailureKind, HistoryError};
pub use history::{ConversationHistory, HistoryStats};
pub use message::{
    CompletionRequest, ContentPart, FunctionCall, FunctionDefinition, ImageDetail, ImageUrl,
    MessageContent, RequestMessage, ResponseMessage, ToolCall, ToolChoice, ToolDefinition,
};
pub use tokens::{Cl100kCounter, TokenBudgetEstimator, TokenCounter};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// One message of a conversation, tagged by role.
///
/// Turns are immutable once built; the fields are only reachable through
/// accessors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Lazily produced assistant text fragments of a streamed completion.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ClientError>> + Send>>;

/// A remote chat-completion backend.
///
/// Implementations send exactly one request per call and never retry;
/// failures are reported with the [`ClientError`] taxonomy.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Create a chat completion and return `choices[0].message`.
    async fn complete(&self, request: CompletionRequest) -> Result<ResponseMessage, ClientError>;

    /// Create a streamed chat completion.
    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<FragmentStream, ClientError>;
}

#[async_trait]
impl<P> LLMProvider for std::sync::Arc<P>
where
    P: LLMProvider + ?Sized,
{
    async fn complete(&self, request: CompletionRequest) -> Result<ResponseMessage, ClientError> {
        (**self).complete(request).await
    }

    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<FragmentStream, ClientError> {
        (**self).complete_stream(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        assert_eq!(Role::System.as_str(), "system");
    }

    #[test]
    fn turn_round_trips_through_json() {
        let turn = Turn::user("hello");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hello"}));

        let back: Turn = serde_json::from_value(json).unwrap();
        assert_eq!(back, turn);
    }
}
