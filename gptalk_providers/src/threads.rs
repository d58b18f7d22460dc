//! Assistant thread runs.
//!
//! Threads live on the server and are independent of any local
//! conversation history.

use gptalk_core::util::THREAD_RUN_TEMPERATURE;
use gptalk_core::{ClientError, Role};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use tracing::{debug, info};

use crate::OpenAIProvider;
use crate::classify::{read_json, send};
use crate::wire::{
    CreateThreadAndRunBody, DeletedThread, MessageList, RunResponse, ThreadBody, ThreadMessage,
    ThreadMessageBody,
};

const ASSISTANTS_BETA: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Result of a thread run. `message` is empty when the assistant has not
/// written anything; the thread id is always returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadReply {
    pub message: String,
    pub thread_id: String,
}

/// One content part of a thread message.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ThreadMessageContent {
    Text { text: TextValue },
    ImageFile { image_file: ImageFile },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextValue {
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageFile {
    pub file_id: String,
}

impl ThreadMessageContent {
    /// The text, or the file id of an image part.
    #[must_use]
    pub fn into_payload(self) -> String {
        match self {
            Self::Text { text } => text.value,
            Self::ImageFile { image_file } => image_file.file_id,
            Self::Unsupported => String::new(),
        }
    }
}

/// Last assistant-authored message in `messages`, as a payload string.
fn last_assistant_payload(messages: Vec<ThreadMessage>) -> Option<String> {
    messages
        .into_iter()
        .rev()
        .find(|m| m.role == Role::Assistant)
        .and_then(|m| m.content.into_iter().next())
        .map(ThreadMessageContent::into_payload)
}

impl OpenAIProvider {
    fn assistants(&self, method: Method, path: &str) -> RequestBuilder {
        self.request(method, path)
            .header(ASSISTANTS_BETA.0, ASSISTANTS_BETA.1)
    }

    /// Start a new thread with one user message, run `assistant_id` on it and
    /// return the assistant's reply.
    pub async fn create_thread(
        &self,
        text: &str,
        assistant_id: &str,
    ) -> Result<ThreadReply, ClientError> {
        info!("Creating thread run: assistant={assistant_id}");

        let body = CreateThreadAndRunBody {
            assistant_id,
            thread: ThreadBody {
                messages: vec![ThreadMessageBody {
                    role: Role::User,
                    content: text,
                }],
            },
            model: &self.thread_model,
            temperature: THREAD_RUN_TEMPERATURE,
            stream: false,
        };
        let run: RunResponse =
            read_json(send(self.assistants(Method::POST, "/threads/runs").json(&body)).await?)
                .await?;

        let path = format!("/threads/{}/messages", run.thread_id);
        let list: MessageList = read_json(send(self.assistants(Method::GET, &path)).await?).await?;
        debug!(
            "Thread {} holds {} messages",
            run.thread_id,
            list.data.len()
        );

        Ok(ThreadReply {
            message: last_assistant_payload(list.data).unwrap_or_default(),
            thread_id: run.thread_id,
        })
    }

    /// Delete a server-side thread. Returns the service's `deleted` flag.
    pub async fn delete_thread(&self, thread_id: &str) -> Result<bool, ClientError> {
        info!("Deleting thread {thread_id}");
        let path = format!("/threads/{thread_id}");
        let deleted: DeletedThread =
            read_json(send(self.assistants(Method::DELETE, &path)).await?).await?;
        Ok(deleted.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(value: serde_json::Value) -> Vec<ThreadMessage> {
        serde_json::from_value::<MessageList>(value).unwrap().data
    }

    #[test]
    fn picks_last_assistant_message() {
        let data = messages(json!({"data": [
            {"role": "assistant", "content": [{"type": "text", "text": {"value": "first"}}]},
            {"role": "user", "content": [{"type": "text", "text": {"value": "question"}}]},
            {"role": "assistant", "content": [{"type": "text", "text": {"value": "second"}}]},
            {"role": "user", "content": [{"type": "text", "text": {"value": "again"}}]}
        ]}));

        assert_eq!(last_assistant_payload(data).as_deref(), Some("second"));
    }

    #[test]
    fn image_file_resolves_to_file_id() {
        let data = messages(json!({"data": [
            {"role": "assistant", "content": [{"type": "image_file", "image_file": {"file_id": "file-123"}}]}
        ]}));

        assert_eq!(last_assistant_payload(data).as_deref(), Some("file-123"));
    }

    #[test]
    fn only_user_messages_yield_nothing() {
        let data = messages(json!({"data": [
            {"role": "user", "content": [{"type": "text", "text": {"value": "hello"}}]}
        ]}));

        assert_eq!(last_assistant_payload(data), None);
    }

    #[test]
    fn unknown_content_type_is_unsupported() {
        let content: ThreadMessageContent =
            serde_json::from_value(json!({"type": "refusal", "refusal": "no"})).unwrap();

        assert_eq!(content, ThreadMessageContent::Unsupported);
        assert_eq!(content.into_payload(), "");
    }
}
