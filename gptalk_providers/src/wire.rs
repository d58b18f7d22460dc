//! Request and response bodies of the OpenAI endpoints.

use gptalk_core::{
    CompletionRequest, RequestMessage, ResponseMessage, Role, ToolChoice, ToolDefinition,
};
use serde::{Deserialize, Serialize};

use crate::audio::{SpeechFormat, SpeechVoice};
use crate::threads::ThreadMessageContent;

#[derive(Debug, Serialize)]
pub struct ChatCompletionBody<'a> {
    pub model: &'a str,
    pub temperature: f64,
    pub messages: &'a [RequestMessage],
    #[serde(skip_serializing_if = "is_empty_slice")]
    pub tools: &'a [ToolDefinition],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<&'a ToolChoice>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
}

impl<'a> ChatCompletionBody<'a> {
    pub fn new(request: &'a CompletionRequest, stream: bool) -> Self {
        Self {
            model: &request.model,
            temperature: request.temperature,
            messages: &request.messages,
            tools: &request.tools,
            tool_choice: request.tool_choice.as_ref(),
            stream,
        }
    }
}

fn is_empty_slice<T>(items: &&[T]) -> bool {
    items.is_empty()
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateThreadAndRunBody<'a> {
    pub assistant_id: &'a str,
    pub thread: ThreadBody<'a>,
    pub model: &'a str,
    pub temperature: f64,
    pub stream: bool,
}

#[derive(Debug, Serialize)]
pub struct ThreadBody<'a> {
    pub messages: Vec<ThreadMessageBody<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ThreadMessageBody<'a> {
    pub role: Role,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct RunResponse {
    pub thread_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageList {
    #[serde(default)]
    pub data: Vec<ThreadMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ThreadMessage {
    pub role: Role,
    #[serde(default)]
    pub content: Vec<ThreadMessageContent>,
}

#[derive(Debug, Deserialize)]
pub struct DeletedThread {
    pub deleted: bool,
}

#[derive(Debug, Serialize)]
pub struct SpeechBody<'a> {
    pub model: &'a str,
    pub input: &'a str,
    pub voice: SpeechVoice,
    pub response_format: SpeechFormat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_chat_body_omits_tools_and_stream() {
        let request = CompletionRequest::new(
            "gpt-4-turbo",
            0.5,
            vec![RequestMessage::from(&gptalk_core::Turn::user("hi"))],
        );

        let body = serde_json::to_value(ChatCompletionBody::new(&request, false)).unwrap();

        assert_eq!(
            body,
            json!({
                "model": "gpt-4-turbo",
                "temperature": 0.5,
                "messages": [{"role": "user", "content": "hi"}]
            })
        );
    }

    #[test]
    fn streaming_tool_body_carries_everything() {
        let request = CompletionRequest::new("gpt-4", 0.5, Vec::new()).with_tools(
            vec![ToolDefinition::function("ping", "Ping a host", json!({"type": "object"}))],
            ToolChoice::Auto,
        );

        let body = serde_json::to_value(ChatCompletionBody::new(&request, true)).unwrap();

        assert_eq!(body["stream"], true);
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["tools"][0]["function"]["name"], "ping");
    }
}
