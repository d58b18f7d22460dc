use async_trait::async_trait;
use gptalk_core::util::DEFAULT_BASE_URL;
use gptalk_core::{ClientError, CompletionRequest, FragmentStream, LLMProvider, ResponseMessage};
use reqwest::{Client, Method, RequestBuilder, header};
use tracing::{debug, info};

use crate::classify::{ensure_ok, read_json, send};
use crate::stream::fragment_stream;
use crate::wire::{ChatCompletionBody, ChatCompletionResponse};

/// Client for the OpenAI HTTP API.
///
/// Holds only immutable configuration, so one instance can be shared
/// between tasks.
pub struct OpenAIProvider {
    pub(crate) client: Client,
    api_key: String,
    pub(crate) base_url: String,
    pub(crate) thread_model: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        info!("Creating OpenAIProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            thread_model: "gpt-4-turbo".to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, TLS roots).
    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Model used when creating assistant thread runs.
    #[must_use]
    pub fn with_thread_model(mut self, model: String) -> Self {
        self.thread_model = model;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authorized request against `{base_url}{path}`.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<ResponseMessage, ClientError> {
        info!(
            "Sending chat completion: model={}, messages={}, tools={}",
            request.model,
            request.messages.len(),
            request.tools.len()
        );

        let body = ChatCompletionBody::new(&request, false);
        let response = send(self.request(Method::POST, "/chat/completions").json(&body)).await?;
        let completion: ChatCompletionResponse = read_json(response).await?;

        let message = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or(ClientError::EmptyResponse)?;

        debug!(
            "Received chat completion: tool_calls={}",
            message.tool_calls.len()
        );
        Ok(message)
    }

    async fn complete_stream(
        &self,
        request: CompletionRequest,
    ) -> Result<FragmentStream, ClientError> {
        info!(
            "Opening chat completion stream: model={}, messages={}",
            request.model,
            request.messages.len()
        );

        let body = ChatCompletionBody::new(&request, true);
        let response = send(
            self.request(Method::POST, "/chat/completions")
                .header(header::ACCEPT, "text/event-stream")
                .json(&body),
        )
        .await?;
        let response = ensure_ok(response).await?;

        Ok(Box::pin(fragment_stream(response)))
    }
}
