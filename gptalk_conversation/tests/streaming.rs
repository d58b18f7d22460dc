use std::sync::Arc;

use futures_util::StreamExt;
use gptalk_conversation::{ConversationConfig, ConversationManager};
use gptalk_core::{ClientError, FailureKind, TokenBudgetEstimator, Turn};
use gptalk_providers::OpenAIProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn manager_with_sse(
    sse_body: &'static str,
) -> (MockServer, ConversationManager<OpenAIProvider>) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(sse_body),
        )
        .mount(&server)
        .await;

    let provider = OpenAIProvider::new("test-key".to_string()).with_base_url(server.uri());
    let estimator = TokenBudgetEstimator::new(Arc::new(|text: &str| text.chars().count()));
    let manager =
        ConversationManager::with_estimator(provider, ConversationConfig::default(), estimator);
    (server, manager)
}

#[tokio::test]
async fn truncated_stream_is_not_recorded() {
    let (_server, manager) = manager_with_sse(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"finish_reason\":null}]}\n\n",
    )
    .await;

    let items: Vec<Result<String, ClientError>> =
        manager.send_message_stream("hi").await.unwrap().collect().await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_deref().unwrap(), "Hel");
    assert_eq!(
        items[1].as_ref().unwrap_err().kind(),
        FailureKind::TransportError
    );
    assert!(manager.history().is_empty());
}

#[tokio::test]
async fn stopped_stream_is_recorded() {
    let (_server, manager) = manager_with_sse(concat!(
        "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"},\"finish_reason\":null}]}\n\n",
        "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    ))
    .await;

    let fragments: Vec<String> = manager
        .send_message_stream("hi")
        .await
        .unwrap()
        .map(Result::unwrap)
        .collect()
        .await;

    assert_eq!(fragments, vec!["Hel", "lo"]);
    assert_eq!(manager.history(), vec![Turn::user("hi"), Turn::assistant("Hello")]);
}
