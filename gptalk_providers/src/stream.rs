//! Server-sent-event decoding for streamed chat completions.

use async_stream::try_stream;
use eventsource_stream::Eventsource;
use futures_util::{Stream, StreamExt};
use gptalk_core::ClientError;
use reqwest::Response;
use tracing::warn;

use crate::wire::StreamChunk;

#[derive(Debug, PartialEq, Eq)]
enum StreamEvent {
    Fragment(String),
    Stop,
    Skip,
}

fn parse_event(data: &str) -> Result<StreamEvent, ClientError> {
    let data = data.trim();
    if data.is_empty() {
        return Ok(StreamEvent::Skip);
    }
    if data == "[DONE]" {
        return Ok(StreamEvent::Stop);
    }

    let chunk: StreamChunk = serde_json::from_str(data)
        .map_err(|e| ClientError::transport(anyhow::anyhow!("malformed stream event: {e}")))?;
    let choice = chunk.choices.into_iter().next().ok_or_else(|| {
        ClientError::transport(anyhow::anyhow!("stream event without choices"))
    })?;

    if choice.finish_reason.as_deref() == Some("stop") {
        return Ok(StreamEvent::Stop);
    }

    Ok(choice
        .delta
        .content
        .filter(|text| !text.is_empty())
        .map_or(StreamEvent::Skip, StreamEvent::Fragment))
}

/// Lazily decode text fragments from an SSE completion response.
///
/// Ends at the first `stop` finish reason or `[DONE]`. A malformed event, or
/// a body that closes before either, is yielded as an error and ends the
/// stream.
pub fn fragment_stream(
    response: Response,
) -> impl Stream<Item = Result<String, ClientError>> + Send {
    try_stream! {
        let mut events = Box::pin(response.bytes_stream().eventsource());
        let mut stopped = false;

        while let Some(event) = events.next().await {
            let event = event.map_err(ClientError::transport)?;
            match parse_event(&event.data)? {
                StreamEvent::Fragment(text) => yield text,
                StreamEvent::Stop => {
                    stopped = true;
                    break;
                }
                StreamEvent::Skip => {}
            }
        }

        if !stopped {
            warn!("Completion stream closed before a stop signal");
            Err::<(), _>(ClientError::transport(anyhow::anyhow!(
                "stream ended before stop signal"
            )))?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gptalk_core::FailureKind;

    #[test]
    fn parses_delta_content() {
        let event =
            parse_event(r#"{"choices":[{"delta":{"content":"Hel"},"finish_reason":null}]}"#)
                .unwrap();
        assert_eq!(event, StreamEvent::Fragment("Hel".to_string()));
    }

    #[test]
    fn stop_reason_and_done_end_the_stream() {
        let stop = parse_event(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#).unwrap();
        assert_eq!(stop, StreamEvent::Stop);
        assert_eq!(parse_event("[DONE]").unwrap(), StreamEvent::Stop);
    }

    #[test]
    fn role_only_delta_is_skipped() {
        let event =
            parse_event(r#"{"choices":[{"delta":{"role":"assistant"},"finish_reason":null}]}"#)
                .unwrap();
        assert_eq!(event, StreamEvent::Skip);
    }

    #[test]
    fn event_without_choices_is_an_error() {
        let err = parse_event(r#"{"choices":[]}"#).unwrap_err();
        assert_eq!(err.kind(), FailureKind::TransportError);

        let err = parse_event("{not json").unwrap_err();
        assert_eq!(err.kind(), FailureKind::TransportError);
    }
}
