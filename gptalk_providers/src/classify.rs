//! Maps transport and service outcomes onto the [`ClientError`] taxonomy.
//!
//! Only HTTP 200 counts as success. Any other status is a rejection carrying
//! the raw body; a failed send or body read is a transport error; a 200 whose
//! body cannot be decoded is an empty response.

use gptalk_core::ClientError;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::warn;

/// Send a request once.
pub async fn send(request: RequestBuilder) -> Result<Response, ClientError> {
    request.send().await.map_err(ClientError::transport)
}

/// Pass a 200 response through; turn anything else into a rejection.
pub async fn ensure_ok(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }

    let payload = response.text().await.unwrap_or_else(|e| {
        warn!("Failed to read body of rejected response ({status}): {e}");
        String::new()
    });
    Err(ClientError::ServiceRejected {
        status: status.as_u16(),
        payload,
    })
}

/// Classify a fully received response body.
pub fn classify_json<T: DeserializeOwned>(
    status: StatusCode,
    body: &[u8],
) -> Result<T, ClientError> {
    if status != StatusCode::OK {
        return Err(ClientError::ServiceRejected {
            status: status.as_u16(),
            payload: String::from_utf8_lossy(body).into_owned(),
        });
    }

    serde_json::from_slice(body).map_err(|e| {
        warn!("Undecodable success body: {e}");
        ClientError::EmptyResponse
    })
}

/// Read and classify a JSON response.
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await.map_err(ClientError::transport)?;
    classify_json(status, &body)
}
