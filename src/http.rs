// file: src/http.rs
// description: shared JSON-over-HTTP helper for hosted model APIs
// reference: https://docs.rs/reqwest

use crate::error::{BackendError, BackendResult};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Sends a prepared request and decodes a successful JSON body.
///
/// Non-success statuses are returned with the response body so callers can
/// tell throttling (429) and server errors apart from rejected input.
pub(crate) async fn send_json<T: DeserializeOwned>(
    service: &str,
    request: RequestBuilder,
) -> BackendResult<T> {
    let response = request
        .send()
        .await
        .map_err(|e| BackendError::transport(service, e))?;

    let status = response.status();
    debug!("{} responded with status {}", service, status);

    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(BackendError::Status {
            service: service.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| BackendError::decode(service, e))
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(
            join_url("https://api.groq.com/openai/v1/", "/embeddings"),
            "https://api.groq.com/openai/v1/embeddings"
        );
        assert_eq!(join_url("http://host", "chat"), "http://host/chat");
    }
}
