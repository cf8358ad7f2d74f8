use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use reqwest::StatusCode;

use crate::transport::Transport;
use crate::types::{HttpRequest, HttpResponse};
use crate::Result;

/// A canned reply queued on a [`MockTransport`].
#[derive(Debug, Clone)]
struct MockResponse {
    status: u16,
    status_text: String,
    chunks: Vec<Bytes>,
}

/// A mock implementation of the [`Transport`] trait for testing purposes.
///
/// Responses are queued up front and handed out in order, one per request.
/// Every request is recorded so tests can assert on the URL, verb and body
/// the client produced.
#[derive(Clone, Default)]
pub struct MockTransport {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
    /// Holds back the response headers this long.
    delay: Option<Duration>,
}

impl MockTransport {
    /// Creates a new, empty [`MockTransport`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with a JSON body.
    pub fn with_json_response(self, status: u16, body: serde_json::Value) -> Self {
        self.with_response(status, body.to_string())
    }

    /// Queues a response with a raw body and the canonical reason phrase for `status`.
    pub fn with_response(self, status: u16, body: impl Into<Bytes>) -> Self {
        let status_text = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default();
        self.with_status_text(status, status_text, body)
    }

    /// Queues a response with a custom reason phrase, e.g. `"Model Exploded"`.
    pub fn with_status_text(
        self,
        status: u16,
        status_text: impl Into<String>,
        body: impl Into<Bytes>,
    ) -> Self {
        self.push(MockResponse {
            status,
            status_text: status_text.into(),
            chunks: vec![body.into()],
        })
    }

    /// Queues a `200 OK` whose body arrives as the given chunks, e.g. to
    /// exercise newline-delimited streaming across chunk boundaries.
    pub fn with_stream_chunks(self, chunks: Vec<Bytes>) -> Self {
        self.push(MockResponse {
            status: 200,
            status_text: "OK".to_string(),
            chunks,
        })
    }

    /// Delays every response by `delay` before its headers are "received".
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Returns every request sent through this transport so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }
}

#[async_trait]
impl Transport for MockTransport {
    /// Records the request and replies with the next queued response.
    ///
    /// Once the queue is exhausted an empty `200 OK` is returned.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse {
                status: 200,
                status_text: "OK".to_string(),
                chunks: Vec::new(),
            });

        Ok(HttpResponse {
            status: response.status,
            status_text: response.status_text,
            body: stream::iter(response.chunks).map(Ok).boxed(),
        })
    }
}
