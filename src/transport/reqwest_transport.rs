#[cfg(feature = "tracing")]
use tracing::instrument;

use async_trait::async_trait;
use futures::StreamExt;
use hyper::ext::ReasonPhrase;
use reqwest::Client;

use crate::transport::Transport;
use crate::types::{HttpRequest, HttpResponse, HttpVerb};
use crate::{Error, Result};

/// A [`Transport`] implementation that uses the `reqwest` crate for making HTTP requests.
///
/// This is the default transport used by [`OllamaClient`](crate::OllamaClient) if no custom transport
/// is provided. The underlying client has no timeout of its own; the deadline
/// is applied by the client around [`Transport::send_http_request`].
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a new `ReqwestTransport`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Client`] if the `reqwest` client cannot be built.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Client(e.to_string()))?;
        Ok(Self { client })
    }

    /// Wraps an already configured `reqwest` client, e.g. one with custom TLS roots.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    /// Sends an HTTP request using `reqwest`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Client`] if the URL does not parse and an
    /// [`Error::Transport`] if the connection fails.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(url = %request.url)))]
    async fn send_http_request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| Error::Client(format!("Invalid request URL: {}", e)))?;

        let mut request_builder = match request.verb {
            HttpVerb::GET => self.client.get(url),
            HttpVerb::POST => self.client.post(url),
        };

        if let Some(body) = request.body {
            request_builder = request_builder.json(&body);
        }

        let response = request_builder.send().await.map_err(Error::Transport)?;
        let status = response.status();
        let status_text = status_text(&response);

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text,
            body: response
                .bytes_stream()
                .map(|item| item.map_err(Error::Transport))
                .boxed(),
        })
    }
}

/// The reason phrase the server sent. hyper only records it when it differs
/// from the canonical phrase for the status code.
fn status_text(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
        .or_else(|| response.status().canonical_reason().map(str::to_string))
        .unwrap_or_default()
}
