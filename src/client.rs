use std::time::Duration;

#[cfg(feature = "metrics")]
use metrics::counter;
use serde::de::DeserializeOwned;
#[cfg(feature = "tracing")]
use tracing::{debug, instrument};

use crate::builder::OllamaClientBuilder;
use crate::config::ClientConfig;
use crate::stream::GenerateStream;
use crate::types::generate::{GenerateRequest, GenerateResponse};
use crate::types::{HttpRequest, HttpResponse, ListModelsResponse, PullRequest, PullResponse};
use crate::OllamaClient;
use crate::{Error, Result};

impl OllamaClient {
    pub fn builder() -> OllamaClientBuilder {
        OllamaClientBuilder::new()
    }

    /// Creates a client with the default `reqwest` transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Creates a client from `OLLAMA_BASE_URL` and `OLLAMA_TIMEOUT_MS`.
    ///
    /// Meant for request handlers that build their client on the spot rather
    /// than receiving a shared one.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Base URL with trailing slashes removed.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Generates a completion for `request`, sent as the whole request body.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(model = %request.model)))]
    pub async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        #[cfg(feature = "metrics")]
        counter!("ollama_client.requests_total", "endpoint" => "generate").increment(1);

        let request = HttpRequest::new("/generate").post().body(request)?;
        self.dispatch(request).await
    }

    /// Generates a completion and yields it chunk by chunk.
    ///
    /// `stream` is forced to `true`. The deadline covers the wait for response
    /// headers only; the returned stream is not bounded by it.
    #[cfg_attr(feature = "tracing", instrument(skip(self, request), fields(model = %request.model)))]
    pub async fn generate_stream(&self, mut request: GenerateRequest) -> Result<GenerateStream> {
        #[cfg(feature = "metrics")]
        counter!("ollama_client.requests_total", "endpoint" => "generate_stream").increment(1);

        request.stream = Some(true);
        request.extra.remove("stream");
        let request = HttpRequest::new("/generate").post().body(request)?;
        let response = self.send(request).await?;

        Ok(GenerateStream::new(response.body))
    }

    /// Lists the models available on the server.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn list_models(&self) -> Result<ListModelsResponse> {
        #[cfg(feature = "metrics")]
        counter!("ollama_client.requests_total", "endpoint" => "tags").increment(1);

        self.dispatch(HttpRequest::new("/tags").get()).await
    }

    /// Asks the server to pull `name` from the registry.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub async fn pull_model(&self, name: &str) -> Result<PullResponse> {
        #[cfg(feature = "metrics")]
        counter!("ollama_client.requests_total", "endpoint" => "pull").increment(1);

        let request = HttpRequest::new("/pull").post().body(PullRequest { name })?;
        self.dispatch(request).await
    }

    /// Sends `request` to `base_url + request.url` and decodes the JSON reply.
    ///
    /// The body is decoded into `T` without further checks.
    ///
    /// # Errors
    ///
    /// - [`Error::Timeout`] if the response headers did not arrive within the
    ///   configured timeout.
    /// - [`Error::Api`] if the status is outside `200..300`.
    /// - [`Error::Transport`] or [`Error::JsonParse`] for anything else, as
    ///   reported by the transport or decoder.
    pub async fn dispatch<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Issues the request under the deadline and checks the status.
    ///
    /// The timer is dropped as soon as headers arrive or the transport fails.
    async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse> {
        request.url = format!("{}{}", self.base_url, request.url);

        #[cfg(feature = "tracing")]
        debug!(verb = %request.verb, url = %request.url, "dispatching request");

        let response =
            match tokio::time::timeout(self.timeout, self.transport.send_http_request(request))
                .await
            {
                Ok(result) => result?,
                Err(_elapsed) => {
                    #[cfg(feature = "metrics")]
                    counter!("ollama_client.request_timeouts_total").increment(1);

                    return Err(Error::Timeout {
                        timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    });
                }
            };

        #[cfg(feature = "tracing")]
        debug!(status = response.status, "received response headers");

        if !response.is_success() {
            return Err(Error::Api {
                status: response.status,
                status_text: response.status_text,
            });
        }

        Ok(response)
    }
}
