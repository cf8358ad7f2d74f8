use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::ClientConfig;
use crate::transport::{ReqwestTransport, Transport};
use crate::{OllamaClient, Result};

/// A builder for constructing an [`OllamaClient`].
///
/// - Uses `http://localhost:11434/api` unless [`base_url`](Self::base_url) is set.
/// - Bounds each request by 30 seconds unless [`timeout`](Self::timeout) is set.
/// - Uses `reqwest`-based transport by default - [`ReqwestTransport`].
///
/// Unlike [`OllamaClient::from_env`], the builder never consults the environment.
pub struct OllamaClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport + Send + Sync>>,
}

impl OllamaClientBuilder {
    /// Creates a new [`OllamaClientBuilder`]. This method is called by [`OllamaClient::builder`]
    pub(crate) fn new() -> Self {
        OllamaClientBuilder {
            config: ClientConfig::default(),
            transport: None,
        }
    }

    /// Replaces both the base URL and the timeout with the given configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the base URL every request path is appended to.
    ///
    /// Trailing slashes are stripped when the client is built, so request
    /// paths must carry their own leading `/`.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Sets how long a request may wait for response headers.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Convenience for [`timeout`](Self::timeout) in milliseconds.
    pub fn timeout_ms(self, millis: u64) -> Self {
        self.timeout(Duration::from_millis(millis))
    }

    /// Sets a custom transport implementation for the client.
    ///
    /// For testing, you can use [`MockTransport`](crate::transport::MockTransport)
    /// or your own mock [`Transport`] implementations.
    pub fn transport(mut self, transport: Arc<dyn Transport + Send + Sync>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the [`OllamaClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::Client`](crate::Error::Client) if the base URL is not an
    /// absolute URL or if [`ReqwestTransport`] cannot be initialised.
    #[cfg_attr(feature = "tracing", instrument(skip(self)))]
    pub fn build(self) -> Result<OllamaClient> {
        let base_url = self.config.normalized_base_url()?;

        let transport = match self.transport {
            Some(t) => t,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(OllamaClient {
            transport,
            base_url,
            timeout: self.config.timeout,
        })
    }
}
