//! A small async client for the Ollama REST API.
//!
//! [`OllamaClient`] issues JSON requests against a configurable base URL and
//! bounds every call with a deadline that covers the wait for response headers.
//!
//! ```no_run
//! use ollama_api_client::types::generate::GenerateRequest;
//! use ollama_api_client::OllamaClient;
//!
//! # async fn run() -> ollama_api_client::Result<()> {
//! let client = OllamaClient::builder().build()?;
//! let response = client.generate(GenerateRequest::new("llama2", "Hello")).await?;
//! println!("{}", response.response);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use self::transport::Transport;

pub mod builder;
pub mod client;
pub mod config;
pub mod stream;
pub mod transport;
pub mod types;

pub use config::ClientConfig;

/// Handle to an Ollama server.
///
/// Cloning is cheap; clones share the same transport and configuration, so a
/// single instance can be handed to every request handler of an application.
#[derive(Clone)]
pub struct OllamaClient {
    transport: Arc<dyn Transport + Send + Sync>,
    base_url: String,
    timeout: Duration,
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Client error: {0}")]
    Client(String),

    #[error("Ollama API error: {status} {status_text}")]
    Api { status: u16, status_text: String },

    #[error("Ollama API request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// HTTP status code carried by an [`Error::Api`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
