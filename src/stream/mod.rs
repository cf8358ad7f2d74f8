//! Incremental consumption of streamed generate responses.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};

use crate::types::generate::{GenerateRequest, GenerateResponse, GenerateStreamEvent};
use crate::types::ByteStream;
use crate::{Error, OllamaClient, Result};

mod parser;

pub use parser::{NdjsonParser, StreamEventExt};

/// A stream of [`GenerateStreamEvent`]s for streaming text generation.
pub struct GenerateStream {
    inner: Pin<Box<dyn Stream<Item = Result<GenerateStreamEvent>> + Send>>,
}

impl GenerateStream {
    pub(crate) fn new(body: ByteStream) -> Self {
        let parser = NdjsonParser::<_, GenerateResponse, GenerateStreamEvent>::new(body);
        Self {
            inner: parser.boxed(),
        }
    }
}

impl Stream for GenerateStream {
    type Item = Result<GenerateStreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

/// Streams a generation and awaits `on_chunk` for every chunk, in order.
///
/// Suited to forwarding chunks to a caller as they arrive, e.g. as
/// server-sent events from an HTTP handler.
///
/// # Errors
///
/// Fails like [`OllamaClient::generate_stream`]; a server error line or an
/// undecodable line ends the stream with [`Error::Protocol`].
pub async fn stream_generation<F, Fut>(
    client: &OllamaClient,
    request: GenerateRequest,
    mut on_chunk: F,
) -> Result<()>
where
    F: FnMut(GenerateResponse) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut stream = client.generate_stream(request).await?;

    while let Some(event) = stream.next().await {
        match event? {
            GenerateStreamEvent::MessageChunk(chunk) => on_chunk(chunk).await,
            GenerateStreamEvent::Error(error) => return Err(Error::Protocol(error)),
            GenerateStreamEvent::Partial { partial, error } => {
                return Err(Error::Protocol(format!(
                    "undecodable chunk {:?}: {}",
                    partial,
                    error.unwrap_or_else(|| "truncated stream".to_string())
                )));
            }
        }
    }

    Ok(())
}
