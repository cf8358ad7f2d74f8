//! Newline-delimited JSON parser for streamed responses.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::Stream;
use serde::de::DeserializeOwned;

use crate::types::generate::{GenerateResponse, GenerateStreamEvent};
use crate::types::OllamaError;
use crate::Result;

/// Small conversion trait so endpoint-specific event enums can be constructed
/// from a successful message `M`, an error string, or a partial payload.
pub trait StreamEventExt<M>: Sized {
    fn from_message(msg: M) -> Self;

    fn from_error(err: String) -> Self;

    fn partial(partial: String, error: Option<String>) -> Self;
}

impl StreamEventExt<GenerateResponse> for GenerateStreamEvent {
    fn from_message(msg: GenerateResponse) -> Self {
        GenerateStreamEvent::MessageChunk(msg)
    }

    fn from_error(err: String) -> Self {
        GenerateStreamEvent::Error(err)
    }

    fn partial(partial: String, error: Option<String>) -> Self {
        GenerateStreamEvent::Partial { partial, error }
    }
}

/// Turns a byte stream into one event per non-blank line.
///
/// - `S` is the underlying stream that yields `Result<Bytes>`
/// - `M` is the message struct expected on each line
/// - `E` is the event enum handed to the caller
pub struct NdjsonParser<S, M, E>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
    M: DeserializeOwned,
    E: StreamEventExt<M>,
{
    inner: S,
    buffer: Vec<u8>,
    finished: bool,
    _marker: PhantomData<(M, E)>,
}

impl<S, M, E> NdjsonParser<S, M, E>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
    M: DeserializeOwned,
    E: StreamEventExt<M>,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            finished: false,
            _marker: PhantomData,
        }
    }

    /// Pops the next complete line off the buffer and decodes it.
    /// Returns `None` when no full non-blank line is buffered yet.
    fn next_line(&mut self) -> Option<E> {
        loop {
            let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
            let line_bytes = self.buffer.drain(..=newline_pos).collect::<Vec<u8>>();

            if let Some(event) = decode_bytes::<M, E>(&line_bytes) {
                return Some(event);
            }
        }
    }
}

/// Decodes one raw line; `None` for a blank line. Invalid UTF-8 is reported
/// as a partial event rather than decoded.
fn decode_bytes<M, E>(bytes: &[u8]) -> Option<E>
where
    M: DeserializeOwned,
    E: StreamEventExt<M>,
{
    match std::str::from_utf8(bytes) {
        Ok(line) => {
            let line = line.trim();
            if line.is_empty() {
                None
            } else {
                Some(decode_line::<M, E>(line))
            }
        }
        Err(e) => Some(E::partial(
            String::from_utf8_lossy(bytes).trim().to_string(),
            Some(e.to_string()),
        )),
    }
}

/// Server error objects are checked first: message types with all-default
/// fields would otherwise accept `{"error": ..}` as an empty message.
fn decode_line<M, E>(line: &str) -> E
where
    M: DeserializeOwned,
    E: StreamEventExt<M>,
{
    if let Ok(err) = serde_json::from_str::<OllamaError>(line) {
        return E::from_error(err.error);
    }

    match serde_json::from_str::<M>(line) {
        Ok(msg) => E::from_message(msg),
        Err(e) => E::partial(line.to_string(), Some(e.to_string())),
    }
}

impl<S, M, E> Stream for NdjsonParser<S, M, E>
where
    S: Stream<Item = Result<Bytes>> + Send + Unpin,
    M: DeserializeOwned + Unpin,
    E: StreamEventExt<M> + Unpin,
{
    type Item = Result<E>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(event) = this.next_line() {
                return Poll::Ready(Some(Ok(event)));
            }

            if this.finished {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => this.buffer.extend_from_slice(&bytes),
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    this.finished = true;
                    // last line without a trailing newline
                    let rest = std::mem::take(&mut this.buffer);
                    return Poll::Ready(decode_bytes::<M, E>(&rest).map(Ok));
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::stream::{self, StreamExt};

    use super::*;

    type GenerateParser =
        NdjsonParser<stream::Iter<std::vec::IntoIter<Result<Bytes>>>, GenerateResponse, GenerateStreamEvent>;

    fn parser(chunks: &[&'static str]) -> GenerateParser {
        let chunks: Vec<Result<Bytes>> = chunks
            .iter()
            .map(|&c| Ok(Bytes::from_static(c.as_bytes())))
            .collect();
        NdjsonParser::new(stream::iter(chunks))
    }

    #[tokio::test]
    async fn lines_split_across_chunks_are_reassembled() {
        let events: Vec<_> = parser(&[
            "{\"response\":\"Hel",
            "lo\",\"done\":false}\n{\"response\":\" world\",",
            "\"done\":true}\n",
        ])
        .collect()
        .await;

        assert_eq!(events.len(), 2);
        match events[0].as_ref().unwrap() {
            GenerateStreamEvent::MessageChunk(chunk) => assert_eq!(chunk.response, "Hello"),
            other => panic!("unexpected event {:?}", other),
        }
        match events[1].as_ref().unwrap() {
            GenerateStreamEvent::MessageChunk(chunk) => {
                assert_eq!(chunk.response, " world");
                assert!(chunk.done);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn server_errors_and_garbage_become_events() {
        let events: Vec<_> = parser(&["\n{\"error\":\"model not found\"}\n", "not json\n"])
            .collect()
            .await;

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0].as_ref().unwrap(),
            &GenerateStreamEvent::Error("model not found".to_string())
        );
        match events[1].as_ref().unwrap() {
            GenerateStreamEvent::Partial { partial, error } => {
                assert_eq!(partial, "not json");
                assert!(error.is_some());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn invalid_utf8_lines_are_partial() {
        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::from_static(b"{\"response\":\"a\xffb\"}\n")),
            Ok(Bytes::from_static(b"{\"response\":\"ok\"}\n")),
        ];
        let events: Vec<_> = GenerateParser::new(stream::iter(chunks)).collect().await;

        assert_eq!(events.len(), 2);
        match events[0].as_ref().unwrap() {
            GenerateStreamEvent::Partial { partial, error } => {
                assert!(partial.contains('\u{FFFD}'));
                assert!(error.as_deref().unwrap().contains("utf-8"));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(matches!(
            events[1].as_ref().unwrap(),
            GenerateStreamEvent::MessageChunk(chunk) if chunk.response == "ok"
        ));
    }

    #[tokio::test]
    async fn final_line_without_newline_is_decoded() {
        let events: Vec<_> = parser(&["{\"response\":\"tail\",\"done\":true}"])
            .collect()
            .await;

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].as_ref().unwrap(),
            GenerateStreamEvent::MessageChunk(chunk) if chunk.response == "tail"
        ));
    }
}
