//! SSE parser that converts a chat response body into `StreamEvent`s.

use std::pin::Pin;

use eventsource_stream::{EventStream, Eventsource, EventStreamError};
use futures_util::Stream;
use serde::Deserialize;

use crate::api::error::{ApiError, ApiResult};

/// Decoded unit from the chat stream. Exactly one of content, error, done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental piece of assistant text
    Content(String),
    /// In-band error signaled by the server; terminal for the turn
    Error(String),
    /// Terminal completion marker
    Done,
}

/// Incremental decoder over the `text/event-stream` body of `POST /api/chat`.
///
/// Buffering of partial lines and split UTF-8 across chunk boundaries is
/// handled by `eventsource-stream`. A data payload that fails to parse as
/// JSON is logged and skipped without aborting the stream.
pub struct SseParser<S> {
    inner: EventStream<S>,
}

impl<S> SseParser<S> {
    pub fn new(stream: S) -> Self
    where
        S: Eventsource,
    {
        Self {
            inner: stream.eventsource(),
        }
    }
}

impl<S, E> Stream for SseParser<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = ApiResult<StreamEvent>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => match parse_stream_data(&event.data) {
                    Some(decoded) => return Poll::Ready(Some(Ok(decoded))),
                    // Malformed or empty payload: keep reading.
                    None => {}
                },
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(classify_stream_error(&e))));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Raw JSON payload of one data line. Untagged so that a payload can only be
/// observed as one variant; `error` takes precedence over `content`/`done`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawChunk {
    Error { error: String },
    Content { content: String },
    Done { done: bool },
}

/// Parses one data payload, returning `None` for lines to skip.
fn parse_stream_data(data: &str) -> Option<StreamEvent> {
    let chunk: RawChunk = match serde_json::from_str(data) {
        Ok(chunk) => chunk,
        Err(err) => {
            tracing::warn!(payload = data, %err, "skipping malformed stream line");
            return None;
        }
    };

    match chunk {
        RawChunk::Error { error } => Some(StreamEvent::Error(error)),
        RawChunk::Content { content } => Some(StreamEvent::Content(content)),
        RawChunk::Done { done: true } => Some(StreamEvent::Done),
        RawChunk::Done { done: false } => None,
    }
}

fn classify_stream_error<E>(e: &EventStreamError<E>) -> ApiError
where
    E: std::error::Error,
{
    match e {
        EventStreamError::Transport(e) => ApiError::network(format!("Stream aborted: {e}")),
        EventStreamError::Utf8(e) => ApiError::parse(format!("Invalid UTF-8 in stream: {e}")),
        EventStreamError::Parser(e) => ApiError::parse(format!("Invalid SSE framing: {e}")),
    }
}
