//! Turn driver: consumes one chat stream and forwards tagged updates.

use tokio::sync::mpsc;

use crate::api::{ApiClient, ChatRequest, ChatStream, StreamEvent};

/// Update produced by an in-flight turn, tagged with its send generation.
///
/// Exactly one of `Completed`/`Failed` is emitted per turn, and nothing is
/// emitted after it: the driver stops consuming at the first terminal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnUpdate {
    /// Incremental assistant text.
    Fragment { generation: u64, text: String },
    /// Turn finished (server `done` event or natural end of stream).
    Completed { generation: u64 },
    /// Turn failed; the message is suitable for the error banner.
    Failed { generation: u64, message: String },
}

impl TurnUpdate {
    pub fn generation(&self) -> u64 {
        match self {
            TurnUpdate::Fragment { generation, .. }
            | TurnUpdate::Completed { generation }
            | TurnUpdate::Failed { generation, .. } => *generation,
        }
    }
}

pub(crate) type TurnSender = mpsc::UnboundedSender<TurnUpdate>;

/// Sends one chat turn and forwards its stream as `TurnUpdate`s.
///
/// Send errors on the channel mean the controller is gone; they are ignored.
pub(crate) async fn drive_turn(
    client: ApiClient,
    request: ChatRequest,
    generation: u64,
    tx: TurnSender,
) {
    let stream = match client.send_chat(&request).await {
        Ok(stream) => stream,
        Err(e) => {
            let _ = tx.send(TurnUpdate::Failed {
                generation,
                message: e.to_string(),
            });
            return;
        }
    };

    forward_stream(stream, generation, &tx).await;
}

/// Consumes the stream until the first terminal event, emitting `Completed`
/// on natural EOF when the server never sent `done`.
pub(crate) async fn forward_stream(mut stream: ChatStream, generation: u64, tx: &TurnSender) {
    use futures_util::StreamExt;

    while let Some(item) = stream.next().await {
        match item {
            Ok(StreamEvent::Content(text)) => {
                let _ = tx.send(TurnUpdate::Fragment { generation, text });
            }
            Ok(StreamEvent::Error(message)) => {
                let _ = tx.send(TurnUpdate::Failed {
                    generation,
                    message,
                });
                return;
            }
            Ok(StreamEvent::Done) => {
                let _ = tx.send(TurnUpdate::Completed { generation });
                return;
            }
            Err(e) => {
                let _ = tx.send(TurnUpdate::Failed {
                    generation,
                    message: e.to_string(),
                });
                return;
            }
        }
    }

    let _ = tx.send(TurnUpdate::Completed { generation });
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;

    use super::*;
    use crate::api::{ApiError, ApiResult};

    fn stream_of(items: Vec<ApiResult<StreamEvent>>) -> ChatStream {
        futures_util::stream::iter(items).boxed()
    }

    async fn drain(items: Vec<ApiResult<StreamEvent>>) -> Vec<TurnUpdate> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        forward_stream(stream_of(items), 1, &tx).await;
        drop(tx);

        let mut updates = Vec::new();
        while let Some(update) = rx.recv().await {
            updates.push(update);
        }
        updates
    }

    #[tokio::test]
    async fn test_fragments_then_done_emit_single_completion() {
        let updates = drain(vec![
            Ok(StreamEvent::Content("A".to_string())),
            Ok(StreamEvent::Content("B".to_string())),
            Ok(StreamEvent::Done),
        ])
        .await;

        assert_eq!(
            updates,
            vec![
                TurnUpdate::Fragment {
                    generation: 1,
                    text: "A".to_string()
                },
                TurnUpdate::Fragment {
                    generation: 1,
                    text: "B".to_string()
                },
                TurnUpdate::Completed { generation: 1 },
            ]
        );
    }

    #[tokio::test]
    async fn test_eof_without_done_completes_once() {
        let updates = drain(vec![Ok(StreamEvent::Content("A".to_string()))]).await;

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[1], TurnUpdate::Completed { generation: 1 });
    }

    #[tokio::test]
    async fn test_error_event_stops_consumption() {
        let updates = drain(vec![
            Ok(StreamEvent::Content("A".to_string())),
            Ok(StreamEvent::Error("overloaded".to_string())),
            // Anything after the error must never be read.
            Ok(StreamEvent::Content("B".to_string())),
            Ok(StreamEvent::Done),
        ])
        .await;

        assert_eq!(
            updates,
            vec![
                TurnUpdate::Fragment {
                    generation: 1,
                    text: "A".to_string()
                },
                TurnUpdate::Failed {
                    generation: 1,
                    message: "overloaded".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_done_stops_consumption() {
        let updates = drain(vec![
            Ok(StreamEvent::Done),
            Ok(StreamEvent::Content("late".to_string())),
        ])
        .await;

        assert_eq!(updates, vec![TurnUpdate::Completed { generation: 1 }]);
    }

    #[tokio::test]
    async fn test_midstream_transport_error_fails_turn() {
        let updates = drain(vec![
            Ok(StreamEvent::Content("A".to_string())),
            Err(ApiError::network("reset")),
        ])
        .await;

        assert!(matches!(updates[1], TurnUpdate::Failed { .. }));
        assert_eq!(updates.len(), 2);
    }
}
