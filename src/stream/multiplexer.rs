//! Single-pass consumer for heterogeneous model response streams.

use super::StreamError;
use crate::provider::{BinaryFragment, StreamChunk, ToolCall};
use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Typed buffers filled while a stream is drained.
///
/// Only one binary payload is retained. When the stream carries several
/// distinct payloads, each new payload ordinal replaces the previous buffer,
/// so the last payload observed wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Accumulator {
    text_buffer: String,
    binary_buffer: Vec<u8>,
    mime_type: Option<String>,
    current_payload: Option<u32>,
    payloads_seen: usize,
    chunks: usize,
}

impl Accumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    fn push_text(&mut self, fragment: &str) {
        self.text_buffer.push_str(fragment);
    }

    fn push_binary(&mut self, fragment: BinaryFragment) {
        if self.current_payload != Some(fragment.payload) {
            if self.current_payload.is_some() {
                debug!(
                    replaced_bytes = self.binary_buffer.len(),
                    payload = fragment.payload,
                    "new binary payload replaces the previous one"
                );
            }
            self.binary_buffer.clear();
            self.current_payload = Some(fragment.payload);
            self.payloads_seen += 1;
        }
        if self.mime_type.is_none() {
            self.mime_type = fragment.mime_type;
        }
        self.binary_buffer.extend_from_slice(&fragment.data);
    }

    /// Accumulated text, in arrival order.
    pub fn text(&self) -> &str {
        &self.text_buffer
    }

    /// Retained binary payload (empty when none was streamed).
    pub fn binary(&self) -> &[u8] {
        &self.binary_buffer
    }

    /// Whether a binary payload was streamed.
    pub fn has_binary(&self) -> bool {
        self.current_payload.is_some()
    }

    /// Mime type declared by the first binary chunk that carried one.
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Number of distinct binary payloads observed.
    pub fn payloads_seen(&self) -> usize {
        self.payloads_seen
    }

    /// Number of chunks consumed, terminal marker included.
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Split into the text buffer and the retained binary payload.
    pub fn finish(self) -> (String, Option<BinaryPayload>) {
        let payload = if self.current_payload.is_some() {
            Some(BinaryPayload {
                data: self.binary_buffer,
                mime_type: self.mime_type,
            })
        } else {
            None
        };
        (self.text_buffer, payload)
    }
}

/// The binary payload retained from a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryPayload {
    /// Raw bytes
    pub data: Vec<u8>,
    /// Mime type, when the stream declared one
    pub mime_type: Option<String>,
}

/// Result of draining a stream.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamOutcome {
    /// The stream ran to completion.
    Complete(Accumulator),
    /// The model requested a tool; remaining chunks were not consumed.
    ToolRequested(ToolCall),
}

/// Drains a model response stream exactly once, in delivery order.
///
/// The only suspension point is awaiting the next chunk, and the
/// cancellation token is observed there.
#[derive(Debug, Clone, Default)]
pub struct StreamMultiplexer {
    cancel: CancellationToken,
}

impl StreamMultiplexer {
    /// Create a multiplexer that never cancels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a multiplexer bound to a caller's cancellation token.
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    /// Consume the stream.
    ///
    /// # Errors
    /// * [`StreamError::Transport`] if the stream yields an error
    /// * [`StreamError::Empty`] if it ends before yielding anything
    /// * [`StreamError::Cancelled`] if the token fires while waiting
    pub async fn consume<S>(&self, mut stream: S) -> Result<StreamOutcome, StreamError>
    where
        S: Stream<Item = anyhow::Result<StreamChunk>> + Unpin,
    {
        let mut accumulator = Accumulator::new();

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(StreamError::Cancelled),
                item = stream.next() => item,
            };

            let Some(item) = next else {
                break;
            };

            let chunk = item.map_err(|e| StreamError::transport(accumulator.chunks, format!("{e:#}")))?;
            accumulator.chunks += 1;
            trace!(kind = chunk.kind(), index = accumulator.chunks, "stream chunk");

            match chunk {
                StreamChunk::Text(fragment) => accumulator.push_text(&fragment),
                StreamChunk::Binary(fragment) => accumulator.push_binary(fragment),
                StreamChunk::ToolCall(call) => {
                    debug!(
                        tool = %call.tool_name,
                        discarded_text = accumulator.text_buffer.len(),
                        discarded_bytes = accumulator.binary_buffer.len(),
                        "tool call short-circuits stream"
                    );
                    return Ok(StreamOutcome::ToolRequested(call));
                }
                StreamChunk::Done => break,
            }
        }

        if accumulator.chunks == 0 {
            return Err(StreamError::Empty);
        }

        debug!(
            chunks = accumulator.chunks,
            text_len = accumulator.text_buffer.len(),
            binary_len = accumulator.binary_buffer.len(),
            "stream complete"
        );
        Ok(StreamOutcome::Complete(accumulator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;
    use serde_json::json;

    fn chunks(items: Vec<StreamChunk>) -> impl Stream<Item = anyhow::Result<StreamChunk>> + Unpin {
        stream::iter(items.into_iter().map(Ok))
    }

    fn complete(outcome: StreamOutcome) -> Accumulator {
        match outcome {
            StreamOutcome::Complete(acc) => acc,
            other => panic!("expected completed stream, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_text_chunks_reassemble_in_order() {
        let outcome = StreamMultiplexer::new()
            .consume(chunks(vec![
                StreamChunk::text("Hel"),
                StreamChunk::text("lo, "),
                StreamChunk::text("world"),
            ]))
            .await
            .unwrap();

        let acc = complete(outcome);
        assert_eq!(acc.text(), "Hello, world");
        assert!(!acc.has_binary());
        assert_eq!(acc.chunk_count(), 3);
    }

    #[tokio::test]
    async fn test_tool_call_short_circuits_trailing_chunks() {
        let call = crate::provider::ToolCall::from_json("c1", "seo_analysis", json!({"url": "http://x/img.jpg"}));
        let outcome = StreamMultiplexer::new()
            .consume(chunks(vec![
                StreamChunk::text("Let me check "),
                StreamChunk::ToolCall(call.clone()),
                StreamChunk::text("this should never be merged"),
                StreamChunk::Done,
            ]))
            .await
            .unwrap();

        assert_eq!(outcome, StreamOutcome::ToolRequested(call));
    }

    #[tokio::test]
    async fn test_binary_fragments_concatenate() {
        let acc = complete(
            StreamMultiplexer::new()
                .consume(chunks(vec![
                    StreamChunk::binary(0, vec![1, 2], Some("image/png")),
                    StreamChunk::text("Image processed"),
                    StreamChunk::binary(0, vec![3, 4], None),
                    StreamChunk::Done,
                ]))
                .await
                .unwrap(),
        );

        assert_eq!(acc.binary(), &[1, 2, 3, 4]);
        assert_eq!(acc.mime_type(), Some("image/png"));
        assert_eq!(acc.text(), "Image processed");
        assert_eq!(acc.payloads_seen(), 1);
    }

    #[tokio::test]
    async fn test_last_binary_payload_wins_and_first_mime_is_kept() {
        let acc = complete(
            StreamMultiplexer::new()
                .consume(chunks(vec![
                    StreamChunk::binary(0, vec![9, 9, 9], None),
                    StreamChunk::binary(1, vec![1], Some("image/jpeg")),
                    StreamChunk::binary(2, vec![7, 8], Some("image/png")),
                ]))
                .await
                .unwrap(),
        );

        assert_eq!(acc.binary(), &[7, 8]);
        assert_eq!(acc.mime_type(), Some("image/jpeg"));
        assert_eq!(acc.payloads_seen(), 3);

        let (text, payload) = acc.finish();
        assert!(text.is_empty());
        assert_eq!(payload.unwrap().data, vec![7, 8]);
    }

    #[tokio::test]
    async fn test_empty_stream_fails() {
        let err = StreamMultiplexer::new()
            .consume(chunks(vec![]))
            .await
            .unwrap_err();
        assert_eq!(err, StreamError::Empty);
    }

    #[tokio::test]
    async fn test_terminal_marker_alone_is_not_empty() {
        let acc = complete(
            StreamMultiplexer::new()
                .consume(chunks(vec![StreamChunk::Done]))
                .await
                .unwrap(),
        );
        assert_eq!(acc.text(), "");
    }

    #[tokio::test]
    async fn test_done_stops_consumption() {
        let acc = complete(
            StreamMultiplexer::new()
                .consume(chunks(vec![
                    StreamChunk::text("final"),
                    StreamChunk::Done,
                    StreamChunk::text(" ignored"),
                ]))
                .await
                .unwrap(),
        );
        assert_eq!(acc.text(), "final");
    }

    #[tokio::test]
    async fn test_transport_error_mid_stream() {
        let items: Vec<anyhow::Result<StreamChunk>> = vec![
            Ok(StreamChunk::text("partial")),
            Err(anyhow::anyhow!("connection reset by peer")),
            Ok(StreamChunk::text("never seen")),
        ];
        let err = StreamMultiplexer::new()
            .consume(stream::iter(items))
            .await
            .unwrap_err();

        match err {
            StreamError::Transport { chunks, message } => {
                assert_eq!(chunks, 1);
                assert!(message.contains("connection reset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cancellation_observed_while_waiting() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = StreamMultiplexer::with_cancellation(cancel)
            .consume(stream::pending::<anyhow::Result<StreamChunk>>())
            .await
            .unwrap_err();
        assert_eq!(err, StreamError::Cancelled);
    }
}
