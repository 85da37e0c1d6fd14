//! Stream multiplexing for model responses.
//!
//! A model answers with a lazy sequence of [`StreamChunk`](crate::provider::StreamChunk)s
//! mixing text deltas, binary fragments (inline images) and tool-call intents.
//! [`StreamMultiplexer::consume`] drains such a stream once and yields either
//! the accumulated buffers or the tool call that interrupted them.
//!
//! # Example
//!
//! ```
//! use futures_util::stream;
//! use stox_agent::provider::StreamChunk;
//! use stox_agent::stream::{StreamMultiplexer, StreamOutcome};
//!
//! # tokio_test::block_on(async {
//! let chunks = stream::iter(vec![
//!     Ok(StreamChunk::text("Hel")),
//!     Ok(StreamChunk::text("lo")),
//! ]);
//! match StreamMultiplexer::new().consume(chunks).await.unwrap() {
//!     StreamOutcome::Complete(acc) => assert_eq!(acc.text(), "Hello"),
//!     StreamOutcome::ToolRequested(_) => unreachable!(),
//! }
//! # });
//! ```

pub mod error;
pub mod multiplexer;

pub use error::StreamError;
pub use multiplexer::{Accumulator, BinaryPayload, StreamMultiplexer, StreamOutcome};
