//! Model provider abstraction.
//!
//! The core never constructs provider-specific requests. It hands the
//! transcript and the tool declarations to a [`ModelProvider`] and drains
//! whatever stream of [`StreamChunk`]s comes back. Model selection,
//! temperature and system instructions are the provider's own configuration.

use crate::provider::types::{StreamChunk, Transcript};
use anyhow::Result;
use futures_util::Stream;
use std::pin::Pin;

/// Type alias for streaming response
pub type StreamingResponse = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Capability contract of a generative model.
///
/// # Example
///
/// ```ignore
/// use stox_agent::provider::{ModelProvider, Transcript};
///
/// async fn ask(provider: &dyn ModelProvider) -> anyhow::Result<()> {
///     let transcript = Transcript::from_user("Describe this product");
///     let stream = provider.generate_stream(&transcript, &[]).await?;
///     // drain with stox_agent::stream::StreamMultiplexer
///     Ok(())
/// }
/// ```
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    /// Start a streaming generation.
    ///
    /// # Arguments
    /// * `transcript` - Conversation so far, oldest turn first
    /// * `tools` - Tools the model may request
    ///
    /// # Returns
    /// Lazy, finite, non-restartable stream of chunks. An `Err` here means
    /// the provider could not be reached at all.
    async fn generate_stream(
        &self,
        transcript: &Transcript,
        tools: &[umf::Tool],
    ) -> Result<StreamingResponse>;

    /// Provider identifier for logging (e.g. "gemini").
    fn provider_name(&self) -> &str;

    /// Model identifier for logging.
    fn model_name(&self) -> &str;
}
