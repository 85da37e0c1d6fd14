//! Initialize-once handle to a shared orchestrator.

use crate::orchestration::Orchestrator;
use anyhow::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily built [`Orchestrator`] shared between runs.
///
/// Construction (provider client, tool endpoints) happens at most once, on
/// first use; later callers await the same instance. The handle is passed
/// explicitly to whoever needs it.
#[derive(Default)]
pub struct OrchestratorHandle {
    cell: OnceCell<Arc<Orchestrator>>,
}

impl OrchestratorHandle {
    /// Create an uninitialized handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle that is already initialized.
    pub fn from_orchestrator(orchestrator: Orchestrator) -> Self {
        Self {
            cell: OnceCell::new_with(Some(Arc::new(orchestrator))),
        }
    }

    /// Return the orchestrator, building it with `init` on first use.
    ///
    /// If `init` fails the handle stays uninitialized and the next call
    /// tries again.
    pub async fn get_or_try_init<F, Fut>(&self, init: F) -> Result<Arc<Orchestrator>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Orchestrator>>,
    {
        let orchestrator = self
            .cell
            .get_or_try_init(|| async move { init().await.map(Arc::new) })
            .await?;
        Ok(orchestrator.clone())
    }

    /// The orchestrator, if already built.
    pub fn get(&self) -> Option<Arc<Orchestrator>> {
        self.cell.get().cloned()
    }

    /// Whether the orchestrator has been built.
    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::ToolGateway;
    use crate::provider::{ModelProvider, StreamingResponse, Transcript};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Silent;

    #[async_trait]
    impl ModelProvider for Silent {
        async fn generate_stream(&self, _: &Transcript, _: &[umf::Tool]) -> Result<StreamingResponse> {
            Ok(Box::pin(futures_util::stream::empty()))
        }

        fn provider_name(&self) -> &str {
            "silent"
        }

        fn model_name(&self) -> &str {
            "none"
        }
    }

    fn build() -> Orchestrator {
        Orchestrator::new(Arc::new(Silent), Arc::new(ToolGateway::new()))
    }

    #[tokio::test]
    async fn test_initializes_once() {
        let handle = OrchestratorHandle::new();
        let builds = AtomicUsize::new(0);
        assert!(!handle.is_initialized());

        for _ in 0..3 {
            handle
                .get_or_try_init(|| async {
                    builds.fetch_add(1, Ordering::SeqCst);
                    Ok(build())
                })
                .await
                .unwrap();
        }

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert!(handle.get().is_some());
    }

    #[tokio::test]
    async fn test_failed_init_can_retry() {
        let handle = OrchestratorHandle::new();
        let err = handle
            .get_or_try_init(|| async { Err(anyhow::anyhow!("GOOGLE_API_KEY not set")) })
            .await;
        assert!(err.is_err());
        assert!(!handle.is_initialized());

        handle.get_or_try_init(|| async { Ok(build()) }).await.unwrap();
        assert!(handle.is_initialized());
    }

    #[test]
    fn test_preinitialized_handle() {
        let handle = OrchestratorHandle::from_orchestrator(build());
        assert!(handle.is_initialized());
        assert_eq!(handle.get().unwrap().provider().provider_name(), "silent");
    }
}
