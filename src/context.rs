//! Per-call cancellation and deadline.
//!
//! Every network operation takes a [`CallContext`]. Cancelling the token or
//! exceeding the timeout aborts the in-flight request and surfaces a
//! transport-class error, distinct from any on-chain outcome.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{TxError, TxResult};

/// Caller-supplied cancellation handle and optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: CancellationToken,
    timeout: Option<Duration>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            timeout: Some(timeout),
        }
    }

    /// Bind this context to an existing cancellation token.
    pub fn with_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that cancels every call made with this context.
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel all calls made with this context.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Drive `fut` to completion unless the context is cancelled or its deadline passes.
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> TxResult<T>
    where
        F: Future<Output = TxResult<T>>,
    {
        if self.cancel.is_cancelled() {
            return Err(TxError::Cancelled(operation));
        }

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => Err(TxError::Cancelled(operation)),
                result = fut => result,
            }
        };

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, guarded)
                .await
                .map_err(|_| TxError::Timeout {
                    operation,
                    limit,
                })?,
            None => guarded.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let ctx = CallContext::with_timeout(Duration::from_secs(5));
        let value = ctx.run("noop", async { Ok(7u32) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_deadline_expires() {
        let ctx = CallContext::with_timeout(Duration::from_millis(20));
        let result: TxResult<()> = ctx
            .run("slow call", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, TxError::Timeout { operation: "slow call", .. }));
        assert_eq!(err.to_string(), "slow call timed out after 20ms");
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_cancellation_aborts_pending_call() {
        let ctx = CallContext::background();
        let handle = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.cancel();
        });

        let result: TxResult<()> = ctx
            .run("broadcast", async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(TxError::Cancelled("broadcast"))));
    }

    #[tokio::test]
    async fn test_already_cancelled_skips_work() {
        let ctx = CallContext::background();
        ctx.cancel();
        let ran = std::sync::atomic::AtomicBool::new(false);
        let result: TxResult<()> = ctx
            .run("account query", async {
                ran.store(true, std::sync::atomic::Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(TxError::Cancelled(_))));
        assert!(!ran.load(std::sync::atomic::Ordering::SeqCst));
    }
}
