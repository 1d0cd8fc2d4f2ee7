use super::{ChainRpc, Metrics, RpcError};
use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use kona_indexer_metrics::observe_metrics_for_result_async;
use kona_indexer_types::{BlockRef, ChunkRange, RawLog};
use std::{future::Future, time::Duration};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Backoff schedule applied to transient RPC failures.
///
/// `max_attempts: None` retries without bound: a stalled endpoint blocks its own source until it
/// recovers or the indexer shuts down, it never causes a skipped range.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Upper bound of any single delay.
    pub max_delay: Duration,
    /// Growth factor between consecutive delays.
    pub factor: f32,
    /// Maximum number of retries, `None` for unbounded.
    pub max_attempts: Option<usize>,
    /// Randomizes delays to spread retries of concurrent sources.
    pub jitter: bool,
    /// Deadline of every single attempt.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            factor: 2.0,
            max_attempts: None,
            jitter: true,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Returns a policy that retries at most `max_attempts` times.
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Builds the backoff iterator of this policy.
    pub fn backoff(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_factor(self.factor);
        let builder = match self.max_attempts {
            Some(max_attempts) => builder.with_max_times(max_attempts),
            None => builder.without_max_times(),
        };
        if self.jitter { builder.with_jitter() } else { builder }
    }
}

/// Wraps a [`ChainRpc`] with retries and cancellation.
///
/// Transient errors are retried following the [`RetryPolicy`]; every other error is returned
/// immediately. Each call is raced against the cancellation token and resolves to
/// [`RpcError::Cancelled`] as soon as it fires, abandoning any in-flight attempt or backoff.
#[derive(Debug, Clone)]
pub struct ResilientRpc<R> {
    inner: R,
    policy: RetryPolicy,
    cancellation: CancellationToken,
    metrics_enabled: bool,
}

impl<R> ResilientRpc<R>
where
    R: ChainRpc,
{
    /// Creates a new [`ResilientRpc`].
    pub const fn new(inner: R, policy: RetryPolicy, cancellation: CancellationToken) -> Self {
        Self { inner, policy, cancellation, metrics_enabled: false }
    }

    /// Enables RPC metrics.
    pub fn with_metrics(mut self) -> Self {
        self.metrics_enabled = true;
        Metrics::init();
        self
    }

    /// The retry policy in use.
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn call<T, F, Fut>(&self, method: &'static str, mut request: F) -> Result<T, RpcError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, RpcError>> + Send,
        T: Send,
    {
        let timeout = self.policy.request_timeout;
        let attempt = || {
            let fut = request();
            async move {
                tokio::time::timeout(timeout, fut).await.map_err(|_| RpcError::Timeout(timeout))?
            }
        };

        let retrying = attempt
            .retry(self.policy.backoff())
            .when(RpcError::is_transient)
            .notify(|err, delay| {
                if self.metrics_enabled {
                    Metrics::record_retry(method);
                }
                warn!(target: "indexer::rpc", method, %err, ?delay, "Retrying RPC request");
            });

        let guarded = async {
            tokio::select! {
                biased;
                _ = self.cancellation.cancelled() => {
                    debug!(target: "indexer::rpc", method, "RPC request cancelled");
                    Err(RpcError::Cancelled)
                }
                result = retrying => result,
            }
        };

        if self.metrics_enabled {
            observe_metrics_for_result_async!(Metrics::RPC, method, guarded)
        } else {
            guarded.await
        }
    }
}

#[async_trait]
impl<R> ChainRpc for ResilientRpc<R>
where
    R: ChainRpc,
{
    async fn get_logs(
        &self,
        range: ChunkRange,
        address: Address,
        topic0: B256,
    ) -> Result<Vec<RawLog>, RpcError> {
        self.call(Metrics::METHOD_GET_LOGS, || self.inner.get_logs(range, address, topic0)).await
    }

    async fn get_block_number(&self, tag: BlockNumberOrTag) -> Result<u64, RpcError> {
        self.call(Metrics::METHOD_GET_BLOCK_NUMBER, || self.inner.get_block_number(tag)).await
    }

    async fn get_block_ref(&self, tag: BlockNumberOrTag) -> Result<BlockRef, RpcError> {
        self.call(Metrics::METHOD_GET_BLOCK_REF, || self.inner.get_block_ref(tag)).await
    }
}
