use kona_indexer_core::DriverExit;
use kona_indexer_types::SourceId;
use std::{fmt::Display, future::Future, time::Duration};
use tokio::{select, time::sleep};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// When a supervised driver is started again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Always restarted, whatever the outcome of the previous run.
    Permanent,
    /// Restarted after a failure only. A deliberate stop is final.
    #[default]
    Transient,
    /// Never restarted.
    Temporary,
}

impl RestartPolicy {
    /// Whether a driver that exited deliberately is started again.
    pub const fn restarts_on_exit(&self) -> bool {
        matches!(self, Self::Permanent)
    }

    /// Whether a driver that failed is started again.
    pub const fn restarts_on_error(&self) -> bool {
        matches!(self, Self::Permanent | Self::Transient)
    }
}

/// Runs `operation` under `policy` until it reaches a final outcome.
///
/// - Cancellation is always final and resolves to [`DriverExit::Cancelled`].
/// - Failed runs are restarted with [`backoff_delay`]; once `max_restarts` consecutive restarts
///   failed, the last error is returned.
/// - A deliberate exit resets the restart counter.
pub(crate) async fn supervise<Op, Fut, E>(
    source_id: &SourceId,
    policy: RestartPolicy,
    max_restarts: Option<usize>,
    cancel_token: &CancellationToken,
    mut operation: Op,
) -> Result<DriverExit, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<DriverExit, E>>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        if cancel_token.is_cancelled() {
            info!(target: "indexer::supervisor", %source_id, "Supervision cancelled before starting");
            return Ok(DriverExit::Cancelled);
        }

        let result = operation().await;
        match &result {
            Ok(DriverExit::Cancelled) => return result,
            Ok(exit) if !policy.restarts_on_exit() => {
                info!(target: "indexer::supervisor", %source_id, ?exit, "Driver exited, not restarting");
                return result;
            }
            Err(err) if !policy.restarts_on_error() => {
                error!(target: "indexer::supervisor", %source_id, %err, ?policy, "Driver failed, not restarting");
                return result;
            }
            Ok(exit) => {
                info!(target: "indexer::supervisor", %source_id, ?exit, "Driver exited, restarting");
                attempt = 0;
            }
            Err(err) => {
                attempt += 1;

                if let Some(max_restarts) = max_restarts &&
                    attempt > max_restarts
                {
                    error!(target: "indexer::supervisor", %source_id, %err, "Restart limit ({max_restarts}) exceeded");
                    return result;
                }

                warn!(
                    target: "indexer::supervisor",
                    %source_id,
                    %err,
                    delay = ?backoff_delay(attempt),
                    "Driver attempt {attempt} failed, restarting after delay"
                );
            }
        }

        select! {
            _ = sleep(backoff_delay(attempt)) => {}
            _ = cancel_token.cancelled() => {
                warn!(target: "indexer::supervisor", %source_id, "Supervision cancelled during backoff");
                return Ok(DriverExit::Cancelled);
            }
        }
    }
}

/// Calculates exponential backoff delay with a max cap (30s).
pub(crate) fn backoff_delay(attempt: usize) -> Duration {
    let secs = 2u64.saturating_pow(attempt.min(5) as u32);
    Duration::from_secs(secs.min(30))
}
