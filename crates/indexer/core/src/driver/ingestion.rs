use super::{DriverConfig, DriverError, DriverExit, Metrics};
use crate::{ChainRpc, DecoderRegistry, RpcError, SharedInbox, chunk_range};
use kona_indexer_storage::{IngestionStorage, StopFlagStorage};
use kona_indexer_types::Cursor;
use std::{sync::Arc, time::Duration};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

/// Delay before the next cycle.
///
/// Zero while unprocessed blocks remain, so a source that is behind catches up without pausing.
/// Otherwise the remainder of `poll_interval` after a cycle that took `elapsed`.
pub const fn poll_delay(poll_interval: Duration, elapsed: Duration, behind: bool) -> Duration {
    if behind { Duration::ZERO } else { poll_interval.saturating_sub(elapsed) }
}

/// Ingests the events of one source, chunk by chunk, until stopped or cancelled.
///
/// Every cycle the driver
/// 1. applies a pending reorg rollback,
/// 2. reads the chain head (bounded by the stop block),
/// 3. fetches, decodes and imports each chunk between the cursor and the head in ascending
///    order, checking the reorg inbox after every chunk,
/// 4. evaluates the stop condition and sleeps until the next cycle.
///
/// A chunk is imported together with the cursor advance in one storage transaction, so the
/// cursor never moves past an unpersisted range. Storage operations are synchronous and can
/// not be interrupted by cancellation halfway.
#[derive(Debug)]
pub struct IngestionDriver<R, S, F> {
    config: DriverConfig,
    rpc: R,
    storage: Arc<S>,
    flags: Arc<F>,
    decoders: Arc<DecoderRegistry>,
    inbox: SharedInbox,
    cancellation: CancellationToken,
    metrics_enabled: bool,
}

impl<R, S, F> IngestionDriver<R, S, F>
where
    R: ChainRpc,
    S: IngestionStorage,
    F: StopFlagStorage,
{
    /// Creates a new [`IngestionDriver`].
    pub const fn new(
        config: DriverConfig,
        rpc: R,
        storage: Arc<S>,
        flags: Arc<F>,
        decoders: Arc<DecoderRegistry>,
        inbox: SharedInbox,
        cancellation: CancellationToken,
    ) -> Self {
        Self { config, rpc, storage, flags, decoders, inbox, cancellation, metrics_enabled: false }
    }

    /// Enables driver metrics.
    pub fn with_metrics(mut self) -> Self {
        self.metrics_enabled = true;
        Metrics::init(&self.config.source_id);
        self
    }

    /// Runs the driver until the source is stopped, the token is cancelled or a fatal error
    /// occurs.
    pub async fn run(self) -> Result<DriverExit, DriverError> {
        let cancellation = self.cancellation.clone();
        let result = tokio::select! {
            biased;
            _ = cancellation.cancelled() => Ok(DriverExit::Cancelled),
            result = self.ingest() => result,
        };

        match result {
            Ok(DriverExit::Cancelled) | Err(DriverError::Rpc(RpcError::Cancelled)) => {
                info!(target: "indexer::driver", source_id = %self.config.source_id, "Driver cancelled");
                Ok(DriverExit::Cancelled)
            }
            result => result,
        }
    }

    async fn ingest(&self) -> Result<DriverExit, DriverError> {
        let source_id = &self.config.source_id;

        if self.flags.is_stopped(source_id)? {
            warn!(target: "indexer::driver", %source_id, "Stop flag set, source will not be ingested");
            return Ok(DriverExit::Stopped);
        }

        let mut cursor = self.storage.load_cursor(self.config.start_block)?;
        info!(
            target: "indexer::driver",
            %source_id,
            kind = %self.config.kind,
            address = %self.config.address,
            %cursor,
            "Driver started"
        );

        loop {
            if self.cancellation.is_cancelled() {
                return Ok(DriverExit::Cancelled);
            }

            let started = Instant::now();
            let completed = match self.run_cycle(&mut cursor).await {
                Ok(()) => true,
                Err(DriverError::Storage(err)) => {
                    error!(target: "indexer::driver", %source_id, %err, %cursor, "Cycle aborted, retrying next cycle");
                    if self.metrics_enabled {
                        Metrics::record_cycle_error(source_id);
                    }
                    false
                }
                Err(err) => return Err(err),
            };

            if self.stop_reached(cursor)? {
                return Ok(DriverExit::Stopped);
            }

            let behind = completed && cursor.start_block <= self.head().await?;
            let delay = poll_delay(self.config.poll_interval, started.elapsed(), behind);
            if !delay.is_zero() {
                trace!(target: "indexer::driver", %source_id, ?delay, "Waiting for next cycle");
                tokio::time::sleep(delay).await;
            }
        }
    }

    async fn run_cycle(&self, cursor: &mut Cursor) -> Result<(), DriverError> {
        let source_id = &self.config.source_id;

        let pending = self.inbox.lock().await.poll();
        if let Some(reorg_block) = pending {
            self.rollback(cursor, reorg_block).await?;
        }

        let head = self.head().await?;
        if cursor.start_block > head {
            debug!(target: "indexer::driver", %source_id, head, %cursor, "Source is at the chain head");
            return Ok(());
        }

        debug!(
            target: "indexer::driver",
            %source_id,
            from = cursor.start_block,
            to = head,
            "Processing block range"
        );

        for chunk in chunk_range(cursor.start_block, head, self.config.max_range_size) {
            let logs = self.rpc.get_logs(chunk, self.config.address, self.config.topic0).await?;
            let records = self.decoders.decode_all(&logs).inspect_err(|err| {
                error!(target: "indexer::driver", %source_id, %chunk, %err, "Failed to decode logs");
            })?;

            *cursor = self.storage.import_batch(&records, chunk)?;
            if self.metrics_enabled {
                Metrics::record_chunk(source_id, chunk.len(), records.len(), cursor.end_block);
            }
            debug!(target: "indexer::driver", %source_id, %chunk, rows = records.len(), "Chunk imported");

            let pending = self.inbox.lock().await.poll();
            if let Some(reorg_block) = pending {
                self.rollback(cursor, reorg_block).await?;
                return Ok(());
            }
        }

        if cursor.start_block > head {
            info!(target: "indexer::driver", %source_id, head, %cursor, "Caught up with the chain head");
        }
        Ok(())
    }

    /// Deletes every row at or above `reorg_block` and rewinds the cursor.
    ///
    /// The signal stays pending in the inbox until the rollback committed, so a failed rollback
    /// is attempted again at the start of the next cycle.
    async fn rollback(&self, cursor: &mut Cursor, reorg_block: u64) -> Result<(), DriverError> {
        let source_id = &self.config.source_id;
        warn!(target: "indexer::driver", %source_id, reorg_block, %cursor, "Reorg signal received, rolling back");

        let outcome = self.storage.rollback(reorg_block)?;
        self.inbox.lock().await.acknowledge(reorg_block);
        *cursor = outcome.cursor;

        warn!(
            target: "indexer::driver",
            %source_id,
            reorg_block,
            deleted_rows = outcome.deleted_rows,
            %cursor,
            "Rollback complete"
        );
        if self.metrics_enabled {
            Metrics::record_rollback(source_id, outcome.deleted_rows, cursor.end_block);
        }
        Ok(())
    }

    /// The upper bound of the current cycle.
    async fn head(&self) -> Result<u64, RpcError> {
        let head = self.rpc.get_block_number(self.config.head_tag).await?;
        Ok(self.config.stop_at_block.map_or(head, |stop_at| head.min(stop_at)))
    }

    /// Evaluates the stop condition, persisting the flag once the stop block is reached.
    fn stop_reached(&self, cursor: Cursor) -> Result<bool, DriverError> {
        let source_id = &self.config.source_id;

        if let Some(stop_at_block) = self.config.stop_at_block &&
            cursor.has_processed(stop_at_block)
        {
            self.flags.set_stopped(source_id, true)?;
            warn!(target: "indexer::driver", %source_id, stop_at_block, %cursor, "Stop block reached, source stopped");
            return Ok(true);
        }

        if self.flags.is_stopped(source_id)? {
            warn!(target: "indexer::driver", %source_id, %cursor, "Stop flag set, source stopped");
            return Ok(true);
        }
        Ok(false)
    }
}
