//! Database environment of a single ingestion source.

use crate::{
    CursorStorage, Metrics, RecordImporter, RecordReader, RollbackOutcome, StorageRewinder,
    error::StorageError,
    providers::{CursorProvider, RecordProvider},
};
use kona_indexer_metrics::{MetricsReporter, observe_metrics_for_result};
use kona_indexer_types::{ChunkRange, Cursor, DecodedRecord, OutputProposal, ProvenWithdrawal, SourceId};
use metrics::gauge;
use reth_db::{
    DatabaseEnv,
    mdbx::{DatabaseArguments, init_db_for},
};
use reth_db_api::{database::Database, transaction::DbTx};
use std::path::Path;
use tracing::{error, info, warn};

type TxMut = <DatabaseEnv as Database>::TXMut;

/// Manages the database environment of one source.
/// Provides transactional access to its rows and cursor via providers.
#[derive(Debug)]
pub struct SourceDb {
    source_id: SourceId,
    metrics_enabled: Option<bool>,

    env: DatabaseEnv,
}

impl SourceDb {
    /// Creates or opens a database environment at the given path.
    pub fn new(source_id: SourceId, path: &Path) -> Result<Self, StorageError> {
        let env = init_db_for::<_, crate::models::Tables>(path, DatabaseArguments::default())?;
        Ok(Self { source_id, metrics_enabled: None, env })
    }

    /// Enables metrics on the database environment.
    pub fn with_metrics(mut self) -> Self {
        self.metrics_enabled = Some(true);
        Metrics::init(&self.source_id);
        self
    }

    /// The source this database belongs to.
    pub const fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    fn observe_call<T, E, F: FnOnce() -> Result<T, E>>(
        &self,
        name: &'static str,
        f: F,
    ) -> Result<T, E> {
        if self.metrics_enabled.unwrap_or(false) {
            observe_metrics_for_result!(Metrics::STORAGE, name, f(), "source" => self.source_id)
        } else {
            f()
        }
    }

    /// Runs `f` in a write transaction, committing only if it succeeds.
    fn write<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&TxMut) -> Result<T, StorageError>,
    {
        let tx = self.env.tx_mut()?;
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tx.abort();
                Err(err)
            }
        }
    }
}

impl CursorStorage for SourceDb {
    fn load_cursor(&self, initial_start: u64) -> Result<Cursor, StorageError> {
        self.observe_call(Metrics::METHOD_LOAD_CURSOR, || {
            self.write(|tx| CursorProvider::new(tx, &self.source_id).load_or_init(initial_start))
        })
    }

    fn advance_cursor(&self, end_block: u64) -> Result<Cursor, StorageError> {
        self.observe_call(Metrics::METHOD_ADVANCE_CURSOR, || {
            self.write(|tx| CursorProvider::new(tx, &self.source_id).advance(end_block))
        })
    }

    fn rewind_cursor(&self, reorg_block: u64) -> Result<Cursor, StorageError> {
        self.observe_call(Metrics::METHOD_REWIND_CURSOR, || {
            self.write(|tx| CursorProvider::new(tx, &self.source_id).rewind(reorg_block))
        })
    }
}

impl RecordImporter for SourceDb {
    fn import_batch(
        &self,
        records: &[DecodedRecord],
        chunk: ChunkRange,
    ) -> Result<Cursor, StorageError> {
        self.observe_call(Metrics::METHOD_IMPORT_BATCH, || {
            self.write(|tx| {
                if let Some(record) = records
                    .iter()
                    .find(|r| r.l1_block_number() < chunk.start || r.l1_block_number() > chunk.end)
                {
                    warn!(
                        target: "indexer::storage",
                        source_id = %self.source_id,
                        %chunk,
                        block_number = record.l1_block_number(),
                        "Importing record outside of its chunk"
                    );
                }

                RecordProvider::new(tx, &self.source_id).upsert_records(records)?;
                CursorProvider::new(tx, &self.source_id).advance_past(chunk)
            })
        })
    }
}

impl StorageRewinder for SourceDb {
    fn rollback(&self, reorg_block: u64) -> Result<RollbackOutcome, StorageError> {
        self.observe_call(Metrics::METHOD_ROLLBACK, || {
            self.write(|tx| {
                let deleted_rows =
                    RecordProvider::new(tx, &self.source_id).delete_from_block(reorg_block)?;
                let cursor = CursorProvider::new(tx, &self.source_id).rewind(reorg_block)?;
                Ok(RollbackOutcome { deleted_rows, cursor })
            })
        })
        .inspect(|outcome| {
            info!(
                target: "indexer::storage",
                source_id = %self.source_id,
                reorg_block,
                deleted_rows = outcome.deleted_rows,
                cursor = %outcome.cursor,
                "Rollback committed"
            );
        })
    }
}

impl RecordReader for SourceDb {
    fn output_proposals(&self) -> Result<Vec<OutputProposal>, StorageError> {
        self.observe_call(Metrics::METHOD_OUTPUT_PROPOSALS, || {
            self.env.view(|tx| RecordProvider::new(tx, &self.source_id).output_proposals())?
        })
    }

    fn proven_withdrawals(&self) -> Result<Vec<ProvenWithdrawal>, StorageError> {
        self.observe_call(Metrics::METHOD_PROVEN_WITHDRAWALS, || {
            self.env.view(|tx| RecordProvider::new(tx, &self.source_id).proven_withdrawals())?
        })
    }

    fn latest_imported_block(&self) -> Result<Option<u64>, StorageError> {
        self.observe_call(Metrics::METHOD_LATEST_IMPORTED_BLOCK, || {
            self.env.view(|tx| RecordProvider::new(tx, &self.source_id).latest_block())?
        })
    }
}

impl MetricsReporter for SourceDb {
    fn report_metrics(&self) {
        let snapshot = self.env.view(|tx| {
            let cursor = CursorProvider::new(tx, &self.source_id).get_cursor()?;
            let rows = RecordProvider::new(tx, &self.source_id).row_count()?;
            Ok::<_, StorageError>((cursor, rows))
        });

        match snapshot {
            Ok(Ok((cursor, rows))) => {
                if let Some(cursor) = cursor {
                    gauge!(Metrics::CURSOR_START_BLOCK, "source" => self.source_id.to_string())
                        .set(cursor.start_block as f64);
                }
                gauge!(Metrics::STORED_ROWS, "source" => self.source_id.to_string())
                    .set(rows as f64);
            }
            Ok(Err(err)) => {
                error!(target: "indexer::storage", source_id = %self.source_id, %err, "Failed to collect storage metrics");
            }
            Err(err) => {
                error!(target: "indexer::storage", source_id = %self.source_id, %err, "Failed to open read transaction for metrics");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};
    use tempfile::TempDir;

    fn setup() -> (TempDir, SourceDb) {
        let dir = TempDir::new().expect("Could not create temp dir");
        let db = SourceDb::new(SourceId::from("outputs"), dir.path()).expect("Failed to open db");
        (dir, db)
    }

    fn output(index: u64, l1_block: u64) -> DecodedRecord {
        OutputProposal {
            l2_output_index: index,
            l2_block_number: 100 + index,
            output_root: B256::from([index as u8; 32]),
            l1_timestamp: 1_700_000_000,
            l1_block_number: l1_block,
            l1_transaction_hash: B256::ZERO,
        }
        .into()
    }

    fn withdrawal(l1_block: u64, log_index: u64) -> DecodedRecord {
        ProvenWithdrawal {
            withdrawal_hash: B256::from([log_index as u8; 32]),
            from: Address::ZERO,
            to: Address::ZERO,
            l1_block_number: l1_block,
            log_index,
            l1_transaction_hash: B256::ZERO,
        }
        .into()
    }

    #[test]
    fn test_import_batch_advances_cursor() {
        let (_dir, db) = setup();
        db.load_cursor(100).unwrap();

        let cursor = db.import_batch(&[output(0, 100), output(1, 101)], ChunkRange::new(100, 101));
        assert_eq!(cursor, Ok(Cursor { start_block: 102, end_block: 101 }));
        assert_eq!(db.output_proposals().unwrap().len(), 2);
        assert_eq!(db.latest_imported_block().unwrap(), Some(101));
    }

    #[test]
    fn test_import_batch_twice_is_idempotent() {
        let (_dir, db) = setup();
        db.load_cursor(100).unwrap();
        let batch = [output(0, 100), withdrawal(100, 4), withdrawal(101, 0)];

        let first = db.import_batch(&batch, ChunkRange::new(100, 101)).unwrap();
        let outputs = db.output_proposals().unwrap();
        let withdrawals = db.proven_withdrawals().unwrap();

        let second = db.import_batch(&batch, ChunkRange::new(100, 101)).unwrap();
        assert_eq!(first, second);
        assert_eq!(db.output_proposals().unwrap(), outputs);
        assert_eq!(db.proven_withdrawals().unwrap(), withdrawals);
    }

    #[test]
    fn test_failed_import_commits_nothing() {
        let (_dir, db) = setup();
        db.load_cursor(100).unwrap();

        // A chunk beyond the cursor fails after the records were written in the same tx.
        let err = db.import_batch(&[output(0, 104)], ChunkRange::new(104, 105)).unwrap_err();
        assert_eq!(err, StorageError::CursorGap { cursor_start: 100, chunk_start: 104 });
        assert!(db.output_proposals().unwrap().is_empty());
        assert_eq!(db.load_cursor(100).unwrap(), Cursor::fresh(100));
    }

    #[test]
    fn test_rollback_deletes_rows_and_rewinds_cursor() {
        let (_dir, db) = setup();
        db.load_cursor(5).unwrap();
        for block in 5..=9 {
            db.import_batch(&[output(block, block)], ChunkRange::new(block, block)).unwrap();
        }

        let outcome = db.rollback(7).unwrap();
        assert_eq!(outcome.deleted_rows, 3);
        assert_eq!(outcome.cursor, Cursor { start_block: 7, end_block: 6 });

        let remaining: Vec<_> =
            db.output_proposals().unwrap().iter().map(|o| o.l1_block_number).collect();
        assert_eq!(remaining, vec![5, 6]);
        assert_eq!(db.load_cursor(5).unwrap().end_block, 6);
    }

    #[test]
    fn test_rollback_above_cursor_keeps_progress() {
        let (_dir, db) = setup();
        db.load_cursor(5).unwrap();
        db.import_batch(&[output(0, 5)], ChunkRange::new(5, 6)).unwrap();

        let outcome = db.rollback(50).unwrap();
        assert_eq!(outcome.deleted_rows, 0);
        assert_eq!(outcome.cursor, Cursor { start_block: 7, end_block: 6 });
    }

    #[test]
    fn test_advance_and_rewind_cursor() {
        let (_dir, db) = setup();
        db.load_cursor(0).unwrap();
        assert_eq!(db.advance_cursor(10).unwrap(), Cursor { start_block: 11, end_block: 10 });
        assert_eq!(db.rewind_cursor(4).unwrap(), Cursor { start_block: 4, end_block: 3 });
    }
}
