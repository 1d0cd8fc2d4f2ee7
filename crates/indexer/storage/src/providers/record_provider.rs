//! Reth's MDBX-backed storage of decoded records.
//!
//! Output proposals are keyed by their oracle index, proven withdrawals by the position of
//! their log. Writes are plain `put`s, so importing the same record twice overwrites the row
//! with identical content.

use crate::{
    error::StorageError,
    models::{
        LogPosition, OutputProposalEntry, OutputProposals, ProvenWithdrawalEntry,
        ProvenWithdrawals,
    },
};
use kona_indexer_types::{DecodedRecord, OutputProposal, ProvenWithdrawal, SourceId};
use reth_db_api::{
    cursor::DbCursorRO,
    transaction::{DbTx, DbTxMut},
};
use tracing::{debug, error, info};

#[derive(Debug)]
pub(crate) struct RecordProvider<'tx, TX> {
    tx: &'tx TX,
    source_id: &'tx SourceId,
}

impl<'tx, TX> RecordProvider<'tx, TX> {
    pub(crate) const fn new(tx: &'tx TX, source_id: &'tx SourceId) -> Self {
        Self { tx, source_id }
    }
}

impl<TX> RecordProvider<'_, TX>
where
    TX: DbTxMut + DbTx,
{
    /// Upserts every record by its natural key.
    pub(crate) fn upsert_records(&self, records: &[DecodedRecord]) -> Result<(), StorageError> {
        for record in records {
            match record {
                DecodedRecord::OutputProposal(proposal) => self
                    .tx
                    .put::<OutputProposals>(
                        proposal.l2_output_index,
                        OutputProposalEntry::from(proposal),
                    )
                    .inspect_err(|err| {
                        error!(
                            target: "indexer::storage",
                            source_id = %self.source_id,
                            l2_output_index = proposal.l2_output_index,
                            %err,
                            "Failed to write output proposal"
                        );
                    })?,
                DecodedRecord::ProvenWithdrawal(withdrawal) => self
                    .tx
                    .put::<ProvenWithdrawals>(
                        LogPosition::new(withdrawal.l1_block_number, withdrawal.log_index),
                        ProvenWithdrawalEntry::from(withdrawal),
                    )
                    .inspect_err(|err| {
                        error!(
                            target: "indexer::storage",
                            source_id = %self.source_id,
                            block_number = withdrawal.l1_block_number,
                            log_index = withdrawal.log_index,
                            %err,
                            "Failed to write proven withdrawal"
                        );
                    })?,
            }
        }

        debug!(
            target: "indexer::storage",
            source_id = %self.source_id,
            records = records.len(),
            "Upserted records"
        );
        Ok(())
    }

    /// Deletes every row emitted at or above `block_number`, returning the number of deleted
    /// rows.
    pub(crate) fn delete_from_block(&self, block_number: u64) -> Result<usize, StorageError> {
        let mut deleted = 0;

        // Output indices are not ordered by L1 block across oracle upgrades, scan them all.
        {
            let mut cursor = self.tx.cursor_write::<OutputProposals>()?;
            let mut walker = cursor.walk(None)?;
            while let Some(row) = walker.next() {
                let (_, entry) = row?;
                if entry.l1_block_number >= block_number {
                    walker.delete_current()?;
                    deleted += 1;
                }
            }
        }

        {
            let mut cursor = self.tx.cursor_write::<ProvenWithdrawals>()?;
            let mut walker = cursor.walk(Some(LogPosition::block_start(block_number)))?;
            while let Some(row) = walker.next() {
                row?;
                walker.delete_current()?;
                deleted += 1;
            }
        }

        info!(
            target: "indexer::storage",
            source_id = %self.source_id,
            block_number,
            deleted,
            "Deleted rows at or above block"
        );
        Ok(deleted)
    }
}

impl<TX> RecordProvider<'_, TX>
where
    TX: DbTx,
{
    pub(crate) fn output_proposals(&self) -> Result<Vec<OutputProposal>, StorageError> {
        let mut cursor = self.tx.cursor_read::<OutputProposals>().inspect_err(|err| {
            error!(
                target: "indexer::storage",
                source_id = %self.source_id,
                %err,
                "Failed to get cursor for OutputProposals"
            );
        })?;
        let rows = cursor
            .walk(None)?
            .map(|row| row.map(|(_, entry)| OutputProposal::from(entry)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub(crate) fn proven_withdrawals(&self) -> Result<Vec<ProvenWithdrawal>, StorageError> {
        let mut cursor = self.tx.cursor_read::<ProvenWithdrawals>().inspect_err(|err| {
            error!(
                target: "indexer::storage",
                source_id = %self.source_id,
                %err,
                "Failed to get cursor for ProvenWithdrawals"
            );
        })?;
        let rows = cursor
            .walk(None)?
            .map(|row| row.map(|(position, entry)| entry.into_record(position)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Highest L1 block any stored row was emitted in.
    pub(crate) fn latest_block(&self) -> Result<Option<u64>, StorageError> {
        let withdrawals = self
            .tx
            .cursor_read::<ProvenWithdrawals>()?
            .last()?
            .map(|(position, _)| position.block_number);

        let mut outputs = None;
        for row in self.tx.cursor_read::<OutputProposals>()?.walk(None)? {
            let (_, entry) = row?;
            outputs = outputs.max(Some(entry.l1_block_number));
        }

        Ok(withdrawals.max(outputs))
    }

    pub(crate) fn row_count(&self) -> Result<usize, StorageError> {
        Ok(self.tx.entries::<OutputProposals>()? + self.tx.entries::<ProvenWithdrawals>()?)
    }
}
