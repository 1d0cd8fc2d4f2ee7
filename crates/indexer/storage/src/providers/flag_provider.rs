use crate::{
    error::StorageError,
    models::{FlagEntry, Flags, StringKey},
};
use reth_db_api::transaction::{DbTx, DbTxMut};
use tracing::{error, trace};

/// Reads and writes named boolean flags.
#[derive(Debug)]
pub(crate) struct FlagProvider<'tx, TX> {
    tx: &'tx TX,
}

impl<'tx, TX> FlagProvider<'tx, TX> {
    pub(crate) const fn new(tx: &'tx TX) -> Self {
        Self { tx }
    }
}

impl<TX> FlagProvider<'_, TX>
where
    TX: DbTx,
{
    /// Returns the flag, `false` when it was never written.
    pub(crate) fn get_flag(&self, name: &str) -> Result<bool, StorageError> {
        let entry = self.tx.get::<Flags>(StringKey::from(name)).inspect_err(|err| {
            error!(target: "indexer::storage", flag = name, %err, "Failed to read flag");
        })?;
        Ok(entry.is_some_and(|flag| flag.value))
    }
}

impl<TX> FlagProvider<'_, TX>
where
    TX: DbTxMut + DbTx,
{
    pub(crate) fn set_flag(&self, name: &str, value: bool) -> Result<(), StorageError> {
        trace!(target: "indexer::storage", flag = name, value, "Writing flag");
        self.tx.put::<Flags>(StringKey::from(name), FlagEntry { value }).inspect_err(|err| {
            error!(target: "indexer::storage", flag = name, %err, "Failed to write flag");
        })?;
        Ok(())
    }
}
