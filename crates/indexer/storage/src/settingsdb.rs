use crate::{Metrics, StopFlagStorage, error::StorageError, providers::FlagProvider};
use kona_indexer_metrics::observe_metrics_for_result;
use kona_indexer_types::SourceId;
use reth_db::{
    DatabaseEnv,
    mdbx::{DatabaseArguments, init_db_for},
};
use reth_db_api::{database::Database, transaction::DbTx};
use std::path::Path;
use tracing::info;

/// Process wide settings shared by every source, such as the stop flags.
#[derive(Debug)]
pub struct SettingsDb {
    metrics_enabled: Option<bool>,

    env: DatabaseEnv,
}

impl SettingsDb {
    /// Creates or opens the settings environment at the given path.
    pub fn new(path: &Path) -> Result<Self, StorageError> {
        let env = init_db_for::<_, crate::models::Tables>(path, DatabaseArguments::default())?;
        Ok(Self { metrics_enabled: None, env })
    }

    /// Enables metrics on the database environment.
    pub fn with_metrics(mut self) -> Self {
        self.enable_metrics();
        self
    }

    pub(crate) fn enable_metrics(&mut self) {
        self.metrics_enabled = Some(true);
        Metrics::init_settings();
    }

    fn stop_key(source: &SourceId) -> String {
        format!("stop:{source}")
    }

    fn observe_call<T, E, F: FnOnce() -> Result<T, E>>(
        &self,
        name: &'static str,
        f: F,
    ) -> Result<T, E> {
        if self.metrics_enabled.unwrap_or(false) {
            observe_metrics_for_result!(Metrics::STORAGE, name, f())
        } else {
            f()
        }
    }
}

impl StopFlagStorage for SettingsDb {
    fn is_stopped(&self, source: &SourceId) -> Result<bool, StorageError> {
        self.observe_call(Metrics::METHOD_IS_STOPPED, || {
            self.env.view(|tx| FlagProvider::new(tx).get_flag(&Self::stop_key(source)))?
        })
    }

    fn set_stopped(&self, source: &SourceId, stopped: bool) -> Result<(), StorageError> {
        self.observe_call(Metrics::METHOD_SET_STOPPED, || {
            let tx = self.env.tx_mut()?;
            if let Err(err) = FlagProvider::new(&tx).set_flag(&Self::stop_key(source), stopped) {
                tx.abort();
                return Err(err);
            }
            tx.commit()?;
            Ok(())
        })?;
        info!(target: "indexer::storage", source_id = %source, stopped, "Stop flag updated");
        Ok(())
    }
}
