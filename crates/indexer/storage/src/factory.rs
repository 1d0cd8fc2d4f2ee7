use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, RwLock},
};

use crate::{SettingsDb, error::StorageError, sourcedb::SourceDb};
use kona_indexer_metrics::MetricsReporter;
use kona_indexer_types::SourceId;
use tracing::error;

/// Name of the directory holding the shared settings environment.
const SETTINGS_DIR: &str = "settings";

/// Factory for managing the databases of all ingestion sources.
///
/// Every source gets its own environment at `<db_path>/<source_id>`; the stop flags of all
/// sources live in a single settings environment at `<db_path>/settings`.
#[derive(Debug)]
pub struct SourceDbFactory {
    db_path: PathBuf,
    metrics_enabled: Option<bool>,

    dbs: RwLock<HashMap<SourceId, Arc<SourceDb>>>,
    settings: Arc<SettingsDb>,
}

impl SourceDbFactory {
    /// Create a new factory, opening the settings environment.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let settings = SettingsDb::new(db_path.join(SETTINGS_DIR).as_path())?;
        Ok(Self {
            db_path,
            metrics_enabled: None,
            dbs: RwLock::new(HashMap::new()),
            settings: Arc::new(settings),
        })
    }

    /// Enables metrics on every database created by this factory.
    pub fn with_metrics(mut self) -> Self {
        self.metrics_enabled = Some(true);
        // Only this factory holds the settings handle before `settings()` is first called.
        if let Some(settings) = Arc::get_mut(&mut self.settings) {
            settings.enable_metrics();
        }
        self
    }

    /// Shared settings environment.
    pub fn settings(&self) -> Arc<SettingsDb> {
        self.settings.clone()
    }

    /// Get or create a [`SourceDb`] for the given source.
    ///
    /// If the database does not exist, it will be created at the path `self.db_path/<source_id>`.
    pub fn get_or_create_db(&self, source_id: &SourceId) -> Result<Arc<SourceDb>, StorageError> {
        {
            let dbs = self.dbs.read().map_err(|err| {
                error!(target: "indexer::storage", %err, "Failed to acquire read lock on databases");
                StorageError::LockPoisoned
            })?;
            if let Some(db) = dbs.get(source_id) {
                return Ok(db.clone());
            }
        }

        let mut dbs = self.dbs.write().map_err(|err| {
            error!(target: "indexer::storage", %err, "Failed to acquire write lock on databases");
            StorageError::LockPoisoned
        })?;
        // Double-check in case another thread inserted
        if let Some(db) = dbs.get(source_id) {
            return Ok(db.clone());
        }

        let source_db_path = self.db_path.join(source_id.as_str());
        let mut source_db = SourceDb::new(source_id.clone(), source_db_path.as_path())?;
        if self.metrics_enabled.unwrap_or(false) {
            source_db = source_db.with_metrics();
        }
        let db = Arc::new(source_db);
        dbs.insert(source_id.clone(), db.clone());
        Ok(db)
    }

    /// Get a [`SourceDb`] for the given source, returning an error if it doesn't exist.
    pub fn get_db(&self, source_id: &SourceId) -> Result<Arc<SourceDb>, StorageError> {
        let dbs = self.dbs.read().map_err(|_| StorageError::LockPoisoned)?;
        dbs.get(source_id)
            .cloned()
            .ok_or_else(|| StorageError::DatabaseNotInitialised(source_id.to_string()))
    }
}

impl MetricsReporter for SourceDbFactory {
    fn report_metrics(&self) {
        if self.metrics_enabled.unwrap_or(false) {
            let dbs: Vec<Arc<SourceDb>> = match self.dbs.read() {
                Ok(dbs_guard) => dbs_guard.values().cloned().collect(),
                Err(_) => {
                    error!(target: "indexer::storage", "Failed to acquire read lock for metrics reporting");
                    return;
                }
            };
            for db in dbs {
                db.report_metrics();
            }
        }
    }
}
