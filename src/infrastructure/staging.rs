use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use error_stack::ResultExt;
use thiserror::Error;
use tracing::instrument;

use crate::config::staging_config::StagingConfig;
use crate::domain::lead::LeadRecord;

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Failed to create the staging directory")]
    CreateDirFailed,
    #[error("Failed to persist a staged lead")]
    WriteFailed,
    #[error("Failed to enumerate the staging directory")]
    ListFailed,
}

/// File-per-lead holding area. One staged lead is one JSON document named
/// `<millis>-<seq>.json`; the sequence keeps keys unique when two leads land
/// within the same millisecond.
#[derive(Debug)]
pub struct FileStagingStore {
    dir: PathBuf,
    sequence: AtomicU64,
}

impl FileStagingStore {
    pub fn new(config: &StagingConfig) -> error_stack::Result<Self, StagingError> {
        std::fs::create_dir_all(&config.dir)
            .change_context(StagingError::CreateDirFailed)
            .attach_printable_lazy(|| format!("dir {}", config.dir.display()))?;
        Ok(FileStagingStore {
            dir: config.dir.clone(),
            sequence: AtomicU64::new(0),
        })
    }

    fn next_key(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{millis}-{seq:06}.json")
    }

    /// Persists one lead under a fresh key and returns the unit path.
    #[instrument(skip(record))]
    pub async fn stage(&self, record: &LeadRecord) -> error_stack::Result<PathBuf, StagingError> {
        let path = self.dir.join(self.next_key());
        let body = serde_json::to_vec(record).change_context(StagingError::WriteFailed)?;
        tokio::fs::write(&path, body)
            .await
            .change_context(StagingError::WriteFailed)
            .attach_printable_lazy(|| format!("unit {}", path.display()))?;
        tracing::debug!(unit = %path.display(), "lead staged");
        Ok(path)
    }

    /// Staged units in directory-enumeration order.
    #[instrument]
    pub async fn list(&self) -> error_stack::Result<Vec<PathBuf>, StagingError> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .change_context(StagingError::ListFailed)?;
        let mut units = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .change_context(StagingError::ListFailed)?
        {
            let file_type = entry
                .file_type()
                .await
                .change_context(StagingError::ListFailed)?;
            if file_type.is_file() {
                units.push(entry.path());
            }
        }
        Ok(units)
    }

    pub async fn count(&self) -> error_stack::Result<usize, StagingError> {
        Ok(self.list().await?.len())
    }

    /// Reads every staged unit back. A unit that fails to read or parse is
    /// skipped so one corrupt file cannot block the batch.
    #[instrument]
    pub async fn read_all(&self) -> error_stack::Result<Vec<LeadRecord>, StagingError> {
        let mut records = Vec::new();
        for unit in self.list().await? {
            let bytes = match tokio::fs::read(&unit).await {
                Ok(bytes) => bytes,
                Err(err) => {
                    tracing::warn!(unit = %unit.display(), %err, "skipping unreadable staged unit");
                    continue;
                }
            };
            match serde_json::from_slice::<LeadRecord>(&bytes) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(unit = %unit.display(), %err, "skipping unparsable staged unit");
                }
            }
        }
        Ok(records)
    }

    /// Deletes every staged unit and reports how many actually went. A unit
    /// that refuses to go is logged and left behind; the store stays usable.
    #[instrument]
    pub async fn clear(&self) -> error_stack::Result<usize, StagingError> {
        let mut removed = 0;
        for unit in self.list().await? {
            match tokio::fs::remove_file(&unit).await {
                Ok(()) => removed += 1,
                Err(err) => {
                    tracing::error!(unit = %unit.display(), %err, "failed to delete staged unit");
                }
            }
        }
        Ok(removed)
    }
}
