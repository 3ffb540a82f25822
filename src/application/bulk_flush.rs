use std::sync::Arc;

use error_stack::ResultExt;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;

use crate::domain::lead::LeadRecord;
use crate::domain::sink::LeadSink;
use crate::infrastructure::staging::FileStagingStore;

#[derive(Error, Debug)]
pub enum FlushError {
    #[error("The spreadsheet session could not be authorized")]
    Unauthorized,
    #[error("Failed to read the staged leads")]
    StagingRead,
    #[error("The batched append was not accepted")]
    AppendFailed,
}

/// Result of one flush run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushOutcome {
    pub inserted: usize,
    pub cleared: bool,
}

/// Drains the staging area into the sink as one batched append. Staged units
/// are only deleted after the sink confirmed the batch, so a failed append
/// leaves everything in place for a retry.
pub struct BulkFlushPipeline {
    sink: Arc<dyn LeadSink>,
    staging: Arc<FileStagingStore>,
    // Two overlapping flushes would double-append the same staged set.
    flush_guard: Mutex<()>,
}

impl BulkFlushPipeline {
    pub fn new(sink: Arc<dyn LeadSink>, staging: Arc<FileStagingStore>) -> Self {
        Self {
            sink,
            staging,
            flush_guard: Mutex::new(()),
        }
    }

    #[instrument(skip(self))]
    pub async fn flush(&self) -> error_stack::Result<FlushOutcome, FlushError> {
        let _guard = self.flush_guard.lock().await;

        self.sink
            .ensure_authorized()
            .await
            .change_context(FlushError::Unauthorized)?;

        let records = self
            .staging
            .read_all()
            .await
            .change_context(FlushError::StagingRead)?;
        if records.is_empty() {
            tracing::info!("staging area is empty, nothing to flush");
            return Ok(FlushOutcome {
                inserted: 0,
                cleared: false,
            });
        }

        let rows = records.iter().map(LeadRecord::to_cells).collect::<Vec<_>>();
        let inserted = self
            .sink
            .append_rows(rows)
            .await
            .change_context(FlushError::AppendFailed)?;

        let cleared = match self.staging.clear().await {
            Ok(removed) => {
                tracing::info!(inserted, removed, "flush completed");
                true
            }
            Err(report) => {
                tracing::error!(?report, "appended but could not clear the staging area");
                false
            }
        };

        Ok(FlushOutcome { inserted, cleared })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use tempfile::TempDir;

    use super::*;
    use crate::config::staging_config::StagingConfig;
    use crate::domain::lead::test_record as record;
    use crate::domain::sink::testing::RecordingSink;

    fn fixture(
        sink: Arc<RecordingSink>,
    ) -> (BulkFlushPipeline, Arc<FileStagingStore>, TempDir) {
        let tmp = TempDir::new().expect("tempdir");
        let config = StagingConfig {
            dir: tmp.path().to_path_buf(),
        };
        let staging = Arc::new(FileStagingStore::new(&config).expect("staging store"));
        let pipeline = BulkFlushPipeline::new(sink, Arc::clone(&staging));
        (pipeline, staging, tmp)
    }

    #[tokio::test]
    async fn flushes_staged_leads_in_one_batch_and_clears() {
        let sink = Arc::new(RecordingSink::default());
        let (pipeline, staging, _tmp) = fixture(sink.clone());
        for i in 0..4 {
            staging
                .stage(&record(&format!("lead{i}@b.com")))
                .await
                .expect("stage");
        }

        let outcome = pipeline.flush().await.expect("flush");

        assert_eq!(
            outcome,
            FlushOutcome {
                inserted: 4,
                cleared: true
            }
        );
        assert_eq!(sink.batch_sizes(), vec![4]);
        assert_eq!(staging.count().await.expect("count"), 0);
    }

    #[tokio::test]
    async fn failed_append_keeps_every_staged_unit() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail_append.store(true, Ordering::SeqCst);
        let (pipeline, staging, _tmp) = fixture(sink.clone());
        for i in 0..3 {
            staging
                .stage(&record(&format!("lead{i}@b.com")))
                .await
                .expect("stage");
        }

        let result = pipeline.flush().await;

        assert!(result.is_err());
        assert_eq!(staging.count().await.expect("count"), 3);
    }

    #[tokio::test]
    async fn authorization_failure_touches_nothing() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail_auth.store(true, Ordering::SeqCst);
        let (pipeline, staging, _tmp) = fixture(sink.clone());
        staging.stage(&record("a@b.com")).await.expect("stage");

        let result = pipeline.flush().await;

        assert!(result.is_err());
        assert_eq!(sink.row_count(), 0);
        assert_eq!(staging.count().await.expect("count"), 1);
    }

    #[tokio::test]
    async fn empty_staging_short_circuits_without_an_append() {
        let sink = Arc::new(RecordingSink::default());
        let (pipeline, _staging, _tmp) = fixture(sink.clone());

        let outcome = pipeline.flush().await.expect("flush");

        assert_eq!(
            outcome,
            FlushOutcome {
                inserted: 0,
                cleared: false
            }
        );
        assert!(sink.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn corrupt_unit_does_not_block_the_batch() {
        let sink = Arc::new(RecordingSink::default());
        let (pipeline, staging, tmp) = fixture(sink.clone());
        staging.stage(&record("a@b.com")).await.expect("stage");
        staging.stage(&record("c@d.com")).await.expect("stage");
        std::fs::write(tmp.path().join("9999999999999-000099.json"), b"{oops")
            .expect("write corrupt unit");

        let outcome = pipeline.flush().await.expect("flush");

        assert_eq!(outcome.inserted, 2);
        assert_eq!(sink.batch_sizes(), vec![2]);
    }

    #[tokio::test]
    async fn retry_after_failure_appends_the_same_set() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail_append.store(true, Ordering::SeqCst);
        let (pipeline, staging, _tmp) = fixture(sink.clone());
        staging.stage(&record("a@b.com")).await.expect("stage");
        staging.stage(&record("c@d.com")).await.expect("stage");

        assert!(pipeline.flush().await.is_err());

        sink.fail_append.store(false, Ordering::SeqCst);
        let outcome = pipeline.flush().await.expect("retry flush");

        assert_eq!(outcome.inserted, 2);
        assert_eq!(staging.count().await.expect("count"), 0);
    }
}
