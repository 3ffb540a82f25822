use std::sync::Arc;

use error_stack::ResultExt;
use futures::future::join_all;
use thiserror::Error;
use tracing::instrument;

use crate::domain::lead::LeadRecord;
use crate::domain::sink::LeadSink;

#[derive(Error, Debug)]
pub enum DirectAppendError {
    #[error("The spreadsheet session could not be authorized")]
    Unauthorized,
}

/// Immediate path: every record goes out as its own single-row append call,
/// all of them in flight at once.
pub struct DirectAppendService {
    sink: Arc<dyn LeadSink>,
}

impl DirectAppendService {
    pub fn new(sink: Arc<dyn LeadSink>) -> Self {
        Self { sink }
    }

    /// Appends each record and reports how many the sink accepted. A record
    /// that fails is logged and dropped; the others still go through.
    #[instrument(skip(self, records), fields(leads = records.len()))]
    pub async fn append_all(
        &self,
        records: Vec<LeadRecord>,
    ) -> error_stack::Result<usize, DirectAppendError> {
        self.sink
            .ensure_authorized()
            .await
            .change_context(DirectAppendError::Unauthorized)?;

        let results = join_all(
            records
                .iter()
                .map(|record| self.sink.append_row(record.to_cells())),
        )
        .await;

        let mut appended = 0;
        for (record, result) in records.iter().zip(results) {
            match result {
                Ok(()) => appended += 1,
                Err(report) => {
                    tracing::error!(?report, email = %record.email, "dropping lead after failed append");
                }
            }
        }
        Ok(appended)
    }
}
