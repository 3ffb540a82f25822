use thiserror::Error;

use crate::domain::row::LeadRow;

#[derive(Error, Debug)]
pub enum LeadSinkError {
    #[error("The remote store rejected the authorization check")]
    Unauthorized,
    #[error("The remote store did not accept the appended rows")]
    AppendFailed,
}

/// Append-only tabular store the bridge writes leads into.
#[async_trait::async_trait]
pub trait LeadSink: Send + Sync {
    /// Verifies the store is reachable with a valid session before any write
    /// is attempted.
    async fn ensure_authorized(&self) -> error_stack::Result<(), LeadSinkError>;

    /// Appends one row in a single call.
    async fn append_row(&self, row: LeadRow) -> error_stack::Result<(), LeadSinkError>;

    /// Appends the whole batch in a single call and reports how many rows the
    /// store confirmed.
    async fn append_rows(&self, rows: Vec<LeadRow>) -> error_stack::Result<usize, LeadSinkError>;
}
