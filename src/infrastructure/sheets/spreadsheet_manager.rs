use std::fmt::Debug;

use error_stack::ResultExt;
use google_sheets4::api::ValueRange;
use google_sheets4::oauth2::authenticator::Authenticator;
use google_sheets4::Sheets;
use thiserror::Error;
use tracing::instrument;

use crate::config::sheets_config::SpreadsheetConfig;
use crate::domain::row::LeadRow;
use crate::domain::sink::{LeadSink, LeadSinkError};

use super::{auth, http_client, value_range_factory::ValueRangeFactory};

type Connector =
    google_sheets4::hyper_rustls::HttpsConnector<google_sheets4::hyper::client::HttpConnector>;

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Owns the Sheets hub and the service-account session for the configured
/// spreadsheet. Built once at startup and shared across requests.
pub struct SpreadsheetManager {
    pub config: SpreadsheetConfig,
    hub: Sheets<Connector>,
    auth: Authenticator<Connector>,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SpreadsheetManager {{ config: {:?} }}", self.config)
    }
}

#[derive(Error, Debug)]
pub enum SpreadsheetManagerError {
    #[error("The spreadsheet API refused to issue an access token")]
    TokenRefused,
    #[error("Failed to append rows to the spreadsheet")]
    AppendFailed,
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new")]
    pub async fn new(config: SpreadsheetConfig) -> Self {
        let client = http_client::http_client();
        let auth = auth::auth(&config, client.clone()).await;
        let hub: Sheets<Connector> = Sheets::new(client.clone(), auth.clone());

        SpreadsheetManager { config, hub, auth }
    }

    /// Asks the authenticator for a fresh token for the spreadsheet scope.
    /// A refusal means nothing should be written.
    #[instrument]
    pub async fn ensure_authorized(&self) -> error_stack::Result<(), SpreadsheetManagerError> {
        self.auth
            .token(&[SHEETS_SCOPE])
            .await
            .map(|_| ())
            .change_context(SpreadsheetManagerError::TokenRefused)
    }

    #[instrument(skip(rows), fields(rows = rows.len()))]
    pub async fn append_rows(
        &self,
        rows: &[LeadRow],
    ) -> error_stack::Result<usize, SpreadsheetManagerError> {
        let value_range = ValueRange::from_rows(rows);
        let response = self
            .hub
            .spreadsheets()
            .values_append(
                value_range,
                &self.config.spreadsheet_id,
                &self.config.append_range,
            )
            .value_input_option("USER_ENTERED")
            .insert_data_option("INSERT_ROWS")
            .doit()
            .await
            .change_context(SpreadsheetManagerError::AppendFailed)
            .attach_printable_lazy(|| {
                format!("Failed to append to range {}", self.config.append_range)
            })?;

        let inserted = response
            .1
            .updates
            .and_then(|updates| updates.updated_rows)
            .map(|confirmed| confirmed as usize)
            .unwrap_or(rows.len());
        tracing::trace!(inserted, "rows appended to sheet");
        Ok(inserted)
    }
}

#[async_trait::async_trait]
impl LeadSink for SpreadsheetManager {
    async fn ensure_authorized(&self) -> error_stack::Result<(), LeadSinkError> {
        SpreadsheetManager::ensure_authorized(self)
            .await
            .change_context(LeadSinkError::Unauthorized)
    }

    async fn append_row(&self, row: LeadRow) -> error_stack::Result<(), LeadSinkError> {
        SpreadsheetManager::append_rows(self, std::slice::from_ref(&row))
            .await
            .map(|_| ())
            .change_context(LeadSinkError::AppendFailed)
    }

    async fn append_rows(&self, rows: Vec<LeadRow>) -> error_stack::Result<usize, LeadSinkError> {
        SpreadsheetManager::append_rows(self, &rows)
            .await
            .change_context(LeadSinkError::AppendFailed)
    }
}
