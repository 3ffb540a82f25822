use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Router;

use crate::application::bulk_flush::BulkFlushPipeline;
use crate::application::direct_append::DirectAppendService;
use crate::domain::lead::{self, LeadRecord, RdStationPayload};
use crate::infrastructure::staging::FileStagingStore;

#[derive(Clone)]
pub struct AppState {
    pub staging: Arc<FileStagingStore>,
    pub direct: Arc<DirectAppendService>,
    pub flush: Arc<BulkFlushPipeline>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/rd-station", post(receive_leads))
        .route("/bulk-integration", post(stage_lead))
        .route("/bulk-data-form", get(bulk_data_form))
        .route("/insert-bulk-data", post(insert_bulk_data))
        .with_state(state)
}

/// RD Station posts with unreliable content-type headers, so every body is
/// treated as JSON no matter what the request declared.
fn parse_leads(body: &[u8]) -> Option<Vec<LeadRecord>> {
    let payload = match serde_json::from_slice::<RdStationPayload>(body) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::trace!(%err, "discarding malformed webhook body");
            return None;
        }
    };
    match lead::normalize(payload) {
        Ok(records) => Some(records),
        Err(err) => {
            tracing::trace!(%err, "discarding webhook without leads");
            None
        }
    }
}

/// Direct path. The append runs as a spawned task the response does not wait
/// on; RD Station always gets a 200 and retries nothing.
async fn receive_leads(State(state): State<AppState>, body: Bytes) -> StatusCode {
    if let Some(records) = parse_leads(&body) {
        let direct = Arc::clone(&state.direct);
        tokio::spawn(async move {
            match direct.append_all(records).await {
                Ok(appended) => tracing::info!(appended, "direct append finished"),
                Err(report) => tracing::error!(?report, "direct append failed"),
            }
        });
    }
    StatusCode::OK
}

/// Staged path: only the first lead of the payload is kept, one unit per
/// webhook call.
async fn stage_lead(State(state): State<AppState>, body: Bytes) -> StatusCode {
    if let Some(records) = parse_leads(&body) {
        if let Some(record) = records.into_iter().next() {
            if let Err(report) = state.staging.stage(&record).await {
                tracing::error!(?report, "failed to stage lead");
            }
        }
    }
    StatusCode::OK
}

async fn bulk_data_form(State(state): State<AppState>) -> Html<String> {
    let staged = match state.staging.count().await {
        Ok(count) => count,
        Err(report) => {
            tracing::error!(?report, "failed to count staged leads");
            0
        }
    };
    Html(format!(
        "<html><body>\
         <h2>Bulk lead insertion</h2>\
         <p>{staged} lead(s) staged for insertion.</p>\
         <form action=\"/insert-bulk-data\" method=\"post\">\
         <button type=\"submit\">Insert into spreadsheet</button>\
         </form>\
         </body></html>"
    ))
}

async fn insert_bulk_data(State(state): State<AppState>) -> (StatusCode, Html<String>) {
    match state.flush.flush().await {
        Ok(outcome) if outcome.inserted == 0 => (
            StatusCode::OK,
            Html("<html><body><p>No staged leads to insert.</p></body></html>".to_owned()),
        ),
        Ok(outcome) => {
            let warning = if outcome.cleared {
                ""
            } else {
                " Warning: the staging area could not be cleared."
            };
            (
                StatusCode::OK,
                Html(format!(
                    "<html><body><p>Inserted {} lead(s) into the spreadsheet.{}</p></body></html>",
                    outcome.inserted, warning
                )),
            )
        }
        Err(report) => {
            tracing::error!(?report, "bulk flush failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(
                    "<html><body><p>Bulk insertion failed; staged leads were kept.</p></body></html>"
                        .to_owned(),
                ),
            )
        }
    }
}
