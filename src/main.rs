mod application;
mod config;
mod domain;
mod http;
mod infrastructure;

use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Registry;

use crate::application::bulk_flush::BulkFlushPipeline;
use crate::application::direct_append::DirectAppendService;
use crate::config::app_config::CONFIG;
use crate::domain::sink::LeadSink;
use crate::http::{build_router, AppState};
use crate::infrastructure::sheets::spreadsheet_manager::SpreadsheetManager;
use crate::infrastructure::staging::FileStagingStore;

#[tokio::main]
async fn main() {
    Registry::default()
        .with(
            tracing_subscriber::filter::Targets::new()
                .with_target("rd_sheets_bridge", tracing::Level::TRACE)
                .with_default(tracing::Level::INFO),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = &*CONFIG;

    let sink: Arc<dyn LeadSink> = Arc::new(SpreadsheetManager::new(config.sheets.clone()).await);
    let staging = Arc::new(
        FileStagingStore::new(&config.staging).expect("failed to prepare the staging directory"),
    );

    let state = AppState {
        staging: Arc::clone(&staging),
        direct: Arc::new(DirectAppendService::new(Arc::clone(&sink))),
        flush: Arc::new(BulkFlushPipeline::new(sink, staging)),
    };

    let app = build_router(state);
    let addr = config.server.bind_addr();

    tracing::info!(%addr, spreadsheet = %config.sheets.spreadsheet_id, "listening");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
