//! A webhook service for tracking expenses from automation clients.
//!
//! Clients such as Apple Shortcuts POST transaction entries to `/expense`;
//! each validated entry is appended as a row to a Google Sheets spreadsheet
//! and confirmed synchronously. The store is append-only: the service never
//! queries, edits, or deletes recorded rows.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod cronjob_endpoint;
mod endpoints;
mod expense_endpoint;
mod health;
mod health_endpoint;
mod ingest;
mod logging;
mod record;
mod responses;
mod routing;
mod state;
mod store;

pub use health::{HealthMonitor, HealthStatus, ServiceStatus};
pub use ingest::{Confirmation, IngestionError, IngestionService, RetryPolicy};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use record::{
    RawAmount, RawTransaction, TransactionRecord, TransactionType, ValidationError, validate,
};
pub use routing::build_router;
pub use state::AppState;
pub use store::{
    GoogleSheetsStore, MemoryStore, RowReference, SheetStore, SheetsConfig, StoreError,
};

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}
