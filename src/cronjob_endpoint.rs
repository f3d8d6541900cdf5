//! Defines the endpoint for externally scheduled maintenance runs.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    health::HealthMonitor,
    responses::error_response,
    store::SheetStore,
};

/// The body of a successful maintenance run.
#[derive(Debug, Serialize)]
struct CronJobResponse {
    status: &'static str,
    message: String,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
}

/// A route handler for cron services to trigger periodic maintenance.
///
/// The run verifies store connectivity through the health monitor and logs
/// the outcome. A reachable store yields 200; an unreachable one yields 503
/// so the calling scheduler can alert.
pub async fn post_cronjob<S>(State(monitor): State<HealthMonitor<S>>) -> Response
where
    S: SheetStore + Clone,
{
    tracing::info!("cron job endpoint called");

    let health = monitor.check().await;

    if !health.store_connected {
        tracing::error!("cron job connectivity check failed");
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "spreadsheet store connectivity check failed",
        );
    }

    let tasks = ["spreadsheet connectivity verified", "status logged"];
    let message = format!("Cron job completed successfully. Tasks: {}", tasks.join(", "));
    tracing::info!("{message}");

    (
        StatusCode::OK,
        Json(CronJobResponse {
            status: "success",
            message,
            timestamp: health.checked_at,
        }),
    )
        .into_response()
}
