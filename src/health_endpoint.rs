//! Defines the health check endpoint.

use axum::{Json, extract::State};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    health::{HealthMonitor, ServiceStatus},
    store::SheetStore,
};

/// The body of a health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded".
    pub status: ServiceStatus,
    /// When the store was probed, in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// The crate version.
    pub version: &'static str,
    /// Whether the spreadsheet store was reachable and authorized.
    pub google_sheets_connected: bool,
}

/// A route handler reporting API and store connectivity.
///
/// Always responds 200; a degraded store is reflected in the body rather
/// than the status code so that load balancers keep routing to the HTTP
/// surface while operators see the store fault.
pub async fn get_health<S>(State(monitor): State<HealthMonitor<S>>) -> Json<HealthResponse>
where
    S: SheetStore + Clone,
{
    let health = monitor.check().await;

    Json(HealthResponse {
        status: health.status,
        timestamp: health.checked_at,
        version: env!("CARGO_PKG_VERSION"),
        google_sheets_connected: health.store_connected,
    })
}
