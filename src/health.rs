//! The health monitor: a single timeout-bounded probe against the store.

use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;

use crate::store::SheetStore;

/// How long a probe may take before the store is reported as disconnected.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Overall service condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    /// The store is reachable and authorized.
    Healthy,
    /// The store could not be reached; the HTTP surface still works.
    Degraded,
}

/// A point-in-time health report. Recomputed fresh for every check, never
/// cached across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthStatus {
    /// Healthy or degraded.
    pub status: ServiceStatus,
    /// Whether the probe reached the store.
    pub store_connected: bool,
    /// When the probe ran, in UTC.
    pub checked_at: OffsetDateTime,
}

/// Probes the store on demand and reports connectivity.
///
/// A check issues exactly one probe; it never retries. Callers wanting
/// periodic monitoring (e.g. an external cron service hitting `/cronjob`)
/// call [check](HealthMonitor::check) repeatedly.
#[derive(Debug, Clone)]
pub struct HealthMonitor<S> {
    store: S,
    probe_timeout: Duration,
}

impl<S> HealthMonitor<S>
where
    S: SheetStore,
{
    /// Create a monitor with the [default probe timeout](DEFAULT_PROBE_TIMEOUT).
    pub fn new(store: S) -> Self {
        Self {
            store,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Probe the store once and report the result.
    ///
    /// Any probe error, regardless of subtype, and a probe that outlives the
    /// timeout both map to [ServiceStatus::Degraded]; health reporting only
    /// needs the connectivity boolean, not the error taxonomy.
    pub async fn check(&self) -> HealthStatus {
        let store_connected =
            match tokio::time::timeout(self.probe_timeout, self.store.probe()).await {
                Ok(Ok(())) => true,
                Ok(Err(error)) => {
                    tracing::warn!("store probe failed: {error}");
                    false
                }
                Err(_) => {
                    tracing::warn!(
                        "store probe timed out after {:?}",
                        self.probe_timeout
                    );
                    false
                }
            };

        let status = if store_connected {
            ServiceStatus::Healthy
        } else {
            ServiceStatus::Degraded
        };

        HealthStatus {
            status,
            store_connected,
            checked_at: OffsetDateTime::now_utc(),
        }
    }
}
