//! Implements the struct that holds the state of the webhook server.

use axum::extract::FromRef;

use crate::{
    health::HealthMonitor,
    ingest::{IngestionService, RetryPolicy},
    store::SheetStore,
};

/// The state of the webhook server.
///
/// The store handle is injected at construction and cloned into the two
/// services, so handlers can be tested against a substitute store. Nothing
/// in here is mutated after startup.
#[derive(Clone)]
pub struct AppState<S>
where
    S: SheetStore + Clone,
{
    /// Validates payloads and appends them to the store.
    pub ingestion: IngestionService<S>,
    /// Probes store connectivity for `/health` and `/cronjob`.
    pub health: HealthMonitor<S>,
}

impl<S> AppState<S>
where
    S: SheetStore + Clone,
{
    /// Create the state for a server that appends to `store`.
    pub fn new(store: S, retry: RetryPolicy) -> Self {
        Self {
            ingestion: IngestionService::new(store.clone(), retry),
            health: HealthMonitor::new(store),
        }
    }
}

impl<S> FromRef<AppState<S>> for IngestionService<S>
where
    S: SheetStore + Clone,
{
    fn from_ref(state: &AppState<S>) -> Self {
        state.ingestion.clone()
    }
}

impl<S> FromRef<AppState<S>> for HealthMonitor<S>
where
    S: SheetStore + Clone,
{
    fn from_ref(state: &AppState<S>) -> Self {
        state.health.clone()
    }
}
