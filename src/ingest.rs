//! The ingestion pipeline: validate a raw payload, then append it to the
//! store under a bounded retry policy.

use std::time::Duration;

use thiserror::Error;
use time::OffsetDateTime;

use crate::{
    record::{RawTransaction, TransactionRecord, ValidationError, validate},
    store::{RowReference, SheetStore, StoreError},
};

/// The errors surfaced by [IngestionService::submit].
///
/// The variants separate "fix your request" ([IngestionError::BadRequest])
/// from "try again later" ([IngestionError::StoreUnavailable]) from
/// "operator intervention required" ([IngestionError::StoreMisconfigured]).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestionError {
    /// The payload failed validation. Never retried and never reaches the
    /// store.
    #[error("{0}")]
    BadRequest(ValidationError),

    /// The store rejected the request due to bad credentials or a missing
    /// spreadsheet/tab. Retrying cannot help; the configuration must be
    /// fixed.
    #[error("the spreadsheet store is misconfigured: {0}")]
    StoreMisconfigured(StoreError),

    /// The store kept failing transiently after the retry budget was spent.
    #[error("the spreadsheet store is unavailable: {0}")]
    StoreUnavailable(StoreError),

    /// An unclassified store failure. The detail is for server logs only.
    #[error("an unexpected store error occurred: {0}")]
    Internal(StoreError),
}

/// How transient append failures are retried.
///
/// The policy is plain data rather than control flow so tests can exercise
/// it against a scripted store and a paused clock. Delays grow as
/// `base_delay * 2^(attempt - 1)` and the total time slept never exceeds
/// `max_total_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total append attempts, including the first one.
    pub max_attempts: u32,
    /// The delay after the first failed attempt.
    pub base_delay: Duration,
    /// Upper bound on the summed delays across all retries.
    pub max_total_delay: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts with 250ms base delay, at most 3 seconds of waiting.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_total_delay: Duration::from_secs(3),
        }
    }
}

impl RetryPolicy {
    /// The backoff delay after the `attempt`-th failed attempt (1-based).
    fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);

        self.base_delay * 2_u32.pow(exponent)
    }
}

/// The response to a successfully ingested transaction: the normalized
/// record, where it landed, and when the server recorded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    /// The validated record as it was appended.
    pub record: TransactionRecord,
    /// Where the row landed in the store.
    pub row: RowReference,
    /// When the server completed the append, in UTC.
    pub recorded_at: OffsetDateTime,
}

/// Orchestrates validation and the append against the store.
///
/// Each [submit](IngestionService::submit) call is independent; the service
/// holds no mutable state, so concurrent calls need no coordination.
#[derive(Debug, Clone)]
pub struct IngestionService<S> {
    store: S,
    retry: RetryPolicy,
}

impl<S> IngestionService<S>
where
    S: SheetStore,
{
    /// Create a service that appends to `store` under `retry`.
    pub fn new(store: S, retry: RetryPolicy) -> Self {
        Self { store, retry }
    }

    /// Validate `raw` and append the resulting record to the store.
    ///
    /// Validation failures short-circuit without touching the store.
    /// Transient store failures are retried per the [RetryPolicy];
    /// misconfiguration failures are surfaced immediately.
    ///
    /// Duplicate submissions are not deduplicated: each call performs its
    /// own append, and repeated client retries will produce repeated rows.
    pub async fn submit(&self, raw: RawTransaction) -> Result<Confirmation, IngestionError> {
        let today = OffsetDateTime::now_utc().date();
        let record = validate(raw, today).map_err(IngestionError::BadRequest)?;

        let row = self.append_with_retry(&record).await?;

        tracing::info!(
            "recorded {} entry: {} - {}",
            record.txn_type,
            record.line_item,
            record.amount
        );

        Ok(Confirmation {
            record,
            row,
            recorded_at: OffsetDateTime::now_utc(),
        })
    }

    async fn append_with_retry(
        &self,
        record: &TransactionRecord,
    ) -> Result<RowReference, IngestionError> {
        let mut attempt = 1;
        let mut total_delay = Duration::ZERO;

        loop {
            let error = match self.store.append(record).await {
                Ok(row) => return Ok(row),
                Err(error) => error,
            };

            match error {
                StoreError::Transient(_) => {
                    let delay = self.retry.delay_after(attempt);
                    let budget_spent = attempt >= self.retry.max_attempts
                        || total_delay + delay > self.retry.max_total_delay;

                    if budget_spent {
                        tracing::error!(
                            "append failed after {attempt} attempts: {error}"
                        );
                        return Err(IngestionError::StoreUnavailable(error));
                    }

                    tracing::warn!(
                        "append attempt {attempt} failed transiently, retrying in {delay:?}: {error}"
                    );
                    tokio::time::sleep(delay).await;
                    total_delay += delay;
                    attempt += 1;
                }
                StoreError::Auth(_) | StoreError::NotFound(_) => {
                    tracing::error!("append failed due to store misconfiguration: {error}");
                    return Err(IngestionError::StoreMisconfigured(error));
                }
                StoreError::Unknown(_) => {
                    tracing::error!("append failed unexpectedly: {error}");
                    return Err(IngestionError::Internal(error));
                }
            }
        }
    }
}
