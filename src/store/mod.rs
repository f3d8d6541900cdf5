//! The abstraction over the external spreadsheet store.
//!
//! [SheetStore] is the seam between the ingestion pipeline and the outside
//! world: it is the only place in the crate that performs network I/O and
//! the only component holding store credentials. [sheets::GoogleSheetsStore]
//! talks to the real Google Sheets API; [memory::MemoryStore] is the
//! in-process substitute used by tests.

use async_trait::async_trait;
use thiserror::Error;

use crate::record::TransactionRecord;

mod memory;
mod sheets;

pub use memory::MemoryStore;
pub use sheets::{GoogleSheetsStore, SheetsConfig};

/// The errors surfaced by a [SheetStore].
///
/// The taxonomy exists so callers can tell configuration faults (no point
/// retrying) apart from transient faults (worth retrying).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store rejected the credentials (invalid or expired).
    #[error("store rejected credentials: {0}")]
    Auth(String),

    /// The target spreadsheet or sheet tab does not exist.
    #[error("spreadsheet or sheet tab not found: {0}")]
    NotFound(String),

    /// A failure expected to resolve on retry: timeout, connection failure,
    /// rate limit, or a server-side error.
    #[error("transient store failure: {0}")]
    Transient(String),

    /// Anything the adapter could not classify.
    #[error("unexpected store failure: {0}")]
    Unknown(String),
}

impl StoreError {
    /// Whether retrying the operation could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Where an appended row landed in the store, e.g. `Expense_Tracking!A5:F5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowReference {
    /// The cell range the store reported for the new row.
    pub range: String,
}

/// An append-only tabular store for transaction records.
///
/// Implementations must be safe for concurrent use; the handle is created
/// once at startup and shared across requests. Both operations are expected
/// to bound their own network time with a timeout and report expiry as
/// [StoreError::Transient].
#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Append one record as a new row. Never updates or deletes.
    async fn append(&self, record: &TransactionRecord) -> Result<RowReference, StoreError>;

    /// A lightweight connectivity and authorization check that does not
    /// mutate any data.
    async fn probe(&self) -> Result<(), StoreError>;
}
