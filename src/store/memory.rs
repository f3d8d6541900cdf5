//! An in-memory [SheetStore] used as a test double.

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use crate::{
    record::TransactionRecord,
    store::{RowReference, SheetStore, StoreError},
};

/// A [SheetStore] that appends rows to a vector.
///
/// Errors can be scripted with [MemoryStore::push_error]: each scripted
/// error is consumed by the next `append` or `probe` call, which lets tests
/// fault-inject per call (e.g. two transient failures followed by success).
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rows: Arc<Mutex<Vec<TransactionRecord>>>,
    scripted_errors: Arc<Mutex<VecDeque<StoreError>>>,
    append_attempts: Arc<AtomicUsize>,
}

impl MemoryStore {
    /// Create an empty store with no scripted errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error to be returned by the next `append` or `probe` call.
    pub fn push_error(&self, error: StoreError) {
        self.scripted_errors
            .lock()
            .expect("memory store error queue lock poisoned")
            .push_back(error);
    }

    /// The rows appended so far, for test assertions.
    pub fn rows(&self) -> Vec<TransactionRecord> {
        self.rows
            .lock()
            .expect("memory store row lock poisoned")
            .clone()
    }

    /// How many times `append` has been called, counting failed attempts.
    pub fn append_attempts(&self) -> usize {
        self.append_attempts.load(Ordering::SeqCst)
    }

    fn next_scripted_error(&self) -> Option<StoreError> {
        self.scripted_errors
            .lock()
            .expect("memory store error queue lock poisoned")
            .pop_front()
    }
}

#[async_trait]
impl SheetStore for MemoryStore {
    async fn append(&self, record: &TransactionRecord) -> Result<RowReference, StoreError> {
        self.append_attempts.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.next_scripted_error() {
            return Err(error);
        }

        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::Unknown("memory store row lock poisoned".to_owned()))?;
        rows.push(record.clone());
        let row_number = rows.len();

        Ok(RowReference {
            range: format!("A{row_number}:F{row_number}"),
        })
    }

    async fn probe(&self) -> Result<(), StoreError> {
        match self.next_scripted_error() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod memory_store_tests {
    use time::macros::date;

    use crate::{
        record::{TransactionRecord, TransactionType},
        store::{MemoryStore, SheetStore, StoreError},
    };

    fn test_record() -> TransactionRecord {
        TransactionRecord {
            line_item: "Coffee".to_owned(),
            amount: 3.5,
            date_of_txn: date!(2025 - 09 - 13),
            txn_type: TransactionType::Expense,
            category: "Food".to_owned(),
        }
    }

    #[tokio::test]
    async fn append_stores_rows_in_order() {
        let store = MemoryStore::new();

        let first = store.append(&test_record()).await.expect("append failed");
        let second = store.append(&test_record()).await.expect("append failed");

        assert_eq!(first.range, "A1:F1");
        assert_eq!(second.range, "A2:F2");
        assert_eq!(store.rows().len(), 2);
    }

    #[tokio::test]
    async fn scripted_errors_are_consumed_in_order() {
        let store = MemoryStore::new();
        store.push_error(StoreError::Transient("timeout".to_owned()));

        let error = store
            .append(&test_record())
            .await
            .expect_err("first append should fail");
        assert!(error.is_transient());

        store.append(&test_record()).await.expect("append failed");
        assert_eq!(store.rows().len(), 1);
        assert_eq!(store.append_attempts(), 2);
    }

    #[tokio::test]
    async fn probe_consumes_scripted_errors() {
        let store = MemoryStore::new();
        store.push_error(StoreError::Auth("expired".to_owned()));

        assert!(store.probe().await.is_err());
        assert!(store.probe().await.is_ok());
    }
}
