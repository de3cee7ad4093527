use crate::domain::event::EventEnvelope;
use crate::domain::payment::PaymentRecord;
use crate::domain::ports::{EventSink, PaymentStore};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for payment records, keyed by transaction id.
///
/// Uses `Arc<RwLock<HashMap<String, PaymentRecord>>>`; the version check in
/// `update` runs under the write lock, so racing updates are serialized.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    records: Arc<RwLock<HashMap<String, PaymentRecord>>>,
}

impl InMemoryPaymentStore {
    /// Creates a new, empty in-memory payment store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert(&self, record: PaymentRecord) -> Result<()> {
        record.ensure_new()?;
        let mut records = self.records.write().await;
        if records.contains_key(&record.transaction_id) {
            return Err(PaymentError::DuplicateTransaction(record.transaction_id));
        }
        records.insert(record.transaction_id.clone(), record);
        Ok(())
    }

    async fn update(&self, record: PaymentRecord, expected_version: u64) -> Result<()> {
        let mut records = self.records.write().await;
        let current = records
            .get(&record.transaction_id)
            .ok_or_else(|| PaymentError::RecordNotFound(record.transaction_id.clone()))?;

        if current.version() != expected_version {
            return Err(PaymentError::ConcurrentModification {
                transaction_id: record.transaction_id,
                expected_version,
            });
        }
        records.insert(record.transaction_id.clone(), record);
        Ok(())
    }

    async fn get(&self, transaction_id: &str) -> Result<Option<PaymentRecord>> {
        let records = self.records.read().await;
        Ok(records.get(transaction_id).cloned())
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<PaymentRecord>> {
        let records = self.records.read().await;
        let mut found: Vec<PaymentRecord> = records
            .values()
            .filter(|r| r.order_id == order_id)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.requested_at);
        Ok(found)
    }

    async fn get_all(&self) -> Result<Vec<PaymentRecord>> {
        let records = self.records.read().await;
        Ok(records.values().cloned().collect())
    }
}

/// An event sink that keeps every envelope in memory.
///
/// Clones share the same list, so a test can hand one clone to the service
/// and inspect the other.
#[derive(Default, Clone)]
pub struct RecordingEventSink {
    events: Arc<RwLock<Vec<EventEnvelope>>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<EventEnvelope> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl EventSink for RecordingEventSink {
    async fn publish(&self, envelope: EventEnvelope) -> Result<()> {
        self.events.write().await.push(envelope);
        Ok(())
    }
}
