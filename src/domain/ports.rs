use super::event::EventEnvelope;
use super::payment::PaymentRecord;
use crate::error::Result;
use async_trait::async_trait;

/// Storage port for payment records.
///
/// Implementations must make `insert` fail with `DuplicateTransaction` on an
/// existing transaction id, reject anything [`PaymentRecord::ensure_new`]
/// refuses, and make `update` a compare-and-swap on the
/// record version under a single write lock.
#[async_trait]
pub trait PaymentStore: Send + Sync {
    async fn insert(&self, record: PaymentRecord) -> Result<()>;
    async fn update(&self, record: PaymentRecord, expected_version: u64) -> Result<()>;
    async fn get(&self, transaction_id: &str) -> Result<Option<PaymentRecord>>;
    async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<PaymentRecord>>;
    async fn get_all(&self) -> Result<Vec<PaymentRecord>>;
}

/// Destination for payment events. Delivery guarantees are the sink's own.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, envelope: EventEnvelope) -> Result<()>;
}

pub type PaymentStoreBox = Box<dyn PaymentStore>;
pub type EventSinkBox = Box<dyn EventSink>;
