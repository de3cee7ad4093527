use crate::domain::payment::PaymentRecord;
use crate::domain::ports::PaymentStore;
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family for payment records, keyed by transaction id.
pub const CF_PAYMENTS: &str = "payments";
/// Column Family indexing transaction ids by order id.
pub const CF_PAYMENTS_BY_ORDER: &str = "payments_by_order";

const INDEX_SEPARATOR: u8 = 0;

/// A persistent payment store using RocksDB.
///
/// Records are JSON-encoded in `payments`; `payments_by_order` holds empty
/// values under `order_id \0 transaction_id` keys for prefix scans.
///
/// Writes run under a shared mutex so the duplicate check in `insert` and the
/// version check in `update` cannot interleave with another writer.
/// `Clone` shares the underlying `Arc<DB>` and the mutex.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_payments = ColumnFamilyDescriptor::new(CF_PAYMENTS, Options::default());
        let cf_by_order = ColumnFamilyDescriptor::new(CF_PAYMENTS_BY_ORDER, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_payments, cf_by_order])?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    fn read(&self, transaction_id: &str) -> Result<Option<PaymentRecord>> {
        let cf = self.cf(CF_PAYMENTS)?;
        match self.db.get_pinned_cf(cf, transaction_id.as_bytes())? {
            Some(bytes) => decode(&bytes).map(Some),
            None => Ok(None),
        }
    }
}

fn index_key(order_id: &str, transaction_id: &str) -> Vec<u8> {
    let mut key = index_prefix(order_id);
    key.extend_from_slice(transaction_id.as_bytes());
    key
}

fn index_prefix(order_id: &str) -> Vec<u8> {
    let mut prefix = order_id.as_bytes().to_vec();
    prefix.push(INDEX_SEPARATOR);
    prefix
}

fn encode(record: &PaymentRecord) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode(bytes: &[u8]) -> Result<PaymentRecord> {
    serde_json::from_slice(bytes).map_err(|e| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl PaymentStore for RocksDBStore {
    async fn insert(&self, record: PaymentRecord) -> Result<()> {
        record.ensure_new()?;
        let _guard = self.write_lock.lock().await;

        let payments = self.cf(CF_PAYMENTS)?;
        let by_order = self.cf(CF_PAYMENTS_BY_ORDER)?;
        let key = record.transaction_id.as_bytes();

        if self.db.get_pinned_cf(payments, key)?.is_some() {
            return Err(PaymentError::DuplicateTransaction(record.transaction_id));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(payments, key, encode(&record)?);
        batch.put_cf(
            by_order,
            index_key(&record.order_id, &record.transaction_id),
            b"",
        );
        self.db.write(batch)?;

        Ok(())
    }

    async fn update(&self, record: PaymentRecord, expected_version: u64) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let current = self
            .read(&record.transaction_id)?
            .ok_or_else(|| PaymentError::RecordNotFound(record.transaction_id.clone()))?;
        if current.version() != expected_version {
            return Err(PaymentError::ConcurrentModification {
                transaction_id: record.transaction_id,
                expected_version,
            });
        }

        let payments = self.cf(CF_PAYMENTS)?;
        self.db
            .put_cf(payments, record.transaction_id.as_bytes(), encode(&record)?)?;

        Ok(())
    }

    async fn get(&self, transaction_id: &str) -> Result<Option<PaymentRecord>> {
        self.read(transaction_id)
    }

    async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<PaymentRecord>> {
        let by_order = self.cf(CF_PAYMENTS_BY_ORDER)?;
        let prefix = index_prefix(order_id);

        let mut found = Vec::new();
        let iter = self
            .db
            .iterator_cf(by_order, IteratorMode::From(prefix.as_slice(), Direction::Forward));
        for item in iter {
            let (key, _) = item?;
            if !key.starts_with(&prefix) {
                break;
            }
            let transaction_id = String::from_utf8_lossy(&key[prefix.len()..]).into_owned();
            if let Some(record) = self.read(&transaction_id)? {
                found.push(record);
            }
        }

        found.sort_by_key(|r| r.requested_at);
        Ok(found)
    }

    async fn get_all(&self) -> Result<Vec<PaymentRecord>> {
        let payments = self.cf(CF_PAYMENTS)?;

        let mut records = Vec::new();
        for item in self.db.iterator_cf(payments, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(decode(&value)?);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Currency;
    use crate::domain::payment::{NewPayment, PaymentStatus, TransitionFields};
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn record(tx: &str, order: &str) -> PaymentRecord {
        let new = NewPayment::new(tx, order, dec!(100.0), "glycopharm");
        PaymentRecord::create(new, &Currency::default(), Utc::now()).unwrap()
    }

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).expect("Failed to open RocksDB");

        assert!(store.db.cf_handle(CF_PAYMENTS).is_some());
        assert!(store.db.cf_handle(CF_PAYMENTS_BY_ORDER).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_insert_and_get() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let record = record("tx-1", "order-1");
        store.insert(record.clone()).await.unwrap();

        assert_eq!(store.get("tx-1").await.unwrap().unwrap(), record);
        assert!(store.get("tx-2").await.unwrap().is_none());

        let duplicate = store.insert(record).await;
        assert!(matches!(duplicate, Err(PaymentError::DuplicateTransaction(_))));
        assert_eq!(store.get_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_rocksdb_update_checks_version() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        let original = record("tx-1", "order-1");
        store.insert(original.clone()).await.unwrap();

        let mut next = original.clone();
        next.transition_to(PaymentStatus::Confirming, TransitionFields::default(), Utc::now())
            .unwrap();
        store.update(next.clone(), 0).await.unwrap();

        let result = store.update(next, 0).await;
        assert!(matches!(result, Err(PaymentError::ConcurrentModification { .. })));
        assert_eq!(store.get("tx-1").await.unwrap().unwrap().version(), 1);
    }

    #[tokio::test]
    async fn test_rocksdb_insert_rejects_records_past_created() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();

        let mut failed = record("tx-1", "order-1");
        failed
            .transition_to(PaymentStatus::Failed, TransitionFields::default(), Utc::now())
            .unwrap();
        let result = store.insert(failed).await;

        assert!(matches!(result, Err(PaymentError::ValidationError(_))));
        assert!(store.get("tx-1").await.unwrap().is_none());
        assert!(store.find_by_order_id("order-1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rocksdb_order_index_does_not_match_longer_ids() {
        let dir = tempdir().unwrap();
        let store = RocksDBStore::open(dir.path()).unwrap();
        store.insert(record("tx-1", "order-1")).await.unwrap();
        store.insert(record("tx-2", "order-1")).await.unwrap();
        store.insert(record("tx-3", "order-10")).await.unwrap();

        let found = store.find_by_order_id("order-1").await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.order_id == "order-1"));
    }
}
