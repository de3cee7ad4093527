use crate::domain::money::Currency;
use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus, TransitionFields};
use crate::domain::ports::PaymentStoreBox;
use crate::error::Result;
use chrono::Utc;

/// Domain-level access to payment records.
///
/// The only code path that changes a stored record's status is
/// [`PaymentRepository::apply_transition`].
pub struct PaymentRepository {
    store: PaymentStoreBox,
    default_currency: Currency,
}

impl PaymentRepository {
    pub fn new(store: PaymentStoreBox, default_currency: Currency) -> Self {
        Self {
            store,
            default_currency,
        }
    }

    /// Inserts a new record in `CREATED`.
    ///
    /// Fails with `DuplicateTransaction` when the transaction id already exists.
    pub async fn create(&self, new: NewPayment) -> Result<PaymentRecord> {
        let record = PaymentRecord::create(new, &self.default_currency, Utc::now())?;
        self.store.insert(record.clone()).await?;
        tracing::debug!(
            transaction_id = %record.transaction_id,
            order_id = %record.order_id,
            source_service = %record.source_service,
            "payment record created"
        );
        Ok(record)
    }

    pub async fn find_by_transaction_id(&self, transaction_id: &str) -> Result<Option<PaymentRecord>> {
        self.store.get(transaction_id).await
    }

    pub async fn find_by_order_id(&self, order_id: &str) -> Result<Vec<PaymentRecord>> {
        self.store.find_by_order_id(order_id).await
    }

    pub async fn find_all(&self) -> Result<Vec<PaymentRecord>> {
        self.store.get_all().await
    }

    /// Validates and applies `to` on top of `record`, then persists it if the
    /// stored version still matches the one `record` was read at.
    ///
    /// Errors are returned unchanged; on error nothing is written.
    pub async fn apply_transition(
        &self,
        record: PaymentRecord,
        to: PaymentStatus,
        fields: TransitionFields,
    ) -> Result<PaymentRecord> {
        let expected_version = record.version();
        let from = record.status();

        let mut next = record;
        next.transition_to(to, fields, Utc::now())?;
        self.store.update(next.clone(), expected_version).await?;

        tracing::info!(
            transaction_id = %next.transaction_id,
            %from,
            %to,
            version = next.version(),
            "payment transitioned"
        );
        Ok(next)
    }
}
