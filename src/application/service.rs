use super::publisher::PaymentEventPublisher;
use super::repository::PaymentRepository;
use super::summary::PaymentSummary;
use crate::config::PaymentConfig;
use crate::domain::payment::{NewPayment, PaymentRecord, PaymentStatus, TransitionFields};
use crate::domain::ports::{EventSinkBox, PaymentStoreBox};
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};

/// The entry point business services call to create and advance payments.
///
/// `PaymentService` owns the repository and the event publisher. Share it
/// across tasks behind an `Arc`; per-record ordering is enforced by the store.
pub struct PaymentService {
    repository: PaymentRepository,
    publisher: PaymentEventPublisher,
}

impl PaymentService {
    /// Creates a new `PaymentService`.
    ///
    /// # Arguments
    ///
    /// * `store` - The backend holding payment records.
    /// * `sink` - Where payment events are delivered.
    /// * `config` - Defaults applied to new payments.
    pub fn new(store: PaymentStoreBox, sink: EventSinkBox, config: &PaymentConfig) -> Self {
        Self {
            repository: PaymentRepository::new(store, config.default_currency.clone()),
            publisher: PaymentEventPublisher::new(sink),
        }
    }

    /// Registers a new payment attempt in `CREATED`.
    ///
    /// A retried request with a known transaction id fails with
    /// `DuplicateTransaction`; callers should then fetch the existing record.
    pub async fn create_payment(&self, new: NewPayment) -> Result<PaymentRecord> {
        self.repository.create(new).await
    }

    /// Requests a status change for the payment with `transaction_id`.
    ///
    /// The returned record is what was committed. Event delivery happens after
    /// the commit and cannot fail this call.
    pub async fn transition(
        &self,
        transaction_id: &str,
        to: PaymentStatus,
        fields: TransitionFields,
    ) -> Result<PaymentRecord> {
        let record = self.get_payment(transaction_id).await?;
        let updated = self.repository.apply_transition(record, to, fields).await?;
        self.publisher.publish(&updated).await;
        Ok(updated)
    }

    /// Fails with `RecordNotFound` when no payment has this transaction id.
    pub async fn get_payment(&self, transaction_id: &str) -> Result<PaymentRecord> {
        self.repository
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| PaymentError::RecordNotFound(transaction_id.to_string()))
    }

    /// All attempts for an order, oldest first. Fails with `RecordNotFound`
    /// when the order has none.
    pub async fn payments_for_order(&self, order_id: &str) -> Result<Vec<PaymentRecord>> {
        let records = self.repository.find_by_order_id(order_id).await?;
        if records.is_empty() {
            return Err(PaymentError::RecordNotFound(format!("order {order_id}")));
        }
        Ok(records)
    }

    pub async fn all_payments(&self) -> Result<Vec<PaymentRecord>> {
        let mut records = self.repository.find_all().await?;
        records.sort_by(|a, b| a.transaction_id.cmp(&b.transaction_id));
        Ok(records)
    }

    pub async fn summary_for_source(&self, source_service: &str) -> Result<PaymentSummary> {
        let records = self.repository.find_all().await?;
        Ok(PaymentSummary::from_records(source_service, &records))
    }

    /// Payments still waiting on the gateway that were requested before
    /// `cutoff`, oldest first. A reconciliation job moves them on with
    /// [`PaymentService::transition`].
    pub async fn stale_in_flight(&self, cutoff: DateTime<Utc>) -> Result<Vec<PaymentRecord>> {
        let mut stale: Vec<PaymentRecord> = self
            .repository
            .find_all()
            .await?
            .into_iter()
            .filter(|r| r.status().is_in_flight() && r.requested_at < cutoff)
            .collect();
        stale.sort_by_key(|r| r.requested_at);
        Ok(stale)
    }
}
