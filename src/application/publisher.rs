use crate::domain::event::{EventEnvelope, PaymentEvent};
use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::domain::ports::EventSinkBox;

/// Turns committed transitions into payment events for the injected sink.
///
/// Publishing is best-effort: a failing sink is logged and never reported to
/// the caller, since the record change has already been committed.
pub struct PaymentEventPublisher {
    sink: EventSinkBox,
}

impl PaymentEventPublisher {
    pub fn new(sink: EventSinkBox) -> Self {
        Self { sink }
    }

    /// Maps a record that just reached its current status to an event.
    ///
    /// Only `PAID` and `FAILED` carry a typed event.
    pub fn event_for(record: &PaymentRecord) -> Option<PaymentEvent> {
        match record.status() {
            PaymentStatus::Paid => Some(PaymentEvent::Completed {
                transaction_id: record.transaction_id.clone(),
                order_id: record.order_id.clone(),
                paid_amount: record.paid_amount,
                currency: record.currency.clone(),
                payment_method: record.payment_method.clone(),
                payment_key: record.payment_key.clone(),
                approved_at: record.paid_at().unwrap_or(record.updated_at),
                source_service: record.source_service.clone(),
                metadata: record.metadata.clone(),
            }),
            PaymentStatus::Failed => Some(PaymentEvent::Failed {
                transaction_id: record.transaction_id.clone(),
                order_id: record.order_id.clone(),
                error_code: record.failure_code.clone(),
                error_message: record.failure_reason.clone(),
                source_service: record.source_service.clone(),
                metadata: record.metadata.clone(),
            }),
            PaymentStatus::Created
            | PaymentStatus::Confirming
            | PaymentStatus::Cancelled
            | PaymentStatus::Refunded => None,
        }
    }

    /// Publishes the event for `record`, if any. Returns whether the sink
    /// accepted one.
    pub async fn publish(&self, record: &PaymentRecord) -> bool {
        let Some(event) = Self::event_for(record) else {
            tracing::debug!(
                transaction_id = %record.transaction_id,
                status = %record.status(),
                "no payment event for status"
            );
            return false;
        };

        let event_type = event.event_type();
        match self.sink.publish(EventEnvelope::new(event)).await {
            Ok(()) => {
                tracing::debug!(
                    transaction_id = %record.transaction_id,
                    event_type,
                    "payment event published"
                );
                true
            }
            Err(e) => {
                tracing::warn!(
                    transaction_id = %record.transaction_id,
                    event_type,
                    error = %e,
                    "failed to publish payment event"
                );
                false
            }
        }
    }
}
