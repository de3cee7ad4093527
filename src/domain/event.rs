//! Domain events emitted after a committed status change.

use super::money::Currency;
use super::payment::Metadata;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PaymentEvent {
    #[serde(rename = "payment.completed")]
    Completed {
        transaction_id: String,
        order_id: String,
        paid_amount: Decimal,
        currency: Currency,
        payment_method: Option<String>,
        payment_key: Option<String>,
        approved_at: DateTime<Utc>,
        source_service: String,
        metadata: Metadata,
    },
    #[serde(rename = "payment.failed")]
    Failed {
        transaction_id: String,
        order_id: String,
        error_code: Option<String>,
        error_message: Option<String>,
        source_service: String,
        metadata: Metadata,
    },
}

impl PaymentEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            PaymentEvent::Completed { .. } => "payment.completed",
            PaymentEvent::Failed { .. } => "payment.failed",
        }
    }

    pub fn transaction_id(&self) -> &str {
        match self {
            PaymentEvent::Completed { transaction_id, .. }
            | PaymentEvent::Failed { transaction_id, .. } => transaction_id,
        }
    }

    pub fn source_service(&self) -> &str {
        match self {
            PaymentEvent::Completed { source_service, .. }
            | PaymentEvent::Failed { source_service, .. } => source_service,
        }
    }
}

/// Envelope wrapping a payment event with delivery metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: PaymentEvent,
}

impl EventEnvelope {
    pub fn new(event: PaymentEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}
