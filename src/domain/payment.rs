use super::money::{Amount, Currency};
use super::state_machine;
use crate::error::{PaymentError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Opaque gateway-specific fields. Never interpreted by this crate.
pub type Metadata = BTreeMap<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Created,
    Confirming,
    Paid,
    Failed,
    Cancelled,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 6] = [
        PaymentStatus::Created,
        PaymentStatus::Confirming,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Cancelled,
        PaymentStatus::Refunded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Confirming => "CONFIRMING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Whether a payment in this status is still waiting on the gateway.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Created | Self::Confirming)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| PaymentError::ValidationError(format!("Unknown payment status: {s}")))
    }
}

/// Fields supplied by the caller when a payment is initiated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub transaction_id: String,
    pub order_id: String,
    pub amount: Decimal,
    pub currency: Option<Currency>,
    pub payment_method: Option<String>,
    pub source_service: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl NewPayment {
    pub fn new(
        transaction_id: impl Into<String>,
        order_id: impl Into<String>,
        amount: Decimal,
        source_service: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            order_id: order_id.into(),
            amount,
            currency: None,
            payment_method: None,
            source_service: source_service.into(),
            metadata: Metadata::new(),
        }
    }
}

/// Additional fields merged into a record alongside a status change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransitionFields {
    pub payment_key: Option<String>,
    pub paid_amount: Option<Decimal>,
    pub payment_method: Option<String>,
    pub failure_code: Option<String>,
    pub failure_reason: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl TransitionFields {
    pub fn with_payment_key(payment_key: impl Into<String>) -> Self {
        Self {
            payment_key: Some(payment_key.into()),
            ..Self::default()
        }
    }

    pub fn with_failure(code: Option<String>, reason: impl Into<String>) -> Self {
        Self {
            failure_code: code,
            failure_reason: Some(reason.into()),
            ..Self::default()
        }
    }
}

/// One payment attempt for one order, from one source service.
///
/// `status`, the milestone timestamps and `version` are only changed through
/// [`PaymentRecord::transition_to`], which validates against the state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: Uuid,
    pub transaction_id: String,
    pub order_id: String,
    status: PaymentStatus,
    pub amount: Amount,
    pub paid_amount: Decimal,
    pub currency: Currency,
    pub payment_method: Option<String>,
    pub payment_key: Option<String>,
    pub source_service: String,
    pub metadata: Metadata,
    pub failure_code: Option<String>,
    pub failure_reason: Option<String>,
    pub requested_at: DateTime<Utc>,
    paid_at: Option<DateTime<Utc>>,
    failed_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    refunded_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    version: u64,
}

impl PaymentRecord {
    /// Builds a fresh record in `CREATED` from caller input.
    pub fn create(
        new: NewPayment,
        default_currency: &Currency,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if new.transaction_id.trim().is_empty() {
            return Err(PaymentError::ValidationError(
                "Transaction id must not be empty".to_string(),
            ));
        }
        if new.source_service.trim().is_empty() {
            return Err(PaymentError::ValidationError(
                "Source service must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            transaction_id: new.transaction_id,
            order_id: new.order_id,
            status: PaymentStatus::Created,
            amount: Amount::new(new.amount)?,
            paid_amount: Decimal::ZERO,
            currency: new.currency.unwrap_or_else(|| default_currency.clone()),
            payment_method: new.payment_method,
            payment_key: None,
            source_service: new.source_service,
            metadata: new.metadata,
            failure_code: None,
            failure_reason: None,
            requested_at: now,
            paid_at: None,
            failed_at: None,
            cancelled_at: None,
            refunded_at: None,
            updated_at: now,
            version: 0,
        })
    }

    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn paid_at(&self) -> Option<DateTime<Utc>> {
        self.paid_at
    }

    pub fn failed_at(&self) -> Option<DateTime<Utc>> {
        self.failed_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn refunded_at(&self) -> Option<DateTime<Utc>> {
        self.refunded_at
    }

    /// Moves the record to `to`, stamping the matching milestone and merging
    /// `fields`. The record is left untouched when the transition is illegal.
    pub fn transition_to(
        &mut self,
        to: PaymentStatus,
        fields: TransitionFields,
        now: DateTime<Utc>,
    ) -> Result<()> {
        state_machine::assert_transition(self.status, to)?;

        let paid_amount = match fields.paid_amount {
            Some(value) if value < Decimal::ZERO => {
                return Err(PaymentError::ValidationError(
                    "Paid amount must not be negative".to_string(),
                ));
            }
            other => other,
        };

        self.paid_at = None;
        self.failed_at = None;
        self.cancelled_at = None;
        self.refunded_at = None;
        match to {
            PaymentStatus::Paid => {
                self.paid_at = Some(now);
                self.paid_amount = paid_amount.unwrap_or_else(|| self.amount.value());
            }
            PaymentStatus::Failed => self.failed_at = Some(now),
            PaymentStatus::Cancelled => self.cancelled_at = Some(now),
            PaymentStatus::Refunded => self.refunded_at = Some(now),
            PaymentStatus::Created | PaymentStatus::Confirming => {}
        }

        if let Some(key) = fields.payment_key {
            self.payment_key = Some(key);
        }
        if let Some(method) = fields.payment_method {
            self.payment_method = Some(method);
        }
        if let Some(code) = fields.failure_code {
            self.failure_code = Some(code);
        }
        if let Some(reason) = fields.failure_reason {
            self.failure_reason = Some(reason);
        }
        self.metadata.extend(fields.metadata);

        self.status = to;
        self.updated_at = now;
        self.version += 1;
        Ok(())
    }

    /// The milestone timestamp matching the current status, if it has one.
    pub fn milestone_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            PaymentStatus::Paid => self.paid_at,
            PaymentStatus::Failed => self.failed_at,
            PaymentStatus::Cancelled => self.cancelled_at,
            PaymentStatus::Refunded => self.refunded_at,
            PaymentStatus::Created | PaymentStatus::Confirming => None,
        }
    }

    /// Fails unless the record is still as `create` built it: `CREATED`,
    /// version 0, no milestone set. Stores call this on `insert`, since a
    /// deserialized record can carry any status.
    pub fn ensure_new(&self) -> Result<()> {
        if self.status == PaymentStatus::Created && self.version == 0 && self.milestones_consistent()
        {
            Ok(())
        } else {
            Err(PaymentError::ValidationError(format!(
                "Only new CREATED records can be inserted: {} is {} at version {}",
                self.transaction_id, self.status, self.version
            )))
        }
    }

    /// Checks that exactly the milestone matching `status` is set.
    pub fn milestones_consistent(&self) -> bool {
        let set = [
            self.paid_at,
            self.failed_at,
            self.cancelled_at,
            self.refunded_at,
        ]
        .iter()
        .filter(|ts| ts.is_some())
        .count();

        match self.status {
            PaymentStatus::Created | PaymentStatus::Confirming => set == 0,
            _ => set == 1 && self.milestone_at().is_some(),
        }
    }
}
