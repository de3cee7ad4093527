use crate::domain::payment::{PaymentRecord, PaymentStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Read-only roll-up of the payments one source service initiated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub source_service: String,
    pub total_payments: usize,
    pub by_status: BTreeMap<PaymentStatus, usize>,
    /// Sum of `paid_amount` over records currently `PAID`.
    pub paid_total: Decimal,
    /// Sum of `paid_amount` over records currently `REFUNDED`.
    pub refunded_total: Decimal,
    /// Share of settled payments that were paid (refunds count as paid),
    /// as a percentage. `None` until something has settled.
    pub success_rate: Option<Decimal>,
}

impl PaymentSummary {
    pub fn from_records<'a>(
        source_service: &str,
        records: impl IntoIterator<Item = &'a PaymentRecord>,
    ) -> Self {
        let mut summary = Self {
            source_service: source_service.to_string(),
            total_payments: 0,
            by_status: BTreeMap::new(),
            paid_total: Decimal::ZERO,
            refunded_total: Decimal::ZERO,
            success_rate: None,
        };

        for record in records
            .into_iter()
            .filter(|r| r.source_service == source_service)
        {
            summary.total_payments += 1;
            *summary.by_status.entry(record.status()).or_default() += 1;
            match record.status() {
                PaymentStatus::Paid => summary.paid_total += record.paid_amount,
                PaymentStatus::Refunded => summary.refunded_total += record.paid_amount,
                _ => {}
            }
        }

        let count = |status: PaymentStatus| summary.by_status.get(&status).copied().unwrap_or(0);
        let succeeded = count(PaymentStatus::Paid) + count(PaymentStatus::Refunded);
        let settled = succeeded + count(PaymentStatus::Failed) + count(PaymentStatus::Cancelled);
        if settled > 0 {
            let rate = Decimal::from(succeeded) * Decimal::ONE_HUNDRED / Decimal::from(settled);
            summary.success_rate = Some(rate.round_dp(2));
        }

        summary
    }
}
