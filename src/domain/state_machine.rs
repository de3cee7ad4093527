//! Legal status transitions for a payment record.
//!
//! The table is fixed at compile time. Readers only ever receive copies of it.

use super::payment::PaymentStatus;
use crate::error::{PaymentError, Result};

fn table(from: PaymentStatus) -> &'static [PaymentStatus] {
    use PaymentStatus::*;

    match from {
        Created => &[Confirming, Cancelled, Failed],
        Confirming => &[Paid, Failed],
        Paid => &[Refunded],
        Failed | Cancelled | Refunded => &[],
    }
}

pub fn can_transition(from: PaymentStatus, to: PaymentStatus) -> bool {
    table(from).contains(&to)
}

/// Fails with [`PaymentError::InvalidTransition`] unless `from -> to` is in the table.
pub fn assert_transition(from: PaymentStatus, to: PaymentStatus) -> Result<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(PaymentError::InvalidTransition { from, to })
    }
}

/// A status is terminal when it has no outgoing transitions.
pub fn is_terminal_status(status: PaymentStatus) -> bool {
    table(status).is_empty()
}

pub fn allowed_transitions(from: PaymentStatus) -> Vec<PaymentStatus> {
    table(from).to_vec()
}
