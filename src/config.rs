use crate::domain::money::Currency;

/// Settings owned by the payment core. Connection settings belong to the host.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Currency applied when a new payment does not name one.
    pub default_currency: Currency,
    /// Buffer size of the broadcast hub used by `BroadcastEventSink`.
    pub event_capacity: usize,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            default_currency: Currency::default(),
            event_capacity: 1024,
        }
    }
}
