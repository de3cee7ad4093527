use crate::domain::event::EventEnvelope;
use crate::domain::ports::EventSink;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Bridges payment events into a `tokio::sync::broadcast` hub.
///
/// Downstream consumers (fulfillment, commission, notification) call
/// [`BroadcastEventSink::subscribe`]. Events published while nobody is
/// subscribed are dropped; lagging receivers see `Lagged` on their next recv.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    sender: broadcast::Sender<EventEnvelope>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl EventSink for BroadcastEventSink {
    async fn publish(&self, envelope: EventEnvelope) -> Result<()> {
        match self.sender.send(envelope) {
            Ok(receivers) => {
                tracing::trace!(receivers, "payment event broadcast");
            }
            Err(broadcast::error::SendError(envelope)) => {
                tracing::debug!(
                    event_id = %envelope.id,
                    "no subscribers for payment event, dropping"
                );
            }
        }
        Ok(())
    }
}
