//! In-process bus for a single viewport process or for tests.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{BusError, Envelope, MessageBus, SUBSCRIBER_BACKLOG};

/// `tokio::sync::broadcast` behind the [`MessageBus`] trait.
pub struct LocalBus {
    topic: String,
    tx: broadcast::Sender<Envelope>,
}

impl LocalBus {
    pub fn new(topic: impl Into<String>) -> Self {
        let (tx, _) = broadcast::channel(SUBSCRIBER_BACKLOG);
        Self {
            topic: topic.into(),
            tx,
        }
    }
}

#[async_trait]
impl MessageBus for LocalBus {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&self, envelope: &Envelope) -> Result<(), BusError> {
        // No subscribers is not an error: nobody is listening yet.
        let _ = self.tx.send(envelope.clone());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::OrchestrationMessage;
    use uuid::Uuid;

    #[tokio::test]
    async fn every_subscriber_receives() {
        let bus = LocalBus::new("kiosk");
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();

        let env = Envelope::new("kiosk", Uuid::new_v4(), OrchestrationMessage::Reset);
        bus.publish(&env).await.expect("publish");

        assert_eq!(a.recv().await.expect("a"), env);
        assert_eq!(b.recv().await.expect("b"), env);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let bus = LocalBus::new("kiosk");
        let env = Envelope::new("kiosk", Uuid::new_v4(), OrchestrationMessage::Reset);
        assert!(bus.publish(&env).await.is_ok());
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_messages() {
        let bus = LocalBus::new("kiosk");
        let _keepalive = bus.subscribe();
        let env = Envelope::new("kiosk", Uuid::new_v4(), OrchestrationMessage::Reset);
        bus.publish(&env).await.expect("publish");

        let mut late = bus.subscribe();
        assert!(late.try_recv().is_err());
    }
}
