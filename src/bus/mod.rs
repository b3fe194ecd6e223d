//! Cross-viewport broadcast channel.
//!
//! Viewports never share memory; they stay consistent only by reacting to
//! [`OrchestrationMessage`]s.  Delivery is at-least-once, unordered, with no
//! acknowledgment and no persistence: a viewport that subscribes late never
//! sees earlier messages.
//!
//! * [`LocalBus`]: in-process `tokio::sync::broadcast`.
//! * [`UdpBus`]: JSON datagrams to every configured peer.
//!
//! Every [`Envelope`] carries the sender's origin id so receivers can drop
//! their own messages.

pub mod local;
pub mod message;
pub mod udp;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

pub use local::LocalBus;
pub use message::{Envelope, OrchestrationMessage};
pub use udp::UdpBus;

/// Capacity of each subscriber's backlog before old messages are dropped.
pub const SUBSCRIBER_BACKLOG: usize = 64;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("bus socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode bus message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A named broadcast topic.
#[async_trait]
pub trait MessageBus: Send + Sync {
    fn topic(&self) -> &str;

    /// Fire-and-forget send to every viewport on the topic.
    async fn publish(&self, envelope: &Envelope) -> Result<(), BusError>;

    /// Receive every envelope published after this call.
    fn subscribe(&self) -> broadcast::Receiver<Envelope>;
}
