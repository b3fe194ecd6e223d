//! UDP peer bus connecting viewport processes on one kiosk.
//!
//! Each viewport binds its own `listen` address and sends every envelope
//! as one JSON datagram to each configured peer.  A background task decodes
//! inbound datagrams and fans them out to subscribers; datagrams that fail
//! to parse or carry another topic are dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::BusConfig;

use super::{BusError, Envelope, MessageBus, SUBSCRIBER_BACKLOG};

const MAX_DATAGRAM: usize = 64 * 1024;

pub struct UdpBus {
    topic: String,
    socket: Arc<UdpSocket>,
    peers: Vec<SocketAddr>,
    tx: broadcast::Sender<Envelope>,
    reader: JoinHandle<()>,
}

impl UdpBus {
    pub async fn bind(config: &BusConfig) -> Result<Self, BusError> {
        Self::bind_with(config.listen, config.peers.clone(), &config.topic).await
    }

    pub async fn bind_with(
        listen: SocketAddr,
        peers: Vec<SocketAddr>,
        topic: &str,
    ) -> Result<Self, BusError> {
        let socket = Arc::new(UdpSocket::bind(listen).await?);
        let (tx, _) = broadcast::channel(SUBSCRIBER_BACKLOG);

        let reader = tokio::spawn(read_loop(
            Arc::clone(&socket),
            topic.to_string(),
            tx.clone(),
        ));

        log::info!(
            "bus: listening on {} with {} peer(s), topic {topic:?}",
            socket.local_addr()?,
            peers.len()
        );

        Ok(Self {
            topic: topic.to_string(),
            socket,
            peers,
            tx,
            reader,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, BusError> {
        Ok(self.socket.local_addr()?)
    }
}

impl Drop for UdpBus {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

async fn read_loop(socket: Arc<UdpSocket>, topic: String, tx: broadcast::Sender<Envelope>) {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let (len, from) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                // ICMP port-unreachable from a peer that is down shows up here
                log::debug!("bus: receive error: {e}");
                continue;
            }
        };

        match serde_json::from_slice::<Envelope>(&buf[..len]) {
            Ok(envelope) if envelope.topic == topic => {
                let _ = tx.send(envelope);
            }
            Ok(envelope) => {
                log::trace!("bus: dropped datagram for topic {:?}", envelope.topic);
            }
            Err(e) => {
                log::debug!("bus: malformed datagram from {from}: {e}");
            }
        }
    }
}

#[async_trait]
impl MessageBus for UdpBus {
    fn topic(&self) -> &str {
        &self.topic
    }

    async fn publish(&self, envelope: &Envelope) -> Result<(), BusError> {
        let payload = serde_json::to_vec(envelope)?;

        let mut first_error = None;
        for peer in &self.peers {
            if let Err(e) = self.socket.send_to(&payload, peer).await {
                log::debug!("bus: send to {peer} failed: {e}");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(BusError::Io(e)),
            None => Ok(()),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }
}
