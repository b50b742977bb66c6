//! UDP transport
//!
//! Binds a local port and learns the vehicle endpoint from the first
//! datagram received. Until then outbound frames are silently dropped,
//! unless a fixed peer was given at construction.
//!
//! # Example
//!
//! ```no_run
//! use groundlink::communication::mavlink::transport::UdpTransport;
//!
//! # async fn run() -> Result<(), groundlink::error::TransportError> {
//! let transport = UdpTransport::bind(("0.0.0.0", 14550)).await?;
//! # Ok(())
//! # }
//! ```

use std::net::SocketAddr;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use log::{debug, info};
use tokio::net::{ToSocketAddrs, UdpSocket};

use super::{Transport, TransportError};

/// Standard ground-station listening port.
pub const MAVLINK_UDP_PORT: u16 = 14550;

pub struct UdpTransport {
    socket: UdpSocket,
    peer: Mutex<Option<SocketAddr>>,
}

impl UdpTransport {
    /// Bind and wait for the vehicle to speak first.
    pub async fn bind(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(addr).await?;
        debug!("UDP transport bound to {}", socket.local_addr()?);
        Ok(Self {
            socket,
            peer: Mutex::new(None),
        })
    }

    /// Bind and send to `peer` from the start.
    pub async fn connect(
        local: impl ToSocketAddrs,
        peer: SocketAddr,
    ) -> Result<Self, TransportError> {
        let transport = Self::bind(local).await?;
        *transport.lock_peer() = Some(peer);
        Ok(transport)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        Ok(self.socket.local_addr()?)
    }

    /// Endpoint frames are sent to, if known.
    pub fn peer(&self) -> Option<SocketAddr> {
        *self.lock_peer()
    }

    fn lock_peer(&self) -> std::sync::MutexGuard<'_, Option<SocketAddr>> {
        self.peer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Transport for UdpTransport {
    fn kind(&self) -> &'static str {
        "udp"
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        loop {
            let (len, from) = self.socket.recv_from(buf).await?;
            {
                let mut peer = self.lock_peer();
                if peer.is_none() {
                    info!("UDP peer discovered at {from}");
                    *peer = Some(from);
                }
            }
            // An empty datagram would read as end of stream
            if len > 0 {
                return Ok(len);
            }
        }
    }

    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let Some(peer) = self.peer() else {
            return Ok(());
        };
        self.socket.send_to(frame, peer).await?;
        Ok(())
    }
}
