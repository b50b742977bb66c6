//! Byte transports for the link
//!
//! The link reads and writes raw bytes; framing happens above this layer.
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │   Link (decoder, handlers, sender)   │
//! └──────────┬───────────────────────────┘
//!            │ Arc<dyn Transport>
//!            ▼
//! ┌──────────────┬────────────────────┬─────────────────┐
//! │ UdpTransport │ StreamTransport<S> │ SerialTransport │
//! │ (datagrams)  │ (TCP, duplex)      │ (device node)   │
//! └──────────────┴────────────────────┴─────────────────┘
//! ```
//!
//! Implementations are shared between the reader task and every sender,
//! so both methods take `&self`.

pub mod serial;
pub mod stream;
pub mod udp;

use async_trait::async_trait;

pub use crate::error::TransportError;
pub use serial::SerialTransport;
pub use stream::StreamTransport;
pub use udp::UdpTransport;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Short label used in log lines ("udp", "tcp", ...).
    fn kind(&self) -> &'static str;

    /// Read available bytes into `buf`.
    ///
    /// Waits until at least one byte arrives. `Ok(0)` means the peer
    /// closed the stream and no more data will follow.
    async fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write one complete frame.
    async fn send(&self, frame: &[u8]) -> Result<(), TransportError>;
}
