//! Byte-stream transport (TCP, in-memory duplex)
//!
//! Splits the stream into independently locked halves so the reader task
//! never blocks senders.

use async_trait::async_trait;
use log::info;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadHalf, WriteHalf};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;

use super::{Transport, TransportError};

pub struct StreamTransport<S> {
    kind: &'static str,
    reader: Mutex<ReadHalf<S>>,
    writer: Mutex<WriteHalf<S>>,
}

impl<S> StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    pub fn new(kind: &'static str, stream: S) -> Self {
        let (reader, writer) = tokio::io::split(stream);
        Self {
            kind,
            reader: Mutex::new(reader),
            writer: Mutex::new(writer),
        }
    }
}

impl StreamTransport<TcpStream> {
    /// Connect to a TCP endpoint (SITL listens on 5760).
    pub async fn tcp(addr: impl ToSocketAddrs) -> Result<Self, TransportError> {
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!("TCP transport connected to {}", stream.peer_addr()?);
        Ok(Self::new("tcp", stream))
    }
}

#[async_trait]
impl<S> Transport for StreamTransport<S>
where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    fn kind(&self) -> &'static str {
        self.kind
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut reader = self.reader.lock().await;
        Ok(reader.read(buf).await?)
    }

    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let mut writer = self.writer.lock().await;
        writer.write_all(frame).await?;
        writer.flush().await?;
        Ok(())
    }
}
