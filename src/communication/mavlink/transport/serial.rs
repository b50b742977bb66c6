//! Serial device transport
//!
//! `serialport` handles are blocking, so every read and write runs on the
//! blocking pool. The port is cloned into a read handle and a write handle
//! with their own locks: a read waiting for the vehicle never holds up a
//! send. Reads use a short timeout and are reissued until bytes arrive.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::info;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use super::{Transport, TransportError};
use crate::config::SerialSettings;

pub struct SerialTransport<R = Box<dyn SerialPort>, W = Box<dyn SerialPort>> {
    reader: Arc<Mutex<R>>,
    writer: Arc<Mutex<W>>,
}

impl SerialTransport {
    /// Open `path` at the configured baud rate, 8N1 without flow control.
    pub fn open(path: &str, settings: &SerialSettings) -> Result<Self, TransportError> {
        let port = serialport::new(path, settings.baud)
            .timeout(settings.read_timeout())
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .flow_control(FlowControl::None)
            .open()
            .map_err(io::Error::from)?;
        let writer = port.try_clone().map_err(io::Error::from)?;
        info!("Serial transport opened {path} at {} baud", settings.baud);
        Ok(Self::from_halves(port, writer))
    }
}

impl<R, W> SerialTransport<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    /// Build from two handles onto the same device.
    ///
    /// `reader` should be configured with a read timeout so an idle line
    /// releases the blocking thread periodically.
    pub fn from_halves(reader: R, writer: W) -> Self {
        Self {
            reader: Arc::new(Mutex::new(reader)),
            writer: Arc::new(Mutex::new(writer)),
        }
    }
}

/// Read errors that only mean "nothing yet".
fn is_idle(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

#[async_trait]
impl<R, W> Transport for SerialTransport<R, W>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    fn kind(&self) -> &'static str {
        "serial"
    }

    async fn recv(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let capacity = buf.len();
        loop {
            let reader = Arc::clone(&self.reader);
            let chunk = tokio::task::spawn_blocking(
                move || -> Result<Option<Vec<u8>>, TransportError> {
                    let mut port = reader.lock().map_err(|_| TransportError::Disconnected)?;
                    let mut chunk = vec![0u8; capacity];
                    match port.read(&mut chunk) {
                        Ok(n) => {
                            chunk.truncate(n);
                            Ok(Some(chunk))
                        }
                        Err(err) if is_idle(&err) => Ok(None),
                        Err(err) => Err(err.into()),
                    }
                },
            )
            .await
            .map_err(|_| TransportError::Disconnected)??;

            if let Some(chunk) = chunk {
                buf[..chunk.len()].copy_from_slice(&chunk);
                return Ok(chunk.len());
            }
        }
    }

    async fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        let writer = Arc::clone(&self.writer);
        let frame = frame.to_vec();
        tokio::task::spawn_blocking(move || -> Result<(), TransportError> {
            let mut port = writer.lock().map_err(|_| TransportError::Disconnected)?;
            port.write_all(&frame)?;
            port.flush()?;
            Ok(())
        })
        .await
        .map_err(|_| TransportError::Disconnected)?
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::net::UnixStream;
    use std::time::Duration;

    /// Socket pair standing in for a device: the transport side reads with
    /// a timeout like an opened serial port.
    fn device_pair() -> (SerialTransport<UnixStream, UnixStream>, UnixStream) {
        let (local, vehicle) = UnixStream::pair().unwrap();
        local.set_read_timeout(Some(Duration::from_millis(50))).unwrap();
        vehicle.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let writer = local.try_clone().unwrap();
        (SerialTransport::from_halves(local, writer), vehicle)
    }

    #[tokio::test]
    async fn test_send_completes_while_recv_pending() {
        let (transport, mut vehicle) = device_pair();
        let transport = Arc::new(transport);

        let reader = Arc::clone(&transport);
        let pending = tokio::spawn(async move {
            let mut buf = [0u8; 16];
            let n = reader.recv(&mut buf).await.unwrap();
            buf[..n].to_vec()
        });
        // Longer than the read timeout, so the reader has gone idle at least once
        tokio::time::sleep(Duration::from_millis(120)).await;

        tokio::time::timeout(Duration::from_secs(2), transport.send(&[0xFD, 1, 2]))
            .await
            .expect("send waited behind the pending read")
            .unwrap();
        let mut buf = [0u8; 8];
        let n = vehicle.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0xFD, 1, 2]);

        vehicle.write_all(&[7, 7]).unwrap();
        assert_eq!(pending.await.unwrap(), vec![7, 7]);
    }

    #[tokio::test]
    async fn test_closed_device_reads_zero() {
        let (transport, vehicle) = device_pair();
        assert_eq!(transport.kind(), "serial");
        drop(vehicle);

        let mut buf = [0u8; 8];
        assert_eq!(transport.recv(&mut buf).await.unwrap(), 0);
    }

    #[test]
    fn test_missing_device_is_io_error() {
        let err = SerialTransport::open("/dev/groundlink-missing", &SerialSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, TransportError::Io(_)));
    }
}
