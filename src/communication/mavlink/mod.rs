//! MAVLink Ground-Station Link
//!
//! This module implements the host side of a MAVLink link to a single
//! autopilot: it discovers the vehicle, downloads and writes parameters,
//! sends flight commands and publishes fused telemetry.
//!
//! # Architecture
//!
//! - **Transport**: byte I/O over UDP, TCP or a serial device
//! - **Link**: reader task, lifecycle, public handle
//! - **Dispatcher**: routes decoded frames to handlers
//! - **Sender**: frames outbound messages with the GCS identity
//! - **Handlers**: parameter, telemetry, command and status logic
//! - **State**: the single lock shared by all of the above
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use groundlink::communication::mavlink::{transport::UdpTransport, Link};
//! use groundlink::config::LinkConfig;
//!
//! # async fn run() -> Result<(), groundlink::error::TransportError> {
//! let transport = UdpTransport::bind(("0.0.0.0", 14550)).await?;
//! let link = Link::start(Arc::new(transport), LinkConfig::default());
//! link.request_param_list().await;
//! # Ok(())
//! # }
//! ```

mod dispatcher; // Message dispatcher (routing to handlers)
pub mod handlers; // Message handlers
pub mod link; // Link service and handle
pub mod sender; // Outbound framing
pub mod state; // Shared link state
pub mod transport; // Transport abstraction layer

#[cfg(test)]
pub(crate) mod testing;

pub use link::{CloseReason, Link, LinkEvent};
