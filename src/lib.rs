//! Rust library for managing cast sessions on streaming receivers
//!
//! This library drives a single media session on a streaming-receiver device
//! found on the local network. It supports:
//!
//! - Device discovery with a bounded search window, or direct connection to a
//!   known address
//! - Receiver-application launch and media loading
//! - Playback control (play, pause, stop, seek) and status queries
//! - Device-level volume and mute control
//! - Transparent recovery: one automatic reconnect-and-retry on a failed load,
//!   and self-healing teardown on transport errors or remote session close
//!
//! The wire-level cast protocol and the multicast discovery mechanism are not
//! implemented here; they are consumed through the [`Connector`],
//! [`DeviceClient`], [`Player`], and [`Discover`] traits, so any protocol
//! crate can be plugged in underneath.
//!
//! # Quick Start
//!
//! ```ignore
//! use cast_session::{CastSession, MediaDescriptor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Adapters come from a protocol crate implementing the device traits
//!     let session = CastSession::spawn(TcpConnector::new(), MdnsDiscover::new());
//!
//!     let media = MediaDescriptor::new("http://example.com/video.mp4", "video/mp4");
//!     let status = session.cast(media).await?;
//!     println!("Now {:?}", status.player_state);
//!
//!     session.set_volume(0.5).await?;
//!     session.pause().await?;
//!     session.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Direct Connection
//!
//! If you know the address of a device, discovery can be skipped:
//!
//! ```ignore
//! use cast_session::{DeviceAddress, MediaDescriptor, SessionOptions};
//!
//! let options = SessionOptions {
//!     target_address: Some(DeviceAddress::from_host("192.168.1.50")),
//!     ..Default::default()
//! };
//! session.cast_with(media, options).await?;
//! ```
//!
//! # Architecture
//!
//! - **Session**: `CastSession`, the public handle; validates inputs and
//!   forwards operations to the controller
//! - **Controller**: the session state machine; owns the single live
//!   client/player pair and processes operations and device events one at a
//!   time
//! - **Device**: adapter traits for the transport connection and the launched
//!   receiver application
//! - **Discovery**: adapter trait resolving a device name to an address
//! - **Types**: media descriptors, options, and status values
//!
//! A session holds at most one device connection at a time. Casting while a
//! session is live loads into it in place; casting after the session has died
//! reconnects from scratch.

mod controller;
mod device;
mod discovery;
mod error;
mod session;
#[cfg(test)]
mod testing;
mod types;

// Public exports
pub use device::{ClientEvent, Connector, DeviceClient, Player, PlayerEvent};
pub use discovery::{Discover, DiscoveryQuery};
pub use error::{CastError, Result};
pub use session::CastSession;
pub use types::{
    DeviceAddress, MediaDescriptor, MediaStatus, PlayerState, ReceiverVolume, SessionOptions,
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_DEVICE_PORT, DEFAULT_DISCOVERY_INTERVAL,
    DEFAULT_DISCOVERY_TTL,
};
