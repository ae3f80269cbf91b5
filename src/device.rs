use crate::error::Result;
use crate::types::{DeviceAddress, MediaDescriptor, MediaStatus, ReceiverVolume};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Out-of-band event emitted by a device client after connect
#[derive(Debug, Clone)]
pub enum ClientEvent {
    /// The transport connection failed
    TransportError(String),
}

/// Out-of-band event emitted by a player handle
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// The receiver-side session was closed remotely
    SessionClosed,
}

/// Factory for device client connections
///
/// A connector opens the transport to a receiver at a given address and hands
/// back a connected [`DeviceClient`]. The session controller calls it once per
/// connect sequence; a dropped connect future must abandon any partially-open
/// transport.
#[async_trait]
pub trait Connector: Send + 'static {
    type Client: DeviceClient;

    /// Open a transport connection to the device at `address`
    async fn connect(&mut self, address: &DeviceAddress) -> Result<Self::Client>;
}

/// Live transport connection to a streaming receiver
///
/// Implementations wrap the wire-level cast protocol. The session controller
/// owns at most one client at a time and subscribes to its event channel for
/// the lifetime of the connection.
#[async_trait]
pub trait DeviceClient: Send + 'static {
    type Player: Player;

    /// Launch the receiver application, yielding a player handle
    async fn launch(&mut self) -> Result<Self::Player>;

    /// Gracefully stop the receiver application behind `player`
    async fn stop(&mut self, player: &Self::Player) -> Result<()>;

    /// Close the transport connection
    ///
    /// Synchronous and idempotent; closing an already-closed client is a no-op.
    fn close(&mut self);

    /// Set the device volume level (0 to 1)
    async fn set_volume(&mut self, level: f64) -> Result<()>;

    /// Set the device mute state
    async fn set_muted(&mut self, muted: bool) -> Result<()>;

    /// Query the device volume state
    async fn volume(&mut self) -> Result<ReceiverVolume>;

    /// Subscribe to out-of-band transport events
    fn subscribe(&self) -> broadcast::Receiver<ClientEvent>;
}

/// Handle to a launched receiver-application session
#[async_trait]
pub trait Player: Send + Sync + 'static {
    /// Identifier of the underlying session; `None` once the session has ended
    fn session_id(&self) -> Option<String>;

    /// Load media into the session
    async fn load(&mut self, media: &MediaDescriptor, autoplay: bool) -> Result<MediaStatus>;

    /// Resume playback
    async fn play(&mut self) -> Result<()>;

    /// Pause playback
    async fn pause(&mut self) -> Result<()>;

    /// Stop playback
    async fn stop(&mut self) -> Result<()>;

    /// Seek to a position in seconds
    async fn seek(&mut self, position: f64) -> Result<()>;

    /// Query the current playback status
    async fn status(&mut self) -> Result<MediaStatus>;

    /// Subscribe to out-of-band session events
    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent>;
}
