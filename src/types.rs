use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Default control port for streaming receivers
pub const DEFAULT_DEVICE_PORT: u16 = 8009;

/// Default time window to keep searching for a device
pub const DEFAULT_DISCOVERY_TTL: Duration = Duration::from_millis(22_000);

/// Default polling interval between discovery queries
pub const DEFAULT_DISCOVERY_INTERVAL: Duration = Duration::from_millis(4_000);

/// Default bound on transport connection establishment
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Network address of a streaming receiver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAddress {
    pub host: String,
    pub port: u16,
}

impl DeviceAddress {
    /// Create an address from a host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Create an address on the default receiver port
    pub fn from_host(host: impl Into<String>) -> Self {
        Self::new(host, DEFAULT_DEVICE_PORT)
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Configuration for a single cast call
///
/// A `SessionOptions` value is immutable for the duration of the call it is
/// passed to. The automatic reconnect-and-retry on a failed load is bounded
/// internally; the options value is never modified in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// How long discovery keeps searching before giving up
    pub discovery_ttl: Duration,

    /// Poll interval between discovery queries
    pub discovery_interval: Duration,

    /// Only accept a device with this friendly name
    pub target_name: Option<String>,

    /// Connect directly to this address, skipping discovery entirely
    pub target_address: Option<DeviceAddress>,

    /// Start playback as soon as the media is loaded
    pub autoplay: bool,

    /// Reconnect and retry once if a media load fails
    pub retry_on_failure: bool,

    /// Bound on transport connection establishment
    pub connect_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            discovery_ttl: DEFAULT_DISCOVERY_TTL,
            discovery_interval: DEFAULT_DISCOVERY_INTERVAL,
            target_name: None,
            target_address: None,
            autoplay: true,
            retry_on_failure: true,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Description of a media item to load on the receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDescriptor {
    /// Content URL the receiver will fetch
    pub url: String,

    /// MIME type of the content
    pub content_type: String,

    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Free-form metadata forwarded to the receiver
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl MediaDescriptor {
    /// Create a descriptor from a URL and content type
    pub fn new(url: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            content_type: content_type.into(),
            title: None,
            metadata: None,
        }
    }

    /// Set the display title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Attach free-form metadata
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// Playback state reported by the receiver application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerState {
    #[default]
    Idle,
    Buffering,
    Playing,
    Paused,
}

/// Playback status snapshot reported by the receiver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaStatus {
    /// Current playback state
    pub player_state: PlayerState,

    /// Playback position in seconds
    #[serde(default)]
    pub position: f64,

    /// Media currently loaded, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<MediaDescriptor>,
}

/// Device-level volume snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReceiverVolume {
    /// Volume level between 0 and 1
    pub level: f64,

    /// Whether the device is muted
    pub muted: bool,
}

impl Default for ReceiverVolume {
    fn default() -> Self {
        Self {
            level: 1.0,
            muted: false,
        }
    }
}
