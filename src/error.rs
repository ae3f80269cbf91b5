use std::time::Duration;
use thiserror::Error;

/// Result type for cast session operations
pub type Result<T> = std::result::Result<T, CastError>;

/// Errors that can occur when managing a cast session
#[derive(Error, Debug)]
pub enum CastError {
    /// Seek position was not a finite number
    #[error("seek position must be a finite number, got {0}")]
    InvalidPosition(f64),

    /// Volume level was outside the [0, 1] range
    #[error("volume level must be between 0 and 1, got {0}")]
    InvalidVolume(f64),

    /// Media descriptor was missing required fields
    #[error("invalid media descriptor: {0}")]
    InvalidMedia(String),

    /// Operation attempted with no live client connection
    #[error("no client connection is open")]
    ClientClosed,

    /// Discovery found no device or failed outright
    #[error("discovery failed: {0}")]
    Discovery(String),

    /// Transport connect to the device failed
    #[error("connect failed: {0}")]
    Connect(String),

    /// Connection was not established within the configured bound
    #[error("connection not established within {0:?}")]
    ConnectTimeout(Duration),

    /// Receiver application launch failed
    #[error("receiver launch failed: {0}")]
    Launch(String),

    /// Receiver rejected the media load
    #[error("media load rejected: {0}")]
    Load(String),

    /// Graceful stop of the receiver application failed during teardown
    #[error("graceful stop failed: {0}")]
    Stop(String),

    /// Receiver rejected a playback or volume command
    #[error("device command failed: {0}")]
    Device(String),
}

impl CastError {
    /// Check whether this error came from local input validation
    ///
    /// Validation errors are produced before any adapter call is made and
    /// never affect session state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CastError::InvalidPosition(_) | CastError::InvalidVolume(_) | CastError::InvalidMedia(_)
        )
    }
}
