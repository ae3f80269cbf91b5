use crate::controller::{Command, Controller};
use crate::device::Connector;
use crate::discovery::Discover;
use crate::error::{CastError, Result};
use crate::types::{MediaDescriptor, MediaStatus, SessionOptions};
use tokio::sync::{mpsc, oneshot};

const COMMAND_QUEUE_DEPTH: usize = 16;

/// Handle to a cast session controller
///
/// A `CastSession` drives a single receiver session: it discovers or connects
/// to a device on the first `cast`, reuses the live session for subsequent
/// calls, and tears it down on `close` or when the last handle is dropped.
///
/// The handle is cheap to clone; all clones talk to the same controller task,
/// which processes operations one at a time. Operations issued concurrently
/// queue behind each other rather than interleave.
#[derive(Clone)]
pub struct CastSession {
    commands: mpsc::Sender<Command>,
}

impl CastSession {
    /// Spawn a session controller over the given adapters
    ///
    /// Must be called from within a tokio runtime; the controller runs as a
    /// background task until every `CastSession` clone has been dropped.
    pub fn spawn<T, D>(connector: T, discovery: D) -> Self
    where
        T: Connector,
        D: Discover,
    {
        let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE_DEPTH);
        let (events, event_rx) = mpsc::unbounded_channel();
        let controller = Controller::new(connector, discovery, events);
        tokio::spawn(controller.run(command_rx, event_rx));

        Self { commands }
    }

    /// Cast media with default options
    pub async fn cast(&self, media: MediaDescriptor) -> Result<MediaStatus> {
        self.cast_with(media, SessionOptions::default()).await
    }

    /// Cast media with explicit options
    ///
    /// Loads into the live session when one exists; otherwise resolves a
    /// device (unless `target_address` is set), connects, and launches the
    /// receiver application first. A failed load triggers one
    /// reconnect-and-retry when `retry_on_failure` is enabled.
    pub async fn cast_with(&self, media: MediaDescriptor, options: SessionOptions) -> Result<MediaStatus> {
        self.request(|reply| Command::Cast { media, options, reply }).await
    }

    /// Resume playback
    pub async fn play(&self) -> Result<()> {
        self.request(|reply| Command::Play { reply }).await
    }

    /// Pause playback
    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| Command::Pause { reply }).await
    }

    /// Stop playback
    pub async fn stop(&self) -> Result<()> {
        self.request(|reply| Command::Stop { reply }).await
    }

    /// Seek to a position in seconds
    pub async fn seek(&self, position: f64) -> Result<()> {
        if !position.is_finite() {
            return Err(CastError::InvalidPosition(position));
        }
        self.request(|reply| Command::Seek { position, reply }).await
    }

    /// Set the device volume level, between 0 and 1
    pub async fn set_volume(&self, level: f64) -> Result<()> {
        if !level.is_finite() || !(0.0..=1.0).contains(&level) {
            return Err(CastError::InvalidVolume(level));
        }
        self.request(|reply| Command::SetVolume { level, reply }).await
    }

    /// Get the device volume level
    pub async fn volume(&self) -> Result<f64> {
        self.request(|reply| Command::GetVolume { reply }).await
    }

    /// Set the device mute state
    pub async fn set_muted(&self, muted: bool) -> Result<()> {
        self.request(|reply| Command::SetMuted { muted, reply }).await
    }

    /// Get the device mute state
    pub async fn muted(&self) -> Result<bool> {
        self.request(|reply| Command::GetMuted { reply }).await
    }

    /// Query the current playback status
    pub async fn status(&self) -> Result<MediaStatus> {
        self.request(|reply| Command::Status { reply }).await
    }

    /// Tear the session down: gracefully stop a live receiver application,
    /// then close the transport
    pub async fn close(&self) -> Result<()> {
        self.request(|reply| Command::Close { reply }).await
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R>>) -> Command,
    ) -> Result<R> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .await
            .map_err(|_| CastError::ClientClosed)?;
        response.await.map_err(|_| CastError::ClientClosed)?
    }
}
