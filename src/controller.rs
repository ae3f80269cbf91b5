use crate::device::{ClientEvent, Connector, DeviceClient, Player, PlayerEvent};
use crate::discovery::{Discover, DiscoveryQuery};
use crate::error::{CastError, Result};
use crate::types::{MediaDescriptor, MediaStatus, SessionOptions};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::timeout;

type ClientOf<T> = <T as Connector>::Client;
type PlayerOf<T> = <<T as Connector>::Client as DeviceClient>::Player;

type Reply<T> = oneshot::Sender<Result<T>>;

/// Operation dispatched from the public session handle
pub(crate) enum Command {
    Cast {
        media: MediaDescriptor,
        options: SessionOptions,
        reply: Reply<MediaStatus>,
    },
    Play { reply: Reply<()> },
    Pause { reply: Reply<()> },
    Stop { reply: Reply<()> },
    Seek { position: f64, reply: Reply<()> },
    SetVolume { level: f64, reply: Reply<()> },
    GetVolume { reply: Reply<f64> },
    SetMuted { muted: bool, reply: Reply<()> },
    GetMuted { reply: Reply<bool> },
    Status { reply: Reply<MediaStatus> },
    Close { reply: Reply<()> },
}

/// Asynchronous device event, stamped with the connection generation it
/// belongs to so events from a discarded connection are dropped
pub(crate) enum SessionEvent {
    TransportError { generation: u64, message: String },
    RemoteClosed { generation: u64 },
}

/// Owner of the single live client/player pair
///
/// The controller runs as one task processing commands and device events
/// strictly one at a time, so no two state-mutating operations ever overlap
/// on the same handles. Suspension happens only at the adapter boundaries.
pub(crate) struct Controller<T: Connector, D: Discover> {
    connector: T,
    discovery: D,
    client: Option<ClientOf<T>>,
    player: Option<PlayerOf<T>>,
    /// Bumped on every successful connect; stale events carry an older value
    generation: u64,
    events: mpsc::UnboundedSender<SessionEvent>,
    /// Event-forwarding tasks for the current connection
    watchers: Vec<JoinHandle<()>>,
}

impl<T: Connector, D: Discover> Controller<T, D> {
    pub(crate) fn new(connector: T, discovery: D, events: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            connector,
            discovery,
            client: None,
            player: None,
            generation: 0,
            events,
            watchers: Vec::new(),
        }
    }

    /// Process commands and device events until every session handle is gone
    pub(crate) async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut events: mpsc::UnboundedReceiver<SessionEvent>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => break,
                },
                Some(event) = events.recv() => self.handle_event(event).await,
            }
        }

        if self.client.is_some() {
            if let Err(err) = self.teardown().await {
                tracing::debug!("Teardown on shutdown failed: {}", err);
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Cast { media, options, reply } => {
                let result = self.handle_cast(media, options).await;
                let _ = reply.send(result);
            }
            Command::Play { reply } => {
                let result = match self.player_mut() {
                    Ok(player) => player.play().await,
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            Command::Pause { reply } => {
                let result = match self.player_mut() {
                    Ok(player) => player.pause().await,
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            Command::Stop { reply } => {
                let result = match self.player_mut() {
                    Ok(player) => player.stop().await,
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            Command::Seek { position, reply } => {
                let result = match self.player_mut() {
                    Ok(player) => player.seek(position).await,
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            Command::SetVolume { level, reply } => {
                let result = match self.client_mut() {
                    Ok(client) => client.set_volume(level).await,
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            Command::GetVolume { reply } => {
                let result = match self.client_mut() {
                    Ok(client) => client.volume().await.map(|volume| volume.level),
                    Err(err) => Err(err),
                };
                if let Err(err) = &result {
                    tracing::debug!("Could not get volume: {}", err);
                }
                let _ = reply.send(result);
            }
            Command::SetMuted { muted, reply } => {
                let result = match self.client_mut() {
                    Ok(client) => client.set_muted(muted).await,
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            Command::GetMuted { reply } => {
                let result = match self.client_mut() {
                    Ok(client) => client.volume().await.map(|volume| volume.muted),
                    Err(err) => Err(err),
                };
                if let Err(err) = &result {
                    tracing::debug!("Could not get mute status: {}", err);
                }
                let _ = reply.send(result);
            }
            Command::Status { reply } => {
                let result = match self.player_mut() {
                    Ok(player) => player.status().await,
                    Err(err) => Err(err),
                };
                let _ = reply.send(result);
            }
            Command::Close { reply } => {
                let result = if self.client.is_none() {
                    Err(CastError::ClientClosed)
                } else {
                    self.teardown().await
                };
                let _ = reply.send(result);
            }
        }
    }

    /// Teardown triggered by a device event; the outcome is only logged
    async fn handle_event(&mut self, event: SessionEvent) {
        let generation = match &event {
            SessionEvent::TransportError { generation, .. } => *generation,
            SessionEvent::RemoteClosed { generation } => *generation,
        };
        if generation != self.generation || self.client.is_none() {
            tracing::debug!("Ignoring event from a discarded connection");
            return;
        }

        match &event {
            SessionEvent::TransportError { message, .. } => {
                tracing::warn!("Client error: {}", message);
            }
            SessionEvent::RemoteClosed { .. } => {
                tracing::info!("Session closed by the receiver");
            }
        }

        if let Err(err) = self.teardown().await {
            tracing::warn!("Teardown after device event failed: {}", err);
        }
    }

    async fn handle_cast(&mut self, media: MediaDescriptor, options: SessionOptions) -> Result<MediaStatus> {
        // At most one reconnect-and-retry per cast call
        let mut retries = if options.retry_on_failure { 1 } else { 0 };

        loop {
            if !self.is_active() {
                if self.client.is_some() {
                    // A leftover client without a live session cannot be reused
                    self.teardown().await?;
                }
                self.establish(&options).await?;
                if media.url.trim().is_empty() {
                    // The connection stands even though nothing was loaded
                    return Err(CastError::InvalidMedia("media url is empty".to_owned()));
                }
            }

            let autoplay = options.autoplay;
            let result = match self.player_mut() {
                Ok(player) => player.load(&media, autoplay).await,
                Err(err) => Err(err),
            };
            match result {
                Ok(status) => return Ok(status),
                Err(err) if retries > 0 => {
                    retries -= 1;
                    tracing::warn!("Could not load media ({}), restarting connection", err);
                    self.teardown().await?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Resolve an address, connect under the configured bound, launch the
    /// receiver application, and attach event watchers for the new connection
    async fn establish(&mut self, options: &SessionOptions) -> Result<()> {
        let address = match &options.target_address {
            Some(address) => address.clone(),
            None => {
                let query = DiscoveryQuery {
                    ttl: options.discovery_ttl,
                    interval: options.discovery_interval,
                    target_name: options.target_name.clone(),
                    full_scan: false,
                };
                tracing::debug!("Searching for a receiver");
                self.discovery.resolve(&query).await?
            }
        };

        tracing::info!("Connecting to {}", address);
        let mut client = match timeout(options.connect_timeout, self.connector.connect(&address)).await {
            Ok(result) => result?,
            // The timeout won the race; dropping the connect future abandons
            // any partially-open transport, so a late completion is never seen
            Err(_) => return Err(CastError::ConnectTimeout(options.connect_timeout)),
        };

        self.generation += 1;
        let generation = self.generation;

        let mut client_events = client.subscribe();
        let events = self.events.clone();
        self.watchers.push(tokio::spawn(async move {
            loop {
                match client_events.recv().await {
                    Ok(ClientEvent::TransportError(message)) => {
                        let _ = events.send(SessionEvent::TransportError { generation, message });
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Client event stream lagged by {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));

        let player = match client.launch().await {
            Ok(player) => player,
            Err(err) => {
                for watcher in self.watchers.drain(..) {
                    watcher.abort();
                }
                client.close();
                return Err(err);
            }
        };

        let mut player_events = player.subscribe();
        let events = self.events.clone();
        self.watchers.push(tokio::spawn(async move {
            loop {
                match player_events.recv().await {
                    Ok(PlayerEvent::SessionClosed) => {
                        let _ = events.send(SessionEvent::RemoteClosed { generation });
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Player event stream lagged by {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));

        self.client = Some(client);
        self.player = Some(player);
        tracing::info!("Receiver session established");
        Ok(())
    }

    /// Detach watchers, gracefully stop a live session, and close the
    /// transport unconditionally
    async fn teardown(&mut self) -> Result<()> {
        tracing::debug!("Closing client");

        for watcher in self.watchers.drain(..) {
            watcher.abort();
        }

        let player = self.player.take();
        let Some(mut client) = self.client.take() else {
            return Ok(());
        };

        let result = match &player {
            Some(live) if live.session_id().is_some() => client.stop(live).await,
            _ => Ok(()),
        };
        // The transport is closed whatever the stop reported
        client.close();
        result
    }

    fn is_active(&self) -> bool {
        self.client.is_some()
            && self.player.as_ref().is_some_and(|player| player.session_id().is_some())
    }

    fn client_mut(&mut self) -> Result<&mut ClientOf<T>> {
        self.client.as_mut().ok_or(CastError::ClientClosed)
    }

    fn player_mut(&mut self) -> Result<&mut PlayerOf<T>> {
        if self.client.is_none() {
            return Err(CastError::ClientClosed);
        }
        self.player.as_mut().ok_or(CastError::ClientClosed)
    }
}
