//! Scripted mock adapters for exercising the session controller
//!
//! `MockNet` stands in for the device and discovery libraries: every adapter
//! call is counted, results can be scripted per call through queues (empty
//! queue means success), and out-of-band events can be injected through the
//! per-connection broadcast channels.

use crate::device::{ClientEvent, Connector, DeviceClient, Player, PlayerEvent};
use crate::discovery::{Discover, DiscoveryQuery};
use crate::error::Result;
use crate::types::{DeviceAddress, MediaDescriptor, MediaStatus, PlayerState, ReceiverVolume};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Default)]
struct Counters {
    resolves: AtomicUsize,
    connects: AtomicUsize,
    connect_completions: AtomicUsize,
    launches: AtomicUsize,
    loads: AtomicUsize,
    plays: AtomicUsize,
    pauses: AtomicUsize,
    player_stops: AtomicUsize,
    seeks: AtomicUsize,
    statuses: AtomicUsize,
    graceful_stops: AtomicUsize,
    closes: AtomicUsize,
    volume_sets: AtomicUsize,
    volume_gets: AtomicUsize,
}

#[derive(Default)]
struct Scripts {
    resolve: Mutex<VecDeque<Result<DeviceAddress>>>,
    connect: Mutex<VecDeque<Result<()>>>,
    launch: Mutex<VecDeque<Result<()>>>,
    load: Mutex<VecDeque<Result<MediaStatus>>>,
    stop: Mutex<VecDeque<Result<()>>>,
    command: Mutex<VecDeque<Result<()>>>,
    volume: Mutex<VecDeque<Result<ReceiverVolume>>>,
}

#[derive(Default)]
struct NetState {
    counters: Counters,
    scripts: Scripts,
    connect_delay: Mutex<Option<Duration>>,
    volume: Mutex<ReceiverVolume>,
    clients: Mutex<Vec<broadcast::Sender<ClientEvent>>>,
    players: Mutex<Vec<broadcast::Sender<PlayerEvent>>>,
    sessions: Mutex<Vec<Arc<Mutex<Option<String>>>>>,
    last_address: Mutex<Option<DeviceAddress>>,
    last_query: Mutex<Option<DiscoveryQuery>>,
}

/// Shared scripted network standing behind mock adapters
#[derive(Clone, Default)]
pub(crate) struct MockNet {
    state: Arc<NetState>,
}

impl MockNet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn connector(&self) -> MockConnector {
        MockConnector {
            state: self.state.clone(),
        }
    }

    pub(crate) fn discover(&self) -> MockDiscover {
        MockDiscover {
            state: self.state.clone(),
        }
    }

    // ---- scripting ----

    pub(crate) fn push_resolve(&self, result: Result<DeviceAddress>) {
        self.state.scripts.resolve.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_connect(&self, result: Result<()>) {
        self.state.scripts.connect.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_launch(&self, result: Result<()>) {
        self.state.scripts.launch.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_load(&self, result: Result<MediaStatus>) {
        self.state.scripts.load.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_stop(&self, result: Result<()>) {
        self.state.scripts.stop.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_command(&self, result: Result<()>) {
        self.state.scripts.command.lock().unwrap().push_back(result);
    }

    pub(crate) fn push_volume(&self, result: Result<ReceiverVolume>) {
        self.state.scripts.volume.lock().unwrap().push_back(result);
    }

    pub(crate) fn set_connect_delay(&self, delay: Duration) {
        *self.state.connect_delay.lock().unwrap() = Some(delay);
    }

    /// Drop the session identifier of the given player, making it inactive
    pub(crate) fn kill_session(&self, index: usize) {
        self.state.sessions.lock().unwrap()[index]
            .lock()
            .unwrap()
            .take();
    }

    // ---- event injection ----

    pub(crate) fn client_events(&self, index: usize) -> broadcast::Sender<ClientEvent> {
        self.state.clients.lock().unwrap()[index].clone()
    }

    pub(crate) fn player_events(&self, index: usize) -> broadcast::Sender<PlayerEvent> {
        self.state.players.lock().unwrap()[index].clone()
    }

    // ---- observations ----

    pub(crate) fn last_address(&self) -> Option<DeviceAddress> {
        self.state.last_address.lock().unwrap().clone()
    }

    pub(crate) fn last_query(&self) -> Option<DiscoveryQuery> {
        self.state.last_query.lock().unwrap().clone()
    }

    pub(crate) fn volume_state(&self) -> ReceiverVolume {
        *self.state.volume.lock().unwrap()
    }

    pub(crate) fn resolves(&self) -> usize {
        self.state.counters.resolves.load(Ordering::SeqCst)
    }

    pub(crate) fn connects(&self) -> usize {
        self.state.counters.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn connect_completions(&self) -> usize {
        self.state.counters.connect_completions.load(Ordering::SeqCst)
    }

    pub(crate) fn launches(&self) -> usize {
        self.state.counters.launches.load(Ordering::SeqCst)
    }

    pub(crate) fn loads(&self) -> usize {
        self.state.counters.loads.load(Ordering::SeqCst)
    }

    pub(crate) fn plays(&self) -> usize {
        self.state.counters.plays.load(Ordering::SeqCst)
    }

    pub(crate) fn pauses(&self) -> usize {
        self.state.counters.pauses.load(Ordering::SeqCst)
    }

    pub(crate) fn player_stops(&self) -> usize {
        self.state.counters.player_stops.load(Ordering::SeqCst)
    }

    pub(crate) fn seeks(&self) -> usize {
        self.state.counters.seeks.load(Ordering::SeqCst)
    }

    pub(crate) fn statuses(&self) -> usize {
        self.state.counters.statuses.load(Ordering::SeqCst)
    }

    pub(crate) fn graceful_stops(&self) -> usize {
        self.state.counters.graceful_stops.load(Ordering::SeqCst)
    }

    pub(crate) fn closes(&self) -> usize {
        self.state.counters.closes.load(Ordering::SeqCst)
    }

    pub(crate) fn volume_sets(&self) -> usize {
        self.state.counters.volume_sets.load(Ordering::SeqCst)
    }

    pub(crate) fn volume_gets(&self) -> usize {
        self.state.counters.volume_gets.load(Ordering::SeqCst)
    }
}

pub(crate) struct MockDiscover {
    state: Arc<NetState>,
}

#[async_trait]
impl Discover for MockDiscover {
    async fn resolve(&mut self, query: &DiscoveryQuery) -> Result<DeviceAddress> {
        self.state.counters.resolves.fetch_add(1, Ordering::SeqCst);
        *self.state.last_query.lock().unwrap() = Some(query.clone());

        let scripted = self.state.scripts.resolve.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(DeviceAddress::new("10.0.0.5", 8009)),
        }
    }
}

pub(crate) struct MockConnector {
    state: Arc<NetState>,
}

#[async_trait]
impl Connector for MockConnector {
    type Client = MockClient;

    async fn connect(&mut self, address: &DeviceAddress) -> Result<MockClient> {
        self.state.counters.connects.fetch_add(1, Ordering::SeqCst);
        *self.state.last_address.lock().unwrap() = Some(address.clone());

        let delay = *self.state.connect_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.state.scripts.connect.lock().unwrap().pop_front();
        if let Some(result) = scripted {
            result?;
        }

        self.state.counters.connect_completions.fetch_add(1, Ordering::SeqCst);
        let (events, _) = broadcast::channel(16);
        self.state.clients.lock().unwrap().push(events.clone());

        Ok(MockClient {
            state: self.state.clone(),
            events,
            open: true,
        })
    }
}

pub(crate) struct MockClient {
    state: Arc<NetState>,
    events: broadcast::Sender<ClientEvent>,
    open: bool,
}

#[async_trait]
impl DeviceClient for MockClient {
    type Player = MockPlayer;

    async fn launch(&mut self) -> Result<MockPlayer> {
        self.state.counters.launches.fetch_add(1, Ordering::SeqCst);

        let scripted = self.state.scripts.launch.lock().unwrap().pop_front();
        if let Some(result) = scripted {
            result?;
        }

        let (events, _) = broadcast::channel(16);
        let index = self.state.players.lock().unwrap().len();
        let session = Arc::new(Mutex::new(Some(format!("session-{}", index))));
        self.state.players.lock().unwrap().push(events.clone());
        self.state.sessions.lock().unwrap().push(session.clone());

        Ok(MockPlayer {
            state: self.state.clone(),
            session,
            events,
        })
    }

    async fn stop(&mut self, _player: &MockPlayer) -> Result<()> {
        self.state.counters.graceful_stops.fetch_add(1, Ordering::SeqCst);
        self.state
            .scripts
            .stop
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.state.counters.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn set_volume(&mut self, level: f64) -> Result<()> {
        self.state.counters.volume_sets.fetch_add(1, Ordering::SeqCst);
        self.state.volume.lock().unwrap().level = level;
        Ok(())
    }

    async fn set_muted(&mut self, muted: bool) -> Result<()> {
        self.state.counters.volume_sets.fetch_add(1, Ordering::SeqCst);
        self.state.volume.lock().unwrap().muted = muted;
        Ok(())
    }

    async fn volume(&mut self) -> Result<ReceiverVolume> {
        self.state.counters.volume_gets.fetch_add(1, Ordering::SeqCst);
        let scripted = self.state.scripts.volume.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(*self.state.volume.lock().unwrap()),
        }
    }

    fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.events.subscribe()
    }
}

pub(crate) struct MockPlayer {
    state: Arc<NetState>,
    session: Arc<Mutex<Option<String>>>,
    events: broadcast::Sender<PlayerEvent>,
}

impl MockPlayer {
    fn pop_command(&self) -> Result<()> {
        self.state
            .scripts
            .command
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()))
    }
}

#[async_trait]
impl Player for MockPlayer {
    fn session_id(&self) -> Option<String> {
        self.session.lock().unwrap().clone()
    }

    async fn load(&mut self, media: &MediaDescriptor, autoplay: bool) -> Result<MediaStatus> {
        self.state.counters.loads.fetch_add(1, Ordering::SeqCst);

        let scripted = self.state.scripts.load.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => Ok(MediaStatus {
                player_state: if autoplay {
                    PlayerState::Playing
                } else {
                    PlayerState::Paused
                },
                position: 0.0,
                media: Some(media.clone()),
            }),
        }
    }

    async fn play(&mut self) -> Result<()> {
        self.state.counters.plays.fetch_add(1, Ordering::SeqCst);
        self.pop_command()
    }

    async fn pause(&mut self) -> Result<()> {
        self.state.counters.pauses.fetch_add(1, Ordering::SeqCst);
        self.pop_command()
    }

    async fn stop(&mut self) -> Result<()> {
        self.state.counters.player_stops.fetch_add(1, Ordering::SeqCst);
        self.pop_command()
    }

    async fn seek(&mut self, _position: f64) -> Result<()> {
        self.state.counters.seeks.fetch_add(1, Ordering::SeqCst);
        self.pop_command()
    }

    async fn status(&mut self) -> Result<MediaStatus> {
        self.state.counters.statuses.fetch_add(1, Ordering::SeqCst);
        Ok(MediaStatus {
            player_state: PlayerState::Playing,
            position: 0.0,
            media: None,
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}
