//! Game sessions: one local match per connection, driven by a fixed tick loop

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::util::time::{snapshot_interval, tick_delta};
use crate::ws::protocol::{ClientMsg, GameMode, ServerMsg};

use super::input::KeyState;
use super::physics::Bounds;
use super::r#match::DEFAULT_ROUND_END_DELAY;
use super::snapshot::SnapshotBuilder;
use super::MatchState;

/// Per-session match settings taken from the server config
#[derive(Debug, Clone, Copy)]
pub struct SessionSettings {
    pub round_end_delay: Duration,
    /// Fixed seed for the AI random source; random per match when unset
    pub seed: Option<u64>,
}

impl SessionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            round_end_delay: config.round_end_delay,
            seed: config.match_seed,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            round_end_delay: DEFAULT_ROUND_END_DELAY,
            seed: None,
        }
    }
}

/// Handle to a running session
#[derive(Clone)]
pub struct SessionHandle {
    pub id: Uuid,
    pub input_tx: mpsc::Sender<ClientMsg>,
    pub snapshot_tx: broadcast::Sender<ServerMsg>,
    in_match: Arc<AtomicBool>,
}

impl SessionHandle {
    /// True once a mode was picked and the match is running
    pub fn in_match(&self) -> bool {
        self.in_match.load(Ordering::Relaxed)
    }
}

/// Registry of all live sessions
pub struct SessionRegistry {
    sessions: DashMap<Uuid, SessionHandle>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn insert(&self, handle: SessionHandle) {
        self.sessions.insert(handle.id, handle);
    }

    pub fn remove(&self, id: &Uuid) -> Option<SessionHandle> {
        self.sessions.remove(id).map(|(_, h)| h)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn running_matches(&self) -> usize {
        self.sessions.iter().filter(|s| s.value().in_match()).count()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The session task: owns the key state, the viewport and the match.
/// Nothing here is shared; inputs arrive by channel and are drained once per tick.
pub struct GameSession {
    id: Uuid,
    settings: SessionSettings,
    game: Option<MatchState>,
    keys: KeyState,
    viewport: Bounds,
    input_rx: mpsc::Receiver<ClientMsg>,
    snapshot_tx: broadcast::Sender<ServerMsg>,
    snapshot_builder: SnapshotBuilder,
    in_match: Arc<AtomicBool>,
}

impl GameSession {
    /// Create a new session
    pub fn new(id: Uuid, settings: SessionSettings) -> (Self, SessionHandle) {
        let (input_tx, input_rx) = mpsc::channel(256);
        let (snapshot_tx, _) = broadcast::channel(64);
        let in_match = Arc::new(AtomicBool::new(false));

        let handle = SessionHandle {
            id,
            input_tx,
            snapshot_tx: snapshot_tx.clone(),
            in_match: in_match.clone(),
        };

        let session = Self {
            id,
            settings,
            game: None,
            keys: KeyState::new(),
            viewport: Bounds::default(),
            input_rx,
            snapshot_tx,
            snapshot_builder: SnapshotBuilder::new(snapshot_interval()),
            in_match,
        };

        (session, handle)
    }

    /// Run the tick loop until the client leaves
    pub async fn run(mut self) {
        info!(session_id = %self.id, "Session started");

        let mut tick_interval = interval(tick_delta());
        tick_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            // Drain input queue
            if !self.process_inputs() {
                break;
            }

            self.run_tick();
        }

        self.in_match.store(false, Ordering::Relaxed);
        info!(
            session_id = %self.id,
            rounds = self.game.as_ref().map(|g| g.round).unwrap_or(0),
            "Session ended"
        );
    }

    /// Apply every pending client message. Returns false once the client is gone.
    fn process_inputs(&mut self) -> bool {
        loop {
            match self.input_rx.try_recv() {
                Ok(msg) => {
                    if !self.handle_msg(msg) {
                        return false;
                    }
                }
                Err(TryRecvError::Empty) => return true,
                Err(TryRecvError::Disconnected) => {
                    debug!(session_id = %self.id, "Input channel closed");
                    return false;
                }
            }
        }
    }

    fn handle_msg(&mut self, msg: ClientMsg) -> bool {
        match msg {
            ClientMsg::StartMatch { mode } => self.handle_start(mode),
            ClientMsg::KeyDown { key } => self.keys.key_down(&key),
            ClientMsg::KeyUp { key } => self.keys.key_up(&key),
            ClientMsg::ReleaseKeys => self.keys.release_all(),
            ClientMsg::Resize { width, height } => self.handle_resize(width, height),
            ClientMsg::Ping { t } => {
                let _ = self.snapshot_tx.send(ServerMsg::Pong { t });
            }
            ClientMsg::LeaveMatch => {
                info!(session_id = %self.id, "Client left");
                return false;
            }
        }
        true
    }

    /// Mode selection. Only reachable before the match exists.
    fn handle_start(&mut self, mode: GameMode) {
        if self.game.is_some() {
            warn!(session_id = %self.id, "Start requested mid-match, ignoring");
            let _ = self.snapshot_tx.send(ServerMsg::Error {
                code: "match_in_progress".to_string(),
                message: "A match is already running in this session".to_string(),
            });
            return;
        }

        let seed = self.settings.seed.unwrap_or_else(rand::random);
        let game = MatchState::start(mode, self.viewport, self.settings.round_end_delay, seed);

        let _ = self.snapshot_tx.send(ServerMsg::MatchStarted {
            mode,
            tick: game.tick,
        });

        info!(
            session_id = %self.id,
            mode = ?mode,
            seed,
            width = self.viewport.width,
            height = self.viewport.height,
            "Match started"
        );

        self.game = Some(game);
        self.in_match.store(true, Ordering::Relaxed);
        self.snapshot_builder.force_next();
    }

    fn handle_resize(&mut self, width: f64, height: f64) {
        let bounds = Bounds::new(width, height);
        if bounds.is_valid() {
            self.viewport = bounds;
        } else {
            warn!(session_id = %self.id, width, height, "Ignoring invalid viewport size");
        }
    }

    /// Run a single simulation tick and publish a snapshot when due
    fn run_tick(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };

        let events = game.tick(&self.keys.snapshot(), self.viewport, tick_delta());
        self.snapshot_builder.queue_events(events);

        if self.snapshot_builder.should_send() {
            let snapshot = self.snapshot_builder.build(&*game);
            // No receivers just means the client is between reconnects
            let _ = self.snapshot_tx.send(snapshot);
        }
    }
}
