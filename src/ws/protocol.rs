//! WebSocket protocol message definitions
//! These are the wire types between the canvas client and its game session

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::craft::CraftId;
use crate::game::MatchPhase;

/// Who flies craft two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// Two people sharing one keyboard
    VersusHuman,
    /// Craft two is flown by the computer
    VersusAi,
}

impl Default for GameMode {
    fn default() -> Self {
        Self::VersusAi
    }
}

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Pick a mode and begin the match. Only accepted once per session.
    StartMatch { mode: GameMode },

    /// A key went down, named as the browser reports it (`KeyboardEvent.key`)
    KeyDown { key: String },

    /// A key was released
    KeyUp { key: String },

    /// Drop every held key (window lost focus)
    ReleaseKeys,

    /// The canvas was resized
    Resize { width: f64, height: f64 },

    /// Ping for latency measurement
    Ping {
        /// Client timestamp
        t: u64,
    },

    /// Leave and end the session
    LeaveMatch,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Welcome message after connection
    Welcome {
        session_id: Uuid,
        server_time: u64,
        /// Simulation ticks per second
        tick_rate: u32,
    },

    /// Match has started
    MatchStarted { mode: GameMode, tick: u64 },

    /// Render state (sent at regular intervals)
    Snapshot {
        tick: u64,
        round: u32,
        phase: MatchPhase,
        mode: GameMode,
        crafts: Vec<CraftSnapshot>,
        /// End-of-round banner text, present during round end
        banner: Option<String>,
        /// Events that occurred since last snapshot
        events: Vec<GameEvent>,
    },

    /// Error message
    Error { code: String, message: String },

    /// Pong response
    Pong {
        /// Echo back client timestamp
        t: u64,
    },
}

/// Craft state in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftSnapshot {
    pub id: CraftId,
    pub label: String,
    pub color: String,
    pub x: f64,
    pub y: f64,
    /// Heading in radians
    pub heading: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub health: i32,
    /// Ticks until the next shot is allowed (<= 0 = can fire)
    pub cooldown: i32,
    pub projectiles: Vec<ProjectileSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    pub x: f64,
    pub y: f64,
    pub color: String,
}

/// Game events (shots, hits, round changes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Projectile fired
    Shot {
        shooter: CraftId,
        x: f64,
        y: f64,
        heading: f64,
    },

    /// Hit registered
    Hit {
        shooter: CraftId,
        target: CraftId,
        x: f64,
        y: f64,
    },

    /// A craft went down
    RoundEnded {
        round: u32,
        winner: CraftId,
        winner_label: String,
    },

    /// Both crafts back at spawn, play resumes
    RoundReset { round: u32 },
}
