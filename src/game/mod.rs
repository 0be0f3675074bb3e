//! Game simulation modules

pub mod ai;
pub mod combat;
pub mod craft;
pub mod input;
pub mod r#match;
pub mod physics;
pub mod session;
pub mod snapshot;

pub use r#match::{MatchPhase, MatchState};
pub use session::{GameSession, SessionHandle, SessionRegistry, SessionSettings};

/// Held actions for one craft during a single tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CraftInput {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    pub fire: bool,
}

/// Input state for a single tick, indexed by craft
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub crafts: [CraftInput; 2],
}
