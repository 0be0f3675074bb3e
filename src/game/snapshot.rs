//! Render snapshot building

use rand::Rng;

use crate::ws::protocol::{CraftSnapshot, GameEvent, ProjectileSnapshot, ServerMsg};

use super::craft::Craft;
use super::{MatchPhase, MatchState};

/// Builds render snapshots for the client, throttled to a tick interval
pub struct SnapshotBuilder {
    /// Tick counter since last snapshot
    ticks_since_snapshot: u32,
    /// Snapshot interval in ticks
    snapshot_interval: u32,
    /// Events waiting for the next snapshot
    pending_events: Vec<GameEvent>,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
            pending_events: Vec::new(),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Force snapshot on next check (used for round changes)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }

    /// Hold events until the next snapshot goes out
    pub fn queue_events(&mut self, events: Vec<GameEvent>) {
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::RoundEnded { .. } | GameEvent::RoundReset { .. }))
        {
            self.force_next();
        }
        self.pending_events.extend(events);
    }

    /// Build a snapshot message, draining queued events
    pub fn build<R: Rng>(&mut self, game: &MatchState<R>) -> ServerMsg {
        let banner = match game.phase {
            MatchPhase::RoundEnd => game.winner_label().map(|label| format!("{label} wins")),
            MatchPhase::Running => None,
        };

        ServerMsg::Snapshot {
            tick: game.tick,
            round: game.round,
            phase: game.phase,
            mode: game.mode,
            crafts: game.crafts.iter().map(craft_snapshot).collect(),
            banner,
            events: std::mem::take(&mut self.pending_events),
        }
    }
}

fn craft_snapshot(craft: &Craft) -> CraftSnapshot {
    CraftSnapshot {
        id: craft.id,
        label: craft.label.clone(),
        color: craft.color.to_string(),
        x: craft.x,
        y: craft.y,
        heading: craft.heading,
        vel_x: craft.vel_x,
        vel_y: craft.vel_y,
        health: craft.health,
        cooldown: craft.cooldown,
        projectiles: craft
            .projectiles
            .iter()
            .map(|p| ProjectileSnapshot {
                x: p.x,
                y: p.y,
                color: p.color.to_string(),
            })
            .collect(),
    }
}
