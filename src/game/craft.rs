//! Craft state and per-tick integration

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::combat::{CombatSystem, Projectile, AI_FIRE_COOLDOWN, HUMAN_FIRE_COOLDOWN};
use super::physics::{Bounds, PhysicsSystem};

/// Heading change per tick for each held turn key
pub const TURN_STEP: f64 = 0.05;

/// Velocity added per tick while thrust is held
pub const THRUST_ACCEL: f64 = 0.05;

/// Health at spawn
pub const START_HEALTH: i32 = 3;

/// Which of the two crafts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CraftId {
    One,
    Two,
}

impl CraftId {
    pub fn index(self) -> usize {
        match self {
            CraftId::One => 0,
            CraftId::Two => 1,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            CraftId::One => "crimson",
            CraftId::Two => "royalblue",
        }
    }
}

/// Who drives a craft. Decides the cooldown set after a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pilot {
    Human,
    Ai,
}

impl Pilot {
    pub fn fire_cooldown(self) -> i32 {
        match self {
            Pilot::Human => HUMAN_FIRE_COOLDOWN,
            Pilot::Ai => AI_FIRE_COOLDOWN,
        }
    }
}

/// One tick of steering intent, produced by key input or by the AI
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CraftCommand {
    /// Signed heading change in radians (positive turns right)
    pub turn: f64,
    /// Acceleration magnitude along the heading after the turn
    pub thrust: f64,
    pub fire: bool,
}

impl CraftCommand {
    /// Translate held keys into a command using the human step sizes
    pub fn from_keys(turn_left: bool, turn_right: bool, thrust: bool, fire: bool) -> Self {
        let mut turn = 0.0;
        if turn_left {
            turn -= TURN_STEP;
        }
        if turn_right {
            turn += TURN_STEP;
        }
        Self {
            turn,
            thrust: if thrust { THRUST_ACCEL } else { 0.0 },
            fire,
        }
    }
}

/// Spawn pose for a craft
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub x: f64,
    pub y: f64,
    pub heading: f64,
}

impl Spawn {
    /// Craft one starts a quarter across facing right, craft two three quarters across facing left
    pub fn for_craft(id: CraftId, bounds: &Bounds) -> Self {
        match id {
            CraftId::One => Self {
                x: bounds.width * 0.25,
                y: bounds.height / 2.0,
                heading: 0.0,
            },
            CraftId::Two => Self {
                x: bounds.width * 0.75,
                y: bounds.height / 2.0,
                heading: PI,
            },
        }
    }
}

/// A spacecraft and the shots it has in flight
#[derive(Debug, Clone)]
pub struct Craft {
    pub id: CraftId,
    pub pilot: Pilot,
    pub label: String,
    pub color: &'static str,

    // Position and movement
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub heading: f64,

    // Combat
    pub cooldown: i32,
    pub health: i32,
    pub projectiles: Vec<Projectile>,
}

impl Craft {
    pub fn new(id: CraftId, pilot: Pilot, label: impl Into<String>, spawn: Spawn) -> Self {
        Self {
            id,
            pilot,
            label: label.into(),
            color: id.color(),
            x: spawn.x,
            y: spawn.y,
            vel_x: 0.0,
            vel_y: 0.0,
            heading: spawn.heading,
            cooldown: 0,
            health: START_HEALTH,
            projectiles: Vec::new(),
        }
    }

    /// Human control path. Returns true if a shot was spawned.
    pub fn apply_input(
        &mut self,
        turn_left: bool,
        turn_right: bool,
        thrust: bool,
        fire: bool,
    ) -> bool {
        self.apply_command(CraftCommand::from_keys(turn_left, turn_right, thrust, fire))
    }

    /// Turn, thrust along the new heading, then fire if the cooldown allows.
    /// Returns true if a shot was spawned.
    pub fn apply_command(&mut self, command: CraftCommand) -> bool {
        self.heading += command.turn;

        if command.thrust != 0.0 {
            self.vel_x += self.heading.cos() * command.thrust;
            self.vel_y += self.heading.sin() * command.thrust;
        }

        if command.fire && CombatSystem::can_fire(self.cooldown) {
            self.fire();
            self.cooldown = self.pilot.fire_cooldown();
            return true;
        }

        false
    }

    fn fire(&mut self) {
        self.projectiles
            .push(Projectile::new(self.id, self.x, self.y, self.heading, self.color));
    }

    /// Cooldown tick, drag, move, then edge wrap against the current bounds
    pub fn integrate(&mut self, bounds: &Bounds) {
        // May go negative; only the <= 0 check matters
        self.cooldown -= 1;

        let (x, y, vel_x, vel_y) = PhysicsSystem::step(self.x, self.y, self.vel_x, self.vel_y);
        let (x, y) = PhysicsSystem::wrap(x, y, bounds);

        self.x = x;
        self.y = y;
        self.vel_x = vel_x;
        self.vel_y = vel_y;
    }

    /// Advance every shot, then drop the ones that left the playfield
    pub fn update_projectiles(&mut self, bounds: &Bounds) {
        for projectile in self.projectiles.iter_mut() {
            projectile.advance();
        }
        self.projectiles.retain(|p| p.is_live(bounds));
    }

    /// Take every incoming shot that is within the hit radius.
    /// Hitting shots are removed from `incoming` and returned in their original order.
    pub fn take_hits(&mut self, incoming: &mut Vec<Projectile>) -> Vec<Projectile> {
        let (hits, misses): (Vec<Projectile>, Vec<Projectile>) = incoming
            .drain(..)
            .partition(|p| CombatSystem::is_hit(p, self.x, self.y));
        *incoming = misses;

        if !hits.is_empty() {
            let (health, _) = CombatSystem::apply_damage(self.health, hits.len());
            self.health = health;
        }

        hits
    }

    pub fn is_down(&self) -> bool {
        self.health <= 0
    }

    /// Back to spawn defaults: position, zero velocity, heading, full health, no shots
    pub fn reset(&mut self, spawn: Spawn) {
        self.x = spawn.x;
        self.y = spawn.y;
        self.vel_x = 0.0;
        self.vel_y = 0.0;
        self.heading = spawn.heading;
        self.cooldown = 0;
        self.health = START_HEALTH;
        self.projectiles.clear();
    }
}
