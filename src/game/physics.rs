//! Craft physics: playfield bounds, drag and edge wrapping

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Velocity multiplier applied on both axes every tick
pub const DAMPING: f64 = 0.98;

/// Playfield size, sampled from the viewport every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Strictly inside (0, width) x (0, height)
    pub fn contains_strict(&self, x: f64, y: f64) -> bool {
        x > 0.0 && x < self.width && y > 0.0 && y < self.height
    }

    /// A viewport report is usable only if both sides are positive and finite
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

/// Physics system for craft motion
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Apply drag, then move by the damped velocity.
    /// Returns (new_x, new_y, new_vel_x, new_vel_y)
    pub fn step(x: f64, y: f64, vel_x: f64, vel_y: f64) -> (f64, f64, f64, f64) {
        let new_vel_x = vel_x * DAMPING;
        let new_vel_y = vel_y * DAMPING;
        (x + new_vel_x, y + new_vel_y, new_vel_x, new_vel_y)
    }

    /// Snap a coordinate that left [0, extent] onto the opposite edge.
    /// Not a modulo: -1 becomes `extent`, `extent + 1` becomes 0.
    pub fn wrap_edge(value: f64, extent: f64) -> f64 {
        if value < 0.0 {
            extent
        } else if value > extent {
            0.0
        } else {
            value
        }
    }

    /// Wrap a position on both axes
    pub fn wrap(x: f64, y: f64, bounds: &Bounds) -> (f64, f64) {
        (
            Self::wrap_edge(x, bounds.width),
            Self::wrap_edge(y, bounds.height),
        )
    }

    /// Signed difference `to - from` wrapped into a single turn around zero.
    /// An exact half turn comes out as -PI.
    pub fn angle_diff(to: f64, from: f64) -> f64 {
        (to - from + 3.0 * PI).rem_euclid(TAU) - PI
    }

    /// Squared distance between two points
    pub fn distance_sq(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        let dx = x2 - x1;
        let dy = y2 - y1;
        dx * dx + dy * dy
    }
}
