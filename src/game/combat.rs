//! Combat system - projectiles, fire cooldowns, hit detection

use super::craft::CraftId;
use super::physics::{Bounds, PhysicsSystem};

/// Distance a projectile travels per tick
pub const PROJECTILE_SPEED: f64 = 5.0;

/// A craft is hit when a shot is strictly closer than this to its center
pub const HIT_RADIUS: f64 = 20.0;

/// Ticks between shots for a human-controlled craft
pub const HUMAN_FIRE_COOLDOWN: i32 = 20;

/// Ticks between shots for the AI-controlled craft
pub const AI_FIRE_COOLDOWN: i32 = 30;

/// A live shot. Heading and speed are fixed at spawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub owner: CraftId,
    pub x: f64,
    pub y: f64,
    pub heading: f64,
    pub speed: f64,
    pub color: &'static str,
}

impl Projectile {
    pub fn new(owner: CraftId, x: f64, y: f64, heading: f64, color: &'static str) -> Self {
        Self {
            owner,
            x,
            y,
            heading,
            speed: PROJECTILE_SPEED,
            color,
        }
    }

    /// Move one tick along the spawn heading
    pub fn advance(&mut self) {
        self.x += self.heading.cos() * self.speed;
        self.y += self.heading.sin() * self.speed;
    }

    /// Shots do not wrap: once outside the playfield they are gone
    pub fn is_live(&self, bounds: &Bounds) -> bool {
        bounds.contains_strict(self.x, self.y)
    }
}

/// Combat rules shared by every craft
pub struct CombatSystem;

impl CombatSystem {
    /// Check if a craft can fire (cooldown check)
    pub fn can_fire(cooldown: i32) -> bool {
        cooldown <= 0
    }

    /// Strict inequality: a shot at exactly `HIT_RADIUS` misses
    pub fn is_hit(projectile: &Projectile, target_x: f64, target_y: f64) -> bool {
        PhysicsSystem::distance_sq(projectile.x, projectile.y, target_x, target_y)
            < HIT_RADIUS * HIT_RADIUS
    }

    /// Apply damage to health, returns (new_health, is_down)
    pub fn apply_damage(current_health: i32, hits: usize) -> (i32, bool) {
        let new_health = current_health - hits as i32;
        (new_health, new_health <= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot_at(x: f64, y: f64) -> Projectile {
        Projectile::new(CraftId::Two, x, y, 0.0, "royalblue")
    }

    #[test]
    fn advance_moves_five_units_along_heading() {
        let mut p = Projectile::new(CraftId::One, 100.0, 100.0, std::f64::consts::FRAC_PI_2, "crimson");
        p.advance();
        assert!((p.x - 100.0).abs() < 1e-9);
        assert!((p.y - 105.0).abs() < 1e-9);
    }

    #[test]
    fn liveness_is_monotonic_once_outside() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut p = Projectile::new(CraftId::One, 790.0, 300.0, 0.0, "crimson");
        assert!(p.is_live(&bounds));
        p.advance();
        p.advance();
        assert!(!p.is_live(&bounds));
        for _ in 0..50 {
            p.advance();
            assert!(!p.is_live(&bounds));
        }
    }

    #[test]
    fn hit_threshold_is_strict() {
        assert!(!CombatSystem::is_hit(&shot_at(120.0, 100.0), 100.0, 100.0));
        assert!(CombatSystem::is_hit(&shot_at(119.99, 100.0), 100.0, 100.0));
    }

    #[test]
    fn cooldown_gate() {
        assert!(CombatSystem::can_fire(0));
        assert!(CombatSystem::can_fire(-7));
        assert!(!CombatSystem::can_fire(1));
    }

    #[test]
    fn damage_reports_down_at_zero() {
        assert_eq!(CombatSystem::apply_damage(3, 1), (2, false));
        assert_eq!(CombatSystem::apply_damage(1, 1), (0, true));
        assert_eq!(CombatSystem::apply_damage(1, 2), (-1, true));
    }
}
