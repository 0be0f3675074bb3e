//! Reactive pursuit AI for the computer-controlled craft

use rand::Rng;

use super::combat::CombatSystem;
use super::craft::{Craft, CraftCommand};
use super::physics::PhysicsSystem;

/// Heading change per tick while steering toward the target
pub const AI_TURN_STEP: f64 = 0.03;

/// Acceleration when the AI thrusts
pub const AI_THRUST_ACCEL: f64 = 0.03;

/// Chance per tick that the AI thrusts
pub const AI_THRUST_CHANCE: f64 = 0.7;

/// Bearing error beyond which the AI turns
pub const STEER_DEADBAND: f64 = 0.1;

/// Bearing error below which the AI shoots
pub const FIRE_CONE: f64 = 0.2;

/// Proportional steering: point at the target, thrust most ticks, shoot when lined up.
/// No memory between ticks beyond the craft's own cooldown.
pub struct AiController;

impl AiController {
    pub fn decide<R: Rng>(me: &Craft, target: &Craft, rng: &mut R) -> CraftCommand {
        let bearing = (target.y - me.y).atan2(target.x - me.x);
        let diff = PhysicsSystem::angle_diff(bearing, me.heading);

        let turn = if diff > STEER_DEADBAND {
            AI_TURN_STEP
        } else if diff < -STEER_DEADBAND {
            -AI_TURN_STEP
        } else {
            0.0
        };

        let thrust = if rng.gen::<f64>() < AI_THRUST_CHANCE {
            AI_THRUST_ACCEL
        } else {
            0.0
        };

        CraftCommand {
            turn,
            thrust,
            fire: diff.abs() < FIRE_CONE && CombatSystem::can_fire(me.cooldown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::craft::{CraftId, Pilot, Spawn};
    use rand::rngs::mock::StepRng;

    fn craft(id: CraftId, x: f64, y: f64, heading: f64) -> Craft {
        Craft::new(id, Pilot::Ai, "Computer", Spawn { x, y, heading })
    }

    /// Every draw is 0.0, so the thrust roll always succeeds
    fn always_thrust() -> StepRng {
        StepRng::new(0, 0)
    }

    /// Every draw is just under 1.0, so the thrust roll always fails
    fn never_thrust() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    #[test]
    fn lined_up_with_small_right_error_fires_and_turns_right() {
        // Target sits 0.15 rad clockwise of the heading
        let me = craft(CraftId::Two, 0.0, 0.0, 0.0);
        let target = craft(CraftId::One, 100.0 * 0.15f64.cos(), 100.0 * 0.15f64.sin(), 0.0);

        let cmd = AiController::decide(&me, &target, &mut never_thrust());

        assert!(cmd.fire);
        assert_eq!(cmd.turn, AI_TURN_STEP);
        assert_eq!(cmd.thrust, 0.0);
    }

    #[test]
    fn target_to_the_left_turns_left_without_firing() {
        let me = craft(CraftId::Two, 100.0, 100.0, 0.0);
        let target = craft(CraftId::One, 100.0, 0.0, 0.0);

        let cmd = AiController::decide(&me, &target, &mut never_thrust());

        assert_eq!(cmd.turn, -AI_TURN_STEP);
        assert!(!cmd.fire);
    }

    #[test]
    fn inside_deadband_holds_heading() {
        let me = craft(CraftId::Two, 0.0, 0.0, 0.05);
        let target = craft(CraftId::One, 100.0, 0.0, 0.0);

        let cmd = AiController::decide(&me, &target, &mut never_thrust());

        assert_eq!(cmd.turn, 0.0);
        assert!(cmd.fire);
    }

    #[test]
    fn pending_cooldown_blocks_fire() {
        let mut me = craft(CraftId::Two, 0.0, 0.0, 0.0);
        me.cooldown = 4;
        let target = craft(CraftId::One, 100.0, 0.0, 0.0);

        let cmd = AiController::decide(&me, &target, &mut never_thrust());

        assert!(!cmd.fire);
    }

    #[test]
    fn thrust_follows_the_random_draw() {
        let me = craft(CraftId::Two, 0.0, 0.0, 0.0);
        let target = craft(CraftId::One, 100.0, 0.0, 0.0);

        let cmd = AiController::decide(&me, &target, &mut always_thrust());
        assert_eq!(cmd.thrust, AI_THRUST_ACCEL);

        let cmd = AiController::decide(&me, &target, &mut never_thrust());
        assert_eq!(cmd.thrust, 0.0);
    }

    #[test]
    fn target_behind_wraps_the_bearing_error() {
        // Heading almost a full turn around; the target straight ahead at angle 0
        let me = craft(CraftId::Two, 0.0, 0.0, std::f64::consts::TAU - 0.05);
        let target = craft(CraftId::One, 100.0, 0.0, 0.0);

        let cmd = AiController::decide(&me, &target, &mut never_thrust());

        assert_eq!(cmd.turn, 0.0);
        assert!(cmd.fire);
    }

    #[test]
    fn applied_decision_sets_ai_cooldown() {
        let mut me = craft(CraftId::Two, 0.0, 0.0, 0.0);
        let target = craft(CraftId::One, 100.0, 0.0, 0.0);

        let cmd = AiController::decide(&me, &target, &mut always_thrust());
        assert!(me.apply_command(cmd));

        assert_eq!(me.cooldown, crate::game::combat::AI_FIRE_COOLDOWN);
        assert_eq!(me.projectiles.len(), 1);
        assert!((me.vel_x - AI_THRUST_ACCEL).abs() < 1e-12);
    }
}
