//! Match state and the per-tick round state machine

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use crate::ws::protocol::{GameEvent, GameMode};

use super::ai::AiController;
use super::craft::{Craft, CraftId, Pilot, Spawn};
use super::physics::Bounds;
use super::InputSnapshot;

/// Default pause between a round ending and the next one starting
pub const DEFAULT_ROUND_END_DELAY: Duration = Duration::from_millis(2000);

/// Match phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPhase {
    /// Crafts fly and fight
    Running,
    /// Someone went down; gameplay frozen until the reset
    RoundEnd,
}

/// One local match: two crafts and the round state machine.
///
/// The random source only feeds the AI thrust roll, so tests can inject a fixed generator.
pub struct MatchState<R = ChaCha8Rng> {
    pub mode: GameMode,
    pub phase: MatchPhase,
    pub bounds: Bounds,
    pub crafts: [Craft; 2],
    pub tick: u64,
    pub round: u32,
    pub winner: Option<CraftId>,
    pub round_end_delay: Duration,
    round_end_elapsed: Duration,
    rng: R,
}

impl MatchState<ChaCha8Rng> {
    /// Build both crafts at their spawn defaults and begin running
    pub fn start(mode: GameMode, bounds: Bounds, round_end_delay: Duration, seed: u64) -> Self {
        Self::with_rng(mode, bounds, round_end_delay, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> MatchState<R> {
    pub fn with_rng(mode: GameMode, bounds: Bounds, round_end_delay: Duration, rng: R) -> Self {
        let (pilot_two, label_two) = match mode {
            GameMode::VersusHuman => (Pilot::Human, "Player 2"),
            GameMode::VersusAi => (Pilot::Ai, "Computer"),
        };

        let crafts = [
            Craft::new(
                CraftId::One,
                Pilot::Human,
                "Player 1",
                Spawn::for_craft(CraftId::One, &bounds),
            ),
            Craft::new(
                CraftId::Two,
                pilot_two,
                label_two,
                Spawn::for_craft(CraftId::Two, &bounds),
            ),
        ];

        Self {
            mode,
            phase: MatchPhase::Running,
            bounds,
            crafts,
            tick: 0,
            round: 1,
            winner: None,
            round_end_delay,
            round_end_elapsed: Duration::ZERO,
            rng,
        }
    }

    pub fn craft(&self, id: CraftId) -> &Craft {
        &self.crafts[id.index()]
    }

    /// Label of the last round's winner, for the end-of-round banner
    pub fn winner_label(&self) -> Option<&str> {
        self.winner.map(|id| self.craft(id).label.as_str())
    }

    /// Advance one tick. `bounds` is the viewport sampled for this tick,
    /// `dt` the wall time the scheduler assigns to it.
    pub fn tick(&mut self, input: &InputSnapshot, bounds: Bounds, dt: Duration) -> Vec<GameEvent> {
        self.tick += 1;
        self.bounds = bounds;

        match self.phase {
            MatchPhase::Running => {
                let mut events = self.update_crafts(input);
                events.extend(self.check_round_end());
                events
            }
            MatchPhase::RoundEnd => {
                self.round_end_elapsed += dt;
                if self.round_end_elapsed >= self.round_end_delay {
                    self.reset_round()
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Steering, motion, shots and hits for both crafts
    fn update_crafts(&mut self, input: &InputSnapshot) -> Vec<GameEvent> {
        let mut events = Vec::new();
        let bounds = self.bounds;
        let [one, two] = &mut self.crafts;

        // The AI reads both crafts before either moves
        let ai_command = match self.mode {
            GameMode::VersusAi => Some(AiController::decide(two, one, &mut self.rng)),
            GameMode::VersusHuman => None,
        };

        let [keys_one, keys_two] = input.crafts;
        let fired_one = one.apply_input(
            keys_one.turn_left,
            keys_one.turn_right,
            keys_one.thrust,
            keys_one.fire,
        );
        let fired_two = match ai_command {
            Some(command) => two.apply_command(command),
            None => two.apply_input(
                keys_two.turn_left,
                keys_two.turn_right,
                keys_two.thrust,
                keys_two.fire,
            ),
        };

        for (craft, fired) in [(&mut *one, fired_one), (&mut *two, fired_two)] {
            if fired {
                events.push(GameEvent::Shot {
                    shooter: craft.id,
                    x: craft.x,
                    y: craft.y,
                    heading: craft.heading,
                });
            }
            craft.integrate(&bounds);
            craft.update_projectiles(&bounds);
        }

        // Craft one is checked first; a shot leaves its owner's list on the first hit
        for hit in one.take_hits(&mut two.projectiles) {
            events.push(GameEvent::Hit {
                shooter: CraftId::Two,
                target: CraftId::One,
                x: hit.x,
                y: hit.y,
            });
        }
        for hit in two.take_hits(&mut one.projectiles) {
            events.push(GameEvent::Hit {
                shooter: CraftId::One,
                target: CraftId::Two,
                x: hit.x,
                y: hit.y,
            });
        }

        events
    }

    /// Craft one's health is checked first: if it is down, craft two wins,
    /// even when craft two went down on the same tick.
    fn check_round_end(&mut self) -> Option<GameEvent> {
        let winner = if self.crafts[0].is_down() {
            CraftId::Two
        } else if self.crafts[1].is_down() {
            CraftId::One
        } else {
            return None;
        };

        for craft in self.crafts.iter_mut() {
            craft.health = craft.health.max(0);
        }

        self.phase = MatchPhase::RoundEnd;
        self.winner = Some(winner);
        self.round_end_elapsed = Duration::ZERO;

        let winner_label = self.craft(winner).label.clone();
        info!(
            round = self.round,
            tick = self.tick,
            winner = %winner_label,
            "Round ended"
        );

        Some(GameEvent::RoundEnded {
            round: self.round,
            winner,
            winner_label,
        })
    }

    /// Restore both crafts to spawn defaults and resume. Only the mode carries over.
    fn reset_round(&mut self) -> Vec<GameEvent> {
        for craft in self.crafts.iter_mut() {
            craft.reset(Spawn::for_craft(craft.id, &self.bounds));
        }

        self.phase = MatchPhase::Running;
        self.winner = None;
        self.round_end_elapsed = Duration::ZERO;
        self.round += 1;

        info!(round = self.round, "Round reset");

        vec![GameEvent::RoundReset { round: self.round }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::combat::{Projectile, AI_FIRE_COOLDOWN};
    use crate::game::craft::START_HEALTH;
    use crate::game::CraftInput;
    use rand::rngs::mock::StepRng;
    use std::f64::consts::PI;

    const FRAME: Duration = Duration::from_millis(16);

    fn bounds() -> Bounds {
        Bounds::new(800.0, 600.0)
    }

    fn versus(mode: GameMode) -> MatchState<StepRng> {
        MatchState::with_rng(mode, bounds(), DEFAULT_ROUND_END_DELAY, StepRng::new(u64::MAX, 0))
    }

    fn idle() -> InputSnapshot {
        InputSnapshot::default()
    }

    /// A shot that reaches the given craft's center on the next advance
    fn shot_into(owner: CraftId, target: &Craft) -> Projectile {
        Projectile::new(owner, target.x - 5.0, target.y, 0.0, owner.color())
    }

    #[test]
    fn start_places_crafts_at_spawn() {
        let game = versus(GameMode::VersusHuman);
        let one = game.craft(CraftId::One);
        let two = game.craft(CraftId::Two);

        assert_eq!((one.x, one.y, one.heading), (200.0, 300.0, 0.0));
        assert_eq!((two.x, two.y, two.heading), (600.0, 300.0, PI));
        assert_eq!(one.health, START_HEALTH);
        assert_eq!(two.label, "Player 2");
        assert_eq!(game.phase, MatchPhase::Running);
    }

    #[test]
    fn versus_ai_labels_the_computer() {
        let game = versus(GameMode::VersusAi);
        assert_eq!(game.craft(CraftId::Two).label, "Computer");
        assert_eq!(game.craft(CraftId::Two).pilot, Pilot::Ai);
    }

    #[test]
    fn human_input_drives_both_crafts_in_versus_human() {
        let mut game = versus(GameMode::VersusHuman);
        let mut input = idle();
        input.crafts[0].thrust = true;
        input.crafts[1].fire = true;

        let events = game.tick(&input, bounds(), FRAME);

        assert!(game.craft(CraftId::One).vel_x > 0.0);
        assert_eq!(game.craft(CraftId::Two).projectiles.len(), 1);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::Shot { shooter: CraftId::Two, .. })));
    }

    #[test]
    fn ai_drives_craft_two_in_versus_ai() {
        let mut game = versus(GameMode::VersusAi);
        let mut input = idle();
        input.crafts[1].turn_left = true;

        game.tick(&input, bounds(), FRAME);

        // Facing craft one already: no turn, immediate shot, AI cooldown
        let two = game.craft(CraftId::Two);
        assert_eq!(two.heading, PI);
        assert_eq!(two.projectiles.len(), 1);
        assert_eq!(two.cooldown, AI_FIRE_COOLDOWN - 1);
    }

    #[test]
    fn hit_costs_health_and_consumes_the_shot() {
        let mut game = versus(GameMode::VersusHuman);
        let shot = shot_into(CraftId::Two, &game.crafts[0]);
        game.crafts[1].projectiles.push(shot);

        let events = game.tick(&idle(), bounds(), FRAME);

        assert_eq!(game.craft(CraftId::One).health, START_HEALTH - 1);
        assert!(game.craft(CraftId::Two).projectiles.is_empty());
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Hit {
                shooter: CraftId::Two,
                target: CraftId::One,
                ..
            }
        )));
        assert_eq!(game.phase, MatchPhase::Running);
    }

    #[test]
    fn last_hit_ends_the_round() {
        let mut game = versus(GameMode::VersusHuman);
        game.crafts[1].health = 1;
        let shot = shot_into(CraftId::One, &game.crafts[1]);
        game.crafts[0].projectiles.push(shot);

        let events = game.tick(&idle(), bounds(), FRAME);

        assert_eq!(game.phase, MatchPhase::RoundEnd);
        assert_eq!(game.winner, Some(CraftId::One));
        assert_eq!(game.winner_label(), Some("Player 1"));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::RoundEnded { winner: CraftId::One, .. })));
    }

    #[test]
    fn simultaneous_knockout_goes_to_craft_two() {
        let mut game = versus(GameMode::VersusHuman);
        game.crafts[0].health = 1;
        game.crafts[1].health = 1;
        let at_one = shot_into(CraftId::Two, &game.crafts[0]);
        let at_two = shot_into(CraftId::One, &game.crafts[1]);
        game.crafts[1].projectiles.push(at_one);
        game.crafts[0].projectiles.push(at_two);

        game.tick(&idle(), bounds(), FRAME);

        assert_eq!(game.phase, MatchPhase::RoundEnd);
        assert_eq!(game.winner, Some(CraftId::Two));
        assert_eq!(game.craft(CraftId::One).health, 0);
        assert_eq!(game.craft(CraftId::Two).health, 0);
    }

    #[test]
    fn overkill_is_clamped_to_zero() {
        let mut game = versus(GameMode::VersusHuman);
        game.crafts[1].health = 1;
        for _ in 0..3 {
            let shot = shot_into(CraftId::One, &game.crafts[1]);
            game.crafts[0].projectiles.push(shot);
        }

        game.tick(&idle(), bounds(), FRAME);

        assert_eq!(game.craft(CraftId::Two).health, 0);
    }

    #[test]
    fn round_end_freezes_gameplay() {
        let mut game = versus(GameMode::VersusHuman);
        game.crafts[1].health = 0;
        game.tick(&idle(), bounds(), FRAME);
        assert_eq!(game.phase, MatchPhase::RoundEnd);

        let before = (game.crafts[0].x, game.crafts[0].vel_x);
        let input = InputSnapshot {
            crafts: [
                CraftInput {
                    thrust: true,
                    fire: true,
                    ..Default::default()
                },
                CraftInput::default(),
            ],
        };
        let events = game.tick(&input, bounds(), FRAME);

        assert!(events.is_empty());
        assert_eq!((game.crafts[0].x, game.crafts[0].vel_x), before);
        assert!(game.crafts[0].projectiles.is_empty());
    }

    #[test]
    fn reset_after_delay_restores_spawn_defaults() {
        let mut game = versus(GameMode::VersusHuman);
        game.crafts[0].vel_x = 3.0;
        game.crafts[0].health = 0;
        game.crafts[1].projectiles.push(Projectile::new(CraftId::Two, 10.0, 10.0, 0.0, "royalblue"));
        game.tick(&idle(), bounds(), FRAME);
        assert_eq!(game.phase, MatchPhase::RoundEnd);

        game.tick(&idle(), bounds(), Duration::from_millis(1999));
        assert_eq!(game.phase, MatchPhase::RoundEnd);

        let events = game.tick(&idle(), bounds(), Duration::from_millis(1));
        assert_eq!(events, vec![GameEvent::RoundReset { round: 2 }]);
        assert_eq!(game.phase, MatchPhase::Running);
        assert_eq!(game.winner, None);
        assert_eq!(game.mode, GameMode::VersusHuman);

        for craft in &game.crafts {
            assert_eq!(craft.health, START_HEALTH);
            assert_eq!((craft.vel_x, craft.vel_y), (0.0, 0.0));
            assert!(craft.projectiles.is_empty());
        }
        assert_eq!(game.crafts[0].x, 200.0);
        assert_eq!(game.crafts[1].heading, PI);
    }

    #[test]
    fn reset_spawns_against_the_current_viewport() {
        let mut game = versus(GameMode::VersusHuman);
        game.crafts[0].health = 0;
        game.tick(&idle(), bounds(), FRAME);

        let wide = Bounds::new(1200.0, 400.0);
        game.tick(&idle(), wide, DEFAULT_ROUND_END_DELAY);

        assert_eq!((game.crafts[0].x, game.crafts[0].y), (300.0, 200.0));
        assert_eq!((game.crafts[1].x, game.crafts[1].y), (900.0, 200.0));
    }

    #[test]
    fn shrinking_viewport_wraps_on_the_next_tick() {
        let mut game = versus(GameMode::VersusHuman);
        game.tick(&idle(), Bounds::new(500.0, 600.0), FRAME);
        // Craft two sat at x = 600, now past the right edge
        assert_eq!(game.craft(CraftId::Two).x, 0.0);
        assert_eq!(game.bounds, Bounds::new(500.0, 600.0));
    }

    #[test]
    fn seeded_matches_replay_identically() {
        let run = || {
            let mut game = MatchState::start(GameMode::VersusAi, bounds(), DEFAULT_ROUND_END_DELAY, 42);
            let mut input = idle();
            input.crafts[0].turn_left = true;
            input.crafts[0].fire = true;
            for _ in 0..600 {
                game.tick(&input, bounds(), FRAME);
            }
            let two = game.craft(CraftId::Two);
            (two.x, two.y, two.heading, game.craft(CraftId::One).health)
        };

        assert_eq!(run(), run());
    }
}
