//! Keyboard state and key-to-action bindings

use std::collections::HashSet;

use super::craft::CraftId;
use super::{CraftInput, InputSnapshot};

/// Logical actions a craft responds to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    TurnLeft,
    TurnRight,
    Thrust,
    Fire,
}

/// Host key names for each action of one craft
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub turn_left: String,
    pub turn_right: String,
    pub thrust: String,
    pub fire: String,
}

impl KeyBindings {
    /// Default layout: WASD for craft one, arrow keys for craft two
    pub fn for_craft(id: CraftId) -> Self {
        match id {
            CraftId::One => Self {
                turn_left: "a".to_string(),
                turn_right: "d".to_string(),
                thrust: "w".to_string(),
                fire: "s".to_string(),
            },
            CraftId::Two => Self {
                turn_left: "ArrowLeft".to_string(),
                turn_right: "ArrowRight".to_string(),
                thrust: "ArrowUp".to_string(),
                fire: "ArrowDown".to_string(),
            },
        }
    }

    pub fn key_for(&self, action: Action) -> &str {
        match action {
            Action::TurnLeft => &self.turn_left,
            Action::TurnRight => &self.turn_right,
            Action::Thrust => &self.thrust,
            Action::Fire => &self.fire,
        }
    }
}

/// Keys currently held, written by key events and read once per tick
#[derive(Debug, Clone)]
pub struct KeyState {
    pressed: HashSet<String>,
    bindings: [KeyBindings; 2],
}

impl KeyState {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            bindings: [
                KeyBindings::for_craft(CraftId::One),
                KeyBindings::for_craft(CraftId::Two),
            ],
        }
    }

    pub fn key_down(&mut self, key: &str) {
        self.pressed.insert(key.to_string());
    }

    pub fn key_up(&mut self, key: &str) {
        self.pressed.remove(key);
    }

    /// Forget everything held, e.g. when the page loses focus
    pub fn release_all(&mut self) {
        self.pressed.clear();
    }

    pub fn is_pressed(&self, id: CraftId, action: Action) -> bool {
        self.pressed
            .contains(self.bindings[id.index()].key_for(action))
    }

    fn craft_input(&self, id: CraftId) -> CraftInput {
        CraftInput {
            turn_left: self.is_pressed(id, Action::TurnLeft),
            turn_right: self.is_pressed(id, Action::TurnRight),
            thrust: self.is_pressed(id, Action::Thrust),
            fire: self.is_pressed(id, Action::Fire),
        }
    }

    /// Current held state for both crafts
    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            crafts: [self.craft_input(CraftId::One), self.craft_input(CraftId::Two)],
        }
    }
}

impl Default for KeyState {
    fn default() -> Self {
        Self::new()
    }
}
