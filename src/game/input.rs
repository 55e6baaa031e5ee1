//! Input intent buffer - latest input per player plus one-shot edges

use std::collections::HashMap;

use super::entity::EntityId;

/// Abstract input intent for one player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputIntent {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Edge-triggered: dash key pressed since the last tick
    pub dash_requested: bool,
    /// Edge-triggered: alt-action key pressed since the last tick
    pub alt_requested: bool,
}

impl InputIntent {
    /// Unit direction components in {-1, 0, 1}.
    ///
    /// When opposing keys are both held the first-checked one wins
    /// (left over right, up over down); they do not cancel to zero.
    pub fn direction(&self) -> (i8, i8) {
        let dir_x = if self.left {
            -1
        } else if self.right {
            1
        } else {
            0
        };
        let dir_y = if self.up {
            -1
        } else if self.down {
            1
        } else {
            0
        };
        (dir_x, dir_y)
    }

    pub fn is_moving(&self) -> bool {
        self.direction() != (0, 0)
    }
}

/// One-shot flags drained by a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEdges {
    pub dash: bool,
    pub alt: bool,
}

#[derive(Debug, Default)]
pub struct InputBuffer {
    intents: HashMap<EntityId, InputIntent>,
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a player with an idle intent
    pub fn register(&mut self, player_id: EntityId) {
        self.intents.entry(player_id).or_default();
    }

    pub fn remove(&mut self, player_id: &EntityId) -> Option<InputIntent> {
        self.intents.remove(player_id)
    }

    /// Replace directional fields and OR in edge fields.
    /// Returns false if the player is not tracked.
    pub fn apply_input(&mut self, player_id: &EntityId, input: InputIntent) -> bool {
        let Some(current) = self.intents.get_mut(player_id) else {
            return false;
        };

        current.left = input.left;
        current.right = input.right;
        current.up = input.up;
        current.down = input.down;
        current.dash_requested |= input.dash_requested;
        current.alt_requested |= input.alt_requested;
        true
    }

    /// Read and reset the edge fields
    pub fn consume_edges(&mut self, player_id: &EntityId) -> Option<InputEdges> {
        let current = self.intents.get_mut(player_id)?;
        let edges = InputEdges {
            dash: std::mem::take(&mut current.dash_requested),
            alt: std::mem::take(&mut current.alt_requested),
        };
        Some(edges)
    }

    pub fn intent(&self, player_id: &EntityId) -> Option<&InputIntent> {
        self.intents.get(player_id)
    }
}
