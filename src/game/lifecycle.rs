//! Connection lifecycle: Connecting -> Active -> Disconnected

use std::collections::HashMap;

use super::entity::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Transport is up, player entity not yet announced
    Connecting,
    /// Player entity exists and messages are accepted
    Active,
    /// Terminal; the entity is gone and the id is never revived
    Disconnected,
}

/// Lifecycle state per connection. Disconnected connections are dropped from
/// the table, so an absent id reads as `Disconnected`.
#[derive(Debug, Default)]
pub struct ConnectionLifecycle {
    states: HashMap<EntityId, ConnectionState>,
}

impl ConnectionLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, id: EntityId) {
        self.states.insert(id, ConnectionState::Connecting);
    }

    /// Connecting -> Active. Returns false for any other starting state.
    pub fn activate(&mut self, id: &EntityId) -> bool {
        match self.states.get_mut(id) {
            Some(state) if *state == ConnectionState::Connecting => {
                *state = ConnectionState::Active;
                true
            }
            _ => false,
        }
    }

    /// Move to the terminal state. Returns the previous state, or `None` if the
    /// connection was already disconnected.
    pub fn terminate(&mut self, id: &EntityId) -> Option<ConnectionState> {
        self.states.remove(id)
    }

    pub fn state(&self, id: &EntityId) -> ConnectionState {
        self.states
            .get(id)
            .copied()
            .unwrap_or(ConnectionState::Disconnected)
    }

    pub fn is_active(&self, id: &EntityId) -> bool {
        self.state(id) == ConnectionState::Active
    }

    pub fn active_count(&self) -> usize {
        self.states
            .values()
            .filter(|s| **s == ConnectionState::Active)
            .count()
    }
}
