//! Entity registry - the single source of truth for world state

use std::collections::HashMap;

use serde::Serialize;

use super::entity::{DynamicObject, Entity, EntityId, EntityKind, EntityRef, PlayerEntity, StaticObject};

/// Full authoritative state, sent wholesale to joining clients
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    pub players: HashMap<EntityId, PlayerEntity>,
    pub static_objects: HashMap<EntityId, StaticObject>,
    pub dynamic_objects: HashMap<EntityId, DynamicObject>,
}

/// Owned registry of every live entity, keyed by kind then id
#[derive(Debug, Default)]
pub struct EntityRegistry {
    players: HashMap<EntityId, PlayerEntity>,
    static_objects: HashMap<EntityId, StaticObject>,
    dynamic_objects: HashMap<EntityId, DynamicObject>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entity, returning the previous value for that id
    pub fn upsert(&mut self, entity: Entity) -> Option<Entity> {
        match entity {
            Entity::Player(p) => self.players.insert(p.id, p).map(Entity::Player),
            Entity::Static(s) => self.static_objects.insert(s.id, s).map(Entity::Static),
            Entity::Dynamic(d) => self.dynamic_objects.insert(d.id, d).map(Entity::Dynamic),
        }
    }

    /// Remove an entity. Removing an absent id is a no-op returning `None`.
    pub fn remove(&mut self, kind: EntityKind, id: &EntityId) -> Option<Entity> {
        match kind {
            EntityKind::Player => self.players.remove(id).map(Entity::Player),
            EntityKind::Static => self.static_objects.remove(id).map(Entity::Static),
            EntityKind::Dynamic => self.dynamic_objects.remove(id).map(Entity::Dynamic),
        }
    }

    pub fn get(&self, kind: EntityKind, id: &EntityId) -> Option<EntityRef<'_>> {
        match kind {
            EntityKind::Player => self.players.get(id).map(EntityRef::Player),
            EntityKind::Static => self.static_objects.get(id).map(EntityRef::Static),
            EntityKind::Dynamic => self.dynamic_objects.get(id).map(EntityRef::Dynamic),
        }
    }

    /// True if any map holds this id
    pub fn contains_any(&self, id: &EntityId) -> bool {
        self.players.contains_key(id)
            || self.static_objects.contains_key(id)
            || self.dynamic_objects.contains_key(id)
    }

    pub fn player(&self, id: &EntityId) -> Option<&PlayerEntity> {
        self.players.get(id)
    }

    pub fn player_mut(&mut self, id: &EntityId) -> Option<&mut PlayerEntity> {
        self.players.get_mut(id)
    }

    pub fn dynamic_object_mut(&mut self, id: &EntityId) -> Option<&mut DynamicObject> {
        self.dynamic_objects.get_mut(id)
    }

    pub fn players(&self) -> &HashMap<EntityId, PlayerEntity> {
        &self.players
    }

    pub fn players_mut(&mut self) -> impl Iterator<Item = &mut PlayerEntity> {
        self.players.values_mut()
    }

    pub fn static_objects(&self) -> &HashMap<EntityId, StaticObject> {
        &self.static_objects
    }

    pub fn dynamic_objects(&self) -> &HashMap<EntityId, DynamicObject> {
        &self.dynamic_objects
    }

    /// Clone the full state for a joining client
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            players: self.players.clone(),
            static_objects: self.static_objects.clone(),
            dynamic_objects: self.dynamic_objects.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::preset::PresetKind;
    use uuid::Uuid;

    fn new_id() -> EntityId {
        EntityId::from_uuid(Uuid::new_v4())
    }

    fn fence(id: EntityId) -> StaticObject {
        StaticObject {
            id,
            x: 10.0,
            y: 20.0,
            preset: PresetKind::Fence,
            display: PresetKind::Fence.attributes().display,
        }
    }

    #[test]
    fn test_upsert_then_get() {
        let mut registry = EntityRegistry::new();
        let id = new_id();

        let previous = registry.upsert(Entity::Player(PlayerEntity::new(
            id,
            "dizzy newt".to_string(),
            5.0,
            6.0,
        )));
        assert!(previous.is_none());

        match registry.get(EntityKind::Player, &id) {
            Some(EntityRef::Player(p)) => assert_eq!(p.display_name, "dizzy newt"),
            other => panic!("Unexpected lookup result: {:?}", other),
        }
        assert!(registry.get(EntityKind::Static, &id).is_none());
    }

    #[test]
    fn test_upsert_replaces_existing() {
        let mut registry = EntityRegistry::new();
        let id = new_id();
        registry.upsert(Entity::Static(fence(id)));

        let mut moved = fence(id);
        moved.x = 99.0;
        let previous = registry.upsert(Entity::Static(moved));

        assert!(matches!(previous, Some(Entity::Static(ref s)) if s.x == 10.0));
        assert_eq!(registry.static_objects()[&id].x, 99.0);
        assert_eq!(registry.static_objects().len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = EntityRegistry::new();
        let id = new_id();
        registry.upsert(Entity::Static(fence(id)));

        assert!(registry.remove(EntityKind::Static, &id).is_some());
        assert!(registry.remove(EntityKind::Static, &id).is_none());
        assert!(registry.get(EntityKind::Static, &id).is_none());
        assert!(!registry.contains_any(&id));
    }

    #[test]
    fn test_remove_wrong_kind_leaves_entity() {
        let mut registry = EntityRegistry::new();
        let id = new_id();
        registry.upsert(Entity::Static(fence(id)));

        assert!(registry.remove(EntityKind::Dynamic, &id).is_none());
        assert!(registry.contains_any(&id));
    }

    #[test]
    fn test_snapshot_contains_every_kind() {
        let mut registry = EntityRegistry::new();
        let player_id = new_id();
        let static_id = new_id();
        let dynamic_id = new_id();

        registry.upsert(Entity::Player(PlayerEntity::new(
            player_id,
            "keen fox".to_string(),
            0.0,
            0.0,
        )));
        registry.upsert(Entity::Static(fence(static_id)));
        registry.upsert(Entity::Dynamic(DynamicObject {
            id: dynamic_id,
            x: 1.0,
            y: 1.0,
            preset: PresetKind::Ball,
            display: PresetKind::Ball.attributes().display,
        }));

        let snapshot = registry.snapshot();
        assert!(snapshot.players.contains_key(&player_id));
        assert!(snapshot.static_objects.contains_key(&static_id));
        assert!(snapshot.dynamic_objects.contains_key(&dynamic_id));

        let value = serde_json::to_value(&snapshot).unwrap();
        assert!(value["staticObjects"][static_id.to_string()].is_object());
        assert_eq!(
            value["dynamicObjects"][dynamic_id.to_string()]["preset"],
            "ball"
        );
    }
}
