//! Entity types tracked by the authoritative world

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::preset::{DisplayAttributes, PresetKind};

/// Opaque unique entity identifier (serialized as a UUID string)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which map of the registry an entity lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Static,
    Dynamic,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Player => "player",
            EntityKind::Static => "static object",
            EntityKind::Dynamic => "dynamic object",
        };
        f.write_str(name)
    }
}

/// Player entity (authoritative)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntity {
    pub id: EntityId,
    pub display_name: String,
    /// Display-space position
    pub x: f32,
    pub y: f32,
    pub dashing: bool,
    /// Server time (ms) the last dash started, `None` if the player never dashed
    #[serde(skip)]
    pub dash_start_ms: Option<u64>,
}

impl PlayerEntity {
    pub fn new(id: EntityId, display_name: String, x: f32, y: f32) -> Self {
        Self {
            id,
            display_name,
            x,
            y,
            dashing: false,
            dash_start_ms: None,
        }
    }
}

/// Static object: never moves after creation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticObject {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub preset: PresetKind,
    pub display: DisplayAttributes,
}

/// Dynamic object: position owned by the simulation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicObject {
    pub id: EntityId,
    pub x: f32,
    pub y: f32,
    pub preset: PresetKind,
    pub display: DisplayAttributes,
}

/// Any registry entity, used for kind-generic upserts
#[derive(Debug, Clone, PartialEq)]
pub enum Entity {
    Player(PlayerEntity),
    Static(StaticObject),
    Dynamic(DynamicObject),
}

impl Entity {
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Player(p) => p.id,
            Entity::Static(s) => s.id,
            Entity::Dynamic(d) => d.id,
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Player(_) => EntityKind::Player,
            Entity::Static(_) => EntityKind::Static,
            Entity::Dynamic(_) => EntityKind::Dynamic,
        }
    }

    pub fn position(&self) -> (f32, f32) {
        match self {
            Entity::Player(p) => (p.x, p.y),
            Entity::Static(s) => (s.x, s.y),
            Entity::Dynamic(d) => (d.x, d.y),
        }
    }
}

/// Borrowed view returned by registry lookups
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityRef<'a> {
    Player(&'a PlayerEntity),
    Static(&'a StaticObject),
    Dynamic(&'a DynamicObject),
}

impl EntityRef<'_> {
    pub fn id(&self) -> EntityId {
        match self {
            EntityRef::Player(p) => p.id,
            EntityRef::Static(s) => s.id,
            EntityRef::Dynamic(d) => d.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_serializes_as_plain_string() {
        let uuid = Uuid::new_v4();
        let id = EntityId::from_uuid(uuid);

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));

        let parsed: EntityId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_player_wire_shape_hides_dash_timer() {
        let id = EntityId::from_uuid(Uuid::new_v4());
        let mut player = PlayerEntity::new(id, "misty fox".to_string(), 120.0, 80.0);
        player.dash_start_ms = Some(1_000);

        let value = serde_json::to_value(&player).unwrap();
        assert_eq!(value["displayName"], "misty fox");
        assert_eq!(value["x"], 120.0);
        assert_eq!(value["dashing"], false);
        assert!(value.get("dashStartMs").is_none());
    }

    #[test]
    fn test_entity_kind_accessors() {
        let id = EntityId::from_uuid(Uuid::new_v4());
        let entity = Entity::Player(PlayerEntity::new(id, "keen cat".to_string(), 1.0, 2.0));

        assert_eq!(entity.id(), id);
        assert_eq!(entity.kind(), EntityKind::Player);
        assert_eq!(entity.position(), (1.0, 2.0));
    }
}
