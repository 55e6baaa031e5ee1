//! WebSocket protocol message definitions
//! Every frame is a named event: `{"event": "<name>", "data": <payload>}`

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::game::entity::{DynamicObject, EntityId, PlayerEntity, StaticObject};
use crate::game::input::InputIntent;
use crate::game::preset::PresetKind;
use crate::game::registry::WorldSnapshot;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientMsg {
    /// Latest keyboard state
    PlayerInput(InputPayload),
    SpawnStaticObject(SpawnRequest),
    RemoveStaticObject(EntityId),
    SpawnDynamicObject(SpawnRequest),
    RemoveDynamicObject(EntityId),
}

/// Raw input as the browser client sends it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InputPayload {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Space pressed since the last message
    pub space_hit: bool,
    /// Shift pressed since the last message
    pub shift_hit: bool,
}

impl From<InputPayload> for InputIntent {
    fn from(payload: InputPayload) -> Self {
        Self {
            left: payload.left,
            right: payload.right,
            up: payload.up,
            down: payload.down,
            dash_requested: payload.space_hit,
            alt_requested: payload.shift_hit,
        }
    }
}

/// Object spawn request, positioned in world (map-centered) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnRequest {
    #[serde(alias = "presetKind", alias = "presetId")]
    pub preset: PresetKind,
    pub world_x: f32,
    pub world_y: f32,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerMsg {
    /// Full state, first message a joining client receives
    CurrentWorldState(WorldSnapshot),

    /// Another player joined
    PlayerConnect(PlayerEntity),

    /// A player left
    PlayerDisconnect(EntityId),

    /// Every player, sent each tick
    PlayerStateUpdates(HashMap<EntityId, PlayerEntity>),

    /// Every dynamic object, sent each tick
    DynamicObjectUpdates(HashMap<EntityId, DynamicObject>),

    StaticObjectSpawned(StaticObject),
    StaticObjectDeleted(EntityId),
    DynamicObjectSpawned(DynamicObject),
    DynamicObjectDeleted(EntityId),
}

impl ServerMsg {
    /// Wire event name
    pub fn event_name(&self) -> &'static str {
        match self {
            ServerMsg::CurrentWorldState(_) => "currentWorldState",
            ServerMsg::PlayerConnect(_) => "playerConnect",
            ServerMsg::PlayerDisconnect(_) => "playerDisconnect",
            ServerMsg::PlayerStateUpdates(_) => "playerStateUpdates",
            ServerMsg::DynamicObjectUpdates(_) => "dynamicObjectUpdates",
            ServerMsg::StaticObjectSpawned(_) => "staticObjectSpawned",
            ServerMsg::StaticObjectDeleted(_) => "staticObjectDeleted",
            ServerMsg::DynamicObjectSpawned(_) => "dynamicObjectSpawned",
            ServerMsg::DynamicObjectDeleted(_) => "dynamicObjectDeleted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_parse_player_input() {
        let json = r#"{"event":"playerInput","data":{"left":true,"right":false,"up":false,"down":true,"spaceHit":true,"shiftHit":false}}"#;
        let msg: ClientMsg = serde_json::from_str(json).unwrap();

        match msg {
            ClientMsg::PlayerInput(payload) => {
                let intent = InputIntent::from(payload);
                assert!(intent.left);
                assert!(intent.down);
                assert!(intent.dash_requested);
                assert!(!intent.alt_requested);
            }
            other => panic!("Unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_missing_input_fields_default_to_released() {
        let msg: ClientMsg =
            serde_json::from_str(r#"{"event":"playerInput","data":{"up":true}}"#).unwrap();
        assert_eq!(
            msg,
            ClientMsg::PlayerInput(InputPayload {
                up: true,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_parse_spawn_request() {
        let json = r#"{"event":"spawnStaticObject","data":{"preset":"fence","worldX":10,"worldY":-4.5}}"#;
        let msg: ClientMsg = serde_json::from_str(json).unwrap();
        assert_eq!(
            msg,
            ClientMsg::SpawnStaticObject(SpawnRequest {
                preset: PresetKind::Fence,
                world_x: 10.0,
                world_y: -4.5,
            })
        );

        let aliased = r#"{"event":"spawnDynamicObject","data":{"presetId":"ball","worldX":0,"worldY":0}}"#;
        assert!(matches!(
            serde_json::from_str::<ClientMsg>(aliased).unwrap(),
            ClientMsg::SpawnDynamicObject(SpawnRequest { preset: PresetKind::Ball, .. })
        ));
    }

    #[test]
    fn test_parse_remove_with_bare_id() {
        let uuid = Uuid::new_v4();
        let json = format!(r#"{{"event":"removeStaticObject","data":"{}"}}"#, uuid);
        let msg: ClientMsg = serde_json::from_str(&json).unwrap();
        assert_eq!(msg, ClientMsg::RemoveStaticObject(EntityId::from_uuid(uuid)));
    }

    #[test]
    fn test_malformed_messages_are_rejected() {
        let bad = [
            r#"{"event":"teleport","data":{}}"#,
            r#"{"event":"spawnStaticObject","data":{"preset":"dragon","worldX":0,"worldY":0}}"#,
            r#"{"event":"removeDynamicObject","data":"not-a-uuid"}"#,
            r#"{"event":"playerInput","data":{"left":"yes"}}"#,
            "not json",
        ];
        for json in bad {
            assert!(serde_json::from_str::<ClientMsg>(json).is_err(), "accepted: {}", json);
        }
    }

    #[test]
    fn test_server_event_names_match_wire() {
        let id = EntityId::from_uuid(Uuid::new_v4());
        let msgs = [
            ServerMsg::CurrentWorldState(WorldSnapshot::default()),
            ServerMsg::PlayerDisconnect(id),
            ServerMsg::PlayerStateUpdates(HashMap::new()),
            ServerMsg::DynamicObjectUpdates(HashMap::new()),
            ServerMsg::StaticObjectDeleted(id),
            ServerMsg::DynamicObjectDeleted(id),
        ];
        for msg in msgs {
            let value = serde_json::to_value(&msg).unwrap();
            assert_eq!(value["event"], msg.event_name());
        }

        let value = serde_json::to_value(ServerMsg::PlayerDisconnect(id)).unwrap();
        assert_eq!(value["data"], id.to_string());
    }
}
