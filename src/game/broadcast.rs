//! Synchronization broadcaster - decides what each connection is told

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::ws::protocol::ServerMsg;

use super::entity::{DynamicObject, EntityId, PlayerEntity, StaticObject};
use super::registry::{EntityRegistry, WorldSnapshot};

/// Outbound queue of one connection. Messages are shared, not copied, across recipients.
pub type Outbound = mpsc::UnboundedSender<Arc<ServerMsg>>;

#[derive(Debug, Default)]
pub struct Broadcaster {
    connections: HashMap<EntityId, Outbound>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, player_id: EntityId, outbound: Outbound) {
        self.connections.insert(player_id, outbound);
    }

    pub fn unregister(&mut self, player_id: &EntityId) -> bool {
        self.connections.remove(player_id).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Fire-and-forget send to one connection
    pub fn send_to(&self, player_id: &EntityId, msg: ServerMsg) {
        if let Some(outbound) = self.connections.get(player_id) {
            deliver(player_id, outbound, Arc::new(msg));
        }
    }

    pub fn send_all(&self, msg: ServerMsg) {
        let msg = Arc::new(msg);
        for (id, outbound) in &self.connections {
            deliver(id, outbound, msg.clone());
        }
    }

    pub fn send_all_except(&self, excluded: &EntityId, msg: ServerMsg) {
        let msg = Arc::new(msg);
        for (id, outbound) in self.connections.iter().filter(|(id, _)| *id != excluded) {
            deliver(id, outbound, msg.clone());
        }
    }

    /// Full snapshot to the joiner only, then the new player to everyone else
    pub fn announce_join(&self, player: &PlayerEntity, snapshot: WorldSnapshot) {
        self.send_to(&player.id, ServerMsg::CurrentWorldState(snapshot));
        self.send_all_except(&player.id, ServerMsg::PlayerConnect(player.clone()));
    }

    /// Must be called after the player left the registry and was unregistered here
    pub fn announce_leave(&self, player_id: EntityId) {
        self.send_all(ServerMsg::PlayerDisconnect(player_id));
    }

    pub fn announce_static_spawned(&self, object: &StaticObject) {
        self.send_all(ServerMsg::StaticObjectSpawned(object.clone()));
    }

    pub fn announce_static_deleted(&self, id: EntityId) {
        self.send_all(ServerMsg::StaticObjectDeleted(id));
    }

    pub fn announce_dynamic_spawned(&self, object: &DynamicObject) {
        self.send_all(ServerMsg::DynamicObjectSpawned(object.clone()));
    }

    pub fn announce_dynamic_deleted(&self, id: EntityId) {
        self.send_all(ServerMsg::DynamicObjectDeleted(id));
    }

    /// Per-tick bulk state: the whole player map and the whole dynamic-object map
    pub fn broadcast_tick(&self, registry: &EntityRegistry) {
        if self.connections.is_empty() {
            return;
        }
        self.send_all(ServerMsg::PlayerStateUpdates(registry.players().clone()));
        self.send_all(ServerMsg::DynamicObjectUpdates(
            registry.dynamic_objects().clone(),
        ));
    }
}

fn deliver(player_id: &EntityId, outbound: &Outbound, msg: Arc<ServerMsg>) {
    if outbound.send(msg).is_err() {
        debug!(player_id = %player_id, "Outbound channel closed, dropping message");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::UnboundedReceiver;
    use uuid::Uuid;

    fn connect(broadcaster: &mut Broadcaster) -> (EntityId, UnboundedReceiver<Arc<ServerMsg>>) {
        let id = EntityId::from_uuid(Uuid::new_v4());
        let (tx, rx) = mpsc::unbounded_channel();
        broadcaster.register(id, tx);
        (id, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Arc<ServerMsg>>) -> Vec<Arc<ServerMsg>> {
        let mut msgs = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            msgs.push(msg);
        }
        msgs
    }

    #[test]
    fn test_join_sends_snapshot_to_joiner_only() {
        let mut broadcaster = Broadcaster::new();
        let (_, mut other_rx) = connect(&mut broadcaster);
        let (joiner_id, mut joiner_rx) = connect(&mut broadcaster);

        let player = PlayerEntity::new(joiner_id, "foamy crab".to_string(), 1.0, 1.0);
        broadcaster.announce_join(&player, WorldSnapshot::default());

        let joiner_msgs = drain(&mut joiner_rx);
        assert_eq!(joiner_msgs.len(), 1);
        assert!(matches!(*joiner_msgs[0], ServerMsg::CurrentWorldState(_)));

        let other_msgs = drain(&mut other_rx);
        assert_eq!(other_msgs.len(), 1);
        assert_eq!(*other_msgs[0], ServerMsg::PlayerConnect(player));
    }

    #[test]
    fn test_send_all_shares_one_message() {
        let mut broadcaster = Broadcaster::new();
        let (_, mut a) = connect(&mut broadcaster);
        let (_, mut b) = connect(&mut broadcaster);
        let id = EntityId::from_uuid(Uuid::new_v4());

        broadcaster.announce_static_deleted(id);

        let from_a = drain(&mut a);
        let from_b = drain(&mut b);
        assert!(Arc::ptr_eq(&from_a[0], &from_b[0]));
        assert_eq!(*from_a[0], ServerMsg::StaticObjectDeleted(id));
    }

    #[test]
    fn test_closed_receiver_does_not_affect_others() {
        let mut broadcaster = Broadcaster::new();
        let (_, dropped_rx) = connect(&mut broadcaster);
        let (_, mut live_rx) = connect(&mut broadcaster);
        drop(dropped_rx);

        broadcaster.broadcast_tick(&EntityRegistry::new());

        let msgs = drain(&mut live_rx);
        assert_eq!(msgs.len(), 2);
        assert!(matches!(*msgs[0], ServerMsg::PlayerStateUpdates(_)));
        assert!(matches!(*msgs[1], ServerMsg::DynamicObjectUpdates(_)));
    }

    #[test]
    fn test_unregistered_connection_gets_nothing() {
        let mut broadcaster = Broadcaster::new();
        let (id, mut rx) = connect(&mut broadcaster);

        assert!(broadcaster.unregister(&id));
        assert!(!broadcaster.unregister(&id));
        broadcaster.announce_leave(id);

        assert!(drain(&mut rx).is_empty());
        assert_eq!(broadcaster.connection_count(), 0);
    }
}
