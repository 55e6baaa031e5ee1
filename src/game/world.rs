//! Authoritative world and its single-task event loop
//!
//! `GameWorld` owns every piece of world state. It is driven by exactly one
//! tokio task which interleaves fixed-rate ticks with connection commands, so
//! registry mutation and event emission are always strictly sequenced.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use glam::Vec2;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::GameConfig;
use crate::util::time::Timer;
use crate::ws::protocol::{ClientMsg, SpawnRequest};

use super::broadcast::{Broadcaster, Outbound};
use super::entity::{DynamicObject, Entity, EntityId, EntityKind, PlayerEntity, StaticObject};
use super::identity::IdentityService;
use super::input::InputBuffer;
use super::lifecycle::ConnectionLifecycle;
use super::physics::{Body, BodyKind, PhysicsWorld};
use super::preset::{PresetCategory, PresetKind};
use super::registry::{EntityRegistry, WorldSnapshot};
use super::tick::{TickDriver, TickReport};

/// Errors raised by world operations. None of them are fatal to the world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("{kind} {id} does not exist")]
    UnknownEntity { kind: EntityKind, id: EntityId },

    #[error("preset {preset:?} cannot be spawned as a {expected}")]
    WrongCategory {
        preset: PresetKind,
        expected: EntityKind,
    },

    #[error("position ({x}, {y}) is not a finite coordinate")]
    InvalidPosition { x: f32, y: f32 },

    #[error("connection {0} is not active")]
    InactiveConnection(EntityId),

    #[error("world task has stopped")]
    Closed,
}

/// Commands sent to the world task
#[derive(Debug)]
pub enum WorldCommand {
    /// A transport connection opened; replies with the new player's id
    Connect {
        outbound: Outbound,
        reply: oneshot::Sender<EntityId>,
    },
    /// Inbound event from an active connection
    Message { player_id: EntityId, msg: ClientMsg },
    /// Transport closed, gracefully or not
    Disconnect { player_id: EntityId },
    /// Read the full state
    Snapshot { reply: oneshot::Sender<WorldSnapshot> },
}

/// Counters published by the world task for the HTTP surface
#[derive(Debug, Default)]
pub struct WorldStats {
    players: AtomicUsize,
    static_objects: AtomicUsize,
    dynamic_objects: AtomicUsize,
    ticks: AtomicU64,
}

impl WorldStats {
    pub fn players(&self) -> usize {
        self.players.load(Ordering::Relaxed)
    }

    pub fn static_objects(&self) -> usize {
        self.static_objects.load(Ordering::Relaxed)
    }

    pub fn dynamic_objects(&self) -> usize {
        self.dynamic_objects.load(Ordering::Relaxed)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }
}

/// Handle to the running world task
#[derive(Clone)]
pub struct WorldHandle {
    command_tx: mpsc::Sender<WorldCommand>,
    stats: Arc<WorldStats>,
}

impl WorldHandle {
    pub async fn connect(&self, outbound: Outbound) -> Result<EntityId, WorldError> {
        let (reply, rx) = oneshot::channel();
        self.command(WorldCommand::Connect { outbound, reply }).await?;
        rx.await.map_err(|_| WorldError::Closed)
    }

    pub async fn send(&self, player_id: EntityId, msg: ClientMsg) -> Result<(), WorldError> {
        self.command(WorldCommand::Message { player_id, msg }).await
    }

    pub async fn disconnect(&self, player_id: EntityId) -> Result<(), WorldError> {
        self.command(WorldCommand::Disconnect { player_id }).await
    }

    pub async fn snapshot(&self) -> Result<WorldSnapshot, WorldError> {
        let (reply, rx) = oneshot::channel();
        self.command(WorldCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| WorldError::Closed)
    }

    pub fn stats(&self) -> &WorldStats {
        &self.stats
    }

    async fn command(&self, command: WorldCommand) -> Result<(), WorldError> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| WorldError::Closed)
    }
}

pub struct GameWorld {
    config: GameConfig,
    registry: EntityRegistry,
    identity: IdentityService,
    inputs: InputBuffer,
    physics: PhysicsWorld,
    driver: TickDriver,
    broadcaster: Broadcaster,
    lifecycle: ConnectionLifecycle,
    stats: Arc<WorldStats>,
}

impl GameWorld {
    pub fn new(config: GameConfig, identity: IdentityService) -> Self {
        Self {
            physics: PhysicsWorld::new(config.map.wall_bounds()),
            driver: TickDriver::new(config.movement),
            config,
            registry: EntityRegistry::new(),
            identity,
            inputs: InputBuffer::new(),
            broadcaster: Broadcaster::new(),
            lifecycle: ConnectionLifecycle::new(),
            stats: Arc::new(WorldStats::default()),
        }
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        self.registry().snapshot()
    }

    pub fn apply(&mut self, command: WorldCommand) {
        match command {
            WorldCommand::Connect { outbound, reply } => {
                let player_id = self.connect(outbound);
                if reply.send(player_id).is_err() {
                    // Session went away before it learned its id
                    self.disconnect(&player_id);
                }
            }
            WorldCommand::Message { player_id, msg } => self.handle_message(&player_id, msg),
            WorldCommand::Disconnect { player_id } => {
                self.disconnect(&player_id);
            }
            WorldCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
    }

    /// Create the player for a new connection and announce it
    pub fn connect(&mut self, outbound: Outbound) -> EntityId {
        let player_id = self.allocate_id();
        self.lifecycle.begin(player_id);

        let defaults = self.identity.spawn_player_defaults();
        let player = PlayerEntity::new(player_id, defaults.display_name, defaults.x, defaults.y);

        self.registry.upsert(Entity::Player(player.clone()));
        self.inputs.register(player_id);
        self.physics.add_body(
            player_id,
            Body::player(Vec2::new(player.x, player.y), self.config.player_radius),
        );
        self.broadcaster.register(player_id, outbound);
        self.lifecycle.activate(&player_id);

        self.broadcaster.announce_join(&player, self.registry.snapshot());
        self.publish_counts();

        info!(
            player_id = %player_id,
            name = %player.display_name,
            player_count = self.registry.players().len(),
            "Player connected"
        );
        player_id
    }

    /// Tear down a connection's player. Returns false if it was already gone.
    pub fn disconnect(&mut self, player_id: &EntityId) -> bool {
        if self.lifecycle.terminate(player_id).is_none() {
            debug!(player_id = %player_id, "Disconnect for unknown connection ignored");
            return false;
        }

        self.registry.remove(EntityKind::Player, player_id);
        self.physics.remove_body(player_id);
        self.inputs.remove(player_id);
        self.broadcaster.unregister(player_id);

        self.broadcaster.announce_leave(*player_id);
        self.publish_counts();

        info!(
            player_id = %player_id,
            player_count = self.registry.players().len(),
            "Player disconnected"
        );
        true
    }

    /// Apply one inbound event. Errors are logged and the event dropped.
    pub fn handle_message(&mut self, player_id: &EntityId, msg: ClientMsg) {
        if let Err(e) = self.apply_message(player_id, msg) {
            warn!(player_id = %player_id, error = %e, "Rejected client message");
        }
    }

    fn apply_message(&mut self, player_id: &EntityId, msg: ClientMsg) -> Result<(), WorldError> {
        if !self.lifecycle.is_active(player_id) {
            return Err(WorldError::InactiveConnection(*player_id));
        }

        match msg {
            ClientMsg::PlayerInput(payload) => {
                if self.inputs.apply_input(player_id, payload.into()) {
                    Ok(())
                } else {
                    Err(WorldError::UnknownEntity {
                        kind: EntityKind::Player,
                        id: *player_id,
                    })
                }
            }
            ClientMsg::SpawnStaticObject(request) => self.spawn_static(request).map(drop),
            ClientMsg::RemoveStaticObject(id) => self.remove_static(&id),
            ClientMsg::SpawnDynamicObject(request) => self.spawn_dynamic(request).map(drop),
            ClientMsg::RemoveDynamicObject(id) => self.remove_dynamic(&id),
        }
    }

    pub fn spawn_static(&mut self, request: SpawnRequest) -> Result<EntityId, WorldError> {
        let attrs = request.preset.attributes();
        if attrs.category != PresetCategory::Static {
            return Err(WorldError::WrongCategory {
                preset: request.preset,
                expected: EntityKind::Static,
            });
        }

        let (x, y) = self.placement(&request)?;
        let id = self.allocate_id();
        let object = StaticObject {
            id,
            x,
            y,
            preset: request.preset,
            display: attrs.display,
        };

        self.physics
            .add_body(id, Body::object(BodyKind::Static, Vec2::new(x, y), &attrs.body));
        self.registry.upsert(Entity::Static(object.clone()));
        self.broadcaster.announce_static_spawned(&object);
        self.publish_counts();

        info!(entity_id = %id, preset = ?request.preset, x, y, "Static object spawned");
        Ok(id)
    }

    pub fn remove_static(&mut self, id: &EntityId) -> Result<(), WorldError> {
        self.registry
            .remove(EntityKind::Static, id)
            .ok_or(WorldError::UnknownEntity {
                kind: EntityKind::Static,
                id: *id,
            })?;
        self.physics.remove_body(id);
        self.broadcaster.announce_static_deleted(*id);
        self.publish_counts();

        info!(entity_id = %id, "Static object removed");
        Ok(())
    }

    pub fn spawn_dynamic(&mut self, request: SpawnRequest) -> Result<EntityId, WorldError> {
        let attrs = request.preset.attributes();
        if attrs.category != PresetCategory::Dynamic {
            return Err(WorldError::WrongCategory {
                preset: request.preset,
                expected: EntityKind::Dynamic,
            });
        }

        let (x, y) = self.placement(&request)?;
        let id = self.allocate_id();
        let object = DynamicObject {
            id,
            x,
            y,
            preset: request.preset,
            display: attrs.display,
        };

        self.physics
            .add_body(id, Body::object(BodyKind::Dynamic, Vec2::new(x, y), &attrs.body));
        self.registry.upsert(Entity::Dynamic(object.clone()));
        self.broadcaster.announce_dynamic_spawned(&object);
        self.publish_counts();

        info!(entity_id = %id, preset = ?request.preset, x, y, "Dynamic object spawned");
        Ok(id)
    }

    pub fn remove_dynamic(&mut self, id: &EntityId) -> Result<(), WorldError> {
        self.registry
            .remove(EntityKind::Dynamic, id)
            .ok_or(WorldError::UnknownEntity {
                kind: EntityKind::Dynamic,
                id: *id,
            })?;
        self.physics.remove_body(id);
        self.broadcaster.announce_dynamic_deleted(*id);
        self.publish_counts();

        info!(entity_id = %id, "Dynamic object removed");
        Ok(())
    }

    /// One simulation tick followed by the bulk broadcast
    pub fn tick(&mut self, now_ms: u64) -> TickReport {
        let report = self.driver.run_tick(
            &mut self.registry,
            &mut self.inputs,
            &mut self.physics,
            now_ms,
            self.config.tick_delta(),
        );
        self.broadcaster.broadcast_tick(&self.registry);
        self.stats.ticks.store(report.tick, Ordering::Relaxed);
        report
    }

    /// Display position for a spawn request. Non-finite coordinates would poison the simulation.
    fn placement(&self, request: &SpawnRequest) -> Result<(f32, f32), WorldError> {
        if !request.world_x.is_finite() || !request.world_y.is_finite() {
            return Err(WorldError::InvalidPosition {
                x: request.world_x,
                y: request.world_y,
            });
        }
        Ok(self.config.map.world_to_display(request.world_x, request.world_y))
    }

    /// Fresh id not held by any live entity
    fn allocate_id(&self) -> EntityId {
        loop {
            let id = self.identity.new_id();
            if !self.registry.contains_any(&id) {
                return id;
            }
            warn!(entity_id = %id, "Identifier collision, drawing again");
        }
    }

    fn publish_counts(&self) {
        self.stats
            .players
            .store(self.registry.players().len(), Ordering::Relaxed);
        self.stats
            .static_objects
            .store(self.registry.static_objects().len(), Ordering::Relaxed);
        self.stats
            .dynamic_objects
            .store(self.registry.dynamic_objects().len(), Ordering::Relaxed);
    }
}

/// Spawn the world task and return a handle to it
pub fn spawn_world(world: GameWorld) -> WorldHandle {
    let (command_tx, command_rx) = mpsc::channel(1024);
    let handle = WorldHandle {
        command_tx,
        stats: world.stats.clone(),
    };
    tokio::spawn(run(world, command_rx));
    handle
}

/// The authoritative loop: fixed-rate ticks interleaved with commands
async fn run(mut world: GameWorld, mut command_rx: mpsc::Receiver<WorldCommand>) {
    info!(tick_rate = world.config.tick_rate, "World loop started");

    let timer = Timer::new();
    let mut tick_interval = interval(world.config.tick_duration());
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                world.tick(timer.elapsed_ms());
            }
            command = command_rx.recv() => match command {
                Some(command) => world.apply(command),
                None => break,
            },
        }
    }

    info!("World loop stopped");
}
