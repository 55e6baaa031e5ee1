//! Simulation tick driver: intents -> velocities -> physics step -> harvest

use glam::Vec2;
use tracing::{debug, warn};

use super::entity::EntityId;
use super::input::InputBuffer;
use super::physics::{BodyKind, PhysicsWorld};
use super::registry::EntityRegistry;

/// Movement and dash tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementConfig {
    /// Walking speed in px/s
    pub max_speed: f32,
    /// Speed during a dash in px/s
    pub dash_speed: f32,
    pub dash_duration_ms: u64,
    /// Extra wait after a dash ends before the next may start
    pub dash_cooldown_ms: u64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_speed: 250.0,
            dash_speed: 500.0,
            dash_duration_ms: 250,
            dash_cooldown_ms: 100,
        }
    }
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub dashes_started: usize,
    pub dashes_ended: usize,
    /// Bodies whose registry entry was missing at harvest
    pub skipped_bodies: usize,
}

pub struct TickDriver {
    config: MovementConfig,
    tick: u64,
}

impl TickDriver {
    pub fn new(config: MovementConfig) -> Self {
        Self { config, tick: 0 }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Run one tick at server time `now_ms`, advancing the simulation by `dt` seconds
    pub fn run_tick(
        &mut self,
        registry: &mut EntityRegistry,
        inputs: &mut InputBuffer,
        physics: &mut PhysicsWorld,
        now_ms: u64,
        dt: f32,
    ) -> TickReport {
        self.tick += 1;
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        self.steer_players(registry, inputs, physics, now_ms, &mut report);
        physics.step(dt);
        report.skipped_bodies = harvest(registry, physics);

        report
    }

    /// Dash state machine and velocity assignment for every player
    fn steer_players(
        &self,
        registry: &mut EntityRegistry,
        inputs: &mut InputBuffer,
        physics: &mut PhysicsWorld,
        now_ms: u64,
        report: &mut TickReport,
    ) {
        let cfg = &self.config;

        for player in registry.players_mut() {
            let edges = inputs.consume_edges(&player.id).unwrap_or_default();
            let intent = inputs.intent(&player.id).copied().unwrap_or_default();

            if edges.alt {
                debug!(player_id = %player.id, "Alt action requested");
            }

            if player.dashing {
                // Dash velocity stands until the dash expires
                let started = player.dash_start_ms.unwrap_or(0);
                if now_ms.saturating_sub(started) >= cfg.dash_duration_ms {
                    player.dashing = false;
                    report.dashes_ended += 1;
                }
                continue;
            }

            let velocity = if intent.is_moving() {
                let (dir_x, dir_y) = intent.direction();
                let angle = (dir_y as f32).atan2(dir_x as f32);
                let heading = Vec2::from_angle(angle);

                let can_dash = player.dash_start_ms.map_or(true, |started| {
                    now_ms.saturating_sub(started)
                        >= cfg.dash_duration_ms.saturating_add(cfg.dash_cooldown_ms)
                });

                if edges.dash && can_dash {
                    player.dash_start_ms = Some(now_ms);
                    player.dashing = true;
                    report.dashes_started += 1;
                    debug!(player_id = %player.id, "Dash started");
                    heading * cfg.dash_speed
                } else {
                    heading * cfg.max_speed
                }
            } else {
                Vec2::ZERO
            };

            if !physics.set_velocity(&player.id, velocity) {
                warn!(player_id = %player.id, "No physics body for player, skipping");
            }
        }
    }
}

/// Copy post-step positions back into the registry.
/// Returns the number of bodies with no registry entry.
pub fn harvest(registry: &mut EntityRegistry, physics: &PhysicsWorld) -> usize {
    let mut skipped = 0;

    for (id, body) in physics.bodies() {
        let updated = match body.kind {
            BodyKind::Static => continue,
            BodyKind::Player => registry.player_mut(id).map(|p| {
                p.x = body.position.x;
                p.y = body.position.y;
            }),
            BodyKind::Dynamic => registry.dynamic_object_mut(id).map(|d| {
                d.x = body.position.x;
                d.y = body.position.y;
            }),
        };

        if updated.is_none() {
            log_orphan(id, body.kind);
            skipped += 1;
        }
    }

    skipped
}

fn log_orphan(id: &EntityId, kind: BodyKind) {
    warn!(entity_id = %id, kind = ?kind, "Physics body has no registry entry, skipping harvest");
}
