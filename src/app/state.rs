//! Application state shared across routes

use std::sync::Arc;

use crate::config::Config;
use crate::game::identity::IdentityService;
use crate::game::world::{spawn_world, GameWorld, WorldHandle};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub world: WorldHandle,
}

impl AppState {
    /// Builds the world and starts its task. Must be called inside a tokio runtime.
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let identity = IdentityService::new(config.game.map.spawn_area());
        let world = spawn_world(GameWorld::new(config.game, identity));

        Self { config, world }
    }
}
