//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::game::map::MapConfig;
use crate::game::tick::MovementConfig;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Allowed client origins for CORS, comma-separated, `*` for any
    pub client_origin: String,
    /// Simulation tuning
    pub game: GameConfig,
}

/// Gameplay and simulation tuning
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameConfig {
    /// Simulation ticks per second
    pub tick_rate: u32,
    pub map: MapConfig,
    pub movement: MovementConfig,
    pub player_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: 60,
            map: MapConfig::default(),
            movement: MovementConfig::default(),
            player_radius: 16.0,
        }
    }
}

/// Fastest supported simulation rate; the tick period is whole microseconds
pub const MAX_TICK_RATE: u32 = 1000;

impl GameConfig {
    /// Fixed simulation step in seconds
    pub fn tick_delta(&self) -> f32 {
        1.0 / self.tick_rate as f32
    }

    pub fn tick_duration(&self) -> std::time::Duration {
        std::time::Duration::from_micros(1_000_000 / self.tick_rate as u64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 || self.tick_rate > MAX_TICK_RATE {
            return Err(ConfigError::Invalid(
                "TICK_RATE",
                format!("must be between 1 and {}", MAX_TICK_RATE),
            ));
        }

        let floats = [
            ("MAP_WIDTH", self.map.width),
            ("MAP_HEIGHT", self.map.height),
            ("SPAWN_INSET", self.map.spawn_inset),
            ("WALL_OFFSET", self.map.wall_offset),
            ("MAX_SPEED", self.movement.max_speed),
            ("DASH_SPEED", self.movement.dash_speed),
            ("PLAYER_RADIUS", self.player_radius),
        ];
        for (key, value) in floats {
            if !value.is_finite() {
                return Err(ConfigError::Invalid(key, format!("{} is not finite", value)));
            }
        }

        if self.map.width <= 0.0 || self.map.height <= 0.0 {
            return Err(ConfigError::Invalid("MAP_WIDTH/MAP_HEIGHT", "must be positive".to_string()));
        }
        let inset = self.map.spawn_inset * 2.0;
        if self.map.spawn_inset < 0.0 || inset >= self.map.width || inset >= self.map.height {
            return Err(ConfigError::Invalid(
                "SPAWN_INSET",
                format!("{} leaves no room to spawn", self.map.spawn_inset),
            ));
        }
        if self.player_radius <= 0.0 {
            return Err(ConfigError::Invalid("PLAYER_RADIUS", "must be positive".to_string()));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8081".to_string()),
        };

        let defaults = GameConfig::default();
        let game = GameConfig {
            tick_rate: parse_or(&lookup, "TICK_RATE", defaults.tick_rate)?,
            map: MapConfig {
                width: parse_or(&lookup, "MAP_WIDTH", defaults.map.width)?,
                height: parse_or(&lookup, "MAP_HEIGHT", defaults.map.height)?,
                spawn_inset: parse_or(&lookup, "SPAWN_INSET", defaults.map.spawn_inset)?,
                wall_offset: parse_or(&lookup, "WALL_OFFSET", defaults.map.wall_offset)?,
            },
            movement: MovementConfig {
                max_speed: parse_or(&lookup, "MAX_SPEED", defaults.movement.max_speed)?,
                dash_speed: parse_or(&lookup, "DASH_SPEED", defaults.movement.dash_speed)?,
                dash_duration_ms: parse_or(
                    &lookup,
                    "DASH_DURATION_MS",
                    defaults.movement.dash_duration_ms,
                )?,
                dash_cooldown_ms: parse_or(
                    &lookup,
                    "DASH_COOLDOWN_MS",
                    defaults.movement.dash_cooldown_ms,
                )?,
            },
            player_radius: parse_or(&lookup, "PLAYER_RADIUS", defaults.player_radius)?,
        };
        game.validate()?;

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            client_origin: lookup("CLIENT_ORIGIN").unwrap_or_else(|| "*".to_string()),
            game,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(key, format!("cannot parse {:?}", raw))),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),

    #[error("Invalid server address format")]
    InvalidAddress,
}
