//! Map extents and coordinate conventions
//!
//! World coordinates are centered on the map origin. Display coordinates
//! (what is stored and broadcast) have their origin at the top-left corner,
//! offset by half the map extents.

use glam::Vec2;

use super::physics::Bounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapConfig {
    /// Map width in display pixels
    pub width: f32,
    /// Map height in display pixels
    pub height: f32,
    /// Players never spawn closer than this to an edge
    pub spawn_inset: f32,
    /// How far outside the visible map the invisible perimeter sits
    pub wall_offset: f32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 1600.0,
            height: 1200.0,
            spawn_inset: 50.0,
            wall_offset: 5.0,
        }
    }
}

/// Rectangle player spawn positions are drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnArea {
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
}

impl SpawnArea {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

impl MapConfig {
    pub fn world_to_display(&self, world_x: f32, world_y: f32) -> (f32, f32) {
        (world_x + self.width / 2.0, world_y + self.height / 2.0)
    }

    pub fn display_to_world(&self, display_x: f32, display_y: f32) -> (f32, f32) {
        (display_x - self.width / 2.0, display_y - self.height / 2.0)
    }

    pub fn spawn_area(&self) -> SpawnArea {
        SpawnArea {
            min_x: self.spawn_inset,
            max_x: self.width - self.spawn_inset,
            min_y: self.spawn_inset,
            max_y: self.height - self.spawn_inset,
        }
    }

    /// Zero-thickness perimeter just outside the visible map
    pub fn wall_bounds(&self) -> Bounds {
        Bounds {
            min: Vec2::splat(-self.wall_offset),
            max: Vec2::new(self.width + self.wall_offset, self.height + self.wall_offset),
        }
    }
}
