//! World simulation modules

pub mod broadcast;
pub mod entity;
pub mod identity;
pub mod input;
pub mod lifecycle;
pub mod map;
pub mod physics;
pub mod preset;
pub mod registry;
pub mod tick;
pub mod world;
