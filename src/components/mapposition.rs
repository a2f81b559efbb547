//! World-space position of a scene node.
//!
//! This is the only piece of node state the action core reads and writes.

use bevy_ecs::prelude::Component;
use glam::Vec2;

/// World-space position (pivot) of an entity.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        MapPosition {
            pos: Vec2::new(x, y),
        }
    }

    pub fn from_vec(pos: Vec2) -> Self {
        MapPosition { pos }
    }
}
