//! Narrow view of the scene that actions operate on.
//!
//! Actions never own nodes. They hold an [`Entity`] handle and go through
//! [`NodeAccess`] for the little state they need: position and whether the
//! node is still part of the running scene. Entity handles carry a
//! generation, so a despawned node reads as absent rather than aliasing a
//! newer entity.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::warn;

use crate::components::mapposition::MapPosition;
use crate::components::running::Running;

/// Read/write access to target nodes.
pub trait NodeAccess {
    /// Whether the entity exists at all.
    fn contains(&self, node: Entity) -> bool;
    /// Current position, `None` if the node is absent or has no position.
    fn position(&self, node: Entity) -> Option<Vec2>;
    fn set_position(&mut self, node: Entity, pos: Vec2);
    /// Whether the node is active in the scene.
    fn is_running(&self, node: Entity) -> bool;
}

impl NodeAccess for World {
    fn contains(&self, node: Entity) -> bool {
        node != Entity::PLACEHOLDER && self.get_entity(node).is_ok()
    }

    fn position(&self, node: Entity) -> Option<Vec2> {
        if !NodeAccess::contains(self, node) {
            return None;
        }
        self.get::<MapPosition>(node).map(|mp| mp.pos)
    }

    fn set_position(&mut self, node: Entity, pos: Vec2) {
        if !NodeAccess::contains(self, node) {
            warn!("set_position on missing node {node}");
            return;
        }
        match self.get_mut::<MapPosition>(node) {
            Some(mut mp) => mp.pos = pos,
            None => {
                self.entity_mut(node).insert(MapPosition::from_vec(pos));
            }
        }
    }

    fn is_running(&self, node: Entity) -> bool {
        NodeAccess::contains(self, node) && self.get::<Running>(node).is_some()
    }
}
