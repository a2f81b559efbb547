//! Marker for nodes that are part of the live scene.
//!
//! A node is considered running while its entity exists and carries
//! [`Running`]. Removing the marker (or despawning the entity) is how the
//! scene tells actions such as [`Follow`](crate::actions::follow::Follow)
//! that the node they track has left the scene.

use bevy_ecs::prelude::Component;

/// Marker component: the entity is active in the scene graph.
#[derive(Component, Clone, Copy, Debug, Default)]
pub struct Running;
