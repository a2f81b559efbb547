//! Action completion events.
//!
//! When the [`ActionManager`](crate::resources::actionmanager::ActionManager)
//! drops an action that reported done, [`update_actions`](crate::systems::actions::update_actions)
//! triggers an [`ActionFinishedEvent`]. Observers can chain follow-up actions
//! or despawn the target.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<ActionFinishedEvent>| {
//!     if trigger.event().tag == CAMERA_TAG {
//!         // the followed node left the scene
//!     }
//! });
//! ```

use bevy_ecs::prelude::*;

/// Event emitted when an action finishes.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionFinishedEvent {
    /// The node the action was running on.
    pub entity: Entity,
    /// Tag of the finished action, `INVALID_TAG` if it had none.
    pub tag: i32,
}
