//! Action scheduler systems.
//!
//! [`update_actions`] is an exclusive system: actions need mutable access to
//! arbitrary nodes while the [`ActionManager`] itself is borrowed, so the
//! manager is lifted out of the world with `resource_scope` for the duration
//! of the step. Completions are triggered as [`ActionFinishedEvent`]s after the
//! manager is back in place, so observers may schedule new actions.

use bevy_ecs::prelude::*;
use log::info;

use crate::actions::action::Action;
use crate::actions::error::ActionError;
use crate::events::actionfinished::ActionFinishedEvent;
use crate::resources::actionmanager::ActionManager;
use crate::resources::worldtime::WorldTime;

/// Step every scheduled action by the current `WorldTime::delta`.
pub fn update_actions(world: &mut World) {
    if !world.contains_resource::<ActionManager>() {
        return;
    }
    let dt = world.get_resource::<WorldTime>().map_or(0.0, |wt| wt.delta);

    let finished = world.resource_scope(|world: &mut World, mut manager: Mut<ActionManager>| {
        manager.update(dt, world)
    });

    for done in finished {
        world.trigger(ActionFinishedEvent {
            entity: done.target,
            tag: done.tag,
        });
    }
}

/// Hand `action` to the scheduler, starting it on `target` right away.
///
/// Inserts an [`ActionManager`] if the world has none yet.
pub fn run_action(
    world: &mut World,
    target: Entity,
    action: Box<dyn Action>,
) -> Result<(), ActionError> {
    run_action_paused(world, target, action, false)
}

/// Like [`run_action`], optionally leaving the target paused.
pub fn run_action_paused(
    world: &mut World,
    target: Entity,
    action: Box<dyn Action>,
    paused: bool,
) -> Result<(), ActionError> {
    world.init_resource::<ActionManager>();
    world.resource_scope(|world: &mut World, mut manager: Mut<ActionManager>| {
        manager.add_action(action, target, paused, world)
    })
}

/// Log every finished action.
pub fn action_finished_observer(trigger: On<ActionFinishedEvent>) {
    let event = trigger.event();
    info!("action (tag {}) finished on {}", event.tag, event.entity);
}
