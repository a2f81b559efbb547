//! Action scheduler resource.
//!
//! [`ActionManager`] owns every running action, grouped by target entity. Each
//! frame [`update_actions`](crate::systems::actions::update_actions) calls
//! [`ActionManager::update`], which steps every action of every unpaused
//! target, stops and drops the ones that report done, and returns what
//! finished so the system can emit events.
//!
//! Targets are visited in `Entity` order and actions per target in the order
//! they were added, so a frame is deterministic. Actions whose target has been
//! despawned are stopped and dropped on the next update.

use bevy_ecs::prelude::*;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::actions::action::{Action, INVALID_TAG};
use crate::actions::error::ActionError;
use crate::actions::node::NodeAccess;

/// An action that completed during an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishedAction {
    pub target: Entity,
    pub tag: i32,
}

/// Actions running on one target.
#[derive(Debug, Default)]
struct TargetActions {
    actions: SmallVec<[Box<dyn Action>; 4]>,
    paused: bool,
}

/// Scheduler for all running actions.
#[derive(Resource, Debug, Default)]
pub struct ActionManager {
    targets: FxHashMap<Entity, TargetActions>,
}

impl ActionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start `action` on `target` and keep stepping it every update.
    ///
    /// A target that is already paused stays paused regardless of `paused`.
    pub fn add_action(
        &mut self,
        mut action: Box<dyn Action>,
        target: Entity,
        paused: bool,
        nodes: &mut dyn NodeAccess,
    ) -> Result<(), ActionError> {
        if !nodes.contains(target) {
            warn!("ActionManager::add_action: target {target} does not exist");
            return Err(ActionError::MissingTarget(target));
        }
        action.start_with_target(target, nodes);
        let entry = self.targets.entry(target).or_insert_with(|| TargetActions {
            actions: SmallVec::new(),
            paused,
        });
        debug!("action tag {} added to {target}", action.tag());
        entry.actions.push(action);
        Ok(())
    }

    /// Advance every unpaused action by `dt` and collect the ones that finished.
    pub fn update(&mut self, dt: f32, nodes: &mut dyn NodeAccess) -> Vec<FinishedAction> {
        let mut finished = Vec::new();
        let mut order: Vec<Entity> = self.targets.keys().copied().collect();
        order.sort_unstable();

        for target in order {
            if !nodes.contains(target) {
                if let Some(mut gone) = self.targets.remove(&target) {
                    debug!(
                        "dropping {} action(s) of despawned target {target}",
                        gone.actions.len()
                    );
                    for action in gone.actions.iter_mut() {
                        action.stop();
                    }
                }
                continue;
            }

            let Some(element) = self.targets.get_mut(&target) else {
                continue;
            };
            if element.paused {
                continue;
            }

            let mut i = 0;
            while i < element.actions.len() {
                let action = &mut element.actions[i];
                action.step(dt, nodes);
                if action.is_done(&*nodes) {
                    action.stop();
                    let done = element.actions.remove(i);
                    finished.push(FinishedAction {
                        target,
                        tag: done.tag(),
                    });
                } else {
                    i += 1;
                }
            }

            if element.actions.is_empty() && !element.paused {
                self.targets.remove(&target);
            }
        }

        finished
    }

    /// Stop and drop every action on every target.
    pub fn remove_all_actions(&mut self) {
        for (_, mut element) in self.targets.drain() {
            for action in element.actions.iter_mut() {
                action.stop();
            }
        }
    }

    /// Stop and drop every action on `target`. Returns how many were removed.
    pub fn remove_all_actions_from_target(&mut self, target: Entity) -> usize {
        let Some(mut element) = self.targets.remove(&target) else {
            return 0;
        };
        for action in element.actions.iter_mut() {
            action.stop();
        }
        element.actions.len()
    }

    /// Stop and drop the first action on `target` tagged `tag`.
    pub fn remove_action_by_tag(&mut self, tag: i32, target: Entity) -> bool {
        if tag == INVALID_TAG {
            warn!("remove_action_by_tag: invalid tag");
            return false;
        }
        let Some(element) = self.targets.get_mut(&target) else {
            return false;
        };
        let Some(index) = element.actions.iter().position(|a| a.tag() == tag) else {
            return false;
        };
        let mut action = element.actions.remove(index);
        action.stop();
        true
    }

    /// Stop and drop every action on `target` tagged `tag`.
    pub fn remove_all_actions_by_tag(&mut self, tag: i32, target: Entity) -> usize {
        if tag == INVALID_TAG {
            warn!("remove_all_actions_by_tag: invalid tag");
            return 0;
        }
        self.remove_where(target, |a| a.tag() == tag)
    }

    /// Stop and drop every action on `target` sharing a bit with `flags`.
    pub fn remove_actions_by_flags(&mut self, flags: u32, target: Entity) -> usize {
        if flags == 0 {
            return 0;
        }
        self.remove_where(target, |a| a.flags() & flags != 0)
    }

    fn remove_where(&mut self, target: Entity, pred: impl Fn(&dyn Action) -> bool) -> usize {
        let Some(element) = self.targets.get_mut(&target) else {
            return 0;
        };
        let before = element.actions.len();
        element.actions.retain(|a| {
            if pred(a.as_ref()) {
                a.stop();
                false
            } else {
                true
            }
        });
        before - element.actions.len()
    }

    /// First action on `target` tagged `tag`.
    pub fn get_action_by_tag(&self, tag: i32, target: Entity) -> Option<&dyn Action> {
        if tag == INVALID_TAG {
            warn!("get_action_by_tag: invalid tag");
            return None;
        }
        self.targets
            .get(&target)?
            .actions
            .iter()
            .find(|a| a.tag() == tag)
            .map(|a| a.as_ref())
    }

    pub fn number_of_running_actions(&self) -> usize {
        self.targets.values().map(|e| e.actions.len()).sum()
    }

    pub fn number_of_running_actions_in_target(&self, target: Entity) -> usize {
        self.targets.get(&target).map_or(0, |e| e.actions.len())
    }

    /// Number of actions on `target` tagged `tag`.
    pub fn number_of_running_actions_by_tag(&self, tag: i32, target: Entity) -> usize {
        self.targets
            .get(&target)
            .map_or(0, |e| e.actions.iter().filter(|a| a.tag() == tag).count())
    }

    pub fn pause_target(&mut self, target: Entity) {
        if let Some(element) = self.targets.get_mut(&target) {
            element.paused = true;
        }
    }

    pub fn resume_target(&mut self, target: Entity) {
        if let Some(element) = self.targets.get_mut(&target) {
            element.paused = false;
        }
    }

    pub fn is_target_paused(&self, target: Entity) -> bool {
        self.targets.get(&target).is_some_and(|e| e.paused)
    }

    /// Pause every target that is currently running and return them, so the
    /// same set can be handed back to [`resume_targets`](Self::resume_targets).
    pub fn pause_all_running_actions(&mut self) -> Vec<Entity> {
        let mut paused = Vec::new();
        for (target, element) in self.targets.iter_mut() {
            if !element.paused {
                element.paused = true;
                paused.push(*target);
            }
        }
        paused.sort_unstable();
        paused
    }

    pub fn resume_targets(&mut self, targets: &[Entity]) {
        for target in targets {
            self.resume_target(*target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::follow::{Follow, Rect};
    use crate::actions::interval::{DelayTime, MoveBy};
    use crate::components::mapposition::MapPosition;
    use crate::components::running::Running;
    use glam::Vec2;

    fn tagged(mut action: Box<dyn Action>, tag: i32) -> Box<dyn Action> {
        action.set_tag(tag);
        action
    }

    fn node(world: &mut World) -> Entity {
        world.spawn((MapPosition::new(0.0, 0.0), Running)).id()
    }

    #[test]
    fn test_add_to_missing_target_fails() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let gone = node(&mut world);
        world.despawn(gone);

        let err = mgr
            .add_action(Box::new(DelayTime::new(1.0)), gone, false, &mut world)
            .unwrap_err();
        assert_eq!(err, ActionError::MissingTarget(gone));
        assert_eq!(mgr.number_of_running_actions(), 0);
    }

    #[test]
    fn test_add_starts_action() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let e = node(&mut world);
        mgr.add_action(tagged(Box::new(DelayTime::new(1.0)), 3), e, false, &mut world)
            .unwrap();

        let action = mgr.get_action_by_tag(3, e).unwrap();
        assert_eq!(action.target(), Some(e));
        assert_eq!(mgr.number_of_running_actions_in_target(e), 1);
    }

    #[test]
    fn test_update_removes_finished_actions() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let e = node(&mut world);
        mgr.add_action(tagged(Box::new(MoveBy::new(0.5, Vec2::new(1.0, 0.0))), 1), e, false, &mut world)
            .unwrap();
        mgr.add_action(tagged(Box::new(DelayTime::new(1.0)), 2), e, false, &mut world)
            .unwrap();

        assert!(mgr.update(0.25, &mut world).is_empty());
        let finished = mgr.update(0.25, &mut world);
        assert_eq!(finished, vec![FinishedAction { target: e, tag: 1 }]);
        assert_eq!(mgr.number_of_running_actions_in_target(e), 1);

        let finished = mgr.update(0.5, &mut world);
        assert_eq!(finished, vec![FinishedAction { target: e, tag: 2 }]);
        assert_eq!(mgr.number_of_running_actions(), 0);
    }

    #[test]
    fn test_despawned_target_drops_actions() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let e = node(&mut world);
        mgr.add_action(Box::new(DelayTime::new(5.0)), e, false, &mut world)
            .unwrap();
        world.despawn(e);

        assert!(mgr.update(0.1, &mut world).is_empty());
        assert_eq!(mgr.number_of_running_actions(), 0);
    }

    #[test]
    fn test_paused_target_is_not_stepped() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let e = node(&mut world);
        mgr.add_action(Box::new(MoveBy::new(1.0, Vec2::new(10.0, 0.0))), e, true, &mut world)
            .unwrap();
        assert!(mgr.is_target_paused(e));

        mgr.update(0.5, &mut world);
        assert_eq!(world.get::<MapPosition>(e).unwrap().pos, Vec2::ZERO);

        mgr.resume_target(e);
        mgr.update(0.5, &mut world);
        assert_eq!(world.get::<MapPosition>(e).unwrap().pos, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_pause_all_and_resume() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let a = node(&mut world);
        let b = node(&mut world);
        mgr.add_action(Box::new(DelayTime::new(1.0)), a, false, &mut world)
            .unwrap();
        mgr.add_action(Box::new(DelayTime::new(1.0)), b, true, &mut world)
            .unwrap();

        let paused = mgr.pause_all_running_actions();
        assert_eq!(paused, vec![a]);
        assert!(mgr.is_target_paused(a));

        mgr.resume_targets(&paused);
        assert!(!mgr.is_target_paused(a));
        assert!(mgr.is_target_paused(b));
    }

    #[test]
    fn test_remove_by_tag() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let e = node(&mut world);
        for tag in [7, 7, 8] {
            mgr.add_action(tagged(Box::new(DelayTime::new(1.0)), tag), e, false, &mut world)
                .unwrap();
        }

        assert!(!mgr.remove_action_by_tag(INVALID_TAG, e));
        assert!(mgr.remove_action_by_tag(7, e));
        assert_eq!(mgr.number_of_running_actions_by_tag(7, e), 1);
        assert_eq!(mgr.remove_all_actions_by_tag(7, e), 1);
        assert_eq!(mgr.number_of_running_actions_in_target(e), 1);
        assert!(mgr.get_action_by_tag(8, e).is_some());
        assert!(mgr.get_action_by_tag(7, e).is_none());
    }

    #[test]
    fn test_remove_by_flags() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let e = node(&mut world);
        let mut flagged: Box<dyn Action> = Box::new(DelayTime::new(1.0));
        flagged.set_flags(0b10);
        mgr.add_action(flagged, e, false, &mut world).unwrap();
        mgr.add_action(Box::new(DelayTime::new(1.0)), e, false, &mut world)
            .unwrap();

        assert_eq!(mgr.remove_actions_by_flags(0b01, e), 0);
        assert_eq!(mgr.remove_actions_by_flags(0b11, e), 1);
        assert_eq!(mgr.number_of_running_actions_in_target(e), 1);
    }

    #[test]
    fn test_remove_all() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let a = node(&mut world);
        let b = node(&mut world);
        mgr.add_action(Box::new(DelayTime::new(1.0)), a, false, &mut world)
            .unwrap();
        mgr.add_action(Box::new(DelayTime::new(1.0)), b, false, &mut world)
            .unwrap();

        assert_eq!(mgr.remove_all_actions_from_target(a), 1);
        assert_eq!(mgr.remove_all_actions_from_target(a), 0);
        mgr.remove_all_actions();
        assert_eq!(mgr.number_of_running_actions(), 0);
    }

    #[test]
    fn test_follow_finishes_when_followed_leaves_scene() {
        let mut world = World::new();
        let mut mgr = ActionManager::new();
        let camera = node(&mut world);
        let hero = node(&mut world);
        let follow = Follow::new(hero, &Vec2::new(800.0, 600.0), Rect::ZERO).unwrap();
        mgr.add_action(tagged(Box::new(follow), 99), camera, false, &mut world)
            .unwrap();

        assert!(mgr.update(0.016, &mut world).is_empty());
        world.entity_mut(hero).remove::<Running>();
        let finished = mgr.update(0.016, &mut world);
        assert_eq!(finished, vec![FinishedAction { target: camera, tag: 99 }]);
    }
}
