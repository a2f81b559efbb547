//! Time-bounded actions.
//!
//! An [`IntervalAction`] has a fixed duration. Its `step(dt)` accumulates
//! elapsed time and calls `update(t)` with `t = elapsed / duration` clamped to
//! `[0, 1]`; it is done once `elapsed >= duration`. Completion depends only on
//! the sum of the deltas it was fed, so a [`Speed`](super::speed::Speed)
//! wrapper can rescale time without losing any of it.
//!
//! Primitive intervals:
//! - [`MoveBy`] – translate the target by a fixed offset
//! - [`MoveTo`] – move the target to an absolute position
//! - [`DelayTime`] – wait, touching nothing

use bevy_ecs::entity::Entity;
use glam::Vec2;
use log::debug;

use super::action::{Action, ActionCore};
use super::node::NodeAccess;

/// An action with a known duration that can be driven by normalized time.
pub trait IntervalAction: Action {
    fn interval(&self) -> &IntervalState;

    fn duration(&self) -> f32 {
        self.interval().duration()
    }

    fn elapsed(&self) -> f32 {
        self.interval().elapsed()
    }

    fn clone_interval(&self) -> Box<dyn IntervalAction>;

    fn reverse_interval(&self) -> Option<Box<dyn IntervalAction>>;
}

/// Duration and elapsed time of an interval action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IntervalState {
    duration: f32,
    elapsed: f32,
}

impl IntervalState {
    /// Durations too close to zero are bumped to `f32::EPSILON` so the
    /// normalized time is always defined.
    ///
    /// Negative durations are kept as given: the action reports done after
    /// its first step and `progress` clamps to 0, so it never touches the
    /// target. [`ActionDesc`](super::desc::ActionDesc) rejects them up front.
    pub fn new(duration: f32) -> Self {
        let duration = if duration.abs() <= f32::EPSILON {
            f32::EPSILON
        } else {
            duration
        };
        IntervalState {
            duration,
            elapsed: 0.0,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn restart(&mut self) {
        self.elapsed = 0.0;
    }

    /// Accumulate `dt` and return the normalized time to apply.
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.progress()
    }

    pub fn progress(&self) -> f32 {
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// Translates the target by `delta` over `duration` seconds.
///
/// The start position is read when the action starts, so a repeated `MoveBy`
/// keeps accumulating.
#[derive(Clone, Debug)]
pub struct MoveBy {
    core: ActionCore,
    interval: IntervalState,
    delta: Vec2,
    start_pos: Vec2,
}

impl MoveBy {
    pub fn new(duration: f32, delta: Vec2) -> Self {
        MoveBy {
            core: ActionCore::default(),
            interval: IntervalState::new(duration),
            delta,
            start_pos: Vec2::ZERO,
        }
    }

    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    fn fresh(&self) -> Self {
        MoveBy::new(self.interval.duration(), self.delta)
    }
}

impl Action for MoveBy {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn start_with_target(&mut self, target: Entity, nodes: &mut dyn NodeAccess) {
        self.core.start(target);
        self.interval.restart();
        self.start_pos = nodes.position(target).unwrap_or_default();
    }

    fn step(&mut self, dt: f32, nodes: &mut dyn NodeAccess) {
        let t = self.interval.advance(dt);
        self.update(t, nodes);
    }

    fn update(&mut self, time: f32, nodes: &mut dyn NodeAccess) {
        let Some(target) = self.core.target else {
            return;
        };
        nodes.set_position(target, self.start_pos + self.delta * time);
    }

    fn is_done(&self, _nodes: &dyn NodeAccess) -> bool {
        self.interval.is_done()
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }

    fn reverse(&self) -> Option<Box<dyn Action>> {
        Some(Box::new(MoveBy::new(self.interval.duration(), -self.delta)))
    }

    fn progress(&self) -> Option<f32> {
        Some(self.interval.progress())
    }
}

impl IntervalAction for MoveBy {
    fn interval(&self) -> &IntervalState {
        &self.interval
    }

    fn clone_interval(&self) -> Box<dyn IntervalAction> {
        Box::new(self.fresh())
    }

    fn reverse_interval(&self) -> Option<Box<dyn IntervalAction>> {
        Some(Box::new(MoveBy::new(self.interval.duration(), -self.delta)))
    }
}

/// Moves the target to `end` over `duration` seconds.
#[derive(Clone, Debug)]
pub struct MoveTo {
    core: ActionCore,
    interval: IntervalState,
    end: Vec2,
    start_pos: Vec2,
    delta: Vec2,
}

impl MoveTo {
    pub fn new(duration: f32, end: Vec2) -> Self {
        MoveTo {
            core: ActionCore::default(),
            interval: IntervalState::new(duration),
            end,
            start_pos: Vec2::ZERO,
            delta: Vec2::ZERO,
        }
    }

    pub fn end(&self) -> Vec2 {
        self.end
    }

    fn fresh(&self) -> Self {
        MoveTo::new(self.interval.duration(), self.end)
    }
}

impl Action for MoveTo {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn start_with_target(&mut self, target: Entity, nodes: &mut dyn NodeAccess) {
        self.core.start(target);
        self.interval.restart();
        self.start_pos = nodes.position(target).unwrap_or_default();
        self.delta = self.end - self.start_pos;
    }

    fn step(&mut self, dt: f32, nodes: &mut dyn NodeAccess) {
        let t = self.interval.advance(dt);
        self.update(t, nodes);
    }

    fn update(&mut self, time: f32, nodes: &mut dyn NodeAccess) {
        let Some(target) = self.core.target else {
            return;
        };
        // land exactly on the end point instead of start + delta
        let pos = if time >= 1.0 {
            self.end
        } else {
            self.start_pos + self.delta * time
        };
        nodes.set_position(target, pos);
    }

    fn is_done(&self, _nodes: &dyn NodeAccess) -> bool {
        self.interval.is_done()
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }

    fn reverse(&self) -> Option<Box<dyn Action>> {
        debug!("MoveTo has no reverse; use MoveBy instead");
        None
    }

    fn progress(&self) -> Option<f32> {
        Some(self.interval.progress())
    }
}

impl IntervalAction for MoveTo {
    fn interval(&self) -> &IntervalState {
        &self.interval
    }

    fn clone_interval(&self) -> Box<dyn IntervalAction> {
        Box::new(self.fresh())
    }

    fn reverse_interval(&self) -> Option<Box<dyn IntervalAction>> {
        debug!("MoveTo has no reverse; use MoveBy instead");
        None
    }
}

/// Waits for `duration` seconds.
#[derive(Clone, Debug)]
pub struct DelayTime {
    core: ActionCore,
    interval: IntervalState,
}

impl DelayTime {
    pub fn new(duration: f32) -> Self {
        DelayTime {
            core: ActionCore::default(),
            interval: IntervalState::new(duration),
        }
    }
}

impl Action for DelayTime {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn start_with_target(&mut self, target: Entity, _nodes: &mut dyn NodeAccess) {
        self.core.start(target);
        self.interval.restart();
    }

    fn step(&mut self, dt: f32, _nodes: &mut dyn NodeAccess) {
        self.interval.advance(dt);
    }

    fn update(&mut self, _time: f32, _nodes: &mut dyn NodeAccess) {}

    fn is_done(&self, _nodes: &dyn NodeAccess) -> bool {
        self.interval.is_done()
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(DelayTime::new(self.interval.duration()))
    }

    fn reverse(&self) -> Option<Box<dyn Action>> {
        Some(self.clone_action())
    }

    fn progress(&self) -> Option<f32> {
        Some(self.interval.progress())
    }
}

impl IntervalAction for DelayTime {
    fn interval(&self) -> &IntervalState {
        &self.interval
    }

    fn clone_interval(&self) -> Box<dyn IntervalAction> {
        Box::new(DelayTime::new(self.interval.duration()))
    }

    fn reverse_interval(&self) -> Option<Box<dyn IntervalAction>> {
        Some(self.clone_interval())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::mapposition::MapPosition;
    use bevy_ecs::world::World;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn pos(world: &World, e: Entity) -> Vec2 {
        world.get::<MapPosition>(e).unwrap().pos
    }

    #[test]
    fn test_interval_state_zero_duration_is_bumped() {
        let st = IntervalState::new(0.0);
        assert!(st.duration() > 0.0);
        assert!(!st.is_done());
    }

    #[test]
    fn test_negative_duration_finishes_without_moving() {
        let mut world = World::new();
        let e = world.spawn(MapPosition::new(3.0, 4.0)).id();
        let mut mv = MoveBy::new(-1.0, Vec2::new(10.0, 0.0));

        mv.start_with_target(e, &mut world);
        mv.step(0.1, &mut world);
        assert!(mv.is_done(&world));
        assert_eq!(mv.progress(), Some(0.0));
        assert_eq!(world.get::<MapPosition>(e).unwrap().pos, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_interval_state_progress_clamps() {
        let mut st = IntervalState::new(2.0);
        assert!(approx_eq(st.advance(0.5), 0.25));
        assert!(approx_eq(st.advance(5.0), 1.0));
        assert!(st.is_done());
        st.restart();
        assert!(approx_eq(st.elapsed(), 0.0));
    }

    #[test]
    fn test_move_by_halfway_and_end() {
        let mut world = World::new();
        let e = world.spawn(MapPosition::new(10.0, 10.0)).id();
        let mut mv = MoveBy::new(2.0, Vec2::new(4.0, -8.0));

        mv.start_with_target(e, &mut world);
        mv.step(1.0, &mut world);
        assert_eq!(pos(&world, e), Vec2::new(12.0, 6.0));
        assert!(!mv.is_done(&world));

        mv.step(1.0, &mut world);
        assert_eq!(pos(&world, e), Vec2::new(14.0, 2.0));
        assert!(mv.is_done(&world));
        assert_eq!(mv.progress(), Some(1.0));
    }

    #[test]
    fn test_move_by_reverse_negates_delta() {
        let mv = MoveBy::new(1.0, Vec2::new(3.0, 4.0));
        let rev = mv.reverse_interval().unwrap();
        assert!(approx_eq(rev.duration(), 1.0));

        let mut world = World::new();
        let e = world.spawn(MapPosition::new(0.0, 0.0)).id();
        let mut rev = rev;
        rev.start_with_target(e, &mut world);
        rev.step(1.0, &mut world);
        assert_eq!(pos(&world, e), Vec2::new(-3.0, -4.0));
    }

    #[test]
    fn test_move_to_reaches_end() {
        let mut world = World::new();
        let e = world.spawn(MapPosition::new(0.0, 0.0)).id();
        let mut mv = MoveTo::new(2.0, Vec2::new(10.0, 0.0));

        mv.start_with_target(e, &mut world);
        mv.step(0.5, &mut world);
        assert!(approx_eq(pos(&world, e).x, 2.5));
        mv.step(1.5, &mut world);
        assert_eq!(pos(&world, e), Vec2::new(10.0, 0.0));
        assert!(mv.is_done(&world));
    }

    #[test]
    fn test_move_to_has_no_reverse() {
        let mv = MoveTo::new(1.0, Vec2::ONE);
        assert!(mv.reverse().is_none());
        assert!(mv.reverse_interval().is_none());
    }

    #[test]
    fn test_clone_is_idle_and_independent() {
        let mut world = World::new();
        let e = world.spawn(MapPosition::new(0.0, 0.0)).id();
        let mut mv = MoveTo::new(1.0, Vec2::new(5.0, 5.0));
        mv.start_with_target(e, &mut world);
        mv.step(0.5, &mut world);

        let copy = mv.clone_interval();
        assert!(approx_eq(copy.elapsed(), 0.0));
        assert!(copy.target().is_none());
        assert!(approx_eq(mv.elapsed(), 0.5));
    }

    #[test]
    fn test_delay_does_not_move() {
        let mut world = World::new();
        let e = world.spawn(MapPosition::new(1.0, 1.0)).id();
        let mut d = DelayTime::new(1.0);
        d.start_with_target(e, &mut world);
        d.step(0.75, &mut world);
        assert!(!d.is_done(&world));
        d.step(0.25, &mut world);
        assert!(d.is_done(&world));
        assert_eq!(pos(&world, e), Vec2::new(1.0, 1.0));
        assert!(d.reverse().is_some());
    }

    #[test]
    fn test_update_without_target_is_noop() {
        let mut world = World::new();
        let e = world.spawn(MapPosition::new(1.0, 1.0)).id();
        let mut mv = MoveBy::new(1.0, Vec2::ONE);
        mv.update(1.0, &mut world);
        assert_eq!(pos(&world, e), Vec2::new(1.0, 1.0));
    }
}
