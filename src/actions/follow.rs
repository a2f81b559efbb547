//! Camera-style follow action.
//!
//! [`Follow`] repositions its target (usually a layer acting as the camera)
//! every frame so that the followed node sits at the centre of the viewport,
//! optionally clamped so the view never leaves a world rectangle.
//!
//! The viewport size is read once, at construction, from an injected
//! [`ViewportSize`] provider. Boundaries are not recomputed if the viewport
//! is resized later; build a new `Follow` for that.

use bevy_ecs::entity::Entity;
use glam::Vec2;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use super::action::{Action, ActionCore};
use super::error::ActionError;
use super::node::NodeAccess;

/// Axis-aligned rectangle in world coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

/// Anything that can report the current viewport size.
pub trait ViewportSize {
    fn viewport_size(&self) -> Vec2;
}

impl ViewportSize for Vec2 {
    fn viewport_size(&self) -> Vec2 {
        *self
    }
}

/// Clamp without panicking on inverted or NaN bounds.
fn clampf(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Keeps the target positioned so the followed node stays centred.
#[derive(Clone, Debug)]
pub struct Follow {
    core: ActionCore,
    followed: Entity,
    offset: Vec2,
    world_rect: Rect,
    boundary_set: bool,
    boundary_fully_covered: bool,
    full_screen_size: Vec2,
    half_screen_size: Vec2,
    left_boundary: f32,
    right_boundary: f32,
    top_boundary: f32,
    bottom_boundary: f32,
}

impl Follow {
    /// Follow `followed`, clamped to `world_rect` unless it is [`Rect::ZERO`].
    pub fn new(
        followed: Entity,
        viewport: &impl ViewportSize,
        world_rect: Rect,
    ) -> Result<Self, ActionError> {
        Self::with_offset(followed, viewport, 0.0, 0.0, world_rect)
    }

    /// Like [`Follow::new`], shifting the screen centre by `(x_offset, y_offset)`.
    pub fn with_offset(
        followed: Entity,
        viewport: &impl ViewportSize,
        x_offset: f32,
        y_offset: f32,
        world_rect: Rect,
    ) -> Result<Self, ActionError> {
        if followed == Entity::PLACEHOLDER {
            error!("Follow::with_offset error: followed node is missing!");
            return Err(ActionError::MissingFollowedNode);
        }
        Ok(Self::from_screen(
            followed,
            viewport.viewport_size(),
            Vec2::new(x_offset, y_offset),
            world_rect,
        ))
    }

    fn from_screen(followed: Entity, full_screen_size: Vec2, offset: Vec2, world_rect: Rect) -> Self {
        let mut follow = Follow {
            core: ActionCore::default(),
            followed,
            offset,
            world_rect,
            boundary_set: world_rect != Rect::ZERO,
            boundary_fully_covered: false,
            full_screen_size,
            half_screen_size: full_screen_size * 0.5 + offset,
            left_boundary: 0.0,
            right_boundary: 0.0,
            top_boundary: 0.0,
            bottom_boundary: 0.0,
        };

        if follow.boundary_set {
            let r = world_rect;
            follow.left_boundary = -((r.x + r.width) - full_screen_size.x);
            follow.right_boundary = -r.x;
            follow.top_boundary = -r.y;
            follow.bottom_boundary = -((r.y + r.height) - full_screen_size.y);

            // viewport wider than the world: pin both limits to the middle
            if follow.right_boundary < follow.left_boundary {
                let mid = (follow.left_boundary + follow.right_boundary) / 2.0;
                follow.left_boundary = mid;
                follow.right_boundary = mid;
            }
            if follow.top_boundary < follow.bottom_boundary {
                let mid = (follow.top_boundary + follow.bottom_boundary) / 2.0;
                follow.top_boundary = mid;
                follow.bottom_boundary = mid;
            }

            follow.boundary_fully_covered = follow.top_boundary == follow.bottom_boundary
                && follow.left_boundary == follow.right_boundary;
        }

        follow
    }

    pub fn followed(&self) -> Entity {
        self.followed
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn world_rect(&self) -> Rect {
        self.world_rect
    }

    pub fn is_boundary_set(&self) -> bool {
        self.boundary_set
    }

    /// The whole world fits in the viewport; the target never moves.
    pub fn is_boundary_fully_covered(&self) -> bool {
        self.boundary_fully_covered
    }

    pub fn full_screen_size(&self) -> Vec2 {
        self.full_screen_size
    }

    pub fn half_screen_size(&self) -> Vec2 {
        self.half_screen_size
    }

    /// `(left, right, top, bottom)` limits for the target position.
    pub fn boundaries(&self) -> (f32, f32, f32, f32) {
        (
            self.left_boundary,
            self.right_boundary,
            self.top_boundary,
            self.bottom_boundary,
        )
    }

    fn fresh(&self) -> Self {
        Follow::from_screen(
            self.followed,
            self.full_screen_size,
            self.offset,
            self.world_rect,
        )
    }
}

impl Action for Follow {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn step(&mut self, _dt: f32, nodes: &mut dyn NodeAccess) {
        let Some(target) = self.core.target else {
            return;
        };
        if self.boundary_set && self.boundary_fully_covered {
            return;
        }
        let Some(followed_pos) = nodes.position(self.followed) else {
            debug!("Follow: followed node {} has no position", self.followed);
            return;
        };

        let desired = self.half_screen_size - followed_pos;
        let pos = if self.boundary_set {
            Vec2::new(
                clampf(desired.x, self.left_boundary, self.right_boundary),
                clampf(desired.y, self.bottom_boundary, self.top_boundary),
            )
        } else {
            desired
        };
        nodes.set_position(target, pos);
    }

    fn is_done(&self, nodes: &dyn NodeAccess) -> bool {
        !nodes.is_running(self.followed)
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }

    /// Tracking has no mirror image; this is the same as a clone.
    fn reverse(&self) -> Option<Box<dyn Action>> {
        Some(Box::new(self.fresh()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::action::ActionState;
    use crate::components::mapposition::MapPosition;
    use crate::components::running::Running;
    use bevy_ecs::world::World;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn pos(world: &World, e: Entity) -> Vec2 {
        world.get::<MapPosition>(e).unwrap().pos
    }

    fn setup(followed_at: Vec2) -> (World, Entity, Entity) {
        let mut world = World::new();
        let camera = world.spawn((MapPosition::new(0.0, 0.0), Running)).id();
        let hero = world.spawn((MapPosition::from_vec(followed_at), Running)).id();
        (world, camera, hero)
    }

    #[test]
    fn test_placeholder_followed_fails() {
        let err = Follow::new(Entity::PLACEHOLDER, &VIEWPORT, Rect::ZERO).unwrap_err();
        assert_eq!(err, ActionError::MissingFollowedNode);
    }

    #[test]
    fn test_unbounded_centres_followed_node() {
        let (mut world, camera, hero) = setup(Vec2::new(100.0, 50.0));
        let mut follow = Follow::new(hero, &VIEWPORT, Rect::ZERO).unwrap();
        assert!(!follow.is_boundary_set());

        follow.start_with_target(camera, &mut world);
        follow.step(0.016, &mut world);
        assert_eq!(pos(&world, camera), Vec2::new(300.0, 250.0));

        for p in [Vec2::new(-40.0, 7.5), Vec2::new(1000.0, -250.0)] {
            world.get_mut::<MapPosition>(hero).unwrap().pos = p;
            follow.step(0.016, &mut world);
            assert_eq!(pos(&world, camera), follow.half_screen_size() - p);
        }
    }

    #[test]
    fn test_offset_shifts_half_screen() {
        let hero = World::new().spawn_empty().id();
        let follow = Follow::with_offset(hero, &VIEWPORT, 10.0, -20.0, Rect::ZERO).unwrap();
        assert_eq!(follow.full_screen_size(), VIEWPORT);
        assert_eq!(follow.half_screen_size(), Vec2::new(410.0, 280.0));
    }

    #[test]
    fn test_boundaries_for_large_world() {
        let hero = World::new().spawn_empty().id();
        let follow = Follow::new(hero, &VIEWPORT, Rect::new(0.0, 0.0, 2000.0, 1500.0)).unwrap();
        let (left, right, top, bottom) = follow.boundaries();
        assert_eq!(left, -1200.0);
        assert_eq!(right, 0.0);
        assert_eq!(top, 0.0);
        assert_eq!(bottom, -900.0);
        assert!(!follow.is_boundary_fully_covered());
    }

    #[test]
    fn test_bounded_position_stays_within_limits() {
        let (mut world, camera, hero) = setup(Vec2::ZERO);
        let mut follow = Follow::new(hero, &VIEWPORT, Rect::new(0.0, 0.0, 2000.0, 1500.0)).unwrap();
        follow.start_with_target(camera, &mut world);
        let (left, right, top, bottom) = follow.boundaries();

        for p in [
            Vec2::new(-5000.0, -5000.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(700.0, 400.0),
            Vec2::new(1999.0, 1499.0),
            Vec2::new(9000.0, 9000.0),
        ] {
            world.get_mut::<MapPosition>(hero).unwrap().pos = p;
            follow.step(0.0, &mut world);
            let c = pos(&world, camera);
            assert!(c.x >= left.min(right) && c.x <= left.max(right), "x {} for {:?}", c.x, p);
            assert!(c.y >= bottom.min(top) && c.y <= bottom.max(top), "y {} for {:?}", c.y, p);
        }

        // inside the range, no clamping happens
        world.get_mut::<MapPosition>(hero).unwrap().pos = Vec2::new(700.0, 400.0);
        follow.step(0.0, &mut world);
        assert_eq!(pos(&world, camera), Vec2::new(-300.0, -100.0));
    }

    #[test]
    fn test_small_world_collapses_one_axis() {
        let hero = World::new().spawn_empty().id();
        // narrower than the viewport, taller than it
        let follow = Follow::new(hero, &VIEWPORT, Rect::new(0.0, 0.0, 400.0, 1200.0)).unwrap();
        let (left, right, top, bottom) = follow.boundaries();
        assert_eq!(left, right);
        assert_eq!(left, 200.0);
        assert!(top > bottom);
        assert!(!follow.is_boundary_fully_covered());
    }

    #[test]
    fn test_fully_covered_never_moves() {
        let (mut world, camera, hero) = setup(Vec2::new(10.0, 10.0));
        world.get_mut::<MapPosition>(camera).unwrap().pos = Vec2::new(33.0, 44.0);
        let mut follow = Follow::new(hero, &VIEWPORT, Rect::new(0.0, 0.0, 320.0, 240.0)).unwrap();
        let (left, right, top, bottom) = follow.boundaries();
        assert_eq!(left, right);
        assert_eq!(top, bottom);
        assert!(follow.is_boundary_fully_covered());

        follow.start_with_target(camera, &mut world);
        for p in [Vec2::new(0.0, 0.0), Vec2::new(300.0, 200.0), Vec2::new(-50.0, 99.0)] {
            world.get_mut::<MapPosition>(hero).unwrap().pos = p;
            follow.step(0.016, &mut world);
            assert_eq!(pos(&world, camera), Vec2::new(33.0, 44.0));
        }
    }

    #[test]
    fn test_is_done_tracks_running_state() {
        let (mut world, camera, hero) = setup(Vec2::ZERO);
        let mut follow = Follow::new(hero, &VIEWPORT, Rect::ZERO).unwrap();
        follow.start_with_target(camera, &mut world);
        assert!(!follow.is_done(&world));

        world.entity_mut(hero).remove::<Running>();
        assert!(follow.is_done(&world));

        world.entity_mut(hero).insert(Running);
        assert!(!follow.is_done(&world));

        world.despawn(hero);
        assert!(follow.is_done(&world));
    }

    #[test]
    fn test_stop_keeps_followed_node() {
        let (mut world, camera, hero) = setup(Vec2::ZERO);
        let mut follow = Follow::new(hero, &VIEWPORT, Rect::ZERO).unwrap();
        follow.start_with_target(camera, &mut world);
        follow.stop();
        assert!(follow.target().is_none());
        assert_eq!(follow.followed(), hero);
        assert_eq!(follow.state(), ActionState::Stopped);

        // stepping a stopped follow does nothing
        world.get_mut::<MapPosition>(camera).unwrap().pos = Vec2::new(1.0, 2.0);
        follow.step(0.016, &mut world);
        assert_eq!(pos(&world, camera), Vec2::new(1.0, 2.0));
    }

    #[test]
    fn test_clone_and_reverse_match_configuration() {
        let mut world = World::new();
        let hero = world.spawn((MapPosition::new(1900.0, 700.0), Running)).id();
        let cameras: Vec<Entity> = (0..3)
            .map(|_| world.spawn((MapPosition::new(0.0, 0.0), Running)).id())
            .collect();
        let rect = Rect::new(0.0, 0.0, 2000.0, 1500.0);
        let mut original = Follow::with_offset(hero, &VIEWPORT, 5.0, 6.0, rect).unwrap();
        original.start_with_target(cameras[0], &mut world);
        original.step(0.016, &mut world);

        let mut copies = [
            original.clone_action(),
            original.reverse().unwrap(),
        ];
        for (copy, camera) in copies.iter_mut().zip(&cameras[1..]) {
            assert_eq!(copy.state(), ActionState::Idle);
            assert!(copy.target().is_none());
            copy.start_with_target(*camera, &mut world);
            copy.step(0.016, &mut world);
            assert_eq!(pos(&world, *camera), pos(&world, cameras[0]));
            assert!(!copy.is_done(&world));
        }

        // x clamped to the right edge, y follows with the offset
        assert_eq!(pos(&world, cameras[0]), Vec2::new(-1200.0, -394.0));

        world.entity_mut(hero).remove::<Running>();
        for copy in &copies {
            assert!(copy.is_done(&world));
        }
    }
}
