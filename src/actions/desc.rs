//! Data-driven action descriptions.
//!
//! [`ActionDesc`] is the JSON shape of an action tree. Node references are by
//! name and resolved against a [`BuildContext`] when the tree is built, so a
//! description can be written before any entity exists.
//!
//! ```json
//! { "type": "speed", "speed": 2.0,
//!   "action": { "type": "sequence", "actions": [
//!     { "type": "move_by", "duration": 1.0, "x": 50.0, "y": 0.0 },
//!     { "type": "delay", "duration": 0.5 },
//!     { "type": "ease", "easing": "quad_out",
//!       "action": { "type": "move_to", "duration": 1.0, "x": 0.0, "y": 0.0 } }
//!   ] } }
//! ```

use bevy_ecs::entity::Entity;
use glam::Vec2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::action::Action;
use super::composite::{Repeat, RepeatForever, Sequence, Spawn};
use super::ease::{EaseAction, Easing};
use super::error::ActionError;
use super::follow::{Follow, Rect};
use super::interval::{DelayTime, IntervalAction, MoveBy, MoveTo};
use super::speed::Speed;

/// Serialized form of an action tree.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionDesc {
    MoveTo {
        duration: f32,
        x: f32,
        y: f32,
    },
    MoveBy {
        duration: f32,
        x: f32,
        y: f32,
    },
    Delay {
        duration: f32,
    },
    Sequence {
        actions: Vec<ActionDesc>,
    },
    Spawn {
        actions: Vec<ActionDesc>,
    },
    Repeat {
        times: u32,
        action: Box<ActionDesc>,
    },
    RepeatForever {
        action: Box<ActionDesc>,
    },
    Ease {
        easing: Easing,
        action: Box<ActionDesc>,
    },
    Speed {
        speed: f32,
        action: Box<ActionDesc>,
    },
    Follow {
        node: String,
        #[serde(default)]
        offset_x: f32,
        #[serde(default)]
        offset_y: f32,
        #[serde(default)]
        world_rect: Rect,
    },
    /// The reverse of the wrapped action.
    Reverse {
        action: Box<ActionDesc>,
    },
}

/// What a description needs from the world to become live actions.
#[derive(Debug, Clone)]
pub struct BuildContext<'a> {
    /// Spawned nodes by name.
    pub nodes: &'a FxHashMap<String, Entity>,
    /// Viewport size handed to `Follow`.
    pub viewport: Vec2,
}

impl BuildContext<'_> {
    fn node(&self, name: &str) -> Result<Entity, ActionError> {
        self.nodes
            .get(name)
            .copied()
            .ok_or_else(|| ActionError::UnknownNode(name.to_string()))
    }
}

impl ActionDesc {
    /// Short name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ActionDesc::MoveTo { .. } => "move_to",
            ActionDesc::MoveBy { .. } => "move_by",
            ActionDesc::Delay { .. } => "delay",
            ActionDesc::Sequence { .. } => "sequence",
            ActionDesc::Spawn { .. } => "spawn",
            ActionDesc::Repeat { .. } => "repeat",
            ActionDesc::RepeatForever { .. } => "repeat_forever",
            ActionDesc::Ease { .. } => "ease",
            ActionDesc::Speed { .. } => "speed",
            ActionDesc::Follow { .. } => "follow",
            ActionDesc::Reverse { .. } => "reverse",
        }
    }

    /// Build any action.
    pub fn build(&self, ctx: &BuildContext) -> Result<Box<dyn Action>, ActionError> {
        match self {
            ActionDesc::RepeatForever { action } => {
                Ok(Box::new(RepeatForever::new(action.build_interval(ctx)?)))
            }
            ActionDesc::Speed { speed, action } => {
                Ok(Box::new(Speed::new(Some(action.build(ctx)?), *speed)?))
            }
            ActionDesc::Follow {
                node,
                offset_x,
                offset_y,
                world_rect,
            } => {
                let followed = ctx.node(node)?;
                Ok(Box::new(Follow::with_offset(
                    followed,
                    &ctx.viewport,
                    *offset_x,
                    *offset_y,
                    *world_rect,
                )?))
            }
            ActionDesc::Reverse { action } => action
                .build(ctx)?
                .reverse()
                .ok_or(ActionError::NotReversible(action.kind())),
            _ => {
                let action: Box<dyn Action> = self.build_interval(ctx)?;
                Ok(action)
            }
        }
    }

    /// Build an action with a fixed duration, for use inside time-driven
    /// composites.
    pub fn build_interval(&self, ctx: &BuildContext) -> Result<Box<dyn IntervalAction>, ActionError> {
        match self {
            ActionDesc::MoveTo { duration, x, y } => {
                let duration = self.checked_duration(*duration)?;
                Ok(Box::new(MoveTo::new(duration, Vec2::new(*x, *y))))
            }
            ActionDesc::MoveBy { duration, x, y } => {
                let duration = self.checked_duration(*duration)?;
                Ok(Box::new(MoveBy::new(duration, Vec2::new(*x, *y))))
            }
            ActionDesc::Delay { duration } => {
                let duration = self.checked_duration(*duration)?;
                Ok(Box::new(DelayTime::new(duration)))
            }
            ActionDesc::Sequence { actions } => {
                let children = build_children(actions, ctx)?;
                Ok(Box::new(Sequence::new(children)?))
            }
            ActionDesc::Spawn { actions } => {
                let children = build_children(actions, ctx)?;
                Ok(Box::new(Spawn::new(children)?))
            }
            ActionDesc::Repeat { times, action } => {
                Ok(Box::new(Repeat::new(action.build_interval(ctx)?, *times)))
            }
            ActionDesc::Ease { easing, action } => {
                Ok(Box::new(EaseAction::new(action.build_interval(ctx)?, *easing)))
            }
            ActionDesc::Reverse { action } => action
                .build_interval(ctx)?
                .reverse_interval()
                .ok_or(ActionError::NotReversible(action.kind())),
            other => Err(ActionError::NotAnInterval(other.kind())),
        }
    }

    fn checked_duration(&self, duration: f32) -> Result<f32, ActionError> {
        if duration >= 0.0 {
            Ok(duration)
        } else {
            Err(ActionError::InvalidDuration {
                kind: self.kind(),
                duration,
            })
        }
    }
}

fn build_children(
    actions: &[ActionDesc],
    ctx: &BuildContext,
) -> Result<Vec<Box<dyn IntervalAction>>, ActionError> {
    actions.iter().map(|a| a.build_interval(ctx)).collect()
}
