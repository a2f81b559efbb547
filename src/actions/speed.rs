//! Time-scaling decorator.
//!
//! [`Speed`] feeds `dt * speed` to the action it wraps, which gives
//! slow-motion and fast-forward without touching the inner action's logic.
//! The scaled deltas reach the inner action unchanged, so interval actions
//! still finish after exactly `duration / speed` seconds of wall time.

use bevy_ecs::entity::Entity;
use log::error;

use super::action::{Action, ActionCore};
use super::error::ActionError;
use super::node::NodeAccess;

#[derive(Debug)]
pub struct Speed {
    core: ActionCore,
    speed: f32,
    inner: Box<dyn Action>,
}

impl Speed {
    /// Wrap `inner`, scaling time by `speed`.
    ///
    /// Takes an `Option` so the result of an inner `reverse()` can be passed
    /// straight through; `None` fails with [`ActionError::MissingInnerAction`].
    /// Zero freezes the inner action. Negative speeds are not supported.
    pub fn new(inner: Option<Box<dyn Action>>, speed: f32) -> Result<Self, ActionError> {
        let Some(inner) = inner else {
            error!("Speed::new error: inner action is missing!");
            return Err(ActionError::MissingInnerAction);
        };
        Ok(Speed {
            core: ActionCore::default(),
            speed,
            inner,
        })
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    pub fn inner(&self) -> &dyn Action {
        self.inner.as_ref()
    }

    /// Replace the wrapped action and hand the previous one back.
    pub fn set_inner_action(&mut self, action: Box<dyn Action>) -> Box<dyn Action> {
        std::mem::replace(&mut self.inner, action)
    }
}

impl Action for Speed {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn start_with_target(&mut self, target: Entity, nodes: &mut dyn NodeAccess) {
        if !nodes.contains(target) {
            error!("Speed::start_with_target error: target({target}) does not exist!");
            return;
        }
        self.core.start(target);
        self.inner.start_with_target(target, nodes);
    }

    fn step(&mut self, dt: f32, nodes: &mut dyn NodeAccess) {
        self.inner.step(dt * self.speed, nodes);
    }

    fn is_done(&self, nodes: &dyn NodeAccess) -> bool {
        self.inner.is_done(nodes)
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.core.stop();
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(Speed {
            core: ActionCore::default(),
            speed: self.speed,
            inner: self.inner.clone_action(),
        })
    }

    fn reverse(&self) -> Option<Box<dyn Action>> {
        let inner = self.inner.reverse()?;
        Some(Box::new(Speed {
            core: ActionCore::default(),
            speed: self.speed,
            inner,
        }))
    }

    fn progress(&self) -> Option<f32> {
        self.inner.progress()
    }
}
