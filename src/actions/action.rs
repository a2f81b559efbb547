//! The base action contract.
//!
//! Every behaviour driven by the [`ActionManager`](crate::resources::actionmanager::ActionManager)
//! implements [`Action`]. The scheduler calls [`Action::start_with_target`]
//! once, then [`Action::step`] every frame until [`Action::is_done`] reports
//! true, then [`Action::stop`]. Composite actions forward the same protocol to
//! their children.
//!
//! # Lifecycle
//!
//! ```text
//! Idle --start_with_target--> Running --stop--> Stopped
//!                                ^                  |
//!                                +--start_with_target
//! ```
//!
//! Shared per-action bookkeeping (target, tag, flags, state) lives in
//! [`ActionCore`], which concrete actions embed rather than inherit.

use std::fmt;

use bevy_ecs::entity::Entity;
use log::debug;

use super::node::NodeAccess;

/// Tag value meaning "no tag assigned".
pub const INVALID_TAG: i32 = -1;

/// Where an action is in its lifecycle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ActionState {
    /// Constructed, never started.
    #[default]
    Idle,
    /// Bound to a target and being stepped.
    Running,
    /// Unbound after `stop`. May be started again.
    Stopped,
}

/// Bookkeeping shared by every action.
#[derive(Clone, Debug, PartialEq)]
pub struct ActionCore {
    /// Node active when the action was last started. Survives `stop`.
    pub original_target: Option<Entity>,
    /// Node currently being mutated. Cleared by `stop`.
    pub target: Option<Entity>,
    /// Lookup handle for the scheduler.
    pub tag: i32,
    /// Scheduler bookkeeping bits. Opaque to the action.
    pub flags: u32,
    pub state: ActionState,
}

impl Default for ActionCore {
    fn default() -> Self {
        ActionCore {
            original_target: None,
            target: None,
            tag: INVALID_TAG,
            flags: 0,
            state: ActionState::Idle,
        }
    }
}

impl ActionCore {
    pub fn start(&mut self, target: Entity) {
        self.original_target = Some(target);
        self.target = Some(target);
        self.state = ActionState::Running;
    }

    pub fn stop(&mut self) {
        self.target = None;
        if self.state == ActionState::Running {
            self.state = ActionState::Stopped;
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ActionState::Running
    }
}

/// A polymorphic unit of per-frame behaviour bound to a target node.
///
/// Only [`core`](Action::core), [`core_mut`](Action::core_mut),
/// [`clone_action`](Action::clone_action) and [`reverse`](Action::reverse)
/// are required. The remaining defaults describe an action that does nothing
/// and finishes immediately; concrete actions override what they need.
///
/// Actions are `Send + Sync` so they can live inside an ECS resource. They are
/// still stepped from a single thread, one tick at a time.
pub trait Action: Send + Sync + fmt::Debug + 'static {
    fn core(&self) -> &ActionCore;
    fn core_mut(&mut self) -> &mut ActionCore;

    /// Bind the action to `target` and enter the running state.
    fn start_with_target(&mut self, target: Entity, _nodes: &mut dyn NodeAccess) {
        self.core_mut().start(target);
    }

    /// Advance by `dt` seconds.
    fn step(&mut self, _dt: f32, _nodes: &mut dyn NodeAccess) {
        debug!("[Action step]. override me");
    }

    /// Apply the state for `time` (normalized for interval actions).
    fn update(&mut self, _time: f32, _nodes: &mut dyn NodeAccess) {
        debug!("[Action update]. override me");
    }

    /// Polled by the scheduler after every step.
    fn is_done(&self, _nodes: &dyn NodeAccess) -> bool {
        true
    }

    /// Unbind from the target. Safe on idle actions and when repeated.
    fn stop(&mut self) {
        self.core_mut().stop();
    }

    /// A fresh, idle copy with the same configuration and no shared run state.
    fn clone_action(&self) -> Box<dyn Action>;

    /// An action that mirrors this one, if such a thing exists.
    fn reverse(&self) -> Option<Box<dyn Action>>;

    /// Normalized completion in `[0, 1]`, for actions with a duration.
    fn progress(&self) -> Option<f32> {
        None
    }

    fn tag(&self) -> i32 {
        self.core().tag
    }

    fn set_tag(&mut self, tag: i32) {
        self.core_mut().tag = tag;
    }

    fn flags(&self) -> u32 {
        self.core().flags
    }

    fn set_flags(&mut self, flags: u32) {
        self.core_mut().flags = flags;
    }

    fn target(&self) -> Option<Entity> {
        self.core().target
    }

    fn original_target(&self) -> Option<Entity> {
        self.core().original_target
    }

    fn state(&self) -> ActionState {
        self.core().state
    }
}
