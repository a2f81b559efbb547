//! The action system.
//!
//! Actions are small, reusable behaviours that mutate a target node once per
//! frame until they report completion. They compose: decorators such as
//! [`speed::Speed`] and [`ease::EaseAction`] wrap another action, composites
//! such as [`composite::Sequence`] drive several, and terminal actions such as
//! [`follow::Follow`] and [`interval::MoveBy`] touch the node directly.
//!
//! Submodules overview:
//! - [`action`] – the base [`Action`](action::Action) contract and lifecycle
//! - [`interval`] – fixed-duration actions and the primitive moves/delay
//! - [`composite`] – sequences, spawns and repeats
//! - [`ease`] – easing curves and the ease decorator
//! - [`speed`] – time-scaling decorator
//! - [`follow`] – camera-style follow with optional world bounds
//! - [`desc`] – serde descriptions of action trees
//! - [`node`] – the narrow node interface actions go through
//! - [`error`] – construction and scheduling errors
//!
//! Actions are driven by the
//! [`ActionManager`](crate::resources::actionmanager::ActionManager) resource
//! through [`update_actions`](crate::systems::actions::update_actions).

pub mod action;
pub mod composite;
pub mod desc;
pub mod ease;
pub mod error;
pub mod follow;
pub mod interval;
pub mod node;
pub mod speed;

pub use action::{Action, ActionCore, ActionState, INVALID_TAG};
pub use error::ActionError;
pub use interval::IntervalAction;
pub use node::NodeAccess;
