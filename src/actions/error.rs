//! Errors reported when building or scheduling actions.

use bevy_ecs::entity::Entity;
use thiserror::Error;

/// Failure to construct or schedule an action.
///
/// Construction failures are the only errors a caller can recover from;
/// guards inside a running action log and no-op instead of returning one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    /// A decorator was given no action to wrap.
    #[error("inner action is missing")]
    MissingInnerAction,
    /// `Follow` was given no node to track.
    #[error("followed node is missing")]
    MissingFollowedNode,
    /// The target entity does not exist in the world.
    #[error("target node {0} does not exist")]
    MissingTarget(Entity),
    /// An action description names a node that was never spawned.
    #[error("unknown node '{0}'")]
    UnknownNode(String),
    /// A time-driven composite was handed an action with no fixed duration.
    #[error("'{0}' has no fixed duration and cannot be driven by normalized time")]
    NotAnInterval(&'static str),
    /// `reverse` was requested on an action that has none.
    #[error("'{0}' cannot be reversed")]
    NotReversible(&'static str),
    /// A timed action was described with a negative or NaN duration.
    #[error("'{kind}' needs a non-negative duration, got {duration}")]
    InvalidDuration { kind: &'static str, duration: f32 },
    /// A sequence or spawn with no children.
    #[error("{0} needs at least one action")]
    EmptyComposite(&'static str),
}
