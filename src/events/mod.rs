//! Event types emitted by the action runtime.
//!
//! Submodules:
//! - [`actionfinished`] – an action completed and was removed from its target
pub mod actionfinished;
