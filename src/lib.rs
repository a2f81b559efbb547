//! Aberred Actions library.
//!
//! This module exposes the action runtime (actions, scheduler resource,
//! systems and events) together with the ECS components it drives, for use
//! in integration tests and as a reusable library.

pub mod actions;
pub mod components;
pub mod events;
pub mod game;
pub mod resources;
pub mod systems;
