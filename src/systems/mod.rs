//! Runtime systems.
//!
//! Submodules overview
//! - [`actions`] – step scheduled actions and emit completion events
//! - [`time`] – update simulation time and delta

pub mod actions;
pub mod time;
