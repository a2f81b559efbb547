//! ECS resources made available to systems.
//!
//! Overview
//! - `actionmanager` – scheduler owning every running action, keyed by target
//! - `gameconfig` – viewport and simulation settings loaded from INI
//! - `screensize` – current viewport dimensions in pixels
//! - `worldtime` – simulation time and delta
pub mod actionmanager;
pub mod gameconfig;
pub mod screensize;
pub mod worldtime;
