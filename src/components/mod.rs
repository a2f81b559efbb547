//! ECS components for scene nodes.
//!
//! Actions only touch a narrow slice of node state, so this module is small:
//! - [`mapposition`] – world-space position (pivot) for an entity
//! - [`running`] – marker for entities that are active in the scene

pub mod mapposition;
pub mod running;
