//! Screen size resource.
//!
//! Stores the current viewport dimensions in pixels. Camera actions such as
//! [`Follow`](crate::actions::follow::Follow) read it once when they are
//! built.

use bevy_ecs::prelude::Resource;
use glam::Vec2;

use crate::actions::follow::ViewportSize;

/// Current screen size in pixels.
#[derive(Resource, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenSize {
    /// Width in pixels.
    pub w: i32,
    /// Height in pixels.
    pub h: i32,
}

impl ViewportSize for ScreenSize {
    fn viewport_size(&self) -> Vec2 {
        Vec2::new(self.w as f32, self.h as f32)
    }
}
