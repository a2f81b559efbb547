//! Simulation clock.
//!
//! [`WorldTime::delta`] is the scaled frame delta every time-driven system
//! (including the action scheduler) consumes. Setting `time_scale` slows or
//! speeds up the whole world at once; use
//! [`Speed`](crate::actions::speed::Speed) to rescale a single action tree.

use bevy_ecs::prelude::Resource;

#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    /// Scaled seconds since the world started.
    pub elapsed: f32,
    /// Scaled seconds covered by the current frame.
    pub delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }
}
