//! Runner configuration resource.
//!
//! Manages the viewport and simulation settings loaded from an INI
//! configuration file. Provides defaults for safe startup and methods to
//! load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [viewport]
//! width = 800
//! height = 600
//!
//! [simulation]
//! target_fps = 60
//! time_scale = 1.0
//! frames = 120
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use glam::Vec2;
use log::info;
use std::path::PathBuf;

use crate::actions::follow::ViewportSize;

/// Default safe values for startup
const DEFAULT_VIEWPORT_WIDTH: u32 = 800;
const DEFAULT_VIEWPORT_HEIGHT: u32 = 600;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_FRAMES: u32 = 120;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Runner configuration resource.
///
/// Stores the viewport size handed to camera actions, the fixed simulation
/// rate and how many frames the headless runner advances.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Viewport width in pixels.
    pub viewport_width: u32,
    /// Viewport height in pixels.
    pub viewport_height: u32,
    /// Simulated frames per second; each tick advances `1 / target_fps`.
    pub target_fps: u32,
    /// Global time scale applied to [`WorldTime`](crate::resources::worldtime::WorldTime).
    pub time_scale: f32,
    /// Number of frames to simulate.
    pub frames: u32,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            time_scale: DEFAULT_TIME_SCALE,
            frames: DEFAULT_FRAMES,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [viewport] section
        if let Some(width) = config.getuint("viewport", "width").ok().flatten() {
            self.viewport_width = width as u32;
        }
        if let Some(height) = config.getuint("viewport", "height").ok().flatten() {
            self.viewport_height = height as u32;
        }

        // [simulation] section
        if let Some(fps) = config.getuint("simulation", "target_fps").ok().flatten() {
            self.target_fps = (fps as u32).max(1);
        }
        if let Some(scale) = config.getfloat("simulation", "time_scale").ok().flatten() {
            self.time_scale = scale as f32;
        }
        if let Some(frames) = config.getuint("simulation", "frames").ok().flatten() {
            self.frames = frames as u32;
        }

        info!(
            "Loaded config: {}x{} viewport, fps={}, time_scale={}, frames={}",
            self.viewport_width,
            self.viewport_height,
            self.target_fps,
            self.time_scale,
            self.frames
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [viewport] section
        config.set("viewport", "width", Some(self.viewport_width.to_string()));
        config.set("viewport", "height", Some(self.viewport_height.to_string()));

        // [simulation] section
        config.set("simulation", "target_fps", Some(self.target_fps.to_string()));
        config.set("simulation", "time_scale", Some(self.time_scale.to_string()));
        config.set("simulation", "frames", Some(self.frames.to_string()));

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Seconds covered by one simulated frame.
    pub fn frame_delta(&self) -> f32 {
        1.0 / self.target_fps.max(1) as f32
    }

    /// Set viewport size.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }
}

impl ViewportSize for GameConfig {
    fn viewport_size(&self) -> Vec2 {
        Vec2::new(self.viewport_width as f32, self.viewport_height as f32)
    }
}
