//! Aberred Actions headless runner.
//!
//! Loads a JSON action script, spawns its nodes into a `bevy_ecs` world and
//! steps the scheduled actions at a fixed rate, printing where every node
//! ended up.
//!
//! # Running
//!
//! ```sh
//! cargo run --release -- demos/camera_follow.json --config config.ini --frames 240
//! ```

mod actions;
mod components;
mod events;
mod game;
mod resources;
mod systems;

use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};

use crate::resources::gameconfig::GameConfig;
use crate::resources::worldtime::WorldTime;

/// Aberred Actions
#[derive(Parser)]
#[command(version, about = "Run an action script against a headless scene.")]
struct Cli {
    /// JSON action script to run.
    script: Option<PathBuf>,

    /// INI configuration file (default: ./config.ini).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the number of frames to simulate.
    #[arg(long)]
    frames: Option<u32>,

    /// Write the effective configuration to the config path and exit.
    #[arg(long)]
    write_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => GameConfig::with_path(path),
        None => GameConfig::new(),
    };
    if let Err(e) = config.load_from_file() {
        warn!("{e}; using defaults");
    }
    if let Some(frames) = cli.frames {
        config.frames = frames;
    }

    // Early-exit: dump the config and quit
    if cli.write_config {
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Config written to {}", config.config_path.display());
        return;
    }

    let Some(script_path) = cli.script else {
        eprintln!("Error: no script given");
        std::process::exit(2);
    };

    let script = match game::load_script(&script_path) {
        Ok(script) => script,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let (mut world, nodes) = match game::setup_world(&config, &script) {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("Error building scene: {e}");
            std::process::exit(1);
        }
    };

    let ran = game::run_frames(&mut world, config.frames, config.frame_delta());
    let elapsed = world.resource::<WorldTime>().elapsed;
    info!("simulated {ran} frame(s), {elapsed:.3}s of world time");

    for (name, pos) in game::node_positions(&world, &nodes) {
        match pos {
            Some(p) => println!("{name}: ({:.2}, {:.2})", p.x, p.y),
            None => println!("{name}: <gone>"),
        }
    }
}
