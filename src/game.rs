//! Headless scene setup and frame loop.
//!
//! An [`ActionScript`] names a handful of nodes and the actions to run on
//! them. [`setup_world`] turns it into a populated [`World`], and
//! [`run_frames`] advances that world at a fixed rate.
//!
//! ```json
//! {
//!   "nodes": [
//!     { "name": "hero", "x": 100.0, "y": 300.0 },
//!     { "name": "camera" }
//!   ],
//!   "runs": [
//!     { "target": "hero", "tag": 1,
//!       "action": { "type": "move_by", "duration": 2.0, "x": 400.0, "y": 0.0 } },
//!     { "target": "camera",
//!       "action": { "type": "follow", "node": "hero" } }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{debug, info, warn};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::actions::action::INVALID_TAG;
use crate::actions::desc::{ActionDesc, BuildContext};
use crate::actions::error::ActionError;
use crate::actions::follow::ViewportSize;
use crate::components::mapposition::MapPosition;
use crate::components::running::Running;
use crate::events::actionfinished::ActionFinishedEvent;
use crate::resources::actionmanager::ActionManager;
use crate::resources::gameconfig::GameConfig;
use crate::resources::screensize::ScreenSize;
use crate::resources::worldtime::WorldTime;
use crate::systems::actions::{action_finished_observer, run_action_paused, update_actions};
use crate::systems::time::update_world_time;

fn default_true() -> bool {
    true
}

/// A node to spawn.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NodeDesc {
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    /// Spawn with the [`Running`] marker.
    #[serde(default = "default_true")]
    pub running: bool,
}

/// An action to start on a named node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunDesc {
    pub target: String,
    #[serde(default)]
    pub tag: Option<i32>,
    #[serde(default)]
    pub paused: bool,
    pub action: ActionDesc,
}

/// Nodes plus the actions to run on them.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ActionScript {
    #[serde(default)]
    pub nodes: Vec<NodeDesc>,
    #[serde(default)]
    pub runs: Vec<RunDesc>,
}

/// Read and parse a JSON action script.
pub fn load_script(path: impl AsRef<Path>) -> Result<ActionScript, String> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read script {}: {}", path.display(), e))?;
    serde_json::from_str(&text)
        .map_err(|e| format!("Failed to parse script {}: {}", path.display(), e))
}

/// Build a world from `config` and `script`.
///
/// Returns the world together with the node name lookup. Fails on the first
/// run whose target or action cannot be resolved.
pub fn setup_world(
    config: &GameConfig,
    script: &ActionScript,
) -> Result<(World, FxHashMap<String, Entity>), ActionError> {
    let mut world = World::new();
    world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
    world.insert_resource(ScreenSize {
        w: config.viewport_width as i32,
        h: config.viewport_height as i32,
    });
    world.insert_resource(ActionManager::new());
    world.insert_resource(config.clone());
    world.add_observer(action_finished_observer);
    world.flush();

    let mut nodes: FxHashMap<String, Entity> = FxHashMap::default();
    for node in &script.nodes {
        let mut entity = world.spawn(MapPosition::new(node.x, node.y));
        if node.running {
            entity.insert(Running);
        }
        let id = entity.id();
        if nodes.insert(node.name.clone(), id).is_some() {
            warn!("node '{}' defined twice, the last one wins", node.name);
        }
        debug!("spawned node '{}' as {id}", node.name);
    }

    let viewport = world.resource::<ScreenSize>().viewport_size();
    for run in &script.runs {
        let target = *nodes
            .get(&run.target)
            .ok_or_else(|| ActionError::UnknownNode(run.target.clone()))?;
        let ctx = BuildContext {
            nodes: &nodes,
            viewport,
        };
        let mut action = run.action.build(&ctx)?;
        action.set_tag(run.tag.unwrap_or(INVALID_TAG));
        run_action_paused(&mut world, target, action, run.paused)?;
        info!("running {} on '{}'", run.action.kind(), run.target);
    }

    Ok((world, nodes))
}

/// Advance `world` by up to `frames` ticks of `dt` seconds.
///
/// Stops early once no action is left. Returns the number of ticks run.
pub fn run_frames(world: &mut World, frames: u32, dt: f32) -> u32 {
    let mut update = Schedule::default();
    update.add_systems(update_actions);

    for frame in 0..frames {
        let idle = world
            .get_resource::<ActionManager>()
            .is_none_or(|m| m.number_of_running_actions() == 0);
        if idle {
            debug!("no actions left after {frame} frame(s)");
            return frame;
        }
        update_world_time(world, dt);
        update.run(world);
    }
    frames
}

/// Collect the finished events `world` triggers from now on.
pub fn record_finished(world: &mut World) -> Arc<Mutex<Vec<ActionFinishedEvent>>> {
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = log.clone();
    world.add_observer(move |trigger: On<ActionFinishedEvent>| {
        if let Ok(mut events) = sink.lock() {
            events.push(*trigger.event());
        }
    });
    world.flush();
    log
}

/// Node positions sorted by name.
pub fn node_positions(
    world: &World,
    nodes: &FxHashMap<String, Entity>,
) -> Vec<(String, Option<Vec2>)> {
    let mut out: Vec<_> = nodes
        .iter()
        .map(|(name, e)| (name.clone(), world.get::<MapPosition>(*e).map(|mp| mp.pos)))
        .collect();
    out.sort_by(|a, b| a.0.cmp(&b.0));
    out
}
