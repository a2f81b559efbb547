//! Composite actions built from other actions.
//!
//! - [`Sequence`] – run children one after another
//! - [`Spawn`] – run children side by side
//! - [`Repeat`] – run one child a fixed number of times
//! - [`RepeatForever`] – restart one child whenever it finishes
//!
//! `Sequence`, `Spawn` and `Repeat` are interval actions themselves: they map
//! their own normalized time onto their children's, so they nest inside eases,
//! other composites and [`Speed`](super::speed::Speed) freely.

use bevy_ecs::entity::Entity;
use log::error;

use super::action::{Action, ActionCore, ActionState};
use super::error::ActionError;
use super::interval::{DelayTime, IntervalAction, IntervalState};
use super::node::NodeAccess;

/// Per-child progress inside a composite.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ChildState {
    Pending,
    Running,
    Finished,
}

/// Start (if needed), drive to the end and stop a child.
fn finish_child(
    child: &mut dyn IntervalAction,
    state: &mut ChildState,
    target: Entity,
    nodes: &mut dyn NodeAccess,
) {
    match *state {
        ChildState::Finished => return,
        ChildState::Pending => child.start_with_target(target, nodes),
        ChildState::Running => {}
    }
    child.update(1.0, nodes);
    child.stop();
    *state = ChildState::Finished;
}

/// Runs interval actions one after another.
#[derive(Debug)]
pub struct Sequence {
    core: ActionCore,
    interval: IntervalState,
    actions: Vec<Box<dyn IntervalAction>>,
    states: Vec<ChildState>,
}

impl Sequence {
    pub fn new(actions: Vec<Box<dyn IntervalAction>>) -> Result<Self, ActionError> {
        if actions.is_empty() {
            error!("Sequence::new error: no actions given");
            return Err(ActionError::EmptyComposite("Sequence"));
        }
        let duration = actions.iter().map(|a| a.duration()).sum();
        let states = vec![ChildState::Pending; actions.len()];
        Ok(Sequence {
            core: ActionCore::default(),
            interval: IntervalState::new(duration),
            actions,
            states,
        })
    }


    fn fresh(&self) -> Self {
        let actions = self.actions.iter().map(|a| a.clone_interval()).collect();
        let states = vec![ChildState::Pending; self.actions.len()];
        Sequence {
            core: ActionCore::default(),
            interval: IntervalState::new(self.interval.duration()),
            actions,
            states,
        }
    }

    fn reversed(&self) -> Option<Self> {
        let actions = self
            .actions
            .iter()
            .rev()
            .map(|a| a.reverse_interval())
            .collect::<Option<Vec<_>>>()?;
        Sequence::new(actions).ok()
    }
}

impl Action for Sequence {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn start_with_target(&mut self, target: Entity, _nodes: &mut dyn NodeAccess) {
        self.core.start(target);
        self.interval.restart();
        self.states.fill(ChildState::Pending);
    }

    fn step(&mut self, dt: f32, nodes: &mut dyn NodeAccess) {
        let t = self.interval.advance(dt);
        self.update(t, nodes);
    }

    fn update(&mut self, time: f32, nodes: &mut dyn NodeAccess) {
        let Some(target) = self.core.target else {
            return;
        };
        let now = time * self.interval.duration();
        let last = self.actions.len() - 1;

        // locate the child that owns `now`
        let mut begin = 0.0;
        let mut owner = last;
        for (i, action) in self.actions.iter().enumerate() {
            let end = begin + action.duration();
            if now < end || i == last {
                owner = i;
                break;
            }
            begin = end;
        }

        for i in 0..owner {
            finish_child(self.actions[i].as_mut(), &mut self.states[i], target, nodes);
        }

        let child = self.actions[owner].as_mut();
        let state = &mut self.states[owner];
        if *state == ChildState::Finished {
            return;
        }
        if owner == last && time >= 1.0 {
            finish_child(child, state, target, nodes);
            return;
        }
        if *state == ChildState::Pending {
            child.start_with_target(target, nodes);
            *state = ChildState::Running;
        }
        let local = ((now - begin) / child.duration()).clamp(0.0, 1.0);
        child.update(local, nodes);
    }

    fn is_done(&self, _nodes: &dyn NodeAccess) -> bool {
        self.interval.is_done()
    }

    fn stop(&mut self) {
        for (action, state) in self.actions.iter_mut().zip(self.states.iter_mut()) {
            if *state == ChildState::Running {
                action.stop();
                *state = ChildState::Finished;
            }
        }
        self.core.stop();
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }

    fn reverse(&self) -> Option<Box<dyn Action>> {
        self.reversed().map(|s| Box::new(s) as Box<dyn Action>)
    }

    fn progress(&self) -> Option<f32> {
        Some(self.interval.progress())
    }
}

impl IntervalAction for Sequence {
    fn interval(&self) -> &IntervalState {
        &self.interval
    }

    fn clone_interval(&self) -> Box<dyn IntervalAction> {
        Box::new(self.fresh())
    }

    fn reverse_interval(&self) -> Option<Box<dyn IntervalAction>> {
        self.reversed()
            .map(|s| Box::new(s) as Box<dyn IntervalAction>)
    }
}

/// Runs interval actions in parallel. Lasts as long as the longest child.
#[derive(Debug)]
pub struct Spawn {
    core: ActionCore,
    interval: IntervalState,
    actions: Vec<Box<dyn IntervalAction>>,
    states: Vec<ChildState>,
}

impl Spawn {
    pub fn new(actions: Vec<Box<dyn IntervalAction>>) -> Result<Self, ActionError> {
        if actions.is_empty() {
            error!("Spawn::new error: no actions given");
            return Err(ActionError::EmptyComposite("Spawn"));
        }
        let duration = actions.iter().map(|a| a.duration()).fold(0.0, f32::max);
        let states = vec![ChildState::Pending; actions.len()];
        Ok(Spawn {
            core: ActionCore::default(),
            interval: IntervalState::new(duration),
            actions,
            states,
        })
    }


    fn fresh(&self) -> Self {
        let actions = self.actions.iter().map(|a| a.clone_interval()).collect();
        let states = vec![ChildState::Pending; self.actions.len()];
        Spawn {
            core: ActionCore::default(),
            interval: IntervalState::new(self.interval.duration()),
            actions,
            states,
        }
    }

    /// Shorter children are delayed so every reversed child still ends with
    /// the spawn.
    fn reversed(&self) -> Option<Self> {
        let total = self.interval.duration();
        let mut actions: Vec<Box<dyn IntervalAction>> = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            let rev = action.reverse_interval()?;
            let gap = total - action.duration();
            if gap > f32::EPSILON {
                let padded = Sequence::new(vec![Box::new(DelayTime::new(gap)), rev]).ok()?;
                actions.push(Box::new(padded));
            } else {
                actions.push(rev);
            }
        }
        Spawn::new(actions).ok()
    }
}

impl Action for Spawn {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn start_with_target(&mut self, target: Entity, nodes: &mut dyn NodeAccess) {
        self.core.start(target);
        self.interval.restart();
        for action in self.actions.iter_mut() {
            action.start_with_target(target, nodes);
        }
        self.states.fill(ChildState::Running);
    }

    fn step(&mut self, dt: f32, nodes: &mut dyn NodeAccess) {
        let t = self.interval.advance(dt);
        self.update(t, nodes);
    }

    fn update(&mut self, time: f32, nodes: &mut dyn NodeAccess) {
        if self.core.target.is_none() {
            return;
        }
        let now = time * self.interval.duration();
        for (action, state) in self.actions.iter_mut().zip(self.states.iter_mut()) {
            if *state != ChildState::Running {
                continue;
            }
            let local = (now / action.duration()).clamp(0.0, 1.0);
            action.update(local, nodes);
            if local >= 1.0 {
                action.stop();
                *state = ChildState::Finished;
            }
        }
    }

    fn is_done(&self, _nodes: &dyn NodeAccess) -> bool {
        self.interval.is_done()
    }

    fn stop(&mut self) {
        for (action, state) in self.actions.iter_mut().zip(self.states.iter_mut()) {
            if *state == ChildState::Running {
                action.stop();
                *state = ChildState::Finished;
            }
        }
        self.core.stop();
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }

    fn reverse(&self) -> Option<Box<dyn Action>> {
        self.reversed().map(|s| Box::new(s) as Box<dyn Action>)
    }

    fn progress(&self) -> Option<f32> {
        Some(self.interval.progress())
    }
}

impl IntervalAction for Spawn {
    fn interval(&self) -> &IntervalState {
        &self.interval
    }

    fn clone_interval(&self) -> Box<dyn IntervalAction> {
        Box::new(self.fresh())
    }

    fn reverse_interval(&self) -> Option<Box<dyn IntervalAction>> {
        self.reversed()
            .map(|s| Box::new(s) as Box<dyn IntervalAction>)
    }
}

/// Runs an interval action `times` times in a row.
#[derive(Debug)]
pub struct Repeat {
    core: ActionCore,
    interval: IntervalState,
    inner: Box<dyn IntervalAction>,
    times: u32,
    completed: u32,
}

impl Repeat {
    pub fn new(inner: Box<dyn IntervalAction>, times: u32) -> Self {
        let duration = inner.duration() * times as f32;
        Repeat {
            core: ActionCore::default(),
            interval: IntervalState::new(duration),
            inner,
            times,
            completed: 0,
        }
    }

    pub fn times(&self) -> u32 {
        self.times
    }

    /// Cycles finished so far in the current run.
    pub fn completed(&self) -> u32 {
        self.completed
    }

    fn fresh(&self) -> Self {
        Repeat::new(self.inner.clone_interval(), self.times)
    }

    fn reversed(&self) -> Option<Self> {
        Some(Repeat::new(self.inner.reverse_interval()?, self.times))
    }
}

impl Action for Repeat {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn start_with_target(&mut self, target: Entity, nodes: &mut dyn NodeAccess) {
        self.core.start(target);
        self.interval.restart();
        self.completed = 0;
        if self.times > 0 {
            self.inner.start_with_target(target, nodes);
        }
    }

    fn step(&mut self, dt: f32, nodes: &mut dyn NodeAccess) {
        let t = self.interval.advance(dt);
        self.update(t, nodes);
    }

    fn update(&mut self, time: f32, nodes: &mut dyn NodeAccess) {
        let Some(target) = self.core.target else {
            return;
        };
        if self.times == 0 {
            return;
        }
        let cycles = time * self.times as f32;
        let reached = (cycles.floor().max(0.0) as u32).min(self.times);

        while self.completed < reached {
            self.inner.update(1.0, nodes);
            self.inner.stop();
            self.completed += 1;
            if self.completed < self.times {
                self.inner.start_with_target(target, nodes);
            }
        }

        if self.completed < self.times {
            let local = (cycles - self.completed as f32).clamp(0.0, 1.0);
            self.inner.update(local, nodes);
        }
    }

    fn is_done(&self, _nodes: &dyn NodeAccess) -> bool {
        self.interval.is_done()
    }

    fn stop(&mut self) {
        if self.inner.state() == ActionState::Running {
            self.inner.stop();
        }
        self.core.stop();
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }

    fn reverse(&self) -> Option<Box<dyn Action>> {
        self.reversed().map(|r| Box::new(r) as Box<dyn Action>)
    }

    fn progress(&self) -> Option<f32> {
        Some(self.interval.progress())
    }
}

impl IntervalAction for Repeat {
    fn interval(&self) -> &IntervalState {
        &self.interval
    }

    fn clone_interval(&self) -> Box<dyn IntervalAction> {
        Box::new(self.fresh())
    }

    fn reverse_interval(&self) -> Option<Box<dyn IntervalAction>> {
        self.reversed()
            .map(|r| Box::new(r) as Box<dyn IntervalAction>)
    }
}

/// Whole cycles `RepeatForever` replays in one step before skipping ahead.
const MAX_REPLAYED_CYCLES: u32 = 1024;

/// Restarts an interval action every time it finishes. Never done on its own.
///
/// A single step may cover several cycles; each one is run to completion so
/// relative actions keep accumulating.
#[derive(Debug)]
pub struct RepeatForever {
    core: ActionCore,
    inner: Box<dyn IntervalAction>,
}

impl RepeatForever {
    pub fn new(inner: Box<dyn IntervalAction>) -> Self {
        RepeatForever {
            core: ActionCore::default(),
            inner,
        }
    }

    pub fn inner(&self) -> &dyn IntervalAction {
        self.inner.as_ref()
    }
}

impl Action for RepeatForever {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn start_with_target(&mut self, target: Entity, nodes: &mut dyn NodeAccess) {
        self.core.start(target);
        self.inner.start_with_target(target, nodes);
    }

    fn step(&mut self, dt: f32, nodes: &mut dyn NodeAccess) {
        let Some(target) = self.core.target else {
            return;
        };
        self.inner.step(dt, nodes);

        // replay the time that spilled past the end of each cycle
        let mut cycles = 0;
        while self.inner.is_done(&*nodes) {
            let duration = self.inner.duration();
            if duration <= 0.0 {
                break;
            }
            let mut overflow = (self.inner.elapsed() - duration).max(0.0);
            cycles += 1;
            if cycles >= MAX_REPLAYED_CYCLES {
                // drop the remaining whole cycles, keep the phase
                overflow %= duration;
            }
            self.inner.stop();
            self.inner.start_with_target(target, nodes);
            self.inner.step(overflow, nodes);
            if cycles >= MAX_REPLAYED_CYCLES {
                break;
            }
        }
    }

    fn is_done(&self, _nodes: &dyn NodeAccess) -> bool {
        false
    }

    fn stop(&mut self) {
        if self.inner.state() == ActionState::Running {
            self.inner.stop();
        }
        self.core.stop();
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(RepeatForever::new(self.inner.clone_interval()))
    }

    fn reverse(&self) -> Option<Box<dyn Action>> {
        let inner = self.inner.reverse_interval()?;
        Some(Box::new(RepeatForever::new(inner)))
    }
}
