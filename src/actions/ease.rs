//! Easing curves and the [`EaseAction`] decorator.
//!
//! [`EaseAction`] wraps an interval action and feeds it `ease(t)` instead of
//! `t`, so any interval (moves, sequences, repeats) can accelerate or
//! decelerate without knowing about it.

use bevy_ecs::entity::Entity;
use serde::{Deserialize, Serialize};

use super::action::{Action, ActionCore};
use super::interval::{IntervalAction, IntervalState};
use super::node::NodeAccess;

/// Easing functions for smooth interpolation.
///
/// These functions transform a linear `t` value (0.0 to 1.0) to create
/// different acceleration/deceleration curves.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed (no easing).
    #[default]
    Linear,
    /// Starts slow, accelerates (quadratic).
    QuadIn,
    /// Starts fast, decelerates (quadratic).
    QuadOut,
    /// Slow start and end (quadratic).
    QuadInOut,
    /// Starts slow, accelerates (cubic).
    CubicIn,
    /// Starts fast, decelerates (cubic).
    CubicOut,
    /// Slow start and end (cubic).
    CubicInOut,
    /// Starts slow, accelerates (sine).
    SineIn,
    /// Starts fast, decelerates (sine).
    SineOut,
    /// Slow start and end (sine).
    SineInOut,
}

impl Easing {
    /// The curve that plays this one backwards in time.
    pub fn mirrored(self) -> Easing {
        match self {
            Easing::QuadIn => Easing::QuadOut,
            Easing::QuadOut => Easing::QuadIn,
            Easing::CubicIn => Easing::CubicOut,
            Easing::CubicOut => Easing::CubicIn,
            Easing::SineIn => Easing::SineOut,
            Easing::SineOut => Easing::SineIn,
            other => other,
        }
    }
}

/// Apply an easing function to a normalized time value.
///
/// The input `t` is clamped to [0.0, 1.0] and transformed according to the
/// easing curve.
pub fn ease(e: Easing, t: f32) -> f32 {
    use std::f32::consts::{FRAC_PI_2, PI};

    let t = t.clamp(0.0, 1.0);
    match e {
        Easing::Linear => t,
        Easing::QuadIn => t * t,
        Easing::QuadOut => t * (2.0 - t),
        Easing::QuadInOut => {
            if t < 0.5 {
                2.0 * t * t
            } else {
                -1.0 + (4.0 - 2.0 * t) * t
            }
        }
        Easing::CubicIn => t * t * t,
        Easing::CubicOut => {
            let p = t - 1.0;
            p * p * p + 1.0
        }
        Easing::CubicInOut => {
            if t < 0.5 {
                4.0 * t * t * t
            } else {
                let p = 2.0 * t - 2.0;
                0.5 * p * p * p + 1.0
            }
        }
        Easing::SineIn => 1.0 - (t * FRAC_PI_2).cos(),
        Easing::SineOut => (t * FRAC_PI_2).sin(),
        Easing::SineInOut => -0.5 * ((PI * t).cos() - 1.0),
    }
}

/// Drives an inner interval with eased time. Same duration as the inner.
#[derive(Debug)]
pub struct EaseAction {
    core: ActionCore,
    interval: IntervalState,
    easing: Easing,
    inner: Box<dyn IntervalAction>,
}

impl EaseAction {
    pub fn new(inner: Box<dyn IntervalAction>, easing: Easing) -> Self {
        EaseAction {
            core: ActionCore::default(),
            interval: IntervalState::new(inner.duration()),
            easing,
            inner,
        }
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn inner(&self) -> &dyn IntervalAction {
        self.inner.as_ref()
    }

    fn fresh(&self) -> Self {
        EaseAction::new(self.inner.clone_interval(), self.easing)
    }

    fn reversed(&self) -> Option<Self> {
        let inner = self.inner.reverse_interval()?;
        Some(EaseAction::new(inner, self.easing.mirrored()))
    }
}

impl Action for EaseAction {
    fn core(&self) -> &ActionCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ActionCore {
        &mut self.core
    }

    fn start_with_target(&mut self, target: Entity, nodes: &mut dyn NodeAccess) {
        self.core.start(target);
        self.interval.restart();
        self.inner.start_with_target(target, nodes);
    }

    fn step(&mut self, dt: f32, nodes: &mut dyn NodeAccess) {
        let t = self.interval.advance(dt);
        self.update(t, nodes);
    }

    fn update(&mut self, time: f32, nodes: &mut dyn NodeAccess) {
        self.inner.update(ease(self.easing, time), nodes);
    }

    fn is_done(&self, _nodes: &dyn NodeAccess) -> bool {
        self.interval.is_done()
    }

    fn stop(&mut self) {
        self.inner.stop();
        self.core.stop();
    }

    fn clone_action(&self) -> Box<dyn Action> {
        Box::new(self.fresh())
    }

    fn reverse(&self) -> Option<Box<dyn Action>> {
        self.reversed().map(|e| Box::new(e) as Box<dyn Action>)
    }

    fn progress(&self) -> Option<f32> {
        Some(self.interval.progress())
    }
}

impl IntervalAction for EaseAction {
    fn interval(&self) -> &IntervalState {
        &self.interval
    }

    fn clone_interval(&self) -> Box<dyn IntervalAction> {
        Box::new(self.fresh())
    }

    fn reverse_interval(&self) -> Option<Box<dyn IntervalAction>> {
        self.reversed()
            .map(|e| Box::new(e) as Box<dyn IntervalAction>)
    }
}
