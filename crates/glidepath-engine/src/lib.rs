//! Simulation contract and reference flight model.
//!
//! The search engines in `glidepath-evaluator` and `glidepath-training` never look
//! inside the simulation. They only need:
//!
//! - [`Environment`] - creates launch states and advances a state by one frame
//! - [`FlightState`] - a cloneable snapshot with readable pitch, height and speed, and a
//!   settable control input
//!
//! The [`flight`] module provides a deterministic pitch-only flying model implementing
//! both traits. It is what the CLI drives, but any deterministic step function works.
//!
//! # Death Barrier
//!
//! A trajectory fails once its vertical position drops below the death barrier. The
//! barrier is a search parameter, not a property of the environment, so it is passed to
//! [`is_below_barrier`] by whoever owns the rollout. [`DEFAULT_DEATH_BARRIER`] holds the
//! usual value.
//!
//! # Example
//!
//! ```
//! use glidepath_engine::{Environment, FlightState, LaunchParams, flight::FlightModel};
//!
//! let env = FlightModel;
//! let mut state = LaunchParams::default().launch(&env);
//!
//! let mut branch = state.clone();
//! branch.set_control(64.0);
//! env.step(&mut branch);
//!
//! // The original state is untouched by the branch.
//! assert_eq!(state.control(), 0.0);
//! env.step(&mut state);
//! ```

use serde::{Deserialize, Serialize};

pub use self::environment::*;

mod environment;
pub mod flight;

/// Vertical position below which a trajectory is considered failed.
pub const DEFAULT_DEATH_BARRIER: f32 = -8191.0 + 2048.0;

/// Smallest and largest accepted control value.
pub const CONTROL_LIMIT: f32 = 64.0;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("control value {value} is outside [-64, 64]")]
pub struct ControlRangeError {
    pub value: f32,
}

/// Initial conditions shared by every rollout of a search run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaunchParams {
    pub forward_velocity: f32,
    pub vertical_position: f32,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            forward_velocity: 113.0,
            vertical_position: -2200.0,
        }
    }
}

impl LaunchParams {
    /// Creates a fresh launch state in `env`.
    #[must_use]
    pub fn launch<E>(&self, env: &E) -> E::State
    where
        E: Environment + ?Sized,
    {
        env.initial_state(self.forward_velocity, self.vertical_position)
    }
}

/// Clamps a control value into `[-CONTROL_LIMIT, CONTROL_LIMIT]`.
#[must_use]
pub fn clip_control(value: f32) -> f32 {
    value.clamp(-CONTROL_LIMIT, CONTROL_LIMIT)
}
