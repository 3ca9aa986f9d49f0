//! State summaries, trajectory scoring and value-based action selection.
//!
//! This crate holds everything the two search engines in `glidepath-training` use to
//! judge states and trajectories:
//!
//! 1. **State summaries** - [`feature`] maps a state to a continuous feature vector for
//!    similarity queries; [`bucket`] maps it to a discrete key for table lookups.
//!
//! 2. **Trajectory scoring** - [`trajectory`] detects peaks in a height sequence and
//!    builds a lexicographically ordered [`trajectory::TrajectoryMetric`].
//!
//! 3. **Value-based control** - [`value_store`] is a nearest-neighbor value function over
//!    sampled states, and [`lookahead`] picks the control whose one-step successor has
//!    the best estimated value.
//!
//! # Architecture
//!
//! ```text
//! Environment (glidepath-engine)
//!     ↓ states
//! feature / bucket
//!     ↓ keys
//! value_store ← lookahead        trajectory
//!     ↓ used by                     ↓ used by
//! policy iteration              table search   (glidepath-training)
//! ```
//!
//! Every function here is deterministic. Candidate evaluation always clones the state
//! it branches from, so callers' states are never mutated.

pub mod bucket;
pub mod feature;
pub mod lookahead;
pub mod trajectory;
pub mod value_store;
