//! Continuous state features for similarity queries.
//!
//! A [`FeatureVector`] summarizes a state in three roughly comparable coordinates:
//!
//! | Index | Source             | Transform        | Typical range     |
//! |-------|--------------------|------------------|-------------------|
//! | 0     | pitch angle        | `pitch / 1000`   | about -11 to 11   |
//! | 1     | vertical position  | `y / 1000`       | depends on flight |
//! | 2     | forward velocity   | `sqrt(v) * 10`   | about 50 to 135   |
//!
//! The square root flattens the speed axis so that distances at high speed are not
//! dominated by small relative changes.

use glidepath_engine::FlightState;

const PITCH_SCALE: f32 = 1000.0;
const HEIGHT_SCALE: f32 = 1000.0;
const SPEED_SCALE: f32 = 10.0;

/// Number of features extracted from a state.
pub const FEATURE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f32; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub const fn new(values: [f32; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    /// Extracts the feature vector of `state`.
    #[must_use]
    pub fn from_state<S>(state: &S) -> Self
    where
        S: FlightState,
    {
        Self([
            state.pitch_angle() / PITCH_SCALE,
            state.vertical_position() / HEIGHT_SCALE,
            state.forward_velocity().sqrt() * SPEED_SCALE,
        ])
    }

    #[must_use]
    pub fn values(&self) -> &[f32; FEATURE_COUNT] {
        &self.0
    }

    #[must_use]
    pub fn squared_distance(&self, other: &Self) -> f32 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b).powi(2))
            .sum()
    }

    /// Euclidean distance between two feature vectors.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f32 {
        self.squared_distance(other).sqrt()
    }
}
