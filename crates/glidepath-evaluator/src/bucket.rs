//! Discrete state buckets for table-based control.
//!
//! A [`BucketKey`] quantizes a state into integer cells:
//!
//! - **pitch**: `floor(pitch / 1000)`
//! - **height**: `floor(trunc(y) / 1000)`
//! - **speed**: `trunc(sqrt(v) * 10)`
//!
//! States that share a key are treated as control-equivalent: a control table assigns
//! one control value per key.
//!
//! # Serialization
//!
//! Keys serialize as a plain `[pitch, height, speed]` integer array so that they
//! round-trip exactly through JSON.

use glidepath_engine::FlightState;
use serde::{Deserialize, Serialize};

const PITCH_BIN_WIDTH: f32 = 1000.0;
const HEIGHT_BIN_WIDTH: i32 = 1000;
const SPEED_SCALE: f32 = 10.0;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(from = "[i32; 3]", into = "[i32; 3]")]
pub struct BucketKey {
    pub pitch: i32,
    pub height: i32,
    pub speed: i32,
}

impl From<[i32; 3]> for BucketKey {
    fn from([pitch, height, speed]: [i32; 3]) -> Self {
        Self {
            pitch,
            height,
            speed,
        }
    }
}

impl From<BucketKey> for [i32; 3] {
    fn from(key: BucketKey) -> Self {
        [key.pitch, key.height, key.speed]
    }
}

impl BucketKey {
    #[must_use]
    pub const fn new(pitch: i32, height: i32, speed: i32) -> Self {
        Self {
            pitch,
            height,
            speed,
        }
    }

    /// Computes the bucket containing `state`.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn from_state<S>(state: &S) -> Self
    where
        S: FlightState,
    {
        let pitch = (state.pitch_angle() / PITCH_BIN_WIDTH).floor() as i32;
        let height = (state.vertical_position().trunc() as i32).div_euclid(HEIGHT_BIN_WIDTH);
        let speed = (state.forward_velocity().sqrt() * SPEED_SCALE) as i32;
        Self {
            pitch,
            height,
            speed,
        }
    }

    #[must_use]
    pub const fn offset(self, d_pitch: i32, d_height: i32, d_speed: i32) -> Self {
        Self {
            pitch: self.pitch + d_pitch,
            height: self.height + d_height,
            speed: self.speed + d_speed,
        }
    }

    /// Returns every key within Chebyshev distance `radius` of `self`, paired with its
    /// squared Euclidean offset from `self`.
    ///
    /// Keys are produced in lexicographic offset order, `self` included.
    pub fn neighborhood(self, radius: i32) -> impl Iterator<Item = (Self, i32)> {
        let range = move || -radius..=radius;
        range().flat_map(move |dp| {
            range().flat_map(move |dh| {
                range().map(move |ds| (self.offset(dp, dh, ds), dp * dp + dh * dh + ds * ds))
            })
        })
    }
}
