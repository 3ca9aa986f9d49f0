//! Peak detection and lexicographic trajectory scoring.
//!
//! Sustained flight is a sequence of swoops: the agent trades height for speed and
//! back. A good controller makes each swoop peak a little higher than the last one.
//! [`TrajectoryMetric`] captures that with three criteria, compared in order:
//!
//! 1. **Max height** - the highest point reached
//! 2. **Average gain** - mean height gained from one peak to the next
//! 3. **Length** - number of height samples before failure or the frame cap
//!
//! # Peak Detection
//!
//! [`find_peaks`] walks the sequence alternating between two phases:
//!
//! - **Descending** (initial phase): track the running minimum. Once a sample rises more
//!   than the hysteresis band above it, switch to ascending.
//! - **Ascending**: track the running maximum. Once a sample falls more than the band
//!   below it, commit the maximum as a peak and switch to descending.
//!
//! Fluctuations smaller than the band never flip the phase, so noise does not produce
//! spurious peaks. An unfinished ascent at the end of the sequence is not a peak.
//!
//! # Example
//!
//! ```
//! use glidepath_evaluator::trajectory::{PEAK_HYSTERESIS, TrajectoryMetric, find_peaks};
//!
//! let heights = [0.0, 50.0, 200.0, 80.0, 250.0, 100.0];
//! assert_eq!(find_peaks(&heights, PEAK_HYSTERESIS), vec![200.0, 250.0]);
//!
//! let metric = TrajectoryMetric::from_heights(&heights).unwrap();
//! assert_eq!(metric.max_height, 250.0);
//! assert_eq!(metric.average_gain, 50.0);
//! assert_eq!(metric.length, 6);
//! ```

/// Minimum reversal, in height units, before the detector changes phase.
pub const PEAK_HYSTERESIS: f32 = 100.0;

#[derive(Debug, Clone, Copy)]
enum Phase {
    Descending { min: f32 },
    Ascending { max: f32 },
}

/// Returns the committed peaks of `heights`, in order.
#[must_use]
pub fn find_peaks(heights: &[f32], band: f32) -> Vec<f32> {
    let mut peaks = vec![];
    let Some(&first) = heights.first() else {
        return peaks;
    };

    let mut phase = Phase::Descending { min: first };
    for &height in heights {
        phase = match phase {
            Phase::Ascending { max } if height < max - band => {
                peaks.push(max);
                Phase::Descending { min: height }
            }
            Phase::Descending { min } if height > min + band => Phase::Ascending { max: height },
            Phase::Ascending { max } => Phase::Ascending {
                max: max.max(height),
            },
            Phase::Descending { min } => Phase::Descending {
                min: min.min(height),
            },
        };
    }
    peaks
}

/// Lexicographically ordered score of a height trajectory.
///
/// Field order is comparison order: the derived `PartialOrd` compares `max_height`
/// first, then `average_gain`, then `length`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TrajectoryMetric {
    /// Highest sample of the trajectory.
    pub max_height: f32,
    /// `(last_peak - first_peak) / (peak_count - 1)`, or `-inf` with fewer than two
    /// peaks.
    pub average_gain: f32,
    /// Number of height samples.
    pub length: usize,
}

impl TrajectoryMetric {
    /// Scores a height trajectory using [`PEAK_HYSTERESIS`].
    ///
    /// Returns `None` for an empty trajectory.
    #[must_use]
    pub fn from_heights(heights: &[f32]) -> Option<Self> {
        let max_height = heights.iter().copied().reduce(f32::max)?;
        let peaks = find_peaks(heights, PEAK_HYSTERESIS);
        Some(Self {
            max_height,
            average_gain: average_gain(&peaks),
            length: heights.len(),
        })
    }

    /// The worst possible metric; every scored trajectory beats it.
    #[must_use]
    pub const fn worst() -> Self {
        Self {
            max_height: f32::NEG_INFINITY,
            average_gain: f32::NEG_INFINITY,
            length: 0,
        }
    }
}

#[expect(clippy::cast_precision_loss)]
fn average_gain(peaks: &[f32]) -> f32 {
    match peaks {
        [first, .., last] => (last - first) / (peaks.len() - 1) as f32,
        _ => f32::NEG_INFINITY,
    }
}
