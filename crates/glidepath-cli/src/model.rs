use chrono::{DateTime, Utc};
use glidepath_engine::LaunchParams;
use glidepath_evaluator::trajectory::{PEAK_HYSTERESIS, TrajectoryMetric, find_peaks};
use glidepath_training::table::ControlTable;
use serde::{Deserialize, Serialize};

/// A learned control table and the conditions it was trained under.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TableModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub launch: LaunchParams,
    pub frames: usize,
    pub death_barrier: f32,
    pub final_metric: MetricSummary,
    pub entries: ControlTable,
}

/// JSON form of [`TrajectoryMetric`].
///
/// An average gain of `-inf` (fewer than two peaks) is written as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct MetricSummary {
    pub max_height: f32,
    pub average_gain: Option<f32>,
    pub length: usize,
}

impl From<TrajectoryMetric> for MetricSummary {
    fn from(metric: TrajectoryMetric) -> Self {
        Self {
            max_height: metric.max_height,
            average_gain: metric.average_gain.is_finite().then_some(metric.average_gain),
            length: metric.length,
        }
    }
}

/// Heights of one rollout with its peaks and score.
#[derive(Debug, Clone, Serialize)]
pub struct FlightReport {
    pub metric: MetricSummary,
    pub peaks: Vec<f32>,
    pub heights: Vec<f32>,
}

impl FlightReport {
    #[must_use]
    pub fn from_heights(heights: Vec<f32>) -> Self {
        let metric = TrajectoryMetric::from_heights(&heights).unwrap_or(TrajectoryMetric::worst());
        Self {
            metric: metric.into(),
            peaks: find_peaks(&heights, PEAK_HYSTERESIS),
            heights,
        }
    }
}
