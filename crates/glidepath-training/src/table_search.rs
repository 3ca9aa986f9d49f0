//! Hill climbing over a bucket-indexed control table.
//!
//! [`TableLocalSearch`] keeps the best [`ControlTable`] found so far together with the
//! bucket trace and [`TrajectoryMetric`] of its last evaluation. Each step:
//!
//! 1. picks a root bucket uniformly from the trace, so buckets the flight actually
//!    visits (and visits often) are perturbed more often,
//! 2. draws a delta in `[-max_delta, max_delta]` and spreads it over the cube of buckets
//!    around the root with weight `1 / (1 + d² / (R + 1))`,
//! 3. evaluates the table with those overrides on top, and
//! 4. merges the overrides only if the metric is strictly better.
//!
//! Acceptance is strict hill climbing; there is no temperature. The committed best
//! metric therefore never decreases.
//!
//! # Example
//!
//! ```
//! use glidepath_engine::flight::FlightModel;
//! use glidepath_training::{
//!     table::ControlTable,
//!     table_search::{TableLocalSearch, TableSearchParams},
//! };
//! use rand::SeedableRng as _;
//! use rand_pcg::Pcg32;
//!
//! let params = TableSearchParams {
//!     frames: 100,
//!     ..TableSearchParams::default()
//! };
//! let mut search = TableLocalSearch::new(&FlightModel, params, ControlTable::new());
//! let mut rng = Pcg32::seed_from_u64(42);
//! let report = search.run(&mut rng, f32::INFINITY, 10);
//! assert_eq!(report.iterations, 10);
//! ```

use glidepath_engine::{
    DEFAULT_DEATH_BARRIER, Environment, FlightState as _, LaunchParams, clip_control,
    is_below_barrier,
};
use glidepath_evaluator::{bucket::BucketKey, trajectory::TrajectoryMetric};
use rand::{Rng, seq::IndexedRandom as _};

use crate::table::ControlTable;

/// Tunables for table hill climbing.
#[derive(Debug, Clone, Copy)]
pub struct TableSearchParams {
    pub launch: LaunchParams,
    /// Frame cap of every evaluation.
    pub frames: usize,
    /// Height below which a trajectory fails.
    pub death_barrier: f32,
    /// Chebyshev radius `R` of the perturbed bucket cube.
    pub perturbation_radius: i32,
    /// Largest absolute delta applied at the root bucket.
    pub max_delta: f32,
}

impl Default for TableSearchParams {
    fn default() -> Self {
        Self {
            launch: LaunchParams::default(),
            frames: 1800,
            death_barrier: DEFAULT_DEATH_BARRIER,
            perturbation_radius: 5,
            max_delta: 32.0,
        }
    }
}

/// Result of one table evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Rollout {
    /// Height at launch followed by the height after every surviving frame.
    pub heights: Vec<f32>,
    /// Bucket of the state at the start of every simulated frame.
    pub buckets: Vec<BucketKey>,
}

impl Rollout {
    /// Scores the height trajectory. A rollout always contains the launch height.
    #[must_use]
    pub fn metric(&self) -> TrajectoryMetric {
        TrajectoryMetric::from_heights(&self.heights).unwrap_or(TrajectoryMetric::worst())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum StepOutcome {
    /// The candidate was merged; `metric` is the new best.
    Accepted { metric: TrajectoryMetric },
    Rejected,
}

/// Summary of a [`TableLocalSearch::run`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchReport {
    pub iterations: usize,
    pub accepted: usize,
    pub best_metric: TrajectoryMetric,
}

#[derive(Debug)]
pub struct TableLocalSearch<'a, E>
where
    E: Environment + ?Sized,
{
    env: &'a E,
    params: TableSearchParams,
    table: ControlTable,
    trace: Vec<BucketKey>,
    best_metric: TrajectoryMetric,
}

impl<'a, E> TableLocalSearch<'a, E>
where
    E: Environment + ?Sized,
{
    /// Creates a search starting from `table`, evaluating it once.
    #[must_use]
    pub fn new(env: &'a E, params: TableSearchParams, table: ControlTable) -> Self {
        let mut search = Self {
            env,
            params,
            table,
            trace: vec![],
            best_metric: TrajectoryMetric::worst(),
        };
        let rollout = search.evaluate(&search.table, &ControlTable::new());
        search.best_metric = rollout.metric();
        search.trace = rollout.buckets;
        tracing::debug!(
            entries = search.table.len(),
            max_height = search.best_metric.max_height,
            "initial table evaluated"
        );
        search
    }

    #[must_use]
    pub fn params(&self) -> &TableSearchParams {
        &self.params
    }

    #[must_use]
    pub fn table(&self) -> &ControlTable {
        &self.table
    }

    #[must_use]
    pub fn best_metric(&self) -> TrajectoryMetric {
        self.best_metric
    }

    /// Buckets visited by the last accepted evaluation.
    #[must_use]
    pub fn trace(&self) -> &[BucketKey] {
        &self.trace
    }

    #[must_use]
    pub fn into_table(self) -> ControlTable {
        self.table
    }

    /// Flies `table` with `overrides` on top from the launch state.
    #[must_use]
    pub fn evaluate(&self, table: &ControlTable, overrides: &ControlTable) -> Rollout {
        let mut state = self.params.launch.launch(self.env);
        let mut heights = vec![state.vertical_position()];
        let mut buckets = Vec::with_capacity(self.params.frames);

        for _ in 0..self.params.frames {
            let bucket = BucketKey::from_state(&state);
            buckets.push(bucket);
            state.set_control(table.control_with(overrides, &bucket));
            self.env.step(&mut state);
            if is_below_barrier(&state, self.params.death_barrier) {
                break;
            }
            heights.push(state.vertical_position());
        }

        Rollout { heights, buckets }
    }

    /// Builds the override map that adds `delta` around `root`, decayed by distance.
    ///
    /// The table itself is not modified.
    #[must_use]
    pub fn perturb(&self, root: BucketKey, delta: f32) -> ControlTable {
        let radius = self.params.perturbation_radius;
        #[expect(clippy::cast_precision_loss)]
        let scale = (radius + 1) as f32;

        let mut overrides = ControlTable::new();
        for (key, squared_distance) in root.neighborhood(radius) {
            #[expect(clippy::cast_precision_loss)]
            let weight = 1.0 / (1.0 + squared_distance as f32 / scale);
            overrides.insert(key, clip_control(self.table.control(&key) + delta * weight));
        }
        overrides
    }

    /// Draws a random perturbation rooted at a bucket of the current trace.
    ///
    /// Returns `None` when the trace is empty.
    pub fn propose<R>(&self, rng: &mut R) -> Option<ControlTable>
    where
        R: Rng + ?Sized,
    {
        let root = *self.trace.choose(rng)?;
        let max_delta = self.params.max_delta;
        let delta = rng.random_range(-max_delta..=max_delta);
        Some(self.perturb(root, delta))
    }

    /// Evaluates one random proposal and merges it if it strictly improves the metric.
    pub fn step<R>(&mut self, rng: &mut R) -> StepOutcome
    where
        R: Rng + ?Sized,
    {
        let Some(overrides) = self.propose(rng) else {
            return StepOutcome::Rejected;
        };
        let rollout = self.evaluate(&self.table, &overrides);
        let metric = rollout.metric();
        if metric > self.best_metric {
            self.table.merge(overrides);
            self.trace = rollout.buckets;
            self.best_metric = metric;
            StepOutcome::Accepted { metric }
        } else {
            StepOutcome::Rejected
        }
    }

    /// Steps until the best max height reaches `target_height` or `max_iterations`
    /// steps have run.
    pub fn run<R>(&mut self, rng: &mut R, target_height: f32, max_iterations: usize) -> SearchReport
    where
        R: Rng + ?Sized,
    {
        let mut report = SearchReport {
            iterations: 0,
            accepted: 0,
            best_metric: self.best_metric,
        };
        while report.iterations < max_iterations && self.best_metric.max_height < target_height {
            report.iterations += 1;
            if let StepOutcome::Accepted { metric } = self.step(rng) {
                report.accepted += 1;
                tracing::info!(
                    iteration = report.iterations,
                    entries = self.table.len(),
                    max_height = metric.max_height,
                    average_gain = metric.average_gain,
                    length = metric.length,
                    "accepted table update"
                );
            }
        }
        report.best_metric = self.best_metric;
        report
    }
}

#[cfg(test)]
mod tests {
    use glidepath_engine::{FlightState, flight::FlightModel};
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    /// Point mass under constant gravity. Each frame the climb rate changes by
    /// `control * lift - gravity`.
    #[derive(Debug, Clone, PartialEq)]
    struct Ballistic {
        height: f32,
        climb_rate: f32,
        control: f32,
    }

    impl FlightState for Ballistic {
        fn pitch_angle(&self) -> f32 {
            0.0
        }

        fn vertical_position(&self) -> f32 {
            self.height
        }

        fn forward_velocity(&self) -> f32 {
            100.0
        }

        fn control(&self) -> f32 {
            self.control
        }

        fn set_control(&mut self, control: f32) {
            self.control = control;
        }
    }

    struct BallisticEnv {
        initial_climb_rate: f32,
        gravity: f32,
        lift: f32,
    }

    impl Environment for BallisticEnv {
        type State = Ballistic;

        fn initial_state(&self, _forward_velocity: f32, vertical_position: f32) -> Ballistic {
            Ballistic {
                height: vertical_position,
                climb_rate: self.initial_climb_rate,
                control: 0.0,
            }
        }

        fn step(&self, state: &mut Ballistic) {
            state.climb_rate += state.control * self.lift - self.gravity;
            state.height += state.climb_rate;
        }
    }

    /// Control has no effect.
    const BALLISTIC: BallisticEnv = BallisticEnv {
        initial_climb_rate: 20.0,
        gravity: 1.0,
        lift: 0.0,
    };

    /// Full stick adds one unit of climb rate per frame.
    const LIFTING: BallisticEnv = BallisticEnv {
        lift: 1.0 / 64.0,
        ..BALLISTIC
    };

    fn ballistic_params(frames: usize) -> TableSearchParams {
        TableSearchParams {
            launch: LaunchParams {
                forward_velocity: 100.0,
                vertical_position: 0.0,
            },
            frames,
            death_barrier: -1.0e6,
            ..TableSearchParams::default()
        }
    }

    #[test]
    fn test_zero_table_reproduces_ballistic_arc() {
        let search = TableLocalSearch::new(&BALLISTIC, ballistic_params(60), ControlTable::new());
        let rollout = search.evaluate(&ControlTable::new(), &ControlTable::new());

        let expected: Vec<f32> = (0..=60u16)
            .map(|n| {
                let n = f32::from(n);
                20.0 * n - n * (n + 1.0) / 2.0
            })
            .collect();
        assert_eq!(rollout.heights, expected);
        assert_eq!(rollout.buckets.len(), 60);

        // Without lift the table cannot bend the arc.
        let mut table = ControlTable::new();
        table.insert(BucketKey::new(0, 0, 100), 64.0);
        assert_eq!(search.evaluate(&table, &ControlTable::new()).heights, expected);
    }

    #[test]
    fn test_evaluate_prefers_overrides() {
        let search = TableLocalSearch::new(&LIFTING, ballistic_params(1), ControlTable::new());
        let root = BucketKey::new(0, 0, 100);

        let mut table = ControlTable::new();
        table.insert(root, 32.0);
        let mut overrides = ControlTable::new();
        overrides.insert(root, 64.0);

        assert_eq!(search.evaluate(&table, &overrides).heights, vec![0.0, 20.0]);
        assert_eq!(search.evaluate(&table, &ControlTable::new()).heights, vec![0.0, 19.5]);
        assert_eq!(
            search.evaluate(&ControlTable::new(), &ControlTable::new()).heights,
            vec![0.0, 19.0]
        );
    }

    #[test]
    fn test_evaluate_stops_below_death_barrier() {
        let env = BallisticEnv {
            initial_climb_rate: 0.0,
            ..BALLISTIC
        };
        let params = TableSearchParams {
            death_barrier: -10.0,
            ..ballistic_params(100)
        };
        let search = TableLocalSearch::new(&env, params, ControlTable::new());
        let rollout = search.evaluate(search.table(), &ControlTable::new());
        // -10 is not below the barrier; the next frame (-15) is.
        assert_eq!(rollout.heights, vec![0.0, -1.0, -3.0, -6.0, -10.0]);
        assert_eq!(rollout.buckets.len(), 5);
        assert_eq!(search.best_metric().length, 5);
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let mut table = ControlTable::new();
        table.insert(BucketKey::new(0, 0, 100), 12.0);
        table.insert(BucketKey::new(2, -1, 98), -40.0);
        table.insert(BucketKey::new(30, 30, 30), 5.0);
        let search = TableLocalSearch::new(&BALLISTIC, ballistic_params(10), table.clone());

        let overrides = search.perturb(BucketKey::new(0, 0, 100), 0.0);
        assert_eq!(overrides.len(), 11 * 11 * 11);
        for (key, value) in overrides.iter() {
            assert_eq!(*value, table.control(key));
        }

        let mut merged = table.clone();
        merged.merge(overrides);
        for (key, value) in merged.iter() {
            assert_eq!(*value, table.control(key));
        }
    }

    #[test]
    fn test_perturb_decays_with_distance_and_clips() {
        let root = BucketKey::new(0, 0, 100);
        let mut table = ControlTable::new();
        table.insert(root.offset(0, 1, 0), 60.0);
        let search = TableLocalSearch::new(&BALLISTIC, ballistic_params(10), table);

        let overrides = search.perturb(root, 14.0);
        assert_eq!(overrides.get(&root), Some(14.0));
        // d² = 1: weight 1 / (1 + 1/6) = 6/7.
        let expected = 14.0 * (1.0 / (1.0 + 1.0 / 6.0));
        assert_eq!(overrides.get(&root.offset(1, 0, 0)), Some(expected));
        // 60 + 12 clips to 64.
        assert_eq!(overrides.get(&root.offset(0, 1, 0)), Some(64.0));
        // Corner of the cube, d² = 75.
        let corner = 14.0 * (1.0 / (1.0 + 75.0 / 6.0));
        assert_eq!(overrides.get(&root.offset(-5, 5, -5)), Some(corner));
        assert_eq!(overrides.get(&root.offset(6, 0, 0)), None);
    }

    #[test]
    fn test_propose_roots_at_trace() {
        let search = TableLocalSearch::new(&BALLISTIC, ballistic_params(5), ControlTable::new());
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..20 {
            let overrides = search.propose(&mut rng).unwrap();
            let near_trace = overrides.iter().any(|(key, _)| search.trace().contains(key));
            assert!(near_trace);
            assert!(overrides.iter().all(|(_, v)| v.abs() <= 32.0));
        }
    }

    #[test]
    fn test_propose_without_trace_is_none() {
        let search = TableLocalSearch::new(&BALLISTIC, ballistic_params(0), ControlTable::new());
        let mut rng = Pcg32::seed_from_u64(7);
        assert!(search.trace().is_empty());
        assert!(search.propose(&mut rng).is_none());
    }

    #[test]
    fn test_rejected_step_leaves_table_untouched() {
        // Every trajectory under a huge barrier is a single sample, so no proposal can
        // beat the initial metric.
        let params = TableSearchParams {
            death_barrier: 1.0e6,
            ..ballistic_params(10)
        };
        let mut search = TableLocalSearch::new(&BALLISTIC, params, ControlTable::new());
        let mut rng = Pcg32::seed_from_u64(1);
        for _ in 0..10 {
            assert!(search.step(&mut rng).is_rejected());
        }
        assert!(search.table().is_empty());
    }

    #[test]
    fn test_best_metric_never_regresses() {
        let params = TableSearchParams {
            frames: 200,
            ..TableSearchParams::default()
        };
        let mut search = TableLocalSearch::new(&FlightModel, params, ControlTable::new());
        let mut rng = Pcg32::seed_from_u64(2024);
        let mut best = search.best_metric();
        for _ in 0..40 {
            match search.step(&mut rng) {
                StepOutcome::Accepted { metric } => {
                    assert!(metric > best);
                    best = metric;
                }
                StepOutcome::Rejected => assert_eq!(search.best_metric(), best),
            }
        }

        // The committed table reproduces the committed metric.
        let rollout = search.evaluate(search.table(), &ControlTable::new());
        assert_eq!(rollout.metric(), best);
        assert_eq!(rollout.buckets, search.trace());
    }

    #[test]
    fn test_run_stops_at_target_height() {
        let mut search = TableLocalSearch::new(&BALLISTIC, ballistic_params(30), ControlTable::new());
        let mut rng = Pcg32::seed_from_u64(3);
        // The zero table already peaks at 190.
        let report = search.run(&mut rng, 100.0, 50);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.best_metric.max_height, 190.0);

        let report = search.run(&mut rng, f32::INFINITY, 25);
        assert_eq!(report.iterations, 25);
        assert_eq!(report.best_metric, search.best_metric());
        assert!(report.best_metric.max_height >= 190.0);
    }

    fn flight_params() -> TableSearchParams {
        TableSearchParams {
            frames: 150,
            ..TableSearchParams::default()
        }
    }

    #[test]
    fn test_same_seed_gives_same_table() {
        let search_with_seed = |seed| {
            let mut search =
                TableLocalSearch::new(&FlightModel, flight_params(), ControlTable::new());
            let mut rng = Pcg32::seed_from_u64(seed);
            let report = search.run(&mut rng, f32::INFINITY, 30);
            (report, search.into_table())
        };

        let (report_a, table_a) = search_with_seed(99);
        let (report_b, table_b) = search_with_seed(99);
        assert_eq!(report_a, report_b);
        assert_eq!(table_a, table_b);
        assert_eq!(report_a.iterations, 30);
    }

    #[test]
    fn test_resume_starts_from_committed_metric() {
        let mut first = TableLocalSearch::new(&FlightModel, flight_params(), ControlTable::new());
        let mut rng = Pcg32::seed_from_u64(5);
        let report = first.run(&mut rng, f32::INFINITY, 30);
        let trace = first.trace().to_vec();
        let table = first.into_table();

        // Persisted tables go through JSON before being resumed.
        let json = serde_json::to_string(&table).unwrap();
        let restored: ControlTable = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, table);

        let mut resumed = TableLocalSearch::new(&FlightModel, flight_params(), restored);
        assert_eq!(resumed.best_metric(), report.best_metric);
        assert_eq!(resumed.trace(), trace.as_slice());

        // Already at the target: nothing to do.
        let report = resumed.run(&mut rng, report.best_metric.max_height, 10);
        assert_eq!(report.iterations, 0);
        assert_eq!(resumed.table(), &table);
    }
}
