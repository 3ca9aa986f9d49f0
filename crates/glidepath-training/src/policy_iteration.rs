//! Generalized policy iteration over a nearest-neighbor value function.
//!
//! The optimizer owns a [`ValueStore`] and improves it with three operations:
//!
//! 1. **Coverage fill** ([`PolicyIterationOptimizer::fill_coverage`]) - follow the greedy
//!    policy from a launch state, recording every visited state that is farther than
//!    `accept_radius` from all stored entries. New entries are seeded with a one-step
//!    Bellman backup.
//! 2. **Improvement** ([`PolicyIterationOptimizer::improve`]) - sweep the store,
//!    recomputing every entry's backup, until a full pass changes nothing.
//! 3. **Rollout** ([`PolicyIterationOptimizer::rollout`]) - follow the greedy policy
//!    without learning and report the height trajectory.
//!
//! # Bellman Backup
//!
//! The value of a state is the best height believed reachable from it:
//!
//! ```text
//! backup(s) = max(height(s), max_a V(step(s, a)))
//! ```
//!
//! where `V` is the nearest-neighbor estimate and failing successors score `-inf`.
//!
//! # Convergence
//!
//! Improvement is an in-place relaxation: later entries in a pass already see values
//! raised earlier in the same pass. Values never decrease, and every value is drawn from
//! the finite set of recorded heights, so the sweep loop terminates. The fixed point is
//! relative to the current neighbor structure and is not a global optimum.
//!
//! # Example
//!
//! ```
//! use glidepath_engine::{LaunchParams, flight::FlightModel};
//! use glidepath_training::policy_iteration::{PolicyIterationOptimizer, ValueSearchParams};
//!
//! let env = FlightModel;
//! let params = ValueSearchParams {
//!     frames: 20,
//!     ..ValueSearchParams::default()
//! };
//! let launch = LaunchParams::default().launch(&env);
//!
//! let mut optimizer = PolicyIterationOptimizer::new(&env, params);
//! optimizer.fill_coverage(&launch);
//! optimizer.improve();
//! let heights = optimizer.rollout(&launch);
//! assert!(!heights.is_empty());
//! ```

use glidepath_engine::{DEFAULT_DEATH_BARRIER, Environment, FlightState as _, is_below_barrier};
use glidepath_evaluator::{lookahead::GreedyLookahead, value_store::ValueStore};

/// Tunables for value-function search.
#[derive(Debug, Clone, Copy)]
pub struct ValueSearchParams {
    /// Feature distance beyond which a visited state is considered uncovered.
    pub accept_radius: f32,
    /// Frame cap for coverage fills and rollouts.
    pub frames: usize,
    /// Height below which a trajectory fails.
    pub death_barrier: f32,
}

impl Default for ValueSearchParams {
    fn default() -> Self {
        Self {
            accept_radius: 1.0,
            frames: 100,
            death_barrier: DEFAULT_DEATH_BARRIER,
        }
    }
}

/// Outcome of [`PolicyIterationOptimizer::improve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImprovementReport {
    /// Number of full passes, including the final pass that changed nothing.
    pub passes: usize,
    /// Total number of entry updates across all passes.
    pub updates: usize,
}

/// Summary of one [`PolicyIterationOptimizer::train`] round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundReport {
    pub added_entries: usize,
    pub total_entries: usize,
    pub improvement: ImprovementReport,
    /// Highest point of the greedy rollout after the round.
    pub max_height: f32,
}

#[derive(Debug)]
pub struct PolicyIterationOptimizer<'a, E>
where
    E: Environment + ?Sized,
{
    env: &'a E,
    params: ValueSearchParams,
    policy: GreedyLookahead,
    store: ValueStore<E::State>,
}

impl<'a, E> PolicyIterationOptimizer<'a, E>
where
    E: Environment + ?Sized,
{
    #[must_use]
    pub fn new(env: &'a E, params: ValueSearchParams) -> Self {
        Self::with_store(env, params, ValueStore::new())
    }

    /// Creates an optimizer that continues from an existing value store.
    #[must_use]
    pub fn with_store(env: &'a E, params: ValueSearchParams, store: ValueStore<E::State>) -> Self {
        Self {
            env,
            params,
            policy: GreedyLookahead::new(params.death_barrier),
            store,
        }
    }

    #[must_use]
    pub fn params(&self) -> &ValueSearchParams {
        &self.params
    }

    #[must_use]
    pub fn store(&self) -> &ValueStore<E::State> {
        &self.store
    }

    #[must_use]
    pub fn into_store(self) -> ValueStore<E::State> {
        self.store
    }

    /// Follows the greedy policy from `initial`, recording uncovered states.
    ///
    /// Returns the number of entries added.
    pub fn fill_coverage(&mut self, initial: &E::State) -> usize {
        let accept_radius = self.params.accept_radius;
        self.walk(initial, |store, state| {
            store.estimate(state).distance > accept_radius
        })
    }

    /// Follows the greedy policy from `initial`, recording every visited state.
    ///
    /// Returns the number of entries added.
    pub fn record_path(&mut self, initial: &E::State) -> usize {
        self.walk(initial, |_, _| true)
    }

    fn walk<F>(&mut self, initial: &E::State, mut should_record: F) -> usize
    where
        F: FnMut(&ValueStore<E::State>, &E::State) -> bool,
    {
        let mut state = initial.clone();
        let mut added = 0;
        for _ in 0..self.params.frames {
            let record = should_record(&self.store, &state);
            let choice = self.policy.select_action(self.env, &self.store, &state);
            if record {
                let value = state.vertical_position().max(choice.value);
                self.store.set_value(&state, value);
                added += 1;
            }

            state.set_control(choice.control);
            self.env.step(&mut state);
            if is_below_barrier(&state, self.params.death_barrier) {
                break;
            }
        }
        tracing::debug!(added, total = self.store.len(), "walk finished");
        added
    }

    /// Sweeps the store with Bellman backups until a full pass changes nothing.
    pub fn improve(&mut self) -> ImprovementReport {
        let mut report = ImprovementReport {
            passes: 0,
            updates: 0,
        };
        loop {
            report.passes += 1;
            let mut pass_updates = 0;
            for index in 0..self.store.len() {
                let state = self.store.entries()[index].state();
                let value = self.policy.backup(self.env, &self.store, state);
                if self.store.raise_value(index, value) {
                    pass_updates += 1;
                }
            }
            tracing::debug!(pass = report.passes, updates = pass_updates, "improvement pass");
            report.updates += pass_updates;
            if pass_updates == 0 {
                break;
            }
        }
        report
    }

    /// Follows the greedy policy from `initial` without learning.
    ///
    /// The trajectory starts with the initial height and ends at the frame cap or just
    /// before the first frame below the death barrier.
    #[must_use]
    pub fn rollout(&self, initial: &E::State) -> Vec<f32> {
        let mut state = initial.clone();
        let mut heights = vec![state.vertical_position()];
        for _ in 0..self.params.frames {
            let choice = self.policy.select_action(self.env, &self.store, &state);
            state.set_control(choice.control);
            self.env.step(&mut state);
            if is_below_barrier(&state, self.params.death_barrier) {
                break;
            }
            heights.push(state.vertical_position());
        }
        heights
    }

    /// Alternates coverage fill, improvement and evaluation for `rounds` rounds.
    pub fn train(&mut self, initial: &E::State, rounds: usize) -> Vec<RoundReport> {
        (0..rounds)
            .map(|round| {
                let added_entries = self.fill_coverage(initial);
                let improvement = self.improve();
                let max_height = self
                    .rollout(initial)
                    .into_iter()
                    .fold(f32::NEG_INFINITY, f32::max);
                tracing::info!(
                    round,
                    added_entries,
                    total_entries = self.store.len(),
                    passes = improvement.passes,
                    max_height,
                    "value search round"
                );
                RoundReport {
                    added_entries,
                    total_entries: self.store.len(),
                    improvement,
                    max_height,
                }
            })
            .collect()
    }
}
