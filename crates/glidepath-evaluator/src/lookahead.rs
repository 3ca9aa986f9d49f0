//! Greedy one-step lookahead over a fixed action set.
//!
//! For each candidate control, [`GreedyLookahead`] clones the state, applies the
//! control for one frame, and scores the successor:
//!
//! - successor below the death barrier: `-inf`
//! - otherwise: the value store's estimate for the successor
//!
//! The candidate with the highest score wins.
//!
//! # Action Order
//!
//! Candidates are tried in [`ACTIONS`] order, from full forward stick to full back
//! stick. Only a strictly better score replaces the current choice, so ties go to the
//! earlier (larger) control. If every candidate fails, the first one is returned with a
//! score of `-inf`.
//!
//! # Scoring
//!
//! The score is the continuation value alone; the successor's own height is not folded
//! in. Callers that perform Bellman backups take `max(height, score)` themselves.

use arrayvec::ArrayVec;
use glidepath_engine::{Environment, FlightState as _, is_below_barrier};

use crate::value_store::ValueStore;

/// Candidate controls, in tie-break order.
pub const ACTIONS: [f32; 9] = [64.0, 48.0, 32.0, 16.0, 0.0, -16.0, -32.0, -48.0, -64.0];

/// The control chosen by a lookahead and its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionChoice {
    pub control: f32,
    pub value: f32,
}

/// One-step lookahead policy.
#[derive(Debug, Clone, Copy)]
pub struct GreedyLookahead {
    death_barrier: f32,
}

impl GreedyLookahead {
    #[must_use]
    pub const fn new(death_barrier: f32) -> Self {
        Self { death_barrier }
    }

    /// Scores every candidate control from `state`, in [`ACTIONS`] order.
    #[must_use]
    pub fn score_actions<E>(
        &self,
        env: &E,
        store: &ValueStore<E::State>,
        state: &E::State,
    ) -> ArrayVec<ActionChoice, 9>
    where
        E: Environment + ?Sized,
    {
        ACTIONS
            .iter()
            .map(|&control| {
                let mut next = state.clone();
                next.set_control(control);
                env.step(&mut next);
                let value = if is_below_barrier(&next, self.death_barrier) {
                    f32::NEG_INFINITY
                } else {
                    store.estimate(&next).value
                };
                ActionChoice { control, value }
            })
            .collect()
    }

    /// Selects the best control from `state`.
    #[must_use]
    pub fn select_action<E>(
        &self,
        env: &E,
        store: &ValueStore<E::State>,
        state: &E::State,
    ) -> ActionChoice
    where
        E: Environment + ?Sized,
    {
        let scores = self.score_actions(env, store, state);
        let mut best = scores[0];
        for choice in &scores[1..] {
            if choice.value > best.value {
                best = *choice;
            }
        }
        best
    }

    /// Bellman backup for `state`: the better of its own height and the best
    /// continuation value.
    #[must_use]
    pub fn backup<E>(&self, env: &E, store: &ValueStore<E::State>, state: &E::State) -> f32
    where
        E: Environment + ?Sized,
    {
        let choice = self.select_action(env, store, state);
        state.vertical_position().max(choice.value)
    }
}

#[cfg(test)]
mod tests {
    use glidepath_engine::{Environment, FlightState};

    use super::*;

    /// Height moves by `control / 16` per frame; speed and pitch are constant.
    #[derive(Debug, Clone, PartialEq)]
    struct Lift {
        height: f32,
        control: f32,
    }

    impl FlightState for Lift {
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

    struct LiftEnv;

    impl Environment for LiftEnv {
        type State = Lift;

        fn initial_state(&self, _forward_velocity: f32, vertical_position: f32) -> Lift {
            Lift {
                height: vertical_position,
                control: 0.0,
            }
        }

        fn step(&self, state: &mut Lift) {
            state.height += state.control / 16.0;
        }
    }

    fn lift(height: f32) -> Lift {
        LiftEnv.initial_state(100.0, height)
    }

    #[test]
    fn test_empty_store_ties_pick_largest_control() {
        let store = ValueStore::new();
        let policy = GreedyLookahead::new(-100.0);
        let choice = policy.select_action(&LiftEnv, &store, &lift(0.0));
        assert_eq!(choice, ActionChoice { control: 64.0, value: 0.0 });
    }

    #[test]
    fn test_equal_values_pick_earliest_action() {
        // A single entry makes every successor map to the same value.
        let mut store = ValueStore::new();
        store.set_value(&lift(0.0), 42.0);
        let policy = GreedyLookahead::new(-100.0);
        let choice = policy.select_action(&LiftEnv, &store, &lift(0.0));
        assert_eq!(choice.control, ACTIONS[0]);
        assert_eq!(choice.value, 42.0);
    }

    #[test]
    fn test_selects_control_reaching_best_entry() {
        // Successors land at heights -4..=4. Negative ones are nearest to the -4000 entry,
        // and -16 is the first action producing one.
        let mut store = ValueStore::new();
        store.set_value(&lift(4000.0), 1.0);
        store.set_value(&lift(-4000.0), 9.0);
        let policy = GreedyLookahead::new(-100.0);
        let choice = policy.select_action(&LiftEnv, &store, &lift(0.0));
        assert_eq!(choice, ActionChoice { control: -16.0, value: 9.0 });
    }

    #[test]
    fn test_failing_actions_score_negative_infinity() {
        let store = ValueStore::new();
        let policy = GreedyLookahead::new(0.0);
        let scores = policy.score_actions(&LiftEnv, &store, &lift(1.5));
        for choice in &scores {
            // 1.5 + control / 16 < 0 only for -32, -48 and -64.
            if choice.control < -16.0 {
                assert_eq!(choice.value, f32::NEG_INFINITY);
            } else {
                assert_eq!(choice.value, 0.0);
            }
        }
    }

    #[test]
    fn test_all_failing_returns_first_action() {
        let store = ValueStore::new();
        let policy = GreedyLookahead::new(1000.0);
        let choice = policy.select_action(&LiftEnv, &store, &lift(0.0));
        assert_eq!(choice.control, 64.0);
        assert_eq!(choice.value, f32::NEG_INFINITY);
    }

    #[test]
    fn test_lookahead_does_not_mutate_state() {
        let store = ValueStore::new();
        let state = lift(3.0);
        let _ = GreedyLookahead::new(-100.0).select_action(&LiftEnv, &store, &state);
        assert_eq!(state, lift(3.0));
    }

    #[test]
    fn test_backup_takes_own_height_when_higher() {
        let mut store = ValueStore::new();
        store.set_value(&lift(0.0), 2.0);
        let policy = GreedyLookahead::new(-100.0);
        assert_eq!(policy.backup(&LiftEnv, &store, &lift(10.0)), 10.0);
        assert_eq!(policy.backup(&LiftEnv, &store, &lift(1.0)), 2.0);
    }
}
