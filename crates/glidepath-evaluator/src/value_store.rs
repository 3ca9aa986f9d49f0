//! Nearest-neighbor value function over sampled states.
//!
//! A [`ValueStore`] is an append-only list of [`ValueEntry`] samples. Each entry owns a
//! copy of the state it was recorded at, that state's [`FeatureVector`], and a value
//! estimate (the best height believed reachable from the state).
//!
//! The value of an arbitrary state is the value of the stored entry whose features are
//! closest to it. There is no interpolation: the estimate is piecewise constant over the
//! Voronoi cells of the stored feature vectors.
//!
//! # Invariants
//!
//! - Entries are never removed or reordered, so an index stays valid for the lifetime of
//!   the store.
//! - Values only change through [`ValueStore::raise_value`], which never lowers them.
//!
//! # Performance
//!
//! Queries scan every entry (O(n)). Callers keep `n` small by only recording states
//! that are far from every existing entry (see the coverage fill in
//! `glidepath-training`). The store itself never evicts.

use glidepath_engine::FlightState;

use crate::feature::FeatureVector;

/// A recorded state and its value estimate.
#[derive(Debug, Clone)]
pub struct ValueEntry<S> {
    state: S,
    features: FeatureVector,
    value: f32,
}

impl<S> ValueEntry<S> {
    #[must_use]
    pub fn state(&self) -> &S {
        &self.state
    }

    #[must_use]
    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    #[must_use]
    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Result of a value query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Value of the nearest entry, or `0.0` for an empty store.
    pub value: f32,
    /// Feature distance to the nearest entry, or `+inf` for an empty store.
    pub distance: f32,
}

impl Estimate {
    /// The answer for a store with no information.
    pub const UNKNOWN: Self = Self {
        value: 0.0,
        distance: f32::INFINITY,
    };
}

#[derive(Debug, Clone)]
pub struct ValueStore<S> {
    entries: Vec<ValueEntry<S>>,
}

impl<S> Default for ValueStore<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ValueStore<S> {
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: vec![] }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[ValueEntry<S>] {
        &self.entries
    }

    /// Raises the value of entry `index` to `value`.
    ///
    /// Returns `true` if the stored value changed, i.e. `value` was strictly greater.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn raise_value(&mut self, index: usize, value: f32) -> bool {
        let entry = &mut self.entries[index];
        if value > entry.value {
            entry.value = value;
            true
        } else {
            false
        }
    }
}

impl<S> ValueStore<S>
where
    S: FlightState,
{
    /// Estimates the value of `state` from its nearest stored neighbor.
    ///
    /// Distances are Euclidean in feature space. When several entries are equally
    /// close, the earliest inserted one wins.
    #[must_use]
    pub fn estimate(&self, state: &S) -> Estimate {
        let features = FeatureVector::from_state(state);
        let mut nearest: Option<(&ValueEntry<S>, f32)> = None;
        for entry in &self.entries {
            let d2 = features.squared_distance(&entry.features);
            if nearest.is_none_or(|(_, best)| d2 < best) {
                nearest = Some((entry, d2));
            }
        }

        match nearest {
            Some((entry, d2)) => Estimate {
                value: entry.value,
                distance: d2.sqrt(),
            },
            None => Estimate::UNKNOWN,
        }
    }

    /// Records a copy of `state` with the given value.
    pub fn set_value(&mut self, state: &S, value: f32) {
        self.entries.push(ValueEntry {
            state: state.clone(),
            features: FeatureVector::from_state(state),
            value,
        });
    }
}
