//! Bucket-indexed control tables.
//!
//! A [`ControlTable`] maps [`BucketKey`]s to control values in `[-64, 64]`. A key with no
//! entry has control `0.0`. That default is applied in exactly one place,
//! [`ControlTable::control`]; everything else goes through it.
//!
//! The same type doubles as an override map: [`ControlTable::control_with`] looks a key
//! up in the overrides first and falls back to the table, and [`ControlTable::merge`]
//! makes overrides permanent.
//!
//! # Serialization
//!
//! A table serializes as a JSON array of `[key, control]` pairs, ordered by key:
//!
//! ```json
//! [[[-1, -3, 106], 12.5], [[0, -3, 106], -4.0]]
//! ```
//!
//! Deserialization rejects non-finite or out-of-range controls and duplicate keys.

use std::collections::BTreeMap;

use glidepath_engine::{CONTROL_LIMIT, clip_control};
use glidepath_evaluator::bucket::BucketKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ControlTableError {
    #[display("control {value} for bucket {key:?} is outside [-64, 64]")]
    OutOfRange { key: BucketKey, value: f32 },
    #[display("bucket {key:?} appears more than once")]
    DuplicateKey { key: BucketKey },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<(BucketKey, f32)>", into = "Vec<(BucketKey, f32)>")]
pub struct ControlTable {
    controls: BTreeMap<BucketKey, f32>,
}

impl TryFrom<Vec<(BucketKey, f32)>> for ControlTable {
    type Error = ControlTableError;

    fn try_from(pairs: Vec<(BucketKey, f32)>) -> Result<Self, Self::Error> {
        let mut controls = BTreeMap::new();
        for (key, value) in pairs {
            if !(-CONTROL_LIMIT..=CONTROL_LIMIT).contains(&value) {
                return Err(ControlTableError::OutOfRange { key, value });
            }
            if controls.insert(key, value).is_some() {
                return Err(ControlTableError::DuplicateKey { key });
            }
        }
        Ok(Self { controls })
    }
}

impl From<ControlTable> for Vec<(BucketKey, f32)> {
    fn from(table: ControlTable) -> Self {
        table.controls.into_iter().collect()
    }
}

impl ControlTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Returns the explicit entry for `key`, if any.
    #[must_use]
    pub fn get(&self, key: &BucketKey) -> Option<f32> {
        self.controls.get(key).copied()
    }

    /// Returns the control for `key`, `0.0` when the table has no entry.
    #[must_use]
    pub fn control(&self, key: &BucketKey) -> f32 {
        self.get(key).unwrap_or(0.0)
    }

    /// Returns the control for `key`, preferring `overrides` over `self`.
    #[must_use]
    pub fn control_with(&self, overrides: &ControlTable, key: &BucketKey) -> f32 {
        overrides.get(key).unwrap_or_else(|| self.control(key))
    }

    /// Sets the control for `key`, clipped to `[-64, 64]`.
    pub fn insert(&mut self, key: BucketKey, value: f32) {
        self.controls.insert(key, clip_control(value));
    }

    /// Copies every entry of `overrides` into `self`, replacing existing entries.
    pub fn merge(&mut self, overrides: ControlTable) {
        self.controls.extend(overrides.controls);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BucketKey, &f32)> + '_ {
        self.controls.iter()
    }
}
