//! Search algorithms that learn to keep a glider airborne.
//!
//! Two independent optimizers share the environment abstraction from `glidepath-engine`
//! and the state summaries from `glidepath-evaluator`:
//!
//! - [`policy_iteration`] learns a nearest-neighbor value function and flies it with a
//!   one-step greedy lookahead.
//! - [`table_search`] hill-climbs a bucket-indexed [`table::ControlTable`] judged by the
//!   lexicographic trajectory metric.
//!
//! Both are single-threaded and deterministic given a seeded random number generator.

pub mod policy_iteration;
pub mod table;
pub mod table_search;
