//! Operator alphabet and static metadata.
//!
//! The model describes a subject with 25 normalized scalar operators,
//! each in `[0, 1]`, grouped into eight categories. This module owns the
//! canonical alphabet, per-operator change difficulty, inversion flags,
//! and the level-indexed expected-range tables.

mod meta;
mod registry;

pub use meta::{OperatorCategory, OperatorMeta, LEVEL_COUNT, MAX_LEVEL, MIN_LEVEL};
pub use registry::OperatorRegistry;
