//! Shared value types: state vectors, derived changes, targets and
//! required states.

mod change;
mod state;
mod target;

pub use change::{
    active_changes, derive_changes, ChangeKind, OperatorChange, DEFAULT_HOLD_BAND,
};
pub use state::{clamp01, StateVector};
pub use target::{OutcomeTarget, RequiredState, RequirementDetail};
