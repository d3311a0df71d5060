//! Derived per-operator changes.
//!
//! An [`OperatorChange`] is a read-only record of one required move,
//! derived from a `(current, required)` pair of vectors and sorted by
//! impact. Nothing downstream mutates a change; components copy what they
//! need.

use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::operators::OperatorRegistry;
use crate::types::StateVector;

/// Direction of a required change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// The operator must rise.
    Increase,
    /// The operator must fall.
    Decrease,
    /// The operator is already within the hold band and must be kept there.
    Stabilize,
}

impl ChangeKind {
    /// Classify a delta against the hold band.
    #[inline]
    pub fn from_delta(delta: f32, hold_band: f32) -> Self {
        if delta.abs() <= hold_band {
            ChangeKind::Stabilize
        } else if delta > 0.0 {
            ChangeKind::Increase
        } else {
            ChangeKind::Decrease
        }
    }
}

/// One required operator move, derived and read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorChange {
    /// Operator key.
    pub operator: String,
    /// Current value.
    pub current: f32,
    /// Required value.
    pub required: f32,
    /// `required - current`.
    pub delta: f32,
    /// Change difficulty from the registry, `[0, 1]`.
    pub difficulty: f32,
    /// Direction classification.
    pub kind: ChangeKind,
}

impl OperatorChange {
    /// Magnitude of the move.
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.delta.abs()
    }

    /// Difficulty-weighted magnitude, the solver's unit of "work".
    #[inline]
    pub fn weighted_magnitude(&self) -> f32 {
        self.delta.abs() * (0.5 + self.difficulty)
    }

    /// Impact-per-effort ratio used by greedy selectors. Higher is better.
    #[inline]
    pub fn impact_ratio(&self) -> f32 {
        self.delta.abs() / (0.1 + self.difficulty)
    }
}

/// Default hold band below which a delta counts as "stabilize".
pub const DEFAULT_HOLD_BAND: f32 = 0.02;

/// Derive the change set between two vectors, sorted by impact
/// (|delta| descending, then key for determinism).
///
/// Only operators present in `required` produce changes; an operator
/// required but absent from `current` makes the whole derivation fail
/// with the missing names, per the missing-input contract.
///
/// # Example
///
/// ```
/// use metanoia_core::operators::OperatorRegistry;
/// use metanoia_core::types::{derive_changes, ChangeKind, StateVector};
///
/// let registry = OperatorRegistry::builtin();
/// let current = StateVector::new()
///     .with("W_witness", 0.3)
///     .with("At_attachment", 0.7);
/// let required = StateVector::new()
///     .with("W_witness", 0.7)
///     .with("At_attachment", 0.69);
///
/// let changes = derive_changes(&registry, &current, &required, 0.02).unwrap();
/// assert_eq!(changes[0].operator, "W_witness");
/// assert_eq!(changes[0].kind, ChangeKind::Increase);
/// assert_eq!(changes[1].kind, ChangeKind::Stabilize);
/// ```
pub fn derive_changes(
    registry: &OperatorRegistry,
    current: &StateVector,
    required: &StateVector,
    hold_band: f32,
) -> CoreResult<Vec<OperatorChange>> {
    let names: Vec<&str> = required.names().collect();
    let current_values = current.require(&names)?;

    let mut changes: Vec<OperatorChange> = names
        .iter()
        .zip(current_values)
        .map(|(name, cur)| {
            let req = required.get(name).unwrap_or(cur);
            let delta = req - cur;
            OperatorChange {
                operator: (*name).to_string(),
                current: cur,
                required: req,
                delta,
                difficulty: registry.difficulty(name).unwrap_or(0.5),
                kind: ChangeKind::from_delta(delta, hold_band),
            }
        })
        .collect();

    changes.sort_by(|a, b| {
        b.magnitude()
            .partial_cmp(&a.magnitude())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.operator.cmp(&b.operator))
    });
    Ok(changes)
}

/// Changes whose magnitude exceeds the hold band (the "active" set).
pub fn active_changes(changes: &[OperatorChange]) -> Vec<&OperatorChange> {
    changes
        .iter()
        .filter(|c| c.kind != ChangeKind::Stabilize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (OperatorRegistry, StateVector, StateVector) {
        let registry = OperatorRegistry::builtin();
        let current = StateVector::new()
            .with("W_witness", 0.30)
            .with("S_surrender", 0.25)
            .with("At_attachment", 0.70);
        let required = StateVector::new()
            .with("W_witness", 0.70)
            .with("S_surrender", 0.80)
            .with("At_attachment", 0.40);
        (registry, current, required)
    }

    #[test]
    fn test_sorted_by_magnitude_descending() {
        let (registry, current, required) = fixture();
        let changes = derive_changes(&registry, &current, &required, DEFAULT_HOLD_BAND).unwrap();
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[0].operator, "S_surrender");
        assert!((changes[0].delta - 0.55).abs() < 1e-6);
        assert_eq!(changes[1].operator, "W_witness");
        assert_eq!(changes[2].operator, "At_attachment");
        assert_eq!(changes[2].kind, ChangeKind::Decrease);
    }

    #[test]
    fn test_missing_current_operator_fails_whole_derivation() {
        let (registry, current, required) = fixture();
        let current = current.without("S_surrender");
        let err =
            derive_changes(&registry, &current, &required, DEFAULT_HOLD_BAND).unwrap_err();
        assert!(err.is_missing_input());
        assert_eq!(
            err.missing_names().unwrap(),
            &["S_surrender".to_string()]
        );
    }

    #[test]
    fn test_stabilize_band() {
        assert_eq!(ChangeKind::from_delta(0.015, 0.02), ChangeKind::Stabilize);
        assert_eq!(ChangeKind::from_delta(-0.015, 0.02), ChangeKind::Stabilize);
        assert_eq!(ChangeKind::from_delta(0.05, 0.02), ChangeKind::Increase);
        assert_eq!(ChangeKind::from_delta(-0.05, 0.02), ChangeKind::Decrease);
    }

    #[test]
    fn test_active_changes_filters_stabilize() {
        let (registry, current, _) = fixture();
        let required = StateVector::new()
            .with("W_witness", 0.31)
            .with("S_surrender", 0.80)
            .with("At_attachment", 0.70);
        let changes = derive_changes(&registry, &current, &required, DEFAULT_HOLD_BAND).unwrap();
        let active = active_changes(&changes);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].operator, "S_surrender");
    }

    #[test]
    fn test_difficulty_comes_from_registry() {
        let (registry, current, required) = fixture();
        let changes = derive_changes(&registry, &current, &required, DEFAULT_HOLD_BAND).unwrap();
        let att = changes
            .iter()
            .find(|c| c.operator == "At_attachment")
            .unwrap();
        assert_eq!(att.difficulty, 0.85);
    }

    #[test]
    fn test_weighted_magnitude_and_impact_ratio() {
        let change = OperatorChange {
            operator: "X".into(),
            current: 0.2,
            required: 0.6,
            delta: 0.4,
            difficulty: 0.5,
            kind: ChangeKind::Increase,
        };
        assert!((change.weighted_magnitude() - 0.4).abs() < 1e-6);
        assert!((change.impact_ratio() - 0.4 / 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_serde_round_trip() {
        let (registry, current, required) = fixture();
        let changes = derive_changes(&registry, &current, &required, DEFAULT_HOLD_BAND).unwrap();
        let json = serde_json::to_string(&changes).unwrap();
        let back: Vec<OperatorChange> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), changes.len());
        assert_eq!(back[0].operator, changes[0].operator);
    }
}
