//! Outcome targets and solver-produced required states.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::state::clamp01;
use crate::types::StateVector;

/// A desired outcome score, with a weight for multi-objective solving.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeTarget {
    /// Outcome name, resolved against the catalog.
    pub outcome: String,
    /// Desired score in `[0, 1]`.
    pub target_value: f32,
    /// Relative weight when several targets are solved jointly.
    pub weight: f32,
}

impl OutcomeTarget {
    /// A unit-weight target.
    pub fn new(outcome: impl Into<String>, target_value: f32) -> Self {
        Self {
            outcome: outcome.into(),
            target_value: clamp01(target_value),
            weight: 1.0,
        }
    }

    /// Set the multi-objective weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight.max(0.0);
        self
    }

    /// Validate target and weight ranges.
    pub fn validate(&self) -> CoreResult<()> {
        if !(0.0..=1.0).contains(&self.target_value) {
            return Err(CoreError::invalid_value(
                "target_value",
                self.target_value,
                "must be in [0, 1]",
            ));
        }
        if self.weight <= 0.0 {
            return Err(CoreError::invalid_value(
                "weight",
                self.weight,
                "must be > 0",
            ));
        }
        Ok(())
    }
}

/// Solver annotations attached to one required operator value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequirementDetail {
    /// Confidence that this value is actually necessary, `[0, 1]`.
    ///
    /// Derived from the gradient strength at convergence; operators the
    /// outcome barely responds to get low confidence.
    pub confidence: f32,
    /// Allowed slack around the required value, `[0, 1]`.
    pub flexibility: f32,
    /// 1-based priority rank (1 = largest required move).
    pub priority: usize,
}

/// The state the solver computed as necessary to hit a target.
///
/// Wraps the required [`StateVector`] with per-operator confidence,
/// flexibility and priority. Immutable once produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequiredState {
    values: StateVector,
    details: BTreeMap<String, RequirementDetail>,
}

impl RequiredState {
    /// Assemble from parallel maps. Detail keys not present in `values`
    /// are dropped.
    pub fn new(values: StateVector, details: BTreeMap<String, RequirementDetail>) -> Self {
        let details = details
            .into_iter()
            .filter(|(k, _)| values.contains(k))
            .collect();
        Self { values, details }
    }

    /// The bare required vector.
    pub fn vector(&self) -> &StateVector {
        &self.values
    }

    /// Required value for one operator.
    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.get(name)
    }

    /// Annotations for one operator.
    pub fn detail(&self, name: &str) -> Option<&RequirementDetail> {
        self.details.get(name)
    }

    /// Number of required operators.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no operators are required.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value, detail)` in priority order (rank ascending),
    /// falling back to name order for operators without details.
    pub fn by_priority(&self) -> Vec<(&str, f32, Option<&RequirementDetail>)> {
        let mut rows: Vec<(&str, f32, Option<&RequirementDetail>)> = self
            .values
            .iter()
            .map(|(name, value)| (name, value, self.details.get(name)))
            .collect();
        rows.sort_by_key(|(name, _, detail)| {
            (detail.map(|d| d.priority).unwrap_or(usize::MAX), *name)
        });
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_clamps_and_validates() {
        let t = OutcomeTarget::new("inner_peace", 1.4);
        assert_eq!(t.target_value, 1.0);
        assert!(t.validate().is_ok());

        let bad = OutcomeTarget::new("inner_peace", 0.8).with_weight(0.0);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_required_state_drops_orphan_details() {
        let values = StateVector::new().with("W_witness", 0.7);
        let mut details = BTreeMap::new();
        details.insert(
            "W_witness".to_string(),
            RequirementDetail {
                confidence: 0.8,
                flexibility: 0.1,
                priority: 1,
            },
        );
        details.insert(
            "G_grace".to_string(),
            RequirementDetail {
                confidence: 0.5,
                flexibility: 0.1,
                priority: 2,
            },
        );
        let required = RequiredState::new(values, details);
        assert_eq!(required.len(), 1);
        assert!(required.detail("W_witness").is_some());
        assert!(required.detail("G_grace").is_none());
    }

    #[test]
    fn test_by_priority_orders_by_rank() {
        let values = StateVector::new()
            .with("A_first", 0.5)
            .with("B_second", 0.6)
            .with("C_third", 0.7);
        let mut details = BTreeMap::new();
        details.insert(
            "C_third".to_string(),
            RequirementDetail {
                confidence: 0.9,
                flexibility: 0.1,
                priority: 1,
            },
        );
        details.insert(
            "A_first".to_string(),
            RequirementDetail {
                confidence: 0.9,
                flexibility: 0.1,
                priority: 2,
            },
        );
        let required = RequiredState::new(values, details);
        let rows = required.by_priority();
        assert_eq!(rows[0].0, "C_third");
        assert_eq!(rows[1].0, "A_first");
        // No detail sorts last.
        assert_eq!(rows[2].0, "B_second");
    }

    #[test]
    fn test_serde_round_trip() {
        let values = StateVector::new().with("W_witness", 0.7);
        let mut details = BTreeMap::new();
        details.insert(
            "W_witness".to_string(),
            RequirementDetail {
                confidence: 0.8,
                flexibility: 0.15,
                priority: 1,
            },
        );
        let required = RequiredState::new(values, details);
        let json = serde_json::to_string(&required).unwrap();
        let back: RequiredState = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get("W_witness"), Some(0.7));
        assert_eq!(back.detail("W_witness").unwrap().priority, 1);
    }
}
