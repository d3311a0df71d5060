//! The canonical 25-operator alphabet.
//!
//! # Model Reference
//!
//! Every state vector is keyed by this fixed alphabet. Scores, constraint
//! tables and cascade maps all refer to these keys; nothing else is a
//! valid operator name.

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};
use crate::types::StateVector;

use super::meta::{OperatorCategory, OperatorMeta};

/// The full operator table, in canonical order.
const OPERATORS: [OperatorMeta; 25] = [
    OperatorMeta {
        key: "W_witness",
        category: OperatorCategory::Awareness,
        difficulty: 0.50,
        default_value: 0.30,
        inverted: false,
    },
    OperatorMeta {
        key: "P_presence",
        category: OperatorCategory::Awareness,
        difficulty: 0.40,
        default_value: 0.35,
        inverted: false,
    },
    OperatorMeta {
        key: "Cl_clarity",
        category: OperatorCategory::Awareness,
        difficulty: 0.45,
        default_value: 0.40,
        inverted: false,
    },
    OperatorMeta {
        key: "Ins_insight",
        category: OperatorCategory::Awareness,
        difficulty: 0.65,
        default_value: 0.30,
        inverted: false,
    },
    OperatorMeta {
        key: "Eq_equanimity",
        category: OperatorCategory::Regulation,
        difficulty: 0.60,
        default_value: 0.35,
        inverted: false,
    },
    OperatorMeta {
        key: "S_surrender",
        category: OperatorCategory::Release,
        difficulty: 0.75,
        default_value: 0.25,
        inverted: false,
    },
    OperatorMeta {
        key: "At_attachment",
        category: OperatorCategory::Release,
        difficulty: 0.85,
        default_value: 0.65,
        inverted: true,
    },
    OperatorMeta {
        key: "Av_aversion",
        category: OperatorCategory::Release,
        difficulty: 0.80,
        default_value: 0.60,
        inverted: true,
    },
    OperatorMeta {
        key: "Eg_ego",
        category: OperatorCategory::Release,
        difficulty: 0.90,
        default_value: 0.70,
        inverted: true,
    },
    OperatorMeta {
        key: "G_grace",
        category: OperatorCategory::Receptivity,
        difficulty: 0.70,
        default_value: 0.25,
        inverted: false,
    },
    OperatorMeta {
        key: "Tr_trust",
        category: OperatorCategory::Receptivity,
        difficulty: 0.55,
        default_value: 0.40,
        inverted: false,
    },
    OperatorMeta {
        key: "Gr_gratitude",
        category: OperatorCategory::Heart,
        difficulty: 0.30,
        default_value: 0.45,
        inverted: false,
    },
    OperatorMeta {
        key: "Co_compassion",
        category: OperatorCategory::Heart,
        difficulty: 0.45,
        default_value: 0.45,
        inverted: false,
    },
    OperatorMeta {
        key: "Fo_forgiveness",
        category: OperatorCategory::Heart,
        difficulty: 0.60,
        default_value: 0.35,
        inverted: false,
    },
    OperatorMeta {
        key: "Hu_humility",
        category: OperatorCategory::Heart,
        difficulty: 0.65,
        default_value: 0.40,
        inverted: false,
    },
    OperatorMeta {
        key: "In_intention",
        category: OperatorCategory::Will,
        difficulty: 0.35,
        default_value: 0.50,
        inverted: false,
    },
    OperatorMeta {
        key: "Di_discipline",
        category: OperatorCategory::Will,
        difficulty: 0.45,
        default_value: 0.40,
        inverted: false,
    },
    OperatorMeta {
        key: "Se_service",
        category: OperatorCategory::Will,
        difficulty: 0.40,
        default_value: 0.40,
        inverted: false,
    },
    OperatorMeta {
        key: "En_energy",
        category: OperatorCategory::Vitality,
        difficulty: 0.50,
        default_value: 0.45,
        inverted: false,
    },
    OperatorMeta {
        key: "Gd_grounding",
        category: OperatorCategory::Vitality,
        difficulty: 0.40,
        default_value: 0.45,
        inverted: false,
    },
    OperatorMeta {
        key: "Em_embodiment",
        category: OperatorCategory::Vitality,
        difficulty: 0.50,
        default_value: 0.40,
        inverted: false,
    },
    OperatorMeta {
        key: "Re_resilience",
        category: OperatorCategory::Vitality,
        difficulty: 0.55,
        default_value: 0.45,
        inverted: false,
    },
    OperatorMeta {
        key: "St_stress",
        category: OperatorCategory::Vitality,
        difficulty: 0.50,
        default_value: 0.55,
        inverted: true,
    },
    OperatorMeta {
        key: "Un_unity",
        category: OperatorCategory::Transpersonal,
        difficulty: 0.90,
        default_value: 0.15,
        inverted: false,
    },
    OperatorMeta {
        key: "Sh_shadow",
        category: OperatorCategory::Transpersonal,
        difficulty: 0.80,
        default_value: 0.25,
        inverted: false,
    },
];

/// Lookup table over the canonical operator alphabet.
///
/// The registry is cheap to construct and carries no mutable state; build
/// one per engine and share it by reference.
///
/// # Example
///
/// ```
/// use metanoia_core::operators::OperatorRegistry;
///
/// let registry = OperatorRegistry::builtin();
/// assert_eq!(registry.len(), 25);
/// assert!(registry.contains("S_surrender"));
/// assert!(registry.get("At_attachment").unwrap().inverted);
/// ```
#[derive(Debug, Clone)]
pub struct OperatorRegistry {
    by_key: BTreeMap<&'static str, OperatorMeta>,
}

impl OperatorRegistry {
    /// Build the registry over the canonical alphabet.
    pub fn builtin() -> Self {
        let by_key = OPERATORS.iter().map(|m| (m.key, m.clone())).collect();
        Self { by_key }
    }

    /// Number of operators.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    /// Whether the registry is empty. Never true for [`builtin`](Self::builtin).
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Whether `key` names a canonical operator.
    pub fn contains(&self, key: &str) -> bool {
        self.by_key.contains_key(key)
    }

    /// Metadata for one operator.
    pub fn get(&self, key: &str) -> Option<&OperatorMeta> {
        self.by_key.get(key)
    }

    /// Metadata for one operator, or an [`CoreError::UnknownOperator`].
    pub fn require(&self, key: &str) -> CoreResult<&OperatorMeta> {
        self.by_key
            .get(key)
            .ok_or_else(|| CoreError::UnknownOperator(key.to_string()))
    }

    /// All operator keys, in canonical (sorted) order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.by_key.keys().copied()
    }

    /// All operator metadata.
    pub fn iter(&self) -> impl Iterator<Item = &OperatorMeta> {
        self.by_key.values()
    }

    /// Keys belonging to one category.
    pub fn keys_in_category(&self, category: OperatorCategory) -> Vec<&'static str> {
        self.by_key
            .values()
            .filter(|m| m.category == category)
            .map(|m| m.key)
            .collect()
    }

    /// Change difficulty for an operator; `None` for unknown keys.
    pub fn difficulty(&self, key: &str) -> Option<f32> {
        self.by_key.get(key).map(|m| m.difficulty)
    }

    /// Whether an operator is inverted (lower raw value = freer).
    pub fn is_inverted(&self, key: &str) -> bool {
        self.by_key.get(key).map(|m| m.inverted).unwrap_or(false)
    }

    /// Fold a raw value into its freer-direction reading for `key`.
    pub fn fold(&self, key: &str, value: f32) -> f32 {
        if self.is_inverted(key) {
            1.0 - value
        } else {
            value
        }
    }

    /// A fully-populated vector of population defaults.
    ///
    /// Useful for tests and demos; production callers receive observed
    /// vectors from the extraction layer.
    pub fn default_vector(&self) -> StateVector {
        let mut v = StateVector::new();
        for meta in self.by_key.values() {
            v = v.with(meta.key, meta.default_value);
        }
        v
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
