//! Per-operator static metadata.
//!
//! Each of the 25 canonical operators carries a category, a change
//! difficulty, a population default, an inversion flag, and a
//! level-indexed expected-range table derived from per-category
//! progression bands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of discretized development levels.
pub const LEVEL_COUNT: usize = 8;

/// Lowest valid level.
pub const MIN_LEVEL: f32 = 1.0;

/// Highest valid level.
pub const MAX_LEVEL: f32 = 8.0;

/// Functional grouping of the operator alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorCategory {
    /// Attention and perception: witness, presence, clarity, insight.
    Awareness,
    /// Affect regulation: equanimity.
    Regulation,
    /// Letting go: surrender, attachment, aversion, ego.
    Release,
    /// Openness to what is given: grace, trust.
    Receptivity,
    /// Relational warmth: gratitude, compassion, forgiveness, humility.
    Heart,
    /// Directed action: intention, discipline, service.
    Will,
    /// Somatic base: energy, grounding, embodiment, resilience, stress.
    Vitality,
    /// Beyond-self perception: unity, shadow integration.
    Transpersonal,
}

impl OperatorCategory {
    /// All categories in declaration order.
    pub fn all() -> [OperatorCategory; 8] {
        [
            OperatorCategory::Awareness,
            OperatorCategory::Regulation,
            OperatorCategory::Release,
            OperatorCategory::Receptivity,
            OperatorCategory::Heart,
            OperatorCategory::Will,
            OperatorCategory::Vitality,
            OperatorCategory::Transpersonal,
        ]
    }

    /// Expected-range progression band for this category at a given level.
    ///
    /// Bands widen upward as level rises; Transpersonal capacities open
    /// later than Vitality or Heart ones. Levels outside `1..=8` are
    /// clamped. Inverted operators mirror the band (see
    /// [`OperatorMeta::expected_range`]).
    pub fn progression_band(&self, level: u8) -> (f32, f32) {
        let idx = (level.clamp(1, LEVEL_COUNT as u8) - 1) as usize;
        match self {
            OperatorCategory::Awareness => AWARENESS_BANDS[idx],
            OperatorCategory::Regulation => REGULATION_BANDS[idx],
            OperatorCategory::Release => RELEASE_BANDS[idx],
            OperatorCategory::Receptivity => RECEPTIVITY_BANDS[idx],
            OperatorCategory::Heart => HEART_BANDS[idx],
            OperatorCategory::Will => WILL_BANDS[idx],
            OperatorCategory::Vitality => VITALITY_BANDS[idx],
            OperatorCategory::Transpersonal => TRANSPERSONAL_BANDS[idx],
        }
    }
}

impl fmt::Display for OperatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperatorCategory::Awareness => "Awareness",
            OperatorCategory::Regulation => "Regulation",
            OperatorCategory::Release => "Release",
            OperatorCategory::Receptivity => "Receptivity",
            OperatorCategory::Heart => "Heart",
            OperatorCategory::Will => "Will",
            OperatorCategory::Vitality => "Vitality",
            OperatorCategory::Transpersonal => "Transpersonal",
        };
        write!(f, "{}", name)
    }
}

const AWARENESS_BANDS: [(f32, f32); LEVEL_COUNT] = [
    (0.00, 0.40),
    (0.10, 0.50),
    (0.20, 0.60),
    (0.30, 0.70),
    (0.40, 0.80),
    (0.50, 0.90),
    (0.60, 1.00),
    (0.70, 1.00),
];

const REGULATION_BANDS: [(f32, f32); LEVEL_COUNT] = [
    (0.05, 0.45),
    (0.10, 0.50),
    (0.20, 0.60),
    (0.30, 0.70),
    (0.40, 0.80),
    (0.45, 0.85),
    (0.55, 0.95),
    (0.60, 1.00),
];

const RELEASE_BANDS: [(f32, f32); LEVEL_COUNT] = [
    (0.00, 0.35),
    (0.05, 0.45),
    (0.15, 0.55),
    (0.25, 0.65),
    (0.35, 0.75),
    (0.45, 0.85),
    (0.55, 0.95),
    (0.65, 1.00),
];

const RECEPTIVITY_BANDS: [(f32, f32); LEVEL_COUNT] = [
    (0.00, 0.40),
    (0.05, 0.45),
    (0.15, 0.55),
    (0.25, 0.65),
    (0.35, 0.75),
    (0.45, 0.85),
    (0.55, 0.95),
    (0.60, 1.00),
];

const HEART_BANDS: [(f32, f32); LEVEL_COUNT] = [
    (0.10, 0.50),
    (0.15, 0.55),
    (0.25, 0.65),
    (0.30, 0.70),
    (0.40, 0.80),
    (0.45, 0.85),
    (0.55, 0.95),
    (0.60, 1.00),
];

const WILL_BANDS: [(f32, f32); LEVEL_COUNT] = [
    (0.10, 0.55),
    (0.15, 0.60),
    (0.25, 0.65),
    (0.30, 0.70),
    (0.35, 0.75),
    (0.40, 0.80),
    (0.45, 0.85),
    (0.50, 0.90),
];

const VITALITY_BANDS: [(f32, f32); LEVEL_COUNT] = [
    (0.15, 0.60),
    (0.20, 0.65),
    (0.25, 0.70),
    (0.30, 0.75),
    (0.35, 0.80),
    (0.40, 0.85),
    (0.45, 0.90),
    (0.50, 0.95),
];

const TRANSPERSONAL_BANDS: [(f32, f32); LEVEL_COUNT] = [
    (0.00, 0.25),
    (0.00, 0.30),
    (0.05, 0.40),
    (0.10, 0.50),
    (0.20, 0.60),
    (0.30, 0.70),
    (0.45, 0.85),
    (0.55, 1.00),
];

/// Static metadata for one operator.
#[derive(Debug, Clone, Serialize)]
pub struct OperatorMeta {
    /// Canonical key, e.g. `"W_witness"`.
    pub key: &'static str,
    /// Functional category.
    pub category: OperatorCategory,
    /// How hard this operator is to change deliberately, in `[0, 1]`.
    pub difficulty: f32,
    /// Population default value, in `[0, 1]`.
    pub default_value: f32,
    /// Whether lower raw values correspond to the freer direction.
    ///
    /// Inverted operators (attachment, aversion, ego, stress) contribute
    /// `1 - v` wherever a formula wants the "liberation" reading.
    pub inverted: bool,
}

impl OperatorMeta {
    /// Expected `[min, max]` range for this operator at a level.
    ///
    /// Inverted operators mirror the category band: an attachment of 0.2
    /// at level 7 is as expected as a witness of 0.8.
    ///
    /// # Example
    ///
    /// ```
    /// use metanoia_core::operators::OperatorRegistry;
    ///
    /// let registry = OperatorRegistry::builtin();
    /// let witness = registry.get("W_witness").unwrap();
    /// let (lo, hi) = witness.expected_range(7);
    /// assert!(lo >= 0.5 && hi >= 0.9);
    ///
    /// let attachment = registry.get("At_attachment").unwrap();
    /// let (lo, hi) = attachment.expected_range(7);
    /// assert!(hi <= 0.5);
    /// ```
    pub fn expected_range(&self, level: u8) -> (f32, f32) {
        let (lo, hi) = self.category.progression_band(level);
        if self.inverted {
            (1.0 - hi, 1.0 - lo)
        } else {
            (lo, hi)
        }
    }

    /// Fold a raw value into the "freer direction" reading.
    #[inline]
    pub fn fold(&self, value: f32) -> f32 {
        if self.inverted {
            1.0 - value
        } else {
            value
        }
    }
}
