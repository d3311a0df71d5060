//! Static coherence rule tables.
//!
//! # Model Reference
//!
//! Four families of declarative rules over the required vector:
//!
//! - **Inverse pairs** should sum to roughly 1 (attachment vs surrender:
//!   holding on and letting go cannot both be high).
//! - **Complementary pairs** should sit close together (witness without
//!   presence is dissociation, not awareness).
//! - **Tier rules** demand a foundation: a high transpersonal or
//!   receptive capacity needs its supporting operators established.
//! - **Implications** are hard boolean consequences one value forces on
//!   another.
//!
//! The tables live here, apart from the scoring code, so they can be
//! audited and tested on their own.

/// Pairs whose values should sum to approximately 1.
pub const INVERSE_PAIRS: &[(&str, &str)] = &[
    ("At_attachment", "S_surrender"),
    ("Av_aversion", "Eq_equanimity"),
    ("Eg_ego", "Hu_humility"),
    ("St_stress", "Re_resilience"),
];

/// Pairs whose values should stay close together.
pub const COMPLEMENTARY_PAIRS: &[(&str, &str)] = &[
    ("W_witness", "P_presence"),
    ("Co_compassion", "Fo_forgiveness"),
    ("Cl_clarity", "Ins_insight"),
    ("Gd_grounding", "Em_embodiment"),
    ("G_grace", "Tr_trust"),
];

/// A high capacity that requires an established foundation.
#[derive(Debug, Clone, Copy)]
pub struct TierRule {
    /// The capacity under scrutiny.
    pub high: &'static str,
    /// Value above which the rule applies.
    pub high_threshold: f32,
    /// Supporting operators, averaged with inversion folding.
    pub foundation: &'static [&'static str],
    /// Minimum folded foundation average.
    pub min_foundation: f32,
}

/// Foundation requirements for the capacities that most often get
/// requested without support.
pub const TIER_RULES: &[TierRule] = &[
    TierRule {
        high: "Un_unity",
        high_threshold: 0.6,
        foundation: &["W_witness", "P_presence", "Gd_grounding"],
        min_foundation: 0.50,
    },
    TierRule {
        high: "G_grace",
        high_threshold: 0.6,
        foundation: &["S_surrender", "Tr_trust", "Hu_humility"],
        min_foundation: 0.45,
    },
    TierRule {
        high: "Ins_insight",
        high_threshold: 0.6,
        foundation: &["Cl_clarity", "W_witness", "Di_discipline"],
        min_foundation: 0.40,
    },
    TierRule {
        high: "Sh_shadow",
        high_threshold: 0.6,
        foundation: &["Co_compassion", "Re_resilience", "W_witness"],
        min_foundation: 0.45,
    },
    TierRule {
        high: "S_surrender",
        high_threshold: 0.6,
        foundation: &["At_attachment", "Tr_trust", "Gd_grounding"],
        min_foundation: 0.40,
    },
];

/// Level-indexed expected band for one operator.
#[derive(Debug, Clone, Copy)]
pub struct LevelBand {
    /// Operator key.
    pub operator: &'static str,
    /// Expected `[min, max]` per level 1-8.
    pub bands: [(f32, f32); 8],
}

/// Expected bands for the five operators whose values track level most
/// directly. Attachment falls with level; the rest rise.
pub const LEVEL_BANDS: &[LevelBand] = &[
    LevelBand {
        operator: "W_witness",
        bands: [
            (0.00, 0.45),
            (0.05, 0.55),
            (0.15, 0.65),
            (0.25, 0.75),
            (0.35, 0.85),
            (0.45, 0.95),
            (0.55, 1.00),
            (0.65, 1.00),
        ],
    },
    LevelBand {
        operator: "P_presence",
        bands: [
            (0.00, 0.50),
            (0.05, 0.60),
            (0.15, 0.70),
            (0.25, 0.80),
            (0.35, 0.85),
            (0.40, 0.90),
            (0.50, 1.00),
            (0.60, 1.00),
        ],
    },
    LevelBand {
        operator: "Eq_equanimity",
        bands: [
            (0.00, 0.50),
            (0.05, 0.55),
            (0.10, 0.65),
            (0.20, 0.75),
            (0.30, 0.85),
            (0.40, 0.90),
            (0.50, 0.95),
            (0.55, 1.00),
        ],
    },
    LevelBand {
        operator: "At_attachment",
        bands: [
            (0.40, 1.00),
            (0.35, 0.95),
            (0.30, 0.85),
            (0.20, 0.75),
            (0.15, 0.65),
            (0.10, 0.55),
            (0.05, 0.45),
            (0.00, 0.35),
        ],
    },
    LevelBand {
        operator: "En_energy",
        bands: [
            (0.10, 0.70),
            (0.15, 0.75),
            (0.20, 0.80),
            (0.25, 0.85),
            (0.30, 0.90),
            (0.30, 0.95),
            (0.35, 1.00),
            (0.40, 1.00),
        ],
    },
];

impl LevelBand {
    /// Band for a level, clamping outside `1..=8`.
    pub fn band_for_level(&self, level: f32) -> (f32, f32) {
        let idx = (level.clamp(1.0, 8.0) as usize).saturating_sub(1);
        self.bands[idx.min(7)]
    }
}

/// A boolean implication: if the antecedent holds, the consequent must.
#[derive(Debug, Clone, Copy)]
pub struct Implication {
    /// Operator tested by the antecedent.
    pub if_operator: &'static str,
    /// Antecedent: value strictly above this threshold.
    pub if_above: f32,
    /// Operator bound by the consequent.
    pub then_operator: &'static str,
    /// Required minimum for the consequent operator, if any.
    pub then_min: Option<f32>,
    /// Required maximum for the consequent operator, if any.
    pub then_max: Option<f32>,
}

/// Hard consequence rules.
pub const IMPLICATIONS: &[Implication] = &[
    Implication {
        if_operator: "Un_unity",
        if_above: 0.7,
        then_operator: "W_witness",
        then_min: Some(0.5),
        then_max: None,
    },
    Implication {
        if_operator: "G_grace",
        if_above: 0.8,
        then_operator: "S_surrender",
        then_min: Some(0.4),
        then_max: None,
    },
    Implication {
        if_operator: "Eq_equanimity",
        if_above: 0.7,
        then_operator: "Av_aversion",
        then_min: None,
        then_max: Some(0.5),
    },
    Implication {
        if_operator: "S_surrender",
        if_above: 0.8,
        then_operator: "At_attachment",
        then_min: None,
        then_max: Some(0.5),
    },
    Implication {
        if_operator: "Ins_insight",
        if_above: 0.7,
        then_operator: "Cl_clarity",
        then_min: Some(0.4),
        then_max: None,
    },
    Implication {
        if_operator: "Em_embodiment",
        if_above: 0.7,
        then_operator: "Gd_grounding",
        then_min: Some(0.4),
        then_max: None,
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use metanoia_core::OperatorRegistry;

    #[test]
    fn test_all_rule_operators_are_canonical() {
        let registry = OperatorRegistry::builtin();
        for (a, b) in INVERSE_PAIRS.iter().chain(COMPLEMENTARY_PAIRS) {
            assert!(registry.contains(a), "unknown operator {a}");
            assert!(registry.contains(b), "unknown operator {b}");
        }
        for rule in TIER_RULES {
            assert!(registry.contains(rule.high));
            for op in rule.foundation {
                assert!(registry.contains(op), "unknown foundation {op}");
            }
        }
        for band in LEVEL_BANDS {
            assert!(registry.contains(band.operator));
        }
        for imp in IMPLICATIONS {
            assert!(registry.contains(imp.if_operator));
            assert!(registry.contains(imp.then_operator));
        }
    }

    #[test]
    fn test_inverse_pairs_pair_inverted_with_plain() {
        let registry = OperatorRegistry::builtin();
        for (a, b) in INVERSE_PAIRS {
            assert!(
                registry.is_inverted(a) != registry.is_inverted(b),
                "({a}, {b}) should pair an inverted with a plain operator"
            );
        }
    }

    #[test]
    fn test_level_bands_ordered() {
        for band in LEVEL_BANDS {
            for level in 1..=8 {
                let (lo, hi) = band.band_for_level(level as f32);
                assert!(lo <= hi, "{} level {level}", band.operator);
                assert!((0.0..=1.0).contains(&lo) && (0.0..=1.0).contains(&hi));
            }
        }
    }

    #[test]
    fn test_level_band_clamping() {
        let band = &LEVEL_BANDS[0];
        assert_eq!(band.band_for_level(0.0), band.band_for_level(1.0));
        assert_eq!(band.band_for_level(9.5), band.band_for_level(8.0));
    }

    #[test]
    fn test_implications_consistent() {
        for imp in IMPLICATIONS {
            assert!(
                imp.then_min.is_some() || imp.then_max.is_some(),
                "implication on {} has no consequent bound",
                imp.if_operator
            );
            assert!((0.0..=1.0).contains(&imp.if_above));
        }
    }

    #[test]
    fn test_tier_rules_have_nonempty_foundations() {
        for rule in TIER_RULES {
            assert!(!rule.foundation.is_empty());
            assert!((0.0..=1.0).contains(&rule.min_foundation));
        }
    }
}
