//! Internal-consistency validation of a required vector.
//!
//! Scores five dimensions (inverse pairs, complementary pairs, tier
//! foundations, level bands, implications) and aggregates them into one
//! coherence score. A dimension none of whose rules can be evaluated
//! against the vector reports `None` and is excluded from the weighted
//! aggregate; it is never coerced to a midpoint.

use serde::{Deserialize, Serialize};
use tracing::debug;

use metanoia_core::{clamp01, OperatorRegistry, StateVector};

use crate::config::CoherenceConfig;

use super::rules::{
    COMPLEMENTARY_PAIRS, IMPLICATIONS, INVERSE_PAIRS, LEVEL_BANDS, TIER_RULES,
};

/// Which rule family a violation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoherenceViolationKind {
    /// An inverse pair does not sum to roughly 1.
    Inverse,
    /// A complementary pair is too far apart.
    Complementary,
    /// A high capacity lacks its foundation.
    Tier,
    /// A value sits outside its level band.
    Level,
    /// A hard implication is broken.
    Internal,
}

/// One broken coherence rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceViolation {
    /// Rule family.
    pub kind: CoherenceViolationKind,
    /// Operators involved.
    pub operators: Vec<String>,
    /// What the rule expected.
    pub expected: String,
    /// What the vector actually holds.
    pub actual: String,
    /// How badly the rule is broken, `[0, 1]`.
    pub severity: f32,
    /// How to repair it.
    pub suggestion: String,
}

/// A proposed repair for one operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectiveDelta {
    /// Operator key.
    pub operator: String,
    /// Current required value.
    pub from: f32,
    /// Proposed value.
    pub to: f32,
}

/// Per-dimension scores; `None` means the dimension had no evaluable
/// rule against this vector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DimensionScores {
    /// Inverse-pair dimension.
    pub inverse: Option<f32>,
    /// Complementary-pair dimension.
    pub complementary: Option<f32>,
    /// Tier-foundation dimension.
    pub tier: Option<f32>,
    /// Level-band dimension.
    pub level: Option<f32>,
    /// Implication dimension.
    pub internal: Option<f32>,
}

impl DimensionScores {
    fn as_array(&self) -> [Option<f32>; 5] {
        [
            self.inverse,
            self.complementary,
            self.tier,
            self.level,
            self.internal,
        ]
    }
}

/// Result of validating one vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceReport {
    /// Whether the aggregate reached the coherence threshold. `false`
    /// when no dimension could be evaluated.
    pub coherent: bool,
    /// Weighted aggregate over evaluable dimensions; `None` when no
    /// dimension had an evaluable rule.
    pub score: Option<f32>,
    /// Per-dimension scores.
    pub dimensions: DimensionScores,
    /// Broken rules, most severe first.
    pub violations: Vec<CoherenceViolation>,
    /// Pairwise repairs that would restore the broken relations.
    pub corrections: Vec<CorrectiveDelta>,
}

/// Validates required vectors against the static rule tables.
#[derive(Debug, Clone)]
pub struct CoherenceValidator {
    config: CoherenceConfig,
    registry: OperatorRegistry,
}

impl CoherenceValidator {
    /// Create a validator.
    pub fn new(config: CoherenceConfig, registry: OperatorRegistry) -> Self {
        Self { config, registry }
    }

    /// Score only the pairwise dimensions (inverse + complementary),
    /// renormalized over their two weights. Used by the feasibility
    /// checker. `None` when neither dimension is evaluable.
    pub fn pairwise_score(&self, vector: &StateVector) -> Option<f32> {
        let (inverse, _, _) = self.score_inverse(vector);
        let (complementary, _, _) = self.score_complementary(vector);
        let w = &self.config.dimension_weights;
        weighted_over_present(&[inverse, complementary], &[w[0], w[1]])
    }

    /// Validate a required vector at a development level.
    pub fn validate(&self, vector: &StateVector, level: f32) -> CoherenceReport {
        let mut violations = Vec::new();
        let mut corrections = Vec::new();

        let (inverse, mut v, mut c) = self.score_inverse(vector);
        violations.append(&mut v);
        corrections.append(&mut c);

        let (complementary, mut v, mut c) = self.score_complementary(vector);
        violations.append(&mut v);
        corrections.append(&mut c);

        let (tier, mut v) = self.score_tiers(vector);
        violations.append(&mut v);

        let (level_score, mut v) = self.score_levels(vector, level);
        violations.append(&mut v);

        let (internal, mut v) = self.score_implications(vector);
        violations.append(&mut v);

        violations.sort_by(|a, b| {
            b.severity
                .partial_cmp(&a.severity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let dimensions = DimensionScores {
            inverse,
            complementary,
            tier,
            level: level_score,
            internal,
        };
        let score = weighted_over_present(
            &dimensions.as_array(),
            &self.config.dimension_weights,
        );
        let coherent = score.map(|s| s >= self.config.coherence_threshold).unwrap_or(false);

        debug!(
            ?score,
            coherent,
            violations = violations.len(),
            "coherence validation finished"
        );

        CoherenceReport {
            coherent,
            score,
            dimensions,
            violations,
            corrections,
        }
    }

    fn score_inverse(
        &self,
        vector: &StateVector,
    ) -> (Option<f32>, Vec<CoherenceViolation>, Vec<CorrectiveDelta>) {
        let mut scores = Vec::new();
        let mut violations = Vec::new();
        let mut corrections = Vec::new();

        for (a, b) in INVERSE_PAIRS {
            let (va, vb) = match (vector.get(a), vector.get(b)) {
                (Some(va), Some(vb)) => (va, vb),
                _ => continue,
            };
            let deviation = (1.0 - (va + vb)).abs();
            let pair_score = 1.0 - clamp01(deviation / 0.5);
            scores.push(pair_score);

            if deviation > self.config.inverse_deviation_limit {
                let severity = clamp01(deviation / 0.5);
                violations.push(CoherenceViolation {
                    kind: CoherenceViolationKind::Inverse,
                    operators: vec![a.to_string(), b.to_string()],
                    expected: format!("{a} + {b} near 1.0"),
                    actual: format!("{:.2} + {:.2} = {:.2}", va, vb, va + vb),
                    severity,
                    suggestion: format!("lower one of {a}/{b} until the pair balances"),
                });
                // Split the imbalance evenly between the two.
                let adjust = (1.0 - (va + vb)) / 2.0;
                corrections.push(CorrectiveDelta {
                    operator: a.to_string(),
                    from: va,
                    to: clamp01(va + adjust),
                });
                corrections.push(CorrectiveDelta {
                    operator: b.to_string(),
                    from: vb,
                    to: clamp01(vb + adjust),
                });
            }
        }
        (mean_of(&scores), violations, corrections)
    }

    fn score_complementary(
        &self,
        vector: &StateVector,
    ) -> (Option<f32>, Vec<CoherenceViolation>, Vec<CorrectiveDelta>) {
        let mut scores = Vec::new();
        let mut violations = Vec::new();
        let mut corrections = Vec::new();

        for (a, b) in COMPLEMENTARY_PAIRS {
            let (va, vb) = match (vector.get(a), vector.get(b)) {
                (Some(va), Some(vb)) => (va, vb),
                _ => continue,
            };
            let gap = (va - vb).abs();
            let pair_score = 1.0 - clamp01((gap - 0.1) / 0.4);
            scores.push(pair_score);

            if gap > self.config.complementary_gap_limit {
                let severity = clamp01((gap - 0.1) / 0.4);
                let mean = (va + vb) / 2.0;
                violations.push(CoherenceViolation {
                    kind: CoherenceViolationKind::Complementary,
                    operators: vec![a.to_string(), b.to_string()],
                    expected: format!("|{a} - {b}| <= {}", self.config.complementary_gap_limit),
                    actual: format!("gap {:.2}", gap),
                    severity,
                    suggestion: format!("develop {a} and {b} together"),
                });
                corrections.push(CorrectiveDelta {
                    operator: a.to_string(),
                    from: va,
                    to: clamp01((va + mean) / 2.0),
                });
                corrections.push(CorrectiveDelta {
                    operator: b.to_string(),
                    from: vb,
                    to: clamp01((vb + mean) / 2.0),
                });
            }
        }
        (mean_of(&scores), violations, corrections)
    }

    fn score_tiers(&self, vector: &StateVector) -> (Option<f32>, Vec<CoherenceViolation>) {
        let mut scores = Vec::new();
        let mut violations = Vec::new();

        for rule in TIER_RULES {
            let high = match vector.get(rule.high) {
                Some(v) => v,
                None => continue,
            };
            if high <= rule.high_threshold {
                scores.push(1.0);
                continue;
            }
            // Foundation average with inversion folding; any missing
            // foundation operator makes the rule indeterminate.
            let mut folded = Vec::with_capacity(rule.foundation.len());
            for op in rule.foundation {
                match vector.get(op) {
                    Some(v) => folded.push(self.registry.fold(op, v)),
                    None => break,
                }
            }
            if folded.len() != rule.foundation.len() {
                continue;
            }
            let avg = folded.iter().sum::<f32>() / folded.len() as f32;
            if avg >= rule.min_foundation {
                scores.push(1.0);
            } else {
                let severity = clamp01((rule.min_foundation - avg) / rule.min_foundation);
                scores.push(clamp01(avg / rule.min_foundation));
                violations.push(CoherenceViolation {
                    kind: CoherenceViolationKind::Tier,
                    operators: std::iter::once(rule.high.to_string())
                        .chain(rule.foundation.iter().map(|s| s.to_string()))
                        .collect(),
                    expected: format!(
                        "foundation avg >= {:.2} before {} exceeds {:.2}",
                        rule.min_foundation, rule.high, rule.high_threshold
                    ),
                    actual: format!("{} = {:.2}, foundation avg {:.2}", rule.high, high, avg),
                    severity,
                    suggestion: format!(
                        "establish {} before pushing {}",
                        rule.foundation.join(", "),
                        rule.high
                    ),
                });
            }
        }
        (mean_of(&scores), violations)
    }

    fn score_levels(
        &self,
        vector: &StateVector,
        level: f32,
    ) -> (Option<f32>, Vec<CoherenceViolation>) {
        let mut checked = 0usize;
        let mut violated = 0usize;
        let mut violations = Vec::new();

        for band in LEVEL_BANDS {
            let value = match vector.get(band.operator) {
                Some(v) => v,
                None => continue,
            };
            let (lo, hi) = band.band_for_level(level);
            checked += 1;
            if value < lo || value > hi {
                violated += 1;
                let distance = if value < lo { lo - value } else { value - hi };
                violations.push(CoherenceViolation {
                    kind: CoherenceViolationKind::Level,
                    operators: vec![band.operator.to_string()],
                    expected: format!("[{:.2}, {:.2}] at level {:.0}", lo, hi, level),
                    actual: format!("{:.2}", value),
                    severity: clamp01(distance / 0.5),
                    suggestion: format!(
                        "target {} within its level band before moving on",
                        band.operator
                    ),
                });
            }
        }
        if checked == 0 {
            (None, violations)
        } else {
            (
                Some(1.0 - violated as f32 / checked as f32),
                violations,
            )
        }
    }

    fn score_implications(&self, vector: &StateVector) -> (Option<f32>, Vec<CoherenceViolation>) {
        let mut evaluable = 0usize;
        let mut triggered = 0usize;
        let mut passed = 0usize;
        let mut violations = Vec::new();

        for imp in IMPLICATIONS {
            let (antecedent, consequent) =
                match (vector.get(imp.if_operator), vector.get(imp.then_operator)) {
                    (Some(a), Some(c)) => (a, c),
                    _ => continue,
                };
            evaluable += 1;
            if antecedent <= imp.if_above {
                continue;
            }
            triggered += 1;
            let min_ok = imp.then_min.map(|m| consequent >= m).unwrap_or(true);
            let max_ok = imp.then_max.map(|m| consequent <= m).unwrap_or(true);
            if min_ok && max_ok {
                passed += 1;
            } else {
                let bound = imp
                    .then_min
                    .map(|m| format!(">= {m:.2}"))
                    .or_else(|| imp.then_max.map(|m| format!("<= {m:.2}")))
                    .unwrap_or_default();
                violations.push(CoherenceViolation {
                    kind: CoherenceViolationKind::Internal,
                    operators: vec![imp.if_operator.to_string(), imp.then_operator.to_string()],
                    expected: format!(
                        "{} > {:.2} implies {} {}",
                        imp.if_operator, imp.if_above, imp.then_operator, bound
                    ),
                    actual: format!(
                        "{} = {:.2}, {} = {:.2}",
                        imp.if_operator, antecedent, imp.then_operator, consequent
                    ),
                    severity: 0.7,
                    suggestion: format!(
                        "bring {} {} before raising {}",
                        imp.then_operator, bound, imp.if_operator
                    ),
                });
            }
        }
        if evaluable == 0 {
            (None, violations)
        } else if triggered == 0 {
            (Some(1.0), violations)
        } else {
            (Some(passed as f32 / triggered as f32), violations)
        }
    }
}

fn mean_of(scores: &[f32]) -> Option<f32> {
    if scores.is_empty() {
        None
    } else {
        Some(scores.iter().sum::<f32>() / scores.len() as f32)
    }
}

fn weighted_over_present(scores: &[Option<f32>], weights: &[f32]) -> Option<f32> {
    let mut total = 0.0f32;
    let mut weight_sum = 0.0f32;
    for (score, weight) in scores.iter().zip(weights) {
        if let Some(s) = score {
            total += s * weight;
            weight_sum += weight;
        }
    }
    if weight_sum <= 0.0 {
        None
    } else {
        Some(clamp01(total / weight_sum))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> CoherenceValidator {
        CoherenceValidator::new(CoherenceConfig::default(), OperatorRegistry::builtin())
    }

    /// A vector exactly satisfying every inverse (sum = 1) and
    /// complementary (gap = 0) rule.
    fn balanced_vector() -> StateVector {
        StateVector::new()
            .with("At_attachment", 0.35)
            .with("S_surrender", 0.65)
            .with("Av_aversion", 0.40)
            .with("Eq_equanimity", 0.60)
            .with("Eg_ego", 0.45)
            .with("Hu_humility", 0.55)
            .with("St_stress", 0.40)
            .with("Re_resilience", 0.60)
            .with("W_witness", 0.55)
            .with("P_presence", 0.55)
            .with("Co_compassion", 0.50)
            .with("Fo_forgiveness", 0.50)
            .with("Cl_clarity", 0.55)
            .with("Ins_insight", 0.55)
            .with("Gd_grounding", 0.55)
            .with("Em_embodiment", 0.55)
            .with("G_grace", 0.50)
            .with("Tr_trust", 0.50)
    }

    #[test]
    fn test_balanced_vector_scores_high_on_pair_dimensions() {
        let report = validator().validate(&balanced_vector(), 5.0);
        assert!(report.dimensions.inverse.unwrap() >= 0.85);
        assert!(report.dimensions.complementary.unwrap() >= 0.85);
    }

    #[test]
    fn test_inverse_pair_violation() {
        let v = StateVector::new()
            .with("At_attachment", 0.9)
            .with("S_surrender", 0.9);
        let report = validator().validate(&v, 4.0);
        let violation = report
            .violations
            .iter()
            .find(|v| v.kind == CoherenceViolationKind::Inverse)
            .expect("inverse violation expected");
        assert!(violation.severity > 0.5);
        assert!(report.score.unwrap() < 0.85);
        assert!(!report.coherent);
    }

    #[test]
    fn test_inverse_corrections_restore_balance() {
        let v = StateVector::new()
            .with("At_attachment", 0.9)
            .with("S_surrender", 0.9);
        let report = validator().validate(&v, 4.0);
        let corrected: f32 = report
            .corrections
            .iter()
            .filter(|c| c.operator == "At_attachment" || c.operator == "S_surrender")
            .map(|c| c.to)
            .sum();
        assert!((corrected - 1.0).abs() < 0.05);
        for c in &report.corrections {
            assert!((0.0..=1.0).contains(&c.to));
        }
    }

    #[test]
    fn test_complementary_gap_violation() {
        let v = balanced_vector().with("W_witness", 0.95).with("P_presence", 0.2);
        let report = validator().validate(&v, 5.0);
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == CoherenceViolationKind::Complementary));
    }

    #[test]
    fn test_missing_pair_is_skipped_not_defaulted() {
        let v = StateVector::new().with("At_attachment", 0.9);
        let report = validator().validate(&v, 4.0);
        // Only level evaluates (At_attachment has a band); the pair
        // dimensions have no evaluable rule.
        assert!(report.dimensions.inverse.is_none());
        assert!(report.dimensions.complementary.is_none());
    }

    #[test]
    fn test_empty_vector_is_indeterminate() {
        let report = validator().validate(&StateVector::new(), 4.0);
        assert!(report.score.is_none());
        assert!(!report.coherent);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_tier_rule_flags_missing_foundation() {
        let v = StateVector::new()
            .with("Un_unity", 0.8)
            .with("W_witness", 0.2)
            .with("P_presence", 0.2)
            .with("Gd_grounding", 0.2);
        let report = validator().validate(&v, 6.0);
        let violation = report
            .violations
            .iter()
            .find(|v| v.kind == CoherenceViolationKind::Tier)
            .expect("tier violation expected");
        assert!(violation.operators.contains(&"Un_unity".to_string()));
        assert!(report.dimensions.tier.unwrap() < 1.0);
    }

    #[test]
    fn test_tier_rule_folds_inverted_foundation() {
        // Surrender high with *low* attachment: folded foundation is
        // strong, no violation.
        let v = StateVector::new()
            .with("S_surrender", 0.8)
            .with("At_attachment", 0.15)
            .with("Tr_trust", 0.6)
            .with("Gd_grounding", 0.6);
        let report = validator().validate(&v, 5.0);
        assert!(!report
            .violations
            .iter()
            .any(|v| v.kind == CoherenceViolationKind::Tier));
    }

    #[test]
    fn test_level_band_violation() {
        let v = StateVector::new().with("W_witness", 0.95);
        let report = validator().validate(&v, 1.0);
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == CoherenceViolationKind::Level));
        assert_eq!(report.dimensions.level, Some(0.0));
    }

    #[test]
    fn test_implication_violation() {
        let v = StateVector::new()
            .with("S_surrender", 0.9)
            .with("At_attachment", 0.8);
        let report = validator().validate(&v, 4.0);
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == CoherenceViolationKind::Internal));
        assert_eq!(report.dimensions.internal, Some(0.0));
    }

    #[test]
    fn test_untriggered_implications_score_one() {
        let v = StateVector::new()
            .with("Un_unity", 0.2)
            .with("W_witness", 0.2);
        let report = validator().validate(&v, 2.0);
        assert_eq!(report.dimensions.internal, Some(1.0));
    }

    #[test]
    fn test_pairwise_score_for_checker() {
        let good = validator().pairwise_score(&balanced_vector()).unwrap();
        assert!(good >= 0.85);

        let bad = validator()
            .pairwise_score(
                &StateVector::new()
                    .with("At_attachment", 0.9)
                    .with("S_surrender", 0.9),
            )
            .unwrap();
        assert!(bad < 0.85);

        assert!(validator().pairwise_score(&StateVector::new()).is_none());
    }

    #[test]
    fn test_violations_sorted_by_severity() {
        let v = StateVector::new()
            .with("At_attachment", 0.95)
            .with("S_surrender", 0.95)
            .with("W_witness", 0.60)
            .with("P_presence", 0.58);
        let report = validator().validate(&v, 4.0);
        for pair in report.violations.windows(2) {
            assert!(pair[0].severity >= pair[1].severity);
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let report = validator().validate(&balanced_vector(), 5.0);
        let json = serde_json::to_string(&report).unwrap();
        let back: CoherenceReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.coherent, report.coherent);
    }
}
