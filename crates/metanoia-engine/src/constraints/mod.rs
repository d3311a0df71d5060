//! Feasibility constraint checking.
//!
//! # Model Reference
//!
//! Seven independent checks on a `(current, required, current_level,
//! target_level)` quadruple. Each check yields exactly one of: passed, a
//! violation, indeterminate (with the operator names that prevented
//! evaluation), or disabled. Indeterminate and disabled checks are
//! excluded from the feasibility aggregate; they never default to a
//! pass or a numeric score.
//!
//! Feasibility is data, not an error: a report with blocking violations
//! simply says `feasible = false` and carries recommendations keyed by
//! which checks failed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use metanoia_core::{clamp01, OperatorCategory, OperatorRegistry, StateVector};

use crate::coherence::CoherenceValidator;
use crate::config::ConstraintConfig;

/// Deep capacities and the shallow prerequisite each one presumes.
const DEEP_PREREQUISITES: &[(&str, &str)] = &[
    ("Un_unity", "P_presence"),
    ("Sh_shadow", "W_witness"),
    ("G_grace", "S_surrender"),
    ("Ins_insight", "Cl_clarity"),
];

/// Operators whose current values constitute available energy capacity.
const ENERGY_CAPACITY_OPS: &[&str] =
    &["En_energy", "Gd_grounding", "Em_embodiment", "Re_resilience"];

/// The seven feasibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// Level gap within the allowed jump.
    LevelJump,
    /// Load limits concurrent change.
    LoadCapacity,
    /// Change magnitude within level flexibility.
    Flexibility,
    /// Collective-field binding vs transpersonal change.
    CollectiveField,
    /// Energy capacity covers demand.
    EnergySustainability,
    /// Required vector pairwise-coherent.
    PairwiseCoherence,
    /// Deep demands have shallow prerequisites in place.
    PrerequisiteOrdering,
}

/// How hard a violation blocks the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintSeverity {
    /// The plan is not viable as stated.
    Blocking,
    /// Proceed with caution.
    Warning,
    /// Worth knowing.
    Info,
}

/// One failed constraint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintViolation {
    /// Which check failed.
    pub kind: ConstraintKind,
    /// How hard it blocks.
    pub severity: ConstraintSeverity,
    /// What is wrong.
    pub message: String,
    /// What to do about it.
    pub remediation: String,
}

/// Outcome of one check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckStatus {
    /// The check evaluated and passed.
    Passed,
    /// The check evaluated and failed.
    Violated(ConstraintViolation),
    /// The check could not evaluate; the named operators were absent.
    Indeterminate {
        /// Operators whose absence prevented evaluation.
        missing: Vec<String>,
    },
    /// The check was disabled by configuration.
    Disabled,
}

/// One check's labelled outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    /// Which check.
    pub kind: ConstraintKind,
    /// How it went.
    pub status: CheckStatus,
}

/// What kind of follow-up a recommendation proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    /// Establish something first.
    Prerequisite,
    /// Change the plan's shape.
    Adjustment,
    /// Aim for a nearer goal, then re-plan.
    IntermediateGoal,
}

/// A follow-up suggestion derived from failed checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Suggestion family.
    pub kind: RecommendationKind,
    /// The suggestion itself.
    pub message: String,
}

/// Aggregated feasibility verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintReport {
    /// True when no evaluated check blocked.
    pub feasible: bool,
    /// `1 - 0.25 * blocking - 0.08 * warnings`, clamped to `[0, 1]`.
    pub feasibility_score: f32,
    /// Every check's outcome, in canonical order.
    pub checks: Vec<CheckResult>,
    /// Follow-ups keyed by what failed.
    pub recommendations: Vec<Recommendation>,
}

impl ConstraintReport {
    /// All violations, blocking first.
    pub fn violations(&self) -> Vec<&ConstraintViolation> {
        let mut out: Vec<&ConstraintViolation> = self
            .checks
            .iter()
            .filter_map(|c| match &c.status {
                CheckStatus::Violated(v) => Some(v),
                _ => None,
            })
            .collect();
        out.sort_by_key(|v| match v.severity {
            ConstraintSeverity::Blocking => 0,
            ConstraintSeverity::Warning => 1,
            ConstraintSeverity::Info => 2,
        });
        out
    }

    /// Checks that could not evaluate, with the operators they lacked.
    pub fn indeterminate(&self) -> Vec<(ConstraintKind, &[String])> {
        self.checks
            .iter()
            .filter_map(|c| match &c.status {
                CheckStatus::Indeterminate { missing } => Some((c.kind, missing.as_slice())),
                _ => None,
            })
            .collect()
    }
}

/// Runs the seven feasibility checks.
#[derive(Debug, Clone)]
pub struct ConstraintChecker {
    config: ConstraintConfig,
    registry: OperatorRegistry,
    coherence: CoherenceValidator,
}

impl ConstraintChecker {
    /// Create a checker. The coherence validator backs the pairwise
    /// check.
    pub fn new(
        config: ConstraintConfig,
        registry: OperatorRegistry,
        coherence: CoherenceValidator,
    ) -> Self {
        Self {
            config,
            registry,
            coherence,
        }
    }

    /// Run every enabled check and aggregate.
    pub fn check(
        &self,
        current: &StateVector,
        required: &StateVector,
        current_level: f32,
        target_level: f32,
    ) -> ConstraintReport {
        let deltas = ChangeView::new(current, required);

        let checks = vec![
            CheckResult {
                kind: ConstraintKind::LevelJump,
                status: self.check_level_jump(current_level, target_level),
            },
            CheckResult {
                kind: ConstraintKind::LoadCapacity,
                status: self.check_load(current, &deltas),
            },
            CheckResult {
                kind: ConstraintKind::Flexibility,
                status: self.check_flexibility(current, &deltas, target_level),
            },
            CheckResult {
                kind: ConstraintKind::CollectiveField,
                status: self.check_field(&deltas, current_level),
            },
            CheckResult {
                kind: ConstraintKind::EnergySustainability,
                status: self.check_energy(current, &deltas),
            },
            CheckResult {
                kind: ConstraintKind::PairwiseCoherence,
                status: self.check_coherence(required),
            },
            CheckResult {
                kind: ConstraintKind::PrerequisiteOrdering,
                status: self.check_prerequisites(current, required),
            },
        ];

        let mut blocking = 0usize;
        let mut warnings = 0usize;
        for check in &checks {
            if let CheckStatus::Violated(v) = &check.status {
                match v.severity {
                    ConstraintSeverity::Blocking => blocking += 1,
                    ConstraintSeverity::Warning => warnings += 1,
                    ConstraintSeverity::Info => {}
                }
            }
        }

        let feasible = blocking == 0;
        let feasibility_score =
            clamp01(1.0 - 0.25 * blocking as f32 - 0.08 * warnings as f32);
        let recommendations = self.recommend(&checks);

        debug!(
            feasible,
            feasibility_score,
            blocking,
            warnings,
            "constraint check finished"
        );

        ConstraintReport {
            feasible,
            feasibility_score,
            checks,
            recommendations,
        }
    }

    fn check_level_jump(&self, current_level: f32, target_level: f32) -> CheckStatus {
        if !self.config.check_level_jump {
            return CheckStatus::Disabled;
        }
        let gap = target_level - current_level;
        if gap > self.config.max_level_jump {
            CheckStatus::Violated(ConstraintViolation {
                kind: ConstraintKind::LevelJump,
                severity: ConstraintSeverity::Blocking,
                message: format!(
                    "level gap {:.1} exceeds the maximum viable jump of {:.1}",
                    gap, self.config.max_level_jump
                ),
                remediation: format!(
                    "target level {:.1} first, stabilize, then re-plan",
                    current_level + self.config.max_level_jump
                ),
            })
        } else {
            CheckStatus::Passed
        }
    }

    fn check_load(&self, current: &StateVector, deltas: &ChangeView) -> CheckStatus {
        if !self.config.check_load {
            return CheckStatus::Disabled;
        }
        let mut missing = deltas.missing.clone();
        let load = match current.get("St_stress") {
            Some(v) => v,
            None => {
                missing.push("St_stress".to_string());
                return indeterminate(missing);
            }
        };
        if !missing.is_empty() {
            return indeterminate(missing);
        }
        if load <= self.config.load_threshold {
            return CheckStatus::Passed;
        }
        let mean = deltas.mean_abs_delta();
        if mean > self.config.load_mean_delta_blocking {
            CheckStatus::Violated(ConstraintViolation {
                kind: ConstraintKind::LoadCapacity,
                severity: ConstraintSeverity::Blocking,
                message: format!(
                    "stress at {:.2} cannot carry an average change of {:.2}",
                    load, mean
                ),
                remediation: "reduce stress below 0.7 or shrink the change set".to_string(),
            })
        } else if mean > self.config.load_mean_delta_warning {
            CheckStatus::Violated(ConstraintViolation {
                kind: ConstraintKind::LoadCapacity,
                severity: ConstraintSeverity::Warning,
                message: format!(
                    "stress at {:.2} limits sustainable change; average requested is {:.2}",
                    load, mean
                ),
                remediation: "sequence the changes or address stress first".to_string(),
            })
        } else {
            CheckStatus::Passed
        }
    }

    fn check_flexibility(
        &self,
        current: &StateVector,
        deltas: &ChangeView,
        target_level: f32,
    ) -> CheckStatus {
        if !self.config.check_flexibility {
            return CheckStatus::Disabled;
        }
        if !deltas.missing.is_empty() {
            return indeterminate(deltas.missing.clone());
        }
        let mut allowed = self.config.flexibility_for_level(target_level);
        if let Some(resilience) = current.get("Re_resilience") {
            if resilience >= self.config.flexibility_bonus_min_resilience {
                allowed += self.config.flexibility_bonus;
            }
        }
        let (op, max) = match deltas.max_abs_delta() {
            Some(pair) => pair,
            None => return CheckStatus::Passed,
        };
        if max <= allowed {
            return CheckStatus::Passed;
        }
        let severity = if max > allowed + 0.15 {
            ConstraintSeverity::Blocking
        } else {
            ConstraintSeverity::Warning
        };
        CheckStatus::Violated(ConstraintViolation {
            kind: ConstraintKind::Flexibility,
            severity,
            message: format!(
                "{op} asks for a move of {:.2}; level flexibility allows {:.2}",
                max, allowed
            ),
            remediation: format!("split the {op} change into increments of at most {allowed:.2}"),
        })
    }

    fn check_field(&self, deltas: &ChangeView, current_level: f32) -> CheckStatus {
        if !self.config.check_field {
            return CheckStatus::Disabled;
        }
        // The field binds against the transpersonal and receptive
        // capacities.
        let field_ops: Vec<&str> = self
            .registry
            .iter()
            .filter(|m| {
                matches!(
                    m.category,
                    OperatorCategory::Transpersonal | OperatorCategory::Receptivity
                )
            })
            .map(|m| m.key)
            .collect();
        let field_deltas: Vec<f32> = field_ops
            .iter()
            .filter_map(|op| deltas.delta_of(op).map(f32::abs))
            .collect();
        let field_missing: Vec<String> = field_ops
            .iter()
            .filter(|op| deltas.required_but_missing(op))
            .map(|s| s.to_string())
            .collect();
        if !field_missing.is_empty() {
            return indeterminate(field_missing);
        }
        if field_deltas.is_empty() {
            return CheckStatus::Passed;
        }
        let mean = field_deltas.iter().sum::<f32>() / field_deltas.len() as f32;
        let binding = self.config.binding_for_level(current_level);
        let allowance = 1.0 - binding;
        if mean <= allowance {
            return CheckStatus::Passed;
        }
        let severity = if mean > allowance + 0.2 {
            ConstraintSeverity::Blocking
        } else {
            ConstraintSeverity::Warning
        };
        CheckStatus::Violated(ConstraintViolation {
            kind: ConstraintKind::CollectiveField,
            severity,
            message: format!(
                "collective-field binding {:.2} at level {:.0} resists an average transpersonal shift of {:.2}",
                binding, current_level, mean
            ),
            remediation: "find a supportive container before pushing transpersonal change"
                .to_string(),
        })
    }

    fn check_energy(&self, current: &StateVector, deltas: &ChangeView) -> CheckStatus {
        if !self.config.check_energy {
            return CheckStatus::Disabled;
        }
        let mut missing: Vec<String> = ENERGY_CAPACITY_OPS
            .iter()
            .filter(|op| current.get(op).is_none())
            .map(|s| s.to_string())
            .collect();
        missing.extend(deltas.missing.iter().cloned());
        if !missing.is_empty() {
            return indeterminate(missing);
        }
        let available = ENERGY_CAPACITY_OPS
            .iter()
            .filter_map(|op| current.get(op))
            .sum::<f32>()
            / ENERGY_CAPACITY_OPS.len() as f32;
        let demand = deltas.mean_positive_delta();
        if available < demand {
            CheckStatus::Violated(ConstraintViolation {
                kind: ConstraintKind::EnergySustainability,
                severity: ConstraintSeverity::Blocking,
                message: format!(
                    "demand {:.2} exceeds available capacity {:.2}",
                    demand, available
                ),
                remediation: "restore energy, grounding and embodiment before this plan"
                    .to_string(),
            })
        } else if available - demand < self.config.energy_reserve {
            CheckStatus::Violated(ConstraintViolation {
                kind: ConstraintKind::EnergySustainability,
                severity: ConstraintSeverity::Warning,
                message: format!(
                    "reserve {:.2} is under the sustainable margin of {:.2}",
                    available - demand,
                    self.config.energy_reserve
                ),
                remediation: "pace the plan to protect energy reserves".to_string(),
            })
        } else {
            CheckStatus::Passed
        }
    }

    fn check_coherence(&self, required: &StateVector) -> CheckStatus {
        if !self.config.check_coherence {
            return CheckStatus::Disabled;
        }
        match self.coherence.pairwise_score(required) {
            None => {
                // Name the pair operators whose absence blocked scoring.
                let mut missing: Vec<String> = crate::coherence::rules::INVERSE_PAIRS
                    .iter()
                    .chain(crate::coherence::rules::COMPLEMENTARY_PAIRS)
                    .flat_map(|(a, b)| [*a, *b])
                    .filter(|op| required.get(op).is_none())
                    .map(|s| s.to_string())
                    .collect();
                missing.sort();
                missing.dedup();
                indeterminate(missing)
            }
            Some(score) if score >= self.config.coherence_threshold => CheckStatus::Passed,
            Some(score) => {
                let severity = if score < 0.6 {
                    ConstraintSeverity::Blocking
                } else {
                    ConstraintSeverity::Warning
                };
                CheckStatus::Violated(ConstraintViolation {
                    kind: ConstraintKind::PairwiseCoherence,
                    severity,
                    message: format!(
                        "required state scores {:.2} on pairwise coherence (threshold {:.2})",
                        score, self.config.coherence_threshold
                    ),
                    remediation: "rebalance the paired operators before planning".to_string(),
                })
            }
        }
    }

    fn check_prerequisites(&self, current: &StateVector, required: &StateVector) -> CheckStatus {
        if !self.config.check_prerequisites {
            return CheckStatus::Disabled;
        }
        let mut missing: Vec<String> = Vec::new();
        let mut broken: Vec<(&str, &str, f32, f32)> = Vec::new();

        for (deep, shallow) in DEEP_PREREQUISITES {
            let required_deep = match required.get(deep) {
                Some(v) => v,
                None => continue, // nothing demanded of this capacity
            };
            let current_deep = match current.get(deep) {
                Some(v) => v,
                None => {
                    missing.push(deep.to_string());
                    continue;
                }
            };
            if required_deep - current_deep <= self.config.deep_increase_threshold {
                continue;
            }
            let required_shallow = match required.get(shallow) {
                Some(v) => v,
                None => {
                    missing.push(shallow.to_string());
                    continue;
                }
            };
            let current_shallow = match current.get(shallow) {
                Some(v) => v,
                None => {
                    missing.push(shallow.to_string());
                    continue;
                }
            };
            if current_shallow < required_shallow / 2.0 {
                broken.push((deep, shallow, current_shallow, required_shallow));
            }
        }

        if !missing.is_empty() {
            return indeterminate(missing);
        }
        match broken.first() {
            None => CheckStatus::Passed,
            Some((deep, shallow, cur, req)) => CheckStatus::Violated(ConstraintViolation {
                kind: ConstraintKind::PrerequisiteOrdering,
                severity: ConstraintSeverity::Warning,
                message: format!(
                    "deepening {deep} presumes {shallow} at least half established ({:.2} of {:.2})",
                    cur, req
                ),
                remediation: format!("develop {shallow} before the {deep} work"),
            }),
        }
    }

    fn recommend(&self, checks: &[CheckResult]) -> Vec<Recommendation> {
        let mut out = Vec::new();
        for check in checks {
            let violation = match &check.status {
                CheckStatus::Violated(v) => v,
                _ => continue,
            };
            let (kind, message) = match check.kind {
                ConstraintKind::LevelJump => (
                    RecommendationKind::IntermediateGoal,
                    "plan toward an intermediate level and re-solve from there".to_string(),
                ),
                ConstraintKind::LoadCapacity => (
                    RecommendationKind::Adjustment,
                    "lower stress or narrow the change set before starting".to_string(),
                ),
                ConstraintKind::Flexibility => (
                    RecommendationKind::Adjustment,
                    "break the largest moves into level-sized increments".to_string(),
                ),
                ConstraintKind::CollectiveField => (
                    RecommendationKind::Adjustment,
                    "secure relational support for the transpersonal portion".to_string(),
                ),
                ConstraintKind::EnergySustainability => (
                    RecommendationKind::Prerequisite,
                    "rebuild energy, grounding and embodiment first".to_string(),
                ),
                ConstraintKind::PairwiseCoherence => (
                    RecommendationKind::Adjustment,
                    violation.remediation.clone(),
                ),
                ConstraintKind::PrerequisiteOrdering => (
                    RecommendationKind::Prerequisite,
                    violation.remediation.clone(),
                ),
            };
            out.push(Recommendation { kind, message });
        }
        out
    }
}

fn indeterminate(mut missing: Vec<String>) -> CheckStatus {
    missing.sort();
    missing.dedup();
    CheckStatus::Indeterminate { missing }
}

/// Delta view over the operators named by `required`, tolerating absent
/// current values by recording them as missing.
struct ChangeView {
    deltas: Vec<(String, f32)>,
    missing: Vec<String>,
}

impl ChangeView {
    fn new(current: &StateVector, required: &StateVector) -> Self {
        let mut deltas = Vec::new();
        let mut missing = Vec::new();
        for (name, req) in required.iter() {
            match current.get(name) {
                Some(cur) => deltas.push((name.to_string(), req - cur)),
                None => missing.push(name.to_string()),
            }
        }
        Self { deltas, missing }
    }

    fn delta_of(&self, op: &str) -> Option<f32> {
        self.deltas
            .iter()
            .find(|(name, _)| name == op)
            .map(|(_, d)| *d)
    }

    fn required_but_missing(&self, op: &str) -> bool {
        self.missing.iter().any(|m| m == op)
    }

    fn mean_abs_delta(&self) -> f32 {
        if self.deltas.is_empty() {
            return 0.0;
        }
        self.deltas.iter().map(|(_, d)| d.abs()).sum::<f32>() / self.deltas.len() as f32
    }

    fn mean_positive_delta(&self) -> f32 {
        if self.deltas.is_empty() {
            return 0.0;
        }
        self.deltas.iter().map(|(_, d)| d.max(0.0)).sum::<f32>() / self.deltas.len() as f32
    }

    fn max_abs_delta(&self) -> Option<(String, f32)> {
        self.deltas
            .iter()
            .max_by(|a, b| {
                a.1.abs()
                    .partial_cmp(&b.1.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(name, d)| (name.clone(), d.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CoherenceConfig;

    fn checker() -> ConstraintChecker {
        let registry = OperatorRegistry::builtin();
        let coherence =
            CoherenceValidator::new(CoherenceConfig::default(), registry.clone());
        ConstraintChecker::new(ConstraintConfig::default(), registry, coherence)
    }

    fn calm_current() -> StateVector {
        OperatorRegistry::builtin()
            .default_vector()
            .with("St_stress", 0.3)
            .with("En_energy", 0.6)
            .with("Gd_grounding", 0.6)
            .with("Em_embodiment", 0.6)
            .with("Re_resilience", 0.6)
    }

    fn modest_required() -> StateVector {
        StateVector::new()
            .with("W_witness", 0.45)
            .with("P_presence", 0.45)
            .with("Eq_equanimity", 0.45)
    }

    #[test]
    fn test_modest_plan_feasible() {
        let report = checker().check(&calm_current(), &modest_required(), 3.0, 4.0);
        assert!(report.feasible, "violations: {:?}", report.violations());
        assert!(report.feasibility_score > 0.8);
    }

    #[test]
    fn test_level_jump_blocks() {
        let report = checker().check(&calm_current(), &modest_required(), 2.0, 6.0);
        assert!(!report.feasible);
        let violations = report.violations();
        let jump = violations
            .iter()
            .find(|v| v.kind == ConstraintKind::LevelJump)
            .expect("level jump violation");
        assert_eq!(jump.severity, ConstraintSeverity::Blocking);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.kind == RecommendationKind::IntermediateGoal));
    }

    #[test]
    fn test_high_load_limits_change() {
        let current = calm_current().with("St_stress", 0.85);
        let required = StateVector::new()
            .with("W_witness", 0.9)
            .with("S_surrender", 0.9)
            .with("Eq_equanimity", 0.9);
        let report = checker().check(&current, &required, 3.0, 4.0);
        assert!(report
            .violations()
            .iter()
            .any(|v| v.kind == ConstraintKind::LoadCapacity));
    }

    #[test]
    fn test_missing_stress_is_indeterminate() {
        let current = calm_current().without("St_stress");
        let report = checker().check(&current, &modest_required(), 3.0, 4.0);
        let indet = report.indeterminate();
        let load = indet
            .iter()
            .find(|(kind, _)| *kind == ConstraintKind::LoadCapacity)
            .expect("load check should be indeterminate");
        assert!(load.1.contains(&"St_stress".to_string()));
    }

    #[test]
    fn test_missing_energy_ops_indeterminate() {
        let current = calm_current().without("En_energy");
        let report = checker().check(&current, &modest_required(), 3.0, 4.0);
        assert!(report
            .indeterminate()
            .iter()
            .any(|(kind, missing)| *kind == ConstraintKind::EnergySustainability
                && missing.contains(&"En_energy".to_string())));
    }

    #[test]
    fn test_flexibility_violation_on_large_move() {
        let current = calm_current().with("Re_resilience", 0.3);
        let required = StateVector::new().with("S_surrender", 0.95);
        // Level 2 flexibility is 0.18; the requested move is ~0.70.
        let report = checker().check(&current, &required, 2.0, 2.0);
        let violations = report.violations();
        let flex = violations
            .iter()
            .find(|v| v.kind == ConstraintKind::Flexibility)
            .expect("flexibility violation");
        assert_eq!(flex.severity, ConstraintSeverity::Blocking);
    }

    #[test]
    fn test_resilience_bonus_relaxes_flexibility() {
        let required = StateVector::new().with("P_presence", 0.78);
        // Move of 0.43 at level 7: allowed 0.42 fails without bonus,
        // passes with the resilience override.
        let weak = calm_current().with("Re_resilience", 0.3).with("P_presence", 0.35);
        let strong = calm_current().with("Re_resilience", 0.8).with("P_presence", 0.35);
        let without = checker().check(&weak, &required, 7.0, 7.0);
        let with = checker().check(&strong, &required, 7.0, 7.0);
        assert!(without
            .violations()
            .iter()
            .any(|v| v.kind == ConstraintKind::Flexibility));
        assert!(!with
            .violations()
            .iter()
            .any(|v| v.kind == ConstraintKind::Flexibility));
    }

    #[test]
    fn test_field_binding_resists_transpersonal_change() {
        let current = calm_current();
        let required = StateVector::new().with("Un_unity", 0.8).with("G_grace", 0.8);
        // Level 1 binding 0.90 leaves an allowance of 0.10.
        let report = checker().check(&current, &required, 1.0, 2.0);
        assert!(report
            .violations()
            .iter()
            .any(|v| v.kind == ConstraintKind::CollectiveField));
    }

    #[test]
    fn test_energy_demand_blocks_when_depleted() {
        let current = calm_current()
            .with("En_energy", 0.1)
            .with("Gd_grounding", 0.1)
            .with("Em_embodiment", 0.1)
            .with("Re_resilience", 0.1);
        let required = StateVector::new()
            .with("W_witness", 0.9)
            .with("S_surrender", 0.9)
            .with("Un_unity", 0.8);
        let report = checker().check(&current, &required, 4.0, 4.0);
        let violations = report.violations();
        let energy = violations
            .iter()
            .find(|v| v.kind == ConstraintKind::EnergySustainability)
            .expect("energy violation");
        assert_eq!(energy.severity, ConstraintSeverity::Blocking);
    }

    #[test]
    fn test_incoherent_required_flagged() {
        let required = StateVector::new()
            .with("At_attachment", 0.9)
            .with("S_surrender", 0.9);
        let report = checker().check(&calm_current(), &required, 4.0, 4.0);
        assert!(report
            .violations()
            .iter()
            .any(|v| v.kind == ConstraintKind::PairwiseCoherence));
    }

    #[test]
    fn test_prerequisite_ordering() {
        let current = calm_current()
            .with("Un_unity", 0.1)
            .with("P_presence", 0.15);
        let required = StateVector::new()
            .with("Un_unity", 0.6)
            .with("P_presence", 0.7);
        let report = checker().check(&current, &required, 4.0, 5.0);
        let violations = report.violations();
        let prereq = violations
            .iter()
            .find(|v| v.kind == ConstraintKind::PrerequisiteOrdering)
            .expect("prerequisite violation");
        assert!(prereq.message.contains("P_presence"));
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.kind == RecommendationKind::Prerequisite));
    }

    #[test]
    fn test_disabled_check_reports_disabled() {
        let registry = OperatorRegistry::builtin();
        let coherence =
            CoherenceValidator::new(CoherenceConfig::default(), registry.clone());
        let config = ConstraintConfig {
            check_level_jump: false,
            ..Default::default()
        };
        let checker = ConstraintChecker::new(config, registry, coherence);
        let report = checker.check(&calm_current(), &modest_required(), 1.0, 8.0);
        let jump = report
            .checks
            .iter()
            .find(|c| c.kind == ConstraintKind::LevelJump)
            .unwrap();
        assert!(matches!(jump.status, CheckStatus::Disabled));
        // With the jump check off, the huge gap no longer blocks.
        assert!(report.feasible);
    }

    #[test]
    fn test_feasibility_score_in_range() {
        let current = calm_current()
            .with("St_stress", 0.9)
            .with("En_energy", 0.05)
            .with("Gd_grounding", 0.05)
            .with("Em_embodiment", 0.05)
            .with("Re_resilience", 0.05);
        let required = StateVector::new()
            .with("At_attachment", 0.95)
            .with("S_surrender", 0.95)
            .with("Un_unity", 0.9)
            .with("G_grace", 0.9);
        let report = checker().check(&current, &required, 1.0, 8.0);
        assert!(!report.feasible);
        assert!((0.0..=1.0).contains(&report.feasibility_score));
    }

    #[test]
    fn test_serde_round_trip() {
        let report = checker().check(&calm_current(), &modest_required(), 3.0, 4.0);
        let json = serde_json::to_string(&report).unwrap();
        let back: ConstraintReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.feasible, report.feasible);
        assert_eq!(back.checks.len(), 7);
    }
}
