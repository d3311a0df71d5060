//! Minimum viable transformation: the smallest change subset expected
//! to carry most of the benefit.
//!
//! # Model Reference
//!
//! A static cascade map records which operator changes tend to pull
//! other operators along. Sensitivity weighs each candidate change by
//! magnitude, cascade reach and ease; keystones (a fixed candidate list
//! plus well-connected hubs) are taken first, then remaining operators
//! by impact-per-effort, skipping anything already covered by a
//! cascade, until the budget is spent.

use serde::{Deserialize, Serialize};
use tracing::debug;

use metanoia_core::{
    derive_changes, ChangeKind, OperatorChange, OperatorRegistry, StateVector,
};

use crate::config::MvtConfig;
use crate::error::EngineResult;

/// "Changing X tends to also improve Y" adjacency, filtered at use to
/// edges whose endpoints are both in the active change set.
const CASCADE: &[(&str, &[&str])] = &[
    ("W_witness", &["P_presence", "Eq_equanimity", "Cl_clarity"]),
    ("S_surrender", &["G_grace", "At_attachment", "Tr_trust"]),
    ("Gd_grounding", &["Em_embodiment", "En_energy", "Re_resilience"]),
    ("P_presence", &["W_witness", "Em_embodiment"]),
    ("Eq_equanimity", &["Av_aversion", "Re_resilience"]),
    ("Co_compassion", &["Fo_forgiveness", "Se_service"]),
    ("Di_discipline", &["In_intention", "En_energy"]),
    ("Hu_humility", &["Eg_ego"]),
    ("In_intention", &["Di_discipline"]),
    ("Cl_clarity", &["Ins_insight"]),
];

/// Operators that experience repeatedly shows to be leverage points.
const KEYSTONE_CANDIDATES: &[&str] = &[
    "W_witness",
    "S_surrender",
    "Gd_grounding",
    "P_presence",
    "Co_compassion",
    "Di_discipline",
];

/// Why a change made the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MvtReasoning {
    /// Selected as a keystone leverage point.
    Keystone,
    /// Selected on impact-per-effort.
    ImpactRatio,
}

/// One selected change with its selection rationale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvtChange {
    /// The underlying change.
    pub change: OperatorChange,
    /// 1-based selection order.
    pub priority: usize,
    /// Why it was selected.
    pub reasoning: MvtReasoning,
    /// Active operators this change is expected to pull along.
    pub cascade_targets: Vec<String>,
}

/// The minimum-viable-transformation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvtResult {
    /// Selected changes, in selection order.
    pub selected: Vec<MvtChange>,
    /// Operators covered by selection or cascade.
    pub covered: Vec<String>,
    /// Size of the naive full change set.
    pub naive_count: usize,
    /// `selected / naive`, in `[0, 1]`.
    pub efficiency: f32,
}

/// Computes minimum viable transformations.
#[derive(Debug, Clone)]
pub struct MvtCalculator {
    config: MvtConfig,
    registry: OperatorRegistry,
}

impl MvtCalculator {
    /// Create a calculator.
    pub fn new(config: MvtConfig, registry: OperatorRegistry) -> Self {
        Self { config, registry }
    }

    /// Sensitivity of one change: magnitude, amplified by cascade
    /// reach, damped by difficulty.
    pub fn sensitivity(&self, change: &OperatorChange, active: &[&str]) -> f32 {
        let neighbors = cascade_targets(&change.operator, active).len();
        change.magnitude() * (1.0 + 0.1 * neighbors as f32) * (1.0 - change.difficulty)
    }

    /// Compute the smallest effective change subset, at most `max_ops`
    /// entries.
    pub fn compute(
        &self,
        current: &StateVector,
        required: &StateVector,
        max_ops: usize,
    ) -> EngineResult<MvtResult> {
        let max_ops = if max_ops == 0 {
            self.config.default_max_ops
        } else {
            max_ops
        };

        let changes = derive_changes(&self.registry, current, required, self.config.min_delta)?;
        let active: Vec<OperatorChange> = changes
            .into_iter()
            .filter(|c| c.kind != ChangeKind::Stabilize)
            .collect();
        let active_names: Vec<&str> = active.iter().map(|c| c.operator.as_str()).collect();

        let naive_count = active
            .iter()
            .filter(|c| c.magnitude() > self.config.naive_threshold)
            .count();

        // Keystones: fixed candidates over the sensitivity bar, plus
        // hubs with enough active cascade reach, capped.
        let mut keystones: Vec<&OperatorChange> = Vec::new();
        for change in &active {
            let sensitivity = self.sensitivity(change, &active_names);
            let candidate = KEYSTONE_CANDIDATES.contains(&change.operator.as_str())
                && sensitivity > self.config.keystone_sensitivity;
            let hub = cascade_targets(&change.operator, &active_names).len()
                >= self.config.hub_min_neighbors
                && sensitivity > self.config.hub_sensitivity;
            if candidate || hub {
                keystones.push(change);
            }
        }
        keystones.sort_by(|a, b| {
            self.sensitivity(b, &active_names)
                .partial_cmp(&self.sensitivity(a, &active_names))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        keystones.truncate(self.config.max_keystones);

        let mut selected: Vec<MvtChange> = Vec::new();
        let mut covered: Vec<String> = Vec::new();

        for change in keystones {
            if selected.len() >= max_ops {
                break;
            }
            // A keystone already pulled along by an earlier keystone's
            // cascade does not need direct work.
            if covered.contains(&change.operator) {
                continue;
            }
            let targets = cascade_targets(&change.operator, &active_names);
            covered.push(change.operator.clone());
            for t in &targets {
                if !covered.contains(t) {
                    covered.push(t.clone());
                }
            }
            selected.push(MvtChange {
                change: change.clone(),
                priority: selected.len() + 1,
                reasoning: MvtReasoning::Keystone,
                cascade_targets: targets,
            });
        }

        // Greedy fill by impact-per-effort over what cascades have not
        // already covered.
        let mut remaining: Vec<&OperatorChange> = active
            .iter()
            .filter(|c| !covered.contains(&c.operator))
            .collect();
        remaining.sort_by(|a, b| {
            b.impact_ratio()
                .partial_cmp(&a.impact_ratio())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        for change in remaining {
            if selected.len() >= max_ops {
                break;
            }
            if covered.contains(&change.operator) {
                continue;
            }
            let targets = cascade_targets(&change.operator, &active_names);
            covered.push(change.operator.clone());
            for t in &targets {
                if !covered.contains(t) {
                    covered.push(t.clone());
                }
            }
            selected.push(MvtChange {
                change: change.clone(),
                priority: selected.len() + 1,
                reasoning: MvtReasoning::ImpactRatio,
                cascade_targets: targets,
            });
        }

        let efficiency = if naive_count == 0 {
            0.0
        } else {
            (selected.len() as f32 / naive_count as f32).min(1.0)
        };

        debug!(
            selected = selected.len(),
            naive_count, efficiency, "mvt selection finished"
        );

        Ok(MvtResult {
            selected,
            covered,
            naive_count,
            efficiency,
        })
    }
}

/// Cascade edges from `operator` whose targets are in the active set.
fn cascade_targets(operator: &str, active: &[&str]) -> Vec<String> {
    CASCADE
        .iter()
        .find(|(from, _)| *from == operator)
        .map(|(_, targets)| {
            targets
                .iter()
                .filter(|t| active.contains(*t))
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default()
}
