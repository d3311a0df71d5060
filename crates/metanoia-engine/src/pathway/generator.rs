//! Pathway generation: turning a feasible gap into ordered,
//! strategy-specific steps.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use metanoia_core::{
    clamp01, derive_changes, ChangeKind, OperatorChange, OperatorRegistry, StateVector,
};

use crate::config::PathwayConfig;
use crate::error::EngineResult;

use super::practices::{practices_for, strategy_practices};
use super::strategy::StrategyKind;

/// One operator's movement within a step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepTransition {
    /// Operator key.
    pub operator: String,
    /// Value at the start of the step.
    pub from: f32,
    /// Value at the end of the step.
    pub to: f32,
}

/// One ordered sub-target on the way to the required state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayStep {
    /// 1-based position in the pathway.
    pub order: usize,
    /// Operator movements this step asks for.
    pub transitions: Vec<StepTransition>,
    /// Estimated duration in weeks.
    pub duration_weeks: f32,
    /// Difficulty of this step, `[0, 1]`.
    pub difficulty: f32,
    /// Energy demanded by this step, `[0, 1]`.
    pub energy: f32,
    /// Recommended practices.
    pub practices: Vec<String>,
    /// Observable signs the step is landing.
    pub indicators: Vec<String>,
}

/// A complete strategy-specific route from current to required.
///
/// Generated fresh per request and immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransformationPathway {
    /// Unique id for this generated pathway.
    pub id: Uuid,
    /// The pacing archetype.
    pub strategy: StrategyKind,
    /// Ordered steps.
    pub steps: Vec<PathwayStep>,
    /// Archetype stability, `[0, 1]`.
    pub stability: f32,
    /// Sustained effort demanded, `[0, 1]`.
    pub effort: f32,
    /// Dependence on receptive conditions, `[0, 1]`.
    pub grace_dependency: f32,
    /// Estimated probability the pathway completes, `[0.2, 0.95]`.
    pub success_probability: f32,
    /// What could go wrong.
    pub risks: Vec<String>,
    /// What improves if it lands.
    pub benefits: Vec<String>,
    /// Expected collateral while it runs.
    pub side_effects: Vec<String>,
}

impl TransformationPathway {
    /// Total estimated duration across steps, in weeks.
    pub fn total_duration_weeks(&self) -> f32 {
        self.steps.iter().map(|s| s.duration_weeks).sum()
    }
}

/// Generates strategy-specific pathways from a `(current, required)`
/// pair.
#[derive(Debug, Clone)]
pub struct PathwayGenerator {
    config: PathwayConfig,
    registry: OperatorRegistry,
}

impl PathwayGenerator {
    /// Create a generator.
    pub fn new(config: PathwayConfig, registry: OperatorRegistry) -> Self {
        Self { config, registry }
    }

    /// Generate up to `n` pathways in canonical archetype order.
    ///
    /// Returns an empty list when the gap is inside the hold band
    /// everywhere. Fails with missing-input when `required` names an
    /// operator `current` lacks.
    pub fn generate(
        &self,
        current: &StateVector,
        required: &StateVector,
        current_level: f32,
        target_level: f32,
        n: usize,
    ) -> EngineResult<Vec<TransformationPathway>> {
        let changes = derive_changes(&self.registry, current, required, self.config.hold_band)?;
        let active: Vec<OperatorChange> = changes
            .into_iter()
            .filter(|c| c.kind != ChangeKind::Stabilize)
            .collect();
        if active.is_empty() || n == 0 {
            return Ok(Vec::new());
        }

        let mean_gap =
            active.iter().map(OperatorChange::magnitude).sum::<f32>() / active.len() as f32;

        let pathways = StrategyKind::all()
            .into_iter()
            .take(n)
            .map(|strategy| {
                self.build_pathway(strategy, &active, mean_gap, current_level, target_level)
            })
            .collect::<Vec<_>>();

        debug!(
            pathways = pathways.len(),
            operators = active.len(),
            mean_gap,
            "generated pathways"
        );
        Ok(pathways)
    }

    fn build_pathway(
        &self,
        strategy: StrategyKind,
        active: &[OperatorChange],
        mean_gap: f32,
        current_level: f32,
        target_level: f32,
    ) -> TransformationPathway {
        let profile = strategy.profile();
        let step_count = strategy
            .step_count(mean_gap)
            .clamp(self.config.min_steps, self.config.max_steps);

        // Strategy tier first, magnitude second.
        let mut prioritized: Vec<&OperatorChange> = active.iter().collect();
        prioritized.sort_by(|a, b| {
            strategy
                .tier_of(&a.operator)
                .cmp(&strategy.tier_of(&b.operator))
                .then_with(|| {
                    b.magnitude()
                        .partial_cmp(&a.magnitude())
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        });

        // Earlier chunks (higher-priority operators) enter earlier steps.
        let chunk = prioritized.len().div_ceil(step_count);
        let entry_step = |index: usize| index / chunk + 1;

        let total_move: f32 = prioritized.iter().map(|c| c.magnitude()).sum();
        let mut steps = Vec::with_capacity(step_count);

        for order in 1..=step_count {
            let mut transitions = Vec::new();
            let mut entering: Vec<&OperatorChange> = Vec::new();

            for (index, change) in prioritized.iter().enumerate() {
                let entry = entry_step(index).min(step_count);
                if order < entry {
                    continue;
                }
                if order == entry {
                    entering.push(*change);
                }
                let span = (step_count - entry + 1) as f32;
                let progress_now = strategy.pacing((order - entry + 1) as f32 / span);
                let progress_before = if order == entry {
                    0.0
                } else {
                    strategy.pacing((order - entry) as f32 / span)
                };
                let from = change.current + change.delta * progress_before;
                let to = change.current + change.delta * progress_now;
                if (to - from).abs() > 1e-4 {
                    transitions.push(StepTransition {
                        operator: change.operator.clone(),
                        from: clamp01(from),
                        to: clamp01(to),
                    });
                }
            }

            let step_move: f32 = transitions.iter().map(|t| (t.to - t.from).abs()).sum();
            let share = if total_move > 0.0 {
                step_move / total_move
            } else {
                0.0
            };

            let difficulty = {
                let weighted: f32 = transitions
                    .iter()
                    .map(|t| {
                        let d = self.registry.difficulty(&t.operator).unwrap_or(0.5);
                        d * (t.to - t.from).abs()
                    })
                    .sum();
                if step_move > 0.0 {
                    clamp01(weighted / step_move * strategy.difficulty_multiplier())
                } else {
                    0.0
                }
            };
            let energy = clamp01(step_move * 1.5 * strategy.energy_multiplier());
            let duration_weeks =
                self.config.base_step_weeks * strategy.duration_multiplier() * (0.5 + share);

            let mut practices: Vec<String> = Vec::new();
            if order == 1 {
                practices.extend(
                    strategy_practices(strategy)
                        .iter()
                        .map(|s| s.to_string()),
                );
            }
            for change in &entering {
                for practice in practices_for(&change.operator).iter().take(2) {
                    let practice = practice.to_string();
                    if !practices.contains(&practice) {
                        practices.push(practice);
                    }
                }
            }
            practices.truncate(6);

            let indicators: Vec<String> = entering
                .iter()
                .map(|change| {
                    if change.delta > 0.0 {
                        format!("{} rising toward {:.2}", change.operator, change.required)
                    } else {
                        format!("{} settling toward {:.2}", change.operator, change.required)
                    }
                })
                .collect();

            steps.push(PathwayStep {
                order,
                transitions,
                duration_weeks,
                difficulty,
                energy,
                practices,
                indicators,
            });
        }

        let success_probability =
            self.success_probability(strategy, mean_gap, step_count, current_level, target_level);
        let (risks, benefits, side_effects) =
            self.narratives(strategy, active, mean_gap);

        TransformationPathway {
            id: Uuid::new_v4(),
            strategy,
            steps,
            stability: profile.stability,
            effort: profile.effort,
            grace_dependency: profile.grace_dependency,
            success_probability,
            risks,
            benefits,
            side_effects,
        }
    }

    fn success_probability(
        &self,
        strategy: StrategyKind,
        mean_gap: f32,
        step_count: usize,
        current_level: f32,
        target_level: f32,
    ) -> f32 {
        let gap_factor = 1.0 - 0.6 * clamp01(mean_gap / 0.5);
        let level_factor = 1.0 - 0.08 * (target_level - current_level).max(0.0);
        let step_factor = 1.0 - 0.04 * (step_count as f32 - 4.0).abs();
        let raw = self.config.base_success
            * gap_factor
            * level_factor.max(0.0)
            * step_factor.max(0.0)
            * strategy.success_factor();
        raw.clamp(self.config.min_success, self.config.max_success)
    }

    fn narratives(
        &self,
        strategy: StrategyKind,
        active: &[OperatorChange],
        mean_gap: f32,
    ) -> (Vec<String>, Vec<String>, Vec<String>) {
        let delta_of = |op: &str| active.iter().find(|c| c.operator == op);

        let mut risks = Vec::new();
        if strategy == StrategyKind::Direct && mean_gap > 0.3 {
            risks.push("rapid change may destabilize before it consolidates".to_string());
        }
        if strategy == StrategyKind::Grace {
            risks.push("progress stalls when receptive conditions are absent".to_string());
        }
        if let Some(c) = delta_of("At_attachment") {
            if c.required < 0.3 && c.current > 0.6 {
                risks.push("relational turbulence while attachment unwinds".to_string());
            }
        }
        if let Some(c) = delta_of("St_stress") {
            if c.current > 0.7 {
                risks.push("existing load raises burnout risk during the work".to_string());
            }
        }

        let mut benefits = Vec::new();
        if delta_of("W_witness").map(|c| c.delta >= 0.2).unwrap_or(false) {
            benefits.push("steadier self-observation under pressure".to_string());
        }
        if delta_of("Eq_equanimity").map(|c| c.delta >= 0.2).unwrap_or(false) {
            benefits.push("calmer reactivity to triggers".to_string());
        }
        if delta_of("St_stress").map(|c| c.delta <= -0.15).unwrap_or(false) {
            benefits.push("lower baseline stress".to_string());
        }
        if delta_of("S_surrender").map(|c| c.delta >= 0.2).unwrap_or(false) {
            benefits.push("easier letting go of outcomes".to_string());
        }
        if benefits.is_empty() {
            benefits.push(format!(
                "{} operators brought into target range",
                active.len()
            ));
        }

        let mut side_effects = Vec::new();
        if delta_of("Eg_ego").map(|c| c.delta <= -0.3).unwrap_or(false) {
            side_effects.push("temporary identity diffuseness".to_string());
        }
        if delta_of("Sh_shadow").map(|c| c.delta >= 0.3).unwrap_or(false) {
            side_effects.push("suppressed material surfacing faster than comfortable".to_string());
        }
        if delta_of("Un_unity").map(|c| c.delta >= 0.3).unwrap_or(false) {
            side_effects.push("disorientation as unity perception opens".to_string());
        }
        if strategy.profile().grace_dependency >= 0.8 {
            side_effects
                .push("timeline depends on conditions outside deliberate control".to_string());
        }

        (risks, benefits, side_effects)
    }
}
