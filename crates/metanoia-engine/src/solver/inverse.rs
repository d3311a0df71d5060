//! Inverse solving: from a target outcome score to a required state.
//!
//! # Model Reference
//!
//! Bounded finite-difference gradient descent over the formula's relevant
//! operators:
//!
//! ```text
//! error = target - f(x)
//! x'_op = clamp01(x_op + lr * error * sign(g) / (|g| + eps) * (1 - difficulty * k))
//! ```
//!
//! with the learning rate decaying geometrically on a fixed interval.
//! The loop stops at `|error| < tolerance` or at the iteration cap. A
//! cap-out is not an `Err`: the result comes back with
//! `goal_achievable = false` and diagnostics. Missing relevant operators
//! fail the whole solve before the first iteration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use metanoia_core::types::DEFAULT_HOLD_BAND;
use metanoia_core::{
    clamp01, derive_changes, ChangeKind, OperatorChange, OperatorRegistry, OutcomeModel,
    RequiredState, RequirementDetail, StateVector,
};

use crate::config::SolverConfig;
use crate::error::{EngineError, EngineResult};

use super::gradient::estimate_gradient;

/// Optional external per-operator box constraints, tightening the hard
/// `[0, 1]` bounds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverBounds {
    bounds: BTreeMap<String, (f32, f32)>,
}

impl SolverBounds {
    /// No external constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain one operator to `[min, max]` (clamped into `[0, 1]`).
    #[must_use]
    pub fn with_bound(mut self, operator: impl Into<String>, min: f32, max: f32) -> Self {
        let lo = clamp01(min.min(max));
        let hi = clamp01(min.max(max));
        self.bounds.insert(operator.into(), (lo, hi));
        self
    }

    /// Clamp a candidate value into the operator's box.
    pub fn apply(&self, operator: &str, value: f32) -> f32 {
        match self.bounds.get(operator) {
            Some((lo, hi)) => value.clamp(*lo, *hi),
            None => value,
        }
    }
}

/// Per-objective outcome of a solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveReport {
    /// Outcome name.
    pub outcome: String,
    /// Desired score.
    pub target_value: f32,
    /// Score of the input vector.
    pub initial_score: f32,
    /// Score of the solved vector.
    pub achieved_score: f32,
}

/// Full result of an inverse solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReverseMappingResult {
    /// Outcome name (joined with `+` for multi-objective solves).
    pub outcome: String,
    /// Whether the formula came from the keyword heuristic fallback.
    pub heuristic: bool,
    /// Desired score (weighted mean of targets for multi).
    pub target_value: f32,
    /// Score of the input vector.
    pub initial_score: f32,
    /// Score of the solved vector.
    pub achieved_score: f32,
    /// Final `|target - achieved|` (weighted RMS for multi).
    pub residual_error: f32,
    /// Gradient-descent iterations executed.
    pub iterations: usize,
    /// Whether the residual fell under tolerance.
    pub converged: bool,
    /// Whether the goal is reachable; false on cap-out.
    pub goal_achievable: bool,
    /// Probability of achieving the change set, `[0.1, 0.95]`.
    pub achievement_probability: f32,
    /// The solved required state with per-operator annotations.
    pub required: RequiredState,
    /// Required moves, sorted by impact; stabilize-band entries omitted.
    pub changes: Vec<OperatorChange>,
    /// Per-objective detail.
    pub objectives: Vec<ObjectiveReport>,
    /// Human-readable notes on how the solve went.
    pub diagnostics: Vec<String>,
}

/// The inverse solver. Stateless between calls; construct once per
/// engine and share.
#[derive(Debug, Clone)]
pub struct InverseSolver {
    config: SolverConfig,
}

impl InverseSolver {
    /// Create a solver from validated configuration.
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solve a single outcome target.
    pub fn solve(
        &self,
        registry: &OperatorRegistry,
        model: &dyn OutcomeModel,
        target: f32,
        current: &StateVector,
        bounds: Option<&SolverBounds>,
    ) -> EngineResult<ReverseMappingResult> {
        self.solve_weighted(registry, &[(model, target, 1.0)], current, bounds)
    }

    /// Solve several weighted outcome targets jointly, minimizing
    /// `sum(w_i * (f_i(x) - target_i)^2)` over the union of relevant
    /// operators.
    pub fn solve_weighted(
        &self,
        registry: &OperatorRegistry,
        objectives: &[(&dyn OutcomeModel, f32, f32)],
        current: &StateVector,
        bounds: Option<&SolverBounds>,
    ) -> EngineResult<ReverseMappingResult> {
        if objectives.is_empty() {
            return Err(EngineError::EmptyInput("no objectives to solve".into()));
        }
        for (_, target, weight) in objectives {
            if !(0.0..=1.0).contains(target) {
                return Err(EngineError::invalid_param(
                    "target",
                    target,
                    "must be in [0, 1]",
                ));
            }
            if *weight <= 0.0 {
                return Err(EngineError::invalid_param(
                    "weight",
                    weight,
                    "must be > 0",
                ));
            }
        }

        // Union of relevant operators, checked for presence up front so
        // a sparse vector fails the whole solve with the full list.
        let mut relevant: Vec<String> = Vec::new();
        for (model, _, _) in objectives {
            for op in model.relevant_operators() {
                if !relevant.contains(op) {
                    relevant.push(op.clone());
                }
            }
        }
        let names: Vec<&str> = relevant.iter().map(String::as_str).collect();
        current.require(&names).map_err(EngineError::from)?;

        let total_weight: f32 = objectives.iter().map(|(_, _, w)| w).sum();
        let initial_scores = self.score_all(objectives, current)?;
        let initial_score = weighted_mean(objectives, &initial_scores, total_weight);

        let mut working = current.clone();
        let mut iterations = 0usize;
        let mut converged = false;

        loop {
            let scores = self.score_all(objectives, &working)?;
            let residual = weighted_rms_error(objectives, &scores, total_weight);
            if residual < self.config.tolerance {
                converged = true;
                break;
            }
            if iterations >= self.config.max_iterations {
                break;
            }

            let lr = self.config.learning_rate
                * self
                    .config
                    .decay_factor
                    .powi((iterations / self.config.decay_interval) as i32);

            let mut updates: Vec<(String, f32)> = Vec::with_capacity(relevant.len());
            for op in &relevant {
                let difficulty = registry.difficulty(op).unwrap_or(0.5);
                let damp = 1.0 - difficulty * self.config.difficulty_damping;

                let mut pull = 0.0f32;
                for (i, (model, target, weight)) in objectives.iter().enumerate() {
                    if !model.relevant_operators().iter().any(|r| r == op) {
                        continue;
                    }
                    let g = estimate_gradient(*model, &working, op, self.config.epsilon)?;
                    if g == 0.0 {
                        continue;
                    }
                    let error = target - scores[i];
                    pull += weight * error * g.signum() / (g.abs() + self.config.epsilon);
                }
                if pull == 0.0 {
                    continue;
                }
                let step = lr * pull / total_weight * damp;
                let old = working.get(op).unwrap_or(0.0);
                let mut new = clamp01(old + step);
                if let Some(b) = bounds {
                    new = b.apply(op, new);
                }
                if (new - old).abs() > f32::EPSILON {
                    updates.push((op.clone(), new));
                }
            }

            if updates.is_empty() {
                // Flat gradients or pinned bounds; nothing will move.
                break;
            }
            for (op, value) in updates {
                working = working.with(&op, value);
            }
            iterations += 1;
            trace!(iterations, residual, lr, "solver step");
        }

        let final_scores = self.score_all(objectives, &working)?;
        let achieved_score = weighted_mean(objectives, &final_scores, total_weight);
        let residual_error = weighted_rms_error(objectives, &final_scores, total_weight);

        // Project the solved values onto the relevant set only.
        let required_vector: StateVector = relevant
            .iter()
            .map(|op| (op.clone(), working.get(op).unwrap_or(0.0)))
            .collect();

        let all_changes = derive_changes(registry, current, &required_vector, DEFAULT_HOLD_BAND)?;
        let changes: Vec<OperatorChange> = all_changes
            .into_iter()
            .filter(|c| c.kind != ChangeKind::Stabilize)
            .collect();

        let details =
            self.requirement_details(registry, objectives, current, &working, &relevant)?;
        let required = RequiredState::new(required_vector, details);

        let load: f32 = changes.iter().map(OperatorChange::weighted_magnitude).sum();
        let achievement_probability = if converged {
            (self.config.max_probability * (-self.config.probability_falloff * load).exp())
                .clamp(self.config.min_probability, self.config.max_probability)
        } else {
            self.config.min_probability
        };

        let mut diagnostics = Vec::new();
        if converged {
            diagnostics.push(format!(
                "converged in {} iterations with residual {:.4}",
                iterations, residual_error
            ));
        } else {
            diagnostics.push(format!(
                "did not converge: residual {:.4} after {} iterations",
                residual_error, iterations
            ));
        }
        if changes.is_empty() && converged {
            diagnostics.push("current state already satisfies the target".to_string());
        }

        let outcome = objectives
            .iter()
            .map(|(m, _, _)| m.name())
            .collect::<Vec<_>>()
            .join("+");
        let target_value = objectives
            .iter()
            .map(|(_, t, w)| t * w)
            .sum::<f32>()
            / total_weight;

        debug!(
            outcome = %outcome,
            converged,
            iterations,
            changes = changes.len(),
            probability = achievement_probability,
            "inverse solve finished"
        );

        let objectives_report = objectives
            .iter()
            .enumerate()
            .map(|(i, (model, target, _))| ObjectiveReport {
                outcome: model.name().to_string(),
                target_value: *target,
                initial_score: initial_scores[i],
                achieved_score: final_scores[i],
            })
            .collect();

        Ok(ReverseMappingResult {
            outcome,
            heuristic: false,
            target_value,
            initial_score,
            achieved_score,
            residual_error,
            iterations,
            converged,
            goal_achievable: converged,
            achievement_probability,
            required,
            changes,
            objectives: objectives_report,
            diagnostics,
        })
    }

    fn score_all(
        &self,
        objectives: &[(&dyn OutcomeModel, f32, f32)],
        vector: &StateVector,
    ) -> EngineResult<Vec<f32>> {
        objectives
            .iter()
            .map(|(model, _, _)| model.evaluate(vector).map_err(EngineError::from))
            .collect()
    }

    fn requirement_details(
        &self,
        registry: &OperatorRegistry,
        objectives: &[(&dyn OutcomeModel, f32, f32)],
        current: &StateVector,
        working: &StateVector,
        relevant: &[String],
    ) -> EngineResult<BTreeMap<String, RequirementDetail>> {
        let mut details = BTreeMap::new();
        for op in relevant {
            let difficulty = registry.difficulty(op).unwrap_or(0.5);
            let mut g_abs = 0.0f32;
            for (model, _, weight) in objectives {
                if model.relevant_operators().iter().any(|r| r == op) {
                    g_abs +=
                        weight * estimate_gradient(*model, working, op, self.config.epsilon)?.abs();
                }
            }
            let strength = (g_abs / self.config.epsilon).min(1.0);
            let confidence = clamp01((0.5 + 0.5 * strength) * (1.0 - 0.3 * difficulty));
            let flexibility =
                clamp01(self.config.base_flexibility + 0.1 * (1.0 - confidence));
            details.insert(
                op.clone(),
                RequirementDetail {
                    confidence,
                    flexibility,
                    priority: 0,
                },
            );
        }

        // Priority rank: largest required move first.
        let mut ranked: Vec<(String, f32)> = relevant
            .iter()
            .map(|op| {
                let moved = (working.get(op).unwrap_or(0.0)
                    - current.get(op).unwrap_or(0.0))
                .abs();
                (op.clone(), moved)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        for (rank, (op, _)) in ranked.iter().enumerate() {
            if let Some(d) = details.get_mut(op) {
                d.priority = rank + 1;
            }
        }
        Ok(details)
    }
}

fn weighted_mean(
    objectives: &[(&dyn OutcomeModel, f32, f32)],
    scores: &[f32],
    total_weight: f32,
) -> f32 {
    objectives
        .iter()
        .zip(scores)
        .map(|((_, _, w), s)| w * s)
        .sum::<f32>()
        / total_weight
}

fn weighted_rms_error(
    objectives: &[(&dyn OutcomeModel, f32, f32)],
    scores: &[f32],
    total_weight: f32,
) -> f32 {
    let sum: f32 = objectives
        .iter()
        .zip(scores)
        .map(|((_, target, w), s)| {
            let e = target - s;
            w * e * e
        })
        .sum();
    (sum / total_weight).sqrt()
}
