//! Stage assessment and sequencing over the dissolution DAG.

use serde::{Deserialize, Serialize};
use tracing::debug;

use metanoia_core::{clamp01, StateVector};

use crate::config::SequencerConfig;
use crate::error::{EngineError, EngineResult};

use super::dag::{stage, topological_order, StagePhase, PARALLEL_PAIRS, STAGES};

/// Operators whose current values aggregate into the resilience score
/// used by duration and intensity estimates.
const RESILIENCE_OPS: &[&str] = &["Re_resilience", "Gd_grounding", "Eq_equanimity"];

/// Assessment of one stage against `(current, required)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageStatus {
    /// Stage id, 1-7.
    pub stage_id: u8,
    /// Stage name.
    pub name: String,
    /// Current completion, `[0, 1]`.
    pub completion: f32,
    /// Completion the required state asks for, `[0, 1]`.
    pub required_completion: f32,
    /// `required_completion - completion`.
    pub gap: f32,
    /// Whether the gap exceeds the work threshold.
    pub required: bool,
    /// Phase bucket of the current completion.
    pub phase: StagePhase,
    /// Prerequisite stage ids.
    pub prerequisites: Vec<u8>,
    /// True while any prerequisite's completion is below that
    /// prerequisite's own required completion.
    pub blocking: bool,
}

/// The full sequencing result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageSequence {
    /// Every stage's status, in id order.
    pub statuses: Vec<StageStatus>,
    /// Required stage ids in DAG topological order.
    pub ordered_required: Vec<u8>,
    /// Required, unblocked pairs eligible to run in parallel.
    pub parallel_groups: Vec<(u8, u8)>,
    /// The deepest required stage id, if any work is required.
    pub deepest_required: Option<u8>,
    /// Void tolerance demanded by the deepest required stage; 0 when no
    /// stage is required.
    pub void_tolerance_required: f32,
    /// Mean of resilience/grounding/equanimity, when all are present.
    pub resilience: Option<f32>,
    /// Gap-weighted duration estimate across required stages, weeks.
    pub estimated_duration_weeks: f32,
    /// Expected intensity of the process, `[0, 1]`.
    pub intensity: f32,
}

/// Assesses and sequences the seven stages.
#[derive(Debug, Clone)]
pub struct StageSequencer {
    config: SequencerConfig,
}

impl StageSequencer {
    /// Create a sequencer.
    pub fn new(config: SequencerConfig) -> Self {
        Self { config }
    }

    /// Completion of one stage for a vector, or a missing-input error
    /// naming the absent indicator.
    pub fn assess(&self, stage_id: u8, vector: &StateVector) -> EngineResult<f32> {
        let def = stage(stage_id).ok_or_else(|| {
            EngineError::invalid_param("stage_id", stage_id, "must be 1-7")
        })?;
        let value = vector
            .get(def.indicator)
            .ok_or_else(|| EngineError::missing([def.indicator]))?;
        Ok(def.completion_of(value))
    }

    /// Sequence the full process for a `(current, required)` pair.
    ///
    /// Fails with the complete list of missing indicator operators when
    /// `current` cannot be assessed. A stage whose indicator is absent
    /// from `required` simply has nothing demanded of it.
    pub fn sequence(
        &self,
        current: &StateVector,
        required: &StateVector,
    ) -> EngineResult<StageSequence> {
        let missing: Vec<&str> = STAGES
            .iter()
            .map(|def| def.indicator)
            .filter(|op| current.get(op).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::missing(missing));
        }

        // First pass: completions and demands.
        let mut statuses: Vec<StageStatus> = STAGES
            .iter()
            .map(|def| {
                let value = current.get(def.indicator).expect("checked above");
                let completion = def.completion_of(value);
                let required_completion = required
                    .get(def.indicator)
                    .map(|v| def.completion_of(v))
                    .unwrap_or(completion);
                let gap = required_completion - completion;
                StageStatus {
                    stage_id: def.id,
                    name: def.name.to_string(),
                    completion,
                    required_completion,
                    gap,
                    required: gap > self.config.gap_threshold,
                    phase: StagePhase::from_completion(completion),
                    prerequisites: def.prerequisites.to_vec(),
                    blocking: false,
                }
            })
            .collect();

        // Second pass: a stage is blocked while any prerequisite sits
        // below its own required completion.
        let snapshot: Vec<(u8, f32, f32)> = statuses
            .iter()
            .map(|s| (s.stage_id, s.completion, s.required_completion))
            .collect();
        for status in &mut statuses {
            status.blocking = status.prerequisites.iter().any(|p| {
                snapshot
                    .iter()
                    .find(|(id, _, _)| id == p)
                    .map(|(_, completion, required_completion)| completion < required_completion)
                    .unwrap_or(false)
            });
        }

        let ordered_required: Vec<u8> = topological_order()
            .into_iter()
            .filter(|id| {
                statuses
                    .iter()
                    .any(|s| s.stage_id == *id && s.required)
            })
            .collect();

        let parallel_groups: Vec<(u8, u8)> = PARALLEL_PAIRS
            .into_iter()
            .filter(|(a, b)| {
                let find = |id: u8| statuses.iter().find(|s| s.stage_id == id);
                match (find(*a), find(*b)) {
                    (Some(sa), Some(sb)) => {
                        sa.required && sb.required && !sa.blocking && !sb.blocking
                    }
                    _ => false,
                }
            })
            .collect();

        let deepest_required = ordered_required.iter().copied().max();
        let void_tolerance_required = deepest_required
            .and_then(stage)
            .map(|def| def.void_tolerance)
            .unwrap_or(0.0);

        let resilience = {
            let values: Vec<f32> = RESILIENCE_OPS
                .iter()
                .filter_map(|op| current.get(op))
                .collect();
            if values.len() == RESILIENCE_OPS.len() {
                Some(values.iter().sum::<f32>() / values.len() as f32)
            } else {
                None
            }
        };

        // Gap-weighted heuristics; the resilience factor applies only
        // when the aggregate is computable.
        let resilience_factor = resilience.map(|r| 1.5 - 0.5 * r).unwrap_or(1.0);
        let estimated_duration_weeks: f32 = statuses
            .iter()
            .filter(|s| s.required)
            .map(|s| self.config.base_stage_weeks * (0.5 + s.gap) * resilience_factor)
            .sum();

        let mean_gap = if ordered_required.is_empty() {
            0.0
        } else {
            statuses
                .iter()
                .filter(|s| s.required)
                .map(|s| s.gap)
                .sum::<f32>()
                / ordered_required.len() as f32
        };
        let depth_factor = deepest_required.map(|d| d as f32 / 7.0).unwrap_or(0.0);
        let mut intensity = clamp01(mean_gap + 0.3 * depth_factor);
        if let Some(r) = resilience {
            intensity = clamp01(intensity * (1.3 - 0.6 * r));
        }

        debug!(
            required = ordered_required.len(),
            ?deepest_required,
            intensity,
            "stage sequencing finished"
        );

        Ok(StageSequence {
            statuses,
            ordered_required,
            parallel_groups,
            deepest_required,
            void_tolerance_required,
            resilience,
            estimated_duration_weeks,
            intensity,
        })
    }
}
