//! Pathway ranking across five dimensions.
//!
//! Each dimension scorer returns `Option<f32>` plus a description. A
//! `None` score contributes **0** to the weighted total. This is the one
//! deliberate exception to the engine-wide rule of excluding missing
//! data from aggregates: a ranking weight is a preference, not a factual
//! claim, and an unscorable dimension should cost a pathway standing
//! rather than be silently forgiven.

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use metanoia_core::clamp01;

use crate::config::OptimizerConfig;
use crate::error::{EngineError, EngineResult};
use crate::pathway::{StrategyKind, TransformationPathway};

/// The five ranking dimensions, in weight order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    /// Shorter total duration scores higher.
    Speed,
    /// Archetype stability.
    Stability,
    /// Lower demanded effort scores higher.
    Effort,
    /// Fewer expected side effects score higher.
    SideEffects,
    /// Estimated completion probability.
    Success,
}

impl DimensionKind {
    /// All dimensions in weight order.
    pub fn all() -> [DimensionKind; 5] {
        [
            DimensionKind::Speed,
            DimensionKind::Stability,
            DimensionKind::Effort,
            DimensionKind::SideEffects,
            DimensionKind::Success,
        ]
    }
}

/// One dimension's verdict on one pathway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionScore {
    /// Which dimension.
    pub kind: DimensionKind,
    /// Score in `[0, 1]`, or `None` when unscorable.
    pub score: Option<f32>,
    /// Why the score is what it is.
    pub description: String,
}

/// A ranked pathway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayScore {
    /// The scored pathway's id.
    pub pathway_id: Uuid,
    /// Its archetype.
    pub strategy: StrategyKind,
    /// Per-dimension scores.
    pub dimensions: Vec<DimensionScore>,
    /// Weighted total, `[0, 1]`.
    pub total: f32,
    /// `100 * (N - rank) / N`.
    pub percentile: f32,
    /// Trade-off narrative lines.
    pub trade_offs: Vec<String>,
}

impl PathwayScore {
    fn dimension(&self, kind: DimensionKind) -> Option<f32> {
        self.dimensions
            .iter()
            .find(|d| d.kind == kind)
            .and_then(|d| d.score)
    }
}

/// Result of ranking a pathway set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// All pathways, best total first.
    pub scores: Vec<PathwayScore>,
    /// The top-ranked pathway.
    pub recommended: Uuid,
    /// Best in the speed dimension.
    pub fastest: Uuid,
    /// Best in the stability dimension.
    pub most_stable: Uuid,
    /// Best in the (inverted) effort dimension.
    pub lowest_effort: Uuid,
}

/// Ranks generated pathways.
#[derive(Debug, Clone)]
pub struct PathwayOptimizer {
    config: OptimizerConfig,
}

impl PathwayOptimizer {
    /// Create an optimizer with the given weights.
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    /// Rank with the configured weights.
    pub fn optimize(
        &self,
        pathways: &[TransformationPathway],
    ) -> EngineResult<OptimizationResult> {
        self.optimize_weighted(pathways, &self.config)
    }

    /// Rank with caller-supplied weights (renormalized internally).
    pub fn optimize_weighted(
        &self,
        pathways: &[TransformationPathway],
        weights: &OptimizerConfig,
    ) -> EngineResult<OptimizationResult> {
        if pathways.is_empty() {
            return Err(EngineError::EmptyInput("no pathways to rank".into()));
        }
        weights.validate().map_err(EngineError::Config)?;
        let w = weights.normalized_weights();

        let mut scores: Vec<PathwayScore> = pathways
            .iter()
            .map(|p| self.score_pathway(p, &w))
            .collect();
        scores.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let n = scores.len() as f32;
        for (rank, score) in scores.iter_mut().enumerate() {
            score.percentile = 100.0 * (n - (rank + 1) as f32) / n;
        }

        let best_in = |kind: DimensionKind| {
            scores
                .iter()
                .max_by(|a, b| {
                    a.dimension(kind)
                        .unwrap_or(0.0)
                        .partial_cmp(&b.dimension(kind).unwrap_or(0.0))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|s| s.pathway_id)
                .expect("non-empty scores")
        };

        let result = OptimizationResult {
            recommended: scores[0].pathway_id,
            fastest: best_in(DimensionKind::Speed),
            most_stable: best_in(DimensionKind::Stability),
            lowest_effort: best_in(DimensionKind::Effort),
            scores,
        };
        debug!(
            recommended = %result.recommended,
            ranked = result.scores.len(),
            "pathway optimization finished"
        );
        Ok(result)
    }

    fn score_pathway(&self, pathway: &TransformationPathway, weights: &[f32; 5]) -> PathwayScore {
        let dimensions = vec![
            self.score_speed(pathway),
            self.score_stability(pathway),
            self.score_effort(pathway),
            self.score_side_effects(pathway),
            self.score_success(pathway),
        ];

        // None contributes 0, per the module contract.
        let total = clamp01(
            dimensions
                .iter()
                .zip(weights)
                .map(|(d, w)| w * d.score.unwrap_or(0.0))
                .sum(),
        );

        let trade_offs = self.trade_offs(pathway, &dimensions);

        PathwayScore {
            pathway_id: pathway.id,
            strategy: pathway.strategy,
            dimensions,
            total,
            percentile: 0.0,
            trade_offs,
        }
    }

    fn score_speed(&self, pathway: &TransformationPathway) -> DimensionScore {
        if pathway.steps.is_empty() {
            return DimensionScore {
                kind: DimensionKind::Speed,
                score: None,
                description: "no steps; duration cannot be estimated".to_string(),
            };
        }
        let weeks = pathway.total_duration_weeks();
        let score = clamp01(1.0 - weeks / 52.0);
        DimensionScore {
            kind: DimensionKind::Speed,
            score: Some(score),
            description: format!("estimated {weeks:.0} weeks end to end"),
        }
    }

    fn score_stability(&self, pathway: &TransformationPathway) -> DimensionScore {
        DimensionScore {
            kind: DimensionKind::Stability,
            score: Some(clamp01(pathway.stability)),
            description: format!("archetype stability {:.2}", pathway.stability),
        }
    }

    fn score_effort(&self, pathway: &TransformationPathway) -> DimensionScore {
        let score = clamp01(1.0 - pathway.effort);
        DimensionScore {
            kind: DimensionKind::Effort,
            score: Some(score),
            description: format!("demands sustained effort of {:.2}", pathway.effort),
        }
    }

    fn score_side_effects(&self, pathway: &TransformationPathway) -> DimensionScore {
        let count = pathway.side_effects.len();
        DimensionScore {
            kind: DimensionKind::SideEffects,
            score: Some(clamp01(1.0 - count as f32 / 4.0)),
            description: if count == 0 {
                "no notable side effects expected".to_string()
            } else {
                format!("{count} expected side effects")
            },
        }
    }

    fn score_success(&self, pathway: &TransformationPathway) -> DimensionScore {
        DimensionScore {
            kind: DimensionKind::Success,
            score: Some(clamp01(pathway.success_probability)),
            description: format!(
                "completion probability {:.2}",
                pathway.success_probability
            ),
        }
    }

    fn trade_offs(
        &self,
        pathway: &TransformationPathway,
        dimensions: &[DimensionScore],
    ) -> Vec<String> {
        let get = |kind: DimensionKind| {
            dimensions
                .iter()
                .find(|d| d.kind == kind)
                .and_then(|d| d.score)
        };
        let mut lines = vec![format!(
            "{} pathway: {}",
            pathway.strategy,
            pathway.strategy.description()
        )];
        if let Some(speed) = get(DimensionKind::Speed) {
            if speed < 0.3 {
                lines.push("slow: most of a year before the full shift lands".to_string());
            } else if speed > 0.8 {
                lines.push("fast, at the cost of consolidation time".to_string());
            }
        }
        if let Some(stability) = get(DimensionKind::Stability) {
            if stability < 0.5 {
                lines.push("expect turbulence between steps".to_string());
            }
        }
        if let Some(effort) = get(DimensionKind::Effort) {
            if effort < 0.2 {
                lines.push("demands near-daily deliberate effort throughout".to_string());
            }
        }
        if pathway.grace_dependency > 0.7 {
            lines.push("outcome timing rests on receptive conditions".to_string());
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathwayConfig;
    use crate::pathway::PathwayGenerator;
    use metanoia_core::{OperatorRegistry, StateVector};

    fn pathways() -> Vec<TransformationPathway> {
        let registry = OperatorRegistry::builtin();
        let current = registry.default_vector();
        let required = StateVector::new()
            .with("W_witness", 0.7)
            .with("S_surrender", 0.75)
            .with("Eq_equanimity", 0.6)
            .with("At_attachment", 0.35);
        PathwayGenerator::new(PathwayConfig::default(), registry)
            .generate(&current, &required, 3.0, 4.0, 5)
            .unwrap()
    }

    fn optimizer() -> PathwayOptimizer {
        PathwayOptimizer::new(OptimizerConfig::default())
    }

    #[test]
    fn test_ranking_sorted_descending() {
        let result = optimizer().optimize(&pathways()).unwrap();
        for pair in result.scores.windows(2) {
            assert!(pair[0].total >= pair[1].total);
        }
        assert_eq!(result.recommended, result.scores[0].pathway_id);
    }

    #[test]
    fn test_percentiles() {
        let result = optimizer().optimize(&pathways()).unwrap();
        let n = result.scores.len() as f32;
        assert!((result.scores[0].percentile - 100.0 * (n - 1.0) / n).abs() < 1e-4);
        assert_eq!(result.scores.last().unwrap().percentile, 0.0);
    }

    #[test]
    fn test_totals_in_range() {
        let result = optimizer().optimize(&pathways()).unwrap();
        for score in &result.scores {
            assert!((0.0..=1.0).contains(&score.total));
            for d in &score.dimensions {
                if let Some(s) = d.score {
                    assert!((0.0..=1.0).contains(&s));
                }
            }
        }
    }

    #[test]
    fn test_alternates_surfaced() {
        let result = optimizer().optimize(&pathways()).unwrap();
        let stable = result
            .scores
            .iter()
            .find(|s| s.pathway_id == result.most_stable)
            .unwrap();
        // Gradual has the highest archetype stability.
        assert_eq!(stable.strategy, StrategyKind::Gradual);

        let easy = result
            .scores
            .iter()
            .find(|s| s.pathway_id == result.lowest_effort)
            .unwrap();
        assert_eq!(easy.strategy, StrategyKind::Grace);
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = optimizer().optimize(&[]).unwrap_err();
        assert!(matches!(err, EngineError::EmptyInput(_)));
    }

    #[test]
    fn test_missing_dimension_contributes_zero() {
        let mut set = pathways();
        // Strip the steps from one pathway: its speed dimension becomes
        // unscorable and must drag the total down, not default to 0.5.
        let crippled_id = set[0].id;
        set[0].steps.clear();
        let result = optimizer().optimize(&set).unwrap();
        let crippled = result
            .scores
            .iter()
            .find(|s| s.pathway_id == crippled_id)
            .unwrap();
        let speed = crippled
            .dimensions
            .iter()
            .find(|d| d.kind == DimensionKind::Speed)
            .unwrap();
        assert!(speed.score.is_none());

        // Recompute what the total would be with speed at 0.
        let w = OptimizerConfig::default().normalized_weights();
        let manual: f32 = crippled
            .dimensions
            .iter()
            .zip(&w)
            .map(|(d, w)| w * d.score.unwrap_or(0.0))
            .sum();
        assert!((crippled.total - clamp01(manual)).abs() < 1e-6);
    }

    #[test]
    fn test_weight_override_changes_ranking() {
        let set = pathways();
        let speed_obsessed = OptimizerConfig {
            speed_weight: 10.0,
            stability_weight: 0.0,
            effort_weight: 0.0,
            side_effect_weight: 0.0,
            success_weight: 0.0,
        };
        let speed_result = optimizer()
            .optimize_weighted(&set, &speed_obsessed)
            .unwrap();
        assert_eq!(speed_result.recommended, speed_result.fastest);
    }

    #[test]
    fn test_trade_offs_mention_strategy() {
        let result = optimizer().optimize(&pathways()).unwrap();
        for score in &result.scores {
            assert!(!score.trade_offs.is_empty());
            assert!(score.trade_offs[0].contains(&format!("{}", score.strategy)));
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let result = optimizer().optimize(&pathways()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: OptimizationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.recommended, result.recommended);
        assert_eq!(back.scores.len(), result.scores.len());
    }
}
