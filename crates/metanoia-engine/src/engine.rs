//! The engine facade: one explicitly-constructed service object wiring
//! every planning component from a single validated configuration.
//!
//! Nothing here is process-global. Build one engine per configuration
//! (construction is cheap), share it by reference, and call it from as
//! many threads as you like; every operation is a pure function of its
//! inputs.

use tracing::debug;

use metanoia_core::{
    OperatorRegistry, OutcomeCatalog, OutcomeModel, OutcomeTarget, StateVector,
};

use crate::coherence::{CoherenceReport, CoherenceValidator};
use crate::config::{EngineConfig, OptimizerConfig};
use crate::constraints::{ConstraintChecker, ConstraintReport};
use crate::error::{EngineError, EngineResult};
use crate::mvt::{MvtCalculator, MvtResult};
use crate::optimizer::{OptimizationResult, PathwayOptimizer};
use crate::pathway::{PathwayGenerator, TransformationPathway};
use crate::solver::{InverseSolver, ReverseMappingResult, SolverBounds};
use crate::stages::{StageSequence, StageSequencer};

/// The planning engine.
///
/// # Example
///
/// ```
/// use metanoia_engine::TransformationEngine;
/// use metanoia_core::OperatorRegistry;
///
/// let engine = TransformationEngine::with_defaults();
/// let current = OperatorRegistry::builtin().default_vector();
///
/// let result = engine.solve("inner_peace", 0.7, &current, None).unwrap();
/// assert!(result.goal_achievable);
/// assert!(!result.heuristic);
/// ```
#[derive(Debug)]
pub struct TransformationEngine {
    config: EngineConfig,
    registry: OperatorRegistry,
    catalog: OutcomeCatalog,
    solver: InverseSolver,
    checker: ConstraintChecker,
    coherence: CoherenceValidator,
    generator: PathwayGenerator,
    optimizer: PathwayOptimizer,
    sequencer: StageSequencer,
    mvt: MvtCalculator,
}

impl TransformationEngine {
    /// Create an engine, panicking on invalid configuration. Use
    /// [`try_new`](Self::try_new) for fallible construction.
    pub fn new(config: EngineConfig) -> Self {
        config.validate().expect("EngineConfig validation failed");
        Self::assemble(config, OperatorRegistry::builtin(), OutcomeCatalog::builtin())
    }

    /// Try to create an engine, returning an error if the configuration
    /// is invalid.
    pub fn try_new(config: EngineConfig) -> EngineResult<Self> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self::assemble(
            config,
            OperatorRegistry::builtin(),
            OutcomeCatalog::builtin(),
        ))
    }

    /// Create with default configuration, the built-in operator
    /// alphabet and the built-in outcome catalog.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Dependency-injecting constructor for callers that bring their
    /// own catalog (extra registered outcomes) or registry.
    pub fn with_parts(
        config: EngineConfig,
        registry: OperatorRegistry,
        catalog: OutcomeCatalog,
    ) -> EngineResult<Self> {
        config.validate().map_err(EngineError::Config)?;
        Ok(Self::assemble(config, registry, catalog))
    }

    fn assemble(
        config: EngineConfig,
        registry: OperatorRegistry,
        catalog: OutcomeCatalog,
    ) -> Self {
        let coherence =
            CoherenceValidator::new(config.coherence.clone(), registry.clone());
        Self {
            solver: InverseSolver::new(config.solver.clone()),
            checker: ConstraintChecker::new(
                config.constraints.clone(),
                registry.clone(),
                coherence.clone(),
            ),
            generator: PathwayGenerator::new(config.pathway.clone(), registry.clone()),
            optimizer: PathwayOptimizer::new(config.optimizer.clone()),
            sequencer: StageSequencer::new(config.sequencer.clone()),
            mvt: MvtCalculator::new(config.mvt.clone(), registry.clone()),
            coherence,
            catalog,
            registry,
            config,
        }
    }

    /// The operator registry this engine computes over.
    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    /// The outcome catalog.
    pub fn catalog(&self) -> &OutcomeCatalog {
        &self.catalog
    }

    /// Register (or replace) an outcome model.
    pub fn register_outcome(&mut self, model: Box<dyn OutcomeModel>) {
        self.catalog.register(model);
    }

    /// Solve a single outcome target.
    ///
    /// Unregistered names resolve through the keyword heuristic when
    /// configuration allows; the result is then flagged
    /// `heuristic = true`.
    pub fn solve(
        &self,
        outcome: &str,
        target: f32,
        current: &StateVector,
        bounds: Option<&SolverBounds>,
    ) -> EngineResult<ReverseMappingResult> {
        let resolved = self.catalog.resolve(
            outcome,
            &self.registry,
            self.config.allow_heuristic_outcomes,
        )?;
        let mut result =
            self.solver
                .solve(&self.registry, resolved.model(), target, current, bounds)?;
        result.heuristic = resolved.is_heuristic();
        debug!(outcome, heuristic = result.heuristic, "engine solve");
        Ok(result)
    }

    /// Solve several weighted targets jointly.
    pub fn solve_targets(
        &self,
        targets: &[OutcomeTarget],
        current: &StateVector,
        bounds: Option<&SolverBounds>,
    ) -> EngineResult<ReverseMappingResult> {
        if targets.is_empty() {
            return Err(EngineError::EmptyInput("no outcome targets".into()));
        }
        for target in targets {
            target.validate()?;
        }
        let resolved: Vec<_> = targets
            .iter()
            .map(|t| {
                self.catalog.resolve(
                    &t.outcome,
                    &self.registry,
                    self.config.allow_heuristic_outcomes,
                )
            })
            .collect::<Result<_, _>>()?;
        let objectives: Vec<(&dyn OutcomeModel, f32, f32)> = resolved
            .iter()
            .zip(targets)
            .map(|(r, t)| (r.model(), t.target_value, t.weight))
            .collect();
        let mut result = self
            .solver
            .solve_weighted(&self.registry, &objectives, current, bounds)?;
        result.heuristic = resolved.iter().any(|r| r.is_heuristic());
        Ok(result)
    }

    /// Generate up to `n` strategy-specific pathways for a gap.
    pub fn generate_pathways(
        &self,
        current: &StateVector,
        required: &StateVector,
        current_level: f32,
        target_level: f32,
        n: usize,
    ) -> EngineResult<Vec<TransformationPathway>> {
        self.generator
            .generate(current, required, current_level, target_level, n)
    }

    /// Rank pathways; pass `weights` to override the configured blend.
    pub fn optimize_pathways(
        &self,
        pathways: &[TransformationPathway],
        weights: Option<&OptimizerConfig>,
    ) -> EngineResult<OptimizationResult> {
        match weights {
            Some(w) => self.optimizer.optimize_weighted(pathways, w),
            None => self.optimizer.optimize(pathways),
        }
    }

    /// Run the seven feasibility checks.
    pub fn check_constraints(
        &self,
        current: &StateVector,
        required: &StateVector,
        current_level: f32,
        target_level: f32,
    ) -> ConstraintReport {
        self.checker
            .check(current, required, current_level, target_level)
    }

    /// Validate the internal consistency of a vector at a level.
    pub fn validate_coherence(&self, vector: &StateVector, level: f32) -> CoherenceReport {
        self.coherence.validate(vector, level)
    }

    /// Sequence the seven-stage process for a `(current, required)` pair.
    pub fn sequence_stages(
        &self,
        current: &StateVector,
        required: &StateVector,
    ) -> EngineResult<StageSequence> {
        self.sequencer.sequence(current, required)
    }

    /// Compute the minimum viable transformation, at most `max_ops`
    /// direct changes (0 = configured default).
    pub fn compute_mvt(
        &self,
        current: &StateVector,
        required: &StateVector,
        max_ops: usize,
    ) -> EngineResult<MvtResult> {
        self.mvt.compute(current, required, max_ops)
    }
}

impl Default for TransformationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
