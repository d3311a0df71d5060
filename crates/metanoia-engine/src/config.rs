//! Engine configuration types.
//!
//! Every numeric knob the planning components use lives here rather than
//! as a literal in the algorithms: solver epsilon/iteration cap/tolerance
//! and learning-rate schedule, constraint thresholds and level tables,
//! coherence dimension weights, pathway pacing, optimizer dimension
//! weights, stage gap threshold, MVT selection thresholds.
//!
//! # Model Reference
//!
//! Defaults reproduce the reference behavior: tolerance 0.01, iteration
//! cap 120, learning-rate decay x0.9 every 10 iterations, level-jump
//! limit 1.5, coherence threshold 0.85, optimizer weights
//! 0.20/0.25/0.15/0.15/0.25.

use serde::{Deserialize, Serialize};

/// Number of discretized development levels covered by level tables.
const LEVELS: usize = 8;

/// Top-level configuration aggregating all component settings.
///
/// # Example
///
/// ```
/// use metanoia_engine::config::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert!(config.validate().is_ok());
/// assert!(config.solver.tolerance > 0.0);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Inverse solver settings.
    pub solver: SolverConfig,

    /// Feasibility constraint settings.
    pub constraints: ConstraintConfig,

    /// Coherence validation settings.
    pub coherence: CoherenceConfig,

    /// Pathway generation settings.
    pub pathway: PathwayConfig,

    /// Pathway ranking settings.
    pub optimizer: OptimizerConfig,

    /// Stage sequencing settings.
    pub sequencer: SequencerConfig,

    /// Minimum-viable-transformation settings.
    pub mvt: MvtConfig,

    /// Whether an unregistered outcome name may resolve through the
    /// keyword heuristic. The result is always flagged so callers can
    /// tell it apart from a registered formula.
    #[serde(default = "default_true")]
    pub allow_heuristic_outcomes: bool,
}

fn default_true() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            constraints: ConstraintConfig::default(),
            coherence: CoherenceConfig::default(),
            pathway: PathwayConfig::default(),
            optimizer: OptimizerConfig::default(),
            sequencer: SequencerConfig::default(),
            mvt: MvtConfig::default(),
            allow_heuristic_outcomes: true,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset that holds the subject back from aggressive plans:
    /// stricter load and energy thresholds, earlier warnings.
    pub fn cautious_preset() -> Self {
        Self {
            constraints: ConstraintConfig {
                load_mean_delta_warning: 0.20,
                energy_reserve: 0.40,
                ..Default::default()
            },
            pathway: PathwayConfig {
                max_steps: 10,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Preset for supervised intensive work: a longer solver leash and
    /// more flexible change limits.
    pub fn accelerated_preset() -> Self {
        Self {
            solver: SolverConfig {
                max_iterations: 150,
                learning_rate: 0.4,
                ..Default::default()
            },
            constraints: ConstraintConfig {
                flexibility_bonus: 0.15,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Validate the whole configuration.
    pub fn validate(&self) -> Result<(), String> {
        self.solver.validate()?;
        self.constraints.validate()?;
        self.coherence.validate()?;
        self.pathway.validate()?;
        self.optimizer.validate()?;
        self.sequencer.validate()?;
        self.mvt.validate()?;
        Ok(())
    }
}

/// Inverse solver settings.
///
/// The solver runs bounded finite-difference gradient descent; every
/// stopping and pacing rule is a field here so behavior can be tuned
/// without touching the loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Finite-difference step for gradient estimation.
    /// Range: `(0, 0.1]`
    pub epsilon: f32,

    /// Iteration cap. Range: `[10, 500]`, reference band 100-150.
    pub max_iterations: usize,

    /// Convergence tolerance on `|target - f(x)|`.
    /// Range: `(0, 0.1]`
    pub tolerance: f32,

    /// Initial learning rate. Range: `(0, 1]`
    pub learning_rate: f32,

    /// Multiplicative learning-rate decay. Range: `(0, 1]`
    pub decay_factor: f32,

    /// Iterations between decay applications.
    pub decay_interval: usize,

    /// Difficulty damping coefficient `k`: the per-operator effective
    /// rate is scaled by `1 - difficulty * k`. Range: `[0, 1]`
    pub difficulty_damping: f32,

    /// Floor for achievement probability.
    pub min_probability: f32,

    /// Ceiling for achievement probability.
    pub max_probability: f32,

    /// Decay rate of achievement probability per unit of
    /// difficulty-weighted change.
    pub probability_falloff: f32,

    /// Slack granted around each required value when the level table has
    /// no tighter answer.
    pub base_flexibility: f32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            max_iterations: 120,
            tolerance: 0.01,
            learning_rate: 0.3,
            decay_factor: 0.9,
            decay_interval: 10,
            difficulty_damping: 0.5,
            min_probability: 0.10,
            max_probability: 0.95,
            probability_falloff: 1.1,
            base_flexibility: 0.10,
        }
    }
}

impl SolverConfig {
    /// Validate the solver configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=0.1).contains(&self.epsilon) || self.epsilon == 0.0 {
            return Err(format!("epsilon must be in (0, 0.1], got {}", self.epsilon));
        }
        if !(10..=500).contains(&self.max_iterations) {
            return Err(format!(
                "max_iterations must be in [10, 500], got {}",
                self.max_iterations
            ));
        }
        if !(0.0..=0.1).contains(&self.tolerance) || self.tolerance == 0.0 {
            return Err(format!(
                "tolerance must be in (0, 0.1], got {}",
                self.tolerance
            ));
        }
        if !(0.0..=1.0).contains(&self.learning_rate) || self.learning_rate == 0.0 {
            return Err(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.decay_factor) || self.decay_factor == 0.0 {
            return Err(format!(
                "decay_factor must be in (0, 1], got {}",
                self.decay_factor
            ));
        }
        if self.decay_interval == 0 {
            return Err("decay_interval must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.difficulty_damping) {
            return Err(format!(
                "difficulty_damping must be in [0, 1], got {}",
                self.difficulty_damping
            ));
        }
        if self.min_probability < 0.0 || self.max_probability > 1.0 {
            return Err("probability bounds must lie in [0, 1]".to_string());
        }
        if self.min_probability >= self.max_probability {
            return Err(format!(
                "min_probability ({}) must be < max_probability ({})",
                self.min_probability, self.max_probability
            ));
        }
        if self.probability_falloff <= 0.0 {
            return Err(format!(
                "probability_falloff must be > 0, got {}",
                self.probability_falloff
            ));
        }
        if !(0.0..=0.5).contains(&self.base_flexibility) {
            return Err(format!(
                "base_flexibility must be in [0, 0.5], got {}",
                self.base_flexibility
            ));
        }
        Ok(())
    }
}

/// Feasibility constraint settings.
///
/// Each of the seven checks can be disabled individually; a disabled
/// check reports itself as skipped rather than silently passing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstraintConfig {
    /// Maximum allowed level gap per plan.
    pub max_level_jump: f32,

    /// Load value above which large average change is limited.
    pub load_threshold: f32,

    /// Mean |delta| that triggers a load warning under high load.
    pub load_mean_delta_warning: f32,

    /// Mean |delta| that becomes blocking under high load.
    pub load_mean_delta_blocking: f32,

    /// Per-level allowed maximum change magnitude, levels 1-8.
    pub flexibility_table: [f32; LEVELS],

    /// Extra allowance when resilience is established.
    pub flexibility_bonus: f32,

    /// Resilience needed to earn the flexibility bonus.
    pub flexibility_bonus_min_resilience: f32,

    /// Per-level collective-field binding coefficient, levels 1-8.
    /// High binding at low levels resists transpersonal change.
    pub binding_table: [f32; LEVELS],

    /// Minimum energy reserve (capacity minus demand) before warning.
    pub energy_reserve: f32,

    /// Pairwise-coherence score below which the check fails.
    pub coherence_threshold: f32,

    /// Required increase that counts as a "deep" demand for the
    /// prerequisite-ordering check.
    pub deep_increase_threshold: f32,

    /// Enable the max-level-jump check.
    pub check_level_jump: bool,
    /// Enable the load/capacity check.
    pub check_load: bool,
    /// Enable the flexibility check.
    pub check_flexibility: bool,
    /// Enable the collective-field check.
    pub check_field: bool,
    /// Enable the energy-sustainability check.
    pub check_energy: bool,
    /// Enable the pairwise-coherence check.
    pub check_coherence: bool,
    /// Enable the prerequisite-ordering check.
    pub check_prerequisites: bool,
}

impl Default for ConstraintConfig {
    fn default() -> Self {
        Self {
            max_level_jump: 1.5,
            load_threshold: 0.7,
            load_mean_delta_warning: 0.25,
            load_mean_delta_blocking: 0.40,
            flexibility_table: [0.15, 0.18, 0.22, 0.26, 0.30, 0.35, 0.42, 0.50],
            flexibility_bonus: 0.10,
            flexibility_bonus_min_resilience: 0.6,
            binding_table: [0.90, 0.85, 0.75, 0.65, 0.55, 0.45, 0.35, 0.25],
            energy_reserve: 0.30,
            coherence_threshold: 0.85,
            deep_increase_threshold: 0.10,
            check_level_jump: true,
            check_load: true,
            check_flexibility: true,
            check_field: true,
            check_energy: true,
            check_coherence: true,
            check_prerequisites: true,
        }
    }
}

impl ConstraintConfig {
    /// Allowed change magnitude at a level, without bonus.
    pub fn flexibility_for_level(&self, level: f32) -> f32 {
        let idx = (level.clamp(1.0, LEVELS as f32) as usize).saturating_sub(1);
        self.flexibility_table[idx.min(LEVELS - 1)]
    }

    /// Collective-field binding coefficient at a level.
    pub fn binding_for_level(&self, level: f32) -> f32 {
        let idx = (level.clamp(1.0, LEVELS as f32) as usize).saturating_sub(1);
        self.binding_table[idx.min(LEVELS - 1)]
    }

    /// Validate the constraint configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.5..=8.0).contains(&self.max_level_jump) {
            return Err(format!(
                "max_level_jump must be in [0.5, 8], got {}",
                self.max_level_jump
            ));
        }
        if !(0.0..=1.0).contains(&self.load_threshold) {
            return Err(format!(
                "load_threshold must be in [0, 1], got {}",
                self.load_threshold
            ));
        }
        if self.load_mean_delta_warning >= self.load_mean_delta_blocking {
            return Err(format!(
                "load warning level ({}) must be < blocking level ({})",
                self.load_mean_delta_warning, self.load_mean_delta_blocking
            ));
        }
        for (i, f) in self.flexibility_table.iter().enumerate() {
            if !(0.0..=1.0).contains(f) {
                return Err(format!("flexibility_table[{i}] must be in [0, 1], got {f}"));
            }
        }
        for (i, b) in self.binding_table.iter().enumerate() {
            if !(0.0..=1.0).contains(b) {
                return Err(format!("binding_table[{i}] must be in [0, 1], got {b}"));
            }
        }
        if !(0.0..=0.5).contains(&self.flexibility_bonus) {
            return Err(format!(
                "flexibility_bonus must be in [0, 0.5], got {}",
                self.flexibility_bonus
            ));
        }
        if !(0.0..=1.0).contains(&self.energy_reserve) {
            return Err(format!(
                "energy_reserve must be in [0, 1], got {}",
                self.energy_reserve
            ));
        }
        if !(0.0..=1.0).contains(&self.coherence_threshold) {
            return Err(format!(
                "coherence_threshold must be in [0, 1], got {}",
                self.coherence_threshold
            ));
        }
        if !(0.0..=0.5).contains(&self.deep_increase_threshold) {
            return Err(format!(
                "deep_increase_threshold must be in [0, 0.5], got {}",
                self.deep_increase_threshold
            ));
        }
        Ok(())
    }
}

/// Coherence validation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoherenceConfig {
    /// Inverse-pair deviation above which the pair violates.
    pub inverse_deviation_limit: f32,

    /// Complementary-pair gap above which the pair violates.
    pub complementary_gap_limit: f32,

    /// Weights for the five dimensions in order:
    /// inverse, complementary, tier, level, internal.
    pub dimension_weights: [f32; 5],

    /// Aggregate score at or above which a vector is coherent.
    pub coherence_threshold: f32,
}

impl Default for CoherenceConfig {
    fn default() -> Self {
        Self {
            inverse_deviation_limit: 0.30,
            complementary_gap_limit: 0.35,
            dimension_weights: [0.20, 0.25, 0.15, 0.20, 0.20],
            coherence_threshold: 0.85,
        }
    }
}

impl CoherenceConfig {
    /// Validate the coherence configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.inverse_deviation_limit) {
            return Err(format!(
                "inverse_deviation_limit must be in [0, 1], got {}",
                self.inverse_deviation_limit
            ));
        }
        if !(0.0..=1.0).contains(&self.complementary_gap_limit) {
            return Err(format!(
                "complementary_gap_limit must be in [0, 1], got {}",
                self.complementary_gap_limit
            ));
        }
        let sum: f32 = self.dimension_weights.iter().sum();
        if self.dimension_weights.iter().any(|w| *w < 0.0) || sum <= 0.0 {
            return Err("dimension_weights must be non-negative with positive sum".to_string());
        }
        if !(0.0..=1.0).contains(&self.coherence_threshold) {
            return Err(format!(
                "coherence_threshold must be in [0, 1], got {}",
                self.coherence_threshold
            ));
        }
        Ok(())
    }
}

/// Pathway generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathwayConfig {
    /// Baseline duration of one full-gap step, in weeks, before strategy
    /// multipliers.
    pub base_step_weeks: f32,

    /// Delta magnitude below which an operator is held, not moved.
    pub hold_band: f32,

    /// Minimum steps any pathway may have.
    pub min_steps: usize,

    /// Maximum steps any pathway may have.
    pub max_steps: usize,

    /// Base success probability before factors.
    pub base_success: f32,

    /// Floor for success probability.
    pub min_success: f32,

    /// Ceiling for success probability.
    pub max_success: f32,
}

impl Default for PathwayConfig {
    fn default() -> Self {
        Self {
            base_step_weeks: 4.0,
            hold_band: 0.02,
            min_steps: 2,
            max_steps: 8,
            base_success: 0.8,
            min_success: 0.2,
            max_success: 0.95,
        }
    }
}

impl PathwayConfig {
    /// Validate the pathway configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_step_weeks <= 0.0 {
            return Err(format!(
                "base_step_weeks must be > 0, got {}",
                self.base_step_weeks
            ));
        }
        if !(0.0..=0.2).contains(&self.hold_band) {
            return Err(format!(
                "hold_band must be in [0, 0.2], got {}",
                self.hold_band
            ));
        }
        if self.min_steps == 0 || self.max_steps < self.min_steps {
            return Err(format!(
                "step bounds invalid: min {} max {}",
                self.min_steps, self.max_steps
            ));
        }
        if !(0.0..=1.0).contains(&self.base_success) {
            return Err(format!(
                "base_success must be in [0, 1], got {}",
                self.base_success
            ));
        }
        if self.min_success >= self.max_success
            || self.min_success < 0.0
            || self.max_success > 1.0
        {
            return Err(format!(
                "success bounds invalid: min {} max {}",
                self.min_success, self.max_success
            ));
        }
        Ok(())
    }
}

/// Pathway ranking settings.
///
/// A dimension that cannot be scored contributes 0 to the weighted
/// total. That is deliberate and local to ranking: an unscorable
/// dimension should cost a pathway standing, while everywhere else in
/// the engine missing data is excluded rather than coerced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Weight of the speed dimension.
    pub speed_weight: f32,
    /// Weight of the stability dimension.
    pub stability_weight: f32,
    /// Weight of the effort dimension.
    pub effort_weight: f32,
    /// Weight of the side-effect dimension.
    pub side_effect_weight: f32,
    /// Weight of the success dimension.
    pub success_weight: f32,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            speed_weight: 0.20,
            stability_weight: 0.25,
            effort_weight: 0.15,
            side_effect_weight: 0.15,
            success_weight: 0.25,
        }
    }
}

impl OptimizerConfig {
    /// Weights in dimension order (speed, stability, effort,
    /// side-effects, success), renormalized to sum to 1.
    pub fn normalized_weights(&self) -> [f32; 5] {
        let raw = [
            self.speed_weight,
            self.stability_weight,
            self.effort_weight,
            self.side_effect_weight,
            self.success_weight,
        ];
        let sum: f32 = raw.iter().sum();
        if sum <= 0.0 {
            return [0.2; 5];
        }
        raw.map(|w| w / sum)
    }

    /// Validate the optimizer configuration.
    pub fn validate(&self) -> Result<(), String> {
        let raw = [
            self.speed_weight,
            self.stability_weight,
            self.effort_weight,
            self.side_effect_weight,
            self.success_weight,
        ];
        if raw.iter().any(|w| *w < 0.0 || !w.is_finite()) {
            return Err("optimizer weights must be finite and >= 0".to_string());
        }
        if raw.iter().sum::<f32>() <= 0.0 {
            return Err("optimizer weights must have positive sum".to_string());
        }
        Ok(())
    }
}

/// Stage sequencing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerConfig {
    /// Completion gap above which a stage counts as required work.
    pub gap_threshold: f32,

    /// Baseline duration of one full stage, in weeks.
    pub base_stage_weeks: f32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 0.10,
            base_stage_weeks: 6.0,
        }
    }
}

impl SequencerConfig {
    /// Validate the sequencer configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=0.5).contains(&self.gap_threshold) {
            return Err(format!(
                "gap_threshold must be in [0, 0.5], got {}",
                self.gap_threshold
            ));
        }
        if self.base_stage_weeks <= 0.0 {
            return Err(format!(
                "base_stage_weeks must be > 0, got {}",
                self.base_stage_weeks
            ));
        }
        Ok(())
    }
}

/// Minimum-viable-transformation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MvtConfig {
    /// Delta magnitude below which an operator is ignored entirely.
    pub min_delta: f32,

    /// Sensitivity a keystone candidate must exceed.
    pub keystone_sensitivity: f32,

    /// Sensitivity a cascade hub must exceed to be promoted.
    pub hub_sensitivity: f32,

    /// Active cascade neighbors needed for hub promotion.
    pub hub_min_neighbors: usize,

    /// Cap on keystones taken before greedy fill.
    pub max_keystones: usize,

    /// Delta magnitude that puts an operator into the naive full set.
    pub naive_threshold: f32,

    /// Default selection budget when the caller does not pass one.
    pub default_max_ops: usize,
}

impl Default for MvtConfig {
    fn default() -> Self {
        Self {
            min_delta: 0.02,
            keystone_sensitivity: 0.10,
            hub_sensitivity: 0.15,
            hub_min_neighbors: 3,
            max_keystones: 4,
            naive_threshold: 0.05,
            default_max_ops: 5,
        }
    }
}

impl MvtConfig {
    /// Validate the MVT configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=0.2).contains(&self.min_delta) {
            return Err(format!(
                "min_delta must be in [0, 0.2], got {}",
                self.min_delta
            ));
        }
        if self.keystone_sensitivity < 0.0 || self.hub_sensitivity < 0.0 {
            return Err("sensitivity thresholds must be >= 0".to_string());
        }
        if self.hub_min_neighbors == 0 {
            return Err("hub_min_neighbors must be > 0".to_string());
        }
        if self.max_keystones == 0 {
            return Err("max_keystones must be > 0".to_string());
        }
        if self.naive_threshold < self.min_delta {
            return Err(format!(
                "naive_threshold ({}) must be >= min_delta ({})",
                self.naive_threshold, self.min_delta
            ));
        }
        if self.default_max_ops == 0 {
            return Err("default_max_ops must be > 0".to_string());
        }
        Ok(())
    }
}
