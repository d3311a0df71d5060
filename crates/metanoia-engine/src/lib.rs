//! Inverse state-planning engine for metanoia state vectors.
//!
//! Given a desired outcome score, this crate computes which operator
//! changes are required, whether they are feasible, how to pace them,
//! and which minimal subset of them carries most of the benefit.
//!
//! # Modules
//!
//! - [`config`]: every numeric knob, validated, with presets
//! - [`error`]: missing-input-first error taxonomy
//! - [`solver`]: finite-difference inverse solver
//! - [`constraints`]: seven feasibility checks on a `(current, required)` pair
//! - [`coherence`]: internal-consistency validation of a required vector
//! - [`pathway`]: five pacing archetypes turning a gap into ordered steps
//! - [`optimizer`]: five-dimension pathway ranking
//! - [`stages`]: the seven-stage dissolution sequencer
//! - [`mvt`]: minimum-viable-transformation selection
//! - [`engine`]: the facade wiring it all together
//!
//! # Model Reference
//!
//! Every score and probability leaving this crate is clamped to
//! `[0, 1]`. Computations that depend on an absent operator return
//! structured "cannot compute, missing: [...]" values that bubble
//! through every aggregator; the single documented exception is the
//! pathway optimizer, where an unscorable dimension contributes 0 to a
//! ranking total.
//!
//! # Example
//!
//! ```
//! use metanoia_engine::TransformationEngine;
//! use metanoia_core::OperatorRegistry;
//!
//! let engine = TransformationEngine::with_defaults();
//! let current = OperatorRegistry::builtin().default_vector();
//!
//! let solved = engine.solve("grace_alignment", 0.75, &current, None).unwrap();
//! assert!(solved.goal_achievable);
//!
//! let pathways = engine
//!     .generate_pathways(&current, solved.required.vector(), 3.0, 4.0, 5)
//!     .unwrap();
//! let ranking = engine.optimize_pathways(&pathways, None).unwrap();
//! assert_eq!(ranking.scores.len(), pathways.len());
//! ```

pub mod coherence;
pub mod config;
pub mod constraints;
pub mod engine;
pub mod error;
pub mod mvt;
pub mod optimizer;
pub mod pathway;
pub mod solver;
pub mod stages;

pub use config::EngineConfig;
pub use engine::TransformationEngine;
pub use error::{EngineError, EngineResult};

// Re-export the core vocabulary so most callers need only this crate.
pub use metanoia_core::{
    ChangeKind, OperatorChange, OperatorRegistry, OutcomeCatalog, OutcomeFormula,
    OutcomeModel, OutcomeTarget, RequiredState, StateVector,
};
