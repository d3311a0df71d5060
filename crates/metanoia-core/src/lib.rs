//! Core model types for the metanoia planning engine.
//!
//! This crate owns the vocabulary the engine crates compute over:
//!
//! - [`operators`]: the canonical 25-operator alphabet with categories,
//!   change difficulty, inversion flags and level-range tables
//! - [`types`]: state vectors, derived operator changes, outcome targets
//!   and solver-produced required states
//! - [`outcome`]: the forward-formula contract, the built-in catalog of
//!   weighted-linear outcome scores, and the keyword heuristic fallback
//! - [`error`]: the missing-input-first error taxonomy
//!
//! # Model Reference
//!
//! All scalars are normalized to `[0, 1]` and clamped at construction.
//! Any computation that depends on an absent operator yields an explicit
//! missing-input error listing the names, never a fabricated default.
//!
//! # Example
//!
//! ```
//! use metanoia_core::operators::OperatorRegistry;
//! use metanoia_core::outcome::OutcomeCatalog;
//!
//! let registry = OperatorRegistry::builtin();
//! let catalog = OutcomeCatalog::builtin();
//!
//! let vector = registry.default_vector();
//! let peace = catalog
//!     .resolve("inner_peace", &registry, false)
//!     .unwrap()
//!     .model()
//!     .evaluate(&vector)
//!     .unwrap();
//! assert!((0.0..=1.0).contains(&peace));
//! ```

pub mod error;
pub mod operators;
pub mod outcome;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use operators::{OperatorCategory, OperatorMeta, OperatorRegistry};
pub use outcome::{OutcomeCatalog, OutcomeFormula, OutcomeModel, ResolvedOutcome};
pub use types::{
    clamp01, derive_changes, ChangeKind, OperatorChange, OutcomeTarget, RequiredState,
    RequirementDetail, StateVector,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_re_exports_exist() {
        let registry = OperatorRegistry::builtin();
        let catalog = OutcomeCatalog::builtin();
        assert_eq!(registry.len(), 25);
        assert_eq!(catalog.len(), 10);
        let _ = StateVector::new();
        let _ = OutcomeTarget::new("inner_peace", 0.8);
    }

    #[test]
    fn test_missing_input_bubbles_through_formula() {
        let registry = OperatorRegistry::builtin();
        let catalog = OutcomeCatalog::builtin();
        let sparse = StateVector::new().with("W_witness", 0.5);
        let resolved = catalog.resolve("liberation", &registry, false).unwrap();
        let err = resolved.model().evaluate(&sparse).unwrap_err();
        assert!(err.is_missing_input());
    }
}
