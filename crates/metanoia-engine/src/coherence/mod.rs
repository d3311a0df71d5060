//! Coherence validation: is a required vector internally consistent,
//! independent of whether it is reachable from the current state?

pub mod rules;

mod validator;

pub use validator::{
    CoherenceReport, CoherenceValidator, CoherenceViolation, CoherenceViolationKind,
    CorrectiveDelta, DimensionScores,
};
