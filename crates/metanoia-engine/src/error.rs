//! Engine error types.
//!
//! Two failure families matter here. **Missing input** is structural: a
//! computation asked for an operator the vector does not carry, and the
//! answer is "cannot compute, missing: [...]" all the way up. An
//! unreachable goal is **not** an error: the solver and checker surface
//! infeasibility as data (`goal_achievable = false`, blocking
//! violations), so `Err` from this crate always means the request itself
//! was malformed or unanswerable.

use thiserror::Error;

use metanoia_core::CoreError;

/// Errors surfaced by the planning engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Required operators are absent from an input vector.
    #[error("cannot compute, missing: [{}]", .missing.join(", "))]
    MissingInput {
        /// Names of the absent operators, sorted.
        missing: Vec<String>,
    },

    /// The requested outcome has no registered formula and the heuristic
    /// fallback was disabled or found no keyword match.
    #[error("unknown outcome '{name}'")]
    UnknownOutcome {
        /// The unresolved outcome name.
        name: String,
    },

    /// An operator name is not part of the canonical alphabet.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Configuration failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// A parameter fell outside its declared range.
    #[error("invalid parameter '{name}': {value}. {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Rejected value, stringified.
        value: String,
        /// Reason for rejection.
        reason: String,
    },

    /// A numeric computation produced NaN/Inf where a score was expected.
    #[error("numeric error in {operation}: {details}")]
    Numeric {
        /// The computation that failed.
        operation: String,
        /// What went wrong.
        details: String,
    },

    /// Nothing to work on (empty change set, zero pathways, ...).
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingOperators { missing } => EngineError::MissingInput { missing },
            CoreError::UnknownOutcome(name) => EngineError::UnknownOutcome { name },
            CoreError::UnknownOperator(name) => EngineError::UnknownOperator(name),
            CoreError::InvalidValue {
                name,
                value,
                reason,
            } => EngineError::InvalidParameter {
                name,
                value: value.to_string(),
                reason,
            },
            CoreError::InvalidFormula { name, reason } => {
                EngineError::Config(format!("formula '{name}': {reason}"))
            }
            CoreError::Serialization(msg) => EngineError::Serialization(msg),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

impl EngineError {
    /// Create a missing-input error, sorting and deduplicating names.
    pub fn missing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut missing: Vec<String> = names.into_iter().map(Into::into).collect();
        missing.sort();
        missing.dedup();
        EngineError::MissingInput { missing }
    }

    /// Create an invalid-parameter error.
    pub fn invalid_param(
        name: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        EngineError::InvalidParameter {
            name: name.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error stems from absent input rather than a defect.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, EngineError::MissingInput { .. })
    }

    /// The missing operator names, if this is a missing-input error.
    pub fn missing_names(&self) -> Option<&[String]> {
        match self {
            EngineError::MissingInput { missing } => Some(missing),
            _ => None,
        }
    }
}
