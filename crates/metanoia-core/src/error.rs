//! Core error types.
//!
//! Every computation over a [`StateVector`](crate::types::StateVector) that
//! depends on an absent operator must surface the missing names explicitly;
//! downstream aggregators exclude such results instead of substituting a
//! numeric default.

use thiserror::Error;

/// Errors that can occur while reading state or evaluating outcome formulas.
#[derive(Debug, Error)]
pub enum CoreError {
    /// One or more operators required by a computation are absent from the
    /// input vector.
    #[error("cannot compute, missing: [{}]", .missing.join(", "))]
    MissingOperators {
        /// Names of the absent operators, sorted.
        missing: Vec<String>,
    },

    /// An operator name is not part of the canonical alphabet.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// A scalar fell outside its declared range.
    #[error("invalid value for '{name}': {value}. {reason}")]
    InvalidValue {
        /// Offending field or operator name.
        name: String,
        /// The rejected value.
        value: f32,
        /// Reason for rejection.
        reason: String,
    },

    /// A requested outcome has no registered formula and no heuristic
    /// fallback could be derived.
    #[error("unknown outcome '{0}'")]
    UnknownOutcome(String),

    /// An outcome formula failed validation.
    #[error("invalid formula '{name}': {reason}")]
    InvalidFormula {
        /// Formula name.
        name: String,
        /// Reason for invalidity.
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl CoreError {
    /// Create a [`CoreError::MissingOperators`] from any name collection,
    /// sorting and deduplicating the names.
    pub fn missing<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut missing: Vec<String> = names.into_iter().map(Into::into).collect();
        missing.sort();
        missing.dedup();
        CoreError::MissingOperators { missing }
    }

    /// Create an invalid-value error.
    pub fn invalid_value(name: impl Into<String>, value: f32, reason: impl Into<String>) -> Self {
        CoreError::InvalidValue {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }

    /// Whether this error stems from absent input rather than a defect.
    pub fn is_missing_input(&self) -> bool {
        matches!(self, CoreError::MissingOperators { .. })
    }

    /// The missing operator names, if this is a missing-input error.
    pub fn missing_names(&self) -> Option<&[String]> {
        match self {
            CoreError::MissingOperators { missing } => Some(missing),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_display_lists_names() {
        let err = CoreError::missing(["G_grace", "W_witness"]);
        let msg = format!("{}", err);
        assert!(msg.contains("cannot compute, missing:"));
        assert!(msg.contains("G_grace"));
        assert!(msg.contains("W_witness"));
    }

    #[test]
    fn test_missing_sorts_and_dedups() {
        let err = CoreError::missing(["W_witness", "G_grace", "W_witness"]);
        assert_eq!(
            err.missing_names().unwrap(),
            &["G_grace".to_string(), "W_witness".to_string()]
        );
    }

    #[test]
    fn test_is_missing_input() {
        assert!(CoreError::missing(["X"]).is_missing_input());
        assert!(!CoreError::UnknownOutcome("peace".into()).is_missing_input());
    }

    #[test]
    fn test_invalid_value_display() {
        let err = CoreError::invalid_value("W_witness", 1.4, "must be in [0, 1]");
        let msg = format!("{}", err);
        assert!(msg.contains("W_witness"));
        assert!(msg.contains("1.4"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<String>("not json").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}
