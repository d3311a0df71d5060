//! Outcome formulas: weighted linear scores with inversion.
//!
//! # Model Reference
//!
//! A forward formula maps a (partial) state vector to a derived scalar in
//! `[0, 1]`. Built-in formulas are weighted sums over a handful of
//! operators, with inverted operators contributing `1 - v`. Evaluation
//! over a vector missing any relevant operator fails with the missing
//! names; a formula never fabricates a default.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::types::{clamp01, StateVector};

/// The pluggable forward-formula contract.
///
/// The solver only needs a name, the relevant operator set, and a pure
/// `evaluate`. Anything satisfying that can be registered in the catalog.
pub trait OutcomeModel: fmt::Debug + Send + Sync {
    /// Outcome name, unique within a catalog.
    fn name(&self) -> &str;

    /// Operators this formula reads. The solver searches over exactly
    /// this set.
    fn relevant_operators(&self) -> &[String];

    /// Score the vector, or fail listing the absent operators.
    fn evaluate(&self, vector: &StateVector) -> CoreResult<f32>;
}

/// One weighted term of a linear formula.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaTerm {
    /// Operator key.
    pub operator: String,
    /// Weight; term weights are normalized to sum to 1 at validation.
    pub weight: f32,
    /// Whether the operator contributes `1 - v`.
    pub inverted: bool,
}

/// A weighted-linear-with-inversion outcome formula.
///
/// # Example
///
/// ```
/// use metanoia_core::outcome::{OutcomeFormula, OutcomeModel};
/// use metanoia_core::types::StateVector;
///
/// let formula = OutcomeFormula::new("liberation")
///     .with_inverted_term("At_attachment", 0.5)
///     .with_term("S_surrender", 0.5)
///     .validated()
///     .unwrap();
///
/// let v = StateVector::new()
///     .with("At_attachment", 0.2)
///     .with("S_surrender", 0.8);
/// let score = formula.evaluate(&v).unwrap();
/// assert!((score - 0.8).abs() < 1e-6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeFormula {
    name: String,
    terms: Vec<FormulaTerm>,
    #[serde(skip)]
    relevant: Vec<String>,
}

impl OutcomeFormula {
    /// Start an empty formula. Add terms, then call
    /// [`validated`](Self::validated).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            terms: Vec::new(),
            relevant: Vec::new(),
        }
    }

    /// Add a direct term.
    #[must_use]
    pub fn with_term(mut self, operator: impl Into<String>, weight: f32) -> Self {
        self.terms.push(FormulaTerm {
            operator: operator.into(),
            weight,
            inverted: false,
        });
        self
    }

    /// Add an inverted term (contributes `1 - v`).
    #[must_use]
    pub fn with_inverted_term(mut self, operator: impl Into<String>, weight: f32) -> Self {
        self.terms.push(FormulaTerm {
            operator: operator.into(),
            weight,
            inverted: true,
        });
        self
    }

    /// Validate and seal the formula: at least one term, positive
    /// weights, no duplicate operators. Weights are normalized to sum
    /// to 1 and the relevant-operator cache is built.
    pub fn validated(mut self) -> CoreResult<Self> {
        if self.terms.is_empty() {
            return Err(CoreError::InvalidFormula {
                name: self.name.clone(),
                reason: "formula has no terms".to_string(),
            });
        }
        let mut sum = 0.0f32;
        for term in &self.terms {
            if term.weight <= 0.0 || !term.weight.is_finite() {
                return Err(CoreError::InvalidFormula {
                    name: self.name.clone(),
                    reason: format!(
                        "term '{}' has non-positive weight {}",
                        term.operator, term.weight
                    ),
                });
            }
            sum += term.weight;
        }
        for (i, term) in self.terms.iter().enumerate() {
            if self.terms[..i].iter().any(|t| t.operator == term.operator) {
                return Err(CoreError::InvalidFormula {
                    name: self.name.clone(),
                    reason: format!("duplicate term '{}'", term.operator),
                });
            }
        }
        for term in &mut self.terms {
            term.weight /= sum;
        }
        self.relevant = self.terms.iter().map(|t| t.operator.clone()).collect();
        Ok(self)
    }

    /// The formula's terms.
    pub fn terms(&self) -> &[FormulaTerm] {
        &self.terms
    }

    /// Operators this formula treats as inverted.
    pub fn inverted_operators(&self) -> Vec<&str> {
        self.terms
            .iter()
            .filter(|t| t.inverted)
            .map(|t| t.operator.as_str())
            .collect()
    }
}

impl OutcomeModel for OutcomeFormula {
    fn name(&self) -> &str {
        &self.name
    }

    fn relevant_operators(&self) -> &[String] {
        &self.relevant
    }

    fn evaluate(&self, vector: &StateVector) -> CoreResult<f32> {
        let names: Vec<&str> = self.terms.iter().map(|t| t.operator.as_str()).collect();
        let values = vector.require(&names)?;
        let score = self
            .terms
            .iter()
            .zip(values)
            .map(|(term, v)| {
                let reading = if term.inverted { 1.0 - v } else { v };
                term.weight * reading
            })
            .sum();
        Ok(clamp01(score))
    }
}
