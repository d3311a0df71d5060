//! Normalized state vectors.
//!
//! # Model Reference
//!
//! A `StateVector` maps operator names to scalars in `[0, 1]`. Values are
//! clamped on insertion (NaN collapses to 0.0, +Inf to 1.0) so a produced
//! vector always satisfies the range invariant. Reads of absent operators
//! return `Option`/structured errors listing the missing names; no code
//! path substitutes a default for an absent operator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult};

/// Sanitize a raw scalar into `[0, 1]`, collapsing NaN to 0.0 and
/// infinities to the nearest bound.
#[inline]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// An immutable name-to-scalar map over the operator alphabet.
///
/// Construction is by value (`with` consumes and returns), so a vector
/// handed to a component cannot change underneath it. Iteration order is
/// the sorted key order.
///
/// # Example
///
/// ```
/// use metanoia_core::types::StateVector;
///
/// let v = StateVector::new()
///     .with("W_witness", 0.3)
///     .with("G_grace", 0.25);
///
/// assert_eq!(v.get("W_witness"), Some(0.3));
/// assert_eq!(v.get("Un_unity"), None);
/// assert!(v.require(&["W_witness", "Un_unity"]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector {
    values: BTreeMap<String, f32>,
}

impl StateVector {
    /// An empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(name, value)` pairs, clamping each value.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(name, value)| (name.into(), clamp01(value)))
            .collect();
        Self { values }
    }

    /// Return a copy with `name` set to the clamped `value`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f32) -> Self {
        self.values.insert(name.into(), clamp01(value));
        self
    }

    /// Return a copy with `name` removed.
    #[must_use]
    pub fn without(mut self, name: &str) -> Self {
        self.values.remove(name);
        self
    }

    /// Value of one operator, if present.
    pub fn get(&self, name: &str) -> Option<f32> {
        self.values.get(name).copied()
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Values for all of `names`, or the full list of absent names.
    ///
    /// This is the single gate through which every component reads
    /// multi-operator input: either all names resolve, or the caller gets
    /// an explicit missing-input error naming each absent operator.
    pub fn require(&self, names: &[&str]) -> CoreResult<Vec<f32>> {
        let missing: Vec<&str> = names
            .iter()
            .copied()
            .filter(|n| !self.values.contains_key(*n))
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::missing(missing));
        }
        Ok(names.iter().map(|n| self.values[*n]).collect())
    }

    /// Value of one operator, or a missing-input error naming it.
    pub fn require_one(&self, name: &str) -> CoreResult<f32> {
        self.get(name).ok_or_else(|| CoreError::missing([name]))
    }

    /// Number of populated operators.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no operators are populated.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate `(name, value)` in sorted name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Populated names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Names present in `other` but absent here.
    pub fn missing_from(&self, other: &StateVector) -> Vec<String> {
        other
            .values
            .keys()
            .filter(|k| !self.values.contains_key(*k))
            .cloned()
            .collect()
    }

    /// Verify every stored value lies in `[0, 1]`.
    ///
    /// Insertion clamps, so this only fails for vectors deserialized from
    /// hostile input before clamping was applied.
    pub fn validate(&self) -> CoreResult<()> {
        for (name, value) in &self.values {
            if !(0.0..=1.0).contains(value) || value.is_nan() {
                return Err(CoreError::invalid_value(
                    name.clone(),
                    *value,
                    "must be in [0, 1]",
                ));
            }
        }
        Ok(())
    }

    /// Re-clamp every value, repairing a vector that bypassed insertion.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        for value in self.values.values_mut() {
            *value = clamp01(*value);
        }
        self
    }

    /// Mean absolute difference over the operators present in both
    /// vectors; `None` when the overlap is empty.
    pub fn mean_abs_delta(&self, other: &StateVector) -> Option<f32> {
        let mut total = 0.0f32;
        let mut count = 0usize;
        for (name, value) in &self.values {
            if let Some(o) = other.get(name) {
                total += (value - o).abs();
                count += 1;
            }
        }
        if count == 0 {
            None
        } else {
            Some(total / count as f32)
        }
    }
}

impl FromIterator<(String, f32)> for StateVector {
    fn from_iter<T: IntoIterator<Item = (String, f32)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}
