//! Finite-difference gradient estimation.
//!
//! Outcome formulas are cheap pure functions, so the solver estimates
//! partial derivatives numerically instead of requiring models to ship
//! analytic gradients. The `[0, 1]` box is respected by shrinking the
//! probe step at the boundaries.

use metanoia_core::{OutcomeModel, StateVector};

use crate::error::{EngineError, EngineResult};

/// Estimate `d f / d operator` at `vector` by central difference.
///
/// Probe points are clamped into `[0, 1]`; at a boundary this degrades
/// to a one-sided difference. Fails with the formula's missing-input
/// error when the vector lacks a relevant operator, and with a numeric
/// error when the probe span collapses.
pub fn estimate_gradient(
    model: &dyn OutcomeModel,
    vector: &StateVector,
    operator: &str,
    epsilon: f32,
) -> EngineResult<f32> {
    let value = vector
        .get(operator)
        .ok_or_else(|| EngineError::missing([operator]))?;

    let hi = (value + epsilon).min(1.0);
    let lo = (value - epsilon).max(0.0);
    let span = hi - lo;
    if span <= f32::EPSILON {
        return Err(EngineError::Numeric {
            operation: format!("gradient of '{operator}'"),
            details: format!("probe span collapsed at value {value} with epsilon {epsilon}"),
        });
    }

    let f_hi = model.evaluate(&vector.clone().with(operator, hi))?;
    let f_lo = model.evaluate(&vector.clone().with(operator, lo))?;
    let gradient = (f_hi - f_lo) / span;

    if !gradient.is_finite() {
        return Err(EngineError::Numeric {
            operation: format!("gradient of '{operator}'"),
            details: "non-finite slope".to_string(),
        });
    }
    Ok(gradient)
}
