//! Inverse optimization: from a target outcome score to the state
//! required to produce it.

mod gradient;
mod inverse;

pub use gradient::estimate_gradient;
pub use inverse::{InverseSolver, ObjectiveReport, ReverseMappingResult, SolverBounds};
