//! Pathway generation: five pacing archetypes over a feasible gap.

mod generator;
mod practices;
mod strategy;

pub use generator::{PathwayGenerator, PathwayStep, StepTransition, TransformationPathway};
pub use practices::{practices_for, strategy_practices};
pub use strategy::{StrategyKind, StrategyProfile};
