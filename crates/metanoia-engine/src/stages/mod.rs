//! The seven-stage dissolution sequencer: a prerequisite-linked arc
//! tracked independently of outcome solving.

pub mod dag;

mod sequencer;

pub use dag::{stage, topological_order, StageDef, StagePhase, PARALLEL_PAIRS, STAGES};
pub use sequencer::{StageSequence, StageSequencer, StageStatus};
