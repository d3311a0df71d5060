//! The seven-stage dissolution process as declarative data.
//!
//! # Model Reference
//!
//! A fixed prerequisite DAG over seven ordered stages: the first three
//! open the process, Dissolution (4) needs all of them, Void (5) and
//! Opening (6) both follow Dissolution, and Rebirth (7) needs
//! everything. Acceptance/Release and Void/Opening may run in parallel
//! once their shared prerequisites hold. The table lives apart from the
//! sequencing code so it can be validated on its own.

use serde::{Deserialize, Serialize};

/// Progress phase derived from a stage's completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagePhase {
    /// Below any meaningful engagement.
    NotStarted,
    /// First contact with the work.
    Initiation,
    /// The structure is actively loosening.
    Dissolution,
    /// The old pattern is gone, the new not yet formed.
    Void,
    /// Reorganization around the new configuration.
    Rebirth,
    /// The stage holds on its own.
    Complete,
}

impl StagePhase {
    /// Bucket a completion value into a phase.
    pub fn from_completion(completion: f32) -> Self {
        match completion {
            c if c < 0.05 => StagePhase::NotStarted,
            c if c < 0.25 => StagePhase::Initiation,
            c if c < 0.55 => StagePhase::Dissolution,
            c if c < 0.75 => StagePhase::Void,
            c if c < 0.95 => StagePhase::Rebirth,
            _ => StagePhase::Complete,
        }
    }
}

/// Static definition of one stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageDef {
    /// Stage id, 1-7.
    pub id: u8,
    /// Stage name.
    pub name: &'static str,
    /// Stages that must be established first.
    pub prerequisites: &'static [u8],
    /// The operator whose value tracks this stage.
    pub indicator: &'static str,
    /// Whether completion corresponds to the indicator *rising*.
    /// Falling stages (attachment, aversion, ego) complete as the raw
    /// value drops.
    pub rising: bool,
    /// Indicator value at which the stage begins.
    pub start_threshold: f32,
    /// Indicator value at which the stage is fully complete.
    pub full_threshold: f32,
    /// Capacity to rest in not-knowing demanded by working at this
    /// depth, `[0, 1]`.
    pub void_tolerance: f32,
}

impl StageDef {
    /// Threshold-normalized completion of this stage for an indicator
    /// value, clamped to `[0, 1]`.
    pub fn completion_of(&self, value: f32) -> f32 {
        let span = if self.rising {
            self.full_threshold - self.start_threshold
        } else {
            self.start_threshold - self.full_threshold
        };
        if span <= 0.0 {
            return 0.0;
        }
        let progress = if self.rising {
            value - self.start_threshold
        } else {
            self.start_threshold - value
        };
        (progress / span).clamp(0.0, 1.0)
    }
}

/// The stage table, in id order.
pub const STAGES: [StageDef; 7] = [
    StageDef {
        id: 1,
        name: "Recognition",
        prerequisites: &[],
        indicator: "W_witness",
        rising: true,
        start_threshold: 0.15,
        full_threshold: 0.70,
        void_tolerance: 0.10,
    },
    StageDef {
        id: 2,
        name: "Acceptance",
        prerequisites: &[1],
        indicator: "Av_aversion",
        rising: false,
        start_threshold: 0.65,
        full_threshold: 0.25,
        void_tolerance: 0.15,
    },
    StageDef {
        id: 3,
        name: "Release",
        prerequisites: &[1],
        indicator: "At_attachment",
        rising: false,
        start_threshold: 0.70,
        full_threshold: 0.25,
        void_tolerance: 0.25,
    },
    StageDef {
        id: 4,
        name: "Dissolution",
        prerequisites: &[1, 2, 3],
        indicator: "Eg_ego",
        rising: false,
        start_threshold: 0.70,
        full_threshold: 0.30,
        void_tolerance: 0.40,
    },
    StageDef {
        id: 5,
        name: "Void",
        prerequisites: &[4],
        indicator: "S_surrender",
        rising: true,
        start_threshold: 0.25,
        full_threshold: 0.80,
        void_tolerance: 0.60,
    },
    StageDef {
        id: 6,
        name: "Opening",
        prerequisites: &[4],
        indicator: "G_grace",
        rising: true,
        start_threshold: 0.20,
        full_threshold: 0.75,
        void_tolerance: 0.50,
    },
    StageDef {
        id: 7,
        name: "Rebirth",
        prerequisites: &[4, 5, 6],
        indicator: "Un_unity",
        rising: true,
        start_threshold: 0.15,
        full_threshold: 0.70,
        void_tolerance: 0.70,
    },
];

/// Stage pairs that may run in parallel once their shared prerequisites
/// hold.
pub const PARALLEL_PAIRS: [(u8, u8); 2] = [(2, 3), (5, 6)];

/// Look up one stage by id.
pub fn stage(id: u8) -> Option<&'static StageDef> {
    STAGES.iter().find(|s| s.id == id)
}

/// The DAG's topological order. The table is authored in topological
/// order already; this is verified by test.
pub fn topological_order() -> [u8; 7] {
    [1, 2, 3, 4, 5, 6, 7]
}
