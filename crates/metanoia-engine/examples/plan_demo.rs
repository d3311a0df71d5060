//! End-to-end planning demo.
//!
//! Solves an outcome target for a synthetic practitioner, checks
//! feasibility, generates and ranks pathways, sequences the stage arc
//! and computes the minimum viable transformation.
//!
//! Run with: `cargo run --example plan_demo`

use metanoia_core::OperatorRegistry;
use metanoia_engine::TransformationEngine;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,metanoia_engine=debug".into()),
        )
        .init();

    let engine = TransformationEngine::with_defaults();
    let current = OperatorRegistry::builtin()
        .default_vector()
        .with("W_witness", 0.35)
        .with("G_grace", 0.25)
        .with("S_surrender", 0.30);

    let solved = engine
        .solve("grace_alignment", 0.75, &current, None)
        .expect("solve failed");
    println!(
        "solve: {} -> {:.2} achievable={} p={:.2} ({} changes)",
        solved.outcome,
        solved.achieved_score,
        solved.goal_achievable,
        solved.achievement_probability,
        solved.changes.len()
    );
    for change in &solved.changes {
        println!(
            "  {:<14} {:.2} -> {:.2}  ({:?})",
            change.operator, change.current, change.required, change.kind
        );
    }

    let required = solved.required.vector().clone();

    let feasibility = engine.check_constraints(&current, &required, 3.0, 4.0);
    println!(
        "feasibility: feasible={} score={:.2}",
        feasibility.feasible, feasibility.feasibility_score
    );
    for violation in feasibility.violations() {
        println!("  [{:?}] {}", violation.severity, violation.message);
    }
    for recommendation in &feasibility.recommendations {
        println!("  -> ({:?}) {}", recommendation.kind, recommendation.message);
    }

    let coherence = engine.validate_coherence(&required, 4.0);
    println!(
        "coherence: coherent={} score={:?}",
        coherence.coherent, coherence.score
    );

    let pathways = engine
        .generate_pathways(&current, &required, 3.0, 4.0, 5)
        .expect("pathway generation failed");
    let ranking = engine
        .optimize_pathways(&pathways, None)
        .expect("optimization failed");
    for score in &ranking.scores {
        println!(
            "pathway {:<8} total={:.2} percentile={:>3.0}",
            score.strategy.to_string(),
            score.total,
            score.percentile
        );
    }

    let sequence = engine
        .sequence_stages(&current, &required)
        .expect("stage sequencing failed");
    println!(
        "stages required (in order): {:?}, void tolerance {:.2}",
        sequence.ordered_required, sequence.void_tolerance_required
    );

    let mvt = engine.compute_mvt(&current, &required, 3).expect("mvt failed");
    println!(
        "mvt: {} of {} naive changes (efficiency {:.2})",
        mvt.selected.len(),
        mvt.naive_count,
        mvt.efficiency
    );
    for entry in &mvt.selected {
        println!(
            "  #{} {:<14} ({:?}) cascades to {:?}",
            entry.priority, entry.change.operator, entry.reasoning, entry.cascade_targets
        );
    }
}
