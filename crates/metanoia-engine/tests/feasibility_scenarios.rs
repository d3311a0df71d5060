//! Feasibility and coherence scenario tests.
//!
//! End-to-end checks of the constraint checker and coherence validator
//! through the engine facade, covering the canonical scenarios: the
//! over-ambitious level jump, the attachment/surrender contradiction,
//! and the missing-input discipline of every check.

use metanoia_core::{OperatorRegistry, StateVector};
use metanoia_engine::constraints::{CheckStatus, ConstraintKind, ConstraintSeverity};
use metanoia_engine::TransformationEngine;

const COHERENCE_THRESHOLD: f32 = 0.85;

fn engine() -> TransformationEngine {
    TransformationEngine::with_defaults()
}

fn settled_current() -> StateVector {
    OperatorRegistry::builtin()
        .default_vector()
        .with("St_stress", 0.35)
        .with("En_energy", 0.60)
        .with("Gd_grounding", 0.60)
        .with("Em_embodiment", 0.55)
        .with("Re_resilience", 0.55)
}

#[test]
fn scenario_level_two_to_six_blocks() {
    let engine = engine();
    let required = StateVector::new()
        .with("W_witness", 0.5)
        .with("P_presence", 0.5);
    let report = engine.check_constraints(&settled_current(), &required, 2.0, 6.0);

    assert!(!report.feasible);
    let violations = report.violations();
    let jump = violations
        .iter()
        .find(|v| v.kind == ConstraintKind::LevelJump)
        .expect("max-jump violation expected");
    assert_eq!(jump.severity, ConstraintSeverity::Blocking);
    assert!((0.0..=1.0).contains(&report.feasibility_score));
    assert!(report.feasibility_score < 1.0);
}

#[test]
fn scenario_attachment_surrender_contradiction() {
    let engine = engine();
    let required = StateVector::new()
        .with("At_attachment", 0.9)
        .with("S_surrender", 0.9);

    let coherence = engine.validate_coherence(&required, 4.0);
    assert!(!coherence.coherent);
    assert!(coherence.score.unwrap() < COHERENCE_THRESHOLD);
    let inverse = coherence
        .violations
        .iter()
        .find(|v| v.operators.contains(&"At_attachment".to_string()))
        .expect("inverse-pair violation expected");
    assert!(inverse.severity > 0.5);

    // The same contradiction surfaces through the feasibility surface.
    let report = engine.check_constraints(&settled_current(), &required, 4.0, 4.0);
    assert!(report
        .violations()
        .iter()
        .any(|v| v.kind == ConstraintKind::PairwiseCoherence));
}

#[test]
fn balanced_required_state_is_coherent() {
    let engine = engine();
    let required = StateVector::new()
        .with("At_attachment", 0.35)
        .with("S_surrender", 0.65)
        .with("Av_aversion", 0.40)
        .with("Eq_equanimity", 0.60)
        .with("Eg_ego", 0.45)
        .with("Hu_humility", 0.55)
        .with("St_stress", 0.40)
        .with("Re_resilience", 0.60)
        .with("W_witness", 0.55)
        .with("P_presence", 0.55)
        .with("Co_compassion", 0.50)
        .with("Fo_forgiveness", 0.50)
        .with("Cl_clarity", 0.55)
        .with("Ins_insight", 0.55)
        .with("Gd_grounding", 0.55)
        .with("Em_embodiment", 0.55)
        .with("G_grace", 0.50)
        .with("Tr_trust", 0.50)
        .with("En_energy", 0.55);
    let report = engine.validate_coherence(&required, 5.0);
    assert!(
        report.dimensions.inverse.unwrap() >= COHERENCE_THRESHOLD,
        "inverse dimension {:?}",
        report.dimensions.inverse
    );
    assert!(
        report.dimensions.complementary.unwrap() >= COHERENCE_THRESHOLD,
        "complementary dimension {:?}",
        report.dimensions.complementary
    );
}

#[test]
fn corrections_propose_values_in_range() {
    let engine = engine();
    let required = StateVector::new()
        .with("At_attachment", 0.95)
        .with("S_surrender", 0.95)
        .with("W_witness", 0.9)
        .with("P_presence", 0.2);
    let report = engine.validate_coherence(&required, 4.0);
    assert!(!report.corrections.is_empty());
    for correction in &report.corrections {
        assert!((0.0..=1.0).contains(&correction.to));
        assert!(correction.from != correction.to);
    }
}

#[test]
fn every_check_goes_indeterminate_without_its_inputs() {
    let engine = engine();
    let required = StateVector::new()
        .with("W_witness", 0.6)
        .with("Un_unity", 0.5);

    // Strip the operators the load and energy checks rely on.
    let bare = StateVector::new().with("W_witness", 0.3);
    let report = engine.check_constraints(&bare, &required, 3.0, 4.0);

    let indeterminate_kinds: Vec<ConstraintKind> = report
        .indeterminate()
        .iter()
        .map(|(kind, _)| *kind)
        .collect();
    assert!(indeterminate_kinds.contains(&ConstraintKind::LoadCapacity));
    assert!(indeterminate_kinds.contains(&ConstraintKind::EnergySustainability));
    // The level check needs no vector data and still evaluates.
    let level = report
        .checks
        .iter()
        .find(|c| c.kind == ConstraintKind::LevelJump)
        .unwrap();
    assert!(matches!(level.status, CheckStatus::Passed));

    // Indeterminate checks name what they were missing.
    for (_, missing) in report.indeterminate() {
        assert!(!missing.is_empty());
    }
}

#[test]
fn indeterminate_checks_do_not_sink_feasibility() {
    let engine = engine();
    let required = StateVector::new().with("W_witness", 0.45);
    let bare = StateVector::new().with("W_witness", 0.30);
    let report = engine.check_constraints(&bare, &required, 3.0, 3.0);
    // Nothing evaluable failed, so the plan stays feasible.
    assert!(report.feasible);
    assert_eq!(report.feasibility_score, 1.0);
}

#[test]
fn solver_output_feeds_checker_cleanly() {
    let engine = engine();
    let current = settled_current();
    let solved = engine.solve("inner_peace", 0.6, &current, None).unwrap();
    assert!(solved.goal_achievable);

    let report =
        engine.check_constraints(&current, solved.required.vector(), 3.0, 3.0);
    // A modest solved requirement over a settled baseline should not
    // hit blocking violations.
    assert!(
        report.feasible,
        "unexpected blockers: {:?}",
        report.violations()
    );
}
