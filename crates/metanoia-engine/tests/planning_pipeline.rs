//! Full planning pipeline tests.
//!
//! Drives solve -> constraints -> pathways -> optimization -> stages ->
//! MVT through the facade the way the surrounding service layer does,
//! and checks the cross-component properties: range discipline
//! everywhere, stage blocking honesty, MVT efficiency bounds, and JSON
//! serializability of every payload.

use metanoia_core::{OperatorRegistry, StateVector};
use metanoia_engine::pathway::StrategyKind;
use metanoia_engine::TransformationEngine;

fn engine() -> TransformationEngine {
    TransformationEngine::with_defaults()
}

/// A practitioner early in the work, stable enough to plan for.
fn seeker() -> StateVector {
    OperatorRegistry::builtin()
        .default_vector()
        .with("W_witness", 0.35)
        .with("S_surrender", 0.30)
        .with("G_grace", 0.25)
        .with("St_stress", 0.40)
        .with("En_energy", 0.55)
        .with("Gd_grounding", 0.55)
        .with("Em_embodiment", 0.50)
        .with("Re_resilience", 0.55)
}

#[test]
fn full_pipeline_produces_consistent_artifacts() {
    let engine = engine();
    let current = seeker();

    let solved = engine.solve("grace_alignment", 0.75, &current, None).unwrap();
    assert!(solved.goal_achievable, "diagnostics: {:?}", solved.diagnostics);
    let required = solved.required.vector().clone();

    let feasibility = engine.check_constraints(&current, &required, 3.0, 4.0);
    assert!((0.0..=1.0).contains(&feasibility.feasibility_score));

    let pathways = engine
        .generate_pathways(&current, &required, 3.0, 4.0, 5)
        .unwrap();
    assert_eq!(pathways.len(), 5);

    let ranking = engine.optimize_pathways(&pathways, None).unwrap();
    assert_eq!(ranking.scores.len(), 5);
    assert!(pathways.iter().any(|p| p.id == ranking.recommended));

    let mvt = engine.compute_mvt(&current, &required, 3).unwrap();
    assert!(mvt.selected.len() <= 3);
    assert!(mvt.efficiency <= 1.0);
}

#[test]
fn every_pipeline_score_is_clamped() {
    let engine = engine();
    let current = seeker();
    let solved = engine.solve("liberation", 0.8, &current, None).unwrap();
    let required = solved.required.vector().clone();

    let pathways = engine
        .generate_pathways(&current, &required, 3.0, 4.0, 5)
        .unwrap();
    for pathway in &pathways {
        assert!((0.0..=1.0).contains(&pathway.stability));
        assert!((0.0..=1.0).contains(&pathway.effort));
        assert!((0.0..=1.0).contains(&pathway.grace_dependency));
        assert!((0.2..=0.95).contains(&pathway.success_probability));
        for step in &pathway.steps {
            assert!((0.0..=1.0).contains(&step.difficulty));
            assert!((0.0..=1.0).contains(&step.energy));
            for t in &step.transitions {
                assert!((0.0..=1.0).contains(&t.from));
                assert!((0.0..=1.0).contains(&t.to));
            }
        }
    }

    let ranking = engine.optimize_pathways(&pathways, None).unwrap();
    for score in &ranking.scores {
        assert!((0.0..=1.0).contains(&score.total));
        assert!((0.0..=100.0).contains(&score.percentile));
    }
}

#[test]
fn stages_never_unblock_ahead_of_prerequisites() {
    let engine = engine();
    let current = seeker()
        .with("Av_aversion", 0.60)
        .with("At_attachment", 0.65)
        .with("Eg_ego", 0.70)
        .with("Un_unity", 0.10);
    let required = StateVector::new()
        .with("W_witness", 0.70)
        .with("Av_aversion", 0.25)
        .with("At_attachment", 0.30)
        .with("Eg_ego", 0.30)
        .with("S_surrender", 0.75)
        .with("G_grace", 0.70)
        .with("Un_unity", 0.65);

    let sequence = engine.sequence_stages(&current, &required).unwrap();
    for status in &sequence.statuses {
        if status.blocking {
            continue;
        }
        // Unblocked means every prerequisite sits at or above its own
        // required completion.
        for prereq_id in &status.prerequisites {
            let prereq = sequence
                .statuses
                .iter()
                .find(|s| s.stage_id == *prereq_id)
                .unwrap();
            assert!(
                prereq.completion >= prereq.required_completion,
                "stage {} unblocked while prerequisite {} is at {:.2} of {:.2}",
                status.stage_id,
                prereq.stage_id,
                prereq.completion,
                prereq.required_completion
            );
        }
    }

    // The deep stages of this scenario are nowhere near unblocked.
    let dissolution = sequence
        .statuses
        .iter()
        .find(|s| s.stage_id == 4)
        .unwrap();
    assert!(dissolution.blocking);
}

#[test]
fn mvt_keystone_scenario_stays_small() {
    let engine = engine();
    let current = OperatorRegistry::builtin().default_vector();
    // Ten required changes; witness cascades into four of them.
    let required = StateVector::new()
        .with("W_witness", 0.75)
        .with("P_presence", 0.70)
        .with("Eq_equanimity", 0.65)
        .with("Cl_clarity", 0.70)
        .with("S_surrender", 0.70)
        .with("G_grace", 0.60)
        .with("Tr_trust", 0.65)
        .with("Gd_grounding", 0.70)
        .with("Em_embodiment", 0.65)
        .with("En_energy", 0.70);

    let mvt = engine.compute_mvt(&current, &required, 3).unwrap();
    assert!(mvt.selected.len() <= 3);
    assert_eq!(mvt.naive_count, 10);
    assert!(mvt.efficiency <= 0.5);
    // Witness must be in the selection with its cascade intact.
    let witness = mvt
        .selected
        .iter()
        .find(|s| s.change.operator == "W_witness")
        .expect("witness keystone expected");
    assert!(witness.cascade_targets.len() >= 3);
}

#[test]
fn pathway_count_respects_request() {
    let engine = engine();
    let current = seeker();
    let solved = engine.solve("heart_opening", 0.75, &current, None).unwrap();
    let required = solved.required.vector().clone();

    for n in 1..=5 {
        let pathways = engine
            .generate_pathways(&current, &required, 3.0, 3.0, n)
            .unwrap();
        assert_eq!(pathways.len(), n);
    }
    // Requests beyond the archetype count saturate at five.
    let pathways = engine
        .generate_pathways(&current, &required, 3.0, 3.0, 9)
        .unwrap();
    assert_eq!(pathways.len(), 5);
}

#[test]
fn gradual_outranks_direct_on_stability_weighting() {
    let engine = engine();
    let current = seeker();
    let solved = engine.solve("grace_alignment", 0.75, &current, None).unwrap();
    let pathways = engine
        .generate_pathways(&current, solved.required.vector(), 3.0, 4.0, 5)
        .unwrap();

    let stability_first = metanoia_engine::config::OptimizerConfig {
        speed_weight: 0.0,
        stability_weight: 1.0,
        effort_weight: 0.0,
        side_effect_weight: 0.0,
        success_weight: 0.0,
    };
    let ranking = engine
        .optimize_pathways(&pathways, Some(&stability_first))
        .unwrap();
    assert_eq!(ranking.scores[0].strategy, StrategyKind::Gradual);
}

#[test]
fn all_payloads_serialize_to_json() {
    let engine = engine();
    let current = seeker();
    let solved = engine.solve("grace_alignment", 0.75, &current, None).unwrap();
    let required = solved.required.vector().clone();
    let feasibility = engine.check_constraints(&current, &required, 3.0, 4.0);
    let coherence = engine.validate_coherence(&required, 4.0);
    let pathways = engine
        .generate_pathways(&current, &required, 3.0, 4.0, 5)
        .unwrap();
    let ranking = engine.optimize_pathways(&pathways, None).unwrap();
    let mvt = engine.compute_mvt(&current, &required, 4).unwrap();

    for json in [
        serde_json::to_string(&solved).unwrap(),
        serde_json::to_string(&feasibility).unwrap(),
        serde_json::to_string(&coherence).unwrap(),
        serde_json::to_string(&pathways).unwrap(),
        serde_json::to_string(&ranking).unwrap(),
        serde_json::to_string(&mvt).unwrap(),
    ] {
        assert!(!json.is_empty());
        // Every payload must parse back as generic JSON.
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_object() || value.is_array());
    }
}
