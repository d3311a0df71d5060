//! The outcome catalog: built-in formulas, registration, and the
//! keyword-derived heuristic fallback.
//!
//! The fallback guesses relevant operators from substring matches in the
//! outcome name. Its accuracy is unverified, so it is a separate, clearly
//! flagged path: resolution through it always reports `heuristic = true`
//! and callers may disable it entirely.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{CoreError, CoreResult};
use crate::operators::OperatorRegistry;

use super::model::{OutcomeFormula, OutcomeModel};

/// Keyword fragments mapped to the operators they suggest. Matched as
/// substrings of the lowercased outcome name.
const KEYWORD_OPERATORS: &[(&str, &[&str])] = &[
    ("peace", &["Eq_equanimity", "S_surrender", "St_stress"]),
    ("calm", &["Eq_equanimity", "St_stress"]),
    ("presen", &["P_presence", "W_witness"]),
    ("witness", &["W_witness", "P_presence"]),
    ("aware", &["W_witness", "P_presence", "Cl_clarity"]),
    ("grace", &["G_grace", "S_surrender", "Tr_trust"]),
    ("surrender", &["S_surrender", "At_attachment"]),
    ("clarity", &["Cl_clarity", "Ins_insight"]),
    ("clear", &["Cl_clarity", "Ins_insight"]),
    ("insight", &["Ins_insight", "Cl_clarity", "W_witness"]),
    ("wisdom", &["Ins_insight", "W_witness"]),
    ("love", &["Co_compassion", "Fo_forgiveness", "Gr_gratitude"]),
    ("heart", &["Co_compassion", "Gr_gratitude", "Fo_forgiveness"]),
    ("compassion", &["Co_compassion", "Fo_forgiveness"]),
    ("forgiv", &["Fo_forgiveness", "Co_compassion"]),
    ("gratitude", &["Gr_gratitude"]),
    ("humility", &["Hu_humility", "Eg_ego"]),
    ("freedom", &["At_attachment", "Eg_ego", "S_surrender"]),
    ("liberat", &["At_attachment", "Eg_ego", "S_surrender"]),
    ("energy", &["En_energy", "Em_embodiment", "St_stress"]),
    ("vital", &["En_energy", "Em_embodiment", "St_stress"]),
    ("ground", &["Gd_grounding", "Re_resilience", "Em_embodiment"]),
    ("body", &["Em_embodiment", "Gd_grounding"]),
    ("embodi", &["Em_embodiment", "Gd_grounding"]),
    ("unity", &["Un_unity", "W_witness", "Eg_ego"]),
    ("oneness", &["Un_unity", "W_witness", "Eg_ego"]),
    ("shadow", &["Sh_shadow", "Co_compassion"]),
    ("trust", &["Tr_trust", "G_grace"]),
    ("faith", &["Tr_trust", "G_grace"]),
    ("service", &["Se_service", "Co_compassion"]),
    ("discipline", &["Di_discipline", "In_intention"]),
    ("will", &["Di_discipline", "In_intention"]),
    ("stress", &["St_stress", "Re_resilience"]),
    ("resilien", &["Re_resilience", "Gd_grounding"]),
    ("ego", &["Eg_ego", "Hu_humility"]),
];

/// How a requested outcome name was resolved.
#[derive(Debug)]
pub enum ResolvedOutcome<'a> {
    /// A registered formula matched exactly.
    Registered(&'a dyn OutcomeModel),
    /// No registration; a keyword-derived formula was synthesized.
    Heuristic(OutcomeFormula),
}

impl ResolvedOutcome<'_> {
    /// The model to evaluate.
    pub fn model(&self) -> &dyn OutcomeModel {
        match self {
            ResolvedOutcome::Registered(model) => *model,
            ResolvedOutcome::Heuristic(formula) => formula,
        }
    }

    /// Whether this resolution went through the keyword fallback.
    pub fn is_heuristic(&self) -> bool {
        matches!(self, ResolvedOutcome::Heuristic(_))
    }
}

/// Catalog of named outcome models.
///
/// # Example
///
/// ```
/// use metanoia_core::operators::OperatorRegistry;
/// use metanoia_core::outcome::OutcomeCatalog;
///
/// let registry = OperatorRegistry::builtin();
/// let catalog = OutcomeCatalog::builtin();
///
/// let resolved = catalog.resolve("inner_peace", &registry, true).unwrap();
/// assert!(!resolved.is_heuristic());
///
/// let resolved = catalog.resolve("deep_calm", &registry, true).unwrap();
/// assert!(resolved.is_heuristic());
/// ```
#[derive(Debug, Default)]
pub struct OutcomeCatalog {
    models: BTreeMap<String, Box<dyn OutcomeModel>>,
}

impl OutcomeCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The catalog of built-in formulas.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for formula in builtin_formulas() {
            catalog.register(Box::new(formula));
        }
        catalog
    }

    /// Register (or replace) a model under its own name.
    pub fn register(&mut self, model: Box<dyn OutcomeModel>) {
        self.models.insert(model.name().to_string(), model);
    }

    /// Whether `name` has a registered model.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the catalog has no models.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Resolve a name to a model.
    ///
    /// A registered model wins. Otherwise, when `allow_heuristic` is set,
    /// a keyword-derived formula is synthesized and flagged; when it is
    /// not, or no keyword matches, resolution fails with
    /// [`CoreError::UnknownOutcome`].
    pub fn resolve<'a>(
        &'a self,
        name: &str,
        registry: &OperatorRegistry,
        allow_heuristic: bool,
    ) -> CoreResult<ResolvedOutcome<'a>> {
        if let Some(model) = self.models.get(name) {
            return Ok(ResolvedOutcome::Registered(model.as_ref()));
        }
        if !allow_heuristic {
            return Err(CoreError::UnknownOutcome(name.to_string()));
        }
        let formula = heuristic_formula(name, registry)?;
        debug!(
            outcome = name,
            operators = ?formula.relevant_operators(),
            "no registered formula, synthesized keyword heuristic"
        );
        Ok(ResolvedOutcome::Heuristic(formula))
    }
}

/// Synthesize an equal-weight formula from keyword matches on `name`.
///
/// Inversion flags come from the registry, so a guessed formula still
/// reads `At_attachment` as `1 - v`. Fails when no keyword matches.
pub fn heuristic_formula(name: &str, registry: &OperatorRegistry) -> CoreResult<OutcomeFormula> {
    let lowered = name.to_lowercase();
    let mut operators: Vec<&str> = Vec::new();
    for (keyword, ops) in KEYWORD_OPERATORS {
        if lowered.contains(keyword) {
            for op in *ops {
                if !operators.contains(op) {
                    operators.push(*op);
                }
            }
        }
    }
    if operators.is_empty() {
        return Err(CoreError::UnknownOutcome(name.to_string()));
    }
    let weight = 1.0 / operators.len() as f32;
    let mut formula = OutcomeFormula::new(name);
    for op in operators {
        formula = if registry.is_inverted(op) {
            formula.with_inverted_term(op, weight)
        } else {
            formula.with_term(op, weight)
        };
    }
    formula.validated()
}

fn builtin_formulas() -> Vec<OutcomeFormula> {
    let formulas = [
        OutcomeFormula::new("inner_peace")
            .with_term("Eq_equanimity", 0.25)
            .with_term("S_surrender", 0.20)
            .with_inverted_term("St_stress", 0.20)
            .with_term("P_presence", 0.20)
            .with_inverted_term("At_attachment", 0.15),
        OutcomeFormula::new("embodied_presence")
            .with_term("W_witness", 0.30)
            .with_term("P_presence", 0.40)
            .with_term("Em_embodiment", 0.30),
        OutcomeFormula::new("liberation")
            .with_inverted_term("At_attachment", 0.30)
            .with_inverted_term("Eg_ego", 0.30)
            .with_term("S_surrender", 0.25)
            .with_term("W_witness", 0.15),
        OutcomeFormula::new("heart_opening")
            .with_term("Co_compassion", 0.30)
            .with_term("Fo_forgiveness", 0.25)
            .with_term("Gr_gratitude", 0.25)
            .with_term("Hu_humility", 0.20),
        OutcomeFormula::new("clear_seeing")
            .with_term("Cl_clarity", 0.40)
            .with_term("Ins_insight", 0.30)
            .with_term("W_witness", 0.30),
        OutcomeFormula::new("vitality")
            .with_term("En_energy", 0.35)
            .with_term("Em_embodiment", 0.25)
            .with_term("Gd_grounding", 0.20)
            .with_inverted_term("St_stress", 0.20),
        OutcomeFormula::new("grace_alignment")
            .with_term("G_grace", 0.35)
            .with_term("S_surrender", 0.35)
            .with_term("W_witness", 0.30),
        OutcomeFormula::new("shadow_integration")
            .with_term("Sh_shadow", 0.40)
            .with_term("Co_compassion", 0.20)
            .with_term("W_witness", 0.20)
            .with_term("Re_resilience", 0.20),
        OutcomeFormula::new("unity_consciousness")
            .with_term("Un_unity", 0.40)
            .with_term("W_witness", 0.25)
            .with_term("S_surrender", 0.20)
            .with_inverted_term("Eg_ego", 0.15),
        OutcomeFormula::new("resilient_ground")
            .with_term("Re_resilience", 0.30)
            .with_term("Gd_grounding", 0.30)
            .with_term("Eq_equanimity", 0.20)
            .with_inverted_term("St_stress", 0.20),
    ];
    formulas
        .into_iter()
        .map(|f| f.validated().expect("builtin formula must validate"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StateVector;

    #[test]
    fn test_builtin_catalog_has_ten_outcomes() {
        let catalog = OutcomeCatalog::builtin();
        assert_eq!(catalog.len(), 10);
        assert!(catalog.contains("inner_peace"));
        assert!(catalog.contains("grace_alignment"));
        assert!(catalog.contains("unity_consciousness"));
    }

    #[test]
    fn test_builtin_formulas_only_use_known_operators() {
        let registry = OperatorRegistry::builtin();
        for formula in builtin_formulas() {
            for op in formula.relevant_operators() {
                assert!(registry.contains(op), "unknown operator {op}");
            }
        }
    }

    #[test]
    fn test_builtin_inversion_flags_match_registry() {
        let registry = OperatorRegistry::builtin();
        for formula in builtin_formulas() {
            for term in formula.terms() {
                assert_eq!(
                    term.inverted,
                    registry.is_inverted(&term.operator),
                    "{}:{} inversion mismatch",
                    formula.name(),
                    term.operator
                );
            }
        }
    }

    #[test]
    fn test_resolve_registered() {
        let registry = OperatorRegistry::builtin();
        let catalog = OutcomeCatalog::builtin();
        let resolved = catalog.resolve("liberation", &registry, false).unwrap();
        assert!(!resolved.is_heuristic());
        assert_eq!(resolved.model().name(), "liberation");
    }

    #[test]
    fn test_resolve_heuristic_flagged() {
        let registry = OperatorRegistry::builtin();
        let catalog = OutcomeCatalog::builtin();
        let resolved = catalog
            .resolve("deep_peace_and_trust", &registry, true)
            .unwrap();
        assert!(resolved.is_heuristic());
        let relevant = resolved.model().relevant_operators();
        assert!(relevant.contains(&"Eq_equanimity".to_string()));
        assert!(relevant.contains(&"Tr_trust".to_string()));
    }

    #[test]
    fn test_resolve_heuristic_disabled() {
        let registry = OperatorRegistry::builtin();
        let catalog = OutcomeCatalog::builtin();
        let err = catalog
            .resolve("deep_peace", &registry, false)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownOutcome(_)));
    }

    #[test]
    fn test_resolve_no_keyword_match() {
        let registry = OperatorRegistry::builtin();
        let catalog = OutcomeCatalog::builtin();
        let err = catalog
            .resolve("zxqv_nothing", &registry, true)
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownOutcome(_)));
    }

    #[test]
    fn test_heuristic_respects_inversion() {
        let registry = OperatorRegistry::builtin();
        let formula = heuristic_formula("release_of_ego", &registry).unwrap();
        let term = formula
            .terms()
            .iter()
            .find(|t| t.operator == "Eg_ego")
            .unwrap();
        assert!(term.inverted);

        // Lower ego must raise the heuristic score.
        let low = StateVector::new().with("Eg_ego", 0.2).with("Hu_humility", 0.5);
        let high = StateVector::new().with("Eg_ego", 0.8).with("Hu_humility", 0.5);
        assert!(formula.evaluate(&low).unwrap() > formula.evaluate(&high).unwrap());
    }

    #[test]
    fn test_register_replaces() {
        let registry = OperatorRegistry::builtin();
        let mut catalog = OutcomeCatalog::builtin();
        let custom = OutcomeFormula::new("inner_peace")
            .with_term("W_witness", 1.0)
            .validated()
            .unwrap();
        catalog.register(Box::new(custom));
        assert_eq!(catalog.len(), 10);
        let resolved = catalog.resolve("inner_peace", &registry, false).unwrap();
        assert_eq!(resolved.model().relevant_operators().len(), 1);
    }

    #[test]
    fn test_builtin_scores_in_range() {
        let registry = OperatorRegistry::builtin();
        let catalog = OutcomeCatalog::builtin();
        let v = registry.default_vector();
        for name in catalog.names() {
            let resolved = catalog.resolve(name, &registry, false).unwrap();
            let score = resolved.model().evaluate(&v).unwrap();
            assert!((0.0..=1.0).contains(&score), "{name} out of range: {score}");
        }
    }
}
