//! The five transformation strategy archetypes.
//!
//! Each archetype is a static profile: how stable its pacing is, how
//! much it leans on receptive conditions rather than deliberate effort,
//! how it counts and paces steps, and which operators it works first.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stability/grace/effort profile of one archetype.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StrategyProfile {
    /// How resistant the pathway is to disruption, `[0, 1]`.
    pub stability: f32,
    /// How much progress depends on conditions outside deliberate
    /// control, `[0, 1]`.
    pub grace_dependency: f32,
    /// Sustained deliberate effort demanded, `[0, 1]`.
    pub effort: f32,
}

/// The five pacing archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Few large steps, front-loaded. Fast and destabilizing.
    Direct,
    /// Many small steps, linear. Slow and steady.
    Gradual,
    /// Receptivity-led pacing; effort low, conditions decisive.
    Grace,
    /// Discipline-led, linear, high sustained effort.
    Effort,
    /// Balanced blend of effort and receptivity.
    Hybrid,
}

impl StrategyKind {
    /// All archetypes in canonical order.
    pub fn all() -> [StrategyKind; 5] {
        [
            StrategyKind::Direct,
            StrategyKind::Gradual,
            StrategyKind::Grace,
            StrategyKind::Effort,
            StrategyKind::Hybrid,
        ]
    }

    /// Static profile for this archetype.
    pub fn profile(&self) -> StrategyProfile {
        match self {
            StrategyKind::Direct => StrategyProfile {
                stability: 0.40,
                grace_dependency: 0.20,
                effort: 0.90,
            },
            StrategyKind::Gradual => StrategyProfile {
                stability: 0.90,
                grace_dependency: 0.30,
                effort: 0.50,
            },
            StrategyKind::Grace => StrategyProfile {
                stability: 0.60,
                grace_dependency: 0.90,
                effort: 0.30,
            },
            StrategyKind::Effort => StrategyProfile {
                stability: 0.70,
                grace_dependency: 0.10,
                effort: 0.95,
            },
            StrategyKind::Hybrid => StrategyProfile {
                stability: 0.70,
                grace_dependency: 0.50,
                effort: 0.60,
            },
        }
    }

    /// Step count heuristic from the mean gap magnitude, before the
    /// configured bounds are applied.
    pub fn step_count(&self, mean_gap: f32) -> usize {
        let gap = mean_gap.clamp(0.0, 1.0);
        match self {
            StrategyKind::Direct => {
                if gap > 0.3 {
                    3
                } else {
                    2
                }
            }
            StrategyKind::Gradual => ((gap / 0.1).ceil() as usize).clamp(4, 8),
            StrategyKind::Grace => (3.0 + gap * 4.0).round() as usize,
            StrategyKind::Effort => (3.0 + gap * 6.0).round() as usize,
            StrategyKind::Hybrid => (3.0 + gap * 4.0).round() as usize,
        }
    }

    /// Cumulative progress at step fraction `t` in `[0, 1]`.
    ///
    /// Direct front-loads (`sqrt`), grace uses the softer `t^0.7`
    /// curve, the rest interpolate linearly. All curves are monotone
    /// with `pacing(0) = 0` and `pacing(1) = 1`.
    pub fn pacing(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            StrategyKind::Direct => t.sqrt(),
            StrategyKind::Grace => t.powf(0.7),
            StrategyKind::Gradual | StrategyKind::Effort | StrategyKind::Hybrid => t,
        }
    }

    /// Operators this archetype works first and second; everything else
    /// falls into the implicit third tier.
    pub fn priority_tiers(&self) -> [&'static [&'static str]; 2] {
        match self {
            StrategyKind::Direct => [
                &["In_intention", "Di_discipline", "W_witness"],
                &["P_presence", "Cl_clarity"],
            ],
            StrategyKind::Gradual => [
                &["Gd_grounding", "P_presence", "Em_embodiment"],
                &["W_witness", "Eq_equanimity"],
            ],
            StrategyKind::Grace => [
                &["G_grace", "S_surrender", "Tr_trust"],
                &["Hu_humility", "Gr_gratitude"],
            ],
            StrategyKind::Effort => [
                &["Di_discipline", "In_intention", "En_energy"],
                &["W_witness", "Se_service"],
            ],
            StrategyKind::Hybrid => [
                &["W_witness", "In_intention", "S_surrender"],
                &["P_presence", "Tr_trust"],
            ],
        }
    }

    /// Tier index (0, 1 or 2) of an operator under this archetype.
    pub fn tier_of(&self, operator: &str) -> usize {
        let tiers = self.priority_tiers();
        if tiers[0].contains(&operator) {
            0
        } else if tiers[1].contains(&operator) {
            1
        } else {
            2
        }
    }

    /// Multiplier applied to per-step duration estimates.
    pub fn duration_multiplier(&self) -> f32 {
        match self {
            StrategyKind::Direct => 0.6,
            StrategyKind::Gradual => 1.4,
            StrategyKind::Grace => 1.0,
            StrategyKind::Effort => 0.8,
            StrategyKind::Hybrid => 1.0,
        }
    }

    /// Multiplier applied to per-step energy estimates.
    pub fn energy_multiplier(&self) -> f32 {
        match self {
            StrategyKind::Direct => 1.3,
            StrategyKind::Gradual => 0.8,
            StrategyKind::Grace => 0.6,
            StrategyKind::Effort => 1.2,
            StrategyKind::Hybrid => 1.0,
        }
    }

    /// Multiplier applied to per-step difficulty estimates.
    pub fn difficulty_multiplier(&self) -> f32 {
        match self {
            StrategyKind::Direct => 1.2,
            StrategyKind::Gradual => 0.8,
            StrategyKind::Grace => 0.9,
            StrategyKind::Effort => 1.1,
            StrategyKind::Hybrid => 1.0,
        }
    }

    /// Factor in the success-probability product.
    pub fn success_factor(&self) -> f32 {
        match self {
            StrategyKind::Direct => 0.85,
            StrategyKind::Gradual => 1.0,
            StrategyKind::Grace => 0.90,
            StrategyKind::Effort => 0.95,
            StrategyKind::Hybrid => 1.0,
        }
    }

    /// One-line characterization, used in trade-off narratives.
    pub fn description(&self) -> &'static str {
        match self {
            StrategyKind::Direct => {
                "confronts the largest changes immediately, trading stability for speed"
            }
            StrategyKind::Gradual => {
                "advances in small, consolidated increments that rarely destabilize"
            }
            StrategyKind::Grace => {
                "cultivates receptive conditions and lets change arrive rather than forcing it"
            }
            StrategyKind::Effort => {
                "applies disciplined daily effort on a fixed schedule"
            }
            StrategyKind::Hybrid => {
                "alternates deliberate effort with receptive consolidation"
            }
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::Direct => "direct",
            StrategyKind::Gradual => "gradual",
            StrategyKind::Grace => "grace",
            StrategyKind::Effort => "effort",
            StrategyKind::Hybrid => "hybrid",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_in_range() {
        for strategy in StrategyKind::all() {
            let p = strategy.profile();
            assert!((0.0..=1.0).contains(&p.stability));
            assert!((0.0..=1.0).contains(&p.grace_dependency));
            assert!((0.0..=1.0).contains(&p.effort));
        }
    }

    #[test]
    fn test_direct_fewest_gradual_most_steps() {
        let gap = 0.4;
        let direct = StrategyKind::Direct.step_count(gap);
        let gradual = StrategyKind::Gradual.step_count(gap);
        assert!(direct <= 3);
        assert!(gradual >= 4);
        assert!(direct < gradual);
    }

    #[test]
    fn test_pacing_monotone_with_fixed_endpoints() {
        for strategy in StrategyKind::all() {
            assert_eq!(strategy.pacing(0.0), 0.0);
            assert!((strategy.pacing(1.0) - 1.0).abs() < 1e-6);
            let mut last = 0.0;
            for i in 1..=10 {
                let p = strategy.pacing(i as f32 / 10.0);
                assert!(p >= last, "{strategy} pacing not monotone");
                last = p;
            }
        }
    }

    #[test]
    fn test_direct_front_loads() {
        assert!(StrategyKind::Direct.pacing(0.3) > 0.3);
        assert_eq!(StrategyKind::Effort.pacing(0.3), 0.3);
    }

    #[test]
    fn test_grace_prioritizes_receptive_operators() {
        assert_eq!(StrategyKind::Grace.tier_of("G_grace"), 0);
        assert_eq!(StrategyKind::Grace.tier_of("Hu_humility"), 1);
        assert_eq!(StrategyKind::Grace.tier_of("Di_discipline"), 2);
    }

    #[test]
    fn test_step_counts_proportional_to_gap() {
        for strategy in [StrategyKind::Grace, StrategyKind::Effort, StrategyKind::Hybrid] {
            assert!(strategy.step_count(0.1) <= strategy.step_count(0.6));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", StrategyKind::Grace), "grace");
        assert_eq!(format!("{}", StrategyKind::Hybrid), "hybrid");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&StrategyKind::Direct).unwrap();
        assert_eq!(json, "\"direct\"");
        let back: StrategyKind = serde_json::from_str("\"gradual\"").unwrap();
        assert_eq!(back, StrategyKind::Gradual);
    }
}
