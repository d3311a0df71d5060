//! Static operator-to-practice lookup.

use super::strategy::StrategyKind;

/// Recommended practices per operator.
const PRACTICES: &[(&str, &[&str])] = &[
    ("W_witness", &["open awareness sitting", "noting practice"]),
    ("P_presence", &["breath anchoring", "walking meditation"]),
    ("Cl_clarity", &["journaling inquiry", "single-pointed concentration"]),
    ("Ins_insight", &["self-inquiry", "contemplative reading"]),
    ("Eq_equanimity", &["equanimity reflection", "exposure with allowing"]),
    ("S_surrender", &["letting-go practice", "savasana with release intent"]),
    ("At_attachment", &["impermanence contemplation", "simplicity commitments"]),
    ("Av_aversion", &["gentle exposure", "welcoming practice"]),
    ("Eg_ego", &["self-forgetting service", "who-am-I inquiry"]),
    ("G_grace", &["devotional prayer", "receptive silence"]),
    ("Tr_trust", &["trust experiments", "gratitude for what held"]),
    ("Gr_gratitude", &["daily gratitude listing", "appreciation letters"]),
    ("Co_compassion", &["loving-kindness meditation", "tonglen"]),
    ("Fo_forgiveness", &["forgiveness meditation", "letter writing unsent"]),
    ("Hu_humility", &["asking for help", "beginner's-mind tasks"]),
    ("In_intention", &["morning intention setting", "vow renewal"]),
    ("Di_discipline", &["fixed daily sit", "practice log"]),
    ("Se_service", &["anonymous service", "community volunteering"]),
    ("En_energy", &["breathwork", "sleep hygiene"]),
    ("Gd_grounding", &["barefoot walking", "body scan"]),
    ("Em_embodiment", &["yoga asana", "somatic tracking"]),
    ("Re_resilience", &["cold exposure", "recovery rituals"]),
    ("St_stress", &["restorative breathing", "schedule pruning"]),
    ("Un_unity", &["sky-gazing", "boundless awareness practice"]),
    ("Sh_shadow", &["shadow journaling", "parts dialogue"]),
];

/// Practices for one operator; empty for unknown keys.
pub fn practices_for(operator: &str) -> &'static [&'static str] {
    PRACTICES
        .iter()
        .find(|(op, _)| *op == operator)
        .map(|(_, p)| *p)
        .unwrap_or(&[])
}

/// Practices an archetype adds regardless of operator mix.
pub fn strategy_practices(strategy: StrategyKind) -> &'static [&'static str] {
    match strategy {
        StrategyKind::Direct => &["intensive retreat blocks", "accountability check-ins"],
        StrategyKind::Gradual => &["weekly review", "habit stacking"],
        StrategyKind::Grace => &["surrender practice", "sacred reading"],
        StrategyKind::Effort => &["structured daily sadhana", "progress tracking"],
        StrategyKind::Hybrid => &["alternating effort and rest weeks"],
    }
}
