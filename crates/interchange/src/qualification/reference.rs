use serde::Serialize;

use super::domain::Tier;
use super::ladder::LADDER;

/// Fields a rung checks, grouped for the "what do I need" helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TierRequirements {
    pub tier: Tier,
    pub fields: Vec<String>,
}

/// Fields the given tier checks on its own rung. `Downgraded` is not a rung and has none.
pub fn required_fields(tier: Tier) -> Vec<String> {
    LADDER
        .iter()
        .find(|rule| rule.tier == tier)
        .map(|rule| {
            let scope = match rule.tier {
                Tier::L3 => "line item ",
                _ => "",
            };
            rule.requirement
                .fields()
                .iter()
                .map(|field| format!("{scope}{field}"))
                .collect()
        })
        .unwrap_or_default()
}

/// Every rung above `current` up to and including `target`, in ladder order.
///
/// Returns an empty list when `target` is not above `current` or either is off the ladder.
pub fn requirements_to_reach(current: Tier, target: Tier) -> Vec<TierRequirements> {
    let position = |tier: Tier| LADDER.iter().position(|rule| rule.tier == tier);
    let (Some(from), Some(to)) = (position(current), position(target)) else {
        return Vec::new();
    };
    if to <= from {
        return Vec::new();
    }

    LADDER[from + 1..=to]
        .iter()
        .map(|rule| TierRequirements {
            tier: rule.tier,
            fields: required_fields(rule.tier),
        })
        .collect()
}

/// Badge colour the dashboard paints a tier with.
pub fn tier_color(tier: Tier) -> &'static str {
    match tier {
        Tier::L3 => "#16a34a",
        Tier::L2 => "#2563eb",
        Tier::L1 => "#6b7280",
        Tier::Downgraded => "#dc2626",
    }
}
