use super::config::{BaseRate, RateTable};
use super::domain::{CardFacts, Level2Data, Level3Data, LineItem, MissingField, Tier};

/// Ordered qualification ladder. Index 0 is the worst-case tier every card reaches.
pub const LADDER: [TierRule; 3] = [
    TierRule {
        tier: Tier::L1,
        requirement: Requirement::CardOnly,
        requires_predecessor: false,
    },
    TierRule {
        tier: Tier::L2,
        requirement: Requirement::Level2Fields,
        requires_predecessor: true,
    },
    TierRule {
        tier: Tier::L3,
        requirement: Requirement::Level3LineItems,
        requires_predecessor: true,
    },
];

/// One rung of the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierRule {
    pub tier: Tier,
    pub requirement: Requirement,
    /// The rung below must have been reached before this one is evaluated.
    pub requires_predecessor: bool,
}

/// Completeness rule a rung applies to the enrichment payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    CardOnly,
    Level2Fields,
    Level3LineItems,
}

const LEVEL2_FIELDS: &[&str] = &["customer code", "tax amount"];
const LINE_ITEM_FIELDS: &[&str] = &[
    "product code",
    "description",
    "quantity",
    "unit price",
    "commodity code",
];

impl Requirement {
    /// Fields this rung checks, in the order diagnostics are reported.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Requirement::CardOnly => &[],
            Requirement::Level2Fields => LEVEL2_FIELDS,
            Requirement::Level3LineItems => LINE_ITEM_FIELDS,
        }
    }

    fn check(&self, tier: Tier, level2: Option<&Level2Data>, level3: Option<&Level3Data>) -> Check {
        match self {
            Requirement::CardOnly => Check::Satisfied,
            Requirement::Level2Fields => match level2 {
                None => Check::absent(tier),
                Some(data) => check_level2(tier, data),
            },
            Requirement::Level3LineItems => match level3 {
                None => Check::absent(tier),
                Some(data) if data.line_items.is_empty() => Check::Unmet {
                    missing: vec![MissingField::field(tier, "line items not provided")],
                    incomplete: false,
                },
                Some(data) => check_line_items(tier, &data.line_items),
            },
        }
    }
}

enum Check {
    Satisfied,
    /// `incomplete` marks a payload that was supplied but fell short, which earns a warning.
    Unmet {
        missing: Vec<MissingField>,
        incomplete: bool,
    },
}

impl Check {
    fn absent(tier: Tier) -> Self {
        Check::Unmet {
            missing: vec![MissingField::payload_absent(tier)],
            incomplete: false,
        }
    }
}

fn check_level2(tier: Tier, data: &Level2Data) -> Check {
    let present = [
        is_filled(&data.customer_code),
        is_filled(&data.tax_amount),
    ];

    let missing: Vec<MissingField> = LEVEL2_FIELDS
        .iter()
        .zip(present)
        .filter(|(_, filled)| !filled)
        .map(|(field, _)| MissingField::field(tier, field))
        .collect();

    if missing.is_empty() {
        Check::Satisfied
    } else {
        Check::Unmet {
            missing,
            incomplete: true,
        }
    }
}

fn check_line_items(tier: Tier, items: &[LineItem]) -> Check {
    let mut failures = [0usize; LINE_ITEM_FIELDS.len()];
    for item in items {
        let present = [
            is_filled(&item.product_code),
            is_filled(&item.description),
            item.quantity.is_finite() && item.quantity > 0.0,
            item
                .unit_price
                .map(|price| price.is_finite() && price >= 0.0)
                .unwrap_or(false),
            item.commodity_code.as_deref().map(is_filled).unwrap_or(false),
        ];
        for (count, filled) in failures.iter_mut().zip(present) {
            if !filled {
                *count += 1;
            }
        }
    }

    let missing: Vec<MissingField> = LINE_ITEM_FIELDS
        .iter()
        .zip(failures)
        .filter(|(_, count)| *count > 0)
        .map(|(field, count)| {
            MissingField::field(
                tier,
                format!("{field} missing on {count} of {} line item(s)", items.len()),
            )
        })
        .collect();

    if missing.is_empty() {
        Check::Satisfied
    } else {
        Check::Unmet {
            missing,
            incomplete: true,
        }
    }
}

fn is_filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Tier resolver output before discounting.
#[derive(Debug, Clone, PartialEq)]
pub struct TierResolution {
    pub tier: Tier,
    pub base_rate: BaseRate,
    pub missing_fields: Vec<MissingField>,
    pub warnings: Vec<String>,
}

/// Walks the ladder upward, stopping at the first rung whose predecessor was not reached.
pub fn resolve_tier(
    card: &CardFacts,
    level2: Option<&Level2Data>,
    level3: Option<&Level3Data>,
    rates: &RateTable,
) -> TierResolution {
    let mut reached = 0;
    let mut missing_fields = Vec::new();
    let mut warnings = Vec::new();

    for (step, rule) in LADDER.iter().enumerate().skip(1) {
        if rule.requires_predecessor && reached + 1 != step {
            break;
        }

        match rule.requirement.check(rule.tier, level2, level3) {
            Check::Satisfied => reached = step,
            Check::Unmet {
                missing,
                incomplete,
            } => {
                missing_fields.extend(missing);
                if incomplete {
                    let outcome = if reached == 0 {
                        "downgrade to"
                    } else {
                        "be processed as"
                    };
                    warnings.push(format!(
                        "{} data incomplete: transaction will {outcome} {}",
                        rule.tier, LADDER[reached].tier
                    ));
                }
            }
        }
    }

    TierResolution {
        tier: LADDER[reached].tier,
        base_rate: rates.rate_at(reached, card.is_commercial),
        missing_fields,
        warnings,
    }
}
