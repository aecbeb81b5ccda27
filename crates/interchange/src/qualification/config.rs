use serde::{Deserialize, Serialize};

use super::domain::Tier;
use super::ladder::LADDER;

/// Operator-tunable pricing inputs injected into the engine at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationConfig {
    pub rates: Vec<TierRate>,
    /// Fractional reduction granted by the enhanced-data discount program (0.05 = 5%).
    pub discount_fraction: f64,
    #[serde(default)]
    pub rounding: RoundingPolicy,
}

impl Default for QualificationConfig {
    fn default() -> Self {
        Self {
            rates: vec![
                TierRate {
                    tier: Tier::L1,
                    standard: 2.65,
                    commercial: 2.95,
                },
                TierRate {
                    tier: Tier::L2,
                    standard: 2.05,
                    commercial: 2.50,
                },
                TierRate {
                    tier: Tier::L3,
                    standard: 1.65,
                    commercial: 1.95,
                },
            ],
            discount_fraction: 0.05,
            rounding: RoundingPolicy::default(),
        }
    }
}

impl QualificationConfig {
    /// Validates the table against the ladder and returns the lookup the resolver uses.
    pub fn rate_table(&self) -> Result<RateTable, RateTableError> {
        if !self.discount_fraction.is_finite() || !(0.0..1.0).contains(&self.discount_fraction) {
            return Err(RateTableError::InvalidDiscount(self.discount_fraction));
        }
        self.rounding.validate()?;

        let mut entries = Vec::with_capacity(LADDER.len());
        for rule in LADDER.iter() {
            let mut matching = self.rates.iter().filter(|rate| rate.tier == rule.tier);
            let entry = matching
                .next()
                .ok_or(RateTableError::MissingTier(rule.tier))?;
            if matching.next().is_some() {
                return Err(RateTableError::DuplicateTier(rule.tier));
            }
            if !(entry.standard.is_finite() && entry.standard > 0.0)
                || !(entry.commercial.is_finite() && entry.commercial > 0.0)
            {
                return Err(RateTableError::InvalidRate(rule.tier));
            }
            if entry.commercial < entry.standard {
                return Err(RateTableError::CommercialBelowStandard {
                    tier: rule.tier,
                    standard: entry.standard,
                    commercial: entry.commercial,
                });
            }
            entries.push(*entry);
        }

        if let Some(extra) = self
            .rates
            .iter()
            .find(|rate| !LADDER.iter().any(|rule| rule.tier == rate.tier))
        {
            return Err(RateTableError::UnknownTier(extra.tier));
        }

        for pair in entries.windows(2) {
            let (lower, higher) = (&pair[0], &pair[1]);
            if higher.standard >= lower.standard || higher.commercial >= lower.commercial {
                return Err(RateTableError::NotDecreasing {
                    lower: lower.tier,
                    higher: higher.tier,
                });
            }
        }

        Ok(RateTable { entries })
    }
}

/// Rates in percentage points for one tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierRate {
    pub tier: Tier,
    pub standard: f64,
    pub commercial: f64,
}

impl TierRate {
    pub fn for_card(&self, is_commercial: bool) -> f64 {
        if is_commercial {
            self.commercial
        } else {
            self.standard
        }
    }
}

/// Decimal places used when reporting figures back to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundingPolicy {
    pub percent_decimals: u32,
    pub currency_decimals: u32,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            percent_decimals: 1,
            currency_decimals: 2,
        }
    }
}

impl RoundingPolicy {
    /// Finest precision a reported figure may be rounded to.
    pub const MAX_DECIMALS: u32 = 10;

    fn validate(&self) -> Result<(), RateTableError> {
        for (field, decimals) in [
            ("percentDecimals", self.percent_decimals),
            ("currencyDecimals", self.currency_decimals),
        ] {
            if decimals > Self::MAX_DECIMALS {
                return Err(RateTableError::InvalidRounding { field, decimals });
            }
        }
        Ok(())
    }

    pub fn percent(&self, value: f64) -> f64 {
        round_to(value, self.percent_decimals)
    }

    pub fn currency(&self, value: f64) -> f64 {
        round_to(value, self.currency_decimals)
    }
}

/// Precision past what `f64` can scale is left unrounded rather than turned into NaN.
fn round_to(value: f64, decimals: u32) -> f64 {
    let Ok(exponent) = i32::try_from(decimals) else {
        return value;
    };
    let scale = 10f64.powi(exponent);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / scale
}

/// Rate for a resolved tier, before any program discount.
///
/// Only the rate table hands these out, which keeps the discount step from being fed an
/// already-adjusted rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseRate {
    tier: Tier,
    value: f64,
}

impl BaseRate {
    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Validated rate table, ordered along the qualification ladder.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    entries: Vec<TierRate>,
}

impl RateTable {
    pub(crate) fn rate_at(&self, step: usize, is_commercial: bool) -> BaseRate {
        let entry = &self.entries[step];
        BaseRate {
            tier: entry.tier,
            value: entry.for_card(is_commercial),
        }
    }

    pub fn base_rate(&self, tier: Tier, is_commercial: bool) -> Option<BaseRate> {
        self.entries
            .iter()
            .position(|entry| entry.tier == tier)
            .map(|step| self.rate_at(step, is_commercial))
    }

    /// Rate with no enrichment at all, the baseline savings are measured against.
    pub fn worst_case(&self, is_commercial: bool) -> BaseRate {
        self.rate_at(0, is_commercial)
    }

    /// Rate at the top of the ladder.
    pub fn best_case(&self, is_commercial: bool) -> BaseRate {
        self.rate_at(self.entries.len() - 1, is_commercial)
    }

    pub fn entries(&self) -> &[TierRate] {
        &self.entries
    }
}

/// Rate table invariants that a loaded configuration failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateTableError {
    #[error("rate table has no entry for tier {0}")]
    MissingTier(Tier),
    #[error("rate table lists tier {0} more than once")]
    DuplicateTier(Tier),
    #[error("rate table lists tier {0}, which is not on the qualification ladder")]
    UnknownTier(Tier),
    #[error("rates for tier {0} must be positive and finite")]
    InvalidRate(Tier),
    #[error("commercial rate {commercial} for tier {tier} is below the standard rate {standard}")]
    CommercialBelowStandard {
        tier: Tier,
        standard: f64,
        commercial: f64,
    },
    #[error("rates for tier {higher} must be lower than tier {lower}")]
    NotDecreasing { lower: Tier, higher: Tier },
    #[error("discount fraction {0} must be within [0, 1)")]
    InvalidDiscount(f64),
    #[error(
        "rounding {field} of {decimals} exceeds the supported maximum of {max}",
        max = RoundingPolicy::MAX_DECIMALS
    )]
    InvalidRounding { field: &'static str, decimals: u32 },
}
