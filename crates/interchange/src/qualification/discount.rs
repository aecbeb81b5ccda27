use serde::Serialize;

use super::config::BaseRate;

/// Rate after the program discount step. There is no way back to a [`BaseRate`], so a second
/// discount cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AppliedRate {
    value: f64,
    discounted: bool,
}

impl AppliedRate {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn discounted(&self) -> bool {
        self.discounted
    }
}

/// Applies the enhanced-data program discount to a tier's base rate.
///
/// The discount is independent of tier: an enrolled L1 card is still discounted.
pub fn apply_discount(base: BaseRate, enabled: bool, discount_fraction: f64) -> AppliedRate {
    if enabled {
        AppliedRate {
            value: base.value() * (1.0 - discount_fraction),
            discounted: true,
        }
    } else {
        AppliedRate {
            value: base.value(),
            discounted: false,
        }
    }
}
