//! Interchange qualification: tier resolution, program discount, and savings reporting.
//!
//! The engine is pure. Every call to [`QualificationEngine::evaluate`] works only from its
//! arguments and the rate table injected at construction, so one engine can be shared across
//! request handlers behind an `Arc` without coordination.

mod config;
pub mod discount;
pub mod domain;
pub mod export;
pub mod ladder;
mod lenient;
pub mod reference;
pub mod router;
pub mod savings;

#[cfg(test)]
mod tests;

pub use config::{
    BaseRate, QualificationConfig, RateTable, RateTableError, RoundingPolicy, TierRate,
};
pub use discount::AppliedRate;
pub use domain::{
    format_rate, CardBrand, CardFacts, CardType, FundingSource, Level2Data, Level3Data, LineItem,
    MissingField, QualificationRequest, QualificationResult, Tier,
};
pub use export::write_results_csv;
pub use ladder::{Requirement, TierResolution, TierRule, LADDER};
pub use reference::{required_fields, requirements_to_reach, tier_color, TierRequirements};
pub use router::qualification_router;

use tracing::debug;

/// Stateless evaluator that applies the configured rate table to a transaction.
#[derive(Debug, Clone)]
pub struct QualificationEngine {
    config: QualificationConfig,
    rates: RateTable,
}

impl QualificationEngine {
    pub fn new(config: QualificationConfig) -> Result<Self, RateTableError> {
        let rates = config.rate_table()?;
        Ok(Self { config, rates })
    }

    pub fn config(&self) -> &QualificationConfig {
        &self.config
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    pub fn resolve_tier(
        &self,
        card: &CardFacts,
        level2: Option<&Level2Data>,
        level3: Option<&Level3Data>,
    ) -> TierResolution {
        ladder::resolve_tier(card, level2, level3, &self.rates)
    }

    pub fn apply_discount(&self, base: BaseRate, enabled: bool) -> AppliedRate {
        discount::apply_discount(base, enabled, self.config.discount_fraction)
    }

    pub fn savings_percent(
        &self,
        actual_rate: f64,
        worst_case_rate: f64,
    ) -> Result<f64, QualificationError> {
        savings::savings_percent(actual_rate, worst_case_rate, &self.config.rounding)
    }

    pub fn savings_amount(
        &self,
        transaction_amount: f64,
        actual_rate: f64,
        worst_case_rate: f64,
    ) -> Result<f64, QualificationError> {
        savings::savings_amount(
            transaction_amount,
            actual_rate,
            worst_case_rate,
            &self.config.rounding,
        )
    }

    pub fn evaluate(
        &self,
        request: &QualificationRequest,
    ) -> Result<QualificationResult, QualificationError> {
        let card = request.card_facts.as_ref().ok_or_else(|| {
            QualificationError::InvalidInput("card facts are required".to_string())
        })?;

        let resolution = self.resolve_tier(card, request.level2.as_ref(), request.level3.as_ref());
        let applied = self.apply_discount(resolution.base_rate, card.cedp_enabled);

        let worst_case = self.rates.worst_case(card.is_commercial).value();
        let savings_percent = self.savings_percent(applied.value(), worst_case)?;
        let savings_amount = request
            .transaction_amount
            .map(|amount| self.savings_amount(amount, applied.value(), worst_case))
            .transpose()?;

        debug!(
            tier = %resolution.tier,
            commercial = card.is_commercial,
            base_rate = resolution.base_rate.value(),
            actual_rate = applied.value(),
            missing = resolution.missing_fields.len(),
            "transaction qualified"
        );

        Ok(QualificationResult {
            tier: resolution.tier,
            base_rate: resolution.base_rate.value(),
            best_possible_rate: self.rates.best_case(card.is_commercial).value(),
            actual_rate: applied.value(),
            discount_applied: applied.discounted(),
            savings_percent,
            savings_amount,
            missing_fields: resolution.missing_fields,
            warnings: resolution.warnings,
        })
    }

    /// Evaluates each request independently, preserving order.
    pub fn evaluate_batch(
        &self,
        requests: &[QualificationRequest],
    ) -> Vec<Result<QualificationResult, QualificationError>> {
        requests.iter().map(|request| self.evaluate(request)).collect()
    }
}

/// Error raised when an evaluation cannot produce a result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QualificationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
