use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::lenient;

/// Processing qualification level for a card transaction.
///
/// `Downgraded` is never produced by the tier resolver; it is the display state the dashboard
/// uses for transactions that carried enrichment data but fell short of the tier it targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    L1,
    L2,
    L3,
    #[serde(rename = "downgraded")]
    Downgraded,
}

impl Tier {
    pub fn label(&self) -> &'static str {
        match self {
            Tier::L1 => "L1",
            Tier::L2 => "L2",
            Tier::L3 => "L3",
            Tier::Downgraded => "downgraded",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "L1" | "LEVEL1" => Ok(Tier::L1),
            "L2" | "LEVEL2" => Ok(Tier::L2),
            "L3" | "LEVEL3" => Ok(Tier::L3),
            "DOWNGRADED" => Ok(Tier::Downgraded),
            other => Err(format!("unknown tier '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Discover,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    #[default]
    Consumer,
    Business,
    Corporate,
    Purchasing,
    Fleet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    #[default]
    Credit,
    Debit,
    Prepaid,
}

/// Facts about the card presented for the transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CardFacts {
    #[serde(default)]
    pub brand: CardBrand,
    #[serde(default)]
    pub card_type: CardType,
    pub is_commercial: bool,
    #[serde(default)]
    pub issuing_country: String,
    #[serde(default)]
    pub funding_source: FundingSource,
    /// Merchant enrollment in the enhanced-data (CEDP) discount program.
    #[serde(default)]
    pub cedp_enabled: bool,
}

impl CardFacts {
    pub fn consumer() -> Self {
        Self {
            issuing_country: "US".to_string(),
            ..Self::default()
        }
    }

    pub fn commercial() -> Self {
        Self {
            card_type: CardType::Corporate,
            is_commercial: true,
            issuing_country: "US".to_string(),
            ..Self::default()
        }
    }
}

/// Level 2 enrichment: customer reference and tax detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Level2Data {
    #[serde(default, deserialize_with = "lenient::text")]
    pub customer_code: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub tax_amount: String,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub tax_exempt: bool,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub purchase_order_number: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub destination_zip: Option<String>,
}

/// Level 3 enrichment: line-item detail and shipment totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Level3Data {
    #[serde(default, deserialize_with = "lenient::line_items")]
    pub line_items: Vec<LineItem>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub shipping_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub duty_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub destination_country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, deserialize_with = "lenient::text")]
    pub product_code: String,
    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub quantity: f64,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub unit_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub unit_of_measure: String,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub tax_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::optional_text")]
    pub commodity_code: Option<String>,
}

/// Caller payload for a single evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualificationRequest {
    /// Caller-side identifier echoed into exports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub card_facts: Option<CardFacts>,
    #[serde(default, deserialize_with = "lenient::payload")]
    pub level2: Option<Level2Data>,
    #[serde(default, deserialize_with = "lenient::payload")]
    pub level3: Option<Level3Data>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_amount: Option<f64>,
}

impl QualificationRequest {
    pub fn new(card_facts: CardFacts) -> Self {
        Self {
            card_facts: Some(card_facts),
            ..Self::default()
        }
    }

    pub fn with_level2(mut self, level2: Level2Data) -> Self {
        self.level2 = Some(level2);
        self
    }

    pub fn with_level3(mut self, level3: Level3Data) -> Self {
        self.level3 = Some(level3);
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.transaction_amount = Some(amount);
        self
    }
}

/// A field (or payload) the caller would need to supply to unlock `unlocks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingField {
    pub unlocks: Tier,
    pub description: String,
}

impl MissingField {
    pub(crate) fn field(unlocks: Tier, detail: impl fmt::Display) -> Self {
        Self {
            unlocks,
            description: format!("{}: {}", unlocks.label(), detail),
        }
    }

    pub(crate) fn payload_absent(unlocks: Tier) -> Self {
        Self {
            unlocks,
            description: format!("{} data not provided", unlocks.label()),
        }
    }
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

/// Engine output handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualificationResult {
    pub tier: Tier,
    pub base_rate: f64,
    /// L3 base rate for the card's commerciality, shown as the benchmark.
    pub best_possible_rate: f64,
    pub actual_rate: f64,
    pub discount_applied: bool,
    pub savings_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_amount: Option<f64>,
    pub missing_fields: Vec<MissingField>,
    pub warnings: Vec<String>,
}

impl QualificationResult {
    /// Tier as the dashboard shows it: enrichment that fell short renders as downgraded.
    pub fn display_tier(&self) -> Tier {
        if self.warnings.is_empty() {
            self.tier
        } else {
            Tier::Downgraded
        }
    }

    pub fn actual_rate_label(&self) -> String {
        format_rate(self.actual_rate)
    }

    pub fn savings_label(&self) -> String {
        format!("{:.1}%", self.savings_percent)
    }
}

/// Renders a percentage-point rate the way the dashboard prints it, e.g. `2.65%`.
pub fn format_rate(rate: f64) -> String {
    format!("{rate:.2}%")
}
