//! Forgiving deserializers for enrichment payloads.
//!
//! Malformed enrichment must cost the transaction its tier, not the whole request, so values of
//! the wrong shape collapse to empty and the ladder reports them as missing.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::domain::LineItem;

pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_text(deserializer)?.unwrap_or_default())
}

pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(value) => Some(value),
        Value::Number(value) => Some(value.to_string()),
        _ => None,
    })
}

/// Unparseable quantities read as zero, which the ladder rejects as non-positive.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_number(deserializer)?.unwrap_or(0.0))
}

pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(value) => value.as_f64(),
        Value::String(value) => value.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|value| value.is_finite()))
}

pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

/// A present payload that is not an object still counts as supplied, with nothing filled in.
pub(crate) fn payload<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        value => Some(T::deserialize(value).unwrap_or_default()),
    })
}

pub(crate) fn line_items<'de, D>(deserializer: D) -> Result<Vec<LineItem>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items
            .into_iter()
            .map(|item| LineItem::deserialize(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use crate::qualification::domain::{Level2Data, Level3Data, QualificationRequest};
    use serde_json::json;

    #[test]
    fn numeric_tax_amount_reads_as_text() {
        let level2: Level2Data =
            serde_json::from_value(json!({ "customerCode": 4471, "taxAmount": 10.0 }))
                .expect("lenient level 2");

        assert_eq!(level2.customer_code, "4471");
        assert_eq!(level2.tax_amount, "10.0");
    }

    #[test]
    fn malformed_line_item_values_collapse_to_empty() {
        let level3: Level3Data = serde_json::from_value(json!({
            "lineItems": [
                { "productCode": "SKU-1", "quantity": "twelve", "unitPrice": "4.25" },
                "not-an-item"
            ],
            "shippingAmount": "free"
        }))
        .expect("lenient level 3");

        assert_eq!(level3.line_items.len(), 2);
        assert_eq!(level3.line_items[0].quantity, 0.0);
        assert_eq!(level3.line_items[0].unit_price, Some(4.25));
        assert!(level3.line_items[1].product_code.is_empty());
        assert_eq!(level3.shipping_amount, None);
    }

    #[test]
    fn non_object_payloads_count_as_supplied_but_empty() {
        let request: QualificationRequest = serde_json::from_value(json!({
            "cardFacts": { "isCommercial": true },
            "level2": "C1/10.00",
            "level3": null
        }))
        .expect("lenient request");

        assert_eq!(request.level2, Some(Level2Data::default()));
        assert_eq!(request.level3, None);
    }
}
