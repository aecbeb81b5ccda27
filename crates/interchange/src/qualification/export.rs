use std::io::Write;

use serde::Serialize;

use super::domain::QualificationResult;

#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    reference: &'a str,
    tier: &'static str,
    display_tier: &'static str,
    base_rate: f64,
    actual_rate: f64,
    best_possible_rate: f64,
    discount_applied: bool,
    savings_percent: f64,
    savings_amount: Option<f64>,
    missing_fields: String,
    warnings: String,
}

/// Writes one CSV row per evaluated transaction for the dashboard's export button.
pub fn write_results_csv<W: Write>(
    writer: W,
    rows: &[(String, QualificationResult)],
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for (reference, result) in rows {
        let missing_fields = result
            .missing_fields
            .iter()
            .map(|field| field.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");

        csv_writer.serialize(ExportRecord {
            reference: reference.as_str(),
            tier: result.tier.label(),
            display_tier: result.display_tier().label(),
            base_rate: result.base_rate,
            actual_rate: result.actual_rate,
            best_possible_rate: result.best_possible_rate,
            discount_applied: result.discount_applied,
            savings_percent: result.savings_percent,
            savings_amount: result.savings_amount,
            missing_fields,
            warnings: result.warnings.join("; "),
        })?;
    }

    csv_writer.flush()?;
    Ok(())
}
