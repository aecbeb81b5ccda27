use chrono::Utc;
use clap::{Args, ValueEnum};
use interchange::config::AppConfig;
use interchange::error::AppError;
use interchange::qualification::{
    format_rate, requirements_to_reach, write_results_csv, CardFacts, Level2Data, Level3Data,
    LineItem, QualificationEngine, QualificationRequest, QualificationResult, Tier,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct QualifyArgs {
    /// JSON file holding one transaction or an array of transactions
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum QualifyInput {
    Many(Vec<QualificationRequest>),
    One(QualificationRequest),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QualifyReport {
    evaluated_at: chrono::DateTime<Utc>,
    results: Vec<ReportEntry>,
}

#[derive(Debug, Serialize)]
struct ReportEntry {
    reference: String,
    #[serde(flatten)]
    result: QualificationResult,
}

fn engine_from_env() -> Result<QualificationEngine, AppError> {
    let config = AppConfig::load()?;
    Ok(QualificationEngine::new(config.qualification)?)
}

pub(crate) fn run_qualify(args: QualifyArgs) -> Result<(), AppError> {
    let QualifyArgs { input, format } = args;
    let engine = engine_from_env()?;

    let raw = fs::read_to_string(&input)?;
    let requests = match serde_json::from_str::<QualifyInput>(&raw)? {
        QualifyInput::Many(requests) => requests,
        QualifyInput::One(request) => vec![request],
    };

    let entries = qualify_all(&engine, requests)?;

    match format {
        OutputFormat::Text => {
            for entry in &entries {
                render_result(&entry.reference, &entry.result);
            }
        }
        OutputFormat::Json => {
            let report = QualifyReport {
                evaluated_at: Utc::now(),
                results: entries,
            };
            let rendered = serde_json::to_string_pretty(&report).map_err(AppError::Output)?;
            println!("{rendered}");
        }
        OutputFormat::Csv => {
            let rows: Vec<(String, QualificationResult)> = entries
                .into_iter()
                .map(|entry| (entry.reference, entry.result))
                .collect();
            write_results_csv(std::io::stdout().lock(), &rows)?;
        }
    }

    Ok(())
}

fn qualify_all(
    engine: &QualificationEngine,
    requests: Vec<QualificationRequest>,
) -> Result<Vec<ReportEntry>, AppError> {
    requests
        .into_iter()
        .enumerate()
        .map(|(index, request)| {
            let result = engine.evaluate(&request)?;
            let reference = request
                .reference
                .unwrap_or_else(|| format!("txn-{:03}", index + 1));
            Ok(ReportEntry { reference, result })
        })
        .collect()
}

pub(crate) fn run_rates() -> Result<(), AppError> {
    let engine = engine_from_env()?;

    println!("Interchange rate table");
    println!("{:<6} {:>10} {:>12}", "Tier", "Standard", "Commercial");
    for entry in engine.rates().entries() {
        println!(
            "{:<6} {:>10} {:>12}",
            entry.tier.label(),
            format_rate(entry.standard),
            format_rate(entry.commercial)
        );
    }
    println!(
        "\nEnhanced-data program discount: {:.1}%",
        engine.config().discount_fraction * 100.0
    );

    println!("\nRequirements by tier");
    for step in requirements_to_reach(Tier::L1, Tier::L3) {
        println!("- {}: {}", step.tier, step.fields.join(", "));
    }

    Ok(())
}

pub(crate) fn run_demo() -> Result<(), AppError> {
    let engine = engine_from_env()?;

    println!("Interchange qualification demo");
    for (label, request) in demo_requests() {
        let result = engine.evaluate(&request)?;
        println!();
        render_result(label, &result);
    }

    Ok(())
}

fn demo_requests() -> Vec<(&'static str, QualificationRequest)> {
    let level2 = Level2Data {
        customer_code: "C1".to_string(),
        tax_amount: "10.00".to_string(),
        ..Level2Data::default()
    };
    let item = LineItem {
        product_code: "SKU-1042".to_string(),
        description: "Thermal receipt paper".to_string(),
        quantity: 12.0,
        unit_price: Some(4.25),
        unit_of_measure: "CS".to_string(),
        tax_amount: Some(3.06),
        commodity_code: Some("14111530".to_string()),
    };
    let incomplete_item = LineItem {
        commodity_code: None,
        ..item.clone()
    };
    let enrolled = CardFacts {
        cedp_enabled: true,
        ..CardFacts::commercial()
    };

    vec![
        (
            "Consumer card, no enrichment",
            QualificationRequest::new(CardFacts::consumer()).with_amount(250.0),
        ),
        (
            "Commercial card with Level 2",
            QualificationRequest::new(CardFacts::commercial())
                .with_level2(level2.clone())
                .with_amount(250.0),
        ),
        (
            "Commercial card with Level 3 and CEDP",
            QualificationRequest::new(enrolled)
                .with_level2(level2.clone())
                .with_level3(Level3Data {
                    line_items: vec![item],
                    ..Level3Data::default()
                })
                .with_amount(250.0),
        ),
        (
            "Level 3 line item missing commodity code",
            QualificationRequest::new(CardFacts::commercial())
                .with_level2(level2)
                .with_level3(Level3Data {
                    line_items: vec![incomplete_item],
                    ..Level3Data::default()
                })
                .with_amount(250.0),
        ),
    ]
}

fn render_result(label: &str, result: &QualificationResult) {
    println!("{label}");
    println!(
        "- tier {} (display: {})",
        result.tier,
        result.display_tier()
    );
    println!(
        "- actual rate {} (base {}, best possible {}{})",
        result.actual_rate_label(),
        format_rate(result.base_rate),
        format_rate(result.best_possible_rate),
        if result.discount_applied {
            ", program discount applied"
        } else {
            ""
        }
    );
    match result.savings_amount {
        Some(amount) => println!(
            "- savings vs L1: {} ({amount:.2})",
            result.savings_label()
        ),
        None => println!("- savings vs L1: {}", result.savings_label()),
    }

    if result.missing_fields.is_empty() {
        println!("- missing fields: none");
    } else {
        for field in &result.missing_fields {
            println!("- missing: {field}");
        }
    }
    for warning in &result.warnings {
        println!("- warning: {warning}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interchange::qualification::QualificationConfig;

    #[test]
    fn demo_requests_cover_every_tier() {
        let engine =
            QualificationEngine::new(QualificationConfig::default()).expect("default engine");

        let tiers: Vec<Tier> = demo_requests()
            .into_iter()
            .map(|(_, request)| engine.evaluate(&request).expect("evaluates").tier)
            .collect();

        assert_eq!(tiers, vec![Tier::L1, Tier::L2, Tier::L3, Tier::L2]);
    }

    #[test]
    fn qualify_input_accepts_single_and_array_payloads() {
        let one: QualifyInput =
            serde_json::from_str(r#"{ "cardFacts": { "isCommercial": false } }"#)
                .expect("single payload");
        assert!(matches!(one, QualifyInput::One(_)));

        let many: QualifyInput = serde_json::from_str(
            r#"[{ "cardFacts": { "isCommercial": true } }, { "cardFacts": { "isCommercial": false } }]"#,
        )
        .expect("array payload");
        assert!(matches!(many, QualifyInput::Many(ref requests) if requests.len() == 2));
    }

    #[test]
    fn qualify_all_assigns_references_and_stops_on_invalid_input() {
        let engine =
            QualificationEngine::new(QualificationConfig::default()).expect("default engine");

        let entries = qualify_all(
            &engine,
            vec![
                QualificationRequest::new(CardFacts::consumer()),
                QualificationRequest {
                    reference: Some("order-7".to_string()),
                    ..QualificationRequest::new(CardFacts::commercial())
                },
            ],
        )
        .expect("evaluates");
        assert_eq!(entries[0].reference, "txn-001");
        assert_eq!(entries[1].reference, "order-7");

        let error = qualify_all(&engine, vec![QualificationRequest::default()])
            .expect_err("missing card facts rejected");
        assert!(matches!(error, AppError::Qualification(_)));
    }
}
