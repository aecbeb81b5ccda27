use super::common::*;
use crate::qualification::domain::{CardFacts, Level2Data, Level3Data, Tier};

#[test]
fn incomplete_level2_blocks_level3_evaluation() {
    let engine = engine();
    let level2 = Level2Data {
        tax_amount: String::new(),
        ..complete_level2()
    };
    let level3 = level3_with(vec![complete_line_item()]);

    let resolution = engine.resolve_tier(&CardFacts::commercial(), Some(&level2), Some(&level3));

    assert_eq!(resolution.tier, Tier::L1);
    assert_eq!(resolution.base_rate.value(), 2.95);
    assert!(resolution
        .missing_fields
        .iter()
        .all(|field| field.unlocks == Tier::L2));
    assert_eq!(resolution.missing_fields[0].description, "L2: tax amount");
    assert_eq!(
        resolution.warnings,
        vec!["L2 data incomplete: transaction will downgrade to L1".to_string()]
    );
}

#[test]
fn absent_level2_never_attempts_level3() {
    let engine = engine();
    let level3 = level3_with(vec![complete_line_item()]);

    let resolution = engine.resolve_tier(&CardFacts::consumer(), None, Some(&level3));

    assert_eq!(resolution.tier, Tier::L1);
    assert_eq!(resolution.missing_fields.len(), 1);
    assert_eq!(resolution.missing_fields[0].description, "L2 data not provided");
    assert!(resolution.warnings.is_empty());
}

#[test]
fn empty_line_items_do_not_qualify_for_level3() {
    let engine = engine();
    let level3 = Level3Data::default();

    let resolution =
        engine.resolve_tier(&CardFacts::consumer(), Some(&complete_level2()), Some(&level3));

    assert_eq!(resolution.tier, Tier::L2);
    assert_eq!(resolution.base_rate.value(), 2.05);
    assert_eq!(
        resolution.missing_fields[0].description,
        "L3: line items not provided"
    );
    assert!(resolution.warnings.is_empty());
}

#[test]
fn every_line_item_must_be_complete() {
    let engine = engine();
    let mut unpriced = complete_line_item();
    unpriced.unit_price = None;
    let mut blank_description = complete_line_item();
    blank_description.description = "   ".to_string();
    let level3 = level3_with(vec![complete_line_item(), unpriced, blank_description]);

    let resolution =
        engine.resolve_tier(&CardFacts::commercial(), Some(&complete_level2()), Some(&level3));

    assert_eq!(resolution.tier, Tier::L2);
    let descriptions: Vec<_> = resolution
        .missing_fields
        .iter()
        .map(|field| field.description.as_str())
        .collect();
    assert_eq!(
        descriptions,
        vec![
            "L3: description missing on 1 of 3 line item(s)",
            "L3: unit price missing on 1 of 3 line item(s)",
        ]
    );
    assert_eq!(resolution.warnings.len(), 1);
}

#[test]
fn negative_quantity_is_not_positive() {
    let engine = engine();
    let mut returned = complete_line_item();
    returned.quantity = -1.0;
    let level3 = level3_with(vec![returned]);

    let resolution =
        engine.resolve_tier(&CardFacts::consumer(), Some(&complete_level2()), Some(&level3));

    assert_eq!(resolution.tier, Tier::L2);
    assert!(resolution
        .missing_fields
        .iter()
        .any(|field| field.description.contains("quantity")));
}

#[test]
fn only_top_tier_has_empty_diagnostics() {
    let engine = engine();
    let cases = [
        (None, None),
        (Some(complete_level2()), None),
        (
            Some(complete_level2()),
            Some(level3_with(vec![complete_line_item()])),
        ),
    ];

    for (level2, level3) in cases {
        let resolution =
            engine.resolve_tier(&CardFacts::consumer(), level2.as_ref(), level3.as_ref());
        let clean = resolution.missing_fields.is_empty() && resolution.warnings.is_empty();
        assert_eq!(clean, resolution.tier == Tier::L3);
    }
}
