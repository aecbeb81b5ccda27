use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;

#[tokio::test]
async fn evaluate_endpoint_returns_qualification() {
    let request = json_request(
        "POST",
        "/api/v1/qualification/evaluate",
        &json!({
            "cardFacts": { "isCommercial": true, "cedpEnabled": true },
            "level2": { "customerCode": "C1", "taxAmount": "10.00" },
            "level3": {
                "lineItems": [{
                    "productCode": "SKU-1",
                    "description": "Toner",
                    "quantity": 2,
                    "unitPrice": 31.5,
                    "unitOfMeasure": "EA",
                    "commodityCode": "44103103"
                }]
            },
            "transactionAmount": 250.0
        }),
    );

    let response = router().oneshot(request).await.expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "L3");
    assert_eq!(body["discountApplied"], true);
    assert_eq!(body["missingFields"], json!([]));
    assert_eq!(body["savingsAmount"], json!(2.74));
}

#[tokio::test]
async fn evaluate_endpoint_rejects_missing_card_facts() {
    let request = json_request(
        "POST",
        "/api/v1/qualification/evaluate",
        &json!({ "level2": { "customerCode": "C1", "taxAmount": "1.00" } }),
    );

    let response = router().oneshot(request).await.expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("card facts"));
}

#[tokio::test]
async fn batch_endpoint_reports_each_transaction() {
    let request = json_request(
        "POST",
        "/api/v1/qualification/batch",
        &json!({
            "transactions": [
                { "reference": "txn-1", "cardFacts": { "isCommercial": false } },
                { "reference": "txn-2" }
            ]
        }),
    );

    let response = router().oneshot(request).await.expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["reference"], "txn-1");
    assert_eq!(results[0]["result"]["tier"], "L1");
    assert!(results[1]["error"].is_string());
}

#[tokio::test]
async fn rates_endpoint_lists_ladder_with_colours() {
    let response = router()
        .oneshot(get_request("/api/v1/qualification/rates"))
        .await
        .expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    let tiers = body["tiers"].as_array().expect("tiers array");
    assert_eq!(tiers.len(), 3);
    assert_eq!(tiers[0]["tier"], "L1");
    assert_eq!(tiers[0]["standard"], json!(2.65));
    assert!(tiers[2]["color"].as_str().expect("colour").starts_with('#'));
    assert_eq!(body["discountFraction"], json!(0.05));
}

#[tokio::test]
async fn requirements_endpoint_defaults_to_full_ladder() {
    let response = router()
        .oneshot(get_request("/api/v1/qualification/requirements"))
        .await
        .expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    let steps = body["steps"].as_array().expect("steps array");
    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["tier"], "L2");
    assert_eq!(steps[0]["fields"], json!(["customer code", "tax amount"]));
}

#[tokio::test]
async fn requirements_endpoint_rejects_unknown_tier() {
    let response = router()
        .oneshot(get_request("/api/v1/qualification/requirements?from=L9"))
        .await
        .expect("router responds");
    let (status, _) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn numeric_tax_amount_still_qualifies_for_level2() {
    let request = json_request(
        "POST",
        "/api/v1/qualification/evaluate",
        &json!({
            "cardFacts": { "isCommercial": true },
            "level2": { "customerCode": "C1", "taxAmount": 10.0 }
        }),
    );

    let response = router().oneshot(request).await.expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "L2");
    assert_eq!(body["warnings"], json!([]));
}

#[tokio::test]
async fn unreadable_enrichment_downgrades_instead_of_failing() {
    let request = json_request(
        "POST",
        "/api/v1/qualification/evaluate",
        &json!({
            "cardFacts": { "isCommercial": true },
            "level2": ["C1", "10.00"]
        }),
    );

    let response = router().oneshot(request).await.expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "L1");
    let missing: Vec<&str> = body["missingFields"]
        .as_array()
        .expect("missing fields")
        .iter()
        .filter_map(|field| field["description"].as_str())
        .collect();
    assert!(missing.contains(&"L2: customer code"));
    assert!(missing.contains(&"L2: tax amount"));
    assert_eq!(
        body["warnings"],
        json!(["L2 data incomplete: transaction will downgrade to L1"])
    );
}

#[tokio::test]
async fn unparseable_line_item_quantity_falls_back_to_level2() {
    let request = json_request(
        "POST",
        "/api/v1/qualification/evaluate",
        &json!({
            "cardFacts": { "isCommercial": true },
            "level2": { "customerCode": "C1", "taxAmount": "10.00" },
            "level3": {
                "lineItems": [{
                    "productCode": "SKU-1",
                    "description": "Toner",
                    "quantity": "two",
                    "unitPrice": 31.5,
                    "commodityCode": "44103103"
                }]
            }
        }),
    );

    let response = router().oneshot(request).await.expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tier"], "L2");
    assert_eq!(
        body["warnings"],
        json!(["L3 data incomplete: transaction will be processed as L2"])
    );
}

#[tokio::test]
async fn malformed_body_is_reported_as_json_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/qualification/evaluate")
        .header("content-type", "application/json")
        .body(Body::from("{\"cardFacts\": "))
        .expect("request builds");

    let response = router().oneshot(request).await.expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .starts_with("malformed request body"));
}

#[tokio::test]
async fn batch_body_with_wrong_shape_is_reported_as_json_error() {
    let request = json_request(
        "POST",
        "/api/v1/qualification/batch",
        &json!({ "transactions": "none" }),
    );

    let response = router().oneshot(request).await.expect("router responds");
    let (status, body) = read_json(response).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
}
