use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::Value;

use crate::qualification::domain::{
    CardFacts, Level2Data, Level3Data, LineItem, QualificationRequest,
};
use crate::qualification::{qualification_router, QualificationConfig, QualificationEngine};

pub(super) fn engine() -> QualificationEngine {
    QualificationEngine::new(QualificationConfig::default()).expect("default config is valid")
}

pub(super) fn complete_level2() -> Level2Data {
    Level2Data {
        customer_code: "C1".to_string(),
        tax_amount: "10.00".to_string(),
        tax_exempt: false,
        purchase_order_number: Some("PO-7781".to_string()),
        destination_zip: Some("50309".to_string()),
    }
}

pub(super) fn complete_line_item() -> LineItem {
    LineItem {
        product_code: "SKU-1042".to_string(),
        description: "Thermal receipt paper".to_string(),
        quantity: 12.0,
        unit_price: Some(4.25),
        unit_of_measure: "CS".to_string(),
        tax_amount: Some(3.06),
        commodity_code: Some("14111530".to_string()),
    }
}

pub(super) fn level3_with(items: Vec<LineItem>) -> Level3Data {
    Level3Data {
        line_items: items,
        shipping_amount: Some(15.0),
        duty_amount: Some(0.0),
        destination_country: Some("US".to_string()),
    }
}

pub(super) fn commercial_l2() -> QualificationRequest {
    QualificationRequest::new(CardFacts::commercial()).with_level2(complete_level2())
}

pub(super) fn commercial_l3(cedp_enabled: bool) -> QualificationRequest {
    let card = CardFacts {
        cedp_enabled,
        ..CardFacts::commercial()
    };
    QualificationRequest::new(card)
        .with_level2(complete_level2())
        .with_level3(level3_with(vec![complete_line_item()]))
}

pub(super) fn router() -> axum::Router {
    qualification_router(Arc::new(engine()))
}

pub(super) fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

pub(super) fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}
