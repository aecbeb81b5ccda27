use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::domain::{QualificationRequest, QualificationResult, Tier};
use super::reference::{requirements_to_reach, tier_color, TierRequirements};
use super::{QualificationEngine, QualificationError, RoundingPolicy};

/// Router builder exposing the qualification engine over HTTP.
pub fn qualification_router(engine: Arc<QualificationEngine>) -> Router {
    Router::new()
        .route("/api/v1/qualification/evaluate", post(evaluate_handler))
        .route("/api/v1/qualification/batch", post(batch_handler))
        .route("/api/v1/qualification/rates", get(rates_handler))
        .route(
            "/api/v1/qualification/requirements",
            get(requirements_handler),
        )
        .with_state(engine)
}

/// Body rejections keep the `{ "error": ... }` shape the rest of the API uses.
fn rejection_response(rejection: JsonRejection) -> Response {
    let reason = rejection.body_text();
    warn!(%reason, "rejected qualification body");
    let payload = json!({ "error": format!("malformed request body: {reason}") });
    (rejection.status(), Json(payload)).into_response()
}

pub(crate) async fn evaluate_handler(
    State(engine): State<Arc<QualificationEngine>>,
    body: Result<Json<QualificationRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection),
    };

    match engine.evaluate(&request) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(QualificationError::InvalidInput(reason)) => {
            warn!(%reason, reference = ?request.reference, "rejected qualification request");
            let payload = json!({
                "error": format!("invalid input: {reason}"),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct BatchRequest {
    pub(crate) transactions: Vec<QualificationRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) result: Option<QualificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

pub(crate) async fn batch_handler(
    State(engine): State<Arc<QualificationEngine>>,
    body: Result<Json<BatchRequest>, JsonRejection>,
) -> Response {
    let batch = match body {
        Ok(Json(batch)) => batch,
        Err(rejection) => return rejection_response(rejection),
    };

    let outcomes = engine.evaluate_batch(&batch.transactions);
    let results: Vec<BatchEntry> = batch
        .transactions
        .into_iter()
        .zip(outcomes)
        .map(|(request, outcome)| match outcome {
            Ok(result) => BatchEntry {
                reference: request.reference,
                result: Some(result),
                error: None,
            },
            Err(error) => BatchEntry {
                reference: request.reference,
                result: None,
                error: Some(error.to_string()),
            },
        })
        .collect();

    (StatusCode::OK, Json(json!({ "results": results }))).into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RateView {
    pub(crate) tier: Tier,
    pub(crate) standard: f64,
    pub(crate) commercial: f64,
    pub(crate) color: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RateTableView {
    pub(crate) tiers: Vec<RateView>,
    pub(crate) discount_fraction: f64,
    pub(crate) rounding: RoundingPolicy,
}

pub(crate) async fn rates_handler(State(engine): State<Arc<QualificationEngine>>) -> Response {
    let tiers = engine
        .rates()
        .entries()
        .iter()
        .map(|entry| RateView {
            tier: entry.tier,
            standard: entry.standard,
            commercial: entry.commercial,
            color: tier_color(entry.tier),
        })
        .collect();

    let view = RateTableView {
        tiers,
        discount_fraction: engine.config().discount_fraction,
        rounding: engine.config().rounding,
    };
    (StatusCode::OK, Json(view)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct RequirementsQuery {
    pub(crate) from: Option<String>,
    pub(crate) to: Option<String>,
}

pub(crate) async fn requirements_handler(Query(query): Query<RequirementsQuery>) -> Response {
    let parse = |raw: Option<String>, default: Tier| -> Result<Tier, String> {
        raw.map(|value| value.parse::<Tier>())
            .unwrap_or(Ok(default))
    };

    match (parse(query.from, Tier::L1), parse(query.to, Tier::L3)) {
        (Ok(from), Ok(to)) => {
            let steps: Vec<TierRequirements> = requirements_to_reach(from, to);
            let payload = json!({
                "from": from,
                "to": to,
                "steps": steps,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        (Err(error), _) | (_, Err(error)) => {
            let payload = json!({ "error": error });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}
