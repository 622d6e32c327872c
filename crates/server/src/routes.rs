use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use synthai_agent::{AgentRuntime, ConversationStage, Intent};
use synthai_core::analyzers::Recommendations;
use synthai_core::catalog::{price_guide, PriceGuideEntry, AFFORDABLE_MESSAGE};
use synthai_core::domain::{DescriptorRequest, EstimationResult};
use synthai_core::errors::{ApplicationError, DomainError};
use synthai_core::pricing::EstimationOrchestrator;
use tracing::{info, warn};
use uuid::Uuid;

use crate::health;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<EstimationOrchestrator>,
    pub agent: Arc<AgentRuntime>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    pub correlation_id: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub analysis_id: String,
    pub pricing: EstimationResult,
    pub recommendations: Recommendations,
    pub advisory_notes: Option<String>,
    pub affordable_message: &'static str,
    pub affordable_tier: bool,
}

#[derive(Debug, Serialize)]
pub struct AffordableExamplesResponse {
    pub affordable_examples: &'static [PriceGuideEntry],
}

#[derive(Debug, Default, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub intent: Intent,
    pub response: String,
    pub stage: ConversationStage,
}

pub fn router(state: AppState) -> Router {
    let health_state = health::HealthState::from_orchestrator(&state.orchestrator);

    Router::new()
        .route("/api/pricing/analyze", post(analyze_project))
        .route("/api/pricing/affordable-examples", get(affordable_examples))
        .route("/api/messages", post(receive_message))
        .with_state(state)
        .merge(health::router(health_state))
}

pub async fn analyze_project(
    State(state): State<AppState>,
    payload: Result<Json<DescriptorRequest>, JsonRejection>,
) -> ApiResult<AnalyzeResponse> {
    let analysis_id = Uuid::new_v4().to_string();
    let Json(request) = payload.map_err(|rejection| {
        bad_request(
            DomainError::InvalidField { field: "body", message: rejection.body_text() },
            &analysis_id,
        )
    })?;
    let descriptor = request.validate().map_err(|error| bad_request(error, &analysis_id))?;

    let analysis = state.orchestrator.analyze(&descriptor);
    let advisory_notes = state.agent.advise(&descriptor, &analysis.pricing).await;

    info!(
        event_name = "api.pricing.analyzed",
        correlation_id = %analysis_id,
        project_type = %descriptor.project_type,
        tier = %descriptor.complexity,
        path = analysis.pricing.path.as_str(),
        final_price = %analysis.pricing.final_price,
        "project analyzed"
    );

    Ok(Json(AnalyzeResponse {
        analysis_id,
        affordable_tier: analysis.pricing.affordable_tier,
        pricing: analysis.pricing,
        recommendations: analysis.recommendations,
        advisory_notes,
        affordable_message: AFFORDABLE_MESSAGE,
    }))
}

pub async fn affordable_examples() -> Json<AffordableExamplesResponse> {
    Json(AffordableExamplesResponse { affordable_examples: price_guide() })
}

pub async fn receive_message(
    State(state): State<AppState>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> ApiResult<MessageResponse> {
    let correlation_id = Uuid::new_v4().to_string();
    let Json(request) = payload.map_err(|rejection| {
        bad_request(
            DomainError::InvalidField { field: "body", message: rejection.body_text() },
            &correlation_id,
        )
    })?;

    let sender_id = match request.sender_id.as_deref().map(str::trim) {
        Some(sender_id) if !sender_id.is_empty() => sender_id.to_string(),
        _ => {
            return Err(bad_request(
                DomainError::MissingField { field: "sender_id" },
                &correlation_id,
            ))
        }
    };
    let message = request.message.unwrap_or_default();

    let outcome = state.agent.handle_message(&message, &sender_id).await;
    Ok(Json(MessageResponse {
        intent: outcome.intent,
        response: outcome.response,
        stage: outcome.stage,
    }))
}

fn bad_request(error: DomainError, correlation_id: &str) -> (StatusCode, Json<ApiError>) {
    warn!(
        event_name = "api.request_rejected",
        correlation_id,
        error = %error,
        "request failed validation"
    );
    let message = match error {
        DomainError::MissingField { field } => format!("{field} is required"),
        invalid => {
            ApplicationError::from(invalid).into_interface(correlation_id).user_message().to_string()
        }
    };
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError { error: message, correlation_id: correlation_id.to_string() }),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use synthai_agent::AgentRuntime;
    use synthai_core::config::AppConfig;
    use synthai_core::pricing::EstimationOrchestrator;
    use tower::ServiceExt;

    use super::{router, AppState};

    fn state() -> AppState {
        let config = AppConfig::default();
        AppState {
            orchestrator: Arc::new(EstimationOrchestrator::rules_only(&config.pricing)),
            agent: Arc::new(AgentRuntime::from_config(&config).expect("agent runtime")),
        }
    }

    async fn send(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = router(state).oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn analyze_prices_landing_page_with_rule_tables() {
        let (status, body) = send(
            state(),
            post_json(
                "/api/pricing/analyze",
                json!({
                    "description": "Landing page",
                    "project_type": "web",
                    "complexity": "simple",
                    "timeline": "flexible",
                    "team_size": "solo"
                }),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body["analysis_id"].as_str().unwrap_or_default().is_empty());
        assert_eq!(body["pricing"]["path"], "rule_based");
        assert_eq!(body["pricing"]["currency"], "ZAR");
        assert_eq!(body["affordable_tier"], true);
        assert!(body["advisory_notes"].is_null());

        let breakdown = body["pricing"]["breakdown"].as_object().expect("breakdown");
        assert_eq!(breakdown.len(), 4);
        for key in ["tech_recommender", "security_auditor", "marketing_agent"] {
            assert!(body["recommendations"][key].is_object(), "missing {key}");
        }
    }

    #[tokio::test]
    async fn analyze_rejects_missing_and_blank_fields() {
        let (status, body) = send(
            state(),
            post_json(
                "/api/pricing/analyze",
                json!({
                    "description": "   ",
                    "project_type": "web",
                    "complexity": "simple",
                    "timeline": "flexible",
                    "team_size": "solo"
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "description is required");
        assert!(body["correlation_id"].is_string());

        let (status, body) = send(
            state(),
            post_json("/api/pricing/analyze", json!({ "description": "Shop" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "project_type is required");
    }

    #[tokio::test]
    async fn analyze_rejects_malformed_json_with_safe_message() {
        let request = Request::post("/api/pricing/analyze")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .expect("request");
        let (status, body) = send(state(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[tokio::test]
    async fn affordable_examples_lists_the_price_guide() {
        let request =
            Request::get("/api/pricing/affordable-examples").body(Body::empty()).expect("request");
        let (status, body) = send(state(), request).await;

        assert_eq!(status, StatusCode::OK);
        let examples = body["affordable_examples"].as_array().expect("examples");
        assert_eq!(examples.len(), 4);
        assert_eq!(examples[0]["type"], "simple_website");
        assert_eq!(examples[0]["price_range"]["min"], 5000);
    }

    #[tokio::test]
    async fn messages_are_dispatched_per_sender() {
        let state = state();
        let (status, body) = send(
            state.clone(),
            post_json("/api/messages", json!({ "sender_id": "+27820000001", "message": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["intent"], "greeting");
        assert_eq!(body["stage"], "active");

        let (_, body) = send(
            state,
            post_json(
                "/api/messages",
                json!({ "sender_id": "+27820000001", "message": "How much does this cost?" }),
            ),
        )
        .await;
        assert_eq!(body["intent"], "pricing_inquiry");
        assert!(!body["response"].as_str().unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn messages_require_a_sender() {
        let (status, body) =
            send(state(), post_json("/api/messages", json!({ "message": "hello" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "sender_id is required");
    }
}
