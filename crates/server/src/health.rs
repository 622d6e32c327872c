use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use synthai_core::pricing::EstimationOrchestrator;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HealthState {
    learned_model: Option<LoadedModel>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct LoadedModel {
    kind: String,
    version: String,
    trained_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub learned_model: HealthCheck,
    pub learned_model_loaded: bool,
    pub checked_at: String,
}

impl HealthState {
    /// The model handle never changes after startup, so it is captured once.
    pub fn from_orchestrator(orchestrator: &EstimationOrchestrator) -> Self {
        let learned_model = orchestrator.learned().model().map(|model| LoadedModel {
            kind: format!("{:?}", model.kind),
            version: model.version.clone(),
            trained_at: model.trained_at.to_rfc3339(),
        });
        Self { learned_model }
    }
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

/// The service stays ready without a learned model; complex tiers then use
/// the rule tables and the check reports `degraded`.
pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let learned_model = match &state.learned_model {
        Some(model) => HealthCheck {
            status: "ready",
            detail: format!(
                "{} model v{} trained at {}",
                model.kind, model.version, model.trained_at
            ),
        },
        None => HealthCheck {
            status: "degraded",
            detail: "learned model unavailable; complex tiers priced by rule tables".to_string(),
        },
    };
    let loaded = state.learned_model.is_some();

    let payload = HealthResponse {
        status: if loaded { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "synthai-server runtime initialized".to_string(),
        },
        learned_model,
        learned_model_loaded: loaded,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
