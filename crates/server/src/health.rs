use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use inhouse_core::config::EngineConfig;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    validator_program: String,
    matchmaker_program: String,
}

impl HealthState {
    pub fn from_engines(engines: &EngineConfig) -> Self {
        Self {
            validator_program: engines.validator_program.clone(),
            matchmaker_program: engines.matchmaker_program.clone(),
        }
    }
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
    pub validator: HealthCheck,
    pub matchmaker: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let validator = program_check(&state.validator_program);
    let matchmaker = program_check(&state.matchmaker_program);
    let ready = validator.status == "ready" && matchmaker.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "inhouse-server accepting interactions".to_string(),
        },
        validator,
        matchmaker,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

fn program_check(program: &str) -> HealthCheck {
    match which::which(program) {
        Ok(path) => HealthCheck { status: "ready", detail: format!("found at {}", path.display()) },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("`{program}` not resolvable: {error}"),
        },
    }
}
