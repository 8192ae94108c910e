//! HTTP-обработчики: форма, предсказание, health

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
    Router,
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::serving::log::PredictionLog;
use crate::serving::page::{self, Outcome};
use crate::serving::service::PredictionService;

const INTERNAL_ERROR: &str = "Internal error during prediction.";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub log: Arc<PredictionLog>,
}

impl AppState {
    pub fn new(service: PredictionService, log: PredictionLog) -> Self {
        Self {
            service: Arc::new(service),
            log: Arc::new(log),
        }
    }
}

pub fn router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(page::render(&state.service, &HashMap::new(), Outcome::Blank))
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "model": state.service.bundle().model.kind().name(),
        "confidence_interval": state.service.has_interval(),
    }))
}

async fn predict(
    State(state): State<AppState>,
    Form(form): Form<HashMap<String, String>>,
) -> (StatusCode, Html<String>) {
    let service = &state.service;

    let input = match service.validate(&form) {
        Ok(input) => input,
        Err(e) => {
            tracing::warn!("Rejected prediction request ({}): {}", e.field(), e);
            let message = e.to_string();
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(page::render(service, &form, Outcome::Error(&message, Some(e.field())))),
            );
        }
    };

    let prediction = service.predict(&input);
    if !prediction.estimate.is_finite() {
        tracing::warn!("Model returned a non-finite estimate for {:?}", input);
        return internal_error(service, &form);
    }

    if let Err(e) = state.log.append(&input, prediction.estimate).await {
        tracing::warn!("Failed to write prediction log {}: {}", state.log.path().display(), e);
        return internal_error(service, &form);
    }

    tracing::info!("Prediction: {:.2}", prediction.estimate);
    (
        StatusCode::OK,
        Html(page::render(service, &form, Outcome::Estimate(prediction))),
    )
}

fn internal_error(service: &PredictionService, form: &HashMap<String, String>) -> (StatusCode, Html<String>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(page::render(service, form, Outcome::Error(INTERNAL_ERROR, None))),
    )
}
