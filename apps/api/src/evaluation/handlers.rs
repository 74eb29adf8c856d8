use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::evaluation::pipeline;
use crate::llm_client::ModelSettings;
use crate::models::record::EvaluationRecord;
use crate::state::AppState;

/// Request body for an evaluation. `model` and `temperature` default to the
/// configured values when omitted.
#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    pub transcript: String,
    pub source_name: String,
    pub model: Option<String>,
    pub temperature: Option<f32>,
}

/// POST /api/v1/evaluations
pub async fn handle_evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluationRecord>, AppError> {
    let temperature = req.temperature.unwrap_or(state.config.llm_temperature);
    if !(0.0..=1.0).contains(&temperature) {
        return Err(AppError::Validation(
            "temperature must be between 0.0 and 1.0".to_string(),
        ));
    }

    let settings = ModelSettings {
        model: req.model.unwrap_or_else(|| state.config.llm_model.clone()),
        temperature,
    };
    let backend = state.llm.client_for(settings);

    // One evaluation at a time: the lock spans the whole load-mutate-save
    // cycle so concurrent requests cannot drop each other's appends.
    let store = state.history.lock().await;
    let record =
        pipeline::evaluate(&store, backend.as_ref(), &req.transcript, &req.source_name).await?;
    Ok(Json(record))
}

/// GET /api/v1/evaluations
pub async fn handle_list_history(
    State(state): State<AppState>,
) -> Result<Json<Vec<EvaluationRecord>>, AppError> {
    let store = state.history.lock().await;
    Ok(Json(pipeline::list_history(&store)))
}
