//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::error::{Result, ServerError};
use super::state::AppState;
use crate::inference::CensusRecord;

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
}

/// Greeting
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "Bonjour!" }))
}

/// Predict the salary class of one census record
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<CensusRecord>, JsonRejection>,
) -> Result<Json<PredictionResponse>> {
    let Json(record) = body.map_err(|rejection| ServerError::Unprocessable(rejection.body_text()))?;

    let prediction = state.predictor.predict_one(&record)?;
    info!(prediction = %prediction, "Served prediction");

    Ok(Json(PredictionResponse { prediction }))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let uptime = chrono::Utc::now().signed_duration_since(state.started_at);
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": uptime.num_seconds(),
    }))
}
