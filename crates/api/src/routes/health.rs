//! Health Route

use axum::{extract::State, Json};
use inference_engine::ModelStatus;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::AppState;

/// Response for health endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Per model slot state, keyed by registry key
    pub models: BTreeMap<&'static str, ModelStatus>,
}

/// Report service liveness and model availability
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        models: state.service.registry().statuses(),
    })
}
