use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "active_sessions": state.session_service.active_sessions().await,
        "catalog_quizzes": state.session_service.catalog().list().len(),
    });
    (StatusCode::OK, Json(body))
}
