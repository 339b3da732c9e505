use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};

use crate::dto::quiz_dto::PublicQuiz;
use crate::error::Result;
use crate::models::session::SessionError;
use crate::AppState;

#[axum::debug_handler]
pub async fn list_catalog(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.session_service.catalog().list())
}

#[axum::debug_handler]
pub async fn get_quiz(
    State(state): State<AppState>,
    Path((subject, level)): Path<(String, String)>,
) -> Result<impl IntoResponse> {
    let quiz = state
        .session_service
        .catalog()
        .get_quiz(&subject, &level)
        .await?
        .filter(|q| !q.questions.is_empty())
        .ok_or(SessionError::NoQuestionsAvailable { subject, level })?;
    Ok(Json(PublicQuiz::from(quiz.as_ref())))
}
