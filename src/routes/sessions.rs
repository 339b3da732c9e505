use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::session_dto::{AnswerRequest, GoToRequest, SkipRequest, StartSessionRequest};
use crate::error::Result;
use crate::middleware::auth::Caller;
use crate::AppState;

#[axum::debug_handler]
pub async fn start_session(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<StartSessionRequest>,
) -> Result<impl IntoResponse> {
    req.validate()?;
    let view = state
        .session_service
        .start(&req.subject, &req.level, caller.user_id())
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let view = state.session_service.get(id, caller.user_id()).await?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn answer(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<AnswerRequest>,
) -> Result<impl IntoResponse> {
    let response = state
        .session_service
        .select_answer(id, caller.user_id(), req.question_index, req.option_index)
        .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn skip(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<SkipRequest>,
) -> Result<impl IntoResponse> {
    let response = state
        .session_service
        .skip(id, caller.user_id(), req.question_index)
        .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn go_to(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(req): Json<GoToRequest>,
) -> Result<impl IntoResponse> {
    let response = state
        .session_service
        .go_to(id, caller.user_id(), req.index)
        .await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn next(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let response = state.session_service.next(id, caller.user_id()).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn previous(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let response = state.session_service.previous(id, caller.user_id()).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
pub async fn finish(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let summary = state.session_service.finish(id, caller.user_id()).await?;
    Ok(Json(summary))
}

#[axum::debug_handler]
pub async fn restart(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let view = state.session_service.restart(id, caller.user_id()).await?;
    Ok(Json(view))
}

#[axum::debug_handler]
pub async fn discard(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.session_service.discard(id, caller.user_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}
