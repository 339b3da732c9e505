use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::result_dto::{CreateResultPayload, ResultListQuery, ResultListResponse};
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;
use crate::services::result_service::NewResult;
use crate::AppState;

fn caller_id(claims: &Claims) -> Result<Uuid> {
    claims
        .user_id()
        .ok_or_else(|| Error::Unauthorized("Token has no user".to_string()))
}

#[axum::debug_handler]
pub async fn create_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateResultPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let new = NewResult::from_payload(caller_id(&claims)?, payload)?;
    let result = state.result_service.create_result(new).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

#[axum::debug_handler]
pub async fn list_results(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ResultListQuery>,
) -> Result<impl IntoResponse> {
    let results = state
        .result_service
        .list_for_user(caller_id(&claims)?, query.technology, query.level)
        .await?;
    Ok(Json(ResultListResponse {
        total: results.len(),
        results,
    }))
}

#[axum::debug_handler]
pub async fn result_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse> {
    let stats = state
        .result_service
        .stats_for_user(caller_id(&claims)?)
        .await?;
    Ok(Json(stats))
}

#[axum::debug_handler]
pub async fn delete_result(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state
        .result_service
        .delete_result(caller_id(&claims)?, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
