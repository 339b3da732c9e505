use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::result::QuizResult;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateResultPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub technology: String,
    #[validate(length(min = 1))]
    pub level: String,
    pub quiz_id: Option<Uuid>,
    #[validate(range(min = 1))]
    pub total_questions: i32,
    #[validate(range(min = 0))]
    pub correct: i32,
    #[validate(range(min = 0))]
    pub wrong: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultListQuery {
    pub technology: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultListResponse {
    pub results: Vec<QuizResult>,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TechnologyStats {
    pub technology: String,
    pub attempts: i64,
    pub average_score: f64,
    pub best_score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultStatsResponse {
    pub total_attempts: i64,
    pub average_score: f64,
    pub by_technology: Vec<TechnologyStats>,
}
