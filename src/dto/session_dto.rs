use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::dto::quiz_dto::PublicQuestion;
use crate::models::result::ResultSummary;
use crate::models::session::{AnswerRecord, Outcome};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[validate(length(min = 1))]
    pub subject: String,
    #[validate(length(min = 1))]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question_index: usize,
    pub option_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipRequest {
    pub question_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoToRequest {
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerView {
    pub question_index: usize,
    pub correct_index: usize,
    #[serde(flatten)]
    pub record: AnswerRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub attempt: u32,
    pub subject: String,
    pub level: String,
    pub title: String,
    pub total_questions: usize,
    pub current_index: usize,
    pub current_question: PublicQuestion,
    pub answers: Vec<AnswerView>,
    pub answered_count: usize,
    pub progress_percent: u32,
    pub timed: bool,
    pub remaining_seconds: Option<u32>,
    pub finished: bool,
    pub summary: Option<ResultSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub session: SessionView,
}
