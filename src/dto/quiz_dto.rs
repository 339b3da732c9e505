use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::quiz::{Question, QuizDefinition, RawQuestion};
use crate::models::quiz_record::QuizRecord;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuizPayload {
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub technology: String,
    #[validate(length(min = 1))]
    pub level: String,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i32,
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateQuizPayload {
    #[validate(length(min = 1))]
    pub title: Option<String>,
    #[validate(length(min = 1))]
    pub technology: Option<String>,
    #[validate(length(min = 1))]
    pub level: Option<String>,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    pub questions: Option<Vec<RawQuestion>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizListQuery {
    pub technology: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResponse {
    pub id: Uuid,
    pub title: String,
    pub technology: String,
    pub level: String,
    pub duration_minutes: i32,
    pub total_questions: i32,
    pub questions: serde_json::Value,
    pub created_by: Option<Uuid>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<QuizRecord> for QuizResponse {
    fn from(record: QuizRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            technology: record.technology,
            level: record.level,
            duration_minutes: record.duration_minutes,
            total_questions: record.total_questions,
            questions: record.questions,
            created_by: record.created_by,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizListResponse {
    pub items: Vec<QuizResponse>,
    pub total: usize,
}

/// A question as shown to someone taking the quiz. `correct_index` stays
/// hidden until the question has been answered or skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub index: usize,
    pub text: String,
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,
}

impl PublicQuestion {
    pub fn new(index: usize, question: &Question) -> Self {
        Self {
            index,
            text: question.text.clone(),
            options: question.options.clone(),
            correct_index: None,
        }
    }

    pub fn revealed(index: usize, question: &Question) -> Self {
        Self {
            correct_index: Some(question.correct_index),
            ..Self::new(index, question)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuiz {
    pub subject: String,
    pub level: String,
    pub title: String,
    pub duration_seconds: Option<u32>,
    pub total_questions: usize,
    pub questions: Vec<PublicQuestion>,
}

impl From<&QuizDefinition> for PublicQuiz {
    fn from(quiz: &QuizDefinition) -> Self {
        Self {
            subject: quiz.subject.clone(),
            level: quiz.level.to_string(),
            title: quiz.display_title(),
            duration_seconds: quiz.duration_seconds,
            total_questions: quiz.questions.len(),
            questions: quiz
                .questions
                .iter()
                .enumerate()
                .map(|(i, q)| PublicQuestion::new(i, q))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(duration_minutes: i32) -> CreateQuizPayload {
        CreateQuizPayload {
            title: "HTML Level 2".into(),
            technology: "html".into(),
            level: "intermediate".into(),
            duration_minutes,
            questions: vec![],
        }
    }

    #[test]
    fn duration_is_bounded_to_a_day() {
        assert!(payload(1440).validate().is_ok());
        assert!(payload(100_000_000).validate().is_err());
        assert!(payload(0).validate().is_err());
    }
}
