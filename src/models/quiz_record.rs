use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::quiz::{Question, QuizDefinition, QuizError};

/// A quiz stored in the `quizzes` table. `questions` holds normalized
/// `Question` values.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizRecord {
    pub id: Uuid,
    pub title: String,
    pub technology: String,
    pub level: String,
    pub duration_minutes: i32,
    pub questions: JsonValue,
    pub total_questions: i32,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuizRecord {
    pub fn to_definition(&self) -> Result<QuizDefinition, QuizError> {
        let questions: Vec<Question> = serde_json::from_value(self.questions.clone())
            .map_err(|e| QuizError::InvalidQuiz(format!("stored questions unreadable: {}", e)))?;
        Ok(QuizDefinition {
            quiz_id: Some(self.id),
            subject: self.technology.to_lowercase(),
            level: self.level.parse()?,
            title: Some(self.title.clone()),
            duration_seconds: u32::try_from(self.duration_minutes)
                .ok()
                .filter(|m| *m > 0)
                .map(|m| m.saturating_mul(60)),
            questions,
        })
    }
}
