use crate::dto::quiz_dto::{CreateQuizPayload, UpdateQuizPayload};
use crate::error::{Error, Result};
use crate::models::quiz::{Level, Question, RawQuestion};
use crate::models::quiz_record::QuizRecord;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct QuizService {
    pool: PgPool,
}

impl QuizService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_quiz(
        &self,
        payload: CreateQuizPayload,
        created_by: Option<Uuid>,
    ) -> Result<QuizRecord> {
        let level: Level = payload.level.parse()?;
        let (questions_json, total) = normalize_questions(payload.questions)?;

        let quiz = sqlx::query_as::<_, QuizRecord>(
            r#"
            INSERT INTO quizzes (title, technology, level, duration_minutes, questions, total_questions, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(payload.title.trim())
        .bind(payload.technology.trim().to_lowercase())
        .bind(level.as_str())
        .bind(payload.duration_minutes)
        .bind(questions_json)
        .bind(total)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(quiz_id = %quiz.id, technology = %quiz.technology, level = %quiz.level, "Quiz created");
        Ok(quiz)
    }

    pub async fn get_quiz_by_id(&self, quiz_id: Uuid) -> Result<QuizRecord> {
        let quiz = sqlx::query_as::<_, QuizRecord>(r#"SELECT * FROM quizzes WHERE id = $1"#)
            .bind(quiz_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(quiz)
    }

    pub async fn list_quizzes(
        &self,
        technology: Option<String>,
        level: Option<String>,
    ) -> Result<Vec<QuizRecord>> {
        let technology = technology.map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty());
        let level = match level.filter(|l| !l.trim().is_empty()) {
            Some(raw) => Some(raw.parse::<Level>()?.as_str().to_string()),
            None => None,
        };

        let rows = sqlx::query_as::<_, QuizRecord>(
            r#"
            SELECT * FROM quizzes
            WHERE ($1::text IS NULL OR technology = $1)
              AND ($2::text IS NULL OR level = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(technology)
        .bind(level)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn find_latest(&self, technology: &str, level: Level) -> Result<Option<QuizRecord>> {
        let row = sqlx::query_as::<_, QuizRecord>(
            r#"
            SELECT * FROM quizzes
            WHERE technology = $1 AND level = $2
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(technology)
        .bind(level.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_quiz(&self, quiz_id: Uuid, payload: UpdateQuizPayload) -> Result<QuizRecord> {
        let level = match payload.level {
            Some(raw) => Some(raw.parse::<Level>()?.as_str().to_string()),
            None => None,
        };
        let (questions_json, total) = match payload.questions {
            Some(questions) => {
                let (json, total) = normalize_questions(questions)?;
                (Some(json), Some(total))
            }
            None => (None, None),
        };

        let quiz = sqlx::query_as::<_, QuizRecord>(
            r#"
            UPDATE quizzes
            SET
                title = COALESCE($1, title),
                technology = COALESCE($2, technology),
                level = COALESCE($3, level),
                duration_minutes = COALESCE($4, duration_minutes),
                questions = COALESCE($5, questions),
                total_questions = COALESCE($6, total_questions),
                updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(payload.title.map(|t| t.trim().to_string()))
        .bind(payload.technology.map(|t| t.trim().to_lowercase()))
        .bind(level)
        .bind(payload.duration_minutes)
        .bind(questions_json)
        .bind(total)
        .bind(quiz_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(quiz)
    }

    pub async fn delete_quiz(&self, quiz_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM quizzes WHERE id = $1")
            .bind(quiz_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Quiz not found".to_string()));
        }
        Ok(())
    }
}

fn normalize_questions(raw: Vec<RawQuestion>) -> Result<(JsonValue, i32)> {
    let questions = raw
        .into_iter()
        .map(Question::try_from)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    let total = questions.len() as i32;
    Ok((serde_json::to_value(questions)?, total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stored_questions_use_the_normalized_shape() {
        let raw: Vec<RawQuestion> = serde_json::from_value(json!([
            {"questionText": "Box model?", "options": [
                {"optionText": "margin", "isCorrect": true},
                {"optionText": "float", "isCorrect": false}
            ]}
        ]))
        .unwrap();
        let (stored, total) = normalize_questions(raw).unwrap();
        assert_eq!(total, 1);
        assert_eq!(
            stored,
            json!([{"text": "Box model?", "options": ["margin", "float"], "correct_index": 0}])
        );
    }

    #[test]
    fn invalid_question_is_a_bad_request() {
        let raw: Vec<RawQuestion> =
            serde_json::from_value(json!([{"question": "q", "options": ["a"], "correct_answer": 0}]))
                .unwrap();
        assert!(matches!(normalize_questions(raw), Err(Error::Quiz(_))));
    }
}
