use crate::dto::result_dto::{CreateResultPayload, ResultStatsResponse, TechnologyStats};
use crate::error::{Error, Result};
use crate::models::quiz::Level;
use crate::models::result::{QuizResult, ResultSubmission};
use crate::services::grading_service::GradingService;
use sqlx::PgPool;
use uuid::Uuid;

/// Stored result counts. `score` and `performance` are always derived here,
/// never taken from the caller.
#[derive(Debug, Clone)]
pub struct NewResult {
    pub user_id: Uuid,
    pub quiz_id: Option<Uuid>,
    pub title: String,
    pub technology: String,
    pub level: Level,
    pub total_questions: u32,
    pub correct: u32,
    pub wrong: u32,
}

impl NewResult {
    pub fn from_submission(submission: &ResultSubmission) -> Result<Self> {
        let user_id = submission
            .user_id
            .ok_or_else(|| Error::BadRequest("Result has no user".to_string()))?;
        Ok(Self {
            user_id,
            quiz_id: submission.quiz_id,
            title: submission.title.clone(),
            technology: submission.subject.clone(),
            level: submission.level.parse()?,
            total_questions: submission.total_questions,
            correct: submission.correct,
            wrong: submission.wrong,
        })
    }

    pub fn from_payload(user_id: Uuid, payload: CreateResultPayload) -> Result<Self> {
        let total = u32::try_from(payload.total_questions)
            .map_err(|_| Error::BadRequest("total_questions must be positive".to_string()))?;
        let correct = u32::try_from(payload.correct)
            .map_err(|_| Error::BadRequest("correct must not be negative".to_string()))?;
        if correct > total {
            return Err(Error::BadRequest(
                "correct cannot exceed total_questions".to_string(),
            ));
        }
        let wrong = match payload.wrong {
            Some(w) => u32::try_from(w)
                .map_err(|_| Error::BadRequest("wrong must not be negative".to_string()))?,
            None => total - correct,
        };
        if correct.saturating_add(wrong) > total {
            return Err(Error::BadRequest(
                "correct and wrong cannot exceed total_questions".to_string(),
            ));
        }
        Ok(Self {
            user_id,
            quiz_id: payload.quiz_id,
            title: payload.title.trim().to_string(),
            technology: payload.technology.trim().to_lowercase(),
            level: payload.level.parse()?,
            total_questions: total,
            correct,
            wrong,
        })
    }
}

#[derive(Clone)]
pub struct ResultService {
    pool: PgPool,
}

impl ResultService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_result(&self, new: NewResult) -> Result<QuizResult> {
        let score = GradingService::score_percent(new.correct, new.total_questions);
        let performance = GradingService::performance_tier(score);

        let result = sqlx::query_as::<_, QuizResult>(
            r#"
            INSERT INTO quiz_results (
                user_id, quiz_id, title, technology, level,
                total_questions, correct, wrong, score, performance
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.quiz_id)
        .bind(&new.title)
        .bind(&new.technology)
        .bind(new.level.as_str())
        .bind(new.total_questions as i32)
        .bind(new.correct as i32)
        .bind(new.wrong as i32)
        .bind(score as i32)
        .bind(performance.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(result)
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        technology: Option<String>,
        level: Option<String>,
    ) -> Result<Vec<QuizResult>> {
        let technology = technology
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty() && t != "all");
        let level = match level.filter(|l| !l.trim().is_empty()) {
            Some(raw) => Some(raw.parse::<Level>()?.as_str().to_string()),
            None => None,
        };

        let rows = sqlx::query_as::<_, QuizResult>(
            r#"
            SELECT * FROM quiz_results
            WHERE user_id = $1
              AND ($2::text IS NULL OR technology = $2)
              AND ($3::text IS NULL OR level = $3)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(technology)
        .bind(level)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn stats_for_user(&self, user_id: Uuid) -> Result<ResultStatsResponse> {
        let by_technology = sqlx::query_as::<_, TechnologyStats>(
            r#"
            SELECT
                technology,
                COUNT(*) AS attempts,
                AVG(score)::float8 AS average_score,
                MAX(score) AS best_score
            FROM quiz_results
            WHERE user_id = $1
            GROUP BY technology
            ORDER BY technology
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(aggregate_stats(by_technology))
    }

    pub async fn delete_result(&self, user_id: Uuid, result_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM quiz_results WHERE id = $1 AND user_id = $2")
            .bind(result_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Result not found".to_string()));
        }
        Ok(())
    }
}

fn aggregate_stats(by_technology: Vec<TechnologyStats>) -> ResultStatsResponse {
    let total_attempts: i64 = by_technology.iter().map(|s| s.attempts).sum();
    let weighted: f64 = by_technology
        .iter()
        .map(|s| s.average_score * s.attempts as f64)
        .sum();
    let average_score = if total_attempts > 0 {
        (weighted / total_attempts as f64 * 100.0).round() / 100.0
    } else {
        0.0
    };
    ResultStatsResponse {
        total_attempts,
        average_score,
        by_technology,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(total: i32, correct: i32, wrong: Option<i32>) -> CreateResultPayload {
        CreateResultPayload {
            title: " HTML Level 1 ".into(),
            technology: "HTML".into(),
            level: "basic".into(),
            quiz_id: None,
            total_questions: total,
            correct,
            wrong,
        }
    }

    #[test]
    fn wrong_defaults_to_the_remainder() {
        let new = NewResult::from_payload(Uuid::new_v4(), payload(10, 7, None)).unwrap();
        assert_eq!(new.wrong, 3);
        assert_eq!(new.technology, "html");
        assert_eq!(new.title, "HTML Level 1");
    }

    #[test]
    fn correct_above_total_is_rejected() {
        let err = NewResult::from_payload(Uuid::new_v4(), payload(5, 6, None)).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn anonymous_submission_is_not_storable() {
        let submission = ResultSubmission {
            subject: "css".into(),
            level: "basic".into(),
            title: "CSS".into(),
            total_questions: 2,
            correct: 1,
            wrong: 1,
            score_percent: 50,
            performance_tier: crate::models::result::PerformanceTier::Average,
            user_id: None,
            quiz_id: None,
        };
        assert!(NewResult::from_submission(&submission).is_err());
    }

    #[test]
    fn stored_quiz_id_follows_the_submission() {
        let quiz_id = Uuid::new_v4();
        let submission = ResultSubmission {
            subject: "css".into(),
            level: "intermediate".into(),
            title: "CSS Level 2".into(),
            total_questions: 3,
            correct: 2,
            wrong: 1,
            score_percent: 67,
            performance_tier: crate::models::result::PerformanceTier::Average,
            user_id: Some(Uuid::new_v4()),
            quiz_id: Some(quiz_id),
        };
        let new = NewResult::from_submission(&submission).unwrap();
        assert_eq!(new.quiz_id, Some(quiz_id));
        assert_eq!(new.level, Level::Intermediate);
    }

    #[test]
    fn correct_plus_wrong_above_total_is_rejected() {
        let err = NewResult::from_payload(Uuid::new_v4(), payload(10, 7, Some(4))).unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));

        let new = NewResult::from_payload(Uuid::new_v4(), payload(10, 7, Some(2))).unwrap();
        assert_eq!(new.wrong, 2);
    }

    #[test]
    fn overall_average_is_weighted_by_attempts() {
        let stats = aggregate_stats(vec![
            TechnologyStats {
                technology: "css".into(),
                attempts: 1,
                average_score: 40.0,
                best_score: 40,
            },
            TechnologyStats {
                technology: "html".into(),
                attempts: 3,
                average_score: 80.0,
                best_score: 90,
            },
        ]);
        assert_eq!(stats.total_attempts, 4);
        assert_eq!(stats.average_score, 70.0);
    }
}
