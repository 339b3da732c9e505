use crate::error::Result;
use crate::models::quiz::{Level, QuizDefinition, QuizError, RawQuizDefinition};
use crate::services::quiz_service::QuizService;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

type Entries = BTreeMap<(String, Level), Arc<QuizDefinition>>;

#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub subject: String,
    pub level: Level,
    pub title: String,
    pub total_questions: usize,
    pub duration_seconds: Option<u32>,
}

/// Resolves `(subject, level)` to a quiz: the static catalog first, then
/// stored quizzes when a database fallback is attached.
#[derive(Clone, Default)]
pub struct CatalogService {
    entries: Arc<Entries>,
    quiz_service: Option<QuizService>,
}

impl CatalogService {
    pub fn new(entries: Vec<QuizDefinition>) -> Self {
        let entries = entries
            .into_iter()
            .map(|q| ((q.subject.clone(), q.level), Arc::new(q)))
            .collect();
        Self {
            entries: Arc::new(entries),
            quiz_service: None,
        }
    }

    pub fn with_database(mut self, quiz_service: QuizService) -> Self {
        self.quiz_service = Some(quiz_service);
        self
    }

    /// Parses a catalog document shaped `{ subject: { level: quiz } }`.
    pub fn parse(json: &str) -> std::result::Result<Vec<QuizDefinition>, QuizError> {
        let raw: BTreeMap<String, BTreeMap<String, RawQuizDefinition>> =
            serde_json::from_str(json)
                .map_err(|e| QuizError::InvalidQuiz(format!("catalog is not valid JSON: {}", e)))?;

        let mut quizzes = Vec::new();
        for (subject, levels) in raw {
            for (level, entry) in levels {
                let level: Level = level.parse()?;
                let quiz = entry.normalize(&subject, level).map_err(|e| match e {
                    QuizError::InvalidQuiz(msg) => {
                        QuizError::InvalidQuiz(format!("{}/{}: {}", subject, level, msg))
                    }
                    other => other,
                })?;
                quizzes.push(quiz);
            }
        }
        Ok(quizzes)
    }

    pub async fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let quizzes = match tokio::fs::read_to_string(path).await {
            Ok(json) => Self::parse(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Catalog file not found, starting with an empty catalog");
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), quizzes = quizzes.len(), "Catalog loaded");
        Ok(Self::new(quizzes))
    }

    pub fn list(&self) -> Vec<CatalogEntry> {
        self.entries
            .values()
            .map(|q| CatalogEntry {
                subject: q.subject.clone(),
                level: q.level,
                title: q.display_title(),
                total_questions: q.questions.len(),
                duration_seconds: q.duration_seconds,
            })
            .collect()
    }

    pub async fn get_quiz(&self, subject: &str, level: &str) -> Result<Option<Arc<QuizDefinition>>> {
        let subject = subject.trim().to_lowercase();
        let Ok(level) = level.parse::<Level>() else {
            return Ok(None);
        };
        if subject.is_empty() {
            return Ok(None);
        }

        if let Some(quiz) = self.entries.get(&(subject.clone(), level)) {
            return Ok(Some(Arc::clone(quiz)));
        }

        let Some(quiz_service) = &self.quiz_service else {
            return Ok(None);
        };
        match quiz_service.find_latest(&subject, level).await? {
            Some(record) => match record.to_definition() {
                Ok(quiz) => Ok(Some(Arc::new(quiz))),
                Err(e) => {
                    warn!(quiz_id = %record.id, error = %e, "Stored quiz could not be loaded");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }
}
