use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QuizError {
    #[error("Invalid quiz: {0}")]
    InvalidQuiz(String),

    #[error("Unknown level: {0}")]
    UnknownLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Basic,
    Intermediate,
    Advanced,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Basic => "basic",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Level::Basic),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            other => Err(QuizError::UnknownLevel(other.to_string())),
        }
    }
}

/// A multiple-choice question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizDefinition {
    /// Set when the quiz was loaded from the `quizzes` table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_id: Option<Uuid>,
    pub subject: String,
    pub level: Level,
    pub title: Option<String>,
    pub duration_seconds: Option<u32>,
    pub questions: Vec<Question>,
}

impl QuizDefinition {
    pub fn display_title(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("{} {} quiz", self.subject, self.level))
    }
}

/// An option as it appears in catalog files or request bodies: either bare
/// text, or an object carrying its own correctness flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Text(String),
    Flagged {
        #[serde(alias = "optionText", alias = "option_text")]
        text: String,
        #[serde(default, alias = "isCorrect")]
        is_correct: Option<bool>,
    },
}

impl RawOption {
    fn text(&self) -> &str {
        match self {
            RawOption::Text(text) => text,
            RawOption::Flagged { text, .. } => text,
        }
    }

    fn flag(&self) -> Option<bool> {
        match self {
            RawOption::Text(_) => None,
            RawOption::Flagged { is_correct, .. } => *is_correct,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuestion {
    #[serde(alias = "question", alias = "questionText", alias = "question_text")]
    pub text: String,
    pub options: Vec<RawOption>,
    #[serde(default, alias = "correctAnswer", alias = "correct_index", alias = "correctIndex")]
    pub correct_answer: Option<i64>,
}

impl TryFrom<RawQuestion> for Question {
    type Error = QuizError;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        let text = raw.text.trim().to_string();
        if text.is_empty() {
            return Err(QuizError::InvalidQuiz("question text is empty".into()));
        }
        if raw.options.len() < 2 {
            return Err(QuizError::InvalidQuiz(format!(
                "question '{}' needs at least two options",
                text
            )));
        }
        if raw.options.iter().any(|o| o.text().trim().is_empty()) {
            return Err(QuizError::InvalidQuiz(format!(
                "question '{}' has an empty option",
                text
            )));
        }

        let flagged: Vec<usize> = raw
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| o.flag() == Some(true))
            .map(|(i, _)| i)
            .collect();
        let any_flags = raw.options.iter().any(|o| o.flag().is_some());

        let index_form = match raw.correct_answer {
            Some(idx) if idx < 0 || idx as usize >= raw.options.len() => {
                return Err(QuizError::InvalidQuiz(format!(
                    "question '{}' has correct answer {} outside {} options",
                    text,
                    idx,
                    raw.options.len()
                )));
            }
            Some(idx) => Some(idx as usize),
            None => None,
        };

        let correct_index = if any_flags {
            let [only] = flagged.as_slice() else {
                return Err(QuizError::InvalidQuiz(format!(
                    "question '{}' must flag exactly one correct option, found {}",
                    text,
                    flagged.len()
                )));
            };
            if let Some(idx) = index_form {
                if idx != *only {
                    return Err(QuizError::InvalidQuiz(format!(
                        "question '{}' has conflicting correct answer {} and flag {}",
                        text, idx, only
                    )));
                }
            }
            *only
        } else {
            index_form.ok_or_else(|| {
                QuizError::InvalidQuiz(format!("question '{}' has no correct answer", text))
            })?
        };

        Ok(Question {
            text,
            options: raw.options.iter().map(|o| o.text().trim().to_string()).collect(),
            correct_index,
        })
    }
}

/// Quiz entry as written in catalog files. `duration` is in minutes;
/// `duration_seconds` wins when both are given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuizDefinition {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "technology")]
    pub subject: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default, alias = "durationSeconds")]
    pub duration_seconds: Option<u32>,
    #[serde(default)]
    pub questions: Vec<RawQuestion>,
}

impl RawQuizDefinition {
    /// Normalizes into a `QuizDefinition`. `subject` and `level` fill in for
    /// fields the entry itself leaves out (catalog files key entries by them).
    pub fn normalize(self, subject: &str, level: Level) -> Result<QuizDefinition, QuizError> {
        let subject = self
            .subject
            .as_deref()
            .unwrap_or(subject)
            .trim()
            .to_lowercase();
        if subject.is_empty() {
            return Err(QuizError::InvalidQuiz("subject is empty".into()));
        }
        let level = match self.level.as_deref() {
            Some(raw) => raw.parse()?,
            None => level,
        };

        let duration_seconds = match (self.duration_seconds, self.duration) {
            (Some(secs), _) => Some(secs),
            (None, Some(minutes)) => Some(minutes.saturating_mul(60)),
            (None, None) => None,
        };
        if duration_seconds == Some(0) {
            return Err(QuizError::InvalidQuiz(format!(
                "{}/{} has a zero duration",
                subject, level
            )));
        }

        let questions = self
            .questions
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(QuizDefinition {
            quiz_id: None,
            subject,
            level,
            title: self.title.filter(|t| !t.trim().is_empty()),
            duration_seconds,
            questions,
        })
    }
}
