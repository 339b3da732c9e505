//! One user's attempt at one quiz.
//!
//! Every transition runs to completion on `&mut SessionState`; callers that
//! share a session across tasks wrap it in a mutex (see
//! `services::session_service`). Operations on a finished session are
//! ignored rather than rejected so that late timer ticks and double submits
//! are harmless.

use crate::models::quiz::QuizDefinition;
use crate::models::result::ResultSummary;
use crate::services::grading_service::GradingService;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No questions available for {subject}/{level}")]
    NoQuestionsAvailable { subject: String, level: String },

    #[error("Option {option_index} is out of range for question {question_index} ({options} options)")]
    InvalidAnswerIndex {
        question_index: usize,
        option_index: usize,
        options: usize,
    },

    #[error("Question {question_index} is out of range ({total} questions)")]
    InvalidQuestionIndex { question_index: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnswerRecord {
    Answered { selected: usize, is_correct: bool },
    Skipped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "seconds", rename_all = "snake_case")]
pub enum Countdown {
    Untimed,
    Remaining(u32),
}

impl Countdown {
    pub fn seconds(&self) -> Option<u32> {
        match self {
            Countdown::Untimed => None,
            Countdown::Remaining(secs) => Some(*secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    SessionFinished,
    AlreadyAnswered,
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    Untimed,
    Stale,
    Running(u32),
    Expired(ResultSummary),
}

#[derive(Debug, Clone)]
pub struct SessionState {
    quiz: Arc<QuizDefinition>,
    current_index: usize,
    answers: BTreeMap<usize, AnswerRecord>,
    remaining: Countdown,
    finished: bool,
    summary: Option<ResultSummary>,
}

impl SessionState {
    pub fn start(quiz: Arc<QuizDefinition>) -> Result<Self, SessionError> {
        if quiz.questions.is_empty() {
            return Err(SessionError::NoQuestionsAvailable {
                subject: quiz.subject.clone(),
                level: quiz.level.to_string(),
            });
        }
        let remaining = match quiz.duration_seconds {
            Some(secs) if secs > 0 => Countdown::Remaining(secs),
            _ => Countdown::Untimed,
        };
        Ok(Self {
            quiz,
            current_index: 0,
            answers: BTreeMap::new(),
            remaining,
            finished: false,
            summary: None,
        })
    }

    /// Fresh session over the same quiz. Nothing from `self` carries over.
    pub fn restart(&self) -> Self {
        Self {
            quiz: Arc::clone(&self.quiz),
            current_index: 0,
            answers: BTreeMap::new(),
            remaining: match self.quiz.duration_seconds {
                Some(secs) if secs > 0 => Countdown::Remaining(secs),
                _ => Countdown::Untimed,
            },
            finished: false,
            summary: None,
        }
    }

    pub fn quiz(&self) -> &Arc<QuizDefinition> {
        &self.quiz
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &BTreeMap<usize, AnswerRecord> {
        &self.answers
    }

    pub fn answer(&self, question_index: usize) -> Option<&AnswerRecord> {
        self.answers.get(&question_index)
    }

    pub fn remaining(&self) -> Countdown {
        self.remaining
    }

    pub fn is_timed(&self) -> bool {
        matches!(self.remaining, Countdown::Remaining(_))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn summary(&self) -> Option<&ResultSummary> {
        self.summary.as_ref()
    }

    pub fn total_questions(&self) -> usize {
        self.quiz.questions.len()
    }

    pub fn select_answer(
        &mut self,
        question_index: usize,
        option_index: usize,
    ) -> Result<Outcome, SessionError> {
        if self.finished {
            return Ok(Outcome::Ignored(IgnoreReason::SessionFinished));
        }
        let question = self.quiz.questions.get(question_index).ok_or(
            SessionError::InvalidQuestionIndex {
                question_index,
                total: self.quiz.questions.len(),
            },
        )?;
        if option_index >= question.options.len() {
            return Err(SessionError::InvalidAnswerIndex {
                question_index,
                option_index,
                options: question.options.len(),
            });
        }
        if self.answers.contains_key(&question_index) {
            return Ok(Outcome::Ignored(IgnoreReason::AlreadyAnswered));
        }
        let is_correct = question.is_correct(option_index);
        self.answers.insert(
            question_index,
            AnswerRecord::Answered {
                selected: option_index,
                is_correct,
            },
        );
        Ok(Outcome::Applied)
    }

    pub fn skip(&mut self, question_index: usize) -> Result<Outcome, SessionError> {
        if self.finished {
            return Ok(Outcome::Ignored(IgnoreReason::SessionFinished));
        }
        if question_index >= self.quiz.questions.len() {
            return Err(SessionError::InvalidQuestionIndex {
                question_index,
                total: self.quiz.questions.len(),
            });
        }
        if self.answers.contains_key(&question_index) {
            return Ok(Outcome::Ignored(IgnoreReason::AlreadyAnswered));
        }
        self.answers.insert(question_index, AnswerRecord::Skipped);
        Ok(Outcome::Applied)
    }

    pub fn go_to(&mut self, target_index: usize) -> Outcome {
        if self.finished {
            return Outcome::Ignored(IgnoreReason::SessionFinished);
        }
        if target_index >= self.quiz.questions.len() {
            return Outcome::Ignored(IgnoreReason::OutOfRange);
        }
        self.current_index = target_index;
        Outcome::Applied
    }

    pub fn next(&mut self) -> Outcome {
        self.go_to(self.current_index + 1)
    }

    pub fn previous(&mut self) -> Outcome {
        match self.current_index.checked_sub(1) {
            Some(target) => self.go_to(target),
            None if self.finished => Outcome::Ignored(IgnoreReason::SessionFinished),
            None => Outcome::Ignored(IgnoreReason::OutOfRange),
        }
    }

    /// Reconciles unanswered questions to skipped and freezes the session.
    /// Repeated calls return the summary computed the first time.
    pub fn finish(&mut self) -> ResultSummary {
        if let Some(summary) = &self.summary {
            return summary.clone();
        }
        for index in 0..self.quiz.questions.len() {
            self.answers.entry(index).or_insert(AnswerRecord::Skipped);
        }
        let summary = GradingService::summarize(&self.answers, self.quiz.questions.len());
        self.finished = true;
        self.summary = Some(summary.clone());
        summary
    }

    pub fn tick(&mut self) -> Tick {
        if self.finished {
            return Tick::Stale;
        }
        let Countdown::Remaining(secs) = self.remaining else {
            return Tick::Untimed;
        };
        let secs = secs.saturating_sub(1);
        self.remaining = Countdown::Remaining(secs);
        if secs == 0 {
            Tick::Expired(self.finish())
        } else {
            Tick::Running(secs)
        }
    }
}
