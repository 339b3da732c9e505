use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceTier {
    Excellent,
    Good,
    Average,
    Poor,
}

impl PerformanceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceTier::Excellent => "Excellent",
            PerformanceTier::Good => "Good",
            PerformanceTier::Average => "Average",
            PerformanceTier::Poor => "Poor",
        }
    }
}

impl fmt::Display for PerformanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PerformanceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Excellent" => Ok(PerformanceTier::Excellent),
            "Good" => Ok(PerformanceTier::Good),
            "Average" => Ok(PerformanceTier::Average),
            "Poor" => Ok(PerformanceTier::Poor),
            other => Err(format!("unknown performance tier: {}", other)),
        }
    }
}

/// Read-only snapshot of a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    pub total_questions: u32,
    pub score_percent: u32,
    pub performance_tier: PerformanceTier,
}

/// Payload handed to the result recorder after a session finishes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSubmission {
    pub subject: String,
    pub level: String,
    pub title: String,
    pub total_questions: u32,
    pub correct: u32,
    pub wrong: u32,
    pub score_percent: u32,
    pub performance_tier: PerformanceTier,
    pub user_id: Option<Uuid>,
    pub quiz_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuizResult {
    pub id: Uuid,
    pub user_id: Uuid,
    pub quiz_id: Option<Uuid>,
    pub title: String,
    pub technology: String,
    pub level: String,
    pub total_questions: i32,
    pub correct: i32,
    pub wrong: i32,
    pub score: i32,
    pub performance: String,
    pub created_at: DateTime<Utc>,
}
